use anchor_lang::prelude::*;

pub mod constants;
pub mod error;
pub mod instructions;
pub mod state;

pub use instructions::*;
pub use state::UpkeepStatus;

declare_id!("HHKXhbu9NnTvSzYYUvXmVBp9bqqzGgg5qH8yAzGeyAY6");

#[program]
pub mod interval_raffle {
    use super::*;

    pub fn initialize_raffle(
        ctx: Context<InitializeRaffle>,
        params: InitializeRaffleParams,
    ) -> Result<()> {
        instructions::initialize_raffle::initialize_raffle(ctx, params)
    }

    pub fn enter_raffle(ctx: Context<EnterRaffle>, payment: u64) -> Result<()> {
        instructions::enter_raffle::enter_raffle(ctx, payment)
    }

    pub fn check_upkeep(ctx: Context<CheckUpkeep>) -> Result<UpkeepStatus> {
        instructions::check_upkeep::check_upkeep(ctx)
    }

    pub fn perform_upkeep(ctx: Context<PerformUpkeep>) -> Result<()> {
        instructions::perform_upkeep::perform_upkeep(ctx)
    }

    pub fn fulfill_random_words(
        ctx: Context<FulfillRandomWords>,
        request_id: u64,
        random_words: Vec<[u8; 32]>,
    ) -> Result<()> {
        instructions::fulfill_random_words::fulfill_random_words(ctx, request_id, random_words)
    }
}
