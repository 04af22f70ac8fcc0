use anchor_lang::prelude::*;

use crate::{
    constants::{MAX_REQUEST_CONFIRMATIONS, NUM_WORDS, RAFFLE_SEED, TREASURY_SEED},
    error::RaffleError,
    state::{RandomnessConfig, Raffle, Treasury, TREASURY_ACCOUNT_SIZE},
};

/// Construction parameters, fixed for the lifetime of the raffle.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct InitializeRaffleParams {
    /// Minimum payment per entry in lamports
    pub entry_fee: u64,
    /// Minimum seconds between two settlements
    pub draw_interval: i64,
    /// Provider channel the randomness requests are routed through
    pub key_hash: [u8; 32],
    /// Provider subscription billed for requests
    pub subscription_id: u64,
    /// Compute budget the provider attaches to the fulfillment
    pub callback_compute_limit: u32,
    /// Confirmations the provider waits before answering
    pub request_confirmations: u16,
}

impl InitializeRaffleParams {
    pub fn validate(&self) -> Result<()> {
        require!(self.draw_interval > 0, RaffleError::InvalidDrawInterval);
        require!(
            self.request_confirmations > 0
                && self.request_confirmations <= MAX_REQUEST_CONFIRMATIONS,
            RaffleError::InvalidRandomnessConfig
        );
        require!(
            self.callback_compute_limit > 0,
            RaffleError::InvalidRandomnessConfig
        );
        Ok(())
    }

    pub fn randomness_config(&self) -> RandomnessConfig {
        RandomnessConfig {
            key_hash: self.key_hash,
            subscription_id: self.subscription_id,
            callback_compute_limit: self.callback_compute_limit,
            request_confirmations: self.request_confirmations,
            num_words: NUM_WORDS,
        }
    }
}

/// Event emitted when a raffle is created
#[event]
pub struct RaffleInitialized {
    /// The pubkey of the created raffle
    pub raffle: Pubkey,
    /// Provider allowed to deliver randomness
    pub coordinator: Pubkey,
    /// Minimum payment per entry in lamports
    pub entry_fee: u64,
    /// Minimum seconds between draws
    pub draw_interval: i64,
    /// Provider subscription billed for requests
    pub subscription_id: u64,
    /// When the first cycle started
    pub started_at: i64,
}

/// Creates a raffle and its treasury.
///
/// The raffle opens immediately; the first draw becomes possible
/// `draw_interval` seconds after this instruction lands.
///
/// # Account Validations
/// * Raffle - New PDA with seeds ["raffle", authority]
/// * Treasury - New PDA with seeds ["treasury", raffle] holding pooled lamports
/// * Coordinator - Any account; its key becomes the only valid fulfillment signer
pub fn initialize_raffle(
    ctx: Context<InitializeRaffle>,
    params: InitializeRaffleParams,
) -> Result<()> {
    // Reject parameters that would make the raffle undrawable
    params.validate()?;
    let now = Clock::get()?.unix_timestamp;

    // Bind the treasury to its raffle
    let raffle_key = ctx.accounts.raffle.key();
    ctx.accounts.treasury.raffle = raffle_key;
    ctx.accounts.treasury.bump = ctx.bumps.treasury;

    // The first cycle starts now with no entrant slots allocated
    ctx.accounts.raffle.set_inner(Raffle::new(
        ctx.bumps.raffle,
        ctx.accounts.authority.key(),
        ctx.accounts.coordinator.key(),
        ctx.accounts.treasury.key(),
        params.entry_fee,
        params.draw_interval,
        params.randomness_config(),
        now,
    ));

    msg!(
        "Raffle {} open: fee={} interval={}s",
        raffle_key,
        params.entry_fee,
        params.draw_interval
    );

    emit!(RaffleInitialized {
        raffle: raffle_key,
        coordinator: ctx.accounts.coordinator.key(),
        entry_fee: params.entry_fee,
        draw_interval: params.draw_interval,
        subscription_id: params.subscription_id,
        started_at: now,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct InitializeRaffle<'info> {
    #[account(
        init,
        payer = authority,
        space = Raffle::space_for(0),
        seeds = [RAFFLE_SEED, authority.key().as_ref()],
        bump
    )]
    pub raffle: Account<'info, Raffle>,

    #[account(
        init,
        payer = authority,
        space = TREASURY_ACCOUNT_SIZE,
        seeds = [TREASURY_SEED, raffle.key().as_ref()],
        bump,
    )]
    pub treasury: Account<'info, Treasury>,

    #[account(mut)]
    pub authority: Signer<'info>,

    /// CHECK: only the key is stored; it must sign every fulfillment.
    pub coordinator: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::error::Error;

    fn params() -> InitializeRaffleParams {
        InitializeRaffleParams {
            entry_fee: 10_000_000,
            draw_interval: 30,
            key_hash: [1u8; 32],
            subscription_id: 1,
            callback_compute_limit: 500_000,
            request_confirmations: 3,
        }
    }

    #[test]
    fn accepts_sane_parameters() {
        assert!(params().validate().is_ok());
        assert_eq!(params().randomness_config().num_words, NUM_WORDS);
    }

    #[test]
    fn rejects_non_positive_interval() {
        for draw_interval in [0, -30] {
            let params = InitializeRaffleParams {
                draw_interval,
                ..params()
            };
            assert_eq!(
                params.validate().unwrap_err(),
                Error::from(RaffleError::InvalidDrawInterval)
            );
        }
    }

    #[test]
    fn rejects_out_of_range_randomness_config() {
        let cases = [
            InitializeRaffleParams {
                request_confirmations: 0,
                ..params()
            },
            InitializeRaffleParams {
                request_confirmations: MAX_REQUEST_CONFIRMATIONS + 1,
                ..params()
            },
            InitializeRaffleParams {
                callback_compute_limit: 0,
                ..params()
            },
        ];
        for params in cases {
            assert_eq!(
                params.validate().unwrap_err(),
                Error::from(RaffleError::InvalidRandomnessConfig)
            );
        }
    }
}
