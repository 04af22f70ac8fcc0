use anchor_lang::prelude::*;

use crate::{
    constants::RAFFLE_SEED,
    state::{Raffle, UpkeepStatus},
};

/// Reports whether a draw may start right now, without changing anything.
///
/// The returned status travels back as return data, so automation agents can
/// simulate this instruction to decide when to call `perform_upkeep`.
pub fn check_upkeep(ctx: Context<CheckUpkeep>) -> Result<UpkeepStatus> {
    let now = Clock::get()?.unix_timestamp;
    Ok(ctx.accounts.raffle.upkeep_status(now))
}

#[derive(Accounts)]
pub struct CheckUpkeep<'info> {
    #[account(
        seeds = [RAFFLE_SEED, raffle.authority.as_ref()],
        bump = raffle.bump,
    )]
    pub raffle: Account<'info, Raffle>,
}
