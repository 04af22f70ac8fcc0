use anchor_lang::prelude::*;

use crate::{constants::RAFFLE_SEED, state::Raffle};

/// Randomness request picked up by the off-chain provider
#[event]
pub struct RandomnessRequested {
    /// The requesting raffle
    pub raffle: Pubkey,
    /// Id the fulfillment must carry
    pub request_id: u64,
    /// Provider channel
    pub key_hash: [u8; 32],
    /// Provider subscription billed for the request
    pub subscription_id: u64,
    /// Confirmations to wait before answering
    pub request_confirmations: u16,
    /// Compute budget for the fulfillment
    pub callback_compute_limit: u32,
    /// Random words asked for
    pub num_words: u32,
}

/// Event emitted when a draw starts
#[event]
pub struct DrawRequested {
    /// The pubkey of the raffle
    pub raffle: Pubkey,
    /// Id of the outstanding randomness request
    pub request_id: u64,
}

/// Starts a draw. Anyone may call this once the upkeep check passes.
///
/// # Security Considerations
/// 1. Raffle must be Open, so at most one request is ever outstanding
/// 2. The draw interval must have elapsed since the last settlement
/// 3. There must be at least one entrant and a non-zero pool
///
/// After execution:
/// - The raffle is Calculating and refuses entries
/// - The request id is stored as the pending request
pub fn perform_upkeep(ctx: Context<PerformUpkeep>) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    let raffle_key = ctx.accounts.raffle.key();
    let raffle = &mut ctx.accounts.raffle;

    // Fails with UpkeepNotNeeded unless the raffle is open, due and funded
    let request_id = raffle.begin_draw(&raffle_key, now)?;

    msg!(
        "Draw requested: request={} entrants={} pool={}",
        request_id,
        raffle.entrant_count(),
        raffle.pooled_funds
    );

    // The provider picks the request up from this event
    emit!(RandomnessRequested {
        raffle: raffle_key,
        request_id,
        key_hash: raffle.key_hash(),
        subscription_id: raffle.subscription_id(),
        request_confirmations: raffle.request_confirmations(),
        callback_compute_limit: raffle.callback_compute_limit(),
        num_words: raffle.num_words(),
    });

    emit!(DrawRequested {
        raffle: raffle_key,
        request_id,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct PerformUpkeep<'info> {
    #[account(
        mut,
        seeds = [RAFFLE_SEED, raffle.authority.as_ref()],
        bump = raffle.bump,
    )]
    pub raffle: Account<'info, Raffle>,

    pub caller: Signer<'info>,
}
