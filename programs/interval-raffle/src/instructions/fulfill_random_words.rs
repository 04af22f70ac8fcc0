use anchor_lang::prelude::*;

use crate::{
    constants::{RAFFLE_SEED, TREASURY_SEED},
    error::RaffleError,
    state::{entrant_slots_mut, Raffle, Treasury, TREASURY_ACCOUNT_SIZE},
};

/// Event emitted when a draw is settled and the pool paid out
#[event]
pub struct WinnerSettled {
    /// The pubkey of the raffle
    pub raffle: Pubkey,
    /// The winner's address
    pub winner: Pubkey,
    /// Lamports paid to the winner
    pub amount: u64,
    /// Position of the winner among the cycle's entrants
    pub winner_index: u64,
    /// The request this settlement answered
    pub request_id: u64,
    /// Recorded settlement time
    pub settled_at: i64,
    /// When the answered request was opened
    pub requested_at: i64,
}

/// Randomness callback. Settles the pending draw and pays the whole pool to
/// the entrant at `random_words[0] mod entrant_count`.
///
/// # Arguments
/// * `request_id` - Must equal the raffle's pending request id
/// * `random_words` - Provider output; the first word picks the winner
///
/// # Security Considerations
/// 1. Only the coordinator recorded at construction may sign this
/// 2. A request must be pending and its id must match
/// 3. The `recipient` account must be the selected winner
///
/// # Implementation Notes
/// - The provider derives the winner off-chain the same way and passes that
///   account as `recipient`
/// - Lamports move before any ledger field changes. A failed payout returns
///   `PayoutFailed` and leaves the raffle Calculating with the same pending
///   request, so the same answer can be delivered again
pub fn fulfill_random_words(
    ctx: Context<FulfillRandomWords>,
    request_id: u64,
    random_words: Vec<[u8; 32]>,
) -> Result<()> {
    let now = Clock::get()?.unix_timestamp;
    // The treasury must stay rent exempt after paying out the pool
    let rent_floor = Rent::get()?.minimum_balance(TREASURY_ACCOUNT_SIZE);
    let raffle_key = ctx.accounts.raffle.key();
    let raffle_info = ctx.accounts.raffle.to_account_info();
    let treasury = ctx.accounts.treasury.to_account_info();
    let recipient = ctx.accounts.recipient.to_account_info();

    // Pay the winner first; the raffle is only reset once lamports moved
    let settlement = {
        let mut raffle_data = raffle_info.try_borrow_mut_data()?;
        ctx.accounts.raffle.settle(
            entrant_slots_mut(&mut raffle_data),
            request_id,
            &random_words,
            now,
            |winner, amount| {
                require_keys_eq!(recipient.key(), *winner, RaffleError::RecipientMismatch);
                Treasury::disburse(&treasury, &recipient, amount, rent_floor)
            },
        )?
    };

    msg!(
        "Request {} settled after {}s: winner={} index={} amount={}",
        settlement.request_id,
        settlement.settled_at.saturating_sub(settlement.requested_at),
        settlement.winner,
        settlement.winner_index,
        settlement.amount
    );

    emit!(WinnerSettled {
        raffle: raffle_key,
        winner: settlement.winner,
        amount: settlement.amount,
        winner_index: settlement.winner_index,
        request_id: settlement.request_id,
        settled_at: settlement.settled_at,
        requested_at: settlement.requested_at,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct FulfillRandomWords<'info> {
    #[account(
        mut,
        seeds = [RAFFLE_SEED, raffle.authority.as_ref()],
        bump = raffle.bump,
        has_one = coordinator @ RaffleError::OnlyCoordinatorCanFulfill,
        has_one = treasury @ RaffleError::InvalidTreasury,
    )]
    pub raffle: Account<'info, Raffle>,

    pub coordinator: Signer<'info>,

    #[account(
        mut,
        seeds = [TREASURY_SEED, raffle.key().as_ref()],
        bump = treasury.bump,
    )]
    pub treasury: Account<'info, Treasury>,

    /// CHECK: compared against the selected winner before any lamports move.
    #[account(mut)]
    pub recipient: UncheckedAccount<'info>,
}
