use anchor_lang::prelude::*;

use crate::{
    constants::{RAFFLE_SEED, TREASURY_SEED},
    error::RaffleError,
    state::{entrant_slots_mut, Raffle, Treasury},
};

/// Event emitted when an entry is accepted
#[event]
pub struct EntryAccepted {
    /// The pubkey of the raffle
    pub raffle: Pubkey,
    /// The entrant's address
    pub participant: Pubkey,
    /// Amount paid in lamports, overpayment included
    pub payment: u64,
    /// Entrants in the current cycle after this entry
    pub entrant_count: u64,
}

/// Buys one entry into the current cycle.
///
/// # Arguments
/// * `ctx` - The context object containing all required accounts
/// * `payment` - Lamports to pay; must be at least the entry fee
///
/// # Security Considerations
/// 1. Rejects every entry while a draw is being calculated
/// 2. Rejects payments below the entry fee
/// 3. Treasury must match the one stored in the raffle
/// 4. Verifies the payment actually arrived in the treasury
///
/// # Implementation Notes
/// - Anything paid above the fee stays in the pool; it buys no extra odds
/// - The raffle account grows by one entrant slot when no free slot is left,
///   paid for by the entrant
pub fn enter_raffle(ctx: Context<EnterRaffle>, payment: u64) -> Result<()> {
    let participant = ctx.accounts.player.key();
    let raffle_info = ctx.accounts.raffle.to_account_info();

    // Record the entry in the slot the realloc constraint made room for
    {
        let mut raffle_data = raffle_info.try_borrow_mut_data()?;
        ctx.accounts
            .raffle
            .enter(entrant_slots_mut(&mut raffle_data), participant, payment)?;
    }

    // Store pre-transfer balance for verification
    let pre_transfer_balance = ctx.accounts.treasury.to_account_info().lamports();

    // Move the full payment into the treasury
    anchor_lang::solana_program::program::invoke(
        &anchor_lang::solana_program::system_instruction::transfer(
            &participant,
            &ctx.accounts.treasury.key(),
            payment,
        ),
        &[
            ctx.accounts.player.to_account_info(),
            ctx.accounts.treasury.to_account_info(),
            ctx.accounts.system_program.to_account_info(),
        ],
    )?;

    // Verify the treasury received exactly the payment
    let post_transfer_balance = ctx.accounts.treasury.to_account_info().lamports();
    require!(
        post_transfer_balance
            == pre_transfer_balance
                .checked_add(payment)
                .ok_or(RaffleError::Overflow)?,
        RaffleError::EntryTransferFailed
    );

    emit!(EntryAccepted {
        raffle: ctx.accounts.raffle.key(),
        participant,
        payment,
        entrant_count: ctx.accounts.raffle.entrant_count(),
    });

    Ok(())
}

#[derive(Accounts)]
pub struct EnterRaffle<'info> {
    #[account(
        mut,
        seeds = [RAFFLE_SEED, raffle.authority.as_ref()],
        bump = raffle.bump,
        has_one = treasury @ RaffleError::InvalidTreasury,
        realloc = Raffle::space_for(raffle.total_entrants as usize + 1)
            .max(raffle.to_account_info().data_len()),
        realloc::payer = player,
        realloc::zero = false,
    )]
    pub raffle: Account<'info, Raffle>,

    #[account(
        mut,
        seeds = [TREASURY_SEED, raffle.key().as_ref()],
        bump = treasury.bump,
    )]
    pub treasury: Account<'info, Treasury>,

    #[account(mut)]
    pub player: Signer<'info>,

    pub system_program: Program<'info, System>,
}
