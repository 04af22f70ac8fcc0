use anchor_lang::prelude::*;

use crate::error::RaffleError;

// 8 discriminator + 32 raffle + 1 bump
pub const TREASURY_ACCOUNT_SIZE: usize = 8 + 32 + 1;

/// Custody account for a raffle's pooled lamports.
#[account]
pub struct Treasury {
    pub raffle: Pubkey,
    pub bump: u8,
}

impl Treasury {
    /// Lamports that can leave the treasury without dropping it below `rent_floor`.
    pub fn spendable(lamports: u64, rent_floor: u64) -> u64 {
        lamports.saturating_sub(rent_floor)
    }

    /// Moves `amount` lamports from the treasury to `recipient`.
    ///
    /// Direct lamport arithmetic only works because the treasury is a PDA
    /// owned by this program.
    pub fn disburse<'info>(
        treasury: &AccountInfo<'info>,
        recipient: &AccountInfo<'info>,
        amount: u64,
        rent_floor: u64,
    ) -> Result<()> {
        require!(recipient.is_writable, RaffleError::PayoutFailed);
        require!(
            Self::spendable(treasury.lamports(), rent_floor) >= amount,
            RaffleError::TreasuryUnderfunded
        );

        treasury.sub_lamports(amount)?;
        recipient.add_lamports(amount)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::error::Error;

    const RENT_FLOOR: u64 = 1_176_240;

    #[test]
    fn rent_floor_is_never_spendable() {
        assert_eq!(Treasury::spendable(1_000, 900), 100);
        assert_eq!(Treasury::spendable(900, 900), 0);
        assert_eq!(Treasury::spendable(10, 900), 0);
    }

    #[test]
    fn disburse_moves_the_pool_and_keeps_the_rent_floor() {
        let treasury_key = Pubkey::new_unique();
        let recipient_key = Pubkey::new_unique();
        let system = Pubkey::default();
        let mut treasury_lamports = RENT_FLOOR + 30_000_000;
        let mut recipient_lamports = 5_000;
        let mut treasury_data = [0u8; TREASURY_ACCOUNT_SIZE];
        let mut recipient_data = [0u8; 0];
        let treasury = AccountInfo::new(
            &treasury_key,
            false,
            true,
            &mut treasury_lamports,
            &mut treasury_data,
            &crate::ID,
            false,
            0,
        );
        let recipient = AccountInfo::new(
            &recipient_key,
            false,
            true,
            &mut recipient_lamports,
            &mut recipient_data,
            &system,
            false,
            0,
        );

        Treasury::disburse(&treasury, &recipient, 30_000_000, RENT_FLOOR).unwrap();

        assert_eq!(treasury.lamports(), RENT_FLOOR);
        assert_eq!(recipient.lamports(), 30_005_000);
    }

    #[test]
    fn disburse_refuses_to_dip_into_the_rent_floor() {
        let treasury_key = Pubkey::new_unique();
        let recipient_key = Pubkey::new_unique();
        let system = Pubkey::default();
        let mut treasury_lamports = RENT_FLOOR + 29_999_999;
        let mut recipient_lamports = 0;
        let mut treasury_data = [0u8; TREASURY_ACCOUNT_SIZE];
        let mut recipient_data = [0u8; 0];
        let treasury = AccountInfo::new(
            &treasury_key,
            false,
            true,
            &mut treasury_lamports,
            &mut treasury_data,
            &crate::ID,
            false,
            0,
        );
        let recipient = AccountInfo::new(
            &recipient_key,
            false,
            true,
            &mut recipient_lamports,
            &mut recipient_data,
            &system,
            false,
            0,
        );

        let err = Treasury::disburse(&treasury, &recipient, 30_000_000, RENT_FLOOR).unwrap_err();

        assert_eq!(err, Error::from(RaffleError::TreasuryUnderfunded));
        assert_eq!(treasury.lamports(), RENT_FLOOR + 29_999_999);
        assert_eq!(recipient.lamports(), 0);
    }

    #[test]
    fn disburse_needs_a_writable_recipient() {
        let treasury_key = Pubkey::new_unique();
        let recipient_key = Pubkey::new_unique();
        let system = Pubkey::default();
        let mut treasury_lamports = RENT_FLOOR + 10;
        let mut recipient_lamports = 0;
        let mut treasury_data = [0u8; TREASURY_ACCOUNT_SIZE];
        let mut recipient_data = [0u8; 0];
        let treasury = AccountInfo::new(
            &treasury_key,
            false,
            true,
            &mut treasury_lamports,
            &mut treasury_data,
            &crate::ID,
            false,
            0,
        );
        let recipient = AccountInfo::new(
            &recipient_key,
            false,
            false,
            &mut recipient_lamports,
            &mut recipient_data,
            &system,
            false,
            0,
        );

        let err = Treasury::disburse(&treasury, &recipient, 10, RENT_FLOOR).unwrap_err();

        assert_eq!(err, Error::from(RaffleError::PayoutFailed));
        assert_eq!(treasury.lamports(), RENT_FLOOR + 10);
    }
}
