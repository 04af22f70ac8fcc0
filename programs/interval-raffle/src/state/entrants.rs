use anchor_lang::prelude::*;

use crate::{
    error::RaffleError,
    state::raffle::{ENTRANT_SLOT_SIZE, RAFFLE_BASE_ACCOUNT_SIZE},
};

// Entrants live past the raffle header as raw 32-byte keys, one slot per
// entry, and are never deserialized as a whole.

/// The entrant slot region of a raffle account's data.
pub fn entrant_slots(account_data: &[u8]) -> &[u8] {
    account_data
        .get(RAFFLE_BASE_ACCOUNT_SIZE..)
        .unwrap_or_default()
}

pub fn entrant_slots_mut(account_data: &mut [u8]) -> &mut [u8] {
    account_data
        .get_mut(RAFFLE_BASE_ACCOUNT_SIZE..)
        .unwrap_or_default()
}

pub fn read_entrant(slots: &[u8], index: usize) -> Option<Pubkey> {
    let start = index.checked_mul(ENTRANT_SLOT_SIZE)?;
    let end = start.checked_add(ENTRANT_SLOT_SIZE)?;
    slots
        .get(start..end)
        .and_then(|slot| Pubkey::try_from(slot).ok())
}

pub fn write_entrant(slots: &mut [u8], index: usize, entrant: &Pubkey) -> Result<()> {
    let start = index
        .checked_mul(ENTRANT_SLOT_SIZE)
        .ok_or(RaffleError::Overflow)?;
    let end = start
        .checked_add(ENTRANT_SLOT_SIZE)
        .ok_or(RaffleError::Overflow)?;
    let slot = slots
        .get_mut(start..end)
        .ok_or(RaffleError::EntrantSlotMissing)?;
    slot.copy_from_slice(entrant.as_ref());
    Ok(())
}

/// Zeroes the first `count` slots.
pub fn clear_entrants(slots: &mut [u8], count: usize) {
    let end = count
        .saturating_mul(ENTRANT_SLOT_SIZE)
        .min(slots.len());
    slots[..end].fill(0);
}
