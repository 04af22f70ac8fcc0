use anchor_lang::prelude::*;

use crate::{
    constants::NUM_WORDS,
    error::RaffleError,
    state::{
        entrants::{clear_entrants, read_entrant, write_entrant},
        randomness::{
            derive_request_id, reduce_word, PendingRequest, RandomnessConfig,
            PENDING_REQUEST_SIZE, RANDOMNESS_CONFIG_SIZE,
        },
    },
};

// Space calculation:
// 8 (discriminator) +
// 1 (bump) +
// 32 (authority) +
// 32 (coordinator) +
// 32 (treasury) +
// 8 (entry_fee) +
// 8 (draw_interval) +
// 50 (randomness_config) +
// 1 (raffle_state) +
// 8 (total_entrants) +
// 8 (pooled_funds) +
// 8 (last_settlement_timestamp) +
// 17 (pending_request: Option<PendingRequest>) +
// 8 (request_nonce) +
// 33 (recent_winner: Option<Pubkey>) +
// 8 (last_payout_amount) =
// 262 bytes, then 32 per entrant slot. Optional fields serialize shorter
// when empty, so slots always start at this fixed offset.
pub const RAFFLE_BASE_ACCOUNT_SIZE: usize = 8
    + 1
    + 32
    + 32
    + 32
    + 8
    + 8
    + RANDOMNESS_CONFIG_SIZE
    + 1
    + 8
    + 8
    + 8
    + PENDING_REQUEST_SIZE
    + 8
    + 33
    + 8;

pub const ENTRANT_SLOT_SIZE: usize = 32;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RaffleState {
    Open = 0,
    Calculating = 1,
}

/// Answer of the upkeep check, with the individual conditions so callers can
/// tell why a draw is not due yet.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpkeepStatus {
    pub upkeep_needed: bool,
    pub is_open: bool,
    pub interval_elapsed: bool,
    pub has_entrants: bool,
    pub has_balance: bool,
    pub raffle_state: RaffleState,
    pub balance: u64,
    pub entrant_count: u64,
    pub seconds_since_settlement: i64,
}

/// Outcome of a committed settlement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settlement {
    pub request_id: u64,
    pub winner: Pubkey,
    pub winner_index: u64,
    pub amount: u64,
    pub settled_at: i64,
    /// When the answered request was opened
    pub requested_at: i64,
}

#[account]
pub struct Raffle {
    pub bump: u8,
    pub authority: Pubkey,
    /// Provider identity allowed to deliver randomness
    pub coordinator: Pubkey,
    pub treasury: Pubkey,
    pub entry_fee: u64,
    pub draw_interval: i64,
    pub randomness_config: RandomnessConfig,
    pub raffle_state: RaffleState,
    /// Entries in the current cycle; each one fills a slot past the header
    pub total_entrants: u64,
    pub pooled_funds: u64,
    pub last_settlement_timestamp: i64,
    pub pending_request: Option<PendingRequest>,
    pub request_nonce: u64,
    pub recent_winner: Option<Pubkey>,
    pub last_payout_amount: u64,
}

impl Raffle {
    /// Account space needed to hold `entrant_slots` entrants.
    pub fn space_for(entrant_slots: usize) -> usize {
        RAFFLE_BASE_ACCOUNT_SIZE + entrant_slots * ENTRANT_SLOT_SIZE
    }

    #[allow(clippy::too_many_arguments)]
    pub fn new(
        bump: u8,
        authority: Pubkey,
        coordinator: Pubkey,
        treasury: Pubkey,
        entry_fee: u64,
        draw_interval: i64,
        randomness_config: RandomnessConfig,
        now: i64,
    ) -> Self {
        Self {
            bump,
            authority,
            coordinator,
            treasury,
            entry_fee,
            draw_interval,
            randomness_config: RandomnessConfig {
                num_words: NUM_WORDS,
                ..randomness_config
            },
            raffle_state: RaffleState::Open,
            total_entrants: 0,
            pooled_funds: 0,
            last_settlement_timestamp: now,
            pending_request: None,
            request_nonce: 0,
            recent_winner: None,
            last_payout_amount: 0,
        }
    }

    pub fn entrant_count(&self) -> u64 {
        self.total_entrants
    }

    /// Entrant at `index` in the current cycle, read from `slots`.
    pub fn entrant(&self, slots: &[u8], index: u64) -> Option<Pubkey> {
        if index >= self.total_entrants {
            return None;
        }
        read_entrant(slots, usize::try_from(index).ok()?)
    }

    pub fn key_hash(&self) -> [u8; 32] {
        self.randomness_config.key_hash
    }

    pub fn subscription_id(&self) -> u64 {
        self.randomness_config.subscription_id
    }

    pub fn request_confirmations(&self) -> u16 {
        self.randomness_config.request_confirmations
    }

    pub fn callback_compute_limit(&self) -> u32 {
        self.randomness_config.callback_compute_limit
    }

    pub fn num_words(&self) -> u32 {
        self.randomness_config.num_words
    }

    pub fn pending_request_id(&self) -> Option<u64> {
        self.pending_request.map(|request| request.request_id)
    }

    /// Records one entry for `participant`.
    ///
    /// Each call is one ticket regardless of how far `payment` exceeds the
    /// entry fee; the whole payment goes to the pool. The participant is
    /// written to the next free slot in `slots`.
    pub fn enter(&mut self, slots: &mut [u8], participant: Pubkey, payment: u64) -> Result<()> {
        require!(
            self.raffle_state == RaffleState::Open,
            RaffleError::RaffleNotOpen
        );
        require!(
            payment >= self.entry_fee,
            RaffleError::InsufficientPayment
        );

        let pooled_funds = self
            .pooled_funds
            .checked_add(payment)
            .ok_or(RaffleError::Overflow)?;
        let total_entrants = self
            .total_entrants
            .checked_add(1)
            .ok_or(RaffleError::Overflow)?;
        let index = usize::try_from(self.total_entrants).map_err(|_| RaffleError::Overflow)?;

        write_entrant(slots, index, &participant)?;
        self.total_entrants = total_entrants;
        self.pooled_funds = pooled_funds;

        Ok(())
    }

    pub fn upkeep_status(&self, now: i64) -> UpkeepStatus {
        let seconds_since_settlement = now.saturating_sub(self.last_settlement_timestamp);
        let is_open = self.raffle_state == RaffleState::Open;
        let interval_elapsed = seconds_since_settlement >= self.draw_interval;
        let has_entrants = self.total_entrants > 0;
        let has_balance = self.pooled_funds > 0;

        UpkeepStatus {
            upkeep_needed: is_open && interval_elapsed && has_entrants && has_balance,
            is_open,
            interval_elapsed,
            has_entrants,
            has_balance,
            raffle_state: self.raffle_state,
            balance: self.pooled_funds,
            entrant_count: self.entrant_count(),
            seconds_since_settlement,
        }
    }

    pub fn is_draw_ready(&self, now: i64) -> bool {
        self.upkeep_status(now).upkeep_needed
    }

    /// Moves the raffle into `Calculating` and opens a randomness request.
    ///
    /// `raffle` is the address of this account; it is mixed into the request
    /// id. Returns the id the provider must answer with.
    pub fn begin_draw(&mut self, raffle: &Pubkey, now: i64) -> Result<u64> {
        let status = self.upkeep_status(now);
        if !status.upkeep_needed {
            msg!(
                "Upkeep not needed: balance={}, entrants={}, state={:?}, elapsed={}s of {}s",
                status.balance,
                status.entrant_count,
                status.raffle_state,
                status.seconds_since_settlement,
                self.draw_interval
            );
            return err!(RaffleError::UpkeepNotNeeded);
        }

        let request_id = derive_request_id(&self.randomness_config, raffle, self.request_nonce);
        let request_nonce = self
            .request_nonce
            .checked_add(1)
            .ok_or(RaffleError::Overflow)?;

        self.request_nonce = request_nonce;
        self.raffle_state = RaffleState::Calculating;
        self.pending_request = Some(PendingRequest {
            request_id,
            requested_at: now,
        });

        Ok(request_id)
    }

    /// Checks that `request_id` answers the outstanding request.
    pub fn validate_fulfillment(&self, request_id: u64) -> Result<()> {
        let pending = self.pending_request.ok_or(RaffleError::NoPendingRequest)?;
        if pending.request_id != request_id {
            msg!(
                "Rejected fulfillment for request {}, pending request is {}",
                request_id,
                pending.request_id
            );
            return err!(RaffleError::RequestIdMismatch);
        }
        Ok(())
    }

    /// Picks the entrant at `word mod entrant_count`.
    pub fn select_winner(&self, slots: &[u8], word: &[u8; 32]) -> Result<(u64, Pubkey)> {
        let winner_index =
            reduce_word(word, self.entrant_count()).ok_or(RaffleError::NoEntrants)?;
        let winner = self
            .entrant(slots, winner_index)
            .ok_or(RaffleError::EntrantSlotMissing)?;
        Ok((winner_index, winner))
    }

    /// Settles the pending draw with the provider's answer.
    ///
    /// `payout` moves the pool to the winner. The ledger is only touched once
    /// it returns `Ok`; on failure the raffle stays `Calculating` with the same
    /// pending request and `PayoutFailed` is returned. On success the used
    /// `slots` are zeroed for the next cycle.
    pub fn settle<F>(
        &mut self,
        slots: &mut [u8],
        request_id: u64,
        random_words: &[[u8; 32]],
        now: i64,
        payout: F,
    ) -> Result<Settlement>
    where
        F: FnOnce(&Pubkey, u64) -> Result<()>,
    {
        self.validate_fulfillment(request_id)?;
        let requested_at = self
            .pending_request
            .map(|request| request.requested_at)
            .unwrap_or(self.last_settlement_timestamp);
        let word = random_words.first().ok_or(RaffleError::MissingRandomWords)?;
        let (winner_index, winner) = self.select_winner(slots, word)?;
        let amount = self.pooled_funds;

        if let Err(cause) = payout(&winner, amount) {
            msg!("Payout of {} lamports to {} failed: {}", amount, winner, cause);
            return err!(RaffleError::PayoutFailed);
        }

        let settled_at = now.max(self.last_settlement_timestamp);
        self.recent_winner = Some(winner);
        self.last_payout_amount = amount;
        self.last_settlement_timestamp = settled_at;
        clear_entrants(slots, usize::try_from(self.total_entrants).unwrap_or(usize::MAX));
        self.total_entrants = 0;
        self.pooled_funds = 0;
        self.pending_request = None;
        self.raffle_state = RaffleState::Open;

        Ok(Settlement {
            request_id,
            winner,
            winner_index,
            amount,
            settled_at,
            requested_at,
        })
    }
}
