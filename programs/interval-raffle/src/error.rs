use anchor_lang::error_code;

#[error_code]
pub enum RaffleError {
    Overflow,
    #[msg("Payment is below the raffle entry fee")]
    InsufficientPayment,
    #[msg("Raffle is not open for entries")]
    RaffleNotOpen,
    #[msg("Draw conditions are not met")]
    UpkeepNotNeeded,
    #[msg("No randomness request is pending")]
    NoPendingRequest,
    #[msg("Request id does not match the pending randomness request")]
    RequestIdMismatch,
    #[msg("Only the configured coordinator can fulfill randomness")]
    OnlyCoordinatorCanFulfill,
    #[msg("Fulfillment carried no random words")]
    MissingRandomWords,
    #[msg("Raffle has no entrants to draw from")]
    NoEntrants,
    #[msg("Prize payout to the winner failed")]
    PayoutFailed,
    #[msg("Recipient account is not the selected winner")]
    RecipientMismatch,
    #[msg("Treasury cannot cover the payout above its rent-exempt balance")]
    TreasuryUnderfunded,
    #[msg("Entry payment did not reach the treasury")]
    EntryTransferFailed,
    #[msg("Draw interval must be positive")]
    InvalidDrawInterval,
    #[msg("Randomness configuration is out of range")]
    InvalidRandomnessConfig,
    InvalidTreasury,
    #[msg("Raffle account has no room for another entrant")]
    EntrantSlotMissing,
}
