/// Seed prefix of the raffle PDA: ["raffle", authority].
pub const RAFFLE_SEED: &[u8] = b"raffle";

/// Seed prefix of the treasury PDA: ["treasury", raffle].
pub const TREASURY_SEED: &[u8] = b"treasury";

/// Every draw consumes exactly one random word.
pub const NUM_WORDS: u32 = 1;

/// Upper bound on the confirmation depth a raffle may ask the provider for.
pub const MAX_REQUEST_CONFIRMATIONS: u16 = 200;
