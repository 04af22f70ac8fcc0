use anchor_lang::prelude::*;
use anchor_lang::solana_program::keccak;
use arrayref::array_ref;

// 32 key_hash + 8 subscription_id + 4 callback_compute_limit + 2 request_confirmations + 4 num_words
pub const RANDOMNESS_CONFIG_SIZE: usize = 32 + 8 + 4 + 2 + 4;

// 1 option tag + 8 request_id + 8 requested_at
pub const PENDING_REQUEST_SIZE: usize = 1 + 8 + 8;

/// Routing information handed to the randomness provider with every request.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RandomnessConfig {
    /// Provider channel (gas lane) the request is routed through
    pub key_hash: [u8; 32],
    /// Provider subscription billed for the request
    pub subscription_id: u64,
    /// Compute budget the provider must attach to the callback
    pub callback_compute_limit: u32,
    /// Confirmations the provider waits before answering
    pub request_confirmations: u16,
    /// Random words asked for per request
    pub num_words: u32,
}

/// The single outstanding randomness request of a raffle.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingRequest {
    pub request_id: u64,
    pub requested_at: i64,
}

/// Derives the correlation id of a randomness request.
///
/// The id commits to the provider channel, the requesting raffle, the
/// subscription and a per-raffle nonce, so two requests from the same raffle
/// never share an id.
pub fn derive_request_id(config: &RandomnessConfig, raffle: &Pubkey, nonce: u64) -> u64 {
    let digest = keccak::hashv(&[
        &config.key_hash,
        raffle.as_ref(),
        &config.subscription_id.to_le_bytes(),
        &nonce.to_le_bytes(),
    ])
    .to_bytes();

    u64::from_le_bytes(*array_ref![digest, 0, 8])
}

/// Reduces a 256-bit big-endian random word modulo `modulus`.
///
/// Returns `None` for a zero modulus. The result is always `< modulus`.
pub fn reduce_word(word: &[u8; 32], modulus: u64) -> Option<u64> {
    if modulus == 0 {
        return None;
    }
    let modulus = modulus as u128;

    // acc < modulus <= u64::MAX, so (acc << 8) | byte fits in u128
    let remainder = word
        .iter()
        .fold(0u128, |acc, byte| ((acc << 8) | *byte as u128) % modulus);

    Some(remainder as u64)
}

#[cfg(test)]
pub(crate) fn word_from_u64(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RandomnessConfig {
        RandomnessConfig {
            key_hash: [7u8; 32],
            subscription_id: 2417,
            callback_compute_limit: 500_000,
            request_confirmations: 3,
            num_words: 1,
        }
    }

    #[test]
    fn small_words_reduce_like_plain_modulo() {
        assert_eq!(reduce_word(&word_from_u64(5), 3), Some(2));
        assert_eq!(reduce_word(&word_from_u64(7), 1), Some(0));
        assert_eq!(reduce_word(&word_from_u64(2), 10), Some(2));
        assert_eq!(reduce_word(&word_from_u64(u64::MAX), 1_000), Some(u64::MAX % 1_000));
    }

    #[test]
    fn full_width_words_stay_in_range() {
        let word = [0xffu8; 32];
        for modulus in [1u64, 2, 3, 7, 255, 256, 1_000_003, u64::MAX] {
            let index = reduce_word(&word, modulus).unwrap();
            assert!(index < modulus);
        }
        // 2^256 - 1 is divisible by 3, 5, 17 and 257
        assert_eq!(reduce_word(&word, 3), Some(0));
        assert_eq!(reduce_word(&word, 257), Some(0));
    }

    #[test]
    fn upper_bytes_matter() {
        // 2^128 mod 7 == 2^(128 mod 3) == 4
        let mut word = [0u8; 32];
        word[15] = 1;
        assert_eq!(reduce_word(&word, 7), Some(4));
    }

    #[test]
    fn zero_modulus_has_no_index() {
        assert_eq!(reduce_word(&word_from_u64(9), 0), None);
    }

    #[test]
    fn request_ids_differ_per_nonce_and_raffle() {
        let raffle = Pubkey::new_unique();
        let other = Pubkey::new_unique();
        let config = config();

        let first = derive_request_id(&config, &raffle, 0);
        assert_eq!(first, derive_request_id(&config, &raffle, 0));
        assert_ne!(first, derive_request_id(&config, &raffle, 1));
        assert_ne!(first, derive_request_id(&config, &other, 0));

        let mut rerouted = config;
        rerouted.subscription_id += 1;
        assert_ne!(first, derive_request_id(&rerouted, &raffle, 0));
    }
}
