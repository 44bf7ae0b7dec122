//! Per-request nonce and timestamp.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

const MIN_NONCE_DIGITS: usize = 6;
const MAX_NONCE_DIGITS: usize = 9;

/// Generates a random numeric nonce of 6 to 9 digits.
///
/// The first digit is never zero so the value reads the same as a number.
pub fn generate_nonce() -> String {
    let mut rng = rand::thread_rng();
    let len = rng.gen_range(MIN_NONCE_DIGITS..=MAX_NONCE_DIGITS);
    let mut nonce = String::with_capacity(len);
    nonce.push(char::from(b'0' + rng.gen_range(1..=9u8)));
    for _ in 1..len {
        nonce.push(char::from(b'0' + rng.gen_range(0..=9u8)));
    }
    nonce
}

/// Current time in whole seconds since the unix epoch.
pub fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
