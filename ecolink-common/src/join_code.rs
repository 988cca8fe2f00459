//! Organization join code generation
//!
//! Join codes are short public tokens handed out when an organization is
//! created; contributors present one to affiliate themselves with the
//! organization. Codes are 6 uppercase-alphanumeric characters (36^6
//! possible values). Uniqueness is enforced by the database; callers retry
//! with a fresh code on collision.

use rand::Rng;

/// Alphabet for join codes: uppercase letters and digits
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of a generated join code
pub const CODE_LENGTH: usize = 6;

/// Generate a random join code
pub fn generate() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..CODE_ALPHABET.len());
            CODE_ALPHABET[idx] as char
        })
        .collect()
}
