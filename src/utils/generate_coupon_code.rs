use rand::Rng;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub const DEFAULT_CODE_LENGTH: usize = 8;

/// Draws a code of `length` characters from A-Z and 0-9 using the thread-local CSPRNG.
///
/// Uniqueness is only probabilistic; the unique constraint on `code` rejects collisions.
pub fn generate_coupon_code(length: usize) -> String {
    let mut rng = rand::rng();

    (0..length)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}
