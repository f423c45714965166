//! Cryptographically secure random number generator.

use rand_core::{CryptoRng, OsRng, RngCore};

use crate::protocol::Side;

/// Cryptographically secure random number generator.
///
/// This is a thin wrapper around `OsRng` that provides a consistent interface
/// for cryptographic randomness throughout the library: share generation,
/// blinding factors, coin ids and merchant challenge bits.
pub struct SecureRng(OsRng);

impl SecureRng {
    /// Creates a new cryptographically secure random number generator.
    pub fn new() -> Self {
        Self(OsRng)
    }
}

impl Default for SecureRng {
    fn default() -> Self {
        Self::new()
    }
}

impl RngCore for SecureRng {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.0.try_fill_bytes(dest)
    }
}

impl CryptoRng for SecureRng {}

/// Draws one unbiased challenge side.
///
/// Uses the low bit of a fresh OS-random byte: `0` selects the left share,
/// `1` the right share.
pub fn challenge_side<R: RngCore + CryptoRng>(rng: &mut R) -> Side {
    let mut byte = [0u8; 1];
    rng.fill_bytes(&mut byte);
    if byte[0] & 1 == 0 {
        Side::Left
    } else {
        Side::Right
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_distinct_buffers() {
        let mut rng = SecureRng::new();
        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        rng.fill_bytes(&mut a);
        rng.fill_bytes(&mut b);
        assert_ne!(a, b);
    }

    #[test]
    fn challenge_side_hits_both_sides() {
        let mut rng = SecureRng::new();
        let sides: Vec<Side> = (0..256).map(|_| challenge_side(&mut rng)).collect();
        assert!(sides.contains(&Side::Left));
        assert!(sides.contains(&Side::Right));
    }
}
