//! Small protocol types shared by every stage: coin ids, challenge sides and
//! identity shares.

use core::fmt;

use rand_core::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::primitives::Digest;

/// Byte length of a [`CoinId`].
pub const COIN_ID_LEN: usize = 16;

/// Unique, random coin identifier (the coin's guid).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CoinId([u8; COIN_ID_LEN]);

impl CoinId {
    /// Draws a fresh random id.
    pub fn random<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut bytes = [0u8; COIN_ID_LEN];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Returns the raw id bytes.
    pub fn as_bytes(&self) -> &[u8; COIN_ID_LEN] {
        &self.0
    }
}

impl From<[u8; COIN_ID_LEN]> for CoinId {
    fn from(bytes: [u8; COIN_ID_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for CoinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for CoinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CoinId({self})")
    }
}

/// Which half of an identity share pair a merchant asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// Left share (challenge bit 0).
    Left,
    /// Right share (challenge bit 1).
    Right,
}

impl Side {
    /// Returns `true` for [`Side::Left`].
    pub fn is_left(self) -> bool {
        matches!(self, Side::Left)
    }

    pub(crate) fn to_byte(self) -> u8 {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }

    pub(crate) fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(Side::Left),
            1 => Some(Side::Right),
            _ => None,
        }
    }
}

/// One fixed-length identity share.
///
/// A share on its own is a uniformly random string; only the pair at a position
/// reveals the purchaser identity. Zeroized when dropped.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Share(Vec<u8>);

impl Share {
    /// Wraps raw share bytes.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Returns the share bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Byte length of the share.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the share holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Commitment to this share.
    pub fn commitment(&self) -> Digest {
        Digest::of(&self.0)
    }
}

impl fmt::Debug for Share {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Share({} bytes)", self.0.len())
    }
}
