//! Cryptographic building blocks consumed by the protocol:
//! - **hash**: SHA-256 digests for commitments
//! - **pad**: one-time-pad combination of shares
//! - **rng**: secure randomness and challenge bits
//! - **rsa**: RSA blind signatures

/// SHA-256 digests.
pub mod hash;
/// One-time-pad XOR.
pub mod pad;
/// Cryptographically secure random number generation.
pub mod rng;
/// RSA blind signatures.
pub mod rsa;

pub use hash::{Digest, DIGEST_LEN};
pub use rng::{challenge_side, SecureRng};
pub use self::rsa::{
    BankKeyPair, BankPublicKey, BlindSignature, BlindedMessage, BlindingFactor, Signature,
    DEFAULT_PUBLIC_EXPONENT, FDH_EXTRA_BYTES, MAX_KEY_BITS, MIN_KEY_BITS,
};
