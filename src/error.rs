//! Error types for the e-cash protocol.

use crate::protocol::CoinId;

/// Specialisation of `std::Result` for this crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Main error types for the library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The bank key pair could not be generated. No coin can be issued.
    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    /// The bank refused or failed to sign a blinded message.
    #[error("Signing failed: {0}")]
    Signing(String),

    /// A coin signature did not verify under the bank key.
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// A disclosed share does not match its signed commitment.
    #[error("RIS tamper detected at position {position}")]
    RisTamperDetected {
        /// Challenge position whose disclosure failed the hash check.
        position: usize,
    },

    /// An acceptance transcript has the wrong shape or coin id.
    #[error("Malformed transcript: {0}")]
    MalformedTranscript(String),

    /// The purchaser identity cannot be encoded into fixed-length shares.
    #[error("Invalid identity: {0}")]
    InvalidIdentity(String),

    /// Protocol parameters or coin shape are unusable.
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// A blind signature arrived for a coin that was already unblinded.
    #[error("Coin {0} was already unblinded")]
    AlreadyUnblinded(CoinId),

    /// The wallet holds no pending coin with this id.
    #[error("Unknown coin {0}")]
    UnknownCoin(CoinId),

    /// Canonical binary decoding failed.
    #[error("Encoding error: {0}")]
    Encoding(String),
}
