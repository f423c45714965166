//! Anonymous electronic cash with double-spender tracing.
//!
//! A purchaser withdraws coins whose bodies are blind-signed by the bank, so
//! the bank cannot link a coin it later sees to the withdrawal. Each coin
//! carries commitments to split identity shares. On every spend the merchant
//! asks for one share per position, chosen at random, and records the answers
//! in a [`Transcript`]. Two different transcripts for the same coin reveal both
//! halves of at least one position with overwhelming probability, exposing the
//! purchaser; two identical transcripts expose a merchant depositing twice.
//!
//! ```no_run
//! use chaum_ecash::config::BankSettings;
//! use chaum_ecash::{Bank, Disclose, Merchant, ProtocolParams, SecureRng, Wallet};
//!
//! # fn main() -> chaum_ecash::Result<()> {
//! let mut rng = SecureRng::new();
//! let bank = Bank::new(&BankSettings::default(), &mut rng)?;
//! let params = ProtocolParams::default();
//!
//! let mut wallet = Wallet::new("alice", bank.public_key().clone(), params.clone())?;
//! let (id, blinded) = wallet.withdraw(20, &mut rng)?;
//! let blind_signature = bank.sign(&blinded)?;
//! let coin = wallet.complete(id, &blind_signature)?.clone();
//!
//! let merchant = Merchant::new(bank.public_key().clone(), params.clone());
//! let transcript = merchant.accept(&coin, &mut rng)?;
//!
//! let mut ledger = bank.ledger(params);
//! ledger.deposit(coin.body(), coin.signature(), transcript)?;
//! # Ok(())
//! # }
//! ```

/// Configuration loading.
pub mod config;
mod error;
/// Hashing, padding, randomness and RSA blind signatures.
pub mod primitives;
/// Coins, acceptance, deposits and forensics.
pub mod protocol;

pub use error::{Error, Result};
pub use primitives::{
    BankKeyPair, BankPublicKey, BlindSignature, BlindedMessage, BlindingFactor, Digest,
    SecureRng, Signature,
};
pub use protocol::{
    determine_cheater, investigate, verify_coin, Bank, Cheater, Coin, CoinBody, CoinId,
    DepositLedger, DepositOutcome, Disclose, Investigation, Merchant, PositionOutcome,
    ProtocolParams, RisElement, Share, Side, Transcript, UnsignedCoin, Wallet,
};
