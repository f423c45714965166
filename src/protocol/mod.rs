/// Issuing bank.
pub mod bank;
mod codec;
/// Coin records, issuance and verification.
pub mod coin;
/// Identity shares and their commitments.
pub mod commitment;
/// Bank-side deposit ledger.
pub mod deposit;
/// Cheater determination.
pub mod forensics;
/// Coin ids, challenge sides and shares.
pub mod gadgets;
/// Merchant acceptance protocol.
pub mod merchant;
/// Protocol-wide parameters.
pub mod params;
/// Acceptance transcripts.
pub mod transcript;
/// Purchaser wallet.
pub mod wallet;

pub use bank::Bank;
pub use coin::{verify_coin, Coin, CoinBody, Disclose, UnsignedCoin};
pub use commitment::{DecodeFailure, IdentityShares, RisCommitments};
pub use deposit::{DepositLedger, DepositOutcome};
pub use forensics::{determine_cheater, investigate, Cheater, Investigation, PositionOutcome};
pub use gadgets::{CoinId, Share, Side, COIN_ID_LEN};
pub use merchant::Merchant;
pub use params::{
    ProtocolParams, DEFAULT_RIS_LENGTH, DEFAULT_SHARE_LENGTH, IDENT_DELIMITER, IDENT_STR,
    MAX_RIS_LENGTH, MAX_SHARE_LENGTH,
};
pub use transcript::{RisElement, Transcript};
pub use wallet::Wallet;
