//! The coin and its issuance lifecycle.
//!
//! A purchaser builds an [`UnsignedCoin`]: identity shares, their commitments and
//! a blinded copy of the canonical coin body. After the bank signs the blinded
//! message, [`UnsignedCoin::unblind`] consumes the unsigned coin and yields a
//! read-only [`Coin`]. Use before signing and a second unblinding are therefore
//! ruled out by the types.

use num_bigint::BigUint;
use rand_core::{CryptoRng, RngCore};
use tracing::{debug, warn};

use super::codec::{put_len_prefixed, Reader};
use super::commitment::{split_identity, IdentityShares, RisCommitments};
use super::{CoinId, ProtocolParams, Share, Side, COIN_ID_LEN, MAX_RIS_LENGTH};
use crate::primitives::{
    BankPublicKey, BlindSignature, BlindedMessage, BlindingFactor, Digest, Signature, DIGEST_LEN,
};
use crate::{Error, Result};

/// Canonical encoding version.
const COIN_VERSION: u8 = 1;

/// Domain tag that prefixes every signed coin body.
const COIN_DOMAIN: &[u8; 16] = b"chaum-ecash/coin";

/// Domain tag for the purchaser pseudonym.
const PSEUDONYM_DOMAIN: &[u8] = b"chaum-ecash/pseudonym";

const MAX_KEY_COMPONENT_BYTES: usize = 2048;

/// Public, signed part of a coin.
///
/// The canonical encoding from [`CoinBody::to_bytes`] is exactly the message the
/// bank signs (through blinding). Verification always recomputes it from these
/// fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoinBody {
    id: CoinId,
    amount: u64,
    bank_key: BankPublicKey,
    commitments: RisCommitments,
    pseudonym: Digest,
}

impl CoinBody {
    /// Assembles a coin body from its fields.
    pub fn new(
        id: CoinId,
        amount: u64,
        bank_key: BankPublicKey,
        commitments: RisCommitments,
        pseudonym: Digest,
    ) -> Self {
        Self {
            id,
            amount,
            bank_key,
            commitments,
            pseudonym,
        }
    }

    /// Coin identifier.
    pub fn id(&self) -> CoinId {
        self.id
    }

    /// Face value.
    pub fn amount(&self) -> u64 {
        self.amount
    }

    /// Bank key the coin is bound to.
    pub fn bank_key(&self) -> &BankPublicKey {
        &self.bank_key
    }

    /// Share commitments.
    pub fn commitments(&self) -> &RisCommitments {
        &self.commitments
    }

    /// Purchaser pseudonym.
    pub fn pseudonym(&self) -> &Digest {
        &self.pseudonym
    }

    /// Canonical encoding, which is also the signed message.
    ///
    /// Format: `[version][domain (16)][id (16)][amount (8)][n_len (4)][n][e_len (4)][e]`
    /// `[count (4)][left hashes][right hashes][pseudonym (32)]`
    pub fn to_bytes(&self) -> Vec<u8> {
        let count = self.commitments.len();
        let mut out = Vec::with_capacity(96 + 2 * count * DIGEST_LEN);
        out.push(COIN_VERSION);
        out.extend_from_slice(COIN_DOMAIN);
        out.extend_from_slice(self.id.as_bytes());
        out.extend_from_slice(&self.amount.to_be_bytes());
        put_len_prefixed(&mut out, &self.bank_key.n().to_bytes_be());
        put_len_prefixed(&mut out, &self.bank_key.e().to_bytes_be());
        out.extend_from_slice(&(count as u32).to_be_bytes());
        for digest in self.commitments.left() {
            out.extend_from_slice(digest.as_bytes());
        }
        for digest in self.commitments.right() {
            out.extend_from_slice(digest.as_bytes());
        }
        out.extend_from_slice(self.pseudonym.as_bytes());
        out
    }

    /// Decodes a canonical coin body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encoding`] on truncation, trailing bytes, an unknown
    /// version or domain, or oversized fields, and [`Error::InvalidParams`] if the
    /// embedded bank key is unusable.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);

        let version = reader.u8("version").map_err(Error::Encoding)?;
        if version != COIN_VERSION {
            return Err(Error::Encoding(format!(
                "unsupported coin version: {version}"
            )));
        }
        let domain = reader.take(COIN_DOMAIN.len(), "domain").map_err(Error::Encoding)?;
        if domain != COIN_DOMAIN {
            return Err(Error::Encoding("unknown coin domain tag".to_string()));
        }

        let id = CoinId::from(
            reader
                .array::<COIN_ID_LEN>("coin id")
                .map_err(Error::Encoding)?,
        );
        let amount = reader.u64("amount").map_err(Error::Encoding)?;
        let n = reader
            .len_prefixed(MAX_KEY_COMPONENT_BYTES, "modulus")
            .map_err(Error::Encoding)?;
        let e = reader
            .len_prefixed(MAX_KEY_COMPONENT_BYTES, "exponent")
            .map_err(Error::Encoding)?;
        let bank_key = BankPublicKey::new(BigUint::from_bytes_be(n), BigUint::from_bytes_be(e))?;

        let count = reader.u32("commitment count").map_err(Error::Encoding)? as usize;
        if count == 0 || count > MAX_RIS_LENGTH {
            return Err(Error::Encoding(format!(
                "invalid commitment count: {count}"
            )));
        }
        let mut read_digests = |field: &str| -> Result<Vec<Digest>> {
            (0..count)
                .map(|_| {
                    reader
                        .array::<DIGEST_LEN>(field)
                        .map(Digest::from)
                        .map_err(Error::Encoding)
                })
                .collect()
        };
        let left = read_digests("left hash")?;
        let right = read_digests("right hash")?;
        let pseudonym = Digest::from(
            reader
                .array::<DIGEST_LEN>("pseudonym")
                .map_err(Error::Encoding)?,
        );
        reader.finish().map_err(Error::Encoding)?;

        Ok(Self {
            id,
            amount,
            bank_key,
            commitments: RisCommitments::new(left, right)?,
            pseudonym,
        })
    }
}

/// Checks a coin signature under `key`.
///
/// The message is recomputed from `body`, and `key` must be the key the coin is
/// bound to. Returns `true` iff the signature is valid over that exact message.
pub fn verify_coin(body: &CoinBody, signature: &Signature, key: &BankPublicKey) -> bool {
    if body.bank_key() != key {
        debug!(coin = %body.id(), "coin is bound to a different bank key");
        return false;
    }
    key.verify(&body.to_bytes(), signature)
}

/// Read access to a coin that a merchant can challenge.
///
/// Implemented by [`Coin`]; other holders (a coin decoded from storage, a remote
/// purchaser proxy) can implement it to take part in acceptance.
pub trait Disclose {
    /// The signed coin body.
    fn body(&self) -> &CoinBody;

    /// The unblinded bank signature.
    fn signature(&self) -> &Signature;

    /// Reveals the share at `position` on `side`.
    ///
    /// Read-only: asking twice for the same side and position returns the same
    /// bytes.
    fn get_ris(&self, side: Side, position: usize) -> Result<Share>;
}

/// A coin that has been prepared and blinded but not yet signed.
#[derive(Debug)]
pub struct UnsignedCoin {
    body: CoinBody,
    shares: IdentityShares,
    blinded: BlindedMessage,
    factor: BlindingFactor,
}

impl UnsignedCoin {
    /// Prepares a new coin for `identity` worth `amount` under `bank_key`.
    ///
    /// Splits the identity into share pairs, commits to them, derives a salted
    /// pseudonym and blinds the canonical body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentity`] if the identity does not fit into a
    /// share and [`Error::InvalidParams`] for a zero amount.
    pub fn new<R: RngCore + CryptoRng>(
        identity: &str,
        amount: u64,
        bank_key: &BankPublicKey,
        params: &ProtocolParams,
        rng: &mut R,
    ) -> Result<Self> {
        if amount == 0 {
            return Err(Error::InvalidParams("coin amount must be positive".to_string()));
        }

        let shares = split_identity(identity, params, rng)?;
        let commitments = shares.commitments();

        let mut salt = [0u8; 32];
        rng.fill_bytes(&mut salt);
        let pseudonym = Digest::of_parts(&[PSEUDONYM_DOMAIN, &salt, identity.as_bytes()]);

        let id = CoinId::random(rng);
        let body = CoinBody::new(id, amount, bank_key.clone(), commitments, pseudonym);
        let (blinded, factor) = bank_key.blind(&body.to_bytes(), rng);
        debug!(coin = %id, amount, positions = params.ris_length(), "prepared blinded coin");

        Ok(Self {
            body,
            shares,
            blinded,
            factor,
        })
    }

    /// Coin identifier.
    pub fn id(&self) -> CoinId {
        self.body.id
    }

    /// The coin body that will be signed.
    pub fn body(&self) -> &CoinBody {
        &self.body
    }

    /// The blinded message to hand to the bank.
    ///
    /// Always the same value for this coin, so a signing request can be retried
    /// without re-blinding.
    pub fn blinded_message(&self) -> &BlindedMessage {
        &self.blinded
    }

    /// Strips the blinding factor from the bank's response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSignature`] if the unblinded signature does not
    /// verify over the coin body.
    pub fn unblind(self, blind_signature: &BlindSignature) -> Result<Coin> {
        let signature = self.unblind_signature(blind_signature)?;
        Ok(self.into_coin(signature))
    }

    /// Unblinds and checks a signature without consuming the coin.
    pub(crate) fn unblind_signature(&self, blind_signature: &BlindSignature) -> Result<Signature> {
        let signature = self.factor.unblind(blind_signature, &self.body.bank_key);
        if !verify_coin(&self.body, &signature, &self.body.bank_key) {
            warn!(coin = %self.body.id, "bank returned a signature that does not unblind");
            return Err(Error::InvalidSignature(format!(
                "blind signature for coin {} does not verify after unblinding",
                self.body.id
            )));
        }
        Ok(signature)
    }

    pub(crate) fn into_coin(self, signature: Signature) -> Coin {
        debug!(coin = %self.body.id, "unblinded coin signature");
        Coin {
            body: self.body,
            shares: self.shares,
            signature,
        }
    }
}

/// A signed, spendable coin. Read-only.
#[derive(Clone, Debug)]
pub struct Coin {
    body: CoinBody,
    shares: IdentityShares,
    signature: Signature,
}

impl Coin {
    /// Reassembles a coin from stored parts.
    ///
    /// The parts are not checked against each other here: merchants verify the
    /// signature and every disclosed share during acceptance.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParams`] if the share count differs from the
    /// commitment count.
    pub fn from_parts(body: CoinBody, shares: IdentityShares, signature: Signature) -> Result<Self> {
        if shares.len() != body.commitments.len() {
            return Err(Error::InvalidParams(format!(
                "coin has {} share pairs but {} commitments",
                shares.len(),
                body.commitments.len()
            )));
        }
        Ok(Self {
            body,
            shares,
            signature,
        })
    }

    /// Coin identifier.
    pub fn id(&self) -> CoinId {
        self.body.id
    }

    /// Face value.
    pub fn amount(&self) -> u64 {
        self.body.amount
    }

    /// Secret identity shares.
    pub fn shares(&self) -> &IdentityShares {
        &self.shares
    }

    /// Verifies the coin signature under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSignature`] if [`verify_coin`] fails.
    pub fn verify(&self, key: &BankPublicKey) -> Result<()> {
        if verify_coin(&self.body, &self.signature, key) {
            Ok(())
        } else {
            Err(Error::InvalidSignature(format!(
                "coin {} is not signed by this bank",
                self.body.id
            )))
        }
    }
}

impl Disclose for Coin {
    fn body(&self) -> &CoinBody {
        &self.body
    }

    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn get_ris(&self, side: Side, position: usize) -> Result<Share> {
        self.shares.get(side, position).cloned().ok_or_else(|| {
            Error::InvalidParams(format!(
                "position {position} is out of range for {} positions",
                self.shares.len()
            ))
        })
    }
}
