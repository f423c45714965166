//! Identity splitting: per-position left/right shares and their commitments.
//!
//! For every position the purchaser draws a uniformly random left share and
//! sets the right share to `left XOR plaintext`, where the plaintext is
//! `IDENT_STR ":" identity` zero-padded to the share length. Either share alone
//! is a uniformly random string; both together give back the plaintext.

use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroize;

use super::{ProtocolParams, Share, Side, IDENT_DELIMITER};
use crate::primitives::{pad, Digest};
use crate::{Error, Result};

/// Why a pair of disclosed shares did not decode to an identity.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeFailure {
    /// The two shares have different lengths.
    #[error("share lengths differ ({left} vs {right})")]
    LengthMismatch {
        /// Length of the first share.
        left: usize,
        /// Length of the second share.
        right: usize,
    },

    /// The combined plaintext does not start with the sentinel and delimiter.
    #[error("sentinel prefix missing")]
    MissingSentinel,

    /// The identity bytes are not valid UTF-8.
    #[error("identity is not valid UTF-8")]
    NotUtf8,

    /// The sentinel is present but no identity follows it.
    #[error("identity is empty")]
    EmptyIdentity,
}

/// Secret shares for every position, held by the coin owner.
#[derive(Clone, Debug)]
pub struct IdentityShares {
    left: Vec<Share>,
    right: Vec<Share>,
}

impl IdentityShares {
    /// Rebuilds a share set, e.g. after decoding a stored coin.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParams`] if the two sides have different lengths.
    pub fn new(left: Vec<Share>, right: Vec<Share>) -> Result<Self> {
        if left.len() != right.len() {
            return Err(Error::InvalidParams(format!(
                "{} left shares but {} right shares",
                left.len(),
                right.len()
            )));
        }
        Ok(Self { left, right })
    }

    /// Returns the share at `position` on `side`.
    pub fn get(&self, side: Side, position: usize) -> Option<&Share> {
        match side {
            Side::Left => self.left.get(position),
            Side::Right => self.right.get(position),
        }
    }

    /// Number of positions.
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// Returns `true` if no positions are held.
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    /// Commitments to every share, in position order.
    pub fn commitments(&self) -> RisCommitments {
        RisCommitments {
            left: self.left.iter().map(Share::commitment).collect(),
            right: self.right.iter().map(Share::commitment).collect(),
        }
    }
}

/// Public hash commitments to both sides of every position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RisCommitments {
    left: Vec<Digest>,
    right: Vec<Digest>,
}

impl RisCommitments {
    /// Creates commitments from per-side digests.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParams`] if the two sides have different lengths.
    pub fn new(left: Vec<Digest>, right: Vec<Digest>) -> Result<Self> {
        if left.len() != right.len() {
            return Err(Error::InvalidParams(format!(
                "{} left hashes but {} right hashes",
                left.len(),
                right.len()
            )));
        }
        Ok(Self { left, right })
    }

    /// Returns the commitment at `position` on `side`.
    pub fn get(&self, side: Side, position: usize) -> Option<&Digest> {
        match side {
            Side::Left => self.left.get(position),
            Side::Right => self.right.get(position),
        }
    }

    /// Left-side commitments.
    pub fn left(&self) -> &[Digest] {
        &self.left
    }

    /// Right-side commitments.
    pub fn right(&self) -> &[Digest] {
        &self.right
    }

    /// Number of positions.
    pub fn len(&self) -> usize {
        self.left.len()
    }

    /// Returns `true` if there are no positions.
    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }
}

/// Encodes `identity` as the zero-padded share plaintext.
///
/// # Errors
///
/// Returns [`Error::InvalidIdentity`] if the identity is empty, contains a NUL
/// byte or is longer than [`ProtocolParams::max_identity_len`].
pub fn encode_identity(identity: &str, params: &ProtocolParams) -> Result<Vec<u8>> {
    if identity.is_empty() {
        return Err(Error::InvalidIdentity("identity is empty".to_string()));
    }
    if identity.contains('\0') {
        return Err(Error::InvalidIdentity(
            "identity contains a NUL byte".to_string(),
        ));
    }
    if identity.len() > params.max_identity_len() {
        return Err(Error::InvalidIdentity(format!(
            "identity is {} bytes, at most {} fit into a share",
            identity.len(),
            params.max_identity_len()
        )));
    }

    let mut plaintext = Vec::with_capacity(params.share_length());
    plaintext.extend_from_slice(params.ident_str().as_bytes());
    let mut delimiter = [0u8; 4];
    plaintext.extend_from_slice(IDENT_DELIMITER.encode_utf8(&mut delimiter).as_bytes());
    plaintext.extend_from_slice(identity.as_bytes());
    plaintext.resize(params.share_length(), 0);
    Ok(plaintext)
}

/// Parses a combined share plaintext back into the purchaser identity.
pub fn decode_identity(
    plaintext: &[u8],
    params: &ProtocolParams,
) -> core::result::Result<String, DecodeFailure> {
    let prefix = format!("{}{}", params.ident_str(), IDENT_DELIMITER);
    let rest = plaintext
        .strip_prefix(prefix.as_bytes())
        .ok_or(DecodeFailure::MissingSentinel)?;

    let end = rest.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
    let identity = core::str::from_utf8(&rest[..end]).map_err(|_| DecodeFailure::NotUtf8)?;
    if identity.is_empty() {
        return Err(DecodeFailure::EmptyIdentity);
    }
    Ok(identity.to_string())
}

/// Combines two disclosed shares and decodes the identity they hide.
pub fn reveal_identity(
    a: &Share,
    b: &Share,
    params: &ProtocolParams,
) -> core::result::Result<String, DecodeFailure> {
    let mut plaintext =
        pad::combine(a.as_bytes(), b.as_bytes()).ok_or(DecodeFailure::LengthMismatch {
            left: a.len(),
            right: b.len(),
        })?;
    let identity = decode_identity(&plaintext, params);
    plaintext.zeroize();
    identity
}

/// Splits `identity` into `ris_length` independent share pairs.
///
/// # Errors
///
/// Returns [`Error::InvalidIdentity`] if the identity cannot be encoded.
pub fn split_identity<R: RngCore + CryptoRng>(
    identity: &str,
    params: &ProtocolParams,
    rng: &mut R,
) -> Result<IdentityShares> {
    let mut plaintext = encode_identity(identity, params)?;

    let mut left = Vec::with_capacity(params.ris_length());
    let mut right = Vec::with_capacity(params.ris_length());
    for _ in 0..params.ris_length() {
        let mut pad_bytes = vec![0u8; params.share_length()];
        rng.fill_bytes(&mut pad_bytes);
        let other = pad::combine(&pad_bytes, &plaintext)
            .unwrap_or_else(|| unreachable!("pad and plaintext share one length"));
        left.push(Share::new(pad_bytes));
        right.push(Share::new(other));
    }
    plaintext.zeroize();

    Ok(IdentityShares { left, right })
}
