//! Acceptance transcripts: the shares one merchant saw for one coin.

use super::codec::{put_len_prefixed, Reader};
use super::commitment::RisCommitments;
use super::{CoinId, Share, Side, COIN_ID_LEN, MAX_RIS_LENGTH, MAX_SHARE_LENGTH};
use crate::primitives::{Digest, DIGEST_LEN};
use crate::{Error, Result};

/// Canonical encoding version.
const TRANSCRIPT_VERSION: u8 = 1;

/// One disclosed share and the commitment it was checked against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RisElement {
    position: usize,
    side: Side,
    value: Share,
    hash: Digest,
}

impl RisElement {
    /// Creates a RIS element.
    pub fn new(position: usize, side: Side, value: Share, hash: Digest) -> Self {
        Self {
            position,
            side,
            value,
            hash,
        }
    }

    /// Challenge position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Disclosed side.
    pub fn side(&self) -> Side {
        self.side
    }

    /// Returns `true` if the left share was disclosed.
    pub fn is_left(&self) -> bool {
        self.side.is_left()
    }

    /// Disclosed share.
    pub fn value(&self) -> &Share {
        &self.value
    }

    /// Commitment the share was checked against.
    pub fn hash(&self) -> &Digest {
        &self.hash
    }

    /// Checks that the share hashes to the recorded commitment and that the
    /// recorded commitment is the coin's commitment for this side and position.
    pub fn matches(&self, commitments: &RisCommitments) -> bool {
        commitments.get(self.side, self.position) == Some(&self.hash)
            && self.value.commitment() == self.hash
    }
}

/// Ordered sequence of RIS elements from one acceptance run.
///
/// Element `i` always has position `i`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transcript {
    coin_id: CoinId,
    elements: Vec<RisElement>,
}

impl Transcript {
    /// Creates a transcript, checking the position ordering.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedTranscript`] if the transcript is empty or
    /// element `i` does not carry position `i`.
    pub fn new(coin_id: CoinId, elements: Vec<RisElement>) -> Result<Self> {
        if elements.is_empty() {
            return Err(Error::MalformedTranscript(
                "transcript has no elements".to_string(),
            ));
        }
        if let Some((i, element)) = elements
            .iter()
            .enumerate()
            .find(|(i, e)| e.position != *i)
        {
            return Err(Error::MalformedTranscript(format!(
                "element {i} carries position {}",
                element.position
            )));
        }
        Ok(Self { coin_id, elements })
    }

    /// Coin this transcript belongs to.
    pub fn coin_id(&self) -> CoinId {
        self.coin_id
    }

    /// Elements in position order.
    pub fn elements(&self) -> &[RisElement] {
        &self.elements
    }

    /// Number of positions.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Always `false` for a constructed transcript.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Checks coin id and length against what the caller expects.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedTranscript`] on any mismatch.
    pub fn ensure_shape(&self, coin_id: CoinId, ris_length: usize) -> Result<()> {
        if self.coin_id != coin_id {
            return Err(Error::MalformedTranscript(format!(
                "transcript is for coin {}, expected {coin_id}",
                self.coin_id
            )));
        }
        if self.elements.len() != ris_length {
            return Err(Error::MalformedTranscript(format!(
                "transcript has {} elements, expected {ris_length}",
                self.elements.len()
            )));
        }
        Ok(())
    }

    /// Canonical encoding.
    ///
    /// Format: `[version][coin id (16)][count (4)]` then per element
    /// `[position (4)][side (1)][share_len (4)][share][hash (32)]`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.push(TRANSCRIPT_VERSION);
        out.extend_from_slice(self.coin_id.as_bytes());
        out.extend_from_slice(&(self.elements.len() as u32).to_be_bytes());
        for element in &self.elements {
            out.extend_from_slice(&(element.position as u32).to_be_bytes());
            out.push(element.side.to_byte());
            put_len_prefixed(&mut out, element.value.as_bytes());
            out.extend_from_slice(element.hash.as_bytes());
        }
        out
    }

    /// Decodes a canonical transcript.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedTranscript`] for any decoding or ordering error.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);

        let version = reader.u8("version").map_err(Error::MalformedTranscript)?;
        if version != TRANSCRIPT_VERSION {
            return Err(Error::MalformedTranscript(format!(
                "unsupported transcript version: {version}"
            )));
        }
        let coin_id = CoinId::from(
            reader
                .array::<COIN_ID_LEN>("coin id")
                .map_err(Error::MalformedTranscript)?,
        );
        let count = reader
            .u32("element count")
            .map_err(Error::MalformedTranscript)? as usize;
        if count == 0 || count > MAX_RIS_LENGTH {
            return Err(Error::MalformedTranscript(format!(
                "invalid element count: {count}"
            )));
        }

        let mut elements = Vec::with_capacity(count);
        for _ in 0..count {
            let position = reader
                .u32("position")
                .map_err(Error::MalformedTranscript)? as usize;
            let side_byte = reader.u8("side").map_err(Error::MalformedTranscript)?;
            let side = Side::from_byte(side_byte).ok_or_else(|| {
                Error::MalformedTranscript(format!("invalid side byte: {side_byte}"))
            })?;
            let value = reader
                .len_prefixed(MAX_SHARE_LENGTH, "share")
                .map_err(Error::MalformedTranscript)?;
            let hash = reader
                .array::<DIGEST_LEN>("hash")
                .map_err(Error::MalformedTranscript)?;
            elements.push(RisElement::new(
                position,
                side,
                Share::new(value.to_vec()),
                Digest::from(hash),
            ));
        }
        reader.finish().map_err(Error::MalformedTranscript)?;

        Self::new(coin_id, elements)
    }
}
