use crate::{Error, Result};

/// Sentinel prefix of every encoded identity.
pub const IDENT_STR: &str = "IDENT";

/// Separator between [`IDENT_STR`] and the purchaser identity.
pub const IDENT_DELIMITER: char = ':';

/// Default number of challenge positions per coin.
///
/// A double spend escapes detection with probability `2^-DEFAULT_RIS_LENGTH`.
pub const DEFAULT_RIS_LENGTH: usize = 32;

/// Default byte length of each identity share.
pub const DEFAULT_SHARE_LENGTH: usize = 64;

/// Upper bound on challenge positions accepted from configuration or the wire.
pub const MAX_RIS_LENGTH: usize = 1024;

/// Upper bound on share length accepted from configuration or the wire.
pub const MAX_SHARE_LENGTH: usize = 4096;

/// Validated protocol-wide parameters shared by purchaser, merchant and bank.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProtocolParams {
    ris_length: usize,
    share_length: usize,
    ident_str: String,
}

impl ProtocolParams {
    /// Creates parameters with the default sentinel.
    ///
    /// # Errors
    ///
    /// See [`ProtocolParams::with_sentinel`].
    pub fn new(ris_length: usize, share_length: usize) -> Result<Self> {
        Self::with_sentinel(ris_length, share_length, IDENT_STR)
    }

    /// Creates parameters with a custom identity sentinel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParams`] if:
    /// - `ris_length` is zero (no detection guarantee) or above [`MAX_RIS_LENGTH`]
    /// - the sentinel is empty or contains the delimiter or a NUL byte
    /// - `share_length` cannot hold the sentinel, the delimiter and one identity byte
    pub fn with_sentinel(ris_length: usize, share_length: usize, ident_str: &str) -> Result<Self> {
        if ris_length == 0 {
            return Err(Error::InvalidParams(
                "ris_length must be at least 1".to_string(),
            ));
        }
        if ris_length > MAX_RIS_LENGTH {
            return Err(Error::InvalidParams(format!(
                "ris_length {ris_length} exceeds {MAX_RIS_LENGTH}"
            )));
        }
        if ident_str.is_empty() || ident_str.contains(IDENT_DELIMITER) || ident_str.contains('\0')
        {
            return Err(Error::InvalidParams(format!(
                "invalid identity sentinel {ident_str:?}"
            )));
        }
        let min_share = ident_str.len() + IDENT_DELIMITER.len_utf8() + 1;
        if share_length < min_share || share_length > MAX_SHARE_LENGTH {
            return Err(Error::InvalidParams(format!(
                "share_length {share_length} must be within {min_share}..={MAX_SHARE_LENGTH}"
            )));
        }

        Ok(Self {
            ris_length,
            share_length,
            ident_str: ident_str.to_string(),
        })
    }

    /// Number of challenge positions per coin.
    pub fn ris_length(&self) -> usize {
        self.ris_length
    }

    /// Byte length of every share.
    pub fn share_length(&self) -> usize {
        self.share_length
    }

    /// Identity sentinel.
    pub fn ident_str(&self) -> &str {
        &self.ident_str
    }

    /// Longest identity, in bytes, that fits into one share.
    pub fn max_identity_len(&self) -> usize {
        self.share_length - self.ident_str.len() - IDENT_DELIMITER.len_utf8()
    }
}

impl Default for ProtocolParams {
    fn default() -> Self {
        Self {
            ris_length: DEFAULT_RIS_LENGTH,
            share_length: DEFAULT_SHARE_LENGTH,
            ident_str: IDENT_STR.to_string(),
        }
    }
}
