use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::primitives::DEFAULT_PUBLIC_EXPONENT;
use crate::protocol::{ProtocolParams, DEFAULT_RIS_LENGTH, DEFAULT_SHARE_LENGTH, IDENT_STR};
use crate::Result;

/// TOML file read by [`EcashConfig::from_env`].
pub const DEFAULT_CONFIG_PATH: &str = "config/ecash.toml";

/// Default bank modulus size.
pub const DEFAULT_KEY_BITS: usize = 2048;

/// E-cash configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcashConfig {
    /// Bank key settings.
    pub bank: BankSettings,
    /// Coin and challenge settings.
    pub protocol: ProtocolSettings,
}

/// Bank key settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BankSettings {
    /// RSA modulus size in bits.
    pub key_bits: usize,
    /// RSA public exponent.
    pub public_exponent: u64,
}

impl Default for BankSettings {
    fn default() -> Self {
        Self {
            key_bits: DEFAULT_KEY_BITS,
            public_exponent: DEFAULT_PUBLIC_EXPONENT,
        }
    }
}

/// Coin and challenge settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolSettings {
    /// Challenge positions per coin.
    pub ris_length: usize,
    /// Byte length of each identity share.
    pub share_length: usize,
    /// Identity sentinel.
    pub ident_str: String,
}

impl ProtocolSettings {
    /// Validates these settings into protocol parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParams`](crate::Error::InvalidParams) for a zero
    /// position count or a share too short for the sentinel.
    pub fn params(&self) -> Result<ProtocolParams> {
        ProtocolParams::with_sentinel(self.ris_length, self.share_length, &self.ident_str)
    }
}

impl Default for ProtocolSettings {
    fn default() -> Self {
        Self {
            ris_length: DEFAULT_RIS_LENGTH,
            share_length: DEFAULT_SHARE_LENGTH,
            ident_str: IDENT_STR.to_string(),
        }
    }
}

impl EcashConfig {
    /// Loads configuration from TOML file and environment variables.
    ///
    /// Configuration priority: environment variables > TOML file > defaults.
    /// Environment keys use the `ECASH_` prefix and `__` between levels, e.g.
    /// `ECASH_PROTOCOL__RIS_LENGTH=48`.
    #[allow(clippy::result_large_err)]
    pub fn from_env() -> figment::error::Result<Self> {
        Self::load(DEFAULT_CONFIG_PATH)
    }

    /// Like [`EcashConfig::from_env`] but reads the TOML layer from `path`.
    /// A missing file is skipped.
    #[allow(clippy::result_large_err)]
    pub fn load(path: impl AsRef<Path>) -> figment::error::Result<Self> {
        use figment::Figment;
        use figment::providers::{Env, Format, Serialized, Toml};

        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("ECASH_").split("__"))
            .extract()
    }
}
