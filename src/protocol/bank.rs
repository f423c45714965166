use rand_core::{CryptoRng, RngCore};
use tracing::{debug, info};

use super::{DepositLedger, ProtocolParams};
use crate::config::BankSettings;
use crate::primitives::{BankKeyPair, BankPublicKey, BlindSignature, BlindedMessage};
use crate::Result;

/// The issuing bank.
///
/// Created once at startup and passed explicitly to whoever needs the key.
/// Signs blinded coins without seeing their contents.
#[derive(Debug)]
pub struct Bank {
    keys: BankKeyPair,
}

impl Bank {
    /// Generates a fresh bank key from `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyGeneration`](crate::Error::KeyGeneration) if the key
    /// cannot be generated; this is fatal for the whole issuing setup.
    pub fn new<R: RngCore + CryptoRng>(settings: &BankSettings, rng: &mut R) -> Result<Self> {
        let keys = BankKeyPair::generate(settings.key_bits, settings.public_exponent, rng)?;
        info!(bits = settings.key_bits, "bank key ready");
        Ok(Self { keys })
    }

    /// Wraps an existing key pair.
    pub fn from_key_pair(keys: BankKeyPair) -> Self {
        Self { keys }
    }

    /// Public key merchants and purchasers verify against.
    pub fn public_key(&self) -> &BankPublicKey {
        self.keys.public_key()
    }

    /// Blind-signs a withdrawal request.
    ///
    /// Deterministic: repeating a request with the same blinded message yields
    /// the same signature, so a lost response can be re-requested safely.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Signing`](crate::Error::Signing) for a blinded message
    /// outside `1..n`.
    pub fn sign(&self, blinded: &BlindedMessage) -> Result<BlindSignature> {
        let signature = self.keys.sign(blinded)?;
        debug!("issued blind signature");
        Ok(signature)
    }

    /// Opens an empty deposit ledger for coins signed by this bank.
    pub fn ledger(&self, params: ProtocolParams) -> DepositLedger {
        DepositLedger::new(self.public_key().clone(), params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::MIN_KEY_BITS;
    use crate::{Error, SecureRng};

    #[test]
    fn rejects_undersized_key_settings() {
        let settings = BankSettings {
            key_bits: 128,
            ..BankSettings::default()
        };
        assert!(matches!(
            Bank::new(&settings, &mut SecureRng::new()),
            Err(Error::KeyGeneration(_))
        ));
    }

    #[test]
    fn signs_deterministically() {
        let mut rng = SecureRng::new();
        let settings = BankSettings {
            key_bits: MIN_KEY_BITS,
            ..BankSettings::default()
        };
        let bank = Bank::new(&settings, &mut rng).unwrap();
        let (blinded, _) = bank.public_key().blind(b"coin", &mut rng);
        assert_eq!(bank.sign(&blinded).unwrap(), bank.sign(&blinded).unwrap());
    }
}
