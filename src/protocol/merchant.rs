use rand_core::{CryptoRng, RngCore};
use tracing::{info, warn};

use super::coin::{verify_coin, Disclose};
use super::{ProtocolParams, RisElement, Transcript};
use crate::primitives::{challenge_side, BankPublicKey};
use crate::{Error, Result};

/// Merchant side of the spending protocol.
///
/// Accepts a coin only if its signature verifies under the bank key and every
/// share disclosed in response to a random challenge matches its signed
/// commitment.
///
/// # Security
///
/// - The signature is checked before any share is requested
/// - Challenge sides must come from an unpredictable source such as
///   [`SecureRng`](crate::SecureRng); a purchaser who can predict them can
///   double-spend without being identified
/// - Acceptance is all-or-nothing: one bad share rejects the whole coin
#[derive(Clone, Debug)]
pub struct Merchant {
    bank_key: BankPublicKey,
    params: ProtocolParams,
}

impl Merchant {
    /// Creates a merchant that trusts `bank_key`.
    pub fn new(bank_key: BankPublicKey, params: ProtocolParams) -> Self {
        Self { bank_key, params }
    }

    /// The bank key coins must be signed under.
    pub fn bank_key(&self) -> &BankPublicKey {
        &self.bank_key
    }

    /// Runs the acceptance protocol against `coin`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidSignature`] if the coin does not verify; no share is
    ///   requested in that case
    /// - [`Error::InvalidParams`] if the coin's position count differs from the
    ///   protocol parameters
    /// - [`Error::RisTamperDetected`] if a disclosed share does not hash to its
    ///   commitment; no transcript is produced
    pub fn accept<C, R>(&self, coin: &C, rng: &mut R) -> Result<Transcript>
    where
        C: Disclose + ?Sized,
        R: RngCore + CryptoRng,
    {
        let body = coin.body();
        if !verify_coin(body, coin.signature(), &self.bank_key) {
            warn!(coin = %body.id(), "rejected coin with invalid signature");
            return Err(Error::InvalidSignature(format!(
                "coin {} is not signed by the trusted bank",
                body.id()
            )));
        }

        let commitments = body.commitments();
        if commitments.len() != self.params.ris_length() {
            return Err(Error::InvalidParams(format!(
                "coin has {} positions, expected {}",
                commitments.len(),
                self.params.ris_length()
            )));
        }

        let mut elements = Vec::with_capacity(commitments.len());
        for position in 0..commitments.len() {
            let side = challenge_side(rng);
            let value = coin.get_ris(side, position)?;
            let expected = *commitments
                .get(side, position)
                .unwrap_or_else(|| unreachable!("position is below the commitment count"));

            if value.commitment() != expected {
                warn!(coin = %body.id(), position, "disclosed share does not match its commitment");
                return Err(Error::RisTamperDetected { position });
            }
            elements.push(RisElement::new(position, side, value, expected));
        }

        info!(coin = %body.id(), amount = body.amount(), "accepted coin");
        Transcript::new(body.id(), elements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{BankKeyPair, DEFAULT_PUBLIC_EXPONENT, MIN_KEY_BITS};
    use crate::protocol::{Coin, UnsignedCoin};
    use crate::SecureRng;

    fn setup() -> (BankKeyPair, ProtocolParams, Coin) {
        let mut rng = SecureRng::new();
        let keys = BankKeyPair::generate(MIN_KEY_BITS, DEFAULT_PUBLIC_EXPONENT, &mut rng).unwrap();
        let params = ProtocolParams::new(16, 32).unwrap();
        let unsigned =
            UnsignedCoin::new("alice", 20, keys.public_key(), &params, &mut rng).unwrap();
        let sig = keys.sign(unsigned.blinded_message()).unwrap();
        let coin = unsigned.unblind(&sig).unwrap();
        (keys, params, coin)
    }

    #[test]
    fn accepts_valid_coin() {
        let (keys, params, coin) = setup();
        let merchant = Merchant::new(keys.public_key().clone(), params);
        let transcript = merchant.accept(&coin, &mut SecureRng::new()).unwrap();

        assert_eq!(transcript.coin_id(), coin.id());
        assert_eq!(transcript.len(), 16);
        for element in transcript.elements() {
            assert!(element.matches(coin.body().commitments()));
        }
    }

    #[test]
    fn rejects_coin_from_other_bank() {
        let (_, params, coin) = setup();
        let mut rng = SecureRng::new();
        let other = BankKeyPair::generate(MIN_KEY_BITS, DEFAULT_PUBLIC_EXPONENT, &mut rng).unwrap();
        let merchant = Merchant::new(other.public_key().clone(), params);

        assert!(matches!(
            merchant.accept(&coin, &mut rng),
            Err(Error::InvalidSignature(_))
        ));
    }

    #[test]
    fn rejects_position_count_mismatch() {
        let (keys, _, coin) = setup();
        let params = ProtocolParams::new(8, 32).unwrap();
        let merchant = Merchant::new(keys.public_key().clone(), params);

        assert!(matches!(
            merchant.accept(&coin, &mut SecureRng::new()),
            Err(Error::InvalidParams(_))
        ));
    }
}
