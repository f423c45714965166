use std::collections::{HashMap, HashSet};

use rand_core::{CryptoRng, RngCore};
use tracing::debug;

use super::{Coin, CoinId, ProtocolParams, UnsignedCoin};
use crate::primitives::{BankPublicKey, BlindSignature, BlindedMessage};
use crate::{Error, Result};

/// Purchaser-side coin store.
///
/// Keeps every coin between blinding and unblinding. A pending coin is never
/// re-blinded: retries of a signing request always resend the original blinded
/// message, so one logical coin cannot be issued twice under two blindings.
///
/// Completed coin ids are remembered for the wallet's whole lifetime, even after
/// [`Wallet::take`], so a late or repeated signature is reported as
/// [`Error::AlreadyUnblinded`] rather than [`Error::UnknownCoin`].
#[derive(Debug)]
pub struct Wallet {
    identity: String,
    bank_key: BankPublicKey,
    params: ProtocolParams,
    pending: HashMap<CoinId, UnsignedCoin>,
    coins: HashMap<CoinId, Coin>,
    completed: HashSet<CoinId>,
}

impl Wallet {
    /// Creates an empty wallet for `identity`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentity`] if the identity cannot be encoded into
    /// shares with `params`.
    pub fn new(identity: &str, bank_key: BankPublicKey, params: ProtocolParams) -> Result<Self> {
        super::commitment::encode_identity(identity, &params)?;
        Ok(Self {
            identity: identity.to_string(),
            bank_key,
            params,
            pending: HashMap::new(),
            coins: HashMap::new(),
            completed: HashSet::new(),
        })
    }

    /// Prepares a coin of `amount` and returns the blinded message for the bank.
    ///
    /// # Errors
    ///
    /// See [`UnsignedCoin::new`].
    pub fn withdraw<R: RngCore + CryptoRng>(
        &mut self,
        amount: u64,
        rng: &mut R,
    ) -> Result<(CoinId, BlindedMessage)> {
        let unsigned = UnsignedCoin::new(&self.identity, amount, &self.bank_key, &self.params, rng)?;
        let id = unsigned.id();
        let blinded = unsigned.blinded_message().clone();
        self.pending.insert(id, unsigned);
        Ok((id, blinded))
    }

    /// The blinded message of a pending coin, for retrying a signing request.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyUnblinded`] for completed coins and
    /// [`Error::UnknownCoin`] otherwise.
    pub fn blinded_message(&self, id: CoinId) -> Result<&BlindedMessage> {
        match self.pending.get(&id) {
            Some(unsigned) => Ok(unsigned.blinded_message()),
            None => Err(self.missing(id)),
        }
    }

    /// Unblinds the bank's signature and stores the finished coin.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyUnblinded`] if the coin was already completed
    /// - [`Error::UnknownCoin`] if no such withdrawal is pending
    /// - [`Error::InvalidSignature`] if the signature does not unblind; the coin
    ///   stays pending so the request can be retried
    pub fn complete(&mut self, id: CoinId, blind_signature: &BlindSignature) -> Result<&Coin> {
        let unsigned = self.pending.get(&id).ok_or_else(|| self.missing(id))?;
        let signature = unsigned.unblind_signature(blind_signature)?;

        let unsigned = self
            .pending
            .remove(&id)
            .unwrap_or_else(|| unreachable!("coin was pending a moment ago"));
        self.completed.insert(id);
        debug!(coin = %id, "withdrawal complete");
        Ok(&*self.coins.entry(id).or_insert(unsigned.into_coin(signature)))
    }

    /// A finished coin.
    pub fn coin(&self, id: CoinId) -> Option<&Coin> {
        self.coins.get(&id)
    }

    /// Removes a finished coin from the wallet, e.g. to hand it to a merchant.
    pub fn take(&mut self, id: CoinId) -> Option<Coin> {
        self.coins.remove(&id)
    }

    /// Number of withdrawals awaiting a bank signature.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn missing(&self, id: CoinId) -> Error {
        if self.completed.contains(&id) {
            Error::AlreadyUnblinded(id)
        } else {
            Error::UnknownCoin(id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{BankKeyPair, DEFAULT_PUBLIC_EXPONENT, MIN_KEY_BITS};
    use crate::SecureRng;

    fn setup(rng: &mut SecureRng) -> (BankKeyPair, Wallet) {
        let keys = BankKeyPair::generate(MIN_KEY_BITS, DEFAULT_PUBLIC_EXPONENT, rng).unwrap();
        let params = ProtocolParams::new(4, 32).unwrap();
        let wallet = Wallet::new("alice", keys.public_key().clone(), params).unwrap();
        (keys, wallet)
    }

    #[test]
    fn withdraw_and_complete() {
        let mut rng = SecureRng::new();
        let (keys, mut wallet) = setup(&mut rng);

        let (id, blinded) = wallet.withdraw(20, &mut rng).unwrap();
        assert_eq!(wallet.pending_len(), 1);
        assert_eq!(wallet.blinded_message(id).unwrap(), &blinded);

        let sig = keys.sign(&blinded).unwrap();
        let coin = wallet.complete(id, &sig).unwrap();
        assert_eq!(coin.amount(), 20);
        assert_eq!(wallet.pending_len(), 0);
    }

    #[test]
    fn second_completion_is_rejected() {
        let mut rng = SecureRng::new();
        let (keys, mut wallet) = setup(&mut rng);
        let (id, blinded) = wallet.withdraw(5, &mut rng).unwrap();
        let sig = keys.sign(&blinded).unwrap();
        wallet.complete(id, &sig).unwrap();

        assert!(matches!(
            wallet.complete(id, &sig),
            Err(Error::AlreadyUnblinded(_))
        ));
        assert!(matches!(
            wallet.blinded_message(id),
            Err(Error::AlreadyUnblinded(_))
        ));

        wallet.take(id).unwrap();
        assert!(matches!(
            wallet.complete(id, &sig),
            Err(Error::AlreadyUnblinded(_))
        ));
    }

    #[test]
    fn bad_signature_keeps_coin_pending() {
        let mut rng = SecureRng::new();
        let (keys, mut wallet) = setup(&mut rng);
        let (id, blinded) = wallet.withdraw(5, &mut rng).unwrap();
        let (other_blinded, _) = keys.public_key().blind(b"other", &mut rng);
        let wrong = keys.sign(&other_blinded).unwrap();

        assert!(matches!(
            wallet.complete(id, &wrong),
            Err(Error::InvalidSignature(_))
        ));
        assert_eq!(wallet.pending_len(), 1);

        let sig = keys.sign(&blinded).unwrap();
        assert!(wallet.complete(id, &sig).is_ok());
    }

    #[test]
    fn unknown_coin_and_bad_identity() {
        let mut rng = SecureRng::new();
        let (keys, mut wallet) = setup(&mut rng);
        let (_, blinded) = wallet.withdraw(5, &mut rng).unwrap();
        let sig = keys.sign(&blinded).unwrap();
        let stranger = CoinId::random(&mut rng);
        assert!(matches!(
            wallet.complete(stranger, &sig),
            Err(Error::UnknownCoin(_))
        ));

        let params = ProtocolParams::new(4, 32).unwrap();
        assert!(matches!(
            Wallet::new("", keys.public_key().clone(), params),
            Err(Error::InvalidIdentity(_))
        ));
    }
}
