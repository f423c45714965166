//! RSA blind signatures.
//!
//! Key generation and the private key come from the `rsa` crate. Blinding,
//! unblinding and verification are plain modular arithmetic over `n` and `e`:
//! the bank signs `m·r^e mod n` without learning `m`, and the purchaser strips
//! `r` from the result to obtain an ordinary RSA signature `m^d mod n`.
//!
//! The message representative is a full-domain hash: SHA-256 of the message is
//! expanded with MGF1 to the modulus length plus [`FDH_EXTRA_BYTES`] and reduced
//! modulo `n`.

use core::fmt;

use num_bigint::{BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::Zero;
use rand_core::{CryptoRng, RngCore};
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::RsaPrivateKey;
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::primitives::Digest;
use crate::{Error, Result};

/// Smallest accepted modulus size.
pub const MIN_KEY_BITS: usize = 512;

/// Largest modulus size the key generator accepts.
pub const MAX_KEY_BITS: usize = 4096;

/// Default RSA public exponent (F4).
pub const DEFAULT_PUBLIC_EXPONENT: u64 = 65_537;

/// Bytes hashed beyond the modulus length so the reduction mod `n` is
/// statistically close to uniform.
pub const FDH_EXTRA_BYTES: usize = 16;

const FDH_DOMAIN: &[u8] = b"chaum-ecash/fdh";

/// The bank's public key `(n, e)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BankPublicKey {
    n: BigUint,
    e: BigUint,
}

impl BankPublicKey {
    /// Creates a public key from its components.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParams`] if the modulus is even or too small, or the
    /// exponent is even or smaller than 3.
    pub fn new(n: BigUint, e: BigUint) -> Result<Self> {
        if n.bits() < MIN_KEY_BITS as u64 || n.is_even() {
            return Err(Error::InvalidParams(format!(
                "RSA modulus must be odd and at least {MIN_KEY_BITS} bits"
            )));
        }
        if e < BigUint::from(3u32) || e.is_even() {
            return Err(Error::InvalidParams(
                "RSA public exponent must be odd and at least 3".to_string(),
            ));
        }
        Ok(Self { n, e })
    }

    /// Returns the modulus `n`.
    pub fn n(&self) -> &BigUint {
        &self.n
    }

    /// Returns the public exponent `e`.
    pub fn e(&self) -> &BigUint {
        &self.e
    }

    /// Returns the modulus size in bits.
    pub fn bits(&self) -> u64 {
        self.n.bits()
    }

    /// Full-domain hash of `message` onto `Z_n`.
    pub fn message_representative(&self, message: &[u8]) -> BigUint {
        let seed = Digest::of_parts(&[FDH_DOMAIN, message]);
        let len = (self.n.bits() as usize).div_ceil(8) + FDH_EXTRA_BYTES;
        BigUint::from_bytes_be(&mgf1(seed.as_bytes(), len)) % &self.n
    }

    /// Blinds `message` with a fresh random factor coprime to `n`.
    pub fn blind<R: RngCore + CryptoRng>(
        &self,
        message: &[u8],
        rng: &mut R,
    ) -> (BlindedMessage, BlindingFactor) {
        let m = self.message_representative(message);
        let two = BigUint::from(2u32);
        let (r, r_inv) = loop {
            let r = rng.gen_biguint_range(&two, &self.n);
            if let Some(r_inv) = r.modinv(&self.n) {
                break (r, r_inv);
            }
        };
        let blinded = (m * r.modpow(&self.e, &self.n)) % &self.n;
        (
            BlindedMessage(blinded),
            BlindingFactor {
                r_inv: r_inv.to_bytes_be(),
            },
        )
    }

    /// Checks `sig^e mod n == FDH(message)`.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        if signature.0 >= self.n || signature.0.is_zero() {
            return false;
        }
        signature.0.modpow(&self.e, &self.n) == self.message_representative(message)
    }
}

/// The bank's RSA key pair.
///
/// The private half is an [`RsaPrivateKey`], which zeroizes `d` and the primes
/// when dropped.
#[derive(Clone)]
pub struct BankKeyPair {
    public: BankPublicKey,
    private: RsaPrivateKey,
}

impl BankKeyPair {
    /// Generates a fresh key pair with a modulus of exactly `bits` bits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyGeneration`] for unusable sizes or exponents, or when the
    /// `rsa` key generator fails.
    pub fn generate<R: RngCore + CryptoRng>(bits: usize, e: u64, rng: &mut R) -> Result<Self> {
        if !(MIN_KEY_BITS..=MAX_KEY_BITS).contains(&bits) {
            return Err(Error::KeyGeneration(format!(
                "key size {bits} is outside {MIN_KEY_BITS}..={MAX_KEY_BITS} bits"
            )));
        }
        if e < 3 || e % 2 == 0 {
            return Err(Error::KeyGeneration(format!(
                "public exponent {e} must be odd and at least 3"
            )));
        }

        let private = RsaPrivateKey::new_with_exp(rng, bits, &rsa::BigUint::from(e))
            .map_err(|err| Error::KeyGeneration(err.to_string()))?;
        Self::from_private_key(private)
    }

    /// Wraps an existing `rsa` private key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::KeyGeneration`] if the key's public half is not usable as
    /// a bank key.
    pub fn from_private_key(private: RsaPrivateKey) -> Result<Self> {
        let public = BankPublicKey::new(from_rsa(private.n()), from_rsa(private.e()))
            .map_err(|err| Error::KeyGeneration(err.to_string()))?;
        debug!(bits = public.bits(), "loaded bank key pair");
        Ok(Self { public, private })
    }

    /// Returns the public half of the key pair.
    pub fn public_key(&self) -> &BankPublicKey {
        &self.public
    }

    /// Signs a blinded message: `s' = m'^d mod n`.
    ///
    /// Deterministic, so retrying with the same blinded message returns the same
    /// blind signature.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Signing`] if the blinded message is zero or not reduced
    /// modulo `n`.
    pub fn sign(&self, blinded: &BlindedMessage) -> Result<BlindSignature> {
        if blinded.0.is_zero() {
            return Err(Error::Signing("blinded message is zero".to_string()));
        }
        if blinded.0 >= self.public.n {
            return Err(Error::Signing(
                "blinded message is not reduced modulo n".to_string(),
            ));
        }
        let m = to_rsa(&blinded.0);
        let s = m.modpow(self.private.d(), self.private.n());
        Ok(BlindSignature(from_rsa(&s)))
    }
}

impl ZeroizeOnDrop for BankKeyPair {}

impl fmt::Debug for BankKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BankKeyPair")
            .field("public", &self.public)
            .field("private", &"<redacted>")
            .finish()
    }
}

/// A message blinded under the bank key, safe to hand to the bank.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlindedMessage(BigUint);

impl BlindedMessage {
    /// Parses a big-endian encoding.
    pub fn from_bytes_be(bytes: &[u8]) -> Self {
        Self(BigUint::from_bytes_be(bytes))
    }

    /// Returns the big-endian encoding.
    pub fn to_bytes_be(&self) -> Vec<u8> {
        self.0.to_bytes_be()
    }
}

/// The bank's signature over a blinded message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlindSignature(BigUint);

impl BlindSignature {
    /// Parses a big-endian encoding.
    pub fn from_bytes_be(bytes: &[u8]) -> Self {
        Self(BigUint::from_bytes_be(bytes))
    }

    /// Returns the big-endian encoding.
    pub fn to_bytes_be(&self) -> Vec<u8> {
        self.0.to_bytes_be()
    }
}

/// An ordinary RSA signature over an unblinded message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature(BigUint);

impl Signature {
    /// Parses a big-endian encoding.
    pub fn from_bytes_be(bytes: &[u8]) -> Self {
        Self(BigUint::from_bytes_be(bytes))
    }

    /// Returns the big-endian encoding.
    pub fn to_bytes_be(&self) -> Vec<u8> {
        self.0.to_bytes_be()
    }
}

/// Secret state kept by the purchaser between blinding and unblinding.
///
/// Holds `r^-1 mod n` big-endian. Zeroized when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct BlindingFactor {
    r_inv: Vec<u8>,
}

impl BlindingFactor {
    /// Removes the blinding factor: `s = s'·r^-1 mod n`.
    pub fn unblind(&self, blind_signature: &BlindSignature, key: &BankPublicKey) -> Signature {
        let r_inv = BigUint::from_bytes_be(&self.r_inv);
        Signature((&blind_signature.0 * r_inv) % &key.n)
    }
}

impl fmt::Debug for BlindingFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BlindingFactor(<redacted>)")
    }
}

/// MGF1 with SHA-256 (RFC 8017, B.2.1).
fn mgf1(seed: &[u8], len: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(len + 32);
    let mut counter = 0u32;
    while out.len() < len {
        out.extend_from_slice(Digest::of_parts(&[seed, &counter.to_be_bytes()]).as_bytes());
        counter += 1;
    }
    out.truncate(len);
    out
}

fn to_rsa(n: &BigUint) -> rsa::BigUint {
    rsa::BigUint::from_bytes_be(&n.to_bytes_be())
}

fn from_rsa(n: &rsa::BigUint) -> BigUint {
    BigUint::from_bytes_be(&n.to_bytes_be())
}

#[cfg(test)]
mod tests {
    use num_traits::One;

    use super::*;
    use crate::SecureRng;

    fn assert_zeroize_on_drop<T: ZeroizeOnDrop>() {}

    #[test]
    fn rejects_unusable_key_settings() {
        let mut rng = SecureRng::new();
        let result = BankKeyPair::generate(256, DEFAULT_PUBLIC_EXPONENT, &mut rng);
        assert!(matches!(result, Err(Error::KeyGeneration(_))));
        let result = BankKeyPair::generate(MAX_KEY_BITS + 8, DEFAULT_PUBLIC_EXPONENT, &mut rng);
        assert!(matches!(result, Err(Error::KeyGeneration(_))));
        let result = BankKeyPair::generate(MIN_KEY_BITS, 4, &mut rng);
        assert!(matches!(result, Err(Error::KeyGeneration(_))));
    }

    #[test]
    fn blind_sign_unblind_verify() {
        let mut rng = SecureRng::new();
        let keys = BankKeyPair::generate(MIN_KEY_BITS, DEFAULT_PUBLIC_EXPONENT, &mut rng).unwrap();
        let public = keys.public_key();
        assert_eq!(public.bits(), MIN_KEY_BITS as u64);
        assert_eq!(public.e(), &BigUint::from(DEFAULT_PUBLIC_EXPONENT));

        let message = b"coin payload";
        let (blinded, factor) = public.blind(message, &mut rng);
        let blind_sig = keys.sign(&blinded).unwrap();
        let sig = factor.unblind(&blind_sig, public);

        assert!(public.verify(message, &sig));
        assert!(!public.verify(b"other payload", &sig));
    }

    #[test]
    fn signing_is_deterministic() {
        let mut rng = SecureRng::new();
        let keys = BankKeyPair::generate(MIN_KEY_BITS, DEFAULT_PUBLIC_EXPONENT, &mut rng).unwrap();
        let (blinded, _) = keys.public_key().blind(b"m", &mut rng);
        assert_eq!(keys.sign(&blinded).unwrap(), keys.sign(&blinded).unwrap());
    }

    #[test]
    fn sign_rejects_unreduced_message() {
        let mut rng = SecureRng::new();
        let keys = BankKeyPair::generate(MIN_KEY_BITS, DEFAULT_PUBLIC_EXPONENT, &mut rng).unwrap();
        let too_big = BlindedMessage(keys.public_key().n().clone());
        assert!(matches!(keys.sign(&too_big), Err(Error::Signing(_))));
        let zero = BlindedMessage(BigUint::zero());
        assert!(matches!(keys.sign(&zero), Err(Error::Signing(_))));
    }

    #[test]
    fn representative_spans_the_modulus() {
        let n = (BigUint::one() << 2047u32) | BigUint::one();
        let key = BankPublicKey::new(n, BigUint::from(DEFAULT_PUBLIC_EXPONENT)).unwrap();

        let mut widest = 0;
        for i in 0u32..16 {
            let m = key.message_representative(&i.to_be_bytes());
            assert!(m < *key.n());
            assert!(m.bits() > 256, "representative of {i} fits in a SHA-256 digest");
            widest = widest.max(m.bits());
        }
        assert!(widest > 2000);
        assert_eq!(
            key.message_representative(b"coin"),
            key.message_representative(b"coin")
        );
    }

    #[test]
    fn mgf1_output_length_and_prefix() {
        let long = mgf1(b"seed", 100);
        assert_eq!(long.len(), 100);
        assert_eq!(&mgf1(b"seed", 40)[..], &long[..40]);
        assert_ne!(mgf1(b"seed", 32), mgf1(b"other", 32));
    }

    #[test]
    fn secrets_zeroize_on_drop() {
        assert_zeroize_on_drop::<BankKeyPair>();
        assert_zeroize_on_drop::<BlindingFactor>();
    }
}
