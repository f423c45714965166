//! Common test utilities shared across integration tests.
#![allow(dead_code)]

use chaum_ecash::config::BankSettings;
use chaum_ecash::primitives::MIN_KEY_BITS;
use chaum_ecash::{Bank, Coin, Merchant, ProtocolParams, SecureRng, Wallet};

/// Initialize test tracing (call once at the beginning of tests).
///
/// Only logs from the library are shown. Subsequent calls are safe and will be
/// ignored.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::new("chaum_ecash=debug");

    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(filter)
        .try_init();
}

/// A bank with a small key, fast enough for tests.
pub fn test_bank(rng: &mut SecureRng) -> Bank {
    let settings = BankSettings {
        key_bits: MIN_KEY_BITS,
        ..BankSettings::default()
    };
    Bank::new(&settings, rng).expect("bank key generation should succeed")
}

pub fn params(ris_length: usize) -> ProtocolParams {
    ProtocolParams::new(ris_length, 32).expect("valid parameters")
}

/// Withdraws one coin through a wallet.
pub fn withdraw(
    bank: &Bank,
    identity: &str,
    amount: u64,
    params: &ProtocolParams,
    rng: &mut SecureRng,
) -> Coin {
    let mut wallet = Wallet::new(identity, bank.public_key().clone(), params.clone())
        .expect("identity should fit");
    let (id, blinded) = wallet.withdraw(amount, rng).expect("withdrawal");
    let blind_signature = bank.sign(&blinded).expect("bank signs");
    wallet.complete(id, &blind_signature).expect("unblinds");
    wallet.take(id).expect("coin is in the wallet")
}

pub fn merchant(bank: &Bank, params: &ProtocolParams) -> Merchant {
    Merchant::new(bank.public_key().clone(), params.clone())
}
