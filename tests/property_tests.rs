mod common;

use std::sync::OnceLock;

use chaum_ecash::protocol::commitment::{
    decode_identity, encode_identity, reveal_identity, split_identity,
};
use chaum_ecash::{
    Bank, Cheater, CoinBody, ProtocolParams, SecureRng, Side, Transcript, determine_cheater,
};
use proptest::prelude::*;

fn bank() -> &'static Bank {
    static BANK: OnceLock<Bank> = OnceLock::new();
    BANK.get_or_init(|| common::test_bank(&mut SecureRng::new()))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn shares_reveal_identity(identity in "[a-zA-Z0-9:@. ]{1,24}", ris_length in 1usize..16) {
        let params = ProtocolParams::new(ris_length, 32).unwrap();
        let shares = split_identity(&identity, &params, &mut SecureRng::new()).unwrap();

        prop_assert_eq!(shares.len(), ris_length);
        for position in 0..ris_length {
            let left = shares.get(Side::Left, position).unwrap();
            let right = shares.get(Side::Right, position).unwrap();
            prop_assert_eq!(reveal_identity(left, right, &params).unwrap(), identity.clone());
        }
    }

    #[test]
    fn plaintext_decodes_back(identity in "[^\\x00]{1,8}") {
        let params = ProtocolParams::default();
        prop_assume!(identity.len() <= params.max_identity_len());
        let plaintext = encode_identity(&identity, &params).unwrap();
        prop_assert_eq!(plaintext.len(), params.share_length());
        prop_assert_eq!(decode_identity(&plaintext, &params).unwrap(), identity);
    }

    #[test]
    fn verdict_is_purchaser_or_merchant(ris_length in 1usize..12, amount in 1u64..1_000) {
        let mut rng = SecureRng::new();
        let bank = bank();
        let params = ProtocolParams::new(ris_length, 32).unwrap();
        let coin = common::withdraw(bank, "alice", amount, &params, &mut rng);
        let merchant = common::merchant(bank, &params);

        let first = merchant.accept(&coin, &mut rng).unwrap();
        let second = merchant.accept(&coin, &mut rng).unwrap();
        let cheater = determine_cheater(coin.id(), &first, &second, &params).unwrap();

        let differs = first
            .elements()
            .iter()
            .zip(second.elements())
            .any(|(a, b)| a.side() != b.side());
        if differs {
            prop_assert_eq!(cheater, Cheater::Purchaser("alice".to_string()));
        } else {
            prop_assert_eq!(cheater, Cheater::Merchant);
        }
    }

    #[test]
    fn decoders_never_panic(data in proptest::collection::vec(any::<u8>(), 0..512)) {
        let _ = CoinBody::from_bytes(&data);
        let _ = Transcript::from_bytes(&data);
    }
}
