#![no_main]

use chaum_ecash::CoinBody;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(body) = CoinBody::from_bytes(data) {
        assert_eq!(CoinBody::from_bytes(&body.to_bytes()).ok(), Some(body));
    }
});
