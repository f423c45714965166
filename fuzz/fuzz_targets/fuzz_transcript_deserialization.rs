#![no_main]

use chaum_ecash::Transcript;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = Transcript::from_bytes(data);
});
