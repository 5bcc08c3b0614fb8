#![no_main]
use libfuzzer_sys::fuzz_target;

use errsig_core::stdlib::conversion::{ConversionStatus, strtol_impl, strtoul_impl};

fuzz_target!(|data: &[u8]| {
    let Some((&base_byte, s)) = data.split_first() else {
        return;
    };
    let base = i32::from(base_byte % 38);

    let (value, consumed, status) = strtol_impl(s, base);
    assert!(consumed <= s.len());
    if consumed == 0 {
        assert_eq!(value, 0);
    }
    match status {
        ConversionStatus::Overflow => assert_eq!(value, i64::MAX),
        ConversionStatus::Underflow => assert_eq!(value, i64::MIN),
        ConversionStatus::InvalidBase => assert_eq!(consumed, 0),
        ConversionStatus::Success => {}
    }

    // Signed and unsigned parsing stop at the same byte.
    let (_, unsigned_consumed, _) = strtoul_impl(s, base);
    assert_eq!(consumed, unsigned_consumed);
});
