#![no_main]
use libfuzzer_sys::fuzz_target;

use errsig_core::setjmp::escape::{Attempt, EscapeCode, EscapeController, establish};

fn descend(ctl: &EscapeController<'_>, depth: u32, n: i32) -> i32 {
    if depth > 0 {
        return descend(ctl, depth - 1, n);
    }
    if n < 0 {
        ctl.escape(EscapeCode::NegativeValue)
    } else if n > 100 {
        ctl.escape(EscapeCode::TooBigValue)
    } else {
        2 * n
    }
}

fuzz_target!(|data: &[u8]| {
    // Each 4-byte chunk is one input; the low bits of its first byte pick
    // the call depth.
    for chunk in data.chunks_exact(4) {
        let n = i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        let depth = u32::from(chunk[0] & 0x1f);

        let attempt: Attempt<i32> = establish(|ctl| descend(ctl, depth, n));
        match attempt {
            Ok(v) => assert!((0..=100).contains(&n) && v == 2 * n),
            Err(EscapeCode::NegativeValue) => assert!(n < 0),
            Err(EscapeCode::TooBigValue) => assert!(n > 100),
            Err(EscapeCode::Ok) => unreachable!("Ok is never delivered as an escape"),
        }
    }
});
