//! strtol benchmarks: errsig-core against the host libc.

use std::ffi::CString;

use criterion::{Criterion, criterion_group, criterion_main};
use errsig_core::stdlib::conversion::{strtol, strtol_impl};

const INPUTS: [&str; 4] = ["    12  ", "fdjkfnskxg", "-9223372036854775808", "0x7fffffff"];

fn bench_errsig_strtol(c: &mut Criterion) {
    for input in INPUTS {
        c.bench_function(&format!("errsig_strtol/{}", input.trim()), |b| {
            b.iter(|| criterion::black_box(strtol(criterion::black_box(input.as_bytes()), 0)));
        });
    }
    c.bench_function("errsig_strtol_impl/no_errno", |b| {
        b.iter(|| criterion::black_box(strtol_impl(criterion::black_box(b"123456789"), 10)));
    });
}

fn bench_host_strtol(c: &mut Criterion) {
    for input in INPUTS {
        let cstr = CString::new(input).expect("bench inputs have no interior NUL");
        c.bench_function(&format!("host_strtol/{}", input.trim()), |b| {
            b.iter(|| {
                let mut end: *mut libc::c_char = std::ptr::null_mut();
                // SAFETY: `cstr` is NUL-terminated and outlives the call.
                let v = unsafe { libc::strtol(cstr.as_ptr(), &mut end, 0) };
                criterion::black_box((v, end))
            });
        });
    }
}

criterion_group!(benches, bench_errsig_strtol, bench_host_strtol);
criterion_main!(benches);
