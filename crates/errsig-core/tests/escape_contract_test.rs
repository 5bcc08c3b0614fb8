//! Contract tests for the escape controller on a four-deep call chain.
//!
//! `twice` -> `twice2` -> `twice3` -> `twice4`; `twice4` escapes for inputs
//! outside `[0, 100]`. Each intermediate frame bumps a counter after its
//! callee returns, so an escape must leave every counter at zero.

use std::cell::Cell;
use std::panic;

use errsig_core::setjmp::escape::{
    Attempt, EscapeCode, EscapeController, attempt_code, establish, escape, is_established,
};

#[derive(Default)]
struct FrameCounters {
    after_twice2: Cell<u32>,
    after_twice3: Cell<u32>,
    after_twice4: Cell<u32>,
}

impl FrameCounters {
    fn total(&self) -> u32 {
        self.after_twice2.get() + self.after_twice3.get() + self.after_twice4.get()
    }
}

fn bump(cell: &Cell<u32>) {
    cell.set(cell.get() + 1);
}

fn twice4(ctl: &EscapeController<'_>, n: i32) -> i32 {
    if n < 0 {
        ctl.escape(EscapeCode::NegativeValue);
    }
    if n > 100 {
        ctl.escape(EscapeCode::TooBigValue);
    }
    2 * n
}

fn twice3(ctl: &EscapeController<'_>, n: i32, c: &FrameCounters) -> i32 {
    let r = twice4(ctl, n);
    bump(&c.after_twice4);
    r
}

fn twice2(ctl: &EscapeController<'_>, n: i32, c: &FrameCounters) -> i32 {
    let r = twice3(ctl, n, c);
    bump(&c.after_twice3);
    r
}

fn twice(ctl: &EscapeController<'_>, n: i32, c: &FrameCounters) -> i32 {
    let r = twice2(ctl, n, c);
    bump(&c.after_twice2);
    r
}

fn run(n: i32) -> (Attempt<i32>, FrameCounters) {
    let counters = FrameCounters::default();
    let attempt = establish(|ctl| twice(ctl, n, &counters));
    (attempt, counters)
}

#[test]
fn in_range_inputs_complete_normally() {
    for n in 0..=100 {
        let (attempt, counters) = run(n);
        assert_eq!(attempt, Ok(2 * n), "n={n}");
        assert_eq!(attempt_code(&attempt), EscapeCode::Ok);
        assert_eq!(counters.total(), 3, "n={n}: every frame returns normally");
    }
}

#[test]
fn negative_inputs_escape_with_negative_value() {
    for n in [-1, -10, -100, i32::MIN] {
        let (attempt, counters) = run(n);
        assert_eq!(attempt, Err(EscapeCode::NegativeValue), "n={n}");
        assert_eq!(counters.total(), 0, "n={n}: skipped frames must not resume");
    }
}

#[test]
fn large_inputs_escape_with_too_big_value() {
    for n in [101, 1000, i32::MAX] {
        let (attempt, counters) = run(n);
        assert_eq!(attempt, Err(EscapeCode::TooBigValue), "n={n}");
        assert_eq!(counters.total(), 0, "n={n}: skipped frames must not resume");
    }
}

#[test]
fn concrete_scenarios() {
    assert_eq!(run(1000).0, Err(EscapeCode::TooBigValue));
    assert_eq!(run(-10).0, Err(EscapeCode::NegativeValue));
    assert_eq!(run(50).0, Ok(100));
    assert_eq!(run(0).0, Ok(0));
    assert_eq!(run(100).0, Ok(200));
}

#[test]
fn establishing_frame_statement_after_attempt_always_runs() {
    let reached = Cell::new(0);
    for n in [-5, 5, 500] {
        let _ = establish(|ctl| twice(ctl, n, &FrameCounters::default()));
        reached.set(reached.get() + 1);
    }
    assert_eq!(reached.get(), 3);
}

#[test]
fn ambient_escape_from_deep_frame() {
    fn deep(depth: u32, n: i32) -> i32 {
        if depth == 0 {
            if n > 100 {
                escape(EscapeCode::TooBigValue);
            }
            return 2 * n;
        }
        deep(depth - 1, n)
    }

    assert_eq!(establish(|_| deep(64, 7)), Ok(14));
    assert_eq!(establish(|_| deep(64, 700)), Err(EscapeCode::TooBigValue));
    assert!(!is_established());
}

#[test]
fn orphan_escape_never_silently_continues() {
    let continued = Cell::new(false);
    let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
        escape(EscapeCode::NegativeValue);
        #[allow(unreachable_code)]
        continued.set(true);
    }));
    assert!(result.is_err());
    assert!(!continued.get());
}
