//! Fail-fast under `ERRSIG_ORPHAN_ESCAPE=abort`.
//!
//! The policy is cached process-wide, so each case re-executes this test
//! binary with the variable set and runs a single child test that misuses
//! the escape API. The child must die by SIGABRT after reporting on stderr.
//!
//! Run: cargo test -p errsig-core --test orphan_abort_test

#![cfg(unix)]

use std::os::unix::process::ExitStatusExt;
use std::process::{Command, Output};

use errsig_core::config::{ORPHAN_POLICY_ENV, OrphanPolicy, orphan_policy};
use errsig_core::setjmp::escape::{Attempt, EscapeCode, escape, establish};

/// Set only in re-executed children.
const CHILD_MARKER: &str = "ERRSIG_ABORT_CHILD";

fn in_child() -> bool {
    std::env::var_os(CHILD_MARKER).is_some()
}

fn run_child(test_name: &str) -> Output {
    Command::new(std::env::current_exe().unwrap())
        .args(["--exact", test_name, "--nocapture", "--test-threads=1"])
        .env(ORPHAN_POLICY_ENV, "abort")
        .env(CHILD_MARKER, "1")
        .output()
        .expect("failed to re-execute test binary")
}

fn assert_aborted(output: &Output, needle: &str) {
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success(), "child exited cleanly:\n{stderr}");
    assert_eq!(
        output.status.signal(),
        Some(libc::SIGABRT),
        "status {:?}\n{stderr}",
        output.status
    );
    assert!(stderr.contains("errsig: fatal:"), "{stderr}");
    assert!(stderr.contains(needle), "{stderr}");
    assert!(!stderr.contains("continued past escape"), "{stderr}");
}

#[test]
fn child_orphan_escape() {
    if !in_child() {
        return;
    }
    assert_eq!(orphan_policy(), OrphanPolicy::Abort);
    escape(EscapeCode::TooBigValue)
}

#[test]
fn child_reserved_code_inside_establish() {
    if !in_child() {
        return;
    }
    let attempt: Attempt<()> = establish(|ctl| -> () { ctl.escape(EscapeCode::Ok) });
    eprintln!("continued past escape: {attempt:?}");
}

#[test]
fn orphan_escape_aborts_under_abort_policy() {
    if in_child() {
        return;
    }
    let output = run_child("child_orphan_escape");
    assert_aborted(&output, "no recovery point is live");
}

#[test]
fn reserved_code_aborts_even_inside_a_recovery_point() {
    if in_child() {
        return;
    }
    let output = run_child("child_reserved_code_inside_establish");
    assert_aborted(&output, "reserved");
}
