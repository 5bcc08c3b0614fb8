//! Runtime policy configuration.
//!
//! The orphan-escape policy is set via the `ERRSIG_ORPHAN_ESCAPE` environment
//! variable:
//! - `panic` (default): an escape with no live recovery point, or an escape
//!   carrying the reserved `Ok` code, raises a panic describing the misuse.
//!   Test harnesses and `catch_unwind` boundaries can observe it.
//! - `abort`: the misuse is reported on stderr and the process aborts. This
//!   mirrors the "fatal, never continue" reading of C `longjmp` misuse.

use std::sync::atomic::{AtomicU8, Ordering};

/// Name of the environment variable consulted by [`orphan_policy`].
pub const ORPHAN_POLICY_ENV: &str = "ERRSIG_ORPHAN_ESCAPE";

/// What to do when the escape API is misused.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrphanPolicy {
    /// Raise a panic carrying the error message.
    #[default]
    Panic,
    /// Print the error message to stderr and abort the process.
    Abort,
}

impl OrphanPolicy {
    /// Parse from string (case-insensitive). Unknown values map to `Panic`.
    #[must_use]
    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" | "fatal" | "kill" => Self::Abort,
            _ => Self::Panic,
        }
    }

    /// Returns true if misuse terminates the process.
    #[must_use]
    pub const fn is_fatal(self) -> bool {
        matches!(self, Self::Abort)
    }
}

// 0=unresolved, 1=Panic, 2=Abort, 255=resolving.
static CACHED_POLICY: AtomicU8 = AtomicU8::new(0);

const POLICY_UNRESOLVED: u8 = 0;
const POLICY_PANIC: u8 = 1;
const POLICY_ABORT: u8 = 2;
const POLICY_RESOLVING: u8 = 255;

fn policy_to_u8(policy: OrphanPolicy) -> u8 {
    match policy {
        OrphanPolicy::Panic => POLICY_PANIC,
        OrphanPolicy::Abort => POLICY_ABORT,
    }
}

fn u8_to_policy(v: u8) -> OrphanPolicy {
    match v {
        POLICY_ABORT => OrphanPolicy::Abort,
        _ => OrphanPolicy::Panic,
    }
}

/// Get the configured orphan policy (reads the env var on first call, caches
/// thereafter).
///
/// While another thread is resolving, callers see `Panic`.
#[must_use]
pub fn orphan_policy() -> OrphanPolicy {
    let cached = CACHED_POLICY.load(Ordering::Acquire);
    if cached != POLICY_UNRESOLVED && cached != POLICY_RESOLVING {
        return u8_to_policy(cached);
    }
    if cached == POLICY_RESOLVING {
        return OrphanPolicy::Panic;
    }

    if CACHED_POLICY
        .compare_exchange(
            POLICY_UNRESOLVED,
            POLICY_RESOLVING,
            Ordering::SeqCst,
            Ordering::Relaxed,
        )
        .is_err()
    {
        let v = CACHED_POLICY.load(Ordering::Acquire);
        return if v != POLICY_UNRESOLVED && v != POLICY_RESOLVING {
            u8_to_policy(v)
        } else {
            OrphanPolicy::Panic
        };
    }

    let policy = std::env::var(ORPHAN_POLICY_ENV)
        .map(|v| OrphanPolicy::from_str_loose(&v))
        .unwrap_or_default();
    CACHED_POLICY.store(policy_to_u8(policy), Ordering::Release);
    policy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_orphan_policies() {
        assert_eq!(OrphanPolicy::from_str_loose("panic"), OrphanPolicy::Panic);
        assert_eq!(OrphanPolicy::from_str_loose("PANIC"), OrphanPolicy::Panic);
        assert_eq!(OrphanPolicy::from_str_loose("default"), OrphanPolicy::Panic);
        assert_eq!(OrphanPolicy::from_str_loose("abort"), OrphanPolicy::Abort);
        assert_eq!(OrphanPolicy::from_str_loose(" Fatal "), OrphanPolicy::Abort);
        assert_eq!(OrphanPolicy::from_str_loose("kill"), OrphanPolicy::Abort);
        assert_eq!(OrphanPolicy::from_str_loose(""), OrphanPolicy::Panic);
        assert_eq!(OrphanPolicy::from_str_loose("bogus"), OrphanPolicy::Panic);
    }

    #[test]
    fn only_abort_is_fatal() {
        assert!(OrphanPolicy::Abort.is_fatal());
        assert!(!OrphanPolicy::Panic.is_fatal());
    }

    #[test]
    fn policy_codec_roundtrips() {
        for policy in [OrphanPolicy::Panic, OrphanPolicy::Abort] {
            assert_eq!(u8_to_policy(policy_to_u8(policy)), policy);
        }
        assert_eq!(u8_to_policy(POLICY_RESOLVING), OrphanPolicy::Panic);
    }
}
