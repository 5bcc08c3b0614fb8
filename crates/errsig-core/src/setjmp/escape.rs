//! Escape controller: one recovery point per attempt, one carried code.
//!
//! [`establish`] arms a recovery point and runs the attempt. Code anywhere
//! below it, however deep, can abandon the attempt with
//! [`EscapeController::escape`] (explicit handle) or the ambient [`escape`]
//! (innermost live recovery point of the current thread). The attempt then
//! resolves to `Err(code)` at the establishing frame, which is the only place
//! the code is inspected.
//!
//! Misuse never continues silently. Escaping with [`EscapeCode::Ok`], or
//! escaping ambiently with no live recovery point (including after the
//! establishing call has returned), fails according to
//! [`crate::config::orphan_policy`].

use std::cell::Cell;
use std::fmt;

use thiserror::Error;

use super::{JmpBuf, catch_jumps, throw_jump};
use crate::config::{self, OrphanPolicy};

/// Why control arrived at the recovery point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum EscapeCode {
    /// Normal first arrival. Never carried by an escape.
    Ok = 0,
    /// Input was below the accepted range.
    NegativeValue = 1,
    /// Input was above the accepted range.
    TooBigValue = 2,
}

impl EscapeCode {
    pub const ALL: [Self; 3] = [Self::Ok, Self::NegativeValue, Self::TooBigValue];

    #[must_use]
    pub const fn as_raw(self) -> i32 {
        self as i32
    }

    #[must_use]
    pub const fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::Ok),
            1 => Some(Self::NegativeValue),
            2 => Some(Self::TooBigValue),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Stable upper-case name, as used in logs and fixtures.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::NegativeValue => "NEGATIVE_VALUE",
            Self::TooBigValue => "TOO_BIG_VALUE",
        }
    }

    /// Parses either the upper-case name or the raw integer.
    #[must_use]
    pub fn from_name(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|code| code.name().eq_ignore_ascii_case(s))
            .or_else(|| s.parse().ok().and_then(Self::from_raw))
    }
}

impl fmt::Display for EscapeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.as_raw())
    }
}

/// Misuse of the escape API. Always a programming error.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EscapeError {
    #[error("escape with {code} but no recovery point is live on this thread")]
    NoRecoveryPoint { code: EscapeCode },
    #[error("escape code OK (0) is reserved for normal arrival and cannot be carried by an escape")]
    ReservedCode,
}

/// Outcome of one attempt: the body's value, or the code it escaped with.
pub type Attempt<T> = Result<T, EscapeCode>;

/// The integer discriminator C `setjmp` would have returned for `attempt`.
#[must_use]
pub fn attempt_code<T>(attempt: &Attempt<T>) -> EscapeCode {
    match attempt {
        Ok(_) => EscapeCode::Ok,
        Err(code) => *code,
    }
}

thread_local! {
    static ACTIVE: Cell<Option<u64>> = const { Cell::new(None) };
}

/// Marks a recovery point as the ambient target for its lifetime and
/// restores the previous one on drop, including during unwinding.
struct ActiveScope {
    previous: Option<u64>,
}

impl ActiveScope {
    fn enter(id: u64) -> Self {
        Self {
            previous: ACTIVE.replace(Some(id)),
        }
    }
}

impl Drop for ActiveScope {
    fn drop(&mut self) {
        ACTIVE.set(self.previous);
    }
}

/// Handle to the recovery point of one attempt.
///
/// Borrowed from [`establish`] and only usable inside the attempt body, so it
/// can never target a recovery point whose scope has exited.
#[derive(Debug)]
pub struct EscapeController<'env> {
    env: &'env JmpBuf,
}

impl EscapeController<'_> {
    /// Abandons every frame up to this controller's [`establish`], which
    /// then resolves to `Err(code)`.
    pub fn escape(&self, code: EscapeCode) -> ! {
        if code.is_ok() {
            fail_loudly(EscapeError::ReservedCode);
        }
        throw_jump(self.env.id(), code)
    }
}

/// Runs `body` under a fresh recovery point.
///
/// Returns `Ok` with the body's value on normal completion, `Err(code)` if
/// the body (or anything it called) escaped. A nested `establish` becomes
/// the ambient target until it returns; outer controllers stay usable
/// through their handles.
pub fn establish<T, F>(body: F) -> Attempt<T>
where
    F: FnOnce(&EscapeController<'_>) -> T,
{
    let env = JmpBuf::arm();
    let _scope = ActiveScope::enter(env.id());
    let controller = EscapeController { env: &env };
    catch_jumps(env.id(), || body(&controller))
}

/// Escapes to the innermost live recovery point of the current thread.
///
/// Fails loudly if there is none or if `code` is `Ok`.
pub fn escape(code: EscapeCode) -> ! {
    if code.is_ok() {
        fail_loudly(EscapeError::ReservedCode);
    }
    match ACTIVE.get() {
        Some(target) => throw_jump(target, code),
        None => fail_loudly(EscapeError::NoRecoveryPoint { code }),
    }
}

/// Returns true if an [`establish`] is currently running on this thread.
#[must_use]
pub fn is_established() -> bool {
    ACTIVE.get().is_some()
}

#[cold]
fn fail_loudly(err: EscapeError) -> ! {
    match config::orphan_policy() {
        OrphanPolicy::Panic => panic!("{err}"),
        OrphanPolicy::Abort => {
            eprintln!("errsig: fatal: {err}");
            std::process::abort()
        }
    }
}
