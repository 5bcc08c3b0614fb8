//! Non-local jumps.
//!
//! Implements the `<setjmp.h>` contract on top of Rust unwinding. C's
//! `setjmp` returns twice (0 on the direct call, the `longjmp` value when
//! resumed); here the two arrivals are the two arms of a `Result`:
//!
//! ```
//! use errsig_core::setjmp::{longjmp, setjmp};
//!
//! let resumed: Result<(), _> = setjmp(|env| longjmp(env, 7));
//! assert_eq!(resumed.unwrap_err().get(), 7);
//! ```
//!
//! A jump is a private unwind payload tagged with the id of its target
//! recovery point. Frames between the jump and the recovery point are
//! abandoned: statements after their calls never run. Their destructors do
//! run, so unlike C nothing held by an abandoned frame leaks.
//!
//! Jumps require `panic = "unwind"`. A `catch_unwind` placed between the jump
//! site and the recovery point intercepts the jump and must re-raise it with
//! `resume_unwind` to let it through.

pub mod escape;

use std::marker::PhantomData;
use std::num::NonZeroI32;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_POINT_ID: AtomicU64 = AtomicU64::new(1);

/// `longjmp(env, 0)` makes `setjmp` return 1, as POSIX requires.
const ZERO_JUMP_VALUE: NonZeroI32 = match NonZeroI32::new(1) {
    Some(v) => v,
    None => unreachable!(),
};

/// Opaque recovery point.
///
/// Only ever lent by reference to the body of [`setjmp`] (or wrapped by an
/// [`escape::EscapeController`]), so it cannot outlive the scope that armed
/// it. Neither `Send` nor `Sync`: a jump never crosses threads.
#[derive(Debug)]
pub struct JmpBuf {
    id: u64,
    _thread_bound: PhantomData<*const ()>,
}

impl JmpBuf {
    pub(crate) fn arm() -> Self {
        Self {
            id: NEXT_POINT_ID.fetch_add(1, Ordering::Relaxed),
            _thread_bound: PhantomData,
        }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }
}

struct Jump<V> {
    target: u64,
    value: V,
}

/// Runs `body`, converting a jump aimed at `target` into `Err(value)`.
///
/// Jumps aimed elsewhere and ordinary panics are re-raised untouched.
pub(crate) fn catch_jumps<T, V, F>(target: u64, body: F) -> Result<T, V>
where
    V: Send + 'static,
    F: FnOnce() -> T,
{
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(value) => Ok(value),
        Err(payload) => match payload.downcast::<Jump<V>>() {
            Ok(jump) if jump.target == target => Err(jump.value),
            Ok(jump) => panic::resume_unwind(jump),
            Err(other) => panic::resume_unwind(other),
        },
    }
}

/// Starts unwinding toward the recovery point `target`.
pub(crate) fn throw_jump<V>(target: u64, value: V) -> !
where
    V: Send + 'static,
{
    // resume_unwind skips the panic hook: a jump is control flow, not a crash.
    panic::resume_unwind(Box::new(Jump { target, value }))
}

/// Arms a recovery point and runs `body` with it.
///
/// Equivalent to C `setjmp` followed by the code guarded by it. Returns
/// `Ok` with the body's value when it completes normally, or `Err` with the
/// value passed to [`longjmp`] when control came back through a jump.
pub fn setjmp<T, F>(body: F) -> Result<T, NonZeroI32>
where
    F: FnOnce(&JmpBuf) -> T,
{
    let env = JmpBuf::arm();
    catch_jumps(env.id(), || body(&env))
}

/// Transfers control back to the [`setjmp`] that armed `env`.
///
/// Equivalent to C `longjmp`. `val` is what `setjmp` reports; a `val` of 0
/// is delivered as 1.
pub fn longjmp(env: &JmpBuf, val: i32) -> ! {
    let val = NonZeroI32::new(val).unwrap_or(ZERO_JUMP_VALUE);
    throw_jump(env.id(), val)
}
