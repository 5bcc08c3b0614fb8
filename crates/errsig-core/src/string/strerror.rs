//! `strerror`: errno value to human-readable text.

use std::borrow::Cow;

use crate::errno;

/// Returns the message for `errnum`, as glibc's `strerror` would.
///
/// `0` is `"Success"`. Values outside the known table produce
/// `"Unknown error N"`.
#[must_use]
pub fn strerror(errnum: i32) -> Cow<'static, str> {
    if errnum == 0 {
        return Cow::Borrowed("Success");
    }
    match errno::message(errnum) {
        Some(msg) => Cow::Borrowed(msg),
        None => Cow::Owned(format!("Unknown error {errnum}")),
    }
}
