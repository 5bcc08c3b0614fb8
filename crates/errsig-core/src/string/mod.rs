//! String functions.
//!
//! Only the error-reporting corner of `<string.h>` is provided here.

pub mod strerror;

pub use strerror::strerror;
