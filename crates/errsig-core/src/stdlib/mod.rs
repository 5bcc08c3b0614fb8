//! Standard library utilities.
//!
//! Implements the `<stdlib.h>` numeric conversion functions.

pub mod conversion;

pub use conversion::{ConversionStatus, atoi, atol, strtol, strtoul};
