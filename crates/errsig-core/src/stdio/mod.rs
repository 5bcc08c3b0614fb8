//! Standard I/O.
//!
//! Only stream opening is provided: `fopen` over `std::fs` with C mode
//! strings and errno reporting.

pub mod file;

pub use file::{OpenMode, fopen};
