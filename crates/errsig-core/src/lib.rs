//! # errsig-core
//!
//! Safe Rust implementations of the C error-signaling facilities:
//! non-local jumps (`<setjmp.h>`), thread-local `errno` with `strerror`,
//! and the `strtol` family with end-offset reporting.
//!
//! No `unsafe` code is permitted at the crate level. Non-local jumps are
//! carried by Rust unwinding, so the crate must be built with
//! `panic = "unwind"`.

#![deny(unsafe_code)]

pub mod config;
pub mod errno;
pub mod setjmp;
pub mod stdio;
pub mod stdlib;
pub mod string;
