//! Error number definitions.
//!
//! Implements `<errno.h>` support with thread-local errno storage. Each
//! thread starts with errno 0 ("Success"); functions in this crate only
//! write errno on failure, never clear it on success, matching C.

use std::cell::Cell;
use std::io;

thread_local! {
    static ERRNO: Cell<i32> = const { Cell::new(0) };
}

macro_rules! errno_table {
    ($( $name:ident = $value:literal => $message:literal ),+ $(,)?) => {
        $(
            pub const $name: i32 = $value;
        )+

        /// Symbolic name for a known errno value (`"ENOENT"` for 2).
        #[must_use]
        pub fn name(errnum: i32) -> Option<&'static str> {
            match errnum {
                $( $value => Some(stringify!($name)), )+
                _ => None,
            }
        }

        /// glibc message text for a known errno value.
        #[must_use]
        pub fn message(errnum: i32) -> Option<&'static str> {
            match errnum {
                $( $value => Some($message), )+
                _ => None,
            }
        }
    };
}

errno_table! {
    EPERM = 1 => "Operation not permitted",
    ENOENT = 2 => "No such file or directory",
    ESRCH = 3 => "No such process",
    EINTR = 4 => "Interrupted system call",
    EIO = 5 => "Input/output error",
    ENXIO = 6 => "No such device or address",
    E2BIG = 7 => "Argument list too long",
    ENOEXEC = 8 => "Exec format error",
    EBADF = 9 => "Bad file descriptor",
    ECHILD = 10 => "No child processes",
    EAGAIN = 11 => "Resource temporarily unavailable",
    ENOMEM = 12 => "Cannot allocate memory",
    EACCES = 13 => "Permission denied",
    EFAULT = 14 => "Bad address",
    ENOTBLK = 15 => "Block device required",
    EBUSY = 16 => "Device or resource busy",
    EEXIST = 17 => "File exists",
    EXDEV = 18 => "Invalid cross-device link",
    ENODEV = 19 => "No such device",
    ENOTDIR = 20 => "Not a directory",
    EISDIR = 21 => "Is a directory",
    EINVAL = 22 => "Invalid argument",
    ENFILE = 23 => "Too many open files in system",
    EMFILE = 24 => "Too many open files",
    ENOTTY = 25 => "Inappropriate ioctl for device",
    ETXTBSY = 26 => "Text file busy",
    EFBIG = 27 => "File too large",
    ENOSPC = 28 => "No space left on device",
    ESPIPE = 29 => "Illegal seek",
    EROFS = 30 => "Read-only file system",
    EMLINK = 31 => "Too many links",
    EPIPE = 32 => "Broken pipe",
    EDOM = 33 => "Numerical argument out of domain",
    ERANGE = 34 => "Numerical result out of range",
    ENAMETOOLONG = 36 => "File name too long",
    ENOSYS = 38 => "Function not implemented",
    ENOTEMPTY = 39 => "Directory not empty",
    ELOOP = 40 => "Too many levels of symbolic links",
    EOVERFLOW = 75 => "Value too large for defined data type",
    ETIMEDOUT = 110 => "Connection timed out",
    ECONNREFUSED = 111 => "Connection refused",
}

/// Returns the current thread-local errno value.
///
/// Equivalent to reading C `errno`.
pub fn get_errno() -> i32 {
    ERRNO.get()
}

/// Sets the current thread-local errno value.
///
/// Equivalent to assigning to C `errno`.
pub fn set_errno(value: i32) {
    ERRNO.set(value);
}

/// Clears errno, runs `f`, and returns its result together with the errno
/// value `f` left behind.
///
/// This is the C idiom `errno = 0; r = f(); if (errno) ...` in one call.
/// The caller's previous errno is not restored.
pub fn errno_after<F, R>(f: F) -> (R, i32)
where
    F: FnOnce() -> R,
{
    set_errno(0);
    let result = f();
    (result, get_errno())
}

/// Maps an I/O error to the errno value a C library would have reported.
///
/// The raw OS code wins when present; synthetic errors fall back to a
/// mapping from [`io::ErrorKind`].
#[must_use]
pub fn errno_from_io(err: &io::Error) -> i32 {
    if let Some(raw) = err.raw_os_error() {
        return raw;
    }
    match err.kind() {
        io::ErrorKind::NotFound => ENOENT,
        io::ErrorKind::PermissionDenied => EACCES,
        io::ErrorKind::AlreadyExists => EEXIST,
        io::ErrorKind::InvalidInput => EINVAL,
        io::ErrorKind::Interrupted => EINTR,
        io::ErrorKind::WouldBlock => EAGAIN,
        io::ErrorKind::BrokenPipe => EPIPE,
        io::ErrorKind::TimedOut => ETIMEDOUT,
        io::ErrorKind::ConnectionRefused => ECONNREFUSED,
        io::ErrorKind::OutOfMemory => ENOMEM,
        _ => EIO,
    }
}
