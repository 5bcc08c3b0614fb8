//! Numeric conversion functions (atoi, atol, strtol, strtoul).
//!
//! Every conversion reports how many bytes it consumed, which is the offset
//! C callers recover from `endptr`. A consumed count of 0 means no digits
//! were found and the input was not touched, even if whitespace or a sign
//! preceded the failure.

use crate::errno::{self, EINVAL, ERANGE};

/// Result of a string-to-number conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionStatus {
    Success,
    Overflow,
    Underflow,
    InvalidBase,
}

impl ConversionStatus {
    /// errno a conforming `strtol` leaves behind for this status.
    #[must_use]
    pub const fn errno(self) -> Option<i32> {
        match self {
            Self::Success => None,
            Self::Overflow | Self::Underflow => Some(ERANGE),
            Self::InvalidBase => Some(EINVAL),
        }
    }
}

// ----------------------------------------------------------------------------
// Shared scanning
// ----------------------------------------------------------------------------

/// Sign and radix resolved ahead of the digit run.
struct Prefix {
    negative: bool,
    radix: u64,
    digits_at: usize,
}

/// C `isspace` in the "C" locale. Unlike `u8::is_ascii_whitespace` this
/// includes vertical tab.
fn is_c_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\x0b' | b'\x0c' | b'\r')
}

fn base_is_valid(base: i32) -> bool {
    base == 0 || (2..=36).contains(&base)
}

fn digit_value(c: u8) -> Option<u64> {
    let d = match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'z' => c - b'a' + 10,
        b'A'..=b'Z' => c - b'A' + 10,
        _ => return None,
    };
    Some(u64::from(d))
}

fn parse_prefix(s: &[u8], base: i32) -> Prefix {
    let mut i = s.iter().take_while(|&&c| is_c_space(c)).count();

    let mut negative = false;
    match s.get(i) {
        Some(b'-') => {
            negative = true;
            i += 1;
        }
        Some(b'+') => i += 1,
        _ => {}
    }

    // "0x" only counts as a prefix when a hex digit follows; otherwise the
    // leading 0 is parsed on its own and scanning stops at the 'x'.
    let hex_prefix = s.get(i) == Some(&b'0')
        && matches!(s.get(i + 1), Some(b'x' | b'X'))
        && s.get(i + 2).is_some_and(u8::is_ascii_hexdigit);

    let radix = match base {
        0 | 16 if hex_prefix => {
            i += 2;
            16
        }
        0 if s.get(i) == Some(&b'0') => 8,
        0 => 10,
        b => u64::from(b.unsigned_abs()),
    };

    Prefix {
        negative,
        radix,
        digits_at: i,
    }
}

/// Accumulates the digit run, saturating once the magnitude exceeds `limit`.
///
/// Returns `(magnitude, end, overflowed)`, or `None` when no digit was seen.
/// Digits past an overflow are still consumed.
fn accumulate(s: &[u8], prefix: &Prefix, limit: u64) -> Option<(u64, usize, bool)> {
    let mut acc: u64 = 0;
    let mut overflow = false;
    let mut i = prefix.digits_at;

    while let Some(d) = s
        .get(i)
        .copied()
        .and_then(digit_value)
        .filter(|&d| d < prefix.radix)
    {
        if !overflow {
            match acc
                .checked_mul(prefix.radix)
                .and_then(|v| v.checked_add(d))
                .filter(|&v| v <= limit)
            {
                Some(v) => acc = v,
                None => overflow = true,
            }
        }
        i += 1;
    }

    (i > prefix.digits_at).then_some((acc, i, overflow))
}

// ----------------------------------------------------------------------------
// Concrete Implementations
// ----------------------------------------------------------------------------

pub fn atoi(s: &[u8]) -> i32 {
    let (val, _, _) = strtol_impl(s, 10);
    val as i32
}

pub fn atol(s: &[u8]) -> i64 {
    let (val, _, _) = strtol_impl(s, 10);
    val
}

/// Helper for strtol: returns (value, consumed_bytes, status). Never touches
/// errno.
pub fn strtol_impl(s: &[u8], base: i32) -> (i64, usize, ConversionStatus) {
    if !base_is_valid(base) {
        return (0, 0, ConversionStatus::InvalidBase);
    }

    let prefix = parse_prefix(s, base);
    let limit = if prefix.negative {
        i64::MIN.unsigned_abs()
    } else {
        i64::MAX.unsigned_abs()
    };

    let Some((magnitude, end, overflow)) = accumulate(s, &prefix, limit) else {
        return (0, 0, ConversionStatus::Success);
    };

    match (overflow, prefix.negative) {
        (true, true) => (i64::MIN, end, ConversionStatus::Underflow),
        (true, false) => (i64::MAX, end, ConversionStatus::Overflow),
        (false, true) => (0i64.wrapping_sub_unsigned(magnitude), end, ConversionStatus::Success),
        (false, false) => (magnitude as i64, end, ConversionStatus::Success),
    }
}

/// `strtol`: returns (value, consumed_bytes) and sets errno to `ERANGE` on
/// overflow or `EINVAL` for an unsupported base.
pub fn strtol(s: &[u8], base: i32) -> (i64, usize) {
    let (val, len, status) = strtol_impl(s, base);
    if let Some(code) = status.errno() {
        errno::set_errno(code);
    }
    (val, len)
}

/// Helper for strtoul. A leading '-' negates the parsed magnitude modulo 2^64,
/// as C does.
pub fn strtoul_impl(s: &[u8], base: i32) -> (u64, usize, ConversionStatus) {
    if !base_is_valid(base) {
        return (0, 0, ConversionStatus::InvalidBase);
    }

    let prefix = parse_prefix(s, base);
    let Some((magnitude, end, overflow)) = accumulate(s, &prefix, u64::MAX) else {
        return (0, 0, ConversionStatus::Success);
    };

    if overflow {
        return (u64::MAX, end, ConversionStatus::Overflow);
    }

    let val = if prefix.negative {
        magnitude.wrapping_neg()
    } else {
        magnitude
    };
    (val, end, ConversionStatus::Success)
}

pub fn strtoul(s: &[u8], base: i32) -> (u64, usize) {
    let (val, len, status) = strtoul_impl(s, base);
    if let Some(code) = status.errno() {
        errno::set_errno(code);
    }
    (val, len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errno::{get_errno, set_errno};

    #[test]
    fn test_atoi_basic() {
        assert_eq!(atoi(b"42"), 42);
        assert_eq!(atoi(b"-42"), -42);
        assert_eq!(atoi(b"   123"), 123);
        assert_eq!(atoi(b"fdjkfnskxg"), 0);
    }

    #[test]
    fn test_strtol_partial_success_offsets() {
        assert_eq!(strtol(b"0", 10), (0, 1));
        assert_eq!(strtol(b"12", 10), (12, 2));
        assert_eq!(strtol(b"fdjkfnskxg", 10), (0, 0));
        assert_eq!(strtol(b"    12  ", 10), (12, 6));
        assert_eq!(strtol(b"   0", 10), (0, 4));
    }

    #[test]
    fn test_strtol_no_digits_consumes_nothing() {
        assert_eq!(strtol(b"", 10), (0, 0));
        assert_eq!(strtol(b"    ", 10), (0, 0));
        assert_eq!(strtol(b"  -", 10), (0, 0));
        assert_eq!(strtol(b"+x", 10), (0, 0));
    }

    #[test]
    fn test_strtol_stops_at_nul() {
        assert_eq!(strtol(b"17\x0099", 10), (17, 2));
    }

    #[test]
    fn test_strtol_vertical_tab_is_space() {
        assert_eq!(strtol(b"\x0b\x0c5", 10), (5, 3));
    }

    #[test]
    fn test_strtol_base10() {
        let (val, len) = strtol(b"123456", 10);
        assert_eq!(val, 123456);
        assert_eq!(len, 6);
    }

    #[test]
    fn test_strtol_base16() {
        let (val, len) = strtol(b"0xFF", 16);
        assert_eq!(val, 255);
        assert_eq!(len, 4);

        let (val, len) = strtol(b"FF", 16);
        assert_eq!(val, 255);
        assert_eq!(len, 2);
    }

    #[test]
    fn test_strtol_base36_and_binary() {
        assert_eq!(strtol(b"zz", 36), (1295, 2));
        assert_eq!(strtol(b"1012", 2), (5, 3));
    }

    #[test]
    fn test_strtol_auto_base() {
        let (val, _) = strtol(b"0x10", 0);
        assert_eq!(val, 16);
        let (val, _) = strtol(b"010", 0);
        assert_eq!(val, 8);
        let (val, _) = strtol(b"10", 0);
        assert_eq!(val, 10);
        let (val, len) = strtol(b"-0x1f", 0);
        assert_eq!(val, -31);
        assert_eq!(len, 5);
    }

    #[test]
    fn test_strtol_overflow() {
        let max = i64::MAX;
        let s = format!("{}", max);
        let (val, _, status) = strtol_impl(s.as_bytes(), 10);
        assert_eq!(val, max);
        assert_eq!(status, ConversionStatus::Success);

        let s_over = "9223372036854775808"; // MAX + 1
        let (val, len, status) = strtol_impl(s_over.as_bytes(), 10);
        assert_eq!(val, i64::MAX);
        assert_eq!(len, s_over.len());
        assert_eq!(status, ConversionStatus::Overflow);

        let min = i64::MIN;
        let s_min = format!("{}", min);
        let (val, _, status) = strtol_impl(s_min.as_bytes(), 10);
        assert_eq!(val, min);
        assert_eq!(status, ConversionStatus::Success);

        let s_under = "-9223372036854775809"; // MIN - 1
        let (val, _, status) = strtol_impl(s_under.as_bytes(), 10);
        assert_eq!(val, i64::MIN);
        assert_eq!(status, ConversionStatus::Underflow);
    }

    #[test]
    fn test_strtol_sets_errno_only_on_failure() {
        set_errno(0);
        let _ = strtol(b"42", 10);
        assert_eq!(get_errno(), 0);

        let _ = strtol(b"99999999999999999999", 10);
        assert_eq!(get_errno(), ERANGE);

        set_errno(0);
        assert_eq!(strtol(b"12", 1), (0, 0));
        assert_eq!(get_errno(), EINVAL);

        set_errno(0);
        assert_eq!(strtol(b"12", 37), (0, 0));
        assert_eq!(get_errno(), EINVAL);
    }

    #[test]
    fn test_strtoul_overflow() {
        let max = u64::MAX;
        let s = format!("{}", max);
        let (val, _, status) = strtoul_impl(s.as_bytes(), 10);
        assert_eq!(val, max);
        assert_eq!(status, ConversionStatus::Success);

        let s_over = "18446744073709551616"; // MAX + 1
        let (val, _, status) = strtoul_impl(s_over.as_bytes(), 10);
        assert_eq!(val, u64::MAX);
        assert_eq!(status, ConversionStatus::Overflow);
    }

    #[test]
    fn test_strtoul_negation_wraps() {
        assert_eq!(strtoul(b"-1", 10), (u64::MAX, 2));
    }

    #[test]
    fn test_strtol_0x_edge_cases() {
        // "0xz" base 0 -> parses "0", stops at 'x'
        let (val, len) = strtol(b"0xz", 0);
        assert_eq!(val, 0);
        assert_eq!(len, 1);

        // "0xz" base 16 -> parses "0", stops at 'x'
        let (val, len) = strtol(b"0xz", 16);
        assert_eq!(val, 0);
        assert_eq!(len, 1);

        // "0x" base 0 -> parses "0", stops at 'x'
        let (val, len) = strtol(b"0x", 0);
        assert_eq!(val, 0);
        assert_eq!(len, 1);

        // "0x1" base 0 -> parses "0x1" (16)
        let (val, len) = strtol(b"0x1", 0);
        assert_eq!(val, 1);
        assert_eq!(len, 3);

        // "0x1" base 10 -> the prefix is not special
        let (val, len) = strtol(b"0x1", 10);
        assert_eq!(val, 0);
        assert_eq!(len, 1);
    }
}
