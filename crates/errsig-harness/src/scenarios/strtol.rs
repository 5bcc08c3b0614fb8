//! Numeric parsing with partial-success reporting.

use serde::Serialize;

use errsig_core::errno;
use errsig_core::stdlib::conversion::strtol;

/// One `strtol` call as the walkthrough reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseReport {
    pub input: String,
    pub base: i32,
    pub value: i64,
    /// Bytes consumed, i.e. the end-pointer offset. 0 when nothing parsed.
    pub consumed: usize,
    pub errno: i32,
    /// Whether the walkthrough also prints the consumed count.
    pub show_consumed: bool,
}

impl ParseReport {
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![format!("Parsed value of '{}' is {}", self.input, self.value)];
        if self.show_consumed {
            lines.push(format!("Parsed {} characters", self.consumed));
        }
        lines
    }

    /// Whether the whole input (ignoring trailing whitespace) was a number.
    #[must_use]
    pub fn fully_consumed(&self) -> bool {
        self.consumed > 0 && self.input[self.consumed..].trim().is_empty()
    }
}

/// Parses `input` with `strtol`, capturing the errno it leaves behind.
#[must_use]
pub fn run_strtol(input: &str, base: i32, show_consumed: bool) -> ParseReport {
    let ((value, consumed), errno) = errno::errno_after(|| strtol(input.as_bytes(), base));
    ParseReport {
        input: input.to_string(),
        base,
        value,
        consumed,
        errno,
        show_consumed,
    }
}

/// The inputs of the classic strtol walkthrough: three value-only calls,
/// then three calls that also report the end offset.
#[must_use]
pub fn source_strtol_cases() -> Vec<ParseReport> {
    let value_only = ["0", "12", "fdjkfnskxg"];
    let with_offset = ["    12  ", "   0", "fdjkfnskxg"];
    value_only
        .into_iter()
        .map(|s| run_strtol(s, 10, false))
        .chain(with_offset.into_iter().map(|s| run_strtol(s, 10, true)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walkthrough_lines() {
        let lines: Vec<String> = source_strtol_cases()
            .iter()
            .flat_map(ParseReport::lines)
            .collect();
        assert_eq!(
            lines,
            vec![
                "Parsed value of '0' is 0",
                "Parsed value of '12' is 12",
                "Parsed value of 'fdjkfnskxg' is 0",
                "Parsed value of '    12  ' is 12",
                "Parsed 6 characters",
                "Parsed value of '   0' is 0",
                "Parsed 4 characters",
                "Parsed value of 'fdjkfnskxg' is 0",
                "Parsed 0 characters",
            ]
        );
    }

    #[test]
    fn garbage_is_distinguishable_from_zero() {
        let zero = run_strtol("0", 10, true);
        let garbage = run_strtol("fdjkfnskxg", 10, true);
        assert_eq!(zero.value, garbage.value);
        assert!(zero.fully_consumed());
        assert!(!garbage.fully_consumed());
    }

    #[test]
    fn overflow_reports_erange() {
        let report = run_strtol("99999999999999999999", 10, true);
        assert_eq!(report.value, i64::MAX);
        assert_eq!(report.errno, errno::ERANGE);
        assert_eq!(report.consumed, 20);
    }

    #[test]
    fn trailing_text_is_partial_success() {
        let report = run_strtol("42abc", 10, true);
        assert_eq!((report.value, report.consumed), (42, 2));
        assert!(!report.fully_consumed());
        assert_eq!(report.errno, 0);
    }
}
