//! Test execution engine.

use std::path::Path;
use std::time::{Duration, Instant};

use errsig_core::errno::errno_after;
use errsig_core::stdio::fopen;
use errsig_core::stdlib::{atoi, strtol, strtoul};
use errsig_core::string::strerror;

use crate::HarnessError;
use crate::fixtures::{FixtureCase, FixtureSet};
use crate::scenarios::{Flavor, run_escape};
use crate::structured_log::{LogEmitter, LogEntry, LogLevel, Outcome};
use crate::verify::{VerificationResult, render_diff};

/// Functions a fixture case may name.
pub const SUPPORTED_FUNCTIONS: [&str; 7] = [
    "strtol",
    "strtoul",
    "atoi",
    "strerror",
    "fopen",
    "twice",
    "twice_result",
];

/// Output and errno observed for one executed case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    pub output: String,
    pub errno: i32,
    /// Escape code name, for the `twice` family.
    pub escape_code: Option<&'static str>,
}

impl Execution {
    fn plain(output: String, errno: i32) -> Self {
        Self {
            output,
            errno,
            escape_code: None,
        }
    }
}

/// Runs a fixture set and collects verification results.
pub struct TestRunner {
    /// Name of the test campaign.
    pub campaign: String,
}

impl TestRunner {
    /// Create a new test runner.
    #[must_use]
    pub fn new(campaign: impl Into<String>) -> Self {
        Self {
            campaign: campaign.into(),
        }
    }

    /// Run all fixtures in a set and return results.
    pub fn run(&self, fixture_set: &FixtureSet) -> Vec<VerificationResult> {
        fixture_set
            .cases
            .iter()
            .map(|case| verify_case(&fixture_set.family, case).0)
            .collect()
    }

    /// Like [`TestRunner::run`], emitting one log entry per case.
    pub fn run_logged(
        &self,
        fixture_set: &FixtureSet,
        log: &mut LogEmitter,
    ) -> std::io::Result<Vec<VerificationResult>> {
        let mut results = Vec::with_capacity(fixture_set.cases.len());
        for case in &fixture_set.cases {
            let started = Instant::now();
            let (result, execution) = verify_case(&fixture_set.family, case);
            let elapsed = whole_millis(started.elapsed());

            let (level, outcome) = match (&execution, result.passed) {
                (None, _) => (LogLevel::Error, Outcome::Error),
                (Some(_), true) => (LogLevel::Info, Outcome::Pass),
                (Some(_), false) => (LogLevel::Warn, Outcome::Fail),
            };
            let mut entry = LogEntry::new(String::new(), level, "fixture_case")
                .with_campaign(&self.campaign)
                .with_scenario(&fixture_set.family, &case.function)
                .with_outcome(outcome)
                .with_errno(result.actual_errno)
                .with_duration_ms(elapsed)
                .with_details(serde_json::json!({
                    "case": case.name,
                    "expected": case.expected_output,
                    "actual": result.actual,
                }));
            if let Some(code) = execution.and_then(|e| e.escape_code) {
                entry = entry.with_escape_code(code);
            }
            log.emit_entry(entry)?;
            results.push(result);
        }
        Ok(results)
    }
}

/// Milliseconds in `d`, saturating at `u64::MAX`.
fn whole_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

fn verify_case(family: &str, case: &FixtureCase) -> (VerificationResult, Option<Execution>) {
    match execute_case(case) {
        Ok(run) => {
            let passed = run.output == case.expected_output && run.errno == case.expected_errno;
            let diff = (!passed).then(|| {
                let mut diff = render_diff(&case.expected_output, &run.output);
                if run.errno != case.expected_errno {
                    diff.push_str(&format!(
                        "errno: expected {}, got {}\n",
                        case.expected_errno, run.errno
                    ));
                }
                diff
            });
            let result = VerificationResult {
                case_name: case.name.clone(),
                family: family.to_string(),
                passed,
                expected: case.expected_output.clone(),
                actual: run.output.clone(),
                expected_errno: case.expected_errno,
                actual_errno: run.errno,
                diff,
            };
            (result, Some(run))
        }
        Err(err) => {
            let actual = format!("unsupported:{err}");
            let result = VerificationResult {
                case_name: case.name.clone(),
                family: family.to_string(),
                passed: false,
                diff: Some(render_diff(&case.expected_output, &actual)),
                expected: case.expected_output.clone(),
                actual,
                expected_errno: case.expected_errno,
                actual_errno: 0,
            };
            (result, None)
        }
    }
}

fn str_input<'a>(case: &'a FixtureCase, field: &'static str) -> Result<&'a str, HarnessError> {
    case.inputs
        .get(field)
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| bad_input(case, field))
}

fn int_input(case: &FixtureCase, field: &'static str) -> Result<i64, HarnessError> {
    case.inputs
        .get(field)
        .and_then(serde_json::Value::as_i64)
        .ok_or_else(|| bad_input(case, field))
}

fn i32_input(case: &FixtureCase, field: &'static str) -> Result<i32, HarnessError> {
    i32::try_from(int_input(case, field)?).map_err(|_| bad_input(case, field))
}

fn base_input(case: &FixtureCase) -> Result<i32, HarnessError> {
    if case.inputs.get("base").is_none() {
        return Ok(10);
    }
    i32_input(case, "base")
}

fn bad_input(case: &FixtureCase, field: &'static str) -> HarnessError {
    HarnessError::BadInput {
        function: case.function.clone(),
        field,
    }
}

/// Executes one case against errsig-core.
///
/// Output formats: `value:consumed` for `strtol`/`strtoul`, the value for
/// `atoi`, the message for `strerror`, `opened`/`null` for `fopen`, and
/// `CODE:result` for the `twice` family.
pub fn execute_case(case: &FixtureCase) -> Result<Execution, HarnessError> {
    match case.function.as_str() {
        "strtol" => {
            let s = str_input(case, "s")?;
            let base = base_input(case)?;
            let ((value, consumed), errno) = errno_after(|| strtol(s.as_bytes(), base));
            Ok(Execution::plain(format!("{value}:{consumed}"), errno))
        }
        "strtoul" => {
            let s = str_input(case, "s")?;
            let base = base_input(case)?;
            let ((value, consumed), errno) = errno_after(|| strtoul(s.as_bytes(), base));
            Ok(Execution::plain(format!("{value}:{consumed}"), errno))
        }
        "atoi" => {
            let s = str_input(case, "s")?;
            let (value, errno) = errno_after(|| atoi(s.as_bytes()));
            Ok(Execution::plain(value.to_string(), errno))
        }
        "strerror" => {
            let errnum = i32_input(case, "errnum")?;
            let (message, errno) = errno_after(|| strerror(errnum));
            Ok(Execution::plain(message.into_owned(), errno))
        }
        "fopen" => {
            let path = str_input(case, "path")?;
            let mode = str_input(case, "mode")?;
            let (file, errno) = errno_after(|| fopen(Path::new(path), mode));
            let output = if file.is_some() { "opened" } else { "null" };
            Ok(Execution::plain(output.to_string(), errno))
        }
        "twice" | "twice_result" => {
            let n = i32_input(case, "n")?;
            let flavor = if case.function == "twice_result" {
                Flavor::Result
            } else {
                match case.inputs.get("flavor").and_then(serde_json::Value::as_str) {
                    None => Flavor::Ambient,
                    Some(name) => {
                        Flavor::from_str_loose(name).ok_or_else(|| bad_input(case, "flavor"))?
                    }
                }
            };
            let (report, errno) = errno_after(|| run_escape(n, flavor));
            Ok(Execution {
                output: report.fixture_output(),
                errno,
                escape_code: Some(report.code.name()),
            })
        }
        other => Err(HarnessError::UnsupportedFunction(other.to_string())),
    }
}
