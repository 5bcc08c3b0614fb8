//! CLI entrypoint for the errsig scenario runner and conformance harness.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use errsig_harness::scenarios::{self, Flavor};
use errsig_harness::structured_log::{
    ArtifactIndex, LogEmitter, LogEntry, LogLevel, Outcome, now_utc, validate_log_file,
};
use errsig_harness::verify::VerificationSummary;
use errsig_harness::{ConformanceReport, FixtureSet, TestRunner};

/// Error-signaling walkthroughs and conformance tooling for errsig.
#[derive(Debug, Parser)]
#[command(name = "harness")]
#[command(about = "Scenario runner and conformance harness for errsig")]
struct Cli {
    /// Write structured JSONL events for this run to PATH.
    #[arg(long, global = true)]
    log: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the twice -> twice4 chain under one recovery point.
    Escape {
        /// Value handed to `twice`.
        #[arg(long, allow_hyphen_values = true, default_value_t = 1000)]
        input: i32,
        /// Which implementation of the chain to run.
        #[arg(long, value_enum, default_value_t = Flavor::Ambient)]
        flavor: Flavor,
    },
    /// Parse each input with strtol and print value and consumed length.
    Strtol {
        /// Numeric base (0 autodetects, otherwise 2..=36).
        #[arg(long, default_value_t = 10, allow_hyphen_values = true)]
        base: i32,
        /// Strings to parse.
        #[arg(required = true, allow_hyphen_values = true)]
        inputs: Vec<String>,
    },
    /// Show errno at startup and after a failed fopen.
    Errno {
        /// File to open read-only.
        #[arg(long, default_value = scenarios::errno::DEFAULT_MISSING_PATH)]
        path: PathBuf,
    },
    /// Replay all three walkthroughs with their classic inputs.
    Demo,
    /// Verify errsig-core against JSON fixture sets.
    Verify {
        /// Directory containing fixture JSON files.
        #[arg(long)]
        fixture: PathBuf,
        /// Output report path (markdown; JSON and artifact index alongside).
        #[arg(long)]
        report: Option<PathBuf>,
        /// Fixed report timestamp, for reproducible output.
        #[arg(long)]
        timestamp: Option<String>,
    },
    /// Validate a structured JSONL log file.
    ValidateLog {
        /// JSONL file to validate.
        #[arg(long)]
        file: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let run_id = format!("run-{}", std::process::id());
    let campaign = campaign_name(&cli.command);
    let mut log = match &cli.log {
        Some(path) => LogEmitter::to_file(path, campaign, &run_id)?,
        None => LogEmitter::sink(campaign, &run_id),
    };
    log.emit(LogLevel::Info, "run_start")?;

    let outcome = dispatch(cli.command, &mut log);

    let (level, status) = match &outcome {
        Ok(()) => (LogLevel::Info, Outcome::Pass),
        Err(_) => (LogLevel::Error, Outcome::Fail),
    };
    let mut end = LogEntry::new(String::new(), level, "run_end").with_outcome(status);
    if let Err(err) = &outcome {
        end = end.with_details(serde_json::json!({ "error": err.to_string() }));
    }
    log.emit_entry(end)?;
    log.flush()?;
    outcome
}

fn campaign_name(command: &Command) -> &'static str {
    match command {
        Command::Escape { .. } => "escape",
        Command::Strtol { .. } => "strtol",
        Command::Errno { .. } => "errno",
        Command::Demo => "demo",
        Command::Verify { .. } => "verify",
        Command::ValidateLog { .. } => "validate-log",
    }
}

fn dispatch(command: Command, log: &mut LogEmitter) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Escape { input, flavor } => escape(input, flavor, log)?,
        Command::Strtol { base, inputs } => {
            for input in &inputs {
                strtol(input, base, true, log)?;
            }
        }
        Command::Errno { path } => errno(&path, log)?,
        Command::Demo => {
            println!("== escape ==");
            escape(1000, Flavor::Ambient, log)?;
            println!("== strtol ==");
            for report in scenarios::source_strtol_cases() {
                print_lines(&report.lines());
                log_strtol(&report, log)?;
            }
            println!("== errno ==");
            errno(Path::new(scenarios::errno::DEFAULT_MISSING_PATH), log)?;
        }
        Command::Verify {
            fixture,
            report,
            timestamp,
        } => verify(&fixture, report.as_deref(), timestamp, log)?,
        Command::ValidateLog { file: path } => {
            let (lines, errors) = validate_log_file(&path)?;
            for err in &errors {
                eprintln!("{err}");
            }
            eprintln!(
                "Validated {}: lines={}, errors={}",
                path.display(),
                lines,
                errors.len()
            );
            if !errors.is_empty() {
                return Err(format!("{} invalid log field(s)", errors.len()).into());
            }
        }
    }
    Ok(())
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}

fn escape(input: i32, flavor: Flavor, log: &mut LogEmitter) -> std::io::Result<()> {
    let report = scenarios::run_escape(input, flavor);
    print_lines(&report.lines());
    log.emit_entry(
        LogEntry::new(String::new(), LogLevel::Info, "escape_observed")
            .with_scenario("escape", "establish")
            .with_outcome(Outcome::Pass)
            .with_escape_code(report.code.name())
            .with_details(serde_json::to_value(&report)?),
    )
}

fn strtol(input: &str, base: i32, show: bool, log: &mut LogEmitter) -> std::io::Result<()> {
    let report = scenarios::run_strtol(input, base, show);
    print_lines(&report.lines());
    log_strtol(&report, log)
}

fn log_strtol(report: &scenarios::ParseReport, log: &mut LogEmitter) -> std::io::Result<()> {
    log.emit_entry(
        LogEntry::new(String::new(), LogLevel::Info, "strtol_parsed")
            .with_scenario("strtol", "strtol")
            .with_errno(report.errno)
            .with_details(serde_json::to_value(report)?),
    )
}

fn errno(path: &Path, log: &mut LogEmitter) -> Result<(), Box<dyn std::error::Error>> {
    let report = scenarios::run_errno(path)?;
    print_lines(&report.lines());
    let observed = report
        .after_failed_open
        .as_ref()
        .map_or(report.at_startup.value, |snap| snap.value);
    log.emit_entry(
        LogEntry::new(String::new(), LogLevel::Info, "errno_observed")
            .with_scenario("errno", "fopen")
            .with_errno(observed)
            .with_details(serde_json::to_value(&report)?),
    )?;
    Ok(())
}

fn verify(
    fixture: &Path,
    report: Option<&Path>,
    timestamp: Option<String>,
    log: &mut LogEmitter,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Verifying against fixtures in {}", fixture.display());
    let fixture_sets = FixtureSet::load_dir(fixture)?;
    if fixture_sets.is_empty() {
        return Err(format!("No fixture JSON files found in {}", fixture.display()).into());
    }

    let runner = TestRunner::new("fixture-verify");
    let mut results = Vec::new();
    for set in &fixture_sets {
        results.extend(runner.run_logged(set, log)?);
    }

    let summary = VerificationSummary::from_results(results);
    let report_doc = ConformanceReport {
        title: String::from("errsig Conformance Report"),
        families: fixture_sets.iter().map(|s| s.family.clone()).collect(),
        timestamp: timestamp.unwrap_or_else(now_utc),
        summary,
    };

    eprintln!(
        "Verification complete: total={}, passed={}, failed={}",
        report_doc.summary.total, report_doc.summary.passed, report_doc.summary.failed
    );
    for failure in report_doc.summary.failures() {
        eprintln!("FAIL {}", failure.case_name);
        if let Some(diff) = &failure.diff {
            eprint!("{diff}");
        }
    }

    if let Some(report_path) = report {
        if let Some(parent) = report_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        eprintln!("Writing report to {}", report_path.display());
        std::fs::write(report_path, report_doc.to_markdown())?;
        let json_path = report_path.with_extension("json");
        std::fs::write(&json_path, report_doc.to_json())?;

        let mut index = ArtifactIndex::new(report_run_id(report_path), "fixture-verify");
        index.add_file(report_path, "report_markdown")?;
        index.add_file(&json_path, "report_json")?;
        let index_path = report_path.with_extension("index.json");
        std::fs::write(&index_path, index.to_json()?)?;
        eprintln!("Wrote artifact index to {}", index_path.display());
    }

    if !report_doc.summary.all_passed() {
        return Err("Conformance verification failed".into());
    }
    Ok(())
}

fn report_run_id(report_path: &Path) -> String {
    report_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("report")
        .to_string()
}
