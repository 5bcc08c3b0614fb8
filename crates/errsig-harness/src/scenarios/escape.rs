//! Deep-call-stack escape: `twice` -> `twice2` -> `twice3` -> `twice4`.
//!
//! `twice4` doubles inputs in `[0, 100]` and rejects anything else by
//! escaping straight back to the establishing frame. The chain exists in
//! three flavors that must be observably identical:
//! - [`Flavor::Ambient`]: escape to the thread's innermost recovery point,
//!   the shape of the classic `setjmp`/`longjmp` program
//! - [`Flavor::Handle`]: escape through an explicit controller handle
//! - [`Flavor::Result`]: no unwinding; `Result` propagated with `?`

use serde::{Serialize, Serializer};

use errsig_core::setjmp::escape::{
    Attempt, EscapeCode, EscapeController, attempt_code, establish, escape,
};

use super::Transcript;

pub const MAX_ACCEPTED: i32 = 100;

/// Which implementation of the call chain to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Flavor {
    Ambient,
    Handle,
    Result,
}

impl Flavor {
    pub const ALL: [Self; 3] = [Self::Ambient, Self::Handle, Self::Result];

    #[must_use]
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ambient" | "global" | "longjmp" => Some(Self::Ambient),
            "handle" | "controller" => Some(Self::Handle),
            "result" | "checked" => Some(Self::Result),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ambient => "ambient",
            Self::Handle => "handle",
            Self::Result => "result",
        }
    }
}

/// Classifies `n`, noting the rejection the way the walkthrough prints it.
fn check(n: i32, transcript: &Transcript) -> Result<i32, EscapeCode> {
    if n < 0 {
        transcript.note(format!("(!) Negative value: {n}"));
        Err(EscapeCode::NegativeValue)
    } else if n > MAX_ACCEPTED {
        transcript.note(format!("(!) Too big value: {n}"));
        Err(EscapeCode::TooBigValue)
    } else {
        Ok(2 * n)
    }
}

mod ambient {
    use super::*;

    fn twice4(n: i32, t: &Transcript) -> i32 {
        match check(n, t) {
            Ok(v) => v,
            Err(code) => escape(code),
        }
    }

    fn twice3(n: i32, t: &Transcript) -> i32 {
        twice4(n, t)
    }

    fn twice2(n: i32, t: &Transcript) -> i32 {
        twice3(n, t)
    }

    pub(super) fn twice(n: i32, t: &Transcript) -> i32 {
        twice2(n, t)
    }
}

mod handle {
    use super::*;

    fn twice4(ctl: &EscapeController<'_>, n: i32, t: &Transcript) -> i32 {
        match check(n, t) {
            Ok(v) => v,
            Err(code) => ctl.escape(code),
        }
    }

    fn twice3(ctl: &EscapeController<'_>, n: i32, t: &Transcript) -> i32 {
        twice4(ctl, n, t)
    }

    fn twice2(ctl: &EscapeController<'_>, n: i32, t: &Transcript) -> i32 {
        twice3(ctl, n, t)
    }

    pub(super) fn twice(ctl: &EscapeController<'_>, n: i32, t: &Transcript) -> i32 {
        twice2(ctl, n, t)
    }
}

mod checked {
    use super::*;

    fn twice4(n: i32, t: &Transcript) -> Result<i32, EscapeCode> {
        check(n, t)
    }

    fn twice3(n: i32, t: &Transcript) -> Result<i32, EscapeCode> {
        let v = twice4(n, t)?;
        Ok(v)
    }

    fn twice2(n: i32, t: &Transcript) -> Result<i32, EscapeCode> {
        let v = twice3(n, t)?;
        Ok(v)
    }

    pub(super) fn twice(n: i32, t: &Transcript) -> Result<i32, EscapeCode> {
        let v = twice2(n, t)?;
        Ok(v)
    }
}

/// What the establishing frame observed for one input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EscapeReport {
    pub input: i32,
    pub flavor: Flavor,
    #[serde(serialize_with = "serialize_code")]
    pub code: EscapeCode,
    pub result: Option<i32>,
    /// Lines printed below the establishing frame before control returned.
    pub transcript: Vec<String>,
}

impl EscapeReport {
    /// The line the establishing frame prints.
    #[must_use]
    pub fn outcome_line(&self) -> String {
        match self.result {
            Some(result) => format!("Twice of {} is {}", self.input, result),
            None => format!("Error code {}", self.code.as_raw()),
        }
    }

    /// Everything the walkthrough prints, in order.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = self.transcript.clone();
        lines.push(self.outcome_line());
        lines
    }

    /// Compact `CODE:result` form used by fixtures, e.g. `OK:100` or
    /// `TOO_BIG_VALUE:-`.
    #[must_use]
    pub fn fixture_output(&self) -> String {
        match self.result {
            Some(result) => format!("{}:{}", self.code.name(), result),
            None => format!("{}:-", self.code.name()),
        }
    }
}

fn serialize_code<S: Serializer>(code: &EscapeCode, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(code.name())
}

/// Runs the chain for `input` under a single recovery point and reports
/// what the establishing frame saw.
#[must_use]
pub fn run_escape(input: i32, flavor: Flavor) -> EscapeReport {
    let transcript = Transcript::default();
    let attempt: Attempt<i32> = match flavor {
        Flavor::Ambient => establish(|_| ambient::twice(input, &transcript)),
        Flavor::Handle => establish(|ctl| handle::twice(ctl, input, &transcript)),
        Flavor::Result => checked::twice(input, &transcript),
    };
    EscapeReport {
        input,
        flavor,
        code: attempt_code(&attempt),
        result: attempt.ok(),
        transcript: transcript.into_lines(),
    }
}
