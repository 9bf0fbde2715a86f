//! Verdicts
//!
//! A runner feeds each [`TestVector`] to the tool under test and records what
//! came back as an [`Observed`]. [`judge`] compares it with the expectation,
//! honoring the vector's skip annotation:
//!
//! ```text
//!                     matches         differs
//! not skipped         Pass            Mismatch
//! skipped             UnexpectedPass  KnownDivergence
//! ```
//!
//! Failure expectations match any failure; the detail is not compared.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use vsub_core::{Expected, Pass, TestVector};

/// What the tool under test actually did.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Observed {
    Output(String),
    Failure { detail: String },
}

impl Observed {
    pub fn output(text: impl Into<String>) -> Self {
        Observed::Output(text.into())
    }

    pub fn failure(detail: impl Into<String>) -> Self {
        Observed::Failure {
            detail: detail.into(),
        }
    }

    pub fn satisfies(&self, expected: &Expected) -> bool {
        match (expected, self) {
            (Expected::Output(want), Observed::Output(got)) => want == got,
            (Expected::Failure, Observed::Failure { .. }) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Observed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Observed::Output(text) => write!(f, "{:?}", text),
            Observed::Failure { detail } => write!(f, "<fail: {}>", detail),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Mismatch {
        expected: Expected,
        observed: Observed,
    },
    /// Skipped vector that still disagrees; reported, never fatal.
    KnownDivergence {
        reason: String,
        expected: Expected,
        observed: Observed,
    },
    /// Skipped vector that now agrees; its skip rule may be stale.
    UnexpectedPass { reason: String },
}

impl Verdict {
    /// Whether this verdict fails the suite.
    pub fn is_failure(&self) -> bool {
        matches!(self, Verdict::Mismatch { .. })
    }
}

pub fn judge(vector: &TestVector, observed: &Observed) -> Verdict {
    let agrees = observed.satisfies(&vector.expected);
    match (&vector.skip, agrees) {
        (None, true) => Verdict::Pass,
        (None, false) => {
            warn!(
                pass = %vector.pass,
                input = %vector.input,
                expected = ?vector.expected,
                observed = %observed,
                "Vector mismatch"
            );
            Verdict::Mismatch {
                expected: vector.expected.clone(),
                observed: observed.clone(),
            }
        }
        (Some(reason), false) => {
            debug!(input = %vector.input, reason = %reason, "Known divergence");
            Verdict::KnownDivergence {
                reason: reason.clone(),
                expected: vector.expected.clone(),
                observed: observed.clone(),
            }
        }
        (Some(reason), true) => Verdict::UnexpectedPass {
            reason: reason.clone(),
        },
    }
}

/// One judged vector.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub vector: TestVector,
    pub observed: Observed,
    pub verdict: Verdict,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total: usize,
    pub passed: usize,
    pub mismatched: usize,
    pub known_divergences: usize,
    pub unexpected_passes: usize,
}

/// Per-vector verdicts for one dialect run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixReport {
    pub dialect: String,
    pub entries: Vec<ReportEntry>,
}

impl MatrixReport {
    pub fn new(dialect: impl Into<String>) -> Self {
        Self {
            dialect: dialect.into(),
            entries: Vec::new(),
        }
    }

    /// Judge `observed` against `vector` and keep the result.
    pub fn record(&mut self, vector: TestVector, observed: Observed) -> &Verdict {
        let verdict = judge(&vector, &observed);
        self.entries.push(ReportEntry {
            vector,
            observed,
            verdict,
        });
        let last = self.entries.len() - 1;
        &self.entries[last].verdict
    }

    pub fn summary(&self) -> ReportSummary {
        let mut summary = ReportSummary {
            total: self.entries.len(),
            ..Default::default()
        };
        for entry in &self.entries {
            match entry.verdict {
                Verdict::Pass => summary.passed += 1,
                Verdict::Mismatch { .. } => summary.mismatched += 1,
                Verdict::KnownDivergence { .. } => summary.known_divergences += 1,
                Verdict::UnexpectedPass { .. } => summary.unexpected_passes += 1,
            }
        }
        summary
    }

    /// No vector outside the skip list disagreed.
    pub fn is_clean(&self) -> bool {
        !self.entries.iter().any(|e| e.verdict.is_failure())
    }

    pub fn mismatches(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter().filter(|e| e.verdict.is_failure())
    }

    /// Skipped vectors that passed anyway.
    pub fn stale_skips(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries
            .iter()
            .filter(|e| matches!(e.verdict, Verdict::UnexpectedPass { .. }))
    }

    pub fn entries_for(&self, pass: Pass) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter().filter(move |e| e.vector.pass == pass)
    }
}
