use std::process::{ExitCode, Termination};

use crate::{formatter::FormatError, outcome::TestOutcome};

pub type TestOutcomes = Vec<TestOutcome>;

/// Result of a completed run.
#[derive(Debug)]
#[non_exhaustive]
pub struct TestReport<FmtError> {
    /// Outcomes of every executed test, in execution order.
    pub outcomes: TestOutcomes,
    /// Number of tests in skipped groups.
    pub skipped: usize,
    pub fmt_errors: Vec<(FormatError, FmtError)>,
}

impl<FmtError> TestReport<FmtError> {
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.failed()).count()
    }

    /// `1` if any executed test failed, `0` otherwise.
    pub fn exit_status(&self) -> u8 {
        match self.failed() {
            0 => 0,
            _ => 1,
        }
    }
}

impl<FmtError> Termination for TestReport<FmtError> {
    fn report(self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }
}
