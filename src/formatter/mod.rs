//! Rendering of run events.
//!
//! The harness reports everything that happens during a run to a
//! [`TestFormatter`]. Every event comes with a small format transfer object
//! (`Fmt*`) that borrows from the harness. All methods have a default
//! implementation that does nothing, so a formatter only implements the events
//! it cares about.
//!
//! Formatter errors never abort a run. The harness collects them, tagged with a
//! [`FormatError`] naming the event, into [`TestReport::fmt_errors`](crate::TestReport).

use std::fmt;

use crate::{
    outcome::TestOutcome,
    test::{TestMeta, TestOrigin},
};

pub mod common;
pub mod no;
pub mod pretty;

pub trait TestFormatter {
    type Error;

    fn fmt_group_start(&mut self, data: FmtGroupStart<'_>) -> Result<(), Self::Error> {
        let _ = data;
        Ok(())
    }

    fn fmt_group_skipped(&mut self, data: FmtGroupSkipped<'_>) -> Result<(), Self::Error> {
        let _ = data;
        Ok(())
    }

    /// Called for every failure record, while the test is still running.
    fn fmt_test_failure(&mut self, data: &FmtTestFailure) -> Result<(), Self::Error> {
        let _ = data;
        Ok(())
    }

    fn fmt_test_outcome(&mut self, data: FmtTestOutcome<'_>) -> Result<(), Self::Error> {
        let _ = data;
        Ok(())
    }

    fn fmt_run_outcomes(&mut self, data: FmtRunOutcomes) -> Result<(), Self::Error> {
        let _ = data;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FmtGroupStart<'g> {
    pub name: &'g str,
    pub tests: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FmtGroupSkipped<'g> {
    pub name: &'g str,
    pub tests: usize,
}

/// A single recorded failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FmtTestFailure {
    pub meta: TestMeta,
    /// Where the failure was recorded, the declaration site unless an
    /// assertion reported its own call site.
    pub origin: TestOrigin,
    pub message: String,
    /// Failure count of the test including this one, starts at 1.
    pub nth: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct FmtTestOutcome<'o> {
    pub outcome: &'o TestOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FmtRunOutcomes {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Names the formatter event that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FormatError(pub &'static str);

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "formatter failed in {}", self.0)
    }
}

pub(crate) trait FmtErrors<E> {
    fn push_on_error(&mut self, result: Result<(), (FormatError, E)>);
}

impl<E> FmtErrors<E> for Vec<(FormatError, E)> {
    fn push_on_error(&mut self, result: Result<(), (FormatError, E)>) {
        if let Err(err) = result {
            self.push(err);
        }
    }
}

macro_rules! named_fmt {
    ($formatter:ident.$method:ident($data:expr)) => {
        $formatter
            .$method($data)
            .map_err(|err| ($crate::formatter::FormatError(stringify!($method)), err))
    };
}

pub(crate) use named_fmt;
