use std::{
    cell::RefCell,
    io,
    rc::Rc,
    sync::{Arc, Mutex},
};

pub use crate::formatter::no::NoFormatter;
use crate::{
    context::ReportSink,
    formatter::{common::color::SupportsColor, *},
    registry::Group,
    test::{TestMeta, TestOrigin},
};

pub fn origin_at(line: u32) -> TestOrigin {
    TestOrigin::new("tests.rs", line)
}

pub fn meta(group: &'static str, title: &'static str) -> TestMeta {
    TestMeta {
        group: group.into(),
        title: title.into(),
        origin: origin_at(1),
    }
}

pub fn titles(group: &Group) -> Vec<&str> {
    group.tests().map(|t| t.meta().title.as_ref()).collect()
}

/// A sink that keeps every failure record it receives.
pub fn collecting_sink() -> (ReportSink, Rc<RefCell<Vec<FmtTestFailure>>>) {
    let records = Rc::new(RefCell::new(Vec::new()));
    let sink: ReportSink = {
        let records = Rc::clone(&records);
        Rc::new(move |failure: FmtTestFailure| records.borrow_mut().push(failure))
    };
    (sink, records)
}

/// In memory target that stays readable after the formatter was consumed.
#[derive(Debug, Default, Clone)]
pub struct Buffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .0
            .lock()
            .map_err(|_| io::Error::other("poison error"))?;
        guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SupportsColor for Buffer {
    fn supports_color(&self) -> bool {
        false
    }
}

impl std::fmt::Display for Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let guard = self.0.lock().map_err(|_| std::fmt::Error)?;
        f.write_str(&String::from_utf8_lossy(&guard))
    }
}

/// Formatter that records a one line summary of every event.
#[derive(Debug, Default, Clone)]
pub struct RecordingFormatter(Arc<Mutex<Vec<String>>>);

impl RecordingFormatter {
    pub fn events(&self) -> Vec<String> {
        self.0.lock().map(|events| events.clone()).unwrap_or_default()
    }

    fn record(&self, event: String) -> Result<(), ()> {
        self.0.lock().map_err(|_| ())?.push(event);
        Ok(())
    }
}

impl TestFormatter for RecordingFormatter {
    type Error = ();

    fn fmt_group_start(&mut self, data: FmtGroupStart<'_>) -> Result<(), Self::Error> {
        self.record(format!("group {}", data.name))
    }

    fn fmt_group_skipped(&mut self, data: FmtGroupSkipped<'_>) -> Result<(), Self::Error> {
        self.record(format!("skipped {} {}", data.name, data.tests))
    }

    fn fmt_test_failure(&mut self, data: &FmtTestFailure) -> Result<(), Self::Error> {
        self.record(format!(
            "failure {} #{}: {}",
            data.meta.title, data.nth, data.message
        ))
    }

    fn fmt_test_outcome(&mut self, data: FmtTestOutcome<'_>) -> Result<(), Self::Error> {
        let status = match data.outcome.passed() {
            true => "passed",
            false => "failed",
        };
        self.record(format!("outcome {} {status}", data.outcome.meta.title))
    }

    fn fmt_run_outcomes(&mut self, data: FmtRunOutcomes) -> Result<(), Self::Error> {
        self.record(format!(
            "summary {} passed {} failed {} skipped",
            data.passed, data.failed, data.skipped
        ))
    }
}
