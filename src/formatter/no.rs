use crate::formatter::*;

/// A formatter that produces no output.
///
/// `NoFormatter` discards every event. This is useful when we want to run tests
/// without any formatting (for example when embedding zest into another system
/// that inspects the [`TestReport`](crate::TestReport) itself).
#[derive(Debug, Default, Clone)]
pub struct NoFormatter;

impl TestFormatter for NoFormatter {
    type Error = ();
}
