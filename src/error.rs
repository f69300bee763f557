/// Errors that abort a run or reject an operation.
///
/// Failing assertions are not errors, they are recorded on the test.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An assertion was evaluated against a test that already completed.
    ///
    /// This happens when a context outlives its run window, for example when
    /// it is captured by a callback that fires after the test returned.
    #[error("called {assertion} on finished test {title:?} in group {group:?}")]
    AssertionAfterCompletion {
        assertion: &'static str,
        group: String,
        title: String,
    },

    /// A test body returned an error, the run was aborted.
    #[error("test {title:?} in group {group:?} returned an uncaught error: {message}")]
    Uncaught {
        group: String,
        title: String,
        message: String,
    },

    #[error("invalid value {value:?} for {var}")]
    InvalidConfig { var: &'static str, value: String },
}
