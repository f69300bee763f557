//! Per test runtime state and lifecycle hooks.
//!
//! Every registered test owns a [`TestContext`]. The context carries the
//! bookkeeping the harness needs ([`TestState`]: identity, failure count and
//! completion flag) and a user chosen `Extra` value. The `Extra` type decides
//! what happens around the test body through [`TestHooks`].

use std::{
    fmt,
    ops::{Deref, DerefMut},
    rc::Rc,
};

use crate::{
    formatter::FmtTestFailure,
    test::{TestMeta, TestOrigin},
};

/// Where failure records go while a test runs.
///
/// Called synchronously, so a failure is printed before anything the test
/// prints afterwards.
pub(crate) type ReportSink = Rc<dyn Fn(FmtTestFailure)>;

/// Lifecycle hooks that run around every test body.
///
/// Implement this on a type to build a custom kind of test. The type is stored
/// as the `extra` field of the [`TestContext`] and may carry arbitrary state
/// that the test body can read and write through `ctx.extra`.
///
/// Both hooks receive the [`TestState`] of the test, so they can record
/// failures with [`TestState::fail`].
///
/// ```
/// use zest::context::{TestHooks, TestState};
///
/// #[derive(Default)]
/// struct Counter {
///     count: i32,
/// }
///
/// impl TestHooks for Counter {
///     fn after(&mut self, state: &mut TestState) {
///         if self.count < 0 {
///             state.fail("Count too low!");
///         }
///     }
/// }
/// ```
pub trait TestHooks {
    /// Called right before the test body.
    fn before(&mut self, state: &mut TestState) {
        let _ = state;
    }

    /// Called right after the test body returned.
    ///
    /// Not called if the body returned an error or panicked.
    fn after(&mut self, state: &mut TestState) {
        let _ = state;
    }
}

impl TestHooks for () {}

/// Bookkeeping of a single test.
pub struct TestState {
    meta: TestMeta,
    failed: usize,
    done: bool,
    sink: Option<ReportSink>,
}

impl TestState {
    pub fn new(meta: TestMeta) -> Self {
        Self {
            meta,
            failed: 0,
            done: false,
            sink: None,
        }
    }

    pub fn meta(&self) -> &TestMeta {
        &self.meta
    }

    /// Number of failures recorded so far.
    pub fn failures(&self) -> usize {
        self.failed
    }

    pub fn is_failed(&self) -> bool {
        self.failed > 0
    }

    /// Whether the test went through its whole lifecycle.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Record a failure at the declaration site of the test.
    ///
    /// The returned writer can be used to append more text to the message,
    /// the failure record is emitted once the writer is dropped.
    pub fn fail(&mut self, message: impl fmt::Display) -> FailureWriter<'_> {
        let mut writer = self.failure();
        let _ = fmt::Write::write_fmt(&mut writer, format_args!("{message}"));
        writer
    }

    /// Record a failure without an initial message.
    pub fn failure(&mut self) -> FailureWriter<'_> {
        let origin = self.meta.origin.clone();
        self.fail_at(origin)
    }

    /// Record a failure attributed to `origin` instead of the declaration site.
    pub fn fail_at(&mut self, origin: TestOrigin) -> FailureWriter<'_> {
        self.failed += 1;
        FailureWriter {
            sink: self.sink.as_ref(),
            failure: Some(FmtTestFailure {
                meta: self.meta.clone(),
                origin,
                message: String::new(),
                nth: self.failed,
            }),
        }
    }

    pub(crate) fn complete(&mut self) {
        self.done = true;
    }
}

impl fmt::Debug for TestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestState")
            .field("meta", &self.meta)
            .field("failed", &self.failed)
            .field("done", &self.done)
            .field("active", &self.sink.is_some())
            .finish()
    }
}

impl AsRef<TestState> for TestState {
    fn as_ref(&self) -> &TestState {
        self
    }
}

impl AsMut<TestState> for TestState {
    fn as_mut(&mut self) -> &mut TestState {
        self
    }
}

/// Sink for the message of a single failure record.
///
/// Created by the failure primitives of [`TestState`]. Implements
/// [`fmt::Write`], so `write!` can be used to compose multi part messages.
pub struct FailureWriter<'s> {
    sink: Option<&'s ReportSink>,
    failure: Option<FmtTestFailure>,
}

impl fmt::Write for FailureWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if let Some(failure) = self.failure.as_mut() {
            failure.message.push_str(s);
        }
        Ok(())
    }
}

impl Drop for FailureWriter<'_> {
    fn drop(&mut self) {
        let Some(failure) = self.failure.take() else {
            return;
        };

        match self.sink {
            Some(sink) => sink(failure),
            None => tracing::warn!(
                test = %failure.meta.title,
                origin = %failure.origin,
                message = %failure.message,
                "failure recorded outside of the test run"
            ),
        }
    }
}

/// Runtime context handed to the body of a test.
///
/// Dereferences to [`TestState`], so failure primitives and assertions can be
/// used on it directly.
#[derive(Debug)]
pub struct TestContext<Extra = ()> {
    state: TestState,
    pub extra: Extra,
}

impl<Extra> TestContext<Extra> {
    pub fn new(meta: TestMeta, extra: Extra) -> Self {
        Self {
            state: TestState::new(meta),
            extra,
        }
    }

    pub fn state(&self) -> &TestState {
        &self.state
    }

    pub(crate) fn activate(&mut self, sink: ReportSink) -> ActiveTest<'_, Extra> {
        self.state.sink = Some(sink);
        ActiveTest { ctx: self }
    }
}

impl<Extra: TestHooks> TestContext<Extra> {
    pub(crate) fn before(&mut self) {
        self.extra.before(&mut self.state);
    }

    pub(crate) fn after(&mut self) {
        self.extra.after(&mut self.state);
    }
}

impl<Extra> Deref for TestContext<Extra> {
    type Target = TestState;

    fn deref(&self) -> &Self::Target {
        &self.state
    }
}

impl<Extra> DerefMut for TestContext<Extra> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.state
    }
}

impl<Extra> AsRef<TestState> for TestContext<Extra> {
    fn as_ref(&self) -> &TestState {
        &self.state
    }
}

impl<Extra> AsMut<TestState> for TestContext<Extra> {
    fn as_mut(&mut self) -> &mut TestState {
        &mut self.state
    }
}

/// A context inside its run window.
///
/// Holds the report sink for as long as it lives and releases it on drop,
/// which also covers unwinding out of a panicking test body.
pub(crate) struct ActiveTest<'c, Extra> {
    ctx: &'c mut TestContext<Extra>,
}

impl<Extra> Deref for ActiveTest<'_, Extra> {
    type Target = TestContext<Extra>;

    fn deref(&self) -> &Self::Target {
        self.ctx
    }
}

impl<Extra> DerefMut for ActiveTest<'_, Extra> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.ctx
    }
}

impl<Extra> Drop for ActiveTest<'_, Extra> {
    fn drop(&mut self) {
        self.ctx.state.sink = None;
    }
}
