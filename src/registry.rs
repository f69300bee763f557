//! The test registry.
//!
//! A [`Registry`] maps group names to groups of tests. Groups keep the order
//! their tests were registered in and are themselves iterated in the order they
//! were first mentioned, whether by a registration or by [`Registry::skip`] /
//! [`Registry::only`].
//!
//! Tests declared with [`case!`](crate::case) end up in the link time
//! [`DECLARATIONS`] slice and are installed into a registry by
//! [`Registry::collect`].
//!
//! The registry is borrowed mutably by the harness for the whole run, so it
//! cannot be changed while tests execute.

use std::{
    any::Any,
    borrow::Cow,
    collections::HashMap,
    fmt,
    panic::{self, AssertUnwindSafe},
};

use crate::{
    Error,
    context::{ReportSink, TestContext, TestHooks, TestState},
    outcome::TestStatus,
    test::{RunAction, TestMeta, TestOrigin, TestResult},
};

/// Filter directive attached to a group.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupMode {
    #[default]
    Normal,
    Skipped,
    Only,
}

/// A named, ordered sequence of tests.
pub struct Group {
    name: Cow<'static, str>,
    mode: GroupMode,
    pub(crate) tests: Vec<Box<dyn RegisteredTest>>,
}

impl Group {
    fn new(name: Cow<'static, str>) -> Self {
        Self {
            name,
            mode: GroupMode::Normal,
            tests: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> GroupMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// State of every test in the group, in registration order.
    pub fn tests(&self) -> impl ExactSizeIterator<Item = &TestState> {
        self.tests.iter().map(|test| test.state())
    }
}

impl fmt::Debug for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Group")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .field("tests", &self.tests().map(|t| t.meta()).collect::<Vec<_>>())
            .finish()
    }
}

/// Type erased test entry, one per registered test.
pub(crate) trait RegisteredTest {
    fn state(&self) -> &TestState;

    /// Run the whole lifecycle of the test, reporting failures to `sink` as
    /// they are recorded.
    ///
    /// A panicking body is recorded as a failure before the panic resumes.
    fn execute(&mut self, sink: ReportSink) -> Result<TestStatus, Error>;
}

struct TestEntry<Extra> {
    context: TestContext<Extra>,
    action: RunAction<Extra>,
}

impl<Extra: TestHooks> RegisteredTest for TestEntry<Extra> {
    fn state(&self) -> &TestState {
        self.context.state()
    }

    fn execute(&mut self, sink: ReportSink) -> Result<TestStatus, Error> {
        let Self { context, action } = self;

        let mut ctx = context.activate(sink);
        ctx.before();

        let TestResult(result) =
            match panic::catch_unwind(AssertUnwindSafe(|| action.call(&mut ctx))) {
                Ok(result) => result,
                Err(payload) => {
                    ctx.fail(format_args!("uncaught panic: {}", panic_message(&*payload)));
                    drop(ctx);
                    panic::resume_unwind(payload);
                }
            };

        if let Err(message) = result {
            ctx.fail(format_args!("uncaught error: {message}"));
            drop(ctx);

            let meta = context.meta();
            return Err(Error::Uncaught {
                group: meta.group.to_string(),
                title: meta.title.to_string(),
                message,
            });
        }

        ctx.after();
        ctx.complete();
        drop(ctx);

        Ok(TestStatus::from(context.state()))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&'static str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

/// Store of all registered tests.
#[derive(Debug, Default)]
pub struct Registry {
    pub(crate) groups: Vec<Group>,
    index: HashMap<Cow<'static, str>, usize>,
    only_mode: bool,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from every test declared with [`case!`](crate::case).
    ///
    /// The linker gives no guarantee about the order of the declaration slice,
    /// so declarations are installed sorted by file and line.
    pub fn collect() -> Self {
        let mut declarations: Vec<&'static Declaration> = DECLARATIONS.iter().collect();
        declarations.sort_by(|a, b| a.origin.cmp(&b.origin));

        let mut registry = Self::new();
        for declaration in declarations {
            (declaration.install)(&mut registry, declaration);
        }
        tracing::debug!(
            groups = registry.groups.len(),
            tests = registry.len(),
            "collected declared tests"
        );
        registry
    }

    fn group_mut(&mut self, name: impl Into<Cow<'static, str>>) -> &mut Group {
        let name = name.into();
        let index = match self.index.get(&name) {
            Some(index) => *index,
            None => {
                let index = self.groups.len();
                self.index.insert(name.clone(), index);
                self.groups.push(Group::new(name));
                index
            }
        };
        &mut self.groups[index]
    }

    /// Register a plain test.
    ///
    /// Titles do not need to be unique, registering twice under the same group
    /// and title adds a second test.
    pub fn register<F, T>(
        &mut self,
        group: impl Into<Cow<'static, str>>,
        title: impl Into<Cow<'static, str>>,
        origin: TestOrigin,
        action: F,
    ) -> &TestMeta
    where
        F: Fn(&mut TestContext) -> T + Send + Sync + 'static,
        T: Into<TestResult>,
    {
        self.register_with(group, title, origin, (), action)
    }

    /// Register a test whose context carries `extra`.
    pub fn register_with<Extra, F, T>(
        &mut self,
        group: impl Into<Cow<'static, str>>,
        title: impl Into<Cow<'static, str>>,
        origin: TestOrigin,
        extra: Extra,
        action: F,
    ) -> &TestMeta
    where
        Extra: TestHooks + 'static,
        F: Fn(&mut TestContext<Extra>) -> T + Send + Sync + 'static,
        T: Into<TestResult>,
    {
        let group = group.into();
        let meta = TestMeta {
            group: group.clone(),
            title: title.into(),
            origin,
        };
        tracing::trace!(group = %meta.group, title = %meta.title, origin = %meta.origin, "registering test");

        let entry = TestEntry {
            context: TestContext::new(meta, extra),
            action: RunAction::new(action),
        };
        let group = self.group_mut(group);
        group.tests.push(Box::new(entry));
        group.tests[group.tests.len() - 1].state().meta()
    }

    /// Skip every test of `group`.
    pub fn skip(&mut self, group: impl Into<Cow<'static, str>>) {
        self.group_mut(group).mode = GroupMode::Skipped;
    }

    /// Only run `group` and other groups marked the same way.
    ///
    /// Once any group was marked, the registry stays in only mode, even if
    /// that group is skipped afterwards.
    pub fn only(&mut self, group: impl Into<Cow<'static, str>>) {
        self.group_mut(group).mode = GroupMode::Only;
        self.only_mode = true;
    }

    pub fn only_mode(&self) -> bool {
        self.only_mode
    }

    pub fn groups(&self) -> impl ExactSizeIterator<Item = &Group> {
        self.groups.iter()
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.index.get(name).map(|index| &self.groups[*index])
    }

    /// Number of registered tests over all groups.
    pub fn len(&self) -> usize {
        self.groups.iter().map(Group::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A test declared with [`case!`](crate::case).
#[derive(Debug)]
pub struct Declaration {
    pub group: &'static str,
    pub title: &'static str,
    pub origin: TestOrigin,
    pub install: fn(&mut Registry, &'static Declaration),
}

#[linkme::distributed_slice]
pub static DECLARATIONS: [Declaration];

/// Declare a test.
///
/// The test is picked up by [`Registry::collect`] (and so by [`zest::run`](crate::run)).
///
/// ```no_run
/// zest::case!(Math, "addition", |t| {
///     zest::is_eq!(t, 4, 2 + 2);
/// });
///
/// #[derive(Default)]
/// struct Counter {
///     count: i32,
/// }
///
/// impl zest::context::TestHooks for Counter {}
///
/// zest::case!(Counter => Math, "counting", |t| {
///     t.extra.count += 1;
/// });
///
/// fn main() -> Result<zest::TestReport<std::io::Error>, zest::Error> {
///     zest::run()
/// }
/// ```
#[macro_export]
macro_rules! case {
    ($group:ident, $title:expr, $body:expr $(,)?) => {
        $crate::case!(() => $group, $title, $body);
    };
    ($extra:ty => $group:ident, $title:expr, $body:expr $(,)?) => {
        const _: () = {
            #[$crate::__private::linkme::distributed_slice($crate::registry::DECLARATIONS)]
            #[linkme(crate = $crate::__private::linkme)]
            static DECLARATION: $crate::registry::Declaration = $crate::registry::Declaration {
                group: ::core::stringify!($group),
                title: $title,
                origin: $crate::origin!(),
                install: |registry: &mut $crate::registry::Registry,
                          declaration: &'static $crate::registry::Declaration| {
                    registry.register_with(
                        declaration.group,
                        declaration.title,
                        declaration.origin.clone(),
                        <$extra as ::core::default::Default>::default(),
                        $body,
                    );
                },
            };
        };
    };
}
