//! Ordered comparison assertions.
//!
//! Assertions do not panic when they fail. A failing comparison bumps the
//! failure count of the test, emits a failure record and returns `false`, so a
//! test keeps running and can collect several independent failures.
//!
//! The functions in this module take the [`TestState`] explicitly. The
//! `is_*!` macros are the usual way to call them, they capture the source text
//! of both operands and the call site:
//!
//! ```
//! # let mut ctx = zest::context::TestContext::new(
//! #     zest::test::TestMeta {
//! #         group: "Math".into(),
//! #         title: "addition".into(),
//! #         origin: zest::origin!(),
//! #     },
//! #     (),
//! # );
//! # let t = &mut ctx;
//! zest::is_eq!(t, 4, 2 + 2);
//! zest::is_gt!(t, 3, 4); // 4 > 3
//! ```

use std::fmt::{self, Debug, Write};

use crate::{Error, context::TestState, test::TestOrigin};

/// The six supported comparisons.
///
/// Each holds when `actual <op> expected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

impl Comparison {
    pub fn operator(self) -> &'static str {
        match self {
            Comparison::Eq => "==",
            Comparison::Ne => "!=",
            Comparison::Gt => ">",
            Comparison::Lt => "<",
            Comparison::Ge => ">=",
            Comparison::Le => "<=",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Comparison::Eq => "is_eq",
            Comparison::Ne => "is_ne",
            Comparison::Gt => "is_gt",
            Comparison::Lt => "is_lt",
            Comparison::Ge => "is_ge",
            Comparison::Le => "is_le",
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.operator())
    }
}

/// One side of a comparison.
#[derive(Clone, Copy)]
pub struct Operand<'a, T> {
    pub value: &'a T,
    /// Source text of the operand expression.
    pub source: &'a str,
    /// Text rendering of the value, if the type has one.
    pub debug: Option<&'a dyn Debug>,
}

impl<'a, T> Operand<'a, T> {
    pub fn new(source: &'a str, value: &'a T) -> Self {
        Self {
            value,
            source,
            debug: None,
        }
    }

    pub fn with_debug(self, debug: Option<&'a dyn Debug>) -> Self {
        Self { debug, ..self }
    }
}

impl<'a, T: Debug> Operand<'a, T> {
    pub fn debug(source: &'a str, value: &'a T) -> Self {
        Self {
            value,
            source,
            debug: Some(value),
        }
    }
}

/// Result of a comparison, computed before the test state is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Holds,
    /// The comparison failed, carries the failure message.
    Fails(String),
}

impl Comparison {
    /// Judge an already evaluated predicate and render the failure message.
    pub fn verdict<E, A>(
        self,
        expected: Operand<'_, E>,
        actual: Operand<'_, A>,
        holds: bool,
    ) -> Verdict {
        if holds {
            return Verdict::Holds;
        }

        let op = self.operator();
        let mut message = format!("{} {op} {}", actual.source, expected.source);
        if let (Some(actual), Some(expected)) = (actual.debug, expected.debug) {
            let _ = write!(message, "  (got {actual:?} {op} {expected:?})");
        }
        Verdict::Fails(message)
    }
}

/// Reject assertions on a test that already completed.
pub fn ensure_active(state: &TestState, comparison: Comparison) -> Result<(), Error> {
    match state.is_done() {
        false => Ok(()),
        true => Err(Error::AssertionAfterCompletion {
            assertion: comparison.name(),
            group: state.meta().group.to_string(),
            title: state.meta().title.to_string(),
        }),
    }
}

/// Record a failed verdict on `state`, returns whether the comparison held.
pub fn record(state: &mut TestState, verdict: Verdict, origin: TestOrigin) -> bool {
    match verdict {
        Verdict::Holds => true,
        Verdict::Fails(message) => {
            state.fail_at(origin).write_str(&message).ok();
            false
        }
    }
}

fn evaluate<E, A>(
    state: &mut TestState,
    comparison: Comparison,
    expected: Operand<'_, E>,
    actual: Operand<'_, A>,
    origin: TestOrigin,
    holds: impl FnOnce(&A, &E) -> bool,
) -> Result<bool, Error> {
    ensure_active(state, comparison)?;
    let holds = holds(actual.value, expected.value);
    Ok(record(state, comparison.verdict(expected, actual, holds), origin))
}

pub fn is_eq<E, A: PartialEq<E>>(
    state: &mut TestState,
    expected: Operand<'_, E>,
    actual: Operand<'_, A>,
    origin: TestOrigin,
) -> Result<bool, Error> {
    evaluate(state, Comparison::Eq, expected, actual, origin, |a, e| a == e)
}

pub fn is_ne<E, A: PartialEq<E>>(
    state: &mut TestState,
    expected: Operand<'_, E>,
    actual: Operand<'_, A>,
    origin: TestOrigin,
) -> Result<bool, Error> {
    evaluate(state, Comparison::Ne, expected, actual, origin, |a, e| a != e)
}

pub fn is_gt<E, A: PartialOrd<E>>(
    state: &mut TestState,
    expected: Operand<'_, E>,
    actual: Operand<'_, A>,
    origin: TestOrigin,
) -> Result<bool, Error> {
    evaluate(state, Comparison::Gt, expected, actual, origin, |a, e| a > e)
}

pub fn is_lt<E, A: PartialOrd<E>>(
    state: &mut TestState,
    expected: Operand<'_, E>,
    actual: Operand<'_, A>,
    origin: TestOrigin,
) -> Result<bool, Error> {
    evaluate(state, Comparison::Lt, expected, actual, origin, |a, e| a < e)
}

pub fn is_ge<E, A: PartialOrd<E>>(
    state: &mut TestState,
    expected: Operand<'_, E>,
    actual: Operand<'_, A>,
    origin: TestOrigin,
) -> Result<bool, Error> {
    evaluate(state, Comparison::Ge, expected, actual, origin, |a, e| a >= e)
}

pub fn is_le<E, A: PartialOrd<E>>(
    state: &mut TestState,
    expected: Operand<'_, E>,
    actual: Operand<'_, A>,
    origin: TestOrigin,
) -> Result<bool, Error> {
    evaluate(state, Comparison::Le, expected, actual, origin, |a, e| a <= e)
}

/// Unwrap the result of an assertion, panicking on a protocol violation.
#[track_caller]
pub fn raise(result: Result<bool, Error>) -> bool {
    match result {
        Ok(holds) => holds,
        Err(err) => panic!("{err}"),
    }
}

#[doc(hidden)]
pub mod __private {
    use std::fmt::Debug;

    // Autoref specialization: `(&Render(&v)).as_debug()` picks `DebugRender`
    // when `T: Debug` and falls back to `OpaqueRender` otherwise.
    pub struct Render<'a, T>(pub &'a T);

    pub trait DebugRender<'a> {
        fn as_debug(&self) -> Option<&'a dyn Debug>;
    }

    impl<'a, T: Debug> DebugRender<'a> for Render<'a, T> {
        fn as_debug(&self) -> Option<&'a dyn Debug> {
            Some(self.0)
        }
    }

    pub trait OpaqueRender<'a> {
        fn as_debug(&self) -> Option<&'a dyn Debug>;
    }

    impl<'a, T> OpaqueRender<'a> for &Render<'a, T> {
        fn as_debug(&self) -> Option<&'a dyn Debug> {
            None
        }
    }
}

// The context is only borrowed mutably once both operands were evaluated and
// rendered, so operands may read from the context themselves.
#[doc(hidden)]
#[macro_export]
macro_rules! __assert_cmp {
    ($cmp:ident, $op:tt, $ctx:expr, $expected:expr, $actual:expr) => {{
        #[allow(unused_imports)]
        use $crate::assert::__private::{DebugRender as _, OpaqueRender as _, Render};
        let comparison = $crate::assert::Comparison::$cmp;
        $crate::assert::raise(
            match $crate::assert::ensure_active(
                ::core::convert::AsRef::<$crate::context::TestState>::as_ref(&*$ctx),
                comparison,
            ) {
                ::core::result::Result::Err(err) => ::core::result::Result::Err(err),
                ::core::result::Result::Ok(()) => {
                    let verdict = match (&$expected, &$actual) {
                        (expected, actual) => comparison.verdict(
                            $crate::assert::Operand::new(::core::stringify!($expected), expected)
                                .with_debug((&Render(expected)).as_debug()),
                            $crate::assert::Operand::new(::core::stringify!($actual), actual)
                                .with_debug((&Render(actual)).as_debug()),
                            actual $op expected,
                        ),
                    };
                    ::core::result::Result::Ok($crate::assert::record(
                        ::core::convert::AsMut::<$crate::context::TestState>::as_mut(&mut *$ctx),
                        verdict,
                        $crate::origin!(),
                    ))
                }
            },
        )
    }};
}

/// Check `actual == expected`, returns whether it held.
#[macro_export]
macro_rules! is_eq {
    ($ctx:expr, $expected:expr, $actual:expr $(,)?) => {
        $crate::__assert_cmp!(Eq, ==, $ctx, $expected, $actual)
    };
}

/// Check `actual != expected`, returns whether it held.
#[macro_export]
macro_rules! is_ne {
    ($ctx:expr, $expected:expr, $actual:expr $(,)?) => {
        $crate::__assert_cmp!(Ne, !=, $ctx, $expected, $actual)
    };
}

/// Check `actual > expected`, returns whether it held.
#[macro_export]
macro_rules! is_gt {
    ($ctx:expr, $expected:expr, $actual:expr $(,)?) => {
        $crate::__assert_cmp!(Gt, >, $ctx, $expected, $actual)
    };
}

/// Check `actual < expected`, returns whether it held.
#[macro_export]
macro_rules! is_lt {
    ($ctx:expr, $expected:expr, $actual:expr $(,)?) => {
        $crate::__assert_cmp!(Lt, <, $ctx, $expected, $actual)
    };
}

/// Check `actual >= expected`, returns whether it held.
#[macro_export]
macro_rules! is_ge {
    ($ctx:expr, $expected:expr, $actual:expr $(,)?) => {
        $crate::__assert_cmp!(Ge, >=, $ctx, $expected, $actual)
    };
}

/// Check `actual <= expected`, returns whether it held.
#[macro_export]
macro_rules! is_le {
    ($ctx:expr, $expected:expr, $actual:expr $(,)?) => {
        $crate::__assert_cmp!(Le, <=, $ctx, $expected, $actual)
    };
}
