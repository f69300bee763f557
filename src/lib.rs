//! A zepto-scale test registration and execution framework.
//!
//! Tests are declared with [`case!`], grouped by name and executed by a
//! harness that tracks failures, honors skip and only marks per group and
//! prints a colored report.
//!
//! ```no_run
//! zest::case!(Math, "addition", |t| {
//!     zest::is_eq!(t, 4, 2 + 2);
//! });
//!
//! zest::case!(Math, "overflow", |t| {
//!     zest::is_eq!(t, 5, 2 + 2); // records a failure and keeps going
//! });
//!
//! fn main() -> std::process::ExitCode {
//!     let mut registry = zest::registry::Registry::collect();
//!     registry.skip("Slow");
//!     match zest::harness(&mut registry).run() {
//!         Ok(report) => std::process::Termination::report(report),
//!         Err(err) => {
//!             eprintln!("{err}");
//!             std::process::ExitCode::FAILURE
//!         }
//!     }
//! }
//! ```

pub mod assert;
pub mod config;
pub mod context;
pub mod filter;
pub mod formatter;
pub mod outcome;
pub mod registry;

mod error;
pub use error::Error;

mod harness;
pub use harness::*;

mod report;
pub use report::*;

#[cfg(test)]
mod test_support;

#[doc(hidden)]
pub mod __private {
    pub use linkme;
}

pub mod prelude {
    pub use crate::{
        Error, TestReport,
        context::{TestContext, TestHooks, TestState},
        harness::harness,
        registry::Registry,
        test::TestOrigin,
    };
    pub use crate::{case, is_eq, is_ge, is_gt, is_le, is_lt, is_ne, origin};
}

use std::io;

use crate::{config::Config, formatter::pretty::PrettyFormatter, registry::Registry};

/// Run every declared test with the environment [`Config`].
///
/// Meant to be returned from `main`, the process exits with `0` if all tests
/// passed and `1` otherwise.
pub fn run() -> Result<TestReport<io::Error>, Error> {
    let config = Config::from_env()?;
    let mut registry = Registry::collect();
    config.apply(&mut registry);

    harness(&mut registry)
        .with_formatter(PrettyFormatter::default().with_color_setting(config.color))
        .run()
}

/// Print without a newline and flush stdout.
#[macro_export]
macro_rules! zout {
    ($($arg:tt)*) => {{
        use ::std::io::Write as _;
        ::std::print!($($arg)*);
        let _ = ::std::io::stdout().flush();
    }};
}

/// Print with a newline.
#[macro_export]
macro_rules! zprn {
    ($($arg:tt)*) => {
        ::std::println!($($arg)*)
    };
}

/// Print an expression together with its value.
#[macro_export]
macro_rules! zlog {
    ($value:expr) => {
        ::std::println!("{} = {:?}", ::core::stringify!($value), $value)
    };
}
