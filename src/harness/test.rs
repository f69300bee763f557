use std::{cell::RefCell, rc::Rc};

use crate::{
    Error, TestReport,
    context::ReportSink,
    filter::{GroupDecision, GroupFilter},
    formatter::*,
    outcome::TestOutcome,
    registry::Registry,
};

use super::GroupOrder;

pub struct TestHarness<'r, Filter, Formatter> {
    pub(crate) registry: &'r mut Registry,
    pub(crate) filter: Filter,
    pub(crate) formatter: Formatter,
    pub(crate) order: GroupOrder,
}

/// The formatter together with the errors it produced so far.
///
/// Shared between the harness and the report sink of the running test.
struct Output<Formatter: TestFormatter> {
    formatter: Formatter,
    fmt_errors: Vec<(FormatError, Formatter::Error)>,
}

impl<'r, Filter, Formatter> TestHarness<'r, Filter, Formatter>
where
    Filter: GroupFilter,
    Formatter: TestFormatter + 'static,
    Formatter::Error: 'static,
{
    /// Run every group the filter lets through.
    ///
    /// Each test goes through `before`, its body, `after` and is reported
    /// before the next one starts. Failures are formatted the moment they are
    /// recorded. A test body returning an error aborts the run: no further
    /// tests execute, no summary is printed and the error is returned. Panics
    /// are recorded as a failure and then propagate.
    pub fn run(self) -> Result<TestReport<Formatter::Error>, Error> {
        let TestHarness {
            registry,
            mut filter,
            formatter,
            order,
        } = self;

        let output = Rc::new(RefCell::new(Output {
            formatter,
            fmt_errors: Vec::new(),
        }));
        let sink: ReportSink = {
            let output = Rc::clone(&output);
            Rc::new(move |failure: FmtTestFailure| {
                let mut output = output.borrow_mut();
                let Output {
                    formatter,
                    fmt_errors,
                } = &mut *output;
                fmt_errors.push_on_error(named_fmt!(formatter.fmt_test_failure(&failure)));
            })
        };

        let only_mode = registry.only_mode();
        let mut outcomes = Vec::new();
        let mut skipped = 0;

        for index in order.indices(&registry.groups) {
            let group = &mut registry.groups[index];
            let name = group.name().to_owned();

            if let GroupDecision::Skip = filter.decide(group, only_mode) {
                tracing::debug!(group = %name, tests = group.len(), ?only_mode, "skipping group");
                skipped += group.len();
                let mut out = output.borrow_mut();
                let Output {
                    formatter,
                    fmt_errors,
                } = &mut *out;
                fmt_errors.push_on_error(named_fmt!(formatter.fmt_group_skipped(
                    FmtGroupSkipped {
                        name: &name,
                        tests: group.len(),
                    }
                )));
                continue;
            }

            tracing::debug!(group = %name, tests = group.len(), "running group");
            {
                let mut out = output.borrow_mut();
                let Output {
                    formatter,
                    fmt_errors,
                } = &mut *out;
                fmt_errors.push_on_error(named_fmt!(formatter.fmt_group_start(FmtGroupStart {
                    name: &name,
                    tests: group.len(),
                })));
            }

            for test in group.tests.iter_mut() {
                tracing::trace!(group = %name, title = %test.state().meta().title, "starting test");
                let status = test.execute(Rc::clone(&sink))?;

                let outcome = TestOutcome {
                    meta: test.state().meta().clone(),
                    status,
                };
                let mut out = output.borrow_mut();
                let Output {
                    formatter,
                    fmt_errors,
                } = &mut *out;
                fmt_errors.push_on_error(named_fmt!(
                    formatter.fmt_test_outcome(FmtTestOutcome { outcome: &outcome })
                ));
                outcomes.push(outcome);
            }
        }

        let run_outcomes = FmtRunOutcomes {
            passed: outcomes.iter().filter(|o| o.passed()).count(),
            failed: outcomes.iter().filter(|o| o.failed()).count(),
            skipped,
        };
        tracing::debug!(
            passed = run_outcomes.passed,
            failed = run_outcomes.failed,
            skipped,
            "run finished"
        );

        let mut out = output.borrow_mut();
        let Output {
            formatter,
            fmt_errors,
        } = &mut *out;
        fmt_errors.push_on_error(named_fmt!(formatter.fmt_run_outcomes(run_outcomes)));

        Ok(TestReport {
            outcomes,
            skipped,
            fmt_errors: std::mem::take(fmt_errors),
        })
    }
}

impl<'r, Filter, Formatter> TestHarness<'r, Filter, Formatter> {
    pub fn with_filter<WithFilter: GroupFilter>(
        self,
        filter: WithFilter,
    ) -> TestHarness<'r, WithFilter, Formatter> {
        TestHarness {
            registry: self.registry,
            filter,
            formatter: self.formatter,
            order: self.order,
        }
    }

    pub fn with_formatter<WithFormatter: TestFormatter>(
        self,
        formatter: WithFormatter,
    ) -> TestHarness<'r, Filter, WithFormatter> {
        TestHarness {
            registry: self.registry,
            filter: self.filter,
            formatter,
            order: self.order,
        }
    }

    pub fn with_group_order(self, order: GroupOrder) -> Self {
        TestHarness { order, ..self }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        panic::{self, AssertUnwindSafe},
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        context::{TestHooks, TestState},
        harness,
        outcome::TestStatus,
        test_support::*,
    };

    #[test]
    fn run_linear() {
        let mut registry = Registry::new();
        registry.register("G", "first", origin_at(1), |_| ());
        registry.register("G", "second", origin_at(2), |_| ());
        registry.register("H", "third", origin_at(3), |_| ());

        let report = harness(&mut registry).with_formatter(NoFormatter).run().unwrap();
        let titles: Vec<_> = report.outcomes.iter().map(|o| o.meta.title.as_ref()).collect();
        assert_eq!(titles, ["first", "second", "third"]);
        assert_eq!(report.exit_status(), 0);
    }

    #[test]
    fn group_order_by_name() {
        let mut registry = Registry::new();
        registry.register("Zeta", "z", origin_at(1), |_| ());
        registry.register("Alpha", "a", origin_at(2), |_| ());

        let report = harness(&mut registry)
            .with_formatter(NoFormatter)
            .with_group_order(GroupOrder::ByName)
            .run()
            .unwrap();
        let titles: Vec<_> = report.outcomes.iter().map(|o| o.meta.title.as_ref()).collect();
        assert_eq!(titles, ["a", "z"]);
    }

    #[test]
    fn events_arrive_in_lifecycle_order() {
        let mut registry = Registry::new();
        registry.register("G", "bad", origin_at(1), |t| {
            t.fail("one");
            crate::is_lt!(t, 1, 2);
        });
        registry.register("G", "good", origin_at(2), |_| ());
        registry.register("S", "skipped", origin_at(3), |_| ());
        registry.skip("S");

        let formatter = RecordingFormatter::default();
        let report = harness(&mut registry)
            .with_formatter(formatter.clone())
            .run()
            .unwrap();

        assert_eq!(
            formatter.events(),
            [
                "group G",
                "failure bad #1: one",
                "failure bad #2: 2 < 1  (got 2 < 1)",
                "outcome bad failed",
                "outcome good passed",
                "skipped S 1",
                "summary 1 passed 1 failed 1 skipped",
            ]
        );
        assert_eq!(report.passed(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(
            report.outcomes[0].status,
            TestStatus::Failed { failures: 2 }
        );
        assert_eq!(report.exit_status(), 1);
    }

    #[test]
    fn contexts_are_completed_after_the_run() {
        let mut registry = Registry::new();
        registry.register("G", "t", origin_at(1), |t| {
            assert!(!t.is_done());
        });
        registry.register("Skipped", "t", origin_at(2), |_| ());
        registry.skip("Skipped");

        harness(&mut registry).with_formatter(NoFormatter).run().unwrap();

        let done = |group: &str| registry.group(group).unwrap().tests().next().unwrap().is_done();
        assert!(done("G"));
        assert!(!done("Skipped"));
    }

    struct Hooks {
        calls: Arc<AtomicUsize>,
        fail_after: bool,
    }

    impl TestHooks for Hooks {
        fn before(&mut self, state: &mut TestState) {
            assert_eq!(self.calls.fetch_add(1, Ordering::SeqCst), 0);
            assert!(!state.is_done());
        }

        fn after(&mut self, state: &mut TestState) {
            assert_eq!(self.calls.fetch_add(1, Ordering::SeqCst), 2);
            if self.fail_after {
                state.fail("from after");
            }
        }
    }

    #[test]
    fn hooks_wrap_the_body() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = Registry::new();
        registry.register_with(
            "G",
            "hooked",
            origin_at(1),
            Hooks {
                calls: Arc::clone(&calls),
                fail_after: true,
            },
            |t| {
                assert_eq!(t.extra.calls.fetch_add(1, Ordering::SeqCst), 1);
                t.fail("from body");
            },
        );

        let formatter = RecordingFormatter::default();
        let report = harness(&mut registry)
            .with_formatter(formatter.clone())
            .run()
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(report.outcomes[0].status, TestStatus::Failed { failures: 2 });
        let failures: Vec<_> = formatter
            .events()
            .into_iter()
            .filter(|e| e.starts_with("failure"))
            .collect();
        assert_eq!(
            failures,
            ["failure hooked #1: from body", "failure hooked #2: from after"]
        );
    }

    #[test]
    fn uncaught_error_aborts_the_run() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = Registry::new();
        registry.register_with(
            "A",
            "errors",
            origin_at(1),
            Hooks {
                calls: Arc::clone(&calls),
                fail_after: false,
            },
            |t| -> Result<(), &'static str> {
                t.extra.calls.fetch_add(1, Ordering::SeqCst);
                Err("boom")
            },
        );
        registry.register("B", "never runs", origin_at(2), |_| ());

        let formatter = RecordingFormatter::default();
        let err = harness(&mut registry)
            .with_formatter(formatter.clone())
            .run()
            .unwrap_err();

        assert_eq!(
            err,
            Error::Uncaught {
                group: "A".into(),
                title: "errors".into(),
                message: "\"boom\"".into(),
            }
        );
        // before and body ran, after did not
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            formatter.events(),
            [
                "group A",
                "failure errors #1: uncaught error: \"boom\"",
            ]
        );

        let state = registry.group("A").unwrap().tests().next().unwrap();
        assert!(!state.is_done());
        assert_eq!(state.failures(), 1);
        assert!(!registry.group("B").unwrap().tests().next().unwrap().is_done());
    }

    #[test]
    #[should_panic(expected = "body panicked")]
    fn panics_propagate() {
        let mut registry = Registry::new();
        registry.register("G", "panics", origin_at(1), |_| -> () {
            panic!("body panicked");
        });
        let _ = harness(&mut registry).with_formatter(NoFormatter).run();
    }

    #[test]
    fn panics_are_recorded_before_they_propagate() {
        let mut registry = Registry::new();
        registry.register("G", "panics", origin_at(1), |t| -> () {
            crate::is_eq!(t, 5, 2 + 2);
            panic!("body panicked");
        });
        registry.register("G", "never runs", origin_at(2), |_| ());

        let formatter = RecordingFormatter::default();
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            harness(&mut registry)
                .with_formatter(formatter.clone())
                .run()
        }));
        assert!(result.is_err());

        assert_eq!(
            formatter.events(),
            [
                "group G",
                "failure panics #1: 2 + 2 == 5  (got 4 == 5)",
                "failure panics #2: uncaught panic: body panicked",
            ]
        );
        let state = registry.group("G").unwrap().tests().next().unwrap();
        assert_eq!(state.failures(), 2);
        assert!(!state.is_done());
    }
}
