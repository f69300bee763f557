//! A custom kind of test built on [`TestHooks`].
//!
//! Run with `RUST_LOG=zest=debug` to see what the harness does.

use zest::{
    Error, TestReport,
    context::{TestHooks, TestState},
};

#[derive(Default)]
struct Counter {
    count: i32,
}

impl Counter {
    fn increment(&mut self) {
        self.count += 1;
    }

    fn decrement(&mut self) {
        self.count -= 1;
    }
}

impl TestHooks for Counter {
    fn before(&mut self, _: &mut TestState) {
        zest::zprn!("  counter starts at {}", self.count);
    }

    fn after(&mut self, state: &mut TestState) {
        if self.count < 0 {
            state.fail("Count too low!");
        }
    }
}

zest::case!(Counter => Counter, "increments", |t| {
    t.extra.increment();
    zest::is_eq!(t, 1, t.extra.count);
});

zest::case!(Counter => Counter, "goes negative", |t| {
    t.extra.decrement();
    t.extra.decrement();
    zest::zlog!(t.extra.count);
});

zest::case!(Math, "arithmetic", |t| {
    zest::is_eq!(t, 4, 2 + 2);
    zest::is_ne!(t, 5, 2 + 2);
    zest::is_lt!(t, 10, 3 * 3);
});

zest::case!(Slow, "never runs", |t| {
    zest::zout!("sleeping...");
    std::thread::sleep(std::time::Duration::from_secs(60));
    t.fail("woke up");
});

fn init_tracing() {
    if std::env::var_os("RUST_LOG").is_none() {
        return;
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<TestReport<std::io::Error>, Error> {
    init_tracing();

    // ZEST_SKIP=Slow is the default here, ZEST_ONLY still applies
    let mut registry = zest::registry::Registry::collect();
    registry.skip("Slow");
    let config = zest::config::Config::from_env()?;
    config.apply(&mut registry);

    zest::harness(&mut registry)
        .with_formatter(
            zest::formatter::pretty::PrettyFormatter::default()
                .with_color_setting(config.color),
        )
        .run()
}
