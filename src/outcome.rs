use crate::{context::TestState, test::TestMeta};

#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct TestOutcome {
    pub meta: TestMeta,
    pub status: TestStatus,
}

impl TestOutcome {
    pub fn passed(&self) -> bool {
        self.status.passed()
    }

    pub fn failed(&self) -> bool {
        self.status.failed()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum TestStatus {
    Passed,
    Failed { failures: usize },
}

impl TestStatus {
    pub fn passed(&self) -> bool {
        matches!(self, TestStatus::Passed)
    }

    pub fn failed(&self) -> bool {
        matches!(self, TestStatus::Failed { .. })
    }
}

impl From<&TestState> for TestStatus {
    fn from(state: &TestState) -> Self {
        match state.failures() {
            0 => TestStatus::Passed,
            failures => TestStatus::Failed { failures },
        }
    }
}
