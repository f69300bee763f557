mod test;
use std::{cmp::Ordering, io};

pub use test::TestHarness;

use crate::{
    filter::DefaultGroupFilter,
    formatter::pretty::PrettyFormatter,
    registry::{Group, Registry},
};

/// Create a harness over `registry` with the default strategies.
///
/// Defaults are [`DefaultGroupFilter`] (skip and only semantics),
/// [`PrettyFormatter`] on stdout and [`GroupOrder::Registration`].
pub fn harness(
    registry: &mut Registry,
) -> TestHarness<'_, DefaultGroupFilter, PrettyFormatter<io::Stdout>> {
    TestHarness {
        registry,
        filter: DefaultGroupFilter,
        formatter: PrettyFormatter::default(),
        order: GroupOrder::default(),
    }
}

/// Order groups are executed in.
///
/// Tests inside a group always run in registration order.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum GroupOrder {
    /// The order groups were first mentioned in the registry.
    #[default]
    Registration,
    /// Sorted by group name.
    ByName,
}

impl GroupOrder {
    pub(crate) fn indices(self, groups: &[Group]) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..groups.len()).collect();
        match self {
            GroupOrder::Registration => {}
            GroupOrder::ByName => indices.sort_by(|a, b| by_name(&groups[*a], &groups[*b])),
        }
        indices
    }
}

fn by_name(a: &Group, b: &Group) -> Ordering {
    a.name().cmp(b.name())
}
