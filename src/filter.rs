//! Deciding which groups run.

use crate::registry::{Group, GroupMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupDecision {
    Run,
    Skip,
}

/// A strategy for deciding whether a group runs.
///
/// `only_mode` is the registry wide flag that is set once any group was marked
/// with [`Registry::only`](crate::registry::Registry::only).
pub trait GroupFilter {
    fn decide(&mut self, group: &Group, only_mode: bool) -> GroupDecision;
}

/// Runs every group, ignoring skip and only marks.
#[derive(Debug, Default, Clone)]
pub struct NoGroupFilter;

impl GroupFilter for NoGroupFilter {
    fn decide(&mut self, _: &Group, _: bool) -> GroupDecision {
        GroupDecision::Run
    }
}

/// Skip and only semantics.
///
/// - a skipped group never runs
/// - in only mode, only groups marked only run
/// - otherwise every group runs
#[derive(Debug, Default, Clone)]
pub struct DefaultGroupFilter;

impl GroupFilter for DefaultGroupFilter {
    fn decide(&mut self, group: &Group, only_mode: bool) -> GroupDecision {
        match (group.mode(), only_mode) {
            (GroupMode::Skipped, _) | (GroupMode::Normal, true) => GroupDecision::Skip,
            (GroupMode::Only, _) | (GroupMode::Normal, false) => GroupDecision::Run,
        }
    }
}

impl<F> GroupFilter for F
where
    F: FnMut(&Group, bool) -> GroupDecision,
{
    fn decide(&mut self, group: &Group, only_mode: bool) -> GroupDecision {
        self(group, only_mode)
    }
}
