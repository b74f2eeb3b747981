use std::fmt;

use crate::{LevelMap, PositionMap};

/// Pipeline stages reported to a [`LayoutObserver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Leveling,
    InitialPlacement,
    CollisionResolution,
    CrossingMinimization,
    Centering,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Leveling => "leveling",
            Stage::InitialPlacement => "initial placement",
            Stage::CollisionResolution => "collision resolution",
            Stage::CrossingMinimization => "crossing minimization",
            Stage::Centering => "centering",
        };

        write!(f, "{s}")
    }
}

/// Receives progress from a layout run.
///
/// Passed explicitly into [`crate::auto_layout_observed`] so a caller can trace a run
/// without any process-wide state. Every hook defaults to doing nothing.
pub trait LayoutObserver<Id> {
    fn levels_assigned(&mut self, _levels: &LevelMap<Id>) {}

    /// Called after each collision resolver pass. `pass` starts at 1.
    fn collision_pass(&mut self, _pass: usize, _collisions: usize) {}

    fn stage_finished(&mut self, _stage: Stage, _positions: &PositionMap<Id>) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl<Id> LayoutObserver<Id> for NoopObserver {}
