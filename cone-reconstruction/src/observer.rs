use std::fmt;
use std::ops::ControlFlow;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// The stages of a reconstruction, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum Stage {
    ReflectionFilter,
    OcclusionAnalysis,
    Triangulation,
    SurfaceRefinement,
    GapFilling,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::ReflectionFilter,
        Stage::OcclusionAnalysis,
        Stage::Triangulation,
        Stage::SurfaceRefinement,
        Stage::GapFilling,
    ];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ReflectionFilter => "reflection filter",
            Stage::OcclusionAnalysis => "occlusion analysis",
            Stage::Triangulation => "triangulation",
            Stage::SurfaceRefinement => "surface refinement",
            Stage::GapFilling => "gap filling",
        };
        f.write_str(name)
    }
}

/// A stage boundary, as reported by a background reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageEvent {
    Started(Stage),
    Finished(Stage),
}

/// Receives stage boundaries of a reconstruction.
///
/// Returning [`ControlFlow::Break`] from `stage_started` cancels the reconstruction before that
/// stage runs. Stages that are skipped because they are disabled are not reported.
pub trait StageObserver {
    fn stage_started(&mut self, _stage: Stage) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    fn stage_finished(&mut self, _stage: Stage) {}
}

/// Observes nothing and never cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl StageObserver for NoopObserver {}

impl<T: StageObserver + ?Sized> StageObserver for &mut T {
    fn stage_started(&mut self, stage: Stage) -> ControlFlow<()> {
        (**self).stage_started(stage)
    }

    fn stage_finished(&mut self, stage: Stage) {
        (**self).stage_finished(stage)
    }
}
