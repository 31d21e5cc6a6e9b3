use crate::{ReflectionCluster, Statistics, SurfaceChoice};
use cone_core::{CameraPose, FinalPosition};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Summary information about a reconstruction run.
///
/// The field names match the metadata keys consumed by the visualization tooling.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct RunMetadata {
    pub total_leds: usize,
    pub tree_height: f64,
    pub num_cameras: usize,
    pub num_observed: usize,
    pub num_predicted: usize,
    /// The camera poses the reconstruction used.
    #[cfg_attr(feature = "serde-serialize", serde(default))]
    pub cameras: Vec<CameraPose>,
}

/// The result of a reconstruction.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ReconstructionOutput {
    /// One position per point index, in index order.
    pub positions: Vec<FinalPosition>,
    #[cfg_attr(feature = "serde-serialize", serde(flatten))]
    pub metadata: RunMetadata,
    #[cfg_attr(feature = "serde-serialize", serde(default))]
    pub reflection_clusters: Vec<ReflectionCluster>,
    /// Present when the surface refinement ran.
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub surface_choices: Option<Vec<SurfaceChoice>>,
}

impl ReconstructionOutput {
    pub fn observed(&self) -> impl Iterator<Item = &FinalPosition> + '_ {
        self.positions.iter().filter(|position| !position.predicted)
    }

    pub fn predicted(&self) -> impl Iterator<Item = &FinalPosition> + '_ {
        self.positions.iter().filter(|position| position.predicted)
    }

    pub fn statistics(&self) -> Statistics {
        Statistics::from_positions(&self.positions)
    }
}
