//! Reconstruction of the 3d positions of an LED string wound around a cone-shaped object.
//!
//! Several cameras stand around the object and photograph it while the LEDs are lit one at a
//! time. An external detector turns the photographs into [`Observation`]s: the pixel where an
//! LED was seen in a camera, with a detection and an angular confidence. This crate turns those
//! observations into one position per LED.
//!
//! Because the object is modeled as a cone, a single camera ray is enough to place a point: the
//! ray crosses the cone surface at most twice. The pipeline therefore does not need
//! correspondences between cameras at all, only a good guess for which camera to trust and on
//! which side of the cone the LED is. It runs the following stages in order:
//!
//! 1. [`ReflectionFilter`] attenuates detections that several LEDs share in one camera.
//! 2. [`OcclusionAnalyzer`] estimates per camera which runs of the string are hidden.
//! 3. [`TriangulationEngine`] places each point from its best observation.
//! 4. [`SurfaceRefiner`] optionally re-decides the surfaces from continuity along the string.
//! 5. [`GapFiller`] interpolates and extrapolates every point that could not be placed.
//!
//! [`Reconstructor`] runs the whole pipeline from [`ReconstructionSettings`], and
//! [`ReconstructionTask`] runs it on a background thread.

mod error;
mod export;
mod gap_fill;
mod input;
mod observer;
mod occlusion;
mod output;
mod reflection;
mod rig;
mod settings;
mod statistics;
mod surface;
mod task;
mod triangulation;

pub use error::*;
pub use export::*;
pub use gap_fill::*;
pub use input::*;
pub use observer::*;
pub use occlusion::*;
pub use output::*;
pub use reflection::*;
pub use rig::*;
pub use settings::*;
pub use statistics::*;
pub use surface::*;
pub use task::*;
pub use triangulation::*;

pub use cone_core::{CameraPose, ConeModel, FinalPosition, Observation, PositionCandidate, Surface};
pub use cone_pinhole::CameraGeometry;

use log::*;
use std::collections::BTreeSet;

/// Runs the reconstruction pipeline with a fixed set of settings.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Reconstructor {
    settings: ReconstructionSettings,
}

impl Reconstructor {
    pub fn new(settings: ReconstructionSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ReconstructionSettings {
        &self.settings
    }

    pub fn camera_geometry(&self) -> CameraGeometry {
        CameraGeometry::new(
            self.settings.image_width,
            self.settings.image_height,
            self.settings.camera_fov_degrees,
        )
    }

    pub fn reflection_filter(&self) -> ReflectionFilter {
        ReflectionFilter::new()
            .spatial_threshold(self.settings.spatial_threshold)
            .min_confidence(self.settings.reflection_min_confidence)
    }

    pub fn occlusion_analyzer(&self) -> OcclusionAnalyzer {
        OcclusionAnalyzer::new()
            .visibility_threshold(self.settings.visibility_threshold)
            .smoothing_window(self.settings.smoothing_window)
    }

    pub fn triangulation_engine(&self) -> TriangulationEngine {
        TriangulationEngine::new()
            .min_confidence(self.settings.min_confidence)
            .surface_threshold(self.settings.surface_threshold)
            .try_next_best_observation(self.settings.try_next_best_observation)
    }

    pub fn surface_refiner(&self) -> SurfaceRefiner {
        SurfaceRefiner::new()
            .window_size(self.settings.continuity_window_size)
            .max_neighbor_distance(self.settings.max_neighbor_distance)
    }

    pub fn gap_filler(&self) -> GapFiller {
        GapFiller::new()
            .confidence_decay(self.settings.extrapolation_confidence_decay)
            .min_confidence(self.settings.min_extrapolated_confidence)
            .default_step(self.settings.default_extrapolation_step)
    }

    /// Reconstructs one position per point of `input`.
    pub fn reconstruct(
        &self,
        input: &ReconstructionInput,
    ) -> Result<ReconstructionOutput, ReconstructionError> {
        self.reconstruct_with_observer(input, NoopObserver)
    }

    /// Reconstructs one position per point of `input`, reporting stage boundaries to `observer`.
    pub fn reconstruct_with_observer<O: StageObserver>(
        &self,
        input: &ReconstructionInput,
        mut observer: O,
    ) -> Result<ReconstructionOutput, ReconstructionError> {
        input.validate()?;
        let cone = input.cone(&self.settings)?;
        let rig = CameraRig::new(self.camera_geometry(), input.camera_poses.iter().copied());
        let total_points = input.total_points;
        let observations = usable_observations(&input.observations, &rig, total_points);
        info!(
            "reconstructing {} points from {} observations in {} cameras",
            total_points,
            observations.len(),
            rig.len()
        );

        let filtered = run_stage(&mut observer, Stage::ReflectionFilter, || {
            self.reflection_filter().filter(&observations)
        })?;

        let occlusion = run_stage(&mut observer, Stage::OcclusionAnalysis, || {
            self.occlusion_analyzer().analyze(&observations, total_points)
        })?;

        let engine = self.triangulation_engine();
        let triangulations = run_stage(&mut observer, Stage::Triangulation, || {
            engine.triangulate(
                &filtered.observations,
                &rig,
                &occlusion,
                &cone,
                total_points,
            )
        })?;

        let (candidates, surface_choices) = if self.settings.enable_surface_refinement {
            let refinement = run_stage(&mut observer, Stage::SurfaceRefinement, || {
                self.surface_refiner()
                    .refine(&triangulations, &engine, &rig, &cone)
            })?;
            (refinement.candidates, Some(refinement.choices))
        } else {
            let candidates = triangulations
                .iter()
                .map(|triangulation| triangulation.candidate().copied())
                .collect();
            (candidates, None)
        };

        let known: Vec<FinalPosition> = candidates
            .iter()
            .flatten()
            .map(|candidate| {
                FinalPosition::observed(
                    candidate.point_index,
                    candidate.position,
                    &cone,
                    candidate.confidence,
                    candidate.observation_count,
                )
            })
            .collect();
        let num_observed = known.len();

        let positions = run_stage(&mut observer, Stage::GapFilling, || {
            self.gap_filler().fill(&known, total_points, &cone)
        })??;

        Ok(ReconstructionOutput {
            metadata: RunMetadata {
                total_leds: total_points,
                tree_height: input.object_height,
                num_cameras: rig.len(),
                num_observed,
                num_predicted: positions.len() - num_observed,
                cameras: rig.poses().copied().collect(),
            },
            positions,
            reflection_clusters: filtered.clusters,
            surface_choices,
        })
    }
}

fn run_stage<O: StageObserver, T>(
    observer: &mut O,
    stage: Stage,
    work: impl FnOnce() -> T,
) -> Result<T, ReconstructionError> {
    if observer.stage_started(stage).is_break() {
        info!("reconstruction cancelled before the {} stage", stage);
        return Err(ReconstructionError::Cancelled(stage));
    }
    debug!("running the {} stage", stage);
    let output = work();
    observer.stage_finished(stage);
    Ok(output)
}

/// Drops observations of points past the end of the string and of cameras without a pose.
fn usable_observations(
    observations: &[Observation],
    rig: &CameraRig,
    total_points: usize,
) -> Vec<Observation> {
    let mut missing_cameras = BTreeSet::new();
    let mut out_of_range = 0;
    let usable = observations
        .iter()
        .filter(|observation| {
            if observation.point_index >= total_points {
                out_of_range += 1;
                false
            } else if !rig.contains(observation.camera_index) {
                if missing_cameras.insert(observation.camera_index) {
                    warn!(
                        "camera {} has no pose, ignoring its observations",
                        observation.camera_index
                    );
                }
                false
            } else {
                true
            }
        })
        .copied()
        .collect();
    if out_of_range > 0 {
        warn!(
            "ignoring {} observations of points outside of 0..{}",
            out_of_range, total_points
        );
    }
    usable
}
