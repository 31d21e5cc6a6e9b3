//! Surface selection from the continuity of the string.
//!
//! The triangulation engine decides between the near and the far side of the cone per point from
//! the occlusion score alone. Consecutive LEDs on the string are physically close, so a point
//! whose near-side candidate lines up with its neighbors' near-side candidates most likely is on
//! the near side, and likewise for the far side. The refiner scores both hypotheses against the
//! neighbors along the string and keeps the one that continues the string best.

use crate::{CameraRig, PointTriangulation, TriangulationEngine};
use cone_core::{ConeModel, PositionCandidate, Surface};
use cone_geom::{circular_mean_degrees, cone_space_distance, RayConeIntersection};
use log::*;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// A candidate position averaged over every contributing observation that crossed one surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceEstimate {
    pub candidate: PositionCandidate,
    /// The mean distance from the cameras to their crossings.
    pub mean_ray_distance: f64,
}

/// The front and back hypotheses of one point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceCandidates {
    pub point_index: usize,
    pub front: Option<SurfaceEstimate>,
    pub back: Option<SurfaceEstimate>,
}

impl SurfaceCandidates {
    pub fn surface(&self, surface: Surface) -> Option<&SurfaceEstimate> {
        match surface {
            Surface::Front => self.front.as_ref(),
            Surface::Back => self.back.as_ref(),
        }
    }
}

/// The surface the refiner settled on for one point and how strongly.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct SurfaceChoice {
    #[cfg_attr(feature = "serde-serialize", serde(rename = "index"))]
    pub point_index: usize,
    pub surface: Surface,
    pub front_score: f64,
    pub back_score: f64,
    /// `front_score / (front_score + back_score)`, or `0.5` when both are zero.
    pub front_confidence: f64,
}

/// The outcome of a refinement pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Refinement {
    /// The refined candidate per point index, `None` where a point is still unplaced.
    pub candidates: Vec<Option<PositionCandidate>>,
    pub choices: Vec<SurfaceChoice>,
}

/// Chooses the surface of each point from the continuity with its neighbors along the string.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct SurfaceRefiner {
    window_size: usize,
    max_neighbor_distance: f64,
}

impl SurfaceRefiner {
    /// Creates a `SurfaceRefiner` with default values.
    ///
    /// Same as calling [`Default::default`].
    pub fn new() -> Self {
        Default::default()
    }

    /// Set how many neighbors on each side of a point are considered.
    ///
    /// Default is `5`.
    #[must_use]
    pub fn window_size(self, window_size: usize) -> Self {
        Self {
            window_size,
            ..self
        }
    }

    /// Set the cone-space distance in meters under which a neighbor counts as continuous.
    ///
    /// Default is `0.15`.
    #[must_use]
    pub fn max_neighbor_distance(self, max_neighbor_distance: f64) -> Self {
        Self {
            max_neighbor_distance,
            ..self
        }
    }

    /// Builds the front and back candidates of one point from all of its contributors.
    pub fn candidates(
        &self,
        triangulation: &PointTriangulation,
        engine: &TriangulationEngine,
        rig: &CameraRig,
        cone: &ConeModel,
    ) -> SurfaceCandidates {
        let crossings: Vec<(f64, RayConeIntersection, Option<RayConeIntersection>)> = triangulation
            .contributors
            .iter()
            .filter_map(|weighted| {
                let dual = engine.intersect(&weighted.observation, rig, cone)?;
                Some((weighted.final_weight, dual.front, dual.back))
            })
            .collect();

        let front: Vec<(f64, RayConeIntersection)> = crossings
            .iter()
            .map(|&(weight, front, _)| (weight, front))
            .collect();
        let back: Vec<(f64, RayConeIntersection)> = crossings
            .iter()
            .filter_map(|&(weight, _, back)| Some((weight, back?)))
            .collect();

        let point_index = triangulation.point_index;
        SurfaceCandidates {
            point_index,
            front: average_crossings(point_index, Surface::Front, &front, cone),
            back: average_crossings(point_index, Surface::Back, &back, cone),
        }
    }

    /// The continuity score of the hypothesis that `candidates[index]` lies on `surface`.
    ///
    /// Every neighbor at offset `1..=window_size` on either side with a candidate on the same
    /// surface within the maximum neighbor distance contributes `1 - offset / window_size`.
    pub fn continuity_score(
        &self,
        candidates: &[SurfaceCandidates],
        index: usize,
        surface: Surface,
        object_height: f64,
    ) -> f64 {
        let own = match candidates.get(index).and_then(|c| c.surface(surface)) {
            Some(own) => own.candidate.cone_point,
            None => return 0.0,
        };
        if self.window_size == 0 {
            return 0.0;
        }
        let window = self.window_size as f64;
        (1..=self.window_size)
            .flat_map(|offset| {
                let before = index.checked_sub(offset);
                let after = index.checked_add(offset);
                [before, after]
                    .into_iter()
                    .flatten()
                    .map(move |neighbor| (offset, neighbor))
            })
            .filter_map(|(offset, neighbor)| {
                let neighbor = candidates.get(neighbor)?.surface(surface)?;
                let distance =
                    cone_space_distance(&own, &neighbor.candidate.cone_point, object_height);
                (distance <= self.max_neighbor_distance).then(|| 1.0 - offset as f64 / window)
            })
            .sum()
    }

    /// Chooses the surface of `candidates[index]`, or `None` if it has no candidate at all.
    pub fn choose(
        &self,
        candidates: &[SurfaceCandidates],
        index: usize,
        object_height: f64,
    ) -> Option<SurfaceChoice> {
        let point = candidates.get(index)?;
        let front_score = self.continuity_score(candidates, index, Surface::Front, object_height);
        let back_score = self.continuity_score(candidates, index, Surface::Back, object_height);
        let surface = match (point.front.is_some(), point.back.is_some()) {
            (false, false) => return None,
            (true, false) => Surface::Front,
            (false, true) => Surface::Back,
            (true, true) if back_score > front_score => Surface::Back,
            (true, true) => Surface::Front,
        };
        let total = front_score + back_score;
        let front_confidence = if total > 0.0 {
            front_score / total
        } else {
            0.5
        };
        Some(SurfaceChoice {
            point_index: point.point_index,
            surface,
            front_score,
            back_score,
            front_confidence,
        })
    }

    /// Re-decides the surface of every point.
    ///
    /// A point the engine placed moves to the averaged candidate on the chosen surface but keeps
    /// the engine's confidence and observation count. A point the engine could not place but
    /// that has a candidate is placed with the candidate's own confidence.
    pub fn refine(
        &self,
        triangulations: &[PointTriangulation],
        engine: &TriangulationEngine,
        rig: &CameraRig,
        cone: &ConeModel,
    ) -> Refinement {
        #[cfg(not(feature = "rayon"))]
        let candidates: Vec<SurfaceCandidates> = triangulations
            .iter()
            .map(|triangulation| self.candidates(triangulation, engine, rig, cone))
            .collect();
        #[cfg(feature = "rayon")]
        let candidates: Vec<SurfaceCandidates> = triangulations
            .par_iter()
            .map(|triangulation| self.candidates(triangulation, engine, rig, cone))
            .collect();

        let mut choices = vec![];
        let mut switched = 0;
        let refined = triangulations
            .iter()
            .enumerate()
            .map(|(index, triangulation)| {
                let engine_candidate = triangulation.candidate().copied();
                let choice = match self.choose(&candidates, index, cone.height()) {
                    Some(choice) => choice,
                    None => return engine_candidate,
                };
                choices.push(choice);
                let estimate = candidates[index].surface(choice.surface)?.candidate;
                match engine_candidate {
                    Some(placed) => {
                        if placed.surface != choice.surface {
                            switched += 1;
                        }
                        Some(PositionCandidate {
                            confidence: placed.confidence,
                            observation_count: placed.observation_count,
                            ..estimate
                        })
                    }
                    None => Some(estimate),
                }
            })
            .collect();

        info!(
            "surface refinement chose {} surfaces and switched {}",
            choices.len(),
            switched
        );
        Refinement {
            candidates: refined,
            choices,
        }
    }
}

impl Default for SurfaceRefiner {
    fn default() -> Self {
        Self {
            window_size: 5,
            max_neighbor_distance: 0.15,
        }
    }
}

fn average_crossings(
    point_index: usize,
    surface: Surface,
    crossings: &[(f64, RayConeIntersection)],
    cone: &ConeModel,
) -> Option<SurfaceEstimate> {
    let angle_degrees =
        circular_mean_degrees(crossings.iter().map(|(_, crossing)| crossing.angle_degrees))?;
    let count = crossings.len() as f64;
    let normalized_height = crossings
        .iter()
        .map(|(_, crossing)| crossing.normalized_height)
        .sum::<f64>()
        / count;
    let mean_ray_distance =
        crossings.iter().map(|(_, crossing)| crossing.ray_distance).sum::<f64>() / count;
    let confidence = crossings.iter().map(|(weight, _)| weight).sum::<f64>() / count;
    let position = cone.cone_to_cartesian(normalized_height, angle_degrees);
    Some(SurfaceEstimate {
        candidate: PositionCandidate {
            point_index,
            surface,
            cone_point: cone.cartesian_to_cone(position),
            position,
            confidence,
            observation_count: crossings.len(),
        },
        mean_ray_distance,
    })
}
