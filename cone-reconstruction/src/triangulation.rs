use crate::{CameraRig, OcclusionMap};
use cone_core::{ConeModel, Observation, PositionCandidate, Surface};
use cone_geom::{DualRayConeIntersection, RayConeIntersection, RayConeIntersector};
use float_ord::FloatOrd;
use log::*;
use std::cmp::Reverse;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// An observation together with the weight it carries after accounting for occlusion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedObservation {
    pub observation: Observation,
    /// The occlusion score of the observed point in the observing camera.
    pub occlusion: f64,
    /// `weight · (1 - occlusion)`
    pub final_weight: f64,
}

impl WeightedObservation {
    pub fn new(observation: Observation, occlusion: f64) -> Self {
        Self {
            observation,
            occlusion,
            final_weight: observation.weight() * (1.0 - occlusion),
        }
    }
}

/// The observation a point was placed from and where its ray met the cone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub observation: WeightedObservation,
    pub intersection: DualRayConeIntersection,
    pub surface: Surface,
    pub candidate: PositionCandidate,
}

/// The result of triangulating a single point.
#[derive(Debug, Clone, PartialEq)]
pub struct PointTriangulation {
    pub point_index: usize,
    /// Every observation that passed the confidence filter, by descending final weight.
    pub contributors: Vec<WeightedObservation>,
    /// `None` if no contributor's ray met the cone.
    pub placement: Option<Placement>,
}

impl PointTriangulation {
    pub fn candidate(&self) -> Option<&PositionCandidate> {
        self.placement.as_ref().map(|placement| &placement.candidate)
    }

    pub fn is_placed(&self) -> bool {
        self.placement.is_some()
    }
}

/// Places each point on the cone from its single most trustworthy observation.
///
/// Every observation is weighted by its detection and angular confidence and discounted by how
/// likely the point is hidden from its camera. The ray of the best observation is intersected
/// with the cone. A clear view means the LED is on the near side of the cone, while a view the
/// occlusion analysis considers blocked is taken to see the LED through the gaps on the far side.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct TriangulationEngine {
    min_confidence: f64,
    surface_threshold: f64,
    try_next_best_observation: bool,
    intersector: RayConeIntersector,
}

impl TriangulationEngine {
    /// Creates a `TriangulationEngine` with default values.
    ///
    /// Same as calling [`Default::default`].
    pub fn new() -> Self {
        Default::default()
    }

    /// Set the minimum detection confidence for an observation to take part.
    ///
    /// Default is `0.5`.
    #[must_use]
    pub fn min_confidence(self, min_confidence: f64) -> Self {
        Self {
            min_confidence,
            ..self
        }
    }

    /// Set the occlusion score at or above which the back surface is preferred.
    ///
    /// Default is `0.5`.
    #[must_use]
    pub fn surface_threshold(self, surface_threshold: f64) -> Self {
        Self {
            surface_threshold,
            ..self
        }
    }

    /// Fall through to the next best observation when the ray of the best one misses the cone.
    ///
    /// Default is `false`.
    #[must_use]
    pub fn try_next_best_observation(self, try_next_best_observation: bool) -> Self {
        Self {
            try_next_best_observation,
            ..self
        }
    }

    /// Set the intersector used to cast observation rays onto the cone.
    #[must_use]
    pub fn intersector(self, intersector: RayConeIntersector) -> Self {
        Self {
            intersector,
            ..self
        }
    }

    /// Filters and weighs the observations of one point, ordered by descending final weight.
    ///
    /// Observations under the confidence threshold or from cameras without a pose are excluded.
    pub fn weigh(
        &self,
        observations: &[Observation],
        rig: &CameraRig,
        occlusion: &OcclusionMap,
    ) -> Vec<WeightedObservation> {
        let mut weighted: Vec<WeightedObservation> = observations
            .iter()
            .filter(|observation| observation.detection_confidence >= self.min_confidence)
            .filter(|observation| rig.contains(observation.camera_index))
            .map(|&observation| {
                WeightedObservation::new(
                    observation,
                    occlusion.score(observation.camera_index, observation.point_index),
                )
            })
            .collect();
        weighted.sort_by_key(|weighted| Reverse(FloatOrd(weighted.final_weight)));
        weighted
    }

    /// Picks the crossing the observed LED most likely sits on.
    pub fn choose_surface(
        &self,
        occlusion: f64,
        intersection: &DualRayConeIntersection,
    ) -> (Surface, RayConeIntersection) {
        match intersection.back {
            Some(back) if occlusion >= self.surface_threshold => (Surface::Back, back),
            _ => (Surface::Front, intersection.front),
        }
    }

    /// Casts the ray of an observation onto the cone.
    pub fn intersect(
        &self,
        observation: &Observation,
        rig: &CameraRig,
        cone: &ConeModel,
    ) -> Option<DualRayConeIntersection> {
        let ray = rig.ray(observation)?;
        self.intersector.intersect_dual(&ray, cone)
    }

    /// Triangulates one point from its observations.
    pub fn triangulate_point(
        &self,
        point_index: usize,
        observations: &[Observation],
        rig: &CameraRig,
        occlusion: &OcclusionMap,
        cone: &ConeModel,
    ) -> PointTriangulation {
        let contributors = self.weigh(observations, rig, occlusion);
        let attempts = if self.try_next_best_observation {
            contributors.len()
        } else {
            1
        };

        let placement = contributors.iter().take(attempts).find_map(|weighted| {
            let intersection = self.intersect(&weighted.observation, rig, cone);
            if intersection.is_none() {
                debug!(
                    "ray of point {} from camera {} misses the cone",
                    point_index, weighted.observation.camera_index
                );
            }
            let intersection = intersection?;
            let (surface, crossing) = self.choose_surface(weighted.occlusion, &intersection);
            Some(Placement {
                observation: *weighted,
                intersection,
                surface,
                candidate: PositionCandidate {
                    point_index,
                    surface,
                    cone_point: crossing.cone_point(),
                    position: crossing.position,
                    confidence: weighted.final_weight,
                    observation_count: contributors.len(),
                },
            })
        });

        PointTriangulation {
            point_index,
            contributors,
            placement,
        }
    }

    /// Triangulates every point in `0..total_points`.
    ///
    /// Observations of points outside of that range are ignored.
    pub fn triangulate(
        &self,
        observations: &[Observation],
        rig: &CameraRig,
        occlusion: &OcclusionMap,
        cone: &ConeModel,
        total_points: usize,
    ) -> Vec<PointTriangulation> {
        let per_point = group_by_point(observations, total_points);

        #[cfg(not(feature = "rayon"))]
        let triangulations: Vec<PointTriangulation> = per_point
            .iter()
            .enumerate()
            .map(|(point_index, observations)| {
                self.triangulate_point(point_index, observations, rig, occlusion, cone)
            })
            .collect();
        #[cfg(feature = "rayon")]
        let triangulations: Vec<PointTriangulation> = per_point
            .par_iter()
            .enumerate()
            .map(|(point_index, observations)| {
                self.triangulate_point(point_index, observations, rig, occlusion, cone)
            })
            .collect();

        info!(
            "triangulated {} of {} points",
            triangulations.iter().filter(|t| t.is_placed()).count(),
            total_points
        );
        triangulations
    }
}

impl Default for TriangulationEngine {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
            surface_threshold: 0.5,
            try_next_best_observation: false,
            intersector: RayConeIntersector::default(),
        }
    }
}

/// Buckets observations by point index, dropping those at or past `total_points`.
pub(crate) fn group_by_point(
    observations: &[Observation],
    total_points: usize,
) -> Vec<Vec<Observation>> {
    let mut per_point = vec![vec![]; total_points];
    for observation in observations {
        if let Some(bucket) = per_point.get_mut(observation.point_index) {
            bucket.push(*observation);
        }
    }
    per_point
}
