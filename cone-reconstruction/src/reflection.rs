//! Attenuation of detections caused by reflective surfaces.
//!
//! A shiny ornament or a window behind the object lights up whenever a nearby LED is on. The
//! detector then reports the reflection at the same pixel for many different LEDs. A real LED
//! sits at one place, so a pixel location claimed by several LEDs in one camera is suspicious.

use cone_core::Observation;
use log::*;
use std::collections::{BTreeMap, BTreeSet};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// The highest reflection score. Membership in a cluster alone never removes all confidence.
pub const MAX_REFLECTION_SCORE: f64 = 0.9;

/// A grid cell of one camera that several different LEDs were detected in.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ReflectionCluster {
    pub camera_index: usize,
    /// The grid cell in units of the spatial threshold.
    pub cell: (i64, i64),
    /// The distinct LEDs detected in the cell, in ascending order.
    pub point_indices: Vec<usize>,
    pub reflection_score: f64,
}

/// The score of a cluster of `cluster_size` distinct LEDs.
///
/// ```
/// use cone_reconstruction::reflection_score;
/// assert_eq!(reflection_score(1), 0.0);
/// assert!((reflection_score(4) - 0.3).abs() < 1e-12);
/// assert_eq!(reflection_score(50), 0.9);
/// ```
pub fn reflection_score(cluster_size: usize) -> f64 {
    (cluster_size.saturating_sub(1) as f64 / 10.0).min(MAX_REFLECTION_SCORE)
}

/// The output of the reflection filter.
#[derive(Debug, Clone, PartialEq)]
pub struct ReflectionFiltered {
    /// The surviving observations, in input order, with attenuated confidences.
    pub observations: Vec<Observation>,
    pub clusters: Vec<ReflectionCluster>,
}

/// Finds reflection clusters and attenuates the observations inside them.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct ReflectionFilter {
    spatial_threshold: f64,
    min_confidence: f64,
}

impl ReflectionFilter {
    /// Creates a `ReflectionFilter` with default values.
    ///
    /// Same as calling [`Default::default`].
    pub fn new() -> Self {
        Default::default()
    }

    /// Set the size in pixels of the grid cells observations are bucketed into.
    /// A non-positive size disables the filter.
    ///
    /// Default is `20.0`.
    #[must_use]
    pub fn spatial_threshold(self, spatial_threshold: f64) -> Self {
        Self {
            spatial_threshold,
            ..self
        }
    }

    /// Set the confidence below which an attenuated observation is dropped.
    ///
    /// Default is `0.3`.
    #[must_use]
    pub fn min_confidence(self, min_confidence: f64) -> Self {
        Self {
            min_confidence,
            ..self
        }
    }

    fn enabled(&self) -> bool {
        self.spatial_threshold.is_finite() && self.spatial_threshold > 0.0
    }

    fn cell(&self, observation: &Observation) -> (usize, i64, i64) {
        (
            observation.camera_index,
            (observation.pixel_x / self.spatial_threshold).floor() as i64,
            (observation.pixel_y / self.spatial_threshold).floor() as i64,
        )
    }

    /// Finds every grid cell that holds detections of more than one distinct LED.
    pub fn clusters(&self, observations: &[Observation]) -> Vec<ReflectionCluster> {
        if !self.enabled() {
            return vec![];
        }
        let mut cells: BTreeMap<(usize, i64, i64), BTreeSet<usize>> = BTreeMap::new();
        for observation in observations {
            cells
                .entry(self.cell(observation))
                .or_default()
                .insert(observation.point_index);
        }
        cells
            .into_iter()
            .filter(|(_, points)| points.len() > 1)
            .map(|((camera_index, x, y), points)| ReflectionCluster {
                camera_index,
                cell: (x, y),
                reflection_score: reflection_score(points.len()),
                point_indices: points.into_iter().collect(),
            })
            .collect()
    }

    /// Attenuates the detection confidence of clustered observations by their cluster's score
    /// and drops those that fall under the minimum confidence. Other observations pass through
    /// untouched.
    pub fn filter(&self, observations: &[Observation]) -> ReflectionFiltered {
        let clusters = self.clusters(observations);
        let scores: BTreeMap<(usize, i64, i64), f64> = clusters
            .iter()
            .map(|cluster| {
                (
                    (cluster.camera_index, cluster.cell.0, cluster.cell.1),
                    cluster.reflection_score,
                )
            })
            .collect();

        for cluster in &clusters {
            debug!(
                "camera {} cell {:?} is a suspected reflection of {} points with score {}",
                cluster.camera_index,
                cluster.cell,
                cluster.point_indices.len(),
                cluster.reflection_score
            );
        }

        let filtered: Vec<Observation> = observations
            .iter()
            .filter_map(|observation| match scores.get(&self.cell(observation)) {
                None => Some(*observation),
                Some(score) => {
                    let confidence = observation.detection_confidence * (1.0 - score);
                    (confidence >= self.min_confidence)
                        .then(|| observation.with_detection_confidence(confidence))
                }
            })
            .collect();

        info!(
            "reflection filter kept {} of {} observations and found {} clusters",
            filtered.len(),
            observations.len(),
            clusters.len()
        );

        ReflectionFiltered {
            observations: filtered,
            clusters,
        }
    }
}

impl Default for ReflectionFilter {
    fn default() -> Self {
        Self {
            spatial_threshold: 20.0,
            min_confidence: 0.3,
        }
    }
}
