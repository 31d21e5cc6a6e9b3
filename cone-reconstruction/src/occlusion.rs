//! Estimation of how likely each LED is hidden from each camera.
//!
//! LEDs are numbered along the string, and neighbors on the string sit close to each other on
//! the object. A camera that sees LED `i` clearly therefore usually sees `i - 1` and `i + 1` too,
//! while a branch in front of the camera hides a whole run of consecutive LEDs. Smoothing the
//! per-camera detection confidences along the string and splitting them into visible and hidden
//! runs turns this into a per-camera, per-LED occlusion score.

use cone_core::Observation;
use itertools::Itertools;
use log::*;
use std::collections::BTreeMap;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// The lowest score given to a point in a hidden run.
const HIDDEN_BASE_SCORE: f64 = 0.7;

/// A maximal run of consecutive points that are all either visible or hidden to one camera.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct VisibilitySegment {
    /// The first point index of the run.
    pub start: usize,
    /// The last point index of the run (inclusive).
    pub end: usize,
    pub visible: bool,
    /// The mean smoothed confidence over the run.
    pub average_confidence: f64,
}

impl VisibilitySegment {
    /// The occlusion score shared by every point of this segment.
    ///
    /// ```
    /// use cone_reconstruction::VisibilitySegment;
    /// let hidden = VisibilitySegment { start: 0, end: 4, visible: false, average_confidence: 0.0 };
    /// assert_eq!(hidden.occlusion_score(), 1.0);
    /// let visible = VisibilitySegment { start: 0, end: 4, visible: true, average_confidence: 0.9 };
    /// assert!((visible.occlusion_score() - 0.1).abs() < 1e-12);
    /// ```
    pub fn occlusion_score(&self) -> f64 {
        let score = if self.visible {
            1.0 - self.average_confidence
        } else {
            HIDDEN_BASE_SCORE + (1.0 - HIDDEN_BASE_SCORE) * (1.0 - self.average_confidence)
        };
        score.clamp(0.0, 1.0)
    }

    pub fn contains(&self, point_index: usize) -> bool {
        (self.start..=self.end).contains(&point_index)
    }
}

/// The occlusion analysis of a single camera.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct CameraOcclusion {
    pub camera_index: usize,
    /// The smoothed confidence per point index.
    pub smoothed_confidence: Vec<f64>,
    /// The runs covering `0..smoothed_confidence.len()` in order.
    pub segments: Vec<VisibilitySegment>,
    /// The occlusion score per point index.
    pub scores: Vec<f64>,
}

impl CameraOcclusion {
    /// Builds the analysis of a camera directly from known scores, without smoothing or
    /// segmentation.
    pub fn from_scores(camera_index: usize, scores: Vec<f64>) -> Self {
        Self {
            camera_index,
            smoothed_confidence: vec![],
            segments: vec![],
            scores,
        }
    }

    /// The occlusion score of a point, or `0.0` if the point is out of range.
    pub fn score(&self, point_index: usize) -> f64 {
        self.scores.get(point_index).copied().unwrap_or(0.0)
    }
}

/// Occlusion scores for every `(camera, point)` pair.
///
/// Looking up a camera or point that was never analyzed gives `0.0`, meaning there is no
/// evidence of occlusion.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct OcclusionMap {
    cameras: BTreeMap<usize, CameraOcclusion>,
}

impl OcclusionMap {
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds the analysis of a camera, replacing any previous one for the same camera.
    pub fn insert(&mut self, camera: CameraOcclusion) {
        self.cameras.insert(camera.camera_index, camera);
    }

    /// The occlusion score of `point_index` as seen from `camera_index`, in `[0, 1]`.
    ///
    /// ```
    /// use cone_reconstruction::{CameraOcclusion, OcclusionMap};
    /// let mut map = OcclusionMap::new();
    /// map.insert(CameraOcclusion::from_scores(2, vec![0.1, 0.8]));
    /// assert_eq!(map.score(2, 1), 0.8);
    /// assert_eq!(map.score(2, 7), 0.0);
    /// assert_eq!(map.score(5, 0), 0.0);
    /// ```
    pub fn score(&self, camera_index: usize, point_index: usize) -> f64 {
        self.cameras
            .get(&camera_index)
            .map(|camera| camera.score(point_index))
            .unwrap_or(0.0)
    }

    pub fn camera(&self, camera_index: usize) -> Option<&CameraOcclusion> {
        self.cameras.get(&camera_index)
    }

    /// The analyzed cameras ordered by camera index.
    pub fn cameras(&self) -> impl Iterator<Item = &CameraOcclusion> + '_ {
        self.cameras.values()
    }

    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }
}

impl FromIterator<CameraOcclusion> for OcclusionMap {
    fn from_iter<I: IntoIterator<Item = CameraOcclusion>>(iter: I) -> Self {
        let mut map = Self::new();
        for camera in iter {
            map.insert(camera);
        }
        map
    }
}

/// Computes occlusion scores from the detection confidences along the string.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct OcclusionAnalyzer {
    visibility_threshold: f64,
    smoothing_window: usize,
}

impl OcclusionAnalyzer {
    /// Creates an `OcclusionAnalyzer` with default values.
    ///
    /// Same as calling [`Default::default`].
    pub fn new() -> Self {
        Default::default()
    }

    /// Set the smoothed confidence at or above which a point counts as visible.
    ///
    /// Default is `0.5`.
    #[must_use]
    pub fn visibility_threshold(self, visibility_threshold: f64) -> Self {
        Self {
            visibility_threshold,
            ..self
        }
    }

    /// Set the width of the centered moving average. Widths of `0` and `1` disable smoothing.
    ///
    /// Default is `5`.
    #[must_use]
    pub fn smoothing_window(self, smoothing_window: usize) -> Self {
        Self {
            smoothing_window,
            ..self
        }
    }

    /// The best detection confidence of each point in one camera, `0.0` where it was not seen.
    ///
    /// Observations of other cameras and out-of-range points are ignored.
    pub fn confidence_sequence(
        camera_index: usize,
        observations: &[Observation],
        total_points: usize,
    ) -> Vec<f64> {
        let mut sequence = vec![0.0_f64; total_points];
        for observation in observations
            .iter()
            .filter(|observation| observation.camera_index == camera_index)
        {
            if let Some(best) = sequence.get_mut(observation.point_index) {
                *best = best.max(observation.detection_confidence);
            }
        }
        sequence
    }

    /// Applies a centered moving average. The window is truncated at both ends of the sequence
    /// rather than padded. An even window reaches one sample further ahead than behind.
    ///
    /// ```
    /// use cone_reconstruction::OcclusionAnalyzer;
    /// let smoothed = OcclusionAnalyzer::new()
    ///     .smoothing_window(3)
    ///     .smooth(&[0.0, 3.0, 0.0, 3.0]);
    /// assert_eq!(smoothed, vec![1.5, 1.0, 2.0, 1.5]);
    /// ```
    pub fn smooth(&self, sequence: &[f64]) -> Vec<f64> {
        let width = self.smoothing_window.max(1);
        let behind = (width - 1) / 2;
        let ahead = width - 1 - behind;
        (0..sequence.len())
            .map(|index| {
                let start = index.saturating_sub(behind);
                let end = (index + ahead + 1).min(sequence.len());
                let window = &sequence[start..end];
                window.iter().sum::<f64>() / window.len() as f64
            })
            .collect()
    }

    /// Splits a smoothed sequence into maximal visible and hidden runs.
    pub fn segment(&self, smoothed: &[f64]) -> Vec<VisibilitySegment> {
        let threshold = self.visibility_threshold;
        smoothed
            .iter()
            .enumerate()
            .group_by(|&(_, &confidence)| confidence >= threshold)
            .into_iter()
            .filter_map(|(visible, run)| {
                let run: Vec<(usize, &f64)> = run.collect();
                let (start, _) = *run.first()?;
                let (end, _) = *run.last()?;
                let average_confidence =
                    run.iter().map(|&(_, &confidence)| confidence).sum::<f64>() / run.len() as f64;
                Some(VisibilitySegment {
                    start,
                    end,
                    visible,
                    average_confidence,
                })
            })
            .collect()
    }

    /// Runs the analysis for a single camera.
    pub fn analyze_camera(
        &self,
        camera_index: usize,
        observations: &[Observation],
        total_points: usize,
    ) -> CameraOcclusion {
        let sequence = Self::confidence_sequence(camera_index, observations, total_points);
        let smoothed_confidence = self.smooth(&sequence);
        let segments = self.segment(&smoothed_confidence);
        let mut scores = vec![0.0_f64; total_points];
        for segment in &segments {
            let score = segment.occlusion_score();
            for entry in &mut scores[segment.start..=segment.end] {
                *entry = score;
            }
        }
        trace!(
            "camera {} has {} visibility segments",
            camera_index,
            segments.len()
        );
        CameraOcclusion {
            camera_index,
            smoothed_confidence,
            segments,
            scores,
        }
    }

    /// Runs the analysis for every camera that made at least one observation.
    pub fn analyze(&self, observations: &[Observation], total_points: usize) -> OcclusionMap {
        let cameras: Vec<usize> = observations
            .iter()
            .map(|observation| observation.camera_index)
            .sorted_unstable()
            .dedup()
            .collect();

        #[cfg(not(feature = "rayon"))]
        let map: OcclusionMap = cameras
            .iter()
            .map(|&camera_index| self.analyze_camera(camera_index, observations, total_points))
            .collect();
        #[cfg(feature = "rayon")]
        let map: OcclusionMap = cameras
            .par_iter()
            .map(|&camera_index| self.analyze_camera(camera_index, observations, total_points))
            .collect::<Vec<_>>()
            .into_iter()
            .collect();

        info!(
            "analyzed occlusion of {} points in {} cameras",
            total_points,
            map.len()
        );
        map
    }
}

impl Default for OcclusionAnalyzer {
    fn default() -> Self {
        Self {
            visibility_threshold: 0.5,
            smoothing_window: 5,
        }
    }
}
