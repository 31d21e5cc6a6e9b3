use crate::ReconstructionError;
use cone_core::nalgebra::{Point3, Vector3};
use cone_core::{ConeModel, FinalPosition};
use log::*;
use std::collections::BTreeMap;

/// Fills the positions of points that could not be placed from their neighbors along the string.
///
/// A missing point between two placed points is interpolated linearly in world space. A missing
/// point before the first or after the last placed point is extrapolated with the per-index step
/// of the two nearest placed points on that side, and loses confidence with every step away from
/// its anchor.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct GapFiller {
    confidence_decay: f64,
    min_confidence: f64,
    default_step: f64,
}

impl GapFiller {
    /// Creates a `GapFiller` with default values.
    ///
    /// Same as calling [`Default::default`].
    pub fn new() -> Self {
        Default::default()
    }

    /// Set the confidence lost per index when extrapolating.
    ///
    /// Default is `0.05`.
    #[must_use]
    pub fn confidence_decay(self, confidence_decay: f64) -> Self {
        Self {
            confidence_decay,
            ..self
        }
    }

    /// Set the floor of the confidence of extrapolated points.
    ///
    /// Default is `0.2`.
    #[must_use]
    pub fn min_confidence(self, min_confidence: f64) -> Self {
        Self {
            min_confidence,
            ..self
        }
    }

    /// Set the vertical step in meters per index used when a side has a single placed point.
    /// Points after it step up and points before it step down.
    ///
    /// Default is `0.01`.
    #[must_use]
    pub fn default_step(self, default_step: f64) -> Self {
        Self {
            default_step,
            ..self
        }
    }

    /// The confidence of a point extrapolated `steps` indices away from an anchor.
    ///
    /// ```
    /// use cone_reconstruction::GapFiller;
    /// let filler = GapFiller::new();
    /// assert!((filler.extrapolated_confidence(0.9, 3) - 0.75).abs() < 1e-12);
    /// assert_eq!(filler.extrapolated_confidence(0.3, 3), 0.2);
    /// ```
    pub fn extrapolated_confidence(&self, anchor_confidence: f64, steps: usize) -> f64 {
        (anchor_confidence - steps as f64 * self.confidence_decay).max(self.min_confidence)
    }

    /// Produces exactly one position per index in `0..total_points`.
    ///
    /// Known positions are passed through unchanged. Known positions with an index at or past
    /// `total_points` are ignored. If several known positions share an index, the last one wins.
    /// Filled positions are marked as predicted and have an observation count of zero.
    pub fn fill(
        &self,
        known: &[FinalPosition],
        total_points: usize,
        cone: &ConeModel,
    ) -> Result<Vec<FinalPosition>, ReconstructionError> {
        let known: BTreeMap<usize, FinalPosition> = known
            .iter()
            .filter(|position| position.point_index < total_points)
            .map(|position| (position.point_index, *position))
            .collect();
        if known.is_empty() {
            return Err(ReconstructionError::NothingPlaced(total_points));
        }
        let indices: Vec<usize> = known.keys().copied().collect();

        let filled = (0..total_points)
            .map(|index| {
                if let Some(position) = known.get(&index) {
                    return Some(*position);
                }
                let split = indices.partition_point(|&known_index| known_index < index);
                let nearest = |offset: usize| indices.get(offset).map(|i| &known[i]);
                let before = split.checked_sub(1).and_then(nearest);
                let after = nearest(split);
                match (before, after) {
                    (Some(before), Some(after)) => {
                        Some(Self::interpolate(index, before, after, cone))
                    }
                    (Some(anchor), None) => {
                        let neighbor = split.checked_sub(2).and_then(nearest);
                        Some(self.extrapolate(index, anchor, neighbor, true, cone))
                    }
                    (None, Some(anchor)) => {
                        let neighbor = nearest(split + 1);
                        Some(self.extrapolate(index, anchor, neighbor, false, cone))
                    }
                    (None, None) => None,
                }
            })
            .collect::<Option<Vec<FinalPosition>>>()
            .ok_or(ReconstructionError::NothingPlaced(total_points))?;

        info!(
            "filled {} of {} points from {} known positions",
            total_points - known.len(),
            total_points,
            known.len()
        );
        Ok(filled)
    }

    fn interpolate(
        index: usize,
        before: &FinalPosition,
        after: &FinalPosition,
        cone: &ConeModel,
    ) -> FinalPosition {
        let t = (index - before.point_index) as f64 / (after.point_index - before.point_index) as f64;
        let start = before.position();
        let position = start + (after.position() - start) * t;
        FinalPosition::predicted(
            index,
            position,
            cone,
            before.confidence.min(after.confidence),
        )
    }

    /// Extrapolates from the known position nearest to the gap. `neighbor` is the next known
    /// position on the same side, further away from the gap.
    fn extrapolate(
        &self,
        index: usize,
        anchor: &FinalPosition,
        neighbor: Option<&FinalPosition>,
        upwards: bool,
        cone: &ConeModel,
    ) -> FinalPosition {
        let step: Vector3<f64> = match neighbor {
            Some(neighbor) => {
                let span = anchor.point_index.abs_diff(neighbor.point_index) as f64;
                (anchor.position() - neighbor.position()) / span
            }
            None if upwards => Vector3::new(0.0, 0.0, self.default_step),
            None => Vector3::new(0.0, 0.0, -self.default_step),
        };
        let steps = index.abs_diff(anchor.point_index);
        let moved = anchor.position() + step * steps as f64;
        let position = Point3::new(moved.x, moved.y, moved.z.clamp(0.0, cone.height()));
        trace!(
            "extrapolated point {} {} steps from point {}",
            index,
            steps,
            anchor.point_index
        );
        FinalPosition::predicted(
            index,
            position,
            cone,
            self.extrapolated_confidence(anchor.confidence, steps),
        )
    }
}

impl Default for GapFiller {
    fn default() -> Self {
        Self {
            confidence_decay: 0.05,
            min_confidence: 0.2,
            default_step: 0.01,
        }
    }
}
