use crate::ImagePoint;
use nalgebra::Point2;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// A single detection of one LED by one camera.
///
/// Observations are produced by an external detector. The reconstruction never mutates an
/// observation; stages that adjust confidences produce new values instead.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Observation {
    /// The index of the LED along the string.
    pub point_index: usize,
    /// The index of the camera that made the observation.
    pub camera_index: usize,
    pub pixel_x: f64,
    pub pixel_y: f64,
    /// How sure the detector is that the blob is the lit LED, in `[0, 1]`.
    pub detection_confidence: f64,
    /// How favorable the viewing angle of the camera is for this LED, in `[0, 1]`.
    pub angular_confidence: f64,
}

impl Observation {
    /// The combined weight of the observation.
    ///
    /// ```
    /// use cone_core::Observation;
    /// let observation = Observation {
    ///     point_index: 0,
    ///     camera_index: 0,
    ///     pixel_x: 10.0,
    ///     pixel_y: 20.0,
    ///     detection_confidence: 0.5,
    ///     angular_confidence: 0.8,
    /// };
    /// assert!((observation.weight() - 0.4).abs() < 1e-12);
    /// ```
    pub fn weight(&self) -> f64 {
        self.detection_confidence * self.angular_confidence
    }

    /// Creates a copy of this observation with a different detection confidence.
    #[must_use]
    pub fn with_detection_confidence(self, detection_confidence: f64) -> Self {
        Self {
            detection_confidence,
            ..self
        }
    }
}

impl ImagePoint for Observation {
    fn image_point(&self) -> Point2<f64> {
        Point2::new(self.pixel_x, self.pixel_y)
    }
}
