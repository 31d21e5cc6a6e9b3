use crate::{CameraPose, Ray};
use derive_more::{AsMut, AsRef, Deref, DerefMut, From, Into};
use nalgebra::{Point2, Point3, UnitVector3};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Anything that was detected at a pixel of a camera image.
pub trait ImagePoint {
    fn image_point(&self) -> Point2<f64>;
}

/// A pixel location on a camera image.
///
/// The origin is the top left corner of the image, X grows to the right and Y grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, AsMut, AsRef, Deref, DerefMut, From, Into)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct KeyPoint(pub Point2<f64>);

impl ImagePoint for KeyPoint {
    fn image_point(&self) -> Point2<f64> {
        self.0
    }
}

impl ImagePoint for Point2<f64> {
    fn image_point(&self) -> Point2<f64> {
        *self
    }
}

/// Maps pixels of a camera to bearings in camera space and back.
///
/// Bearings use camera space: X right, Y down and Z forwards out of the optical center.
pub trait CameraModel {
    /// The direction of the light that reached `point` through the optical center.
    fn calibrate<P>(&self, point: P) -> UnitVector3<f64>
    where
        P: ImagePoint;

    /// The pixel a bearing lands on, or `None` if the bearing does not reach the image plane.
    fn uncalibrate(&self, bearing: UnitVector3<f64>) -> Option<KeyPoint>;

    /// Casts the world-space ray through `point` of a camera placed at `pose`.
    fn cast_ray<P>(&self, pose: &CameraPose, point: P) -> Ray
    where
        P: ImagePoint,
    {
        pose.ray(self.calibrate(point))
    }

    /// The pixel a world point is seen at by a camera placed at `pose`.
    ///
    /// Returns `None` for points behind the camera or at its optical center.
    fn project(&self, pose: &CameraPose, point: Point3<f64>) -> Option<KeyPoint> {
        UnitVector3::try_new(pose.world_to_camera(point), f64::EPSILON)
            .and_then(|bearing| self.uncalibrate(bearing))
    }
}
