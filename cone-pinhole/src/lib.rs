//! This crate plugs into `cone-core` and provides the pinhole camera model used by the cameras
//! photographing the cone. Cameras are described by their image size and horizontal field of
//! view rather than a calibrated intrinsic matrix, because that is all a capture session knows
//! about a phone or webcam. The principal point is assumed to be the image center, pixels are
//! assumed square and lens distortion is ignored.
//!
//! It converts image coordinates into bearings in camera space and, through
//! [`CameraModel::cast_ray`] and a [`cone_core::CameraPose`], into rays in world space. It can
//! also convert backwards from a bearing to the pixel it would land on using
//! [`CameraModel::uncalibrate`].

use cone_core::nalgebra::{Point2, UnitVector3, Vector3};
use cone_core::{CameraModel, ImagePoint, KeyPoint};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Bearings with a forward component smaller than this can not be projected onto the image.
const MIN_FORWARD: f64 = 1e-12;

/// Intrinsics of a distortion-free camera described by its horizontal field of view.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct CameraGeometry {
    pub image_width: f64,
    pub image_height: f64,
    /// The horizontal field of view in degrees.
    pub fov_degrees: f64,
}

impl CameraGeometry {
    pub fn new(image_width: f64, image_height: f64, fov_degrees: f64) -> Self {
        Self {
            image_width,
            image_height,
            fov_degrees,
        }
    }

    /// The focal length in pixels.
    ///
    /// ```
    /// use cone_pinhole::CameraGeometry;
    /// let camera = CameraGeometry::new(1000.0, 800.0, 90.0);
    /// assert!((camera.focal_length() - 500.0).abs() < 1e-9);
    /// ```
    pub fn focal_length(&self) -> f64 {
        (self.image_width / 2.0) / (self.fov_degrees.to_radians() / 2.0).tan()
    }

    /// The pixel the optical axis passes through.
    pub fn principal_point(&self) -> Point2<f64> {
        Point2::new(self.image_width / 2.0, self.image_height / 2.0)
    }

    /// Converts a pixel into a unit direction in camera space.
    ///
    /// ```
    /// use cone_pinhole::CameraGeometry;
    /// let camera = CameraGeometry::default();
    /// let center = camera.principal_point();
    /// let bearing = camera.pixel_to_ray_direction(center.x, center.y);
    /// assert!((bearing.z - 1.0).abs() < 1e-12);
    /// ```
    pub fn pixel_to_ray_direction(&self, pixel_x: f64, pixel_y: f64) -> UnitVector3<f64> {
        self.calibrate(Point2::new(pixel_x, pixel_y))
    }
}

impl Default for CameraGeometry {
    fn default() -> Self {
        Self {
            image_width: 1280.0,
            image_height: 720.0,
            fov_degrees: 60.0,
        }
    }
}

impl CameraModel for CameraGeometry {
    /// Takes in a point from an image in pixel coordinates and converts it to a bearing.
    ///
    /// ```
    /// use cone_core::{KeyPoint, CameraModel};
    /// use cone_core::nalgebra::Point2;
    /// use cone_pinhole::CameraGeometry;
    /// let camera = CameraGeometry::new(1000.0, 800.0, 90.0);
    /// let bearing = camera.calibrate(KeyPoint(Point2::new(1000.0, 400.0)));
    /// // The right edge of a 90 degree camera is 45 degrees off axis.
    /// assert!((bearing.x - bearing.z).abs() < 1e-12);
    /// ```
    fn calibrate<P>(&self, point: P) -> UnitVector3<f64>
    where
        P: ImagePoint,
    {
        let centered = point.image_point() - self.principal_point();
        let focal = self.focal_length();
        UnitVector3::new_normalize(Vector3::new(centered.x / focal, centered.y / focal, 1.0))
    }

    /// Converts a bearing back into pixel coordinates.
    ///
    /// ```
    /// use cone_core::{KeyPoint, CameraModel};
    /// use cone_core::nalgebra::Point2;
    /// use cone_pinhole::CameraGeometry;
    /// let camera = CameraGeometry::default();
    /// let kp = KeyPoint(Point2::new(471.0, 322.0));
    /// let ukp = camera.uncalibrate(camera.calibrate(kp)).unwrap();
    /// assert!((kp.0 - ukp.0).norm() < 1e-6);
    /// ```
    fn uncalibrate(&self, bearing: UnitVector3<f64>) -> Option<KeyPoint> {
        if bearing.z < MIN_FORWARD {
            return None;
        }
        let focal = self.focal_length();
        let centered = bearing.xy() / bearing.z * focal;
        Some(KeyPoint(self.principal_point() + centered))
    }
}
