use crate::{normalize_degrees, Ray};
use nalgebra::{Matrix3, Point3, Rotation3, UnitVector3, Vector3};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Below this horizontal distance from the axis a camera is considered to sit on the axis.
const ON_AXIS_EPSILON: f64 = 1e-9;

/// The placement of a camera around the cone.
///
/// Only the optical center is stored. The orientation is implied: the camera looks horizontally
/// at the cone axis from its own height, with its image Y axis pointing down towards the ground.
/// `facing_angle_degrees` records the horizontal direction the camera faces. It is used as the
/// forward direction only when the camera sits on the axis, where "towards the axis" is undefined.
///
/// Poses deserialize either from their serialized form, with `position` as an `[x, y, z]` array,
/// or from flat `x`, `y` and `z` fields as exported by capture apps, where the index may also be
/// named `camera_index` and the facing angle `facingAngleDegrees`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde-serialize", serde(from = "CameraPoseRecord"))]
pub struct CameraPose {
    /// The camera index referenced by observations.
    pub index: usize,
    /// The optical center in world coordinates.
    pub position: Point3<f64>,
    pub facing_angle_degrees: f64,
}

#[cfg(feature = "serde-serialize")]
#[derive(Deserialize)]
#[serde(untagged)]
enum CameraPoseRecord {
    Nested {
        #[serde(alias = "camera_index", alias = "cameraIndex")]
        index: usize,
        position: Point3<f64>,
        #[serde(alias = "facingAngleDegrees", default)]
        facing_angle_degrees: f64,
    },
    Flat {
        #[serde(alias = "camera_index", alias = "cameraIndex")]
        index: usize,
        x: f64,
        y: f64,
        z: f64,
        #[serde(alias = "facingAngleDegrees", default)]
        facing_angle_degrees: f64,
    },
}

#[cfg(feature = "serde-serialize")]
impl From<CameraPoseRecord> for CameraPose {
    fn from(record: CameraPoseRecord) -> Self {
        match record {
            CameraPoseRecord::Nested {
                index,
                position,
                facing_angle_degrees,
            } => Self::new(index, position, facing_angle_degrees),
            CameraPoseRecord::Flat {
                index,
                x,
                y,
                z,
                facing_angle_degrees,
            } => Self::new(index, Point3::new(x, y, z), facing_angle_degrees),
        }
    }
}

impl CameraPose {
    pub fn new(index: usize, position: Point3<f64>, facing_angle_degrees: f64) -> Self {
        Self {
            index,
            position,
            facing_angle_degrees,
        }
    }

    /// Places a camera on a circle around the axis at `distance` from it, at `angle_degrees`
    /// around the axis and at world height `height`, facing the axis.
    ///
    /// ```
    /// use cone_core::CameraPose;
    /// let pose = CameraPose::on_circle(0, 1.5, 90.0, 1.0);
    /// assert!(pose.position.x.abs() < 1e-12);
    /// assert!((pose.position.y - 1.5).abs() < 1e-12);
    /// assert_eq!(pose.facing_angle_degrees, 270.0);
    /// ```
    pub fn on_circle(index: usize, distance: f64, angle_degrees: f64, height: f64) -> Self {
        let angle = angle_degrees.to_radians();
        Self {
            index,
            position: Point3::new(distance * angle.cos(), distance * angle.sin(), height),
            facing_angle_degrees: normalize_degrees(angle_degrees + 180.0),
        }
    }

    /// The horizontal direction from the optical center towards the cone axis.
    pub fn forward(&self) -> UnitVector3<f64> {
        let towards_axis = Vector3::new(-self.position.x, -self.position.y, 0.0);
        UnitVector3::try_new(towards_axis, ON_AXIS_EPSILON).unwrap_or_else(|| {
            let facing = self.facing_angle_degrees.to_radians();
            UnitVector3::new_normalize(Vector3::new(facing.cos(), facing.sin(), 0.0))
        })
    }

    /// The rotation that takes camera-space directions into world space.
    ///
    /// Its columns are the world directions of the camera X (right), Y (down) and Z (forward) axes.
    pub fn orientation(&self) -> Rotation3<f64> {
        let forward = self.forward().into_inner();
        let right = forward.cross(&Vector3::z()).normalize();
        let up = right.cross(&forward);
        Rotation3::from_matrix_unchecked(Matrix3::from_columns(&[right, -up, forward]))
    }

    /// Moves a camera-space bearing into world space.
    pub fn bearing_to_world(&self, bearing: UnitVector3<f64>) -> UnitVector3<f64> {
        self.orientation() * bearing
    }

    /// Casts the world-space ray leaving the optical center along a camera-space bearing.
    pub fn ray(&self, bearing: UnitVector3<f64>) -> Ray {
        Ray::new(self.position, self.bearing_to_world(bearing))
    }

    /// Expresses a world point in camera space.
    pub fn world_to_camera(&self, point: Point3<f64>) -> Vector3<f64> {
        self.orientation().inverse() * (point - self.position)
    }
}
