use crate::{ConeModel, ConePoint};
use nalgebra::Point3;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// One of the two places a camera ray can cross the cone surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde-serialize", serde(rename_all = "snake_case"))]
pub enum Surface {
    /// The crossing nearer to the camera.
    Front,
    /// The crossing farther from the camera, on the far side of the cone.
    Back,
}

/// A hypothesis for where one LED sits, assuming it lies on a particular surface.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct PositionCandidate {
    pub point_index: usize,
    pub surface: Surface,
    pub cone_point: ConePoint,
    pub position: Point3<f64>,
    pub confidence: f64,
    pub observation_count: usize,
}

/// The reconstructed location of one LED.
///
/// The field names used for serialization match the position records consumed by the
/// visualization tooling (`index`, `height`, `angle`, ...).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct FinalPosition {
    #[cfg_attr(feature = "serde-serialize", serde(rename = "index"))]
    pub point_index: usize,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[cfg_attr(feature = "serde-serialize", serde(rename = "height"))]
    pub normalized_height: f64,
    #[cfg_attr(feature = "serde-serialize", serde(rename = "angle"))]
    pub angle_degrees: f64,
    pub radius: f64,
    pub confidence: f64,
    pub observation_count: usize,
    /// Set when the position was interpolated or extrapolated rather than observed.
    pub predicted: bool,
}

impl FinalPosition {
    /// A position placed from camera observations.
    pub fn observed(
        point_index: usize,
        position: Point3<f64>,
        cone: &ConeModel,
        confidence: f64,
        observation_count: usize,
    ) -> Self {
        Self::from_parts(
            point_index,
            position,
            cone,
            confidence,
            observation_count,
            false,
        )
    }

    /// A position filled in from neighboring positions.
    pub fn predicted(
        point_index: usize,
        position: Point3<f64>,
        cone: &ConeModel,
        confidence: f64,
    ) -> Self {
        Self::from_parts(point_index, position, cone, confidence, 0, true)
    }

    fn from_parts(
        point_index: usize,
        position: Point3<f64>,
        cone: &ConeModel,
        confidence: f64,
        observation_count: usize,
        predicted: bool,
    ) -> Self {
        let ConePoint {
            normalized_height,
            angle_degrees,
            radius,
        } = cone.cartesian_to_cone(position);
        Self {
            point_index,
            x: position.x,
            y: position.y,
            z: position.z,
            normalized_height,
            angle_degrees,
            radius,
            confidence,
            observation_count,
            predicted,
        }
    }

    pub fn position(&self) -> Point3<f64> {
        Point3::new(self.x, self.y, self.z)
    }

    pub fn cone_point(&self) -> ConePoint {
        ConePoint {
            normalized_height: self.normalized_height,
            angle_degrees: self.angle_degrees,
            radius: self.radius,
        }
    }
}
