use crate::{ReconstructionError, ReconstructionSettings};
use cone_core::{CameraPose, ConeModel, Observation};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Everything a capture session hands to the reconstruction.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ReconstructionInput {
    pub observations: Vec<Observation>,
    pub camera_poses: Vec<CameraPose>,
    /// The height of the object in meters.
    #[cfg_attr(feature = "serde-serialize", serde(alias = "tree_height"))]
    pub object_height: f64,
    /// The number of LEDs on the string.
    #[cfg_attr(feature = "serde-serialize", serde(alias = "total_leds"))]
    pub total_points: usize,
}

impl ReconstructionInput {
    /// Rejects inputs from which no meaningful reconstruction can be made.
    pub fn validate(&self) -> Result<(), ReconstructionError> {
        if !(self.object_height.is_finite() && self.object_height > 0.0) {
            return Err(ReconstructionError::InvalidObjectHeight(self.object_height));
        }
        if self.total_points == 0 {
            return Err(ReconstructionError::NoPoints);
        }
        if self.observations.is_empty() {
            return Err(ReconstructionError::NoObservations);
        }
        Ok(())
    }

    /// Builds the cone model from the object height and the radii in the settings.
    pub fn cone(&self, settings: &ReconstructionSettings) -> Result<ConeModel, ReconstructionError> {
        if !(self.object_height.is_finite() && self.object_height > 0.0) {
            return Err(ReconstructionError::InvalidObjectHeight(self.object_height));
        }
        ConeModel::new(settings.base_radius, settings.top_radius, self.object_height).ok_or(
            ReconstructionError::InvalidCone {
                base_radius: settings.base_radius,
                top_radius: settings.top_radius,
            },
        )
    }
}
