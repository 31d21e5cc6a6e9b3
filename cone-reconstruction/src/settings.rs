#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// The settings for the reconstruction process.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ReconstructionSettings {
    /// The minimum detection confidence for an observation to take part in triangulation
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_min_confidence"))]
    pub min_confidence: f64,
    /// The size in pixels of the grid cells used to find reflection clusters
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_spatial_threshold")
    )]
    pub spatial_threshold: f64,
    /// The detection confidence below which a reflection-attenuated observation is dropped
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_reflection_min_confidence")
    )]
    pub reflection_min_confidence: f64,
    /// The smoothed confidence at or above which a run of LEDs is considered visible to a camera
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_visibility_threshold")
    )]
    pub visibility_threshold: f64,
    /// The width of the centered moving average applied to each camera's confidence sequence
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_smoothing_window")
    )]
    pub smoothing_window: usize,
    /// The occlusion score at or above which the back surface is preferred
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_surface_threshold")
    )]
    pub surface_threshold: f64,
    /// Fall through to the next best observation when the best one misses the cone
    #[cfg_attr(feature = "serde-serialize", serde(default))]
    pub try_next_best_observation: bool,
    /// Run the surface continuity refinement after triangulation
    #[cfg_attr(feature = "serde-serialize", serde(default))]
    pub enable_surface_refinement: bool,
    /// The number of neighbors on each side used to score surface continuity
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_continuity_window_size")
    )]
    pub continuity_window_size: usize,
    /// The cone-space distance in meters under which a neighbor counts as continuous
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_max_neighbor_distance")
    )]
    pub max_neighbor_distance: f64,
    /// The radius of the cone at its base in meters
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_base_radius"))]
    pub base_radius: f64,
    /// The radius of the cone at its top in meters
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_top_radius"))]
    pub top_radius: f64,
    /// The horizontal field of view of the cameras in degrees
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_camera_fov_degrees")
    )]
    pub camera_fov_degrees: f64,
    /// The width of the camera images in pixels
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_image_width"))]
    pub image_width: f64,
    /// The height of the camera images in pixels
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_image_height"))]
    pub image_height: f64,
    /// The confidence lost per index when extrapolating past the last known LED
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_extrapolation_confidence_decay")
    )]
    pub extrapolation_confidence_decay: f64,
    /// The floor of the confidence of extrapolated LEDs
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_min_extrapolated_confidence")
    )]
    pub min_extrapolated_confidence: f64,
    /// The vertical step in meters per index used when only a single LED is known on a side
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_extrapolation_step")
    )]
    pub default_extrapolation_step: f64,
}

impl Default for ReconstructionSettings {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
            spatial_threshold: default_spatial_threshold(),
            reflection_min_confidence: default_reflection_min_confidence(),
            visibility_threshold: default_visibility_threshold(),
            smoothing_window: default_smoothing_window(),
            surface_threshold: default_surface_threshold(),
            try_next_best_observation: false,
            enable_surface_refinement: false,
            continuity_window_size: default_continuity_window_size(),
            max_neighbor_distance: default_max_neighbor_distance(),
            base_radius: default_base_radius(),
            top_radius: default_top_radius(),
            camera_fov_degrees: default_camera_fov_degrees(),
            image_width: default_image_width(),
            image_height: default_image_height(),
            extrapolation_confidence_decay: default_extrapolation_confidence_decay(),
            min_extrapolated_confidence: default_min_extrapolated_confidence(),
            default_extrapolation_step: default_extrapolation_step(),
        }
    }
}

fn default_min_confidence() -> f64 {
    0.5
}

fn default_spatial_threshold() -> f64 {
    20.0
}

fn default_reflection_min_confidence() -> f64 {
    0.3
}

fn default_visibility_threshold() -> f64 {
    0.5
}

fn default_smoothing_window() -> usize {
    5
}

fn default_surface_threshold() -> f64 {
    0.5
}

fn default_continuity_window_size() -> usize {
    5
}

fn default_max_neighbor_distance() -> f64 {
    0.15
}

fn default_base_radius() -> f64 {
    0.5
}

fn default_top_radius() -> f64 {
    0.05
}

fn default_camera_fov_degrees() -> f64 {
    60.0
}

fn default_image_width() -> f64 {
    1280.0
}

fn default_image_height() -> f64 {
    720.0
}

fn default_extrapolation_confidence_decay() -> f64 {
    0.05
}

fn default_min_extrapolated_confidence() -> f64 {
    0.2
}

fn default_extrapolation_step() -> f64 {
    0.01
}
