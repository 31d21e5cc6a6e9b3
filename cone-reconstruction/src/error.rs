use crate::Stage;
use thiserror::Error;

/// Reasons a reconstruction can not produce a result.
///
/// Failing to place an individual LED is not an error. Such LEDs are filled in by the gap
/// filler and marked as predicted.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ReconstructionError {
    #[error("no observations were supplied")]
    NoObservations,
    #[error("the object height must be positive and finite, got {0}")]
    InvalidObjectHeight(f64),
    #[error("the total number of points must be positive")]
    NoPoints,
    #[error("invalid cone dimensions: base radius {base_radius}, top radius {top_radius}")]
    InvalidCone { base_radius: f64, top_radius: f64 },
    #[error("none of the {0} points could be placed from the observations")]
    NothingPlaced(usize),
    #[error("reconstruction cancelled before the {0} stage")]
    Cancelled(Stage),
    #[error("the reconstruction worker thread panicked")]
    WorkerPanicked,
}
