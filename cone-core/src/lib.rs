//! # Cone Core
//!
//! This library provides the shared abstractions and types used to reconstruct the 3d positions
//! of LEDs strung around a cone-shaped object (a tree, typically) from 2d observations made by a
//! handful of cameras. All the crates in this workspace depend on it. The crate is kept small:
//! it only contains value types, the cone surface model and the traits that connect camera
//! models to the rest of the pipeline.
//!
//! ## Coordinate frames
//!
//! The world frame has its origin at the center of the base of the cone with the positive Z axis
//! running up the cone axis. Heights along the axis are expressed either in world units (meters)
//! or as a normalized height in `[0, 1]` relative to the height of the cone. Angles around the
//! axis are in degrees in `[0, 360)`, measured counter-clockwise from the positive X axis.
//!
//! Camera space follows the usual computer vision convention: the positive X axis points right,
//! the positive Y axis points down and the positive Z axis points forwards out of the optical
//! center. Image points share the X and Y directions of camera space and are in pixels.
//!
//! ## Cameras facing the axis
//!
//! Camera poses are not general 6-DoF poses. Every camera is assumed to look horizontally at the
//! cone axis from its own height, which is how cameras are placed around the object during a
//! capture session. Only the optical center of each camera has to be measured.
//!
//! ```text
//!                  top
//!                  /\
//!                 /  \
//!                /    \          O  camera, looking at the axis
//!               / p    \       /
//!              /    \   \    /
//!             /       \  \ /
//!            /          \/ <- front intersection of the ray
//!           /            \
//!          /______________\
//!                base
//! ```
//!
//! A ray cast from a camera through a lit LED usually crosses the cone surface twice. The nearer
//! crossing is the front surface and the farther one is the back surface. Deciding between them
//! is one of the main jobs of the reconstruction.

mod camera;
mod cone;
mod observation;
mod pose;
mod position;
mod ray;

pub use camera::*;
pub use cone::*;
pub use nalgebra;
pub use observation::*;
pub use pose::*;
pub use position::*;
pub use ray::*;
