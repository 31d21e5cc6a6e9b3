//! This crate contains the computational geometry used to place LEDs on the cone surface.
//!
//! ## Ray–cone intersection
//!
//! Every observation of an LED defines a ray leaving the optical center of a camera. The LED
//! sits somewhere on that ray, and since it is strung on the surface of the cone, it sits where
//! the ray crosses the surface. A convex cone is crossed at most twice by a ray: once entering
//! (the front surface) and once leaving (the back surface).
//!
//! - `O` the optical center of the camera
//! - `f` the front intersection
//! - `b` the back intersection
//!
//! ```text
//!                 /\
//!                /  \
//!               /    \
//!   O----------f------b-------->
//!             /        \
//!            /__________\
//! ```
//!
//! ## Cone space
//!
//! LEDs are wound around the cone, so neighbors along the string are neighbors on the unrolled
//! surface of the cone. Angles around the axis wrap at 360 degrees, which is why averaging and
//! distances are computed with the helpers in [`angle`] and [`distance`].

pub mod angle;
pub mod distance;
pub mod intersection;

pub use angle::*;
pub use distance::*;
pub use intersection::*;
