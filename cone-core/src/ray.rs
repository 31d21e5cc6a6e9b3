use nalgebra::{Point3, UnitVector3};

/// A half-line in world space starting at `origin` and extending along `direction`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3<f64>,
    pub direction: UnitVector3<f64>,
}

impl Ray {
    pub fn new(origin: Point3<f64>, direction: UnitVector3<f64>) -> Self {
        Self { origin, direction }
    }

    /// The point at distance `t` along the ray.
    pub fn at(&self, t: f64) -> Point3<f64> {
        self.origin + self.direction.into_inner() * t
    }
}
