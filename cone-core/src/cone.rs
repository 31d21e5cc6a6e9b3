use nalgebra::Point3;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Wraps an angle in degrees into `[0, 360)`.
///
/// ```
/// use cone_core::normalize_degrees;
/// assert_eq!(normalize_degrees(-90.0), 270.0);
/// assert_eq!(normalize_degrees(720.0), 0.0);
/// ```
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // `rem_euclid` can round up to exactly 360.0 for tiny negative inputs.
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// An idealized linearly tapered cone standing on the XY plane with its axis on Z.
///
/// The radius shrinks linearly from `base_radius` at `z = 0` to `top_radius` at `z = height`.
/// A cylinder is the special case where both radii are equal.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ConeModel {
    base_radius: f64,
    top_radius: f64,
    height: f64,
}

impl ConeModel {
    /// Creates a cone model.
    ///
    /// Returns `None` if the height is not strictly positive or any dimension is negative or not finite.
    ///
    /// ```
    /// use cone_core::ConeModel;
    /// assert!(ConeModel::new(0.5, 0.05, 2.0).is_some());
    /// assert!(ConeModel::new(0.5, 0.05, 0.0).is_none());
    /// assert!(ConeModel::new(-0.5, 0.05, 2.0).is_none());
    /// ```
    pub fn new(base_radius: f64, top_radius: f64, height: f64) -> Option<Self> {
        let valid = height.is_finite()
            && height > 0.0
            && base_radius.is_finite()
            && base_radius >= 0.0
            && top_radius.is_finite()
            && top_radius >= 0.0;
        valid.then(|| Self {
            base_radius,
            top_radius,
            height,
        })
    }

    pub fn base_radius(&self) -> f64 {
        self.base_radius
    }

    pub fn top_radius(&self) -> f64 {
        self.top_radius
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    /// The rate at which the radius shrinks per unit of height.
    pub fn taper_rate(&self) -> f64 {
        (self.base_radius - self.top_radius) / self.height
    }

    /// The radius of the cone at the world height `z`.
    ///
    /// This is not clamped, so heights outside of the cone extrapolate the taper.
    ///
    /// ```
    /// use cone_core::ConeModel;
    /// let cone = ConeModel::new(0.5, 0.1, 2.0).unwrap();
    /// assert!((cone.radius_at(1.0) - 0.3).abs() < 1e-12);
    /// ```
    pub fn radius_at(&self, z: f64) -> f64 {
        let fraction = z / self.height;
        self.base_radius * (1.0 - fraction) + self.top_radius * fraction
    }

    /// The height `z` expressed as a fraction of the cone height, clamped to `[0, 1]`.
    pub fn normalized_height(&self, z: f64) -> f64 {
        (z / self.height).clamp(0.0, 1.0)
    }

    /// Converts a normalized height back into a world height.
    pub fn world_height(&self, normalized_height: f64) -> f64 {
        normalized_height * self.height
    }

    /// Finds the point on the cone surface at a normalized height and an angle in degrees.
    ///
    /// ```
    /// use cone_core::ConeModel;
    /// let cone = ConeModel::new(0.5, 0.05, 2.0).unwrap();
    /// let point = cone.cone_to_cartesian(0.0, 90.0);
    /// assert!(point.x.abs() < 1e-12);
    /// assert!((point.y - 0.5).abs() < 1e-12);
    /// assert_eq!(point.z, 0.0);
    /// ```
    pub fn cone_to_cartesian(&self, normalized_height: f64, angle_degrees: f64) -> Point3<f64> {
        let z = self.world_height(normalized_height.clamp(0.0, 1.0));
        ConePoint {
            normalized_height: normalized_height.clamp(0.0, 1.0),
            angle_degrees,
            radius: self.radius_at(z),
        }
        .to_cartesian(self)
    }

    /// Expresses a cartesian point in cone coordinates.
    ///
    /// The radius is the actual distance of the point from the axis, which is only equal to
    /// [`ConeModel::radius_at`] when the point lies on the surface.
    pub fn cartesian_to_cone(&self, point: Point3<f64>) -> ConePoint {
        ConePoint {
            normalized_height: self.normalized_height(point.z),
            angle_degrees: normalize_degrees(point.y.atan2(point.x).to_degrees()),
            radius: point.x.hypot(point.y),
        }
    }
}

/// A location in cone coordinates: normalized height along the axis, angle around the axis
/// in degrees and distance from the axis.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ConePoint {
    pub normalized_height: f64,
    pub angle_degrees: f64,
    pub radius: f64,
}

impl ConePoint {
    /// Converts back into world coordinates using the height of `cone`.
    pub fn to_cartesian(&self, cone: &ConeModel) -> Point3<f64> {
        let angle = self.angle_degrees.to_radians();
        Point3::new(
            self.radius * angle.cos(),
            self.radius * angle.sin(),
            cone.world_height(self.normalized_height),
        )
    }
}
