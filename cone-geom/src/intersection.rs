use arrayvec::ArrayVec;
use cone_core::nalgebra::Point3;
use cone_core::{normalize_degrees, ConeModel, ConePoint, Ray, Surface};

/// Where a ray crosses the cone surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayConeIntersection {
    /// Height of the crossing as a fraction of the cone height, in `[0, 1]`.
    pub normalized_height: f64,
    /// Angle of the crossing around the axis in degrees, in `[0, 360)`.
    pub angle_degrees: f64,
    pub position: Point3<f64>,
    /// Distance from the ray origin to the crossing.
    pub ray_distance: f64,
}

impl RayConeIntersection {
    /// The crossing in cone coordinates.
    pub fn cone_point(&self) -> ConePoint {
        ConePoint {
            normalized_height: self.normalized_height,
            angle_degrees: self.angle_degrees,
            radius: self.position.x.hypot(self.position.y),
        }
    }
}

/// Both crossings of a ray with the cone.
///
/// If the ray only has one valid crossing (it starts inside the cone or leaves through the
/// base or the top), that crossing is reported as `front`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DualRayConeIntersection {
    pub front: RayConeIntersection,
    pub back: Option<RayConeIntersection>,
}

impl DualRayConeIntersection {
    /// Retrieves the crossing on the requested surface if it exists.
    pub fn surface(&self, surface: Surface) -> Option<RayConeIntersection> {
        match surface {
            Surface::Front => Some(self.front),
            Surface::Back => self.back,
        }
    }
}

/// Solves for the crossings of rays with a finite cone in closed form.
///
/// The ray `o + t·d` is substituted into the implicit cone equation `x² + y² = r(z)²` where
/// `r(z) = b - a·z`, `b` is the base radius and `a` is the taper rate. This gives a quadratic in
/// `t`. Roots behind the ray origin or outside of `[0, height]` are discarded, since the cone is
/// finite and not an infinite double cone.
///
/// ```
/// use cone_core::{ConeModel, Ray};
/// use cone_core::nalgebra::{Point3, UnitVector3, Vector3};
/// use cone_geom::intersection::RayConeIntersector;
///
/// let cone = ConeModel::new(0.5, 0.05, 2.0).unwrap();
/// let ray = Ray::new(
///     Point3::new(1.5, 0.0, 1.0),
///     UnitVector3::new_normalize(Vector3::new(-1.0, 0.0, 0.0)),
/// );
/// let dual = RayConeIntersector::new().intersect_dual(&ray, &cone).unwrap();
/// assert!((dual.front.position.x - 0.275).abs() < 1e-9);
/// assert!((dual.back.unwrap().position.x + 0.275).abs() < 1e-9);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct RayConeIntersector {
    epsilon: f64,
}

impl RayConeIntersector {
    /// Creates a `RayConeIntersector` with default values.
    ///
    /// Same as calling [`Default::default`].
    pub fn new() -> Self {
        Default::default()
    }

    /// Set the epsilon used to guard near-zero denominators and the bounds of the cone.
    ///
    /// Default is `1e-9`.
    #[must_use]
    pub fn epsilon(self, epsilon: f64) -> Self {
        Self { epsilon }
    }

    /// Finds the nearest valid crossing of the ray with the cone.
    pub fn intersect(&self, ray: &Ray, cone: &ConeModel) -> Option<RayConeIntersection> {
        self.intersect_dual(ray, cone).map(|dual| dual.front)
    }

    /// Finds both valid crossings of the ray with the cone.
    ///
    /// Returns `None` when the ray misses the cone entirely, which is not an error.
    pub fn intersect_dual(&self, ray: &Ray, cone: &ConeModel) -> Option<DualRayConeIntersection> {
        let mut crossings = self
            .roots(ray, cone)
            .into_iter()
            .filter(|&t| t > self.epsilon)
            .map(|t| (t, ray.at(t)))
            .filter(|(_, point)| point.z >= -self.epsilon && point.z <= cone.height() + self.epsilon)
            .map(|(t, position)| RayConeIntersection {
                normalized_height: cone.normalized_height(position.z),
                angle_degrees: normalize_degrees(position.y.atan2(position.x).to_degrees()),
                position,
                ray_distance: t,
            });
        let front = crossings.next()?;
        Some(DualRayConeIntersection {
            front,
            back: crossings.next(),
        })
    }

    /// The real roots of the ray–cone quadratic in ascending order.
    fn roots(&self, ray: &Ray, cone: &ConeModel) -> ArrayVec<f64, 2> {
        let origin = ray.origin;
        let direction = ray.direction;
        let taper = cone.taper_rate();
        // The radius along the ray is `k - m·t`.
        let k = cone.base_radius() - taper * origin.z;
        let m = taper * direction.z;

        let a = direction.x * direction.x + direction.y * direction.y - m * m;
        let b = 2.0 * (origin.x * direction.x + origin.y * direction.y + k * m);
        let c = origin.x * origin.x + origin.y * origin.y - k * k;

        let mut roots = ArrayVec::new();
        if a.abs() < self.epsilon {
            // The ray runs parallel to a generating line of the cone.
            if b.abs() >= self.epsilon {
                roots.push(-c / b);
            }
            return roots;
        }

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return roots;
        }
        let root = discriminant.sqrt();
        if root < self.epsilon {
            // A tangent ray touches the surface once.
            roots.push(-b / (2.0 * a));
            return roots;
        }
        let t0 = (-b - root) / (2.0 * a);
        let t1 = (-b + root) / (2.0 * a);
        roots.push(t0.min(t1));
        roots.push(t0.max(t1));
        roots
    }
}

impl Default for RayConeIntersector {
    fn default() -> Self {
        Self { epsilon: 1e-9 }
    }
}

/// Finds the nearest valid crossing of the ray with the cone using default settings.
pub fn intersect_ray_cone(ray: &Ray, cone: &ConeModel) -> Option<RayConeIntersection> {
    RayConeIntersector::new().intersect(ray, cone)
}

/// Finds both valid crossings of the ray with the cone using default settings.
pub fn intersect_ray_cone_dual(ray: &Ray, cone: &ConeModel) -> Option<DualRayConeIntersection> {
    RayConeIntersector::new().intersect_dual(ray, cone)
}
