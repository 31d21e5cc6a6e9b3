use crate::angle::angular_difference_degrees;
use cone_core::ConePoint;

/// The distance between two points measured on the unrolled surface of the cone.
///
/// The vertical component is the difference in height and the horizontal component is the arc
/// length around the axis at the average radius of both points, taking the shorter way around.
/// This matches the physical spacing of a string wound around the cone much better than the
/// straight-line distance through the interior.
///
/// ```
/// use cone_core::ConePoint;
/// use cone_geom::distance::cone_space_distance;
/// let a = ConePoint { normalized_height: 0.5, angle_degrees: 0.0, radius: 0.3 };
/// let b = ConePoint { normalized_height: 0.5, angle_degrees: 180.0, radius: 0.3 };
/// // Half way around rather than straight across.
/// assert!((cone_space_distance(&a, &b, 2.0) - 0.3 * std::f64::consts::PI).abs() < 1e-9);
/// ```
pub fn cone_space_distance(a: &ConePoint, b: &ConePoint, object_height: f64) -> f64 {
    let vertical = (a.normalized_height - b.normalized_height) * object_height;
    let average_radius = (a.radius + b.radius) / 2.0;
    let arc = average_radius * angular_difference_degrees(a.angle_degrees, b.angle_degrees).to_radians();
    vertical.hypot(arc)
}
