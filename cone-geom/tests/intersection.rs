use approx::assert_relative_eq;
use cone_core::nalgebra::{Point3, UnitVector3, Vector3};
use cone_core::{ConeModel, Ray, Surface};
use cone_geom::{intersect_ray_cone, intersect_ray_cone_dual, RayConeIntersector};
use quickcheck_macros::quickcheck;

fn tree() -> ConeModel {
    ConeModel::new(0.5, 0.05, 2.0).unwrap()
}

/// Maps an arbitrary float into `[0, 1)`.
fn fraction(x: f64) -> f64 {
    if x.is_finite() {
        x.abs().fract()
    } else {
        0.5
    }
}

#[test]
fn horizontal_ray_through_axis_crosses_twice() {
    let cone = tree();
    let ray = Ray::new(
        Point3::new(1.5, 0.0, 1.0),
        UnitVector3::new_normalize(Vector3::new(-1.0, 0.0, 0.0)),
    );
    let dual = intersect_ray_cone_dual(&ray, &cone).unwrap();
    assert_relative_eq!(dual.front.ray_distance, 1.225, epsilon = 1e-9);
    assert_relative_eq!(dual.front.angle_degrees, 0.0, epsilon = 1e-9);
    let back = dual.surface(Surface::Back).unwrap();
    assert_relative_eq!(back.ray_distance, 1.775, epsilon = 1e-9);
    assert_relative_eq!(back.angle_degrees, 180.0, epsilon = 1e-9);
    assert_relative_eq!(back.normalized_height, 0.5, epsilon = 1e-9);
}

#[test]
fn tangent_ray_touches_once() {
    let cylinder = ConeModel::new(0.5, 0.5, 2.0).unwrap();
    let ray = Ray::new(
        Point3::new(1.0, 0.5, 1.0),
        UnitVector3::new_normalize(Vector3::new(-1.0, 0.0, 0.0)),
    );
    let dual = intersect_ray_cone_dual(&ray, &cylinder).unwrap();
    assert_relative_eq!(dual.front.position, Point3::new(0.0, 0.5, 1.0), epsilon = 1e-12);
    assert_relative_eq!(dual.front.ray_distance, 1.0, epsilon = 1e-12);
    assert!(dual.back.is_none());
}

#[test]
fn ray_pointing_away_misses() {
    let cone = tree();
    let ray = Ray::new(
        Point3::new(1.5, 0.0, 1.0),
        UnitVector3::new_normalize(Vector3::new(1.0, 0.0, 0.0)),
    );
    assert!(intersect_ray_cone(&ray, &cone).is_none());
}

#[test]
fn ray_above_cone_misses() {
    let cone = tree();
    let ray = Ray::new(
        Point3::new(1.5, 0.0, 2.5),
        UnitVector3::new_normalize(Vector3::new(-1.0, 0.0, 0.0)),
    );
    assert!(intersect_ray_cone_dual(&ray, &cone).is_none());
}

#[test]
fn ray_leaving_through_base_has_single_crossing() {
    let cone = tree();
    // Enters the side near the bottom and exits through the base disc.
    let ray = Ray::new(
        Point3::new(1.5, 0.0, 0.3),
        UnitVector3::new_normalize(Vector3::new(-1.0, 0.0, -0.2)),
    );
    let dual = intersect_ray_cone_dual(&ray, &cone).unwrap();
    assert!(dual.back.is_none());
    assert!(dual.front.position.z >= 0.0);
}

#[test]
fn ray_from_inside_reports_exit_as_front() {
    let cone = tree();
    let ray = Ray::new(
        Point3::new(0.0, 0.0, 1.0),
        UnitVector3::new_normalize(Vector3::new(0.0, 1.0, 0.0)),
    );
    let dual = intersect_ray_cone_dual(&ray, &cone).unwrap();
    assert!(dual.back.is_none());
    assert_relative_eq!(dual.front.angle_degrees, 90.0, epsilon = 1e-9);
    assert_relative_eq!(dual.front.ray_distance, 0.275, epsilon = 1e-9);
}

#[test]
fn cylinder_is_supported() {
    let cylinder = ConeModel::new(0.3, 0.3, 1.0).unwrap();
    let ray = Ray::new(
        Point3::new(0.0, -2.0, 0.5),
        UnitVector3::new_normalize(Vector3::new(0.0, 1.0, 0.0)),
    );
    let dual = RayConeIntersector::new()
        .epsilon(1e-12)
        .intersect_dual(&ray, &cylinder)
        .unwrap();
    assert_relative_eq!(dual.front.ray_distance, 1.7, epsilon = 1e-9);
    assert_relative_eq!(dual.back.unwrap().ray_distance, 2.3, epsilon = 1e-9);
}

/// A horizontal ray passing the axis at a lateral offset larger than the cone radius at that
/// height has a negative discriminant.
#[quickcheck]
fn lateral_miss_has_no_intersection(height: f64, offset: f64) -> bool {
    let cone = tree();
    let z = fraction(height) * cone.height();
    let lateral = cone.radius_at(z) + 0.01 + fraction(offset);
    let ray = Ray::new(
        Point3::new(3.0, lateral, z),
        UnitVector3::new_normalize(Vector3::new(-1.0, 0.0, 0.0)),
    );
    intersect_ray_cone_dual(&ray, &cone).is_none()
}

#[quickcheck]
fn intersections_lie_on_the_surface(angle: f64, height: f64, aim_height: f64, aim_angle: f64) -> bool {
    let cone = tree();
    let angle = fraction(angle) * 360.0;
    let origin = Point3::new(
        2.0 * angle.to_radians().cos(),
        2.0 * angle.to_radians().sin(),
        fraction(height) * 3.0,
    );
    let target = cone.cone_to_cartesian(fraction(aim_height), fraction(aim_angle) * 360.0);
    let ray = Ray::new(origin, UnitVector3::new_normalize(target - origin));

    match intersect_ray_cone_dual(&ray, &cone) {
        None => true,
        Some(dual) => [Some(dual.front), dual.back].into_iter().flatten().all(|hit| {
            let on_surface = (hit.position.x.hypot(hit.position.y)
                - cone.radius_at(hit.position.z))
            .abs()
                < 1e-6;
            on_surface
                && (0.0..=1.0).contains(&hit.normalized_height)
                && (0.0..360.0).contains(&hit.angle_degrees)
                && hit.ray_distance >= 0.0
        }),
    }
}
