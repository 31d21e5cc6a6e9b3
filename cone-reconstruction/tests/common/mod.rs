#![allow(dead_code)]

use cone_core::nalgebra::Point3;
use cone_core::{CameraModel, CameraPose, ConeModel, Observation};
use cone_geom::intersect_ray_cone_dual;
use cone_reconstruction::{CameraGeometry, ReconstructionInput};

pub const OBJECT_HEIGHT: f64 = 2.0;

pub fn tree() -> ConeModel {
    ConeModel::new(0.5, 0.05, OBJECT_HEIGHT).unwrap()
}

/// Four cameras around the tree, facing it from all sides.
pub fn ring_of_cameras() -> Vec<CameraPose> {
    (0..4)
        .map(|index| CameraPose::on_circle(index, 3.0, index as f64 * 90.0, 1.0))
        .collect()
}

/// A single turn of string wound from 10% to 90% of the height.
pub fn helix(points: usize) -> Vec<Point3<f64>> {
    let cone = tree();
    (0..points)
        .map(|index| {
            let fraction = index as f64 / points as f64;
            cone.cone_to_cartesian(0.1 + 0.8 * fraction, 360.0 * fraction)
        })
        .collect()
}

/// Projects `point` into the camera if the camera sees it on the near side of the cone.
pub fn observe(
    geometry: &CameraGeometry,
    pose: &CameraPose,
    point_index: usize,
    point: Point3<f64>,
) -> Option<Observation> {
    let keypoint = geometry.project(pose, point)?;
    let ray = geometry.cast_ray(pose, keypoint);
    let front = intersect_ray_cone_dual(&ray, &tree())?.front;
    if (front.position - point).norm() > 1e-6 {
        return None;
    }
    Some(Observation {
        point_index,
        camera_index: pose.index,
        pixel_x: keypoint.0.x,
        pixel_y: keypoint.0.y,
        detection_confidence: 0.9,
        angular_confidence: 0.9,
    })
}

/// Observes every point of a helix from every camera that sees it.
pub fn scene(points: usize) -> (ReconstructionInput, Vec<Point3<f64>>) {
    let geometry = CameraGeometry::default();
    let cameras = ring_of_cameras();
    let truth = helix(points);
    let observations = truth
        .iter()
        .enumerate()
        .flat_map(|(index, &point)| {
            let geometry = &geometry;
            cameras
                .iter()
                .filter_map(move |pose| observe(geometry, pose, index, point))
        })
        .collect();
    let input = ReconstructionInput {
        observations,
        camera_poses: cameras,
        object_height: OBJECT_HEIGHT,
        total_points: points,
    };
    (input, truth)
}
