use approx::assert_relative_eq;
use cone_reconstruction::{
    CameraGeometry, CameraOcclusion, CameraPose, CameraRig, ConeModel, Observation, OcclusionMap,
    Surface, TriangulationEngine,
};

fn tree() -> ConeModel {
    ConeModel::new(0.5, 0.05, 2.0).unwrap()
}

/// Three cameras on a circle of 1.5m around the axis at mid height.
fn rig() -> CameraRig {
    CameraRig::new(
        CameraGeometry::default(),
        (0..3).map(|index| CameraPose::on_circle(index, 1.5, index as f64 * 120.0, 1.0)),
    )
}

fn centered(camera_index: usize, detection: f64, angular: f64) -> Observation {
    Observation {
        point_index: 0,
        camera_index,
        pixel_x: 640.0,
        pixel_y: 360.0,
        detection_confidence: detection,
        angular_confidence: angular,
    }
}

/// An occlusion map where point 0 has the given score in each camera.
fn occlusion(scores: &[f64]) -> OcclusionMap {
    scores
        .iter()
        .enumerate()
        .map(|(camera, &score)| CameraOcclusion::from_scores(camera, vec![score]))
        .collect()
}

#[test]
fn best_final_weight_selects_camera() {
    let observations = vec![
        centered(0, 1.0, 0.4),
        centered(1, 1.0, 0.9),
        centered(2, 1.0, 0.2),
    ];
    let occlusion = occlusion(&[0.8, 0.1, 0.5]);
    let triangulation =
        TriangulationEngine::new().triangulate_point(0, &observations, &rig(), &occlusion, &tree());

    let placement = triangulation.placement.unwrap();
    assert_eq!(placement.observation.observation.camera_index, 1);
    assert_relative_eq!(placement.candidate.confidence, 0.81, epsilon = 1e-12);
    assert_eq!(placement.candidate.observation_count, 3);
    assert_eq!(placement.surface, Surface::Front);
    assert_relative_eq!(placement.candidate.cone_point.angle_degrees, 120.0, epsilon = 1e-9);
    assert_relative_eq!(placement.candidate.cone_point.normalized_height, 0.5, epsilon = 1e-9);

    let weights: Vec<f64> = triangulation
        .contributors
        .iter()
        .map(|contributor| contributor.final_weight)
        .collect();
    assert!(weights.windows(2).all(|pair| pair[0] >= pair[1]));
}

#[test]
fn occluded_view_places_point_on_back_surface() {
    let observations = vec![centered(0, 0.9, 0.9)];
    let triangulation = TriangulationEngine::new().triangulate_point(
        0,
        &observations,
        &rig(),
        &occlusion(&[0.8]),
        &tree(),
    );
    let candidate = triangulation.candidate().unwrap();
    assert_eq!(candidate.surface, Surface::Back);
    assert_relative_eq!(candidate.cone_point.angle_degrees, 180.0, epsilon = 1e-9);
    assert_relative_eq!(candidate.position.x, -0.275, epsilon = 1e-9);
    assert_relative_eq!(candidate.confidence, 0.81 * 0.2, epsilon = 1e-12);
}

#[test]
fn surface_threshold_is_configurable() {
    let observations = vec![centered(0, 0.9, 0.9)];
    let triangulation = TriangulationEngine::new()
        .surface_threshold(0.9)
        .triangulate_point(0, &observations, &rig(), &occlusion(&[0.8]), &tree());
    assert_eq!(triangulation.candidate().unwrap().surface, Surface::Front);
}

#[test]
fn low_confidence_and_uncalibrated_observations_are_excluded() {
    let observations = vec![centered(0, 0.4, 1.0), centered(7, 1.0, 1.0)];
    let triangulation = TriangulationEngine::new().triangulate_point(
        0,
        &observations,
        &rig(),
        &OcclusionMap::new(),
        &tree(),
    );
    assert!(triangulation.contributors.is_empty());
    assert!(!triangulation.is_placed());
}

#[test]
fn next_best_observation_recovers_from_a_miss() {
    // The left image border of camera 0 looks past the tree.
    let miss = Observation {
        pixel_x: 0.0,
        ..centered(0, 1.0, 1.0)
    };
    let observations = vec![miss, centered(1, 0.8, 0.8)];
    let occlusion = OcclusionMap::new();

    let strict =
        TriangulationEngine::new().triangulate_point(0, &observations, &rig(), &occlusion, &tree());
    assert!(!strict.is_placed());
    assert_eq!(strict.contributors.len(), 2);

    let lenient = TriangulationEngine::new()
        .try_next_best_observation(true)
        .triangulate_point(0, &observations, &rig(), &occlusion, &tree());
    let placement = lenient.placement.unwrap();
    assert_eq!(placement.observation.observation.camera_index, 1);
    assert_relative_eq!(placement.candidate.confidence, 0.64, epsilon = 1e-12);
}

#[test]
fn triangulate_covers_every_point() {
    let observations = vec![
        Observation {
            point_index: 2,
            ..centered(0, 1.0, 1.0)
        },
        Observation {
            point_index: 9,
            ..centered(1, 1.0, 1.0)
        },
    ];
    let triangulations = TriangulationEngine::new().triangulate(
        &observations,
        &rig(),
        &OcclusionMap::new(),
        &tree(),
        4,
    );
    assert_eq!(triangulations.len(), 4);
    let placed: Vec<usize> = triangulations
        .iter()
        .filter(|triangulation| triangulation.is_placed())
        .map(|triangulation| triangulation.point_index)
        .collect();
    assert_eq!(placed, vec![2]);
}
