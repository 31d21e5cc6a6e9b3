mod common;

use approx::assert_relative_eq;
use common::{scene, tree, OBJECT_HEIGHT};
use cone_reconstruction::{
    ReconstructionError, ReconstructionInput, ReconstructionSettings, Reconstructor, Stage,
    StageObserver,
};
use std::ops::ControlFlow;

const POINTS: usize = 40;

fn without_reflection_filter() -> ReconstructionSettings {
    ReconstructionSettings {
        spatial_threshold: 0.0,
        ..Default::default()
    }
}

#[test]
fn recovers_helix_seen_from_four_sides() {
    let _ = pretty_env_logger::try_init();
    let (input, truth) = scene(POINTS);
    let output = Reconstructor::new(without_reflection_filter())
        .reconstruct(&input)
        .unwrap();

    assert_eq!(output.positions.len(), POINTS);
    assert_eq!(output.metadata.num_observed, POINTS);
    assert_eq!(output.metadata.num_predicted, 0);
    assert_eq!(output.metadata.num_cameras, 4);
    for (position, expected) in output.positions.iter().zip(&truth) {
        assert!(!position.predicted);
        assert!(
            (position.position() - expected).norm() < 1e-6,
            "point {} at {:?}, expected {:?}",
            position.point_index,
            position.position(),
            expected
        );
        assert!(position.observation_count >= 1);
    }
}

#[test]
fn positions_are_dense_and_ordered() {
    let (mut input, _) = scene(POINTS);
    // Nobody saw points 10 through 14.
    input
        .observations
        .retain(|observation| !(10..15).contains(&observation.point_index));
    let output = Reconstructor::default().reconstruct(&input).unwrap();

    assert_eq!(output.positions.len(), POINTS);
    for (index, position) in output.positions.iter().enumerate() {
        assert_eq!(position.point_index, index);
    }
    for position in &output.positions[10..15] {
        assert!(position.predicted);
        assert_eq!(position.observation_count, 0);
    }
    assert_eq!(
        output.metadata.num_observed + output.metadata.num_predicted,
        POINTS
    );
    assert_eq!(output.observed().count(), output.metadata.num_observed);
    assert_eq!(output.predicted().count(), output.metadata.num_predicted);
}

#[test]
fn observed_points_lie_on_the_cone() {
    let (input, _) = scene(POINTS);
    let cone = tree();
    let output = Reconstructor::default().reconstruct(&input).unwrap();
    for position in output.observed() {
        assert_relative_eq!(
            position.x.hypot(position.y),
            cone.radius_at(position.z),
            epsilon = 1e-6
        );
        assert!((0.0..=1.0).contains(&position.normalized_height));
    }
}

#[test]
fn refinement_reports_surface_choices() {
    let (input, _) = scene(POINTS);
    let plain = Reconstructor::new(without_reflection_filter())
        .reconstruct(&input)
        .unwrap();
    let refined = Reconstructor::new(ReconstructionSettings {
        enable_surface_refinement: true,
        ..without_reflection_filter()
    })
    .reconstruct(&input)
    .unwrap();

    assert!(plain.surface_choices.is_none());
    let choices = refined.surface_choices.as_ref().unwrap();
    assert_eq!(choices.len(), POINTS);
    assert_eq!(refined.positions.len(), POINTS);
    assert!(refined.metadata.num_observed >= plain.metadata.num_observed);
    for choice in choices {
        assert!((0.0..=1.0).contains(&choice.front_confidence));
    }
}

#[test]
fn statistics_summarize_output() {
    let (input, _) = scene(POINTS);
    let output = Reconstructor::new(without_reflection_filter())
        .reconstruct(&input)
        .unwrap();
    let statistics = output.statistics();
    assert_eq!(statistics.total, POINTS);
    assert_eq!(statistics.observed, POINTS);
    assert_relative_eq!(statistics.observed_percent(), 100.0);
    let confidence = statistics.confidence.unwrap();
    assert!(confidence.min <= confidence.mean && confidence.mean <= confidence.max);
    let z = statistics.z.unwrap();
    assert!(z.min >= 0.0 && z.max <= OBJECT_HEIGHT);
    let report = statistics.to_string();
    assert!(report.contains("Observed (triangulated): 40 (100.0%)"));
}

#[test]
fn rejects_degenerate_input() {
    let (input, _) = scene(POINTS);
    let reconstructor = Reconstructor::default();

    let no_observations = ReconstructionInput {
        observations: vec![],
        ..input.clone()
    };
    assert_eq!(
        reconstructor.reconstruct(&no_observations),
        Err(ReconstructionError::NoObservations)
    );

    let flat = ReconstructionInput {
        object_height: 0.0,
        ..input.clone()
    };
    assert_eq!(
        reconstructor.reconstruct(&flat),
        Err(ReconstructionError::InvalidObjectHeight(0.0))
    );

    let empty_string = ReconstructionInput {
        total_points: 0,
        ..input.clone()
    };
    assert_eq!(
        reconstructor.reconstruct(&empty_string),
        Err(ReconstructionError::NoPoints)
    );

    let inverted = Reconstructor::new(ReconstructionSettings {
        base_radius: -1.0,
        ..Default::default()
    });
    assert!(matches!(
        inverted.reconstruct(&input),
        Err(ReconstructionError::InvalidCone { .. })
    ));
}

#[test]
fn uncalibrated_cameras_place_nothing() {
    let (mut input, _) = scene(POINTS);
    input.camera_poses.clear();
    assert_eq!(
        Reconstructor::default().reconstruct(&input),
        Err(ReconstructionError::NothingPlaced(POINTS))
    );
}

#[test]
fn out_of_range_points_are_ignored() {
    let (mut input, _) = scene(POINTS);
    let mut stray = input.observations[0];
    stray.point_index = POINTS + 3;
    input.observations.push(stray);
    let output = Reconstructor::default().reconstruct(&input).unwrap();
    assert_eq!(output.positions.len(), POINTS);
}

struct StopBefore {
    stage: Stage,
    seen: Vec<Stage>,
}

impl StageObserver for StopBefore {
    fn stage_started(&mut self, stage: Stage) -> ControlFlow<()> {
        if stage == self.stage {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }

    fn stage_finished(&mut self, stage: Stage) {
        self.seen.push(stage);
    }
}

#[test]
fn observer_can_cancel_between_stages() {
    let (input, _) = scene(POINTS);
    let mut observer = StopBefore {
        stage: Stage::Triangulation,
        seen: vec![],
    };
    let result = Reconstructor::default().reconstruct_with_observer(&input, &mut observer);
    assert_eq!(result, Err(ReconstructionError::Cancelled(Stage::Triangulation)));
    assert_eq!(
        observer.seen,
        vec![Stage::ReflectionFilter, Stage::OcclusionAnalysis]
    );
}

#[test]
fn disabled_refinement_is_not_reported() {
    let (input, _) = scene(POINTS);
    let mut observer = StopBefore {
        stage: Stage::SurfaceRefinement,
        seen: vec![],
    };
    let output = Reconstructor::default()
        .reconstruct_with_observer(&input, &mut observer)
        .unwrap();
    assert_eq!(output.positions.len(), POINTS);
    assert_eq!(
        observer.seen,
        vec![
            Stage::ReflectionFilter,
            Stage::OcclusionAnalysis,
            Stage::Triangulation,
            Stage::GapFilling
        ]
    );
}
