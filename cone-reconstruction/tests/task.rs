mod common;

use common::scene;
use cone_reconstruction::{
    PlyExport, ReconstructionError, ReconstructionTask, Reconstructor, Stage, StageEvent,
};

#[test]
fn background_reconstruction_streams_stage_events() {
    let (input, _) = scene(24);
    let expected = Reconstructor::default().reconstruct(&input).unwrap();

    let task = ReconstructionTask::spawn(Reconstructor::default(), input);
    let output = task.join();
    assert_eq!(output, Ok(expected));
}

#[test]
fn events_arrive_in_stage_order() {
    let (input, _) = scene(24);
    let task = ReconstructionTask::spawn(Reconstructor::default(), input);
    let events: Vec<StageEvent> = task.events().iter().collect();
    task.join().unwrap();

    let stages = [
        Stage::ReflectionFilter,
        Stage::OcclusionAnalysis,
        Stage::Triangulation,
        Stage::GapFilling,
    ];
    let expected: Vec<StageEvent> = stages
        .iter()
        .flat_map(|&stage| [StageEvent::Started(stage), StageEvent::Finished(stage)])
        .collect();
    assert_eq!(events, expected);
}

#[test]
fn cancelled_task_stops_at_a_stage_boundary() {
    let (input, _) = scene(24);
    let task = ReconstructionTask::spawn(Reconstructor::default(), input);
    task.cancel();
    match task.join() {
        Ok(output) => assert_eq!(output.positions.len(), 24),
        Err(ReconstructionError::Cancelled(stage)) => assert!(Stage::ALL.contains(&stage)),
        Err(other) => panic!("unexpected error {}", other),
    }
}

#[test]
fn point_cloud_contains_points_and_cameras() {
    let (input, _) = scene(24);
    let output = Reconstructor::default().reconstruct(&input).unwrap();
    let mut ply = vec![];
    let written = PlyExport::new()
        .write(&mut ply, &output.positions, &output.metadata.cameras)
        .unwrap();
    assert!(written > 0);

    let text = String::from_utf8(ply).unwrap();
    // Every camera adds its center and four frustum corners.
    assert!(text.contains(&format!("element vertex {}", 24 + 4 * 5)));
    assert!(text.contains(&format!("element face {}", 4 * 4)));
    assert!(text.contains("format ascii 1.0"));

    let mut bare = vec![];
    PlyExport::new()
        .camera_faces(false)
        .write(&mut bare, &output.positions, &[])
        .unwrap();
    let bare = String::from_utf8(bare).unwrap();
    assert!(bare.contains("element vertex 24"));
    assert!(!bare.contains("element face"));
}
