use approx::assert_relative_eq;
use cone_reconstruction::{Observation, OcclusionAnalyzer};
use quickcheck_macros::quickcheck;

fn seen(point_index: usize, camera_index: usize, confidence: f64) -> Observation {
    Observation {
        point_index,
        camera_index,
        pixel_x: 0.0,
        pixel_y: 0.0,
        detection_confidence: confidence,
        angular_confidence: 1.0,
    }
}

#[test]
fn fully_visible_camera_has_one_visible_segment() {
    let analyzer = OcclusionAnalyzer::new();
    let smoothed = analyzer.smooth(&[1.0; 12]);
    let segments = analyzer.segment(&smoothed);
    assert_eq!(segments.len(), 1);
    assert!(segments[0].visible);
    assert_eq!((segments[0].start, segments[0].end), (0, 11));
    assert_relative_eq!(segments[0].occlusion_score(), 0.0);
}

#[test]
fn smoothing_averages_exactly_the_window_width() {
    let mut spike = [0.0; 11];
    spike[5] = 10.0;

    let odd = OcclusionAnalyzer::new().smoothing_window(5).smooth(&spike);
    assert_eq!(odd, vec![0.0, 0.0, 0.0, 2.0, 2.0, 2.0, 2.0, 2.0, 0.0, 0.0, 0.0]);

    let even = OcclusionAnalyzer::new().smoothing_window(4).smooth(&spike);
    assert_eq!(even, vec![0.0, 0.0, 0.0, 2.5, 2.5, 2.5, 2.5, 0.0, 0.0, 0.0, 0.0]);
}

#[test]
fn unseen_camera_run_is_fully_hidden() {
    let observations = vec![seen(0, 4, 1.0), seen(1, 4, 1.0), seen(2, 4, 1.0)];
    let camera = OcclusionAnalyzer::new()
        .smoothing_window(1)
        .analyze_camera(4, &observations, 8);
    assert_eq!(camera.segments.len(), 2);
    assert!(camera.segments[0].visible);
    assert!(!camera.segments[1].visible);
    assert_eq!(camera.segments[1].start, 3);
    assert_relative_eq!(camera.score(1), 0.0);
    assert_relative_eq!(camera.score(6), 1.0);
    assert_eq!(camera.score(100), 0.0);
}

#[test]
fn best_detection_wins_on_duplicates() {
    let observations = vec![seen(1, 0, 0.2), seen(1, 0, 0.7), seen(1, 1, 0.9), seen(7, 0, 1.0)];
    let sequence = OcclusionAnalyzer::confidence_sequence(0, &observations, 3);
    assert_eq!(sequence, vec![0.0, 0.7, 0.0]);
}

#[test]
fn hidden_scores_stay_above_visible_scores() {
    // Points 0..6 are clearly visible, 6..12 only faintly.
    let observations: Vec<Observation> = (0..12)
        .map(|index| seen(index, 0, if index < 6 { 0.95 } else { 0.2 }))
        .collect();
    let map = OcclusionAnalyzer::new().analyze(&observations, 12);
    let camera = map.camera(0).unwrap();
    let visible = camera.segments.iter().find(|s| s.visible).unwrap();
    let hidden = camera.segments.iter().find(|s| !s.visible).unwrap();
    assert!(visible.contains(0));
    assert!(hidden.contains(11));
    assert!(map.score(0, 11) >= 0.7);
    assert!(map.score(0, 0) < 0.5);
    assert_relative_eq!(
        map.score(0, 11),
        0.7 + 0.3 * (1.0 - hidden.average_confidence),
        epsilon = 1e-12
    );
}

#[test]
fn only_observing_cameras_are_analyzed() {
    let observations = vec![seen(0, 2, 1.0), seen(0, 5, 1.0)];
    let map = OcclusionAnalyzer::new().analyze(&observations, 1);
    let cameras: Vec<usize> = map.cameras().map(|camera| camera.camera_index).collect();
    assert_eq!(cameras, vec![2, 5]);
    assert_eq!(map.score(3, 0), 0.0);
}

#[quickcheck]
fn scores_are_bounded_and_segments_cover_everything(confidences: Vec<u8>) -> bool {
    let observations: Vec<Observation> = confidences
        .iter()
        .enumerate()
        .map(|(index, &confidence)| seen(index, 0, confidence as f64 / 255.0))
        .collect();
    let camera = OcclusionAnalyzer::new().analyze_camera(0, &observations, confidences.len());
    let covered: usize = camera
        .segments
        .iter()
        .map(|segment| segment.end + 1 - segment.start)
        .sum();
    covered == confidences.len()
        && camera.scores.iter().all(|score| (0.0..=1.0).contains(score))
        && camera
            .segments
            .windows(2)
            .all(|pair| pair[0].end + 1 == pair[1].start && pair[0].visible != pair[1].visible)
}
