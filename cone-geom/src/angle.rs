pub use cone_core::normalize_degrees;

/// The absolute difference between two angles in degrees, taken in the shorter direction
/// around the circle. The result is in `[0, 180]`.
///
/// ```
/// use cone_geom::angle::angular_difference_degrees;
/// assert!((angular_difference_degrees(350.0, 10.0) - 20.0).abs() < 1e-9);
/// assert!((angular_difference_degrees(90.0, 270.0) - 180.0).abs() < 1e-9);
/// ```
pub fn angular_difference_degrees(a: f64, b: f64) -> f64 {
    let raw = (normalize_degrees(a) - normalize_degrees(b)).abs();
    raw.min(360.0 - raw)
}

/// Averages angles in degrees on the circle rather than on the number line.
///
/// Each angle is treated as a unit vector and the angle of the mean vector is returned in
/// `[0, 360)`. Averaging `350` and `10` this way gives `0` instead of `180`.
///
/// Returns `None` if there are no angles.
///
/// ```
/// use cone_geom::angle::{angular_difference_degrees, circular_mean_degrees};
/// let mean = circular_mean_degrees([350.0, 10.0]).unwrap();
/// assert!(angular_difference_degrees(mean, 0.0) < 1e-9);
/// ```
pub fn circular_mean_degrees(angles: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (count, sin_sum, cos_sum) =
        angles
            .into_iter()
            .fold((0usize, 0.0, 0.0), |(count, sin_sum, cos_sum), angle| {
                let radians = angle.to_radians();
                (count + 1, sin_sum + radians.sin(), cos_sum + radians.cos())
            });
    if count == 0 {
        return None;
    }
    let count = count as f64;
    Some(normalize_degrees(
        (sin_sum / count).atan2(cos_sum / count).to_degrees(),
    ))
}
