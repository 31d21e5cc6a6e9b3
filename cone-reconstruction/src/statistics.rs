use cone_core::FinalPosition;
use float_ord::FloatOrd;
use itertools::Itertools;
use std::fmt;

/// Confidences above this count as high confidence.
pub const HIGH_CONFIDENCE: f64 = 0.8;

/// Summary of the confidences of the observed positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceSummary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// The number of observed positions with a confidence above [`HIGH_CONFIDENCE`].
    pub high_confidence: usize,
}

/// A closed interval of values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    fn of(values: impl Iterator<Item = f64>) -> Option<Self> {
        let (min, max) = values.map(FloatOrd).minmax().into_option()?;
        Some(Self {
            min: min.0,
            max: max.0,
        })
    }
}

/// Quality report of a set of reconstructed positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    pub total: usize,
    pub observed: usize,
    pub predicted: usize,
    /// `None` when no position was observed.
    pub confidence: Option<ConfidenceSummary>,
    pub x: Option<ValueRange>,
    pub y: Option<ValueRange>,
    pub z: Option<ValueRange>,
    pub normalized_height: Option<ValueRange>,
    pub angle_degrees: Option<ValueRange>,
}

impl Statistics {
    pub fn from_positions(positions: &[FinalPosition]) -> Self {
        let confidences: Vec<f64> = positions
            .iter()
            .filter(|position| !position.predicted)
            .map(|position| position.confidence)
            .collect();
        let confidence = ValueRange::of(confidences.iter().copied()).map(|range| {
            ConfidenceSummary {
                mean: confidences.iter().sum::<f64>() / confidences.len() as f64,
                min: range.min,
                max: range.max,
                high_confidence: confidences
                    .iter()
                    .filter(|&&confidence| confidence > HIGH_CONFIDENCE)
                    .count(),
            }
        });
        Self {
            total: positions.len(),
            observed: confidences.len(),
            predicted: positions.len() - confidences.len(),
            confidence,
            x: ValueRange::of(positions.iter().map(|p| p.x)),
            y: ValueRange::of(positions.iter().map(|p| p.y)),
            z: ValueRange::of(positions.iter().map(|p| p.z)),
            normalized_height: ValueRange::of(positions.iter().map(|p| p.normalized_height)),
            angle_degrees: ValueRange::of(positions.iter().map(|p| p.angle_degrees)),
        }
    }

    pub fn observed_percent(&self) -> f64 {
        percent(self.observed, self.total)
    }

    pub fn predicted_percent(&self) -> f64 {
        percent(self.predicted, self.total)
    }
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * part as f64 / total as f64
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total points: {}", self.total)?;
        writeln!(
            f,
            "Observed (triangulated): {} ({:.1}%)",
            self.observed,
            self.observed_percent()
        )?;
        writeln!(
            f,
            "Predicted (interpolated): {} ({:.1}%)",
            self.predicted,
            self.predicted_percent()
        )?;
        if let Some(confidence) = &self.confidence {
            writeln!(f, "Confidence (observed points):")?;
            writeln!(f, "  Mean: {:.3}", confidence.mean)?;
            writeln!(f, "  Min:  {:.3}", confidence.min)?;
            writeln!(f, "  Max:  {:.3}", confidence.max)?;
            writeln!(
                f,
                "  High confidence (>{}): {} ({:.1}%)",
                HIGH_CONFIDENCE,
                confidence.high_confidence,
                percent(confidence.high_confidence, self.observed)
            )?;
        }
        writeln!(f, "Spatial distribution:")?;
        for (name, range, unit) in [
            ("X", self.x, "m"),
            ("Y", self.y, "m"),
            ("Z", self.z, "m"),
            ("Height", self.normalized_height, " (normalized)"),
        ] {
            if let Some(range) = range {
                writeln!(
                    f,
                    "  {} range: [{:.3}, {:.3}]{}",
                    name, range.min, range.max, unit
                )?;
            }
        }
        if let Some(range) = self.angle_degrees {
            writeln!(f, "  Angle range: [{:.1}°, {:.1}°]", range.min, range.max)?;
        }
        Ok(())
    }
}
