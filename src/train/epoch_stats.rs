use serde::{Serialize, Deserialize};

use crate::data::ImageShape;
use crate::train::epoch::SamplePrediction;

/// Finalized accumulators of one training or validation pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    /// Mean of the per-batch losses.
    pub loss: f64,
    /// Fraction of correctly classified samples, in [0, 1].
    pub accuracy: f64,
}

/// The validation example drawn after an epoch, kept for spot inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    pub width: usize,
    pub height: usize,
    /// Grayscale pixels, row-major, back in the 0..=255 range.
    pub pixels: Vec<u8>,
    pub label: usize,
    pub prediction: usize,
}

impl SampleRecord {
    /// Undoes the `pixel_divisor` normalization so the image can be displayed.
    pub fn from_prediction(sample: &SamplePrediction, shape: ImageShape, pixel_divisor: f64) -> SampleRecord {
        SampleRecord {
            width: shape.width,
            height: shape.height,
            pixels: sample.image.iter()
                .map(|&v| (v * pixel_divisor).round().clamp(0.0, 255.0) as u8)
                .collect(),
            label: sample.label,
            prediction: sample.prediction,
        }
    }
}

/// Everything the driver records for one finished epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochRecord {
    /// 1-based epoch number.
    pub epoch: usize,
    pub train_loss: f64,
    pub train_accuracy: f64,
    pub validation_loss: f64,
    pub validation_accuracy: f64,
    pub sample: SampleRecord,
    /// Wall-clock duration of train + validate + sample, in milliseconds.
    pub elapsed_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_pixels_are_restored_to_bytes() {
        let prediction = SamplePrediction { image: vec![0.0, 1.0, 255.0 / 225.0, 0.5], label: 4, prediction: 7 };
        let record = SampleRecord::from_prediction(&prediction, ImageShape { height: 2, width: 2 }, 225.0);
        assert_eq!(record.pixels, vec![0, 225, 255, 113]);
        assert_eq!((record.label, record.prediction), (4, 7));
    }
}
