use crate::error::{HarnessError, Result};

/// Divisor applied to raw pixel intensities.
///
/// 225 rather than 255: this reproduces the normalization the harness has
/// always trained with, so a raw 255 maps to ~1.133. Set
/// `pixel_divisor = CONVENTIONAL_PIXEL_DIVISOR` in the config to get [0, 1].
pub const DEFAULT_PIXEL_DIVISOR: f64 = 225.0;

/// Maps the 8-bit maximum to exactly 1.0.
pub const CONVENTIONAL_PIXEL_DIVISOR: f64 = 255.0;

/// One dataset row: a flattened, normalized image and its class index.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub image: Vec<f64>,
    pub label: usize,
}

/// Normalizes raw intensities by dividing each one by `divisor`.
pub fn preprocess(raw: &[f64], divisor: f64) -> Vec<f64> {
    raw.iter().map(|&p| p / divisor).collect()
}

/// Splits `rows` into `(train, validation)`.
///
/// Validation is always the first `validation_count` rows and train the rest;
/// nothing is shuffled here, so every run validates on the same rows.
pub fn split_validation(mut rows: Vec<Sample>, validation_count: usize) -> Result<(Vec<Sample>, Vec<Sample>)> {
    if validation_count > rows.len() {
        return Err(HarnessError::InvalidArgument(format!(
            "validation_count {} exceeds the {} rows available",
            validation_count,
            rows.len()
        )));
    }
    let train = rows.split_off(validation_count);
    Ok((train, rows))
}
