//! PNG encoding of the sampled validation digit.

use image::codecs::png::PngEncoder;
use image::error::{ImageError, ParameterError, ParameterErrorKind};
use image::{ColorType, ImageEncoder};

use digit_dash::train::SampleRecord;

/// Encodes the sample's grayscale pixels as an 8-bit PNG at native size;
/// the page scales it up with `image-rendering: pixelated`.
pub fn sample_to_png(sample: &SampleRecord) -> Result<Vec<u8>, ImageError> {
    if sample.pixels.len() != sample.width * sample.height {
        return Err(ImageError::Parameter(ParameterError::from_kind(
            ParameterErrorKind::DimensionMismatch,
        )));
    }
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(
        &sample.pixels,
        sample.width as u32,
        sample.height as u32,
        ColorType::L8,
    )?;
    Ok(bytes)
}
