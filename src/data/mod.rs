//! Dataset Provider: CSV ingestion, preprocessing, the fixed train/validation
//! split and the reshuffling batch streams built on top of it.

pub mod reader;
pub mod dataset;
pub mod stream;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::{debug, info};
use serde::{Serialize, Deserialize};

use crate::error::{HarnessError, Result};

pub use dataset::{preprocess, split_validation, Sample, CONVENTIONAL_PIXEL_DIVISOR, DEFAULT_PIXEL_DIVISOR};
pub use stream::{Batch, BatchStream};

/// Height and width of the single-channel images the dataset holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageShape {
    pub height: usize,
    pub width: usize,
}

impl ImageShape {
    /// Number of pixels in one flattened image.
    pub fn len(&self) -> usize {
        self.height * self.width
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ImageShape {
    /// MNIST: 28×28.
    fn default() -> Self {
        ImageShape { height: 28, width: 28 }
    }
}

/// Everything `load` needs besides the file path.
#[derive(Debug, Clone, PartialEq)]
pub struct DataConfig {
    /// Rows taken, in file order, from the top of the file for validation.
    pub validation_count: usize,
    pub batch_size: usize,
    pub image_shape: ImageShape,
    pub num_classes: usize,
    pub pixel_divisor: f64,
    /// Seed of the training stream's shuffler; the validation stream uses `seed + 1`.
    pub seed: u64,
}

/// Loads the whole CSV at `path` and returns `(train_stream, validation_stream)`.
///
/// Fails with `InvalidArgument` before touching the file when `batch_size` is
/// zero, with `DataFormat` for rows that cannot be reshaped, and with
/// `InvalidArgument` when `validation_count` exceeds the number of rows.
pub fn load(path: impl AsRef<Path>, config: &DataConfig) -> Result<(BatchStream, BatchStream)> {
    if config.batch_size == 0 {
        return Err(HarnessError::InvalidArgument("batch_size must be at least 1".into()));
    }
    let path = path.as_ref();
    debug!("reading dataset from {}", path.display());

    let file = File::open(path)?;
    let rows = reader::parse_csv(
        BufReader::new(file),
        config.image_shape,
        config.num_classes,
        config.pixel_divisor,
    )?;
    let total = rows.len();

    let (train, validation) = split_validation(rows, config.validation_count)?;
    info!(
        "loaded {} rows from {}: {} train, {} validation",
        total,
        path.display(),
        train.len(),
        validation.len()
    );

    Ok((
        BatchStream::new(train, config.batch_size, config.seed)?,
        BatchStream::new(validation, config.batch_size, config.seed.wrapping_add(1))?,
    ))
}
