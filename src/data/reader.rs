//! CSV parsing for the training file.
//!
//! Expected layout:
//! - UTF-8, comma-separated, one header row
//! - first column: integer class label in `0..num_classes`
//! - remaining `height * width` columns: raw pixel intensities, row-major

use std::io::Read;

use crate::data::{dataset::{preprocess, Sample}, ImageShape};
use crate::error::{HarnessError, Result};

/// Parses every row of `reader` eagerly into normalized samples.
///
/// Any row that cannot be reshaped into `shape` (wrong column count,
/// non-numeric cell, label out of range) fails the whole parse with
/// `DataFormat`; so does a file with no data rows.
pub fn parse_csv<R: Read>(
    reader: R,
    shape: ImageShape,
    num_classes: usize,
    divisor: f64,
) -> Result<Vec<Sample>> {
    let expected_cols = shape.len() + 1;

    let mut rdr = ::csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let header_cols = rdr.headers()?.len();
    if header_cols != expected_cols {
        return Err(HarnessError::DataFormat(format!(
            "header has {} columns, expected 1 label + {} pixels ({}x{})",
            header_cols, shape.len(), shape.height, shape.width
        )));
    }

    let mut samples = Vec::new();
    let mut raw = Vec::with_capacity(shape.len());

    for (row_idx, record) in rdr.records().enumerate() {
        let record = record?;
        // Row numbers in messages are 1-based and count the header.
        let row_num = row_idx + 2;

        if record.len() != expected_cols {
            return Err(HarnessError::DataFormat(format!(
                "row {}: {} columns, expected {}",
                row_num, record.len(), expected_cols
            )));
        }

        let label_cell = record[0].trim();
        let label: usize = label_cell.parse().map_err(|_| {
            HarnessError::DataFormat(format!(
                "row {}: label '{}' is not a non-negative integer",
                row_num, label_cell
            ))
        })?;
        if label >= num_classes {
            return Err(HarnessError::DataFormat(format!(
                "row {}: label {} >= num_classes {}",
                row_num, label, num_classes
            )));
        }

        raw.clear();
        for cell in record.iter().skip(1) {
            let value: f64 = cell.trim().parse().map_err(|_| {
                HarnessError::DataFormat(format!("row {}: '{}' is not a valid number", row_num, cell))
            })?;
            raw.push(value);
        }

        samples.push(Sample { image: preprocess(&raw, divisor), label });
    }

    if samples.is_empty() {
        return Err(HarnessError::DataFormat("CSV contains no data rows".into()));
    }

    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TINY: ImageShape = ImageShape { height: 2, width: 2 };

    #[test]
    fn parses_label_first_rows() {
        let text = "label,p0,p1,p2,p3\n3,0,225,45,90\n0,1,2,3,4\n";
        let rows = parse_csv(text.as_bytes(), TINY, 10, 225.0).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].label, 3);
        assert_eq!(rows[0].image, vec![0.0, 1.0, 0.2, 0.4]);
        assert_eq!(rows[1].label, 0);
    }

    #[test]
    fn short_row_is_a_format_error() {
        let text = "label,p0,p1,p2,p3\n3,0,225,45\n";
        let err = parse_csv(text.as_bytes(), TINY, 10, 225.0).unwrap_err();
        assert!(matches!(err, HarnessError::DataFormat(_)), "{err}");
    }

    #[test]
    fn header_width_must_match_the_image_shape() {
        let text = "label,p0,p1\n3,0,1\n";
        let err = parse_csv(text.as_bytes(), TINY, 10, 225.0).unwrap_err();
        assert!(matches!(err, HarnessError::DataFormat(_)));
    }

    #[test]
    fn label_outside_class_range_is_rejected() {
        let text = "label,p0,p1,p2,p3\n10,0,0,0,0\n";
        let err = parse_csv(text.as_bytes(), TINY, 10, 225.0).unwrap_err();
        assert!(err.to_string().contains("num_classes"));
    }

    #[test]
    fn non_numeric_pixel_is_rejected() {
        let text = "label,p0,p1,p2,p3\n1,0,x,0,0\n";
        assert!(parse_csv(text.as_bytes(), TINY, 10, 225.0).is_err());
    }

    #[test]
    fn header_only_file_is_rejected() {
        let text = "label,p0,p1,p2,p3\n";
        let err = parse_csv(text.as_bytes(), TINY, 10, 225.0).unwrap_err();
        assert!(matches!(err, HarnessError::DataFormat(_)));
    }
}
