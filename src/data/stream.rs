use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::data::dataset::Sample;
use crate::error::{HarnessError, Result};
use crate::math::matrix::Matrix;

/// One unit of gradient computation: `images` holds one flattened image per
/// row, `labels[i]` is the class of row `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub images: Matrix,
    pub labels: Vec<usize>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Builds a batch from borrowed samples, copying their pixels.
    pub fn from_samples<'a, I>(samples: I) -> Batch
    where
        I: IntoIterator<Item = &'a Sample>,
    {
        let (data, labels): (Vec<Vec<f64>>, Vec<usize>) = samples
            .into_iter()
            .map(|s| (s.image.clone(), s.label))
            .unzip();
        Batch { images: Matrix::from_data(data), labels }
    }
}

/// An in-memory partition that hands out a freshly shuffled order on every
/// traversal.
///
/// The shuffler is a seeded `StdRng` owned by the stream, so two streams
/// built from the same rows and seed produce the same sequence of epochs.
#[derive(Debug, Clone)]
pub struct BatchStream {
    samples: Vec<Sample>,
    batch_size: usize,
    rng: StdRng,
}

impl BatchStream {
    pub fn new(samples: Vec<Sample>, batch_size: usize, seed: u64) -> Result<BatchStream> {
        if batch_size == 0 {
            return Err(HarnessError::InvalidArgument("batch_size must be at least 1".into()));
        }
        Ok(BatchStream { samples, batch_size, rng: StdRng::seed_from_u64(seed) })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Batches per traversal; the last one may be short.
    pub fn num_batches(&self) -> usize {
        self.samples.len().div_ceil(self.batch_size)
    }

    /// Rows in their original file order.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Reshuffles and returns a lazy iterator over one epoch of batches.
    pub fn batches(&mut self) -> Batches<'_> {
        let order = self.shuffled_order();
        Batches {
            samples: &self.samples,
            order,
            batch_size: self.batch_size,
            cursor: 0,
        }
    }

    /// Reshuffles and returns every row once, unbatched.
    pub fn shuffled(&mut self) -> impl Iterator<Item = &Sample> + '_ {
        let order = self.shuffled_order();
        let samples = &self.samples;
        order.into_iter().map(move |i| &samples[i])
    }

    fn shuffled_order(&mut self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.samples.len()).collect();
        order.shuffle(&mut self.rng);
        order
    }
}

/// One epoch over a `BatchStream`; built by `BatchStream::batches`.
pub struct Batches<'a> {
    samples: &'a [Sample],
    order: Vec<usize>,
    batch_size: usize,
    cursor: usize,
}

impl Iterator for Batches<'_> {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        if self.cursor >= self.order.len() {
            return None;
        }
        let end = (self.cursor + self.batch_size).min(self.order.len());
        let batch = Batch::from_samples(self.order[self.cursor..end].iter().map(|&i| &self.samples[i]));
        self.cursor = end;
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = (self.order.len() - self.cursor).div_ceil(self.batch_size);
        (left, Some(left))
    }
}

impl ExactSizeIterator for Batches<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(n: usize, batch_size: usize, seed: u64) -> BatchStream {
        let rows = (0..n).map(|i| Sample { image: vec![i as f64], label: i }).collect();
        BatchStream::new(rows, batch_size, seed).unwrap()
    }

    fn epoch_labels(s: &mut BatchStream) -> Vec<usize> {
        s.batches().flat_map(|b| b.labels).collect()
    }

    #[test]
    fn every_row_appears_once_per_epoch() {
        let mut s = stream(10, 3, 1);
        let sizes: Vec<usize> = s.batches().map(|b| b.len()).collect();
        assert_eq!(sizes, vec![3, 3, 3, 1]);

        let mut seen = epoch_labels(&mut s);
        seen.sort_unstable();
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn order_changes_between_epochs() {
        let mut s = stream(50, 50, 9);
        let first = epoch_labels(&mut s);
        let second = epoch_labels(&mut s);
        assert_ne!(first, second);
    }

    #[test]
    fn same_seed_gives_the_same_epochs() {
        let (mut a, mut b) = (stream(20, 4, 3), stream(20, 4, 3));
        for _ in 0..3 {
            assert_eq!(epoch_labels(&mut a), epoch_labels(&mut b));
        }
    }

    #[test]
    fn batch_rows_carry_their_pixels() {
        let mut s = stream(5, 2, 0);
        for batch in s.batches() {
            for (row, label) in batch.images.data.iter().zip(&batch.labels) {
                assert_eq!(row, &vec![*label as f64]);
            }
        }
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        assert!(BatchStream::new(Vec::new(), 0, 0).is_err());
    }

    #[test]
    fn shuffled_view_is_a_permutation() {
        let mut s = stream(7, 2, 4);
        let mut labels: Vec<usize> = s.shuffled().map(|x| x.label).collect();
        labels.sort_unstable();
        assert_eq!(labels, (0..7).collect::<Vec<_>>());
        assert_eq!(s.num_batches(), 4);
    }
}
