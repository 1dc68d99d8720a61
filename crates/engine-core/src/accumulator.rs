use model::records::{
    batch::{Batch, BatchError},
    row::TargetRecord,
};
use std::num::NonZeroUsize;

pub const DEFAULT_BATCH_SIZE: NonZeroUsize = match NonZeroUsize::new(1000) {
    Some(size) => size,
    None => unreachable!(),
};

/// Buffers mapped records and cuts them into [`Batch`]es of a fixed size.
pub struct BatchAccumulator {
    batch_size: usize,
    buffer: Vec<TargetRecord>,
    next_seq: usize,
}

impl BatchAccumulator {
    pub fn new(batch_size: NonZeroUsize) -> Self {
        BatchAccumulator {
            batch_size: batch_size.get(),
            buffer: Vec::with_capacity(batch_size.get()),
            next_seq: 1,
        }
    }

    /// Buffers `record`; returns a full batch once the buffer reaches the
    /// batch size. A record whose columns differ from the buffered ones is
    /// rejected and not buffered.
    pub fn add(&mut self, record: TargetRecord) -> Result<Option<Batch>, BatchError> {
        if let Some(first) = self.buffer.first()
            && !record.same_shape(first)
        {
            return Err(BatchError::ShapeMismatch {
                seq: self.next_seq,
                index: self.buffer.len(),
            });
        }

        self.buffer.push(record);
        if self.buffer.len() >= self.batch_size {
            return self.take().map(Some);
        }
        Ok(None)
    }

    /// Returns whatever is buffered as a final, possibly short, batch.
    pub fn flush(&mut self) -> Result<Option<Batch>, BatchError> {
        if self.buffer.is_empty() {
            return Ok(None);
        }
        self.take().map(Some)
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    fn take(&mut self) -> Result<Batch, BatchError> {
        let rows = std::mem::replace(&mut self.buffer, Vec::with_capacity(self.batch_size));
        let batch = Batch::new(self.next_seq, rows)?;
        self.next_seq += 1;
        Ok(batch)
    }
}

impl Default for BatchAccumulator {
    fn default() -> Self {
        BatchAccumulator::new(DEFAULT_BATCH_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::{core::value::Value, records::row::FieldValue};

    fn record(cols: &[&str]) -> TargetRecord {
        TargetRecord::new(
            cols.iter()
                .map(|c| FieldValue {
                    name: c.to_string(),
                    value: Value::Null,
                })
                .collect(),
        )
    }

    fn sizes(n: usize, b: usize) -> Vec<usize> {
        let mut acc = BatchAccumulator::new(NonZeroUsize::new(b).unwrap());
        let mut out = Vec::new();
        for _ in 0..n {
            if let Some(batch) = acc.add(record(&["siren"])).unwrap() {
                out.push(batch.len());
            }
        }
        if let Some(batch) = acc.flush().unwrap() {
            out.push(batch.len());
        }
        out
    }

    #[test]
    fn test_full_batches_then_remainder() {
        assert_eq!(sizes(2500, 1000), vec![1000, 1000, 500]);
        assert_eq!(sizes(7, 3), vec![3, 3, 1]);
    }

    #[test]
    fn test_exact_multiple_has_no_trailing_batch() {
        assert_eq!(sizes(2000, 1000), vec![1000, 1000]);
        assert!(sizes(0, 1000).is_empty());
    }

    #[test]
    fn test_batch_count_matches_floor_plus_remainder() {
        for (n, b) in [(1, 1), (10, 4), (99, 10), (100, 10), (5, 50)] {
            let got = sizes(n, b);
            assert_eq!(got.len(), n / b + usize::from(n % b != 0));
            assert_eq!(got.iter().sum::<usize>(), n);
        }
    }

    #[test]
    fn test_sequence_numbers_increase() {
        let mut acc = BatchAccumulator::new(NonZeroUsize::new(1).unwrap());
        let a = acc.add(record(&["siren"])).unwrap().unwrap();
        let b = acc.add(record(&["siren"])).unwrap().unwrap();
        assert_eq!((a.seq, b.seq), (1, 2));
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let mut acc = BatchAccumulator::new(NonZeroUsize::new(10).unwrap());
        acc.add(record(&["siren", "sigle"])).unwrap();
        let err = acc.add(record(&["siren"])).unwrap_err();
        assert_eq!(err, BatchError::ShapeMismatch { seq: 1, index: 1 });
        assert_eq!(acc.buffered(), 1);
    }
}
