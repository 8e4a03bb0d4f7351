//! Batch tensor builder.
//!
//! Turns a batch of variable-length [`TokenEncoding`]s into two rectangular
//! `[batch_size, max_len]` tensors (`input_ids`, `attention_mask`) that can be
//! handed to the inference engine as-is.
//!
//! # Layout
//!
//! ```text
//! encodings             input_ids                 attention_mask
//! [101 2054 102]        [101 2054 102    0    0]  [1 1 1 0 0]
//! [101 7 8 9 102]   ->  [101    7   8    9  102]  [1 1 1 1 1]
//! ```
//!
//! - Right-padding only; padded positions hold `0` in both tensors so the
//!   engine never attends to them.
//! - One contiguous row-major buffer per tensor (row = batch index).

use crate::types::TokenEncoding;

/// Dense row-major `i64` tensor of shape `[batch_size, seq_len]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaddedTensor {
    data: Vec<i64>,
    batch_size: usize,
    seq_len: usize,
}

impl PaddedTensor {
    fn zeros(batch_size: usize, seq_len: usize) -> Self {
        Self {
            data: vec![0; batch_size * seq_len],
            batch_size,
            seq_len,
        }
    }

    /// `[batch_size, seq_len]`.
    #[inline]
    pub fn shape(&self) -> [usize; 2] {
        [self.batch_size, self.seq_len]
    }

    #[inline]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    #[inline]
    pub fn seq_len(&self) -> usize {
        self.seq_len
    }

    /// Flat row-major view, length `batch_size * seq_len`.
    #[inline]
    pub fn as_slice(&self) -> &[i64] {
        &self.data
    }

    /// Row `b`, or `None` if out of range.
    pub fn row(&self, b: usize) -> Option<&[i64]> {
        if b >= self.batch_size {
            return None;
        }
        let start = b * self.seq_len;
        Some(&self.data[start..start + self.seq_len])
    }
}

/// Padded `input_ids` and `attention_mask` for one forward pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaddedBatch {
    input_ids: PaddedTensor,
    attention_mask: PaddedTensor,
}

impl PaddedBatch {
    /// Pad `encodings` to the longest one in the batch.
    ///
    /// Returns `None` for an empty batch: there is nothing to run and the
    /// caller returns an empty result without touching the engine.
    ///
    /// Zero-length encodings are allowed; a batch consisting only of them has
    /// shape `[n, 0]`.
    pub fn from_encodings(encodings: &[TokenEncoding]) -> Option<Self> {
        if encodings.is_empty() {
            return None;
        }

        let batch_size = encodings.len();
        let max_len = encodings.iter().map(TokenEncoding::len).max().unwrap_or(0);

        let mut input_ids = PaddedTensor::zeros(batch_size, max_len);
        let mut attention_mask = PaddedTensor::zeros(batch_size, max_len);

        for (b, encoding) in encodings.iter().enumerate() {
            let start = b * max_len;
            let len = encoding.len();

            let id_row = &mut input_ids.data[start..start + len];
            for (dst, &id) in id_row.iter_mut().zip(encoding.ids()) {
                *dst = i64::from(id);
            }

            let mask_row = &mut attention_mask.data[start..start + len];
            for (dst, &m) in mask_row.iter_mut().zip(encoding.attention_mask()) {
                *dst = i64::from(m);
            }
            // positions len..max_len stay 0 in both tensors
        }

        Some(Self {
            input_ids,
            attention_mask,
        })
    }

    #[inline]
    pub fn input_ids(&self) -> &PaddedTensor {
        &self.input_ids
    }

    #[inline]
    pub fn attention_mask(&self) -> &PaddedTensor {
        &self.attention_mask
    }

    #[inline]
    pub fn batch_size(&self) -> usize {
        self.input_ids.batch_size
    }

    /// Padded sequence length (longest encoding in the batch).
    #[inline]
    pub fn max_len(&self) -> usize {
        self.input_ids.seq_len
    }

    /// `[batch_size, max_len]`, shared by both tensors.
    #[inline]
    pub fn shape(&self) -> [usize; 2] {
        self.input_ids.shape()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enc(ids: &[u32]) -> TokenEncoding {
        TokenEncoding::from_ids(ids.to_vec())
    }

    #[test]
    fn test_empty_batch_produces_no_tensors() {
        assert!(PaddedBatch::from_encodings(&[]).is_none());
    }

    #[test]
    fn test_single_item_batch_has_no_padding() {
        let batch = PaddedBatch::from_encodings(&[enc(&[101, 2054, 5320, 102])]).expect("batch");

        assert_eq!(batch.shape(), [1, 4]);
        assert_eq!(batch.input_ids().as_slice(), &[101, 2054, 5320, 102]);
        assert_eq!(batch.attention_mask().as_slice(), &[1, 1, 1, 1]);
    }

    #[test]
    fn test_right_pads_shorter_rows_with_zero() {
        let encodings = [enc(&[101, 7, 102]), enc(&[101, 7, 8, 9, 102]), enc(&[101, 102])];
        let batch = PaddedBatch::from_encodings(&encodings).expect("batch");

        assert_eq!(batch.shape(), [3, 5]);
        assert_eq!(batch.input_ids().row(0), Some(&[101, 7, 102, 0, 0][..]));
        assert_eq!(batch.input_ids().row(1), Some(&[101, 7, 8, 9, 102][..]));
        assert_eq!(batch.input_ids().row(2), Some(&[101, 102, 0, 0, 0][..]));

        assert_eq!(batch.attention_mask().row(0), Some(&[1, 1, 1, 0, 0][..]));
        assert_eq!(batch.attention_mask().row(1), Some(&[1, 1, 1, 1, 1][..]));
        assert_eq!(batch.attention_mask().row(2), Some(&[1, 1, 0, 0, 0][..]));
    }

    #[test]
    fn test_padding_positions_are_zero_in_both_tensors() {
        let encodings = [enc(&[5; 7]), enc(&[6; 2]), enc(&[9; 4])];
        let batch = PaddedBatch::from_encodings(&encodings).expect("batch");
        let max_len = batch.max_len();

        for (b, encoding) in encodings.iter().enumerate() {
            let ids = batch.input_ids().row(b).expect("row");
            let mask = batch.attention_mask().row(b).expect("row");
            for i in encoding.len()..max_len {
                assert_eq!(ids[i], 0, "row {} pos {} id must be padding", b, i);
                assert_eq!(mask[i], 0, "row {} pos {} mask must be padding", b, i);
            }
        }
    }

    #[test]
    fn test_mask_values_are_copied_not_assumed() {
        let partial = TokenEncoding::new(vec![101, 7, 0, 102], vec![1, 1, 0, 1]).expect("encoding");
        let batch = PaddedBatch::from_encodings(&[partial]).expect("batch");
        assert_eq!(batch.attention_mask().as_slice(), &[1, 1, 0, 1]);
    }

    #[test]
    fn test_zero_length_encodings() {
        let batch =
            PaddedBatch::from_encodings(&[TokenEncoding::default(), TokenEncoding::default()])
                .expect("batch");
        assert_eq!(batch.shape(), [2, 0]);
        assert!(batch.input_ids().as_slice().is_empty());
        assert_eq!(batch.input_ids().row(1), Some(&[][..]));
    }

    #[test]
    fn test_mixed_empty_and_non_empty_rows() {
        let batch = PaddedBatch::from_encodings(&[TokenEncoding::default(), enc(&[101, 102])])
            .expect("batch");
        assert_eq!(batch.shape(), [2, 2]);
        assert_eq!(batch.input_ids().as_slice(), &[0, 0, 101, 102]);
        assert_eq!(batch.attention_mask().as_slice(), &[0, 0, 1, 1]);
    }

    #[test]
    fn test_buffers_are_contiguous_row_major() {
        let batch = PaddedBatch::from_encodings(&[enc(&[1, 2]), enc(&[3])]).expect("batch");
        assert_eq!(batch.input_ids().as_slice().len(), 2 * 2);
        assert_eq!(batch.input_ids().as_slice(), &[1, 2, 3, 0]);
    }

    #[test]
    fn test_row_out_of_range() {
        let batch = PaddedBatch::from_encodings(&[enc(&[1])]).expect("batch");
        assert!(batch.input_ids().row(1).is_none());
    }
}
