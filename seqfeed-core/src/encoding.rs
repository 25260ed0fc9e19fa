use ndarray::{Array2, ArrayView2};

use crate::consts::NUM_BASES;

/// Bases in tensor column order.
pub const BASES: [u8; NUM_BASES] = *b"ACGT";

///
/// Column of `base` in a one-hot row, case-insensitive.
/// Anything other than A/C/G/T (N, gaps, IUPAC codes) has no column.
///
#[inline]
pub fn base_index(base: u8) -> Option<usize> {
    match base {
        b'A' | b'a' => Some(0),
        b'C' | b'c' => Some(1),
        b'G' | b'g' => Some(2),
        b'T' | b't' => Some(3),
        _ => None,
    }
}

///
/// One-hot encode `seq` into a `(seq_len, 4)` tensor.
///
/// Unrecognized characters leave their row all-zero. Positions past `seq_len` are
/// ignored; callers validate lengths before encoding.
///
pub fn one_hot(seq: &[u8], seq_len: usize) -> Array2<i8> {
    let mut res = Array2::<i8>::zeros((seq_len, NUM_BASES));
    for (idx, &base) in seq.iter().take(seq_len).enumerate() {
        if let Some(col) = base_index(base) {
            res[[idx, col]] = 1;
        }
    }
    res
}

///
/// Map a one-hot tensor back to nucleotides. All-zero rows decode to `N`.
///
pub fn decode_one_hot(tensor: &ArrayView2<i8>) -> String {
    tensor
        .rows()
        .into_iter()
        .map(|row| {
            row.iter()
                .position(|&v| v == 1)
                .map_or('N', |col| BASES[col] as char)
        })
        .collect()
}

/// Encoder bound to the sequence length of its owning source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OneHotEncoder {
    seq_len: usize,
}

impl OneHotEncoder {
    pub fn new(seq_len: usize) -> Self {
        Self { seq_len }
    }

    pub fn seq_len(&self) -> usize {
        self.seq_len
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.seq_len, NUM_BASES)
    }

    pub fn encode(&self, seq: &[u8]) -> Array2<i8> {
        one_hot(seq, self.seq_len)
    }
}
