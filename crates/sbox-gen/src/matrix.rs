//! 8×8 matrices over GF(2).

use aes_core::Error;

/// 8×8 binary matrix, stored row-major with each row packed into a `u8`,
/// bit `j` of a row holding the coefficient for input bit `j` (LSB first).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Matrix8 {
    rows: [u8; 8],
}

impl Matrix8 {
    /// Builds a matrix from pre-packed rows.
    pub const fn from_rows(rows: [u8; 8]) -> Self {
        Self { rows }
    }

    /// Builds a matrix from explicit 0/1 entries, one slice per row.
    ///
    /// Rejects anything that is not 8 rows of 8 entries, and any entry other
    /// than 0 or 1; validation happens here so nothing downstream has to
    /// re-check shape.
    pub fn from_bits(rows: &[Vec<u8>]) -> Result<Self, Error> {
        if rows.len() != 8 || rows.iter().any(|row| row.len() != 8) {
            return Err(Error::MatrixShape);
        }
        let mut packed = [0u8; 8];
        for (row_idx, row) in rows.iter().enumerate() {
            for (bit, &entry) in row.iter().enumerate() {
                match entry {
                    0 => {}
                    1 => packed[row_idx] |= 1u8 << bit,
                    other => return Err(Error::MatrixEntry(other)),
                }
            }
        }
        Ok(Self { rows: packed })
    }

    /// Returns the identity matrix.
    pub fn identity() -> Self {
        let mut rows = [0u8; 8];
        for (i, row) in rows.iter_mut().enumerate() {
            *row = 1u8 << i;
        }
        Self { rows }
    }

    /// Applies the matrix to an 8-bit value, treating bits as a column
    /// vector: output bit `i` is the parity of `row_i AND value`.
    pub fn apply(&self, value: u8) -> u8 {
        let mut out = 0u8;
        for (row_idx, row) in self.rows.iter().enumerate() {
            let parity = (row & value).count_ones() as u8 & 1;
            out |= parity << row_idx;
        }
        out
    }

    /// Exposes the packed rows (LSB-first bit order within each byte).
    pub fn rows(&self) -> &[u8; 8] {
        &self.rows
    }
}
