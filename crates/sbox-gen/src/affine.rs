//! Affine S-box construction.
//!
//! Each table entry is `S[x] = (K · bits(x⁻¹) mod 2) XOR c` with the field
//! inverse taken modulo the reducing polynomial and bit vectors packed LSB
//! first. With the standard AES matrix and constant this reproduces the
//! FIPS-197 table exactly.

use aes_core::{gf256, SBox};
use serde::{Deserialize, Serialize};

use crate::matrix::Matrix8;

/// The AES affine constant 0x63.
pub const AES_AFFINE_CONSTANT: u8 = 0x63;

/// The standard AES affine matrix: output bit `i` sums input bits
/// `{i, i+4, i+5, i+6, i+7 mod 8}` of the field inverse.
pub fn aes_affine_matrix() -> Matrix8 {
    Matrix8::from_rows([0xF1, 0xE3, 0xC7, 0x8F, 0x1F, 0x3E, 0x7C, 0xF8])
}

/// Builds a substitution table from an affine transform over field inverses.
///
/// `inverse(0) = 0` by convention, matching AES's treatment of the zero
/// element, so `S[0] = constant` for any matrix.
pub fn build_sbox(matrix: &Matrix8, constant: u8, poly: u16) -> SBox {
    let mut table = [0u8; 256];
    for (x, entry) in table.iter_mut().enumerate() {
        let inv = gf256::inverse(x as u8, poly);
        *entry = matrix.apply(inv) ^ constant;
    }
    SBox::new(table)
}

/// Parity breakdown of one matrix row applied to the inverse bit vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowParity {
    /// The matrix row as 0/1 coefficients, LSB first.
    pub row_bits: [u8; 8],
    /// Bitwise AND of the row with the inverse vector.
    pub and_bits: [u8; 8],
    /// Parity of the AND, i.e. the resulting output bit before the constant.
    pub parity: u8,
}

/// Per-bit audit view of one table entry's construction.
///
/// A pure view over [`build_sbox`]: `output` always equals the constructed
/// table entry for the same parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionTrace {
    /// The input byte.
    pub input: u8,
    /// Input bits, LSB first.
    pub input_bits: [u8; 8],
    /// Field inverse of the input (0 for input 0 by convention).
    pub inverse: u8,
    /// Inverse bits, LSB first.
    pub inverse_bits: [u8; 8],
    /// Product `input · inverse`; 1 exactly when a true inverse exists, 0
    /// only for the zero-input convention.
    pub inverse_check: u8,
    /// Row-by-row matrix multiplication breakdown.
    pub rows: [RowParity; 8],
    /// Constant bits, LSB first.
    pub constant_bits: [u8; 8],
    /// Output bits after the constant XOR, LSB first.
    pub output_bits: [u8; 8],
    /// The packed table entry.
    pub output: u8,
}

/// Traces the construction of a single table entry bit by bit.
pub fn trace_construction(matrix: &Matrix8, constant: u8, poly: u16, x: u8) -> ConstructionTrace {
    let inverse = gf256::inverse(x, poly);
    let inverse_bits = bits(inverse);

    let mut rows = [RowParity {
        row_bits: [0; 8],
        and_bits: [0; 8],
        parity: 0,
    }; 8];
    let mut product = 0u8;
    for (i, packed_row) in matrix.rows().iter().enumerate() {
        let row_bits = bits(*packed_row);
        let and_bits = bits(packed_row & inverse);
        let parity = (packed_row & inverse).count_ones() as u8 & 1;
        product |= parity << i;
        rows[i] = RowParity {
            row_bits,
            and_bits,
            parity,
        };
    }

    let output = product ^ constant;
    ConstructionTrace {
        input: x,
        input_bits: bits(x),
        inverse,
        inverse_bits,
        inverse_check: gf256::multiply(x, inverse, poly),
        rows,
        constant_bits: bits(constant),
        output_bits: bits(output),
        output,
    }
}

fn bits(value: u8) -> [u8; 8] {
    let mut out = [0u8; 8];
    for (i, bit) in out.iter_mut().enumerate() {
        *bit = (value >> i) & 1;
    }
    out
}
