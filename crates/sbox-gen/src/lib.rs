//! Affine S-box construction primitives.
//!
//! This crate builds 256-entry substitution tables from an 8×8 GF(2) matrix,
//! an 8-bit constant, and a reducing polynomial, the same way the AES S-box
//! is defined; the standard matrix and constant reproduce the FIPS-197 table
//! byte for byte. A per-bit trace exposes the construction of any entry for
//! audit renderers.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod affine;
mod matrix;

pub use affine::{
    aes_affine_matrix, build_sbox, trace_construction, ConstructionTrace, RowParity,
    AES_AFFINE_CONSTANT,
};
pub use matrix::Matrix8;
