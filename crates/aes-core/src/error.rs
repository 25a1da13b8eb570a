//! Input-validation errors.

/// Errors raised when an input is rejected before it reaches the core.
///
/// Defined conventions are deliberately *not* errors: `inverse(0) = 0`,
/// non-bijective tables (metrics stay defined, decryption degrades), and
/// malformed PKCS#7 padding on decrypt (the raw buffer passes through).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A substitution table did not hold exactly 256 entries.
    #[error("substitution table must have 256 entries, got {0}")]
    TableLength(usize),

    /// A cipher key was not 16, 24, or 32 bytes.
    #[error("cipher key must be 16, 24, or 32 bytes, got {0}")]
    KeyLength(usize),

    /// A ciphertext buffer was not block-aligned.
    #[error("ciphertext length must be a multiple of 16, got {0}")]
    BufferLength(usize),

    /// An affine matrix was not 8 rows of 8 entries.
    #[error("affine matrix must be 8 rows of 8 bits")]
    MatrixShape,

    /// A matrix entry was neither 0 nor 1.
    #[error("matrix entries must be 0 or 1, got {0}")]
    MatrixEntry(u8),
}
