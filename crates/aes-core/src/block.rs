//! Block representation helpers.

/// Cipher block of 16 bytes.
///
/// The flat layout is the column-major state: `state[r][c] = block[r + 4c]`.
pub type Block = [u8; 16];

/// XORs `rhs` into `dst`.
#[inline]
pub fn xor_in_place(dst: &mut Block, rhs: &Block) {
    for (d, r) in dst.iter_mut().zip(rhs.iter()) {
        *d ^= *r;
    }
}
