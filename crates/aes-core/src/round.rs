//! Round transformations over the cipher state.
//!
//! All transforms work in place on the flat column-major [`Block`] and take
//! the active substitution table as a parameter where substitution applies.

use crate::block::{xor_in_place, Block};
use crate::gf256::{self, AES_POLY};
use crate::sbox::SBox;

/// Substitutes every state byte through the active table.
#[inline]
pub fn sub_bytes(state: &mut Block, sbox: &SBox) {
    for byte in state.iter_mut() {
        *byte = sbox.apply(*byte);
    }
}

/// Substitutes through the inverse table (see [`SBox::inverse_table`]).
#[inline]
pub fn inv_sub_bytes(state: &mut Block, inv_sbox: &SBox) {
    for byte in state.iter_mut() {
        *byte = inv_sbox.apply(*byte);
    }
}

/// Rotates row `i` left by `i` positions.
#[inline]
pub fn shift_rows(state: &mut Block) {
    let mut tmp = [0u8; 16];
    tmp[0] = state[0];
    tmp[1] = state[5];
    tmp[2] = state[10];
    tmp[3] = state[15];

    tmp[4] = state[4];
    tmp[5] = state[9];
    tmp[6] = state[14];
    tmp[7] = state[3];

    tmp[8] = state[8];
    tmp[9] = state[13];
    tmp[10] = state[2];
    tmp[11] = state[7];

    tmp[12] = state[12];
    tmp[13] = state[1];
    tmp[14] = state[6];
    tmp[15] = state[11];

    *state = tmp;
}

/// Rotates row `i` right by `i` positions.
#[inline]
pub fn inv_shift_rows(state: &mut Block) {
    let mut tmp = [0u8; 16];
    tmp[0] = state[0];
    tmp[1] = state[13];
    tmp[2] = state[10];
    tmp[3] = state[7];

    tmp[4] = state[4];
    tmp[5] = state[1];
    tmp[6] = state[14];
    tmp[7] = state[11];

    tmp[8] = state[8];
    tmp[9] = state[5];
    tmp[10] = state[2];
    tmp[11] = state[15];

    tmp[12] = state[12];
    tmp[13] = state[9];
    tmp[14] = state[6];
    tmp[15] = state[3];

    *state = tmp;
}

fn xtime(byte: u8) -> u8 {
    let shifted = byte << 1;
    if byte & 0x80 != 0 {
        shifted ^ 0x1b
    } else {
        shifted
    }
}

// [2 3 1 1; 1 2 3 1; 1 1 2 3; 3 1 1 2] · column over GF(2^8).
fn mix_single_column(col: &mut [u8; 4]) {
    let [a0, a1, a2, a3] = *col;
    col[0] = xtime(a0) ^ (xtime(a1) ^ a1) ^ a2 ^ a3;
    col[1] = a0 ^ xtime(a1) ^ (xtime(a2) ^ a2) ^ a3;
    col[2] = a0 ^ a1 ^ xtime(a2) ^ (xtime(a3) ^ a3);
    col[3] = (xtime(a0) ^ a0) ^ a1 ^ a2 ^ xtime(a3);
}

// [14 11 13 9; 9 14 11 13; 13 9 14 11; 11 13 9 14] · column over GF(2^8).
fn inv_mix_single_column(col: &mut [u8; 4]) {
    let mul = |a, b| gf256::multiply(a, b, AES_POLY);
    let [a0, a1, a2, a3] = *col;
    col[0] = mul(a0, 0x0e) ^ mul(a1, 0x0b) ^ mul(a2, 0x0d) ^ mul(a3, 0x09);
    col[1] = mul(a0, 0x09) ^ mul(a1, 0x0e) ^ mul(a2, 0x0b) ^ mul(a3, 0x0d);
    col[2] = mul(a0, 0x0d) ^ mul(a1, 0x09) ^ mul(a2, 0x0e) ^ mul(a3, 0x0b);
    col[3] = mul(a0, 0x0b) ^ mul(a1, 0x0d) ^ mul(a2, 0x09) ^ mul(a3, 0x0e);
}

/// MixColumns over all four columns.
#[inline]
pub fn mix_columns(state: &mut Block) {
    for col in 0..4 {
        let idx = col * 4;
        let mut column = [state[idx], state[idx + 1], state[idx + 2], state[idx + 3]];
        mix_single_column(&mut column);
        state[idx..idx + 4].copy_from_slice(&column);
    }
}

/// Inverse MixColumns over all four columns.
#[inline]
pub fn inv_mix_columns(state: &mut Block) {
    for col in 0..4 {
        let idx = col * 4;
        let mut column = [state[idx], state[idx + 1], state[idx + 2], state[idx + 3]];
        inv_mix_single_column(&mut column);
        state[idx..idx + 4].copy_from_slice(&column);
    }
}

/// Adds (XORs) a round key into the state; self-inverse.
#[inline]
pub fn add_round_key(state: &mut Block, round_key: &Block) {
    xor_in_place(state, round_key);
}
