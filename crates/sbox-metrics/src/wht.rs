//! Walsh–Hadamard transform over 256-point ±1 signals.
//!
//! The single spectral primitive behind nonlinearity, BIC-NL, LAP,
//! transparency order, and the LAT: implemented once, reused everywhere.

use aes_core::SBox;

/// Transform size: 2^8 points for 8-bit boolean functions.
pub const POINTS: usize = 256;

/// Computes the Walsh–Hadamard transform of a ±1 signal.
///
/// Iterative in-place butterfly with doubling stride; equivalent to the
/// textbook definition `WHT[w] = Σ_x f[x] · (-1)^parity(w & x)`, with the
/// spectrum bounded by ±256.
pub fn walsh_hadamard(signal: &[i32; POINTS]) -> [i32; POINTS] {
    let mut spectrum = *signal;
    let mut stride = 1;
    while stride < POINTS {
        for start in (0..POINTS).step_by(stride * 2) {
            for i in start..start + stride {
                let left = spectrum[i];
                let right = spectrum[i + stride];
                spectrum[i] = left + right;
                spectrum[i + stride] = left - right;
            }
        }
        stride *= 2;
    }
    spectrum
}

/// Builds the ±1 signal of the component function `parity(mask AND S(x))`:
/// +1 where the parity is 0, -1 where it is 1.
pub fn component_signal(sbox: &SBox, mask: u8) -> [i32; POINTS] {
    let mut signal = [0i32; POINTS];
    for (x, slot) in signal.iter_mut().enumerate() {
        let parity = (sbox.apply(x as u8) & mask).count_ones() & 1;
        *slot = if parity == 0 { 1 } else { -1 };
    }
    signal
}

/// Largest absolute spectral value of a component function.
pub(crate) fn spectral_radius(sbox: &SBox, mask: u8) -> i32 {
    let spectrum = walsh_hadamard(&component_signal(sbox, mask));
    spectrum.iter().map(|v| v.abs()).max().unwrap_or(0)
}
