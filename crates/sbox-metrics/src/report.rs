//! Aggregate metric reports.

use aes_core::SBox;
use serde::{Deserialize, Serialize};

use crate::metrics::{
    algebraic_degree, balance, bic_nonlinearity, bic_sac, correlation_immunity, lap, nonlinearity,
    sac, transparency_order, BitBalance,
};
use crate::tables::ddt;

/// Every scalar score of one table, plus bijectivity and per-bit balance.
///
/// Serializable for external renderers; `PartialEq` so recomputation can be
/// checked to be identical.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    /// All 256 outputs pairwise distinct.
    pub bijective: bool,
    /// Zero/one counts per output bit.
    pub balance: [BitBalance; 8],
    /// Minimum coordinate-function nonlinearity.
    pub nonlinearity: u32,
    /// Strict avalanche criterion, ideal 0.5.
    pub sac: f64,
    /// Minimum pairwise-XOR nonlinearity.
    pub bic_nonlinearity: u32,
    /// Pairwise avalanche independence, ideal 0.5.
    pub bic_sac: f64,
    /// Largest DDT entry over nonzero input differences.
    pub differential_uniformity: u16,
    /// Differential approximation probability.
    pub dap: f64,
    /// Linear approximation probability.
    pub lap: f64,
    /// Maximum coordinate-function algebraic degree.
    pub algebraic_degree: u32,
    /// Transparency order.
    pub transparency_order: f64,
    /// Minimum coordinate-function correlation immunity.
    pub correlation_immunity: u32,
}

/// Computes the full report, running independent metric groups as parallel
/// tasks.
///
/// Every metric is a pure function of the read-only table, so the tasks
/// need no synchronization and the result is identical to calling each
/// metric sequentially.
pub fn analyze(sbox: &SBox) -> MetricsReport {
    // The spectral metrics (many transforms each) in one fork, the
    // enumeration metrics in the other.
    let ((nl, bic_nl), (lap_score, to)) = rayon::join(
        || rayon::join(|| nonlinearity(sbox), || bic_nonlinearity(sbox)),
        || rayon::join(|| lap(sbox), || transparency_order(sbox)),
    );
    let ((sac_score, bic_sac_score), (du, (degree, ci))) = rayon::join(
        || rayon::join(|| sac(sbox), || bic_sac(sbox)),
        || {
            rayon::join(
                || ddt(sbox).differential_uniformity(),
                || rayon::join(|| algebraic_degree(sbox), || correlation_immunity(sbox)),
            )
        },
    );

    MetricsReport {
        bijective: sbox.is_bijective(),
        balance: balance(sbox),
        nonlinearity: nl,
        sac: sac_score,
        bic_nonlinearity: bic_nl,
        bic_sac: bic_sac_score,
        differential_uniformity: du,
        dap: f64::from(du) / 256.0,
        lap: lap_score,
        algebraic_degree: degree,
        transparency_order: to,
        correlation_immunity: ci,
    }
}
