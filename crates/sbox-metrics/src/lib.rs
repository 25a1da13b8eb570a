//! Cryptanalytic scoring of 256-entry substitution tables.
//!
//! Builds the standard evaluation battery on two shared primitives: the
//! Walsh–Hadamard transform and exhaustive 256×256 table construction.
//! Everything is a pure function of the table — nothing here mutates its
//! inputs, so independent metrics are safe to run concurrently, and
//! [`analyze`] does exactly that.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod metrics;
mod report;
mod tables;
mod wht;

pub use metrics::{
    algebraic_degree, balance, bic_nonlinearity, bic_sac, correlation_immunity, dap,
    differential_uniformity, lap, nonlinearity, sac, transparency_order, BitBalance,
};
pub use report::{analyze, MetricsReport};
pub use tables::{ddt, lat, Ddt, Lat};
pub use wht::{component_signal, walsh_hadamard, POINTS};
