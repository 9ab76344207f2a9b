//! A bounded-memory streaming histogram.
mod histogram;
pub use histogram::{Bin, BuildError, StreamingHistogram};
