//! hapeval core - evaluation engine for a haptic signal codec.
//!
//! This crate contains all evaluation logic with zero CLI dependencies:
//! signal alignment and PSNR, bitrate computation, Bjontegaard delta
//! comparison, encode/decode/synthesize pipeline orchestration,
//! conformance checking, and report writing. It is driven by the
//! `hapeval` binary or by integration tests.

pub mod config;
pub mod conformance;
pub mod integrity;
pub mod metrics;
pub mod pipeline;
pub mod report;
pub mod signal;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
