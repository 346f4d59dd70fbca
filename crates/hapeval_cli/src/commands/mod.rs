//! Subcommand drivers.

pub mod bitrate;
pub mod check_data;
pub mod conformance;
pub mod fmt_sources;
pub mod psnr;
pub mod submission;
