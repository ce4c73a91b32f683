// src/lib.rs
//! u-blox GPS Receiver Driver
//!
//! A serial GPS receiver driver that decodes interleaved NMEA text and UBX
//! binary acknowledgements from one byte stream, tracks fix and time
//! freshness, reconciles satellite time with a pulse-per-second signal,
//! accumulates odometry, and issues checksummed UBX configuration commands.

pub mod config;
pub mod display;
pub mod error;
pub mod gps;
pub mod monitor;

// Re-export main types for convenience
pub use error::{GpsError, Result};
pub use gps::data::GpsSnapshot;
pub use gps::driver::{GpsDriver, TimeSample};
pub use gps::pps::PpsSignal;
pub use gps::transport::Transport;
pub use gps::ubx::{DynamicModel, PowerMode};
pub use monitor::GpsMonitor;
