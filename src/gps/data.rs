// src/gps/data.rs
//! Snapshot of driver state for display and JSON output

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

/// Point-in-time status record assembled from the driver.
///
/// This is a plain value: cloning or serializing it never touches the
/// receiver, and the time fields are only present when the driver vouched
/// for them at capture time.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GpsSnapshot {
    /// Wall-clock instant the snapshot was taken.
    pub captured_at: Option<DateTime<Utc>>,
    /// Serial device the driver is reading.
    pub device: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub altitude: Option<f64>,
    /// Whether the position above is a current, trusted fix.
    pub has_fix: bool,
    pub fix_age_ms: Option<u64>,
    pub satellites: Option<u32>,
    pub hdop: Option<f64>,
    /// Meters accumulated by the odometer since driver start.
    pub odometer_m: f64,
    /// Receiver-derived UTC timestamp, when currently trustworthy.
    pub time_utc: Option<NaiveDateTime>,
    pub time_age_ms: Option<u64>,
    pub pps_synced: bool,
    pub chars_processed: u64,
    pub sentences_decoded: u64,
    pub failed_sentences: u64,
    /// Most recent raw sentence, for diagnostics.
    pub last_sentence: String,
}

impl GpsSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn odometer_km(&self) -> f64 {
        self.odometer_m / 1000.0
    }

    /// Format coordinate for display
    pub fn format_coordinate(coord: Option<f64>) -> String {
        match coord {
            Some(val) => format!("{:>12.6}°", val),
            None => "No fix".to_string(),
        }
    }

    /// Format value with unit for display
    pub fn format_value<T: std::fmt::Display>(value: Option<T>, unit: &str) -> String {
        match value {
            Some(val) => format!("{:>12} {}", val, unit),
            None => "Unknown".to_string(),
        }
    }

    /// One-word health verdict on the incoming sentence stream.
    pub fn stream_health(&self) -> &'static str {
        if self.chars_processed == 0 {
            "Silent"
        } else if self.sentences_decoded == 0 {
            "Garbled"
        } else if self.failed_sentences > self.sentences_decoded {
            "Noisy"
        } else {
            "OK"
        }
    }
}
