// src/gps/decoder.rs
//! Incremental NMEA decoding with per-field freshness tracking

use super::clock::Clock;
use log::debug;
use nmea::sentences::FixType;
use nmea::{Nmea, SentenceType};

/// Longest sentence the accumulator will hold before assuming the stream
/// lost framing and resyncing. The NMEA line limit is 82 characters; the
/// slack covers receivers that pad proprietary sentences.
const MAX_SENTENCE_LEN: usize = 120;

/// Mean Earth radius in meters, as used by the haversine distance below.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Byte-at-a-time NMEA decoder.
///
/// Wraps the `nmea` crate's sentence parser with line accumulation and a
/// freshness stamp per field group (position, time-of-day, date). The parser
/// keeps reporting the last decoded values after the receiver loses signal,
/// so every consumer must pair a value with its age; the stamps are what
/// make that possible.
pub struct NmeaDecoder<C: Clock> {
    parser: Nmea,
    line: String,
    clock: C,
    position_stamp: Option<u64>,
    time_stamp: Option<u64>,
    date_stamp: Option<u64>,
    chars_processed: u64,
    sentences_decoded: u64,
    failed_sentences: u64,
    last_sentence: String,
}

impl<C: Clock> NmeaDecoder<C> {
    pub fn new(clock: C) -> Self {
        Self {
            parser: Nmea::default(),
            line: String::new(),
            clock,
            position_stamp: None,
            time_stamp: None,
            date_stamp: None,
            chars_processed: 0,
            sentences_decoded: 0,
            failed_sentences: 0,
            last_sentence: String::new(),
        }
    }

    /// Feed one byte from the serial stream. Returns true when the byte
    /// completed a checksum-valid sentence.
    pub fn feed(&mut self, byte: u8) -> bool {
        self.chars_processed += 1;
        if !byte.is_ascii() {
            return false;
        }
        match byte {
            b'\r' => false,
            b'\n' => self.finish_line(),
            b'$' => {
                // Start of sentence; anything accumulated before it was
                // noise or a fragment.
                self.line.clear();
                self.line.push('$');
                false
            }
            _ => {
                if self.line.len() >= MAX_SENTENCE_LEN {
                    // Lost framing; drop the fragment and resync on the
                    // next line terminator or sentence start.
                    self.line.clear();
                    self.failed_sentences += 1;
                }
                self.line.push(char::from(byte));
                false
            }
        }
    }

    fn finish_line(&mut self) -> bool {
        if self.line.is_empty() {
            return false;
        }
        let decoded = if self.line.starts_with('$') {
            match self.parser.parse(&self.line) {
                Ok(kind) => {
                    self.sentences_decoded += 1;
                    self.stamp(kind);
                    true
                }
                Err(e) => {
                    self.failed_sentences += 1;
                    debug!("discarded sentence: {}", e);
                    false
                }
            }
        } else {
            false
        };
        self.last_sentence.clear();
        self.last_sentence.push_str(&self.line);
        self.line.clear();
        decoded
    }

    /// Record which field groups the committed sentence refreshed.
    fn stamp(&mut self, kind: SentenceType) {
        let now = self.clock.now_ms();
        if matches!(
            kind,
            SentenceType::GGA | SentenceType::RMC | SentenceType::GLL
        ) {
            if self.parser.latitude.is_some() && self.parser.longitude.is_some() {
                self.position_stamp = Some(now);
            }
            if self.parser.fix_time.is_some() {
                self.time_stamp = Some(now);
            }
        }
        if matches!(kind, SentenceType::RMC) && self.parser.fix_date.is_some() {
            self.date_stamp = Some(now);
        }
    }

    pub fn latitude(&self) -> Option<f64> {
        self.parser.latitude
    }

    pub fn longitude(&self) -> Option<f64> {
        self.parser.longitude
    }

    pub fn altitude(&self) -> Option<f64> {
        self.parser.altitude.map(f64::from)
    }

    /// True when the receiver claims a usable fix and a position has been
    /// decoded. Staleness is the caller's problem; see [`Self::location_age_ms`].
    pub fn location_valid(&self) -> bool {
        let fixed = !matches!(self.parser.fix_type, None | Some(FixType::Invalid));
        fixed && self.parser.latitude.is_some() && self.parser.longitude.is_some()
    }

    pub fn location_age_ms(&self) -> Option<u64> {
        self.position_stamp.map(|t| self.clock.elapsed_since(t))
    }

    pub fn time_valid(&self) -> bool {
        self.parser.fix_time.is_some()
    }

    pub fn time_age_ms(&self) -> Option<u64> {
        self.time_stamp.map(|t| self.clock.elapsed_since(t))
    }

    pub fn date_valid(&self) -> bool {
        self.parser.fix_date.is_some()
    }

    pub fn date_age_ms(&self) -> Option<u64> {
        self.date_stamp.map(|t| self.clock.elapsed_since(t))
    }

    pub fn date(&self) -> Option<chrono::NaiveDate> {
        self.parser.fix_date
    }

    pub fn time(&self) -> Option<chrono::NaiveTime> {
        self.parser.fix_time
    }

    /// Sub-second remainder of the decoded time-of-day, in centiseconds.
    pub fn centiseconds(&self) -> u32 {
        use chrono::Timelike;
        self.parser
            .fix_time
            .map_or(0, |t| t.nanosecond() / 10_000_000)
    }

    pub fn satellites(&self) -> Option<u32> {
        self.parser.num_of_fix_satellites
    }

    pub fn hdop(&self) -> Option<f64> {
        self.parser.hdop.map(f64::from)
    }

    pub fn chars_processed(&self) -> u64 {
        self.chars_processed
    }

    pub fn sentences_decoded(&self) -> u64 {
        self.sentences_decoded
    }

    pub fn failed_sentences(&self) -> u64 {
        self.failed_sentences
    }

    /// Most recently completed raw sentence, for diagnostics only.
    pub fn last_sentence(&self) -> &str {
        &self.last_sentence
    }
}

/// Great-circle surface distance in meters between two positions given in
/// decimal degrees (haversine over the mean Earth radius).
pub fn distance_between(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().asin()
}
