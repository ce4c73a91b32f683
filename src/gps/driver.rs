// src/gps/driver.rs
//! GPS receiver driver: stream dispatch, fix/time queries, UBX commands

use super::clock::{Clock, SystemClock};
use super::data::GpsSnapshot;
use super::decoder::{distance_between, NmeaDecoder};
use super::pps::PpsSignal;
use super::transport::{SerialTransport, Transport};
use super::ubx::{self, AckCapture, AckOutcome, DynamicModel, PowerMode};
use chrono::{NaiveDateTime, NaiveTime, Timelike};
use log::{error, info, warn};
use serde::Serialize;
use std::thread;
use std::time::Duration;

/// Line speed the receivers ship with.
pub const GPS_BAUD_RATE: u32 = 9600;

/// Per-call ceiling on the stream drain loop. The driver shares its thread
/// with other periodic work, so a single poll must never hog it even when
/// the receive buffer is deep.
const POLL_BUDGET_MS: u64 = 10;

/// How long to wait for the rest of an intercepted ACK/NAK frame.
const ACK_WAIT_MS: u64 = 200;

/// Oldest pulse edge still considered to mark the current second.
const PPS_MAX_AGE_MS: u64 = 1000;

/// Oldest decoded time/date still trusted for a timestamp answer.
const MAX_TIMESTAMP_AGE_MS: u64 = 3000;

/// Coordinates this close to 0°,0° are treated as a never-written reference
/// position rather than a real fix off the coast of Africa.
const UNSET_COORD_EPS_DEG: f64 = 0.0001;

/// In-band sentinel for "no distance available".
const NO_DISTANCE: f64 = -1.0;

/// A trusted UTC timestamp assembled from the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimeSample {
    /// Calendar date and whole-second time of day.
    pub utc: NaiveDateTime,
    /// How far in the past the timestamp's second boundary lies.
    pub age_ms: u64,
    /// Whether the age was anchored to a hardware pulse edge instead of the
    /// sentence arrival time.
    pub pps_synced: bool,
}

struct GpsLink<C: Clock> {
    decoder: NmeaDecoder<C>,
    transport: Box<dyn Transport>,
}

enum StreamMode {
    Normal,
    BinaryFrame { capture: AckCapture, deadline: u64 },
}

/// Driver for a u-blox GPS receiver on a byte-oriented serial link.
///
/// A caller (scheduler tick, monitor task) drives [`GpsDriver::poll`]
/// periodically and reads fixes, timestamps and odometry through the query
/// methods. Decoder and transport live and die together: every operation
/// short-circuits to a failure result while the driver is uninitialized, so
/// missing hardware degrades to "no data" instead of undefined behavior.
pub struct GpsDriver<C: Clock = SystemClock> {
    link: Option<GpsLink<C>>,
    last_latitude: f64,
    last_longitude: f64,
    total_distance_m: f64,
    pps: PpsSignal,
    clock: C,
}

impl GpsDriver<SystemClock> {
    pub fn new(pps: PpsSignal) -> Self {
        Self::with_clock(SystemClock::new(), pps)
    }
}

impl<C: Clock> GpsDriver<C> {
    pub fn with_clock(clock: C, pps: PpsSignal) -> Self {
        Self {
            link: None,
            last_latitude: 0.0,
            last_longitude: 0.0,
            total_distance_m: 0.0,
            pps,
            clock,
        }
    }

    /// Bring the driver up on a serial device.
    ///
    /// A negative RX pin is a wiring misconfiguration and fails before any
    /// existing state is touched. A negative TX pin opens the port with the
    /// transmit path disabled. Failure to open the port is recoverable: the
    /// driver is left uninitialized and a later reconfiguration may retry.
    pub fn initialize(&mut self, device: &str, rx_pin: i16, tx_pin: i16) -> bool {
        if rx_pin < 0 {
            error!("refusing to start GPS, invalid RX pin {}", rx_pin);
            return false;
        }
        self.reset();
        let transport = match SerialTransport::open(device, GPS_BAUD_RATE, tx_pin >= 0) {
            Ok(transport) => transport,
            Err(e) => {
                error!("failed to open GPS device {}: {}", device, e);
                return false;
            }
        };
        self.attach(Box::new(transport));
        if let Some(link) = self.link.as_mut() {
            if let Err(e) = link.transport.configure(GPS_BAUD_RATE) {
                warn!("could not set GPS baud rate: {}", e);
            }
        }
        self.wake();
        self.is_initialized()
    }

    /// Adopt an already-open transport, pairing it with a fresh decoder.
    /// This is the seam for callers that provide their own link.
    pub fn attach(&mut self, transport: Box<dyn Transport>) {
        self.link = Some(GpsLink {
            decoder: NmeaDecoder::new(self.clock.clone()),
            transport,
        });
    }

    /// Release decoder and transport. Safe to call repeatedly.
    pub fn reset(&mut self) {
        self.link = None;
    }

    pub fn is_initialized(&self) -> bool {
        self.link.is_some()
    }

    /// Drain the receive stream, dispatching bytes between the NMEA decoder
    /// and the binary ACK interceptor. Returns true when at least one
    /// complete, checksum-valid sentence was decoded during this call.
    ///
    /// The drain stops after [`POLL_BUDGET_MS`] even with bytes still
    /// buffered; an intercepted binary frame may extend a single call up to
    /// its own [`ACK_WAIT_MS`] deadline while it waits for the frame tail.
    pub fn poll(&mut self) -> bool {
        let clock = self.clock.clone();
        let Some(link) = self.link.as_mut() else {
            return false;
        };
        let started = clock.now_ms();
        let mut decoded = false;
        let mut mode = StreamMode::Normal;

        loop {
            match mode {
                StreamMode::Normal => {
                    if clock.elapsed_since(started) >= POLL_BUDGET_MS
                        || link.transport.available() == 0
                    {
                        break;
                    }
                    let Some(byte) = link.transport.read_byte() else {
                        break;
                    };
                    if byte == ubx::ACK_LEAD_IN {
                        mode = StreamMode::BinaryFrame {
                            capture: AckCapture::new(),
                            deadline: clock.now_ms() + ACK_WAIT_MS,
                        };
                    } else if link.decoder.feed(byte) {
                        decoded = true;
                    }
                }
                StreamMode::BinaryFrame {
                    ref mut capture,
                    deadline,
                } => {
                    if clock.now_ms() >= deadline {
                        error!("timed out waiting for receiver acknowledgement");
                        mode = StreamMode::Normal;
                        continue;
                    }
                    if link.transport.available() == 0 {
                        thread::sleep(Duration::from_millis(1));
                        continue;
                    }
                    let Some(byte) = link.transport.read_byte() else {
                        continue;
                    };
                    if let Some(outcome) = capture.offer(byte) {
                        match outcome {
                            AckOutcome::Ack => info!("receiver acknowledged command"),
                            AckOutcome::Nack => error!("receiver rejected command"),
                            AckOutcome::Unexpected => {
                                error!("unexpected reply in acknowledgement frame")
                            }
                            AckOutcome::Abandoned => {}
                        }
                        mode = StreamMode::Normal;
                    }
                }
            }
        }
        decoded
    }

    /// True when the receiver reports a valid position younger than
    /// `max_age_ms`. The age check matters: the decoder keeps serving the
    /// last known position long after the antenna goes dark.
    pub fn has_fix(&self, max_age_ms: u64) -> bool {
        match &self.link {
            None => false,
            Some(link) => {
                link.decoder.location_valid()
                    && link
                        .decoder
                        .location_age_ms()
                        .map_or(false, |age| age < max_age_ms)
            }
        }
    }

    /// Fold the distance travelled since the stored reference position into
    /// the odometer, then move the reference to the current position.
    pub fn store_current_position(&mut self, max_age_ms: u64) -> bool {
        if !self.has_fix(max_age_ms) {
            return false;
        }
        // Distance must be computed against the old reference before it is
        // overwritten; the unset-reference sentinel is skipped so the
        // odometer never runs backwards.
        let delta = self.distance_since_last(max_age_ms);
        if delta > 0.0 {
            self.total_distance_m += delta;
        }
        let Some(link) = self.link.as_ref() else {
            return false;
        };
        let (Some(lat), Some(lon)) = (link.decoder.latitude(), link.decoder.longitude()) else {
            return false;
        };
        self.last_latitude = lat;
        self.last_longitude = lon;
        true
    }

    /// Great-circle distance in meters from the stored reference position
    /// to the current fix, or `-1.0` when there is no current fix or the
    /// reference was never stored.
    pub fn distance_since_last(&self, max_age_ms: u64) -> f64 {
        if !self.has_fix(max_age_ms) {
            return NO_DISTANCE;
        }
        if self.last_latitude.abs() < UNSET_COORD_EPS_DEG
            && self.last_longitude.abs() < UNSET_COORD_EPS_DEG
        {
            return NO_DISTANCE;
        }
        let Some(link) = self.link.as_ref() else {
            return NO_DISTANCE;
        };
        let (Some(lat), Some(lon)) = (link.decoder.latitude(), link.decoder.longitude()) else {
            return NO_DISTANCE;
        };
        distance_between(self.last_latitude, self.last_longitude, lat, lon)
    }

    /// Meters accumulated by [`Self::store_current_position`] over the life
    /// of this driver instance.
    pub fn total_distance_m(&self) -> f64 {
        self.total_distance_m
    }

    /// Assemble a trusted UTC timestamp, or `None` when the receiver's time
    /// cannot currently be trusted (stale fields, inconsistent pulse). This
    /// is the expected common failure during signal loss; callers retry on a
    /// later tick.
    ///
    /// When a pulse-per-second edge is pending it is consumed here, whether
    /// or not the call succeeds, so one pulse anchors at most one answer.
    pub fn date_time(&self) -> Option<TimeSample> {
        let link = self.link.as_ref()?;
        let decoder = &link.decoder;

        let (mut age_ms, pps_synced) = match self.pps.take() {
            Some(pulse_ms) => {
                let age = self.clock.elapsed_since(pulse_ms);
                if age > PPS_MAX_AGE_MS {
                    return None;
                }
                // A decoded time older than the pulse edge cannot describe
                // the second that edge marked.
                match decoder.time_age_ms() {
                    Some(time_age) if time_age <= age => {}
                    _ => return None,
                }
                (age, true)
            }
            None => (decoder.time_age_ms()?, false),
        };

        if age_ms > MAX_TIMESTAMP_AGE_MS {
            return None;
        }
        if decoder.date_age_ms()? > MAX_TIMESTAMP_AGE_MS {
            return None;
        }
        if !decoder.date_valid() || !decoder.time_valid() {
            return None;
        }

        let date = decoder.date()?;
        let time = decoder.time()?;
        let time = NaiveTime::from_hms_opt(time.hour(), time.minute(), time.second())?;

        if !pps_synced {
            // TODO: the sub-second remainder is only folded in on the
            // sentence-timed path. Whether the pulse-synced path should
            // carry it too is an open question for whoever owns the timing
            // requirement; tests pin the current behavior.
            age_ms += u64::from(decoder.centiseconds()) * 10;
        }

        Some(TimeSample {
            utc: NaiveDateTime::new(date, time),
            age_ms,
            pps_synced,
        })
    }

    /// Write a raw command frame to the receiver. Partial writes are a hard
    /// failure for the whole operation; nothing is retried here.
    pub fn write_command(&mut self, frame: &[u8]) -> bool {
        let Some(link) = self.link.as_mut() else {
            error!("dropping GPS command, driver not initialized");
            return false;
        };
        if !link.transport.tx_enabled() {
            error!("dropping GPS command, transmit path disabled");
            return false;
        }
        let written = link.transport.write(frame);
        if written != frame.len() {
            error!("short write to GPS, {} of {} bytes", written, frame.len());
            return false;
        }
        true
    }

    /// Put the receiver into low-power standby.
    pub fn standby(&mut self) -> bool {
        self.write_command(&ubx::STANDBY_FRAME)
    }

    /// Select one of the fixed power management modes.
    pub fn set_power_mode(&mut self, mode: PowerMode) -> bool {
        self.write_command(mode.frame())
    }

    /// Select the dynamic platform model tuning the receiver's motion
    /// filter. Reserved or undefined model codes never get here; see
    /// [`DynamicModel::from_code`].
    pub fn set_dynamic_model(&mut self, model: DynamicModel) -> bool {
        let frame = ubx::dynamic_model_frame(model);
        self.write_command(&frame)
    }

    /// Nudge a sleeping receiver back into producing output. The receiver
    /// only needs to see traffic on the line; the outcome is not observable
    /// here, so this always reports false.
    pub fn wake(&mut self) -> bool {
        if let Some(link) = self.link.as_mut() {
            if link.transport.tx_enabled() {
                let _ = link.transport.write(b"\r\n");
            }
        }
        false
    }

    /// Point-in-time status record for display and JSON output. Does not
    /// touch the pulse mailbox; time fields are merged in separately by the
    /// caller from [`Self::date_time`].
    pub fn snapshot(&self, max_fix_age_ms: u64) -> GpsSnapshot {
        let mut snap = GpsSnapshot {
            odometer_m: self.total_distance_m,
            ..GpsSnapshot::default()
        };
        if let Some(link) = self.link.as_ref() {
            let decoder = &link.decoder;
            snap.latitude = decoder.latitude();
            snap.longitude = decoder.longitude();
            snap.altitude = decoder.altitude();
            snap.has_fix = self.has_fix(max_fix_age_ms);
            snap.fix_age_ms = decoder.location_age_ms();
            snap.satellites = decoder.satellites();
            snap.hdop = decoder.hdop();
            snap.chars_processed = decoder.chars_processed();
            snap.sentences_decoded = decoder.sentences_decoded();
            snap.failed_sentences = decoder.failed_sentences();
            snap.last_sentence = decoder.last_sentence().to_string();
        }
        snap
    }
}

impl<C: Clock> Drop for GpsDriver<C> {
    fn drop(&mut self) {
        // Courtesy power-down; the receiver not hearing it only costs power.
        if self.link.is_some() {
            let _ = self.standby();
            self.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gps::clock::ManualClock;
    use crate::gps::transport::mock::MockTransport;

    const GGA_A: &str = "$GPGGA,092750.000,5321.6802,N,00630.3372,W,1,8,1.03,61.7,M,55.2,M,,*76\r\n";
    const GGA_B: &str = "$GPGGA,092751.000,5321.7802,N,00630.3372,W,1,8,1.03,61.7,M,55.2,M,,*76\r\n";
    const RMC: &str = "$GPRMC,092750.000,A,5321.6802,N,00630.3372,W,0.02,31.66,280511,,,A*43\r\n";
    const RMC_CENTIS: &str =
        "$GPRMC,092751.350,A,5321.6802,N,00630.3372,W,0.02,31.66,280511,,,A*44\r\n";

    /// Distance between the GGA_A and GGA_B positions (0.1' of latitude).
    const STEP_DISTANCE_M: f64 = 185.3249;

    fn driver_with_mock(clock: ManualClock) -> (GpsDriver<ManualClock>, MockTransport, PpsSignal) {
        let pps = PpsSignal::new();
        let mut driver = GpsDriver::with_clock(clock, pps.clone());
        let mock = MockTransport::new();
        driver.attach(Box::new(mock.clone()));
        (driver, mock, pps)
    }

    #[test]
    fn rejects_negative_rx_pin_without_touching_state() {
        let mut driver = GpsDriver::new(PpsSignal::new());
        assert!(!driver.initialize("/dev/ttyUSB0", -1, 4));
        assert!(!driver.is_initialized());
    }

    #[test]
    fn open_failure_leaves_driver_uninitialized() {
        let mut driver = GpsDriver::new(PpsSignal::new());
        assert!(!driver.initialize("/nonexistent/gps-port", 3, 4));
        assert!(!driver.is_initialized());
    }

    #[test]
    fn uninitialized_driver_declines_everything() {
        let mut driver = GpsDriver::with_clock(ManualClock::new(), PpsSignal::new());
        assert!(!driver.poll());
        assert!(!driver.has_fix(1000));
        assert!(!driver.store_current_position(1000));
        assert_eq!(driver.distance_since_last(1000), -1.0);
        assert!(driver.date_time().is_none());
        assert!(!driver.standby());
    }

    #[test]
    fn decodes_fix_and_stores_position() {
        let clock = ManualClock::new();
        let (mut driver, mock, _pps) = driver_with_mock(clock);

        mock.push_str(GGA_A);
        assert!(driver.poll());
        assert!(driver.has_fix(1000));
        assert!(driver.store_current_position(1000));

        // Second identical position: zero distance travelled.
        mock.push_str(GGA_A);
        assert!(driver.poll());
        assert!(driver.distance_since_last(1000).abs() < 1e-9);
    }

    #[test]
    fn fix_expires_with_age() {
        let clock = ManualClock::new();
        let (mut driver, mock, _pps) = driver_with_mock(clock.clone());

        mock.push_str(GGA_A);
        assert!(driver.poll());
        assert!(driver.has_fix(1000));
        // A zero allowance can never be satisfied, even by a fresh fix.
        assert!(!driver.has_fix(0));

        clock.advance(999);
        assert!(driver.has_fix(1000));
        clock.advance(1);
        assert!(!driver.has_fix(1000));
        assert!(!driver.store_current_position(1000));
        assert_eq!(driver.distance_since_last(1000), -1.0);
    }

    #[test]
    fn odometer_accumulates_and_never_decreases() {
        let clock = ManualClock::new();
        let (mut driver, mock, _pps) = driver_with_mock(clock);

        // First store: reference was never written, nothing accumulates.
        mock.push_str(GGA_A);
        driver.poll();
        assert_eq!(driver.distance_since_last(1000), -1.0);
        assert!(driver.store_current_position(1000));
        assert_eq!(driver.total_distance_m(), 0.0);

        // Move one step north.
        mock.push_str(GGA_B);
        driver.poll();
        let delta = driver.distance_since_last(1000);
        assert!((delta - STEP_DISTANCE_M).abs() < 0.01, "got {}", delta);
        assert!(driver.store_current_position(1000));
        assert!((driver.total_distance_m() - STEP_DISTANCE_M).abs() < 0.01);

        // Standing still must not move the odometer.
        mock.push_str(GGA_B);
        driver.poll();
        assert!(driver.store_current_position(1000));
        assert!((driver.total_distance_m() - STEP_DISTANCE_M).abs() < 0.01);
    }

    #[test]
    fn distance_is_sentinel_while_reference_unset() {
        let clock = ManualClock::new();
        let (mut driver, mock, _pps) = driver_with_mock(clock);

        mock.push_str(GGA_A);
        driver.poll();
        assert_eq!(driver.distance_since_last(1000), -1.0);
    }

    #[test]
    fn ack_frame_is_intercepted_not_decoded() {
        let clock = ManualClock::new();
        let (mut driver, mock, _pps) = driver_with_mock(clock);

        mock.push_bytes(&[0x85, 0x62, 0x05, 0x01]);
        assert!(!driver.poll());
        // None of the frame bytes reached the sentence decoder.
        assert_eq!(driver.snapshot(1000).chars_processed, 0);
    }

    #[test]
    fn abandoned_frame_resyncs_to_sentences() {
        let clock = ManualClock::new();
        let (mut driver, mock, _pps) = driver_with_mock(clock);

        mock.push_bytes(&[0x85, 0x99]);
        mock.push_str(GGA_A);
        assert!(driver.poll());
        assert!(driver.has_fix(1000));
        assert_eq!(driver.snapshot(1000).chars_processed as usize, GGA_A.len());
    }

    #[test]
    fn poll_is_bounded_under_endless_backlog() {
        let pps = PpsSignal::new();
        let mut driver = GpsDriver::new(pps);
        let mock = MockTransport::new();
        mock.saturate(b'x');
        driver.attach(Box::new(mock));

        let started = std::time::Instant::now();
        assert!(!driver.poll());
        // Budget is 10ms; allow generous scheduling slack.
        assert!(started.elapsed() < Duration::from_millis(60));
    }

    #[test]
    fn pps_pulse_is_consumed_exactly_once() {
        let clock = ManualClock::new();
        let (mut driver, mock, pps) = driver_with_mock(clock.clone());

        // Pulse marks the second boundary, then the sentences describing
        // that second arrive, then the query runs.
        clock.set(1000);
        pps.mark(1000);
        clock.set(1100);
        mock.push_str(GGA_A);
        mock.push_str(RMC);
        driver.poll();
        clock.set(1200);

        let first = driver.date_time().expect("pulse-synced sample");
        assert!(first.pps_synced);
        assert_eq!(first.age_ms, 200);

        let second = driver.date_time().expect("sentence-timed sample");
        assert!(!second.pps_synced);
        assert_eq!(second.age_ms, 100);
    }

    #[test]
    fn stale_pulse_fails_the_query() {
        let clock = ManualClock::new();
        let (mut driver, mock, pps) = driver_with_mock(clock.clone());

        clock.set(1000);
        pps.mark(1000);
        clock.set(1100);
        mock.push_str(GGA_A);
        mock.push_str(RMC);
        driver.poll();

        clock.set(2500); // pulse is now 1500ms old
        assert!(driver.date_time().is_none());
        assert!(!pps.is_pending());
    }

    #[test]
    fn decoded_time_older_than_pulse_fails_the_query() {
        let clock = ManualClock::new();
        let (mut driver, mock, pps) = driver_with_mock(clock.clone());

        // Sentences first, then a pulse claiming a later second: the decoded
        // time cannot belong to that pulse.
        clock.set(1000);
        mock.push_str(GGA_A);
        mock.push_str(RMC);
        driver.poll();
        clock.set(3000);
        pps.mark(2500);

        assert!(driver.date_time().is_none());
        assert!(!pps.is_pending());
    }

    #[test]
    fn timestamp_fields_and_calendar_values() {
        let clock = ManualClock::new();
        let (mut driver, mock, _pps) = driver_with_mock(clock.clone());

        clock.set(1000);
        mock.push_str(GGA_A);
        mock.push_str(RMC);
        driver.poll();
        clock.set(1400);

        let sample = driver.date_time().expect("sample");
        use chrono::{Datelike, Timelike};
        assert_eq!(sample.utc.year(), 2011);
        assert_eq!(sample.utc.month(), 5);
        assert_eq!(sample.utc.day(), 28);
        assert_eq!(sample.utc.hour(), 9);
        assert_eq!(sample.utc.minute(), 27);
        assert_eq!(sample.utc.second(), 50);
        assert!(!sample.pps_synced);
    }

    #[test]
    fn stale_decoded_time_fails_the_query() {
        let clock = ManualClock::new();
        let (mut driver, mock, _pps) = driver_with_mock(clock.clone());

        clock.set(1000);
        mock.push_str(GGA_A);
        mock.push_str(RMC);
        driver.poll();
        clock.set(4500); // 3500ms old, over the ceiling

        assert!(driver.date_time().is_none());
    }

    #[test]
    fn missing_date_fails_the_query() {
        let clock = ManualClock::new();
        let (mut driver, mock, _pps) = driver_with_mock(clock);

        mock.push_str(GGA_A); // time but no date
        driver.poll();
        assert!(driver.date_time().is_none());
    }

    // Pins the asymmetric sub-second handling: the sentence-timed path adds
    // the centisecond remainder to the age, the pulse-synced path does not.
    #[test]
    fn centisecond_refinement_only_on_sentence_timed_path() {
        let clock = ManualClock::new();
        let (mut driver, mock, pps) = driver_with_mock(clock.clone());

        clock.set(1000);
        mock.push_str(GGA_A);
        mock.push_str(RMC_CENTIS);
        driver.poll();
        clock.set(1200);

        let sentence_timed = driver.date_time().expect("sample");
        assert!(!sentence_timed.pps_synced);
        assert_eq!(sentence_timed.age_ms, 200 + 350);

        // Same decoder state, now anchored to a pulse that predates the
        // sentence: age is the raw pulse age.
        pps.mark(900);
        let pulse_synced = driver.date_time().expect("pulse sample");
        assert!(pulse_synced.pps_synced);
        assert_eq!(pulse_synced.age_ms, 300);
    }

    #[test]
    fn commands_reach_the_wire_intact() {
        let clock = ManualClock::new();
        let (mut driver, mock, _pps) = driver_with_mock(clock);

        assert!(driver.standby());
        assert_eq!(mock.written(), ubx::STANDBY_FRAME.to_vec());
    }

    #[test]
    fn dynamic_model_command_is_checksummed() {
        let clock = ManualClock::new();
        let (mut driver, mock, _pps) = driver_with_mock(clock);

        assert!(driver.set_dynamic_model(DynamicModel::Portable));
        let written = mock.written();
        assert_eq!(written.len(), 44);
        assert_eq!(&written[42..], &[0x52, 0x4B]);
    }

    #[test]
    fn partial_write_fails_the_command() {
        let clock = ManualClock::new();
        let (mut driver, mock, _pps) = driver_with_mock(clock);

        mock.limit_writes(10);
        assert!(!driver.standby());
    }

    #[test]
    fn disabled_tx_path_refuses_commands() {
        let clock = ManualClock::new();
        let pps = PpsSignal::new();
        let mut driver = GpsDriver::with_clock(clock, pps);
        let mock = MockTransport::with_tx_disabled();
        driver.attach(Box::new(mock.clone()));

        assert!(!driver.set_power_mode(PowerMode::PowerSave));
        assert!(mock.written().is_empty());
    }

    #[test]
    fn wake_is_fire_and_forget() {
        let clock = ManualClock::new();
        let (mut driver, mock, _pps) = driver_with_mock(clock);

        assert!(!driver.wake());
        assert_eq!(mock.written(), b"\r\n".to_vec());

        let silent = MockTransport::with_tx_disabled();
        driver.attach(Box::new(silent.clone()));
        assert!(!driver.wake());
        assert!(silent.written().is_empty());
    }

    #[test]
    fn drop_attempts_powerdown() {
        let clock = ManualClock::new();
        let (driver, mock, _pps) = driver_with_mock(clock);

        drop(driver);
        assert_eq!(mock.written(), ubx::STANDBY_FRAME.to_vec());
    }
}
