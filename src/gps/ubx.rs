// src/gps/ubx.rs
//! UBX binary protocol: command frames, checksum, ACK capture

/// Lead-in byte observed ahead of ACK/NAK replies from the receivers this
/// driver targets, in place of the documented `0xB5` sync character. NMEA
/// sentence bodies are printable ASCII, so the value is rare enough in the
/// stream to use as an interception trigger.
pub const ACK_LEAD_IN: u8 = 0x85;

/// Second UBX sync character, expected right after the lead-in.
pub const SYNC_CHAR_2: u8 = 0x62;

/// UBX ACK message class.
pub const CLASS_ACK: u8 = 0x05;

const ACK_ACK_ID: u8 = 0x01;
const ACK_NAK_ID: u8 = 0x00;

/// RXM-PMREQ: put the receiver into backup (standby) state.
pub const STANDBY_FRAME: [u8; 16] = [
    0xB5, 0x62, 0x02, 0x41, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x4D,
    0x3B,
];

// CFG-RXM low-power mode selection, one pre-computed frame per mode.
const MAX_PERFORMANCE_FRAME: [u8; 10] =
    [0xB5, 0x62, 0x06, 0x11, 0x02, 0x00, 0x08, 0x00, 0x21, 0x91];
const POWER_SAVE_FRAME: [u8; 10] = [0xB5, 0x62, 0x06, 0x11, 0x02, 0x00, 0x08, 0x01, 0x22, 0x92];
const ECO_FRAME: [u8; 10] = [0xB5, 0x62, 0x06, 0x11, 0x02, 0x00, 0x08, 0x04, 0x25, 0x95];

/// CFG-NAV5 template. The dynamic platform model byte and the trailing
/// checksum are patched in by [`dynamic_model_frame`]; the mask selects only
/// the dyn-model setting and the fix mode is pinned to auto 2D/3D.
const CFG_NAV5_TEMPLATE: [u8; 44] = [
    0xB5, 0x62, 0x06, 0x24, 0x24, 0x00, // header, class, id, payload length 36
    0x01, 0x00, // parameter mask: dynModel only
    0x00, // dynModel, patched
    0x03, // fixMode: auto 2D/3D
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, // remaining payload
    0x00, 0x00, // checksum, patched
];

const DYN_MODEL_OFFSET: usize = 8;

/// Receiver power management mode, one fixed frame each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerMode {
    MaxPerformance,
    PowerSave,
    Eco,
}

impl PowerMode {
    pub fn frame(&self) -> &'static [u8] {
        match self {
            PowerMode::MaxPerformance => &MAX_PERFORMANCE_FRAME,
            PowerMode::PowerSave => &POWER_SAVE_FRAME,
            PowerMode::Eco => &ECO_FRAME,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "max-performance" => Some(PowerMode::MaxPerformance),
            "power-save" => Some(PowerMode::PowerSave),
            "eco" => Some(PowerMode::Eco),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PowerMode::MaxPerformance => "max-performance",
            PowerMode::PowerSave => "power-save",
            PowerMode::Eco => "eco",
        }
    }
}

/// Dynamic platform model tuning the receiver's motion filter.
///
/// Code 1 is reserved by the vendor and codes above 10 are undefined;
/// [`DynamicModel::from_code`] rejects both so no such value can ever reach
/// the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicModel {
    Portable = 0,
    Stationary = 2,
    Pedestrian = 3,
    Automotive = 4,
    Sea = 5,
    Airborne1g = 6,
    Airborne2g = 7,
    Airborne4g = 8,
    Wrist = 9,
    Bike = 10,
}

impl DynamicModel {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(DynamicModel::Portable),
            2 => Some(DynamicModel::Stationary),
            3 => Some(DynamicModel::Pedestrian),
            4 => Some(DynamicModel::Automotive),
            5 => Some(DynamicModel::Sea),
            6 => Some(DynamicModel::Airborne1g),
            7 => Some(DynamicModel::Airborne2g),
            8 => Some(DynamicModel::Airborne4g),
            9 => Some(DynamicModel::Wrist),
            10 => Some(DynamicModel::Bike),
            _ => None,
        }
    }

    pub fn code(&self) -> u8 {
        *self as u8
    }
}

/// Two-accumulator running checksum over a frame's class, id, length and
/// payload bytes. Both accumulators wrap at 8 bits; the receiver hardware
/// verifies this byte-for-byte, so the algorithm has no latitude.
pub fn checksum(data: &[u8]) -> (u8, u8) {
    let mut ck_a: u8 = 0;
    let mut ck_b: u8 = 0;
    for &byte in data {
        ck_a = ck_a.wrapping_add(byte);
        ck_b = ck_b.wrapping_add(ck_a);
    }
    (ck_a, ck_b)
}

/// Build a CFG-NAV5 frame selecting the given dynamic platform model.
pub fn dynamic_model_frame(model: DynamicModel) -> [u8; 44] {
    let mut frame = CFG_NAV5_TEMPLATE;
    frame[DYN_MODEL_OFFSET] = model.code();
    let (ck_a, ck_b) = checksum(&frame[2..frame.len() - 2]);
    frame[42] = ck_a;
    frame[43] = ck_b;
    frame
}

/// Outcome of an intercepted ACK/NAK frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckOutcome {
    /// Command acknowledged (id `0x01`).
    Ack,
    /// Command rejected (id `0x00`).
    Nack,
    /// Frame completed with an id that is neither ACK nor NAK.
    Unexpected,
    /// A sync or class byte did not match; not an ACK frame after all.
    Abandoned,
}

enum AckState {
    AwaitSync,
    AwaitClass,
    AwaitId,
}

/// State machine for the bytes following the ACK lead-in. Purely
/// byte-driven; the caller owns timeouts and byte delivery, which keeps the
/// machine testable without a transport.
pub struct AckCapture {
    state: AckState,
}

impl AckCapture {
    pub fn new() -> Self {
        Self {
            state: AckState::AwaitSync,
        }
    }

    /// Consume the next byte. Returns `Some` once the capture is finished,
    /// one way or another.
    pub fn offer(&mut self, byte: u8) -> Option<AckOutcome> {
        match self.state {
            AckState::AwaitSync => {
                if byte == SYNC_CHAR_2 {
                    self.state = AckState::AwaitClass;
                    None
                } else {
                    Some(AckOutcome::Abandoned)
                }
            }
            AckState::AwaitClass => {
                if byte == CLASS_ACK {
                    self.state = AckState::AwaitId;
                    None
                } else {
                    Some(AckOutcome::Abandoned)
                }
            }
            AckState::AwaitId => Some(match byte {
                ACK_ACK_ID => AckOutcome::Ack,
                ACK_NAK_ID => AckOutcome::Nack,
                _ => AckOutcome::Unexpected,
            }),
        }
    }
}

impl Default for AckCapture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_matches_standby_frame() {
        let interior = &STANDBY_FRAME[2..STANDBY_FRAME.len() - 2];
        assert_eq!(checksum(interior), (0x4D, 0x3B));
    }

    #[test]
    fn power_mode_frames_carry_valid_checksums() {
        for mode in [PowerMode::MaxPerformance, PowerMode::PowerSave, PowerMode::Eco] {
            let frame = mode.frame();
            let (ck_a, ck_b) = checksum(&frame[2..frame.len() - 2]);
            assert_eq!(ck_a, frame[frame.len() - 2], "{:?}", mode);
            assert_eq!(ck_b, frame[frame.len() - 1], "{:?}", mode);
        }
    }

    #[test]
    fn portable_model_frame_matches_golden_bytes() {
        let frame = dynamic_model_frame(DynamicModel::Portable);
        assert_eq!(&frame[..6], &[0xB5, 0x62, 0x06, 0x24, 0x24, 0x00]);
        assert_eq!(frame[6], 0x01); // mask low byte
        assert_eq!(frame[8], 0x00); // dynModel Portable
        assert_eq!(frame[9], 0x03); // fixMode auto
        assert_eq!((frame[42], frame[43]), (0x52, 0x4B));
    }

    #[test]
    fn automotive_model_frame_checksum() {
        let frame = dynamic_model_frame(DynamicModel::Automotive);
        assert_eq!(frame[8], 0x04);
        assert_eq!((frame[42], frame[43]), (0x56, 0xD3));
    }

    #[test]
    fn reserved_and_out_of_range_models_are_rejected() {
        assert_eq!(DynamicModel::from_code(1), None);
        assert_eq!(DynamicModel::from_code(11), None);
        assert_eq!(DynamicModel::from_code(200), None);
        assert_eq!(DynamicModel::from_code(4), Some(DynamicModel::Automotive));
        assert_eq!(DynamicModel::from_code(10), Some(DynamicModel::Bike));
    }

    #[test]
    fn ack_capture_recognizes_ack() {
        let mut capture = AckCapture::new();
        assert_eq!(capture.offer(0x62), None);
        assert_eq!(capture.offer(0x05), None);
        assert_eq!(capture.offer(0x01), Some(AckOutcome::Ack));
    }

    #[test]
    fn ack_capture_recognizes_nack() {
        let mut capture = AckCapture::new();
        assert_eq!(capture.offer(0x62), None);
        assert_eq!(capture.offer(0x05), None);
        assert_eq!(capture.offer(0x00), Some(AckOutcome::Nack));
    }

    #[test]
    fn ack_capture_abandons_on_wrong_sync_or_class() {
        let mut capture = AckCapture::new();
        assert_eq!(capture.offer(0x41), Some(AckOutcome::Abandoned));

        let mut capture = AckCapture::new();
        assert_eq!(capture.offer(0x62), None);
        assert_eq!(capture.offer(0x06), Some(AckOutcome::Abandoned));
    }

    #[test]
    fn ack_capture_flags_unknown_reply_id() {
        let mut capture = AckCapture::new();
        assert_eq!(capture.offer(0x62), None);
        assert_eq!(capture.offer(0x05), None);
        assert_eq!(capture.offer(0x7F), Some(AckOutcome::Unexpected));
    }

    #[test]
    fn power_mode_names_round_trip() {
        for mode in [PowerMode::MaxPerformance, PowerMode::PowerSave, PowerMode::Eco] {
            assert_eq!(PowerMode::from_name(mode.name()), Some(mode));
        }
        assert_eq!(PowerMode::from_name("turbo"), None);
    }
}
