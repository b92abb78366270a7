use derive_more::Display;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde_repr::{Deserialize_repr, Serialize_repr};
use std::convert::TryFrom;
use thiserror::Error;

const TAG_OFFSET: u32 = 60;
const GROUP_OFFSET: u32 = 56;
const STATUS_OFFSET: u32 = 52;
const CHANNEL_OFFSET: u32 = 48;
pub(crate) const DATA_1_OFFSET: u32 = 40;
pub(crate) const DATA_2_OFFSET: u32 = 32;
pub(crate) const WORD_0_OFFSET: u32 = 32;
pub(crate) const WORD_1_OFFSET: u32 = 0;
const NIBBLE_WIDTH: u32 = 4;
const BYTE_WIDTH: u32 = 8;
const WORD_WIDTH: u32 = 32;

/// Fixed 64-bit record representing one control-surface event.
///
/// The top nibble is the format tag. It is written exactly once, by
/// [`decode`](WireMessage::decode) or one of the constructors, and selects
/// which layout the remaining bits follow. The status and channel nibbles sit
/// at the same positions under both layouts, so status access never needs to
/// know the layout.
///
/// Instances are transient: built from one transport frame or one outbound
/// build, consumed, then dropped.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct WireMessage {
    bits: u64,
}

impl WireMessage {
    /// Classifies the given transport frame by length and copies its bytes
    /// into the fixed bit positions verbatim, without value interpretation.
    ///
    /// 3 bytes decode as legacy (status byte plus two data bytes), 8 bytes as
    /// universal (two big-endian 32-bit words). Anything else is malformed.
    pub fn decode(frame: &[u8]) -> Result<WireMessage, MalformedFrame> {
        let mut msg = WireMessage { bits: 0 };
        match *frame {
            [status, data_1, data_2] => {
                msg.set(TAG_OFFSET, NIBBLE_WIDTH, FormatTag::Legacy as u32);
                msg.set(CHANNEL_OFFSET, BYTE_WIDTH, status as u32);
                msg.set(DATA_1_OFFSET, BYTE_WIDTH, data_1 as u32);
                msg.set(DATA_2_OFFSET, BYTE_WIDTH, data_2 as u32);
            }
            [b0, b1, b2, b3, b4, b5, b6, b7] => {
                let word_0 = u32::from_be_bytes([b0, b1, b2, b3]);
                let word_1 = u32::from_be_bytes([b4, b5, b6, b7]);
                msg.set(WORD_0_OFFSET, WORD_WIDTH, word_0);
                msg.set(WORD_1_OFFSET, WORD_WIDTH, word_1);
                // The frame's own type nibble is replaced by the canonical tag.
                msg.set(TAG_OFFSET, NIBBLE_WIDTH, FormatTag::Universal as u32);
            }
            _ => return Err(MalformedFrame { len: frame.len() }),
        }
        Ok(msg)
    }

    /// Creates a legacy record from its parts. `channel` is 0-based and
    /// masked to a nibble.
    pub fn legacy(status: StatusCode, channel: u8, data_1: u8, data_2: u8) -> WireMessage {
        let mut msg = WireMessage { bits: 0 };
        msg.set(TAG_OFFSET, NIBBLE_WIDTH, FormatTag::Legacy as u32);
        msg.set_status(status);
        msg.set_channel(channel);
        msg.set(DATA_1_OFFSET, BYTE_WIDTH, data_1 as u32);
        msg.set(DATA_2_OFFSET, BYTE_WIDTH, data_2 as u32);
        msg
    }

    /// Creates a universal record with empty data words, to be filled via
    /// [`set`](WireMessage::set) or a trigger.
    pub fn universal(status: StatusCode, channel: u8) -> WireMessage {
        let mut msg = WireMessage { bits: 0 };
        msg.set(TAG_OFFSET, NIBBLE_WIDTH, FormatTag::Universal as u32);
        msg.set_status(status);
        msg.set_channel(channel);
        msg
    }

    /// Produces the transport-ready byte sequence matching the active format
    /// tag. Exact inverse of [`decode`](WireMessage::decode).
    pub fn encode(&self) -> Vec<u8> {
        match self.format_tag() {
            Some(FormatTag::Legacy) => vec![
                self.get(CHANNEL_OFFSET, BYTE_WIDTH) as u8,
                self.get(DATA_1_OFFSET, BYTE_WIDTH) as u8,
                self.get(DATA_2_OFFSET, BYTE_WIDTH) as u8,
            ],
            Some(FormatTag::Universal) => {
                let mut frame = self.word_0().to_be_bytes().to_vec();
                frame.extend_from_slice(&self.word_1().to_be_bytes());
                frame
            }
            // A record whose tag bits were disturbed has no transport form.
            None => Vec::new(),
        }
    }

    /// Reads the bit range described by the given offset and width. Total
    /// function: the range is clamped into the 64-bit word with the same
    /// formula [`set`](WireMessage::set) uses, so the two stay inverses.
    pub fn get(&self, offset: u32, width: u32) -> u32 {
        let (offset, width) = clamp_bit_range(offset, width);
        ((self.bits >> offset) & bit_mask(width)) as u32
    }

    /// Writes `value`, masked to `width` bits, into the given bit range
    /// without disturbing any bit outside it. Total function.
    pub fn set(&mut self, offset: u32, width: u32, value: u32) {
        let (offset, width) = clamp_bit_range(offset, width);
        let mask = bit_mask(width);
        self.bits = (self.bits & !(mask << offset)) | (((value as u64) & mask) << offset);
    }

    pub fn format_tag(&self) -> Option<FormatTag> {
        FormatTag::try_from(self.get(TAG_OFFSET, NIBBLE_WIDTH) as u8).ok()
    }

    /// Returns the status code, or `None` if this record is not a
    /// channel-voice-class record or the code in the status nibble requires
    /// the universal layout while this record is legacy.
    pub fn status(&self) -> Option<StatusCode> {
        let tag = self.format_tag()?;
        let code = StatusCode::try_from(self.get(STATUS_OFFSET, NIBBLE_WIDTH) as u8).ok()?;
        if tag == FormatTag::Legacy && code.requires_universal() {
            return None;
        }
        Some(code)
    }

    /// Writes only the status nibble, leaving channel and data untouched.
    pub fn set_status(&mut self, status: StatusCode) {
        self.set(STATUS_OFFSET, NIBBLE_WIDTH, u8::from(status) as u32);
    }

    /// Returns the 0-based channel.
    pub fn channel(&self) -> u8 {
        self.get(CHANNEL_OFFSET, NIBBLE_WIDTH) as u8
    }

    pub fn set_channel(&mut self, channel: u8) {
        self.set(CHANNEL_OFFSET, NIBBLE_WIDTH, channel as u32);
    }

    /// First legacy data byte.
    pub fn data_1(&self) -> u8 {
        self.get(DATA_1_OFFSET, BYTE_WIDTH) as u8
    }

    /// Second legacy data byte.
    pub fn data_2(&self) -> u8 {
        self.get(DATA_2_OFFSET, BYTE_WIDTH) as u8
    }

    /// First universal word (the one carrying tag, status and channel).
    pub fn word_0(&self) -> u32 {
        self.get(WORD_0_OFFSET, WORD_WIDTH)
    }

    /// Second universal word.
    pub fn word_1(&self) -> u32 {
        self.get(WORD_1_OFFSET, WORD_WIDTH)
    }

    /// Legacy reserved nibble / universal group nibble.
    pub fn group(&self) -> u8 {
        self.get(GROUP_OFFSET, NIBBLE_WIDTH) as u8
    }
}

fn clamp_bit_range(offset: u32, width: u32) -> (u32, u32) {
    let width = width.min(WORD_WIDTH);
    let offset = offset.min(u64::BITS - width);
    (offset, width)
}

fn bit_mask(width: u32) -> u64 {
    if width == 0 {
        0
    } else {
        (1u64 << width) - 1
    }
}

/// Selects which layout the bits below the format tag follow.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum FormatTag {
    /// 3-byte transport frame: status byte plus up to two data bytes.
    Legacy = 0x2,
    /// Two 32-bit words, big-endian on the wire.
    Universal = 0x4,
}

/// Closed enumeration of channel-voice status codes.
///
/// Codes below 0x8, and per-note management, only occur under the universal
/// layout. Nibble values outside this set are not statuses.
#[derive(
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    Debug,
    TryFromPrimitive,
    IntoPrimitive,
    Display,
    Serialize_repr,
    Deserialize_repr,
)]
#[repr(u8)]
pub enum StatusCode {
    #[display(fmt = "Registered controller")]
    RegisteredController = 0x2,
    #[display(fmt = "Assignable controller")]
    AssignableController = 0x3,
    #[display(fmt = "Per-note pitch bend")]
    PerNotePitchBend = 0x6,
    #[display(fmt = "Note off")]
    NoteOff = 0x8,
    #[display(fmt = "Note on")]
    NoteOn = 0x9,
    #[display(fmt = "Poly pressure")]
    PolyPressure = 0xA,
    #[display(fmt = "Control change")]
    ControlChange = 0xB,
    #[display(fmt = "Program change")]
    ProgramChange = 0xC,
    #[display(fmt = "Channel pressure")]
    ChannelPressure = 0xD,
    #[display(fmt = "Pitch bend")]
    PitchBend = 0xE,
    #[display(fmt = "Per-note management")]
    PerNoteManagement = 0xF,
}

impl StatusCode {
    /// Whether this code is only meaningful under the universal layout.
    pub fn requires_universal(self) -> bool {
        (self as u8) < 0x8 || self == StatusCode::PerNoteManagement
    }
}

/// Returned by [`WireMessage::decode`] when the frame is truncated or
/// otherwise not a valid legacy or universal frame. The frame is dropped; no
/// field is touched.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Error)]
#[error("malformed wire frame ({len} bytes, expected 3 or 8)")]
pub struct MalformedFrame {
    pub len: usize,
}
