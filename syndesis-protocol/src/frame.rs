//! Frame layout and the extraction state machine
//!
//! Frame fields, in wire order: LENGTH (1 byte, whole frame), TYPE
//! (1 byte, type id plus ack flags), CRC-16 (2 bytes, big-endian),
//! MESSAGE ID (2 bytes, big-endian, only when the need-ack flag is
//! set), PAYLOAD. The CRC is computed over the entire frame with its
//! own field zeroed.
//!
//! Frames are ephemeral: they exist only at the front of the receive
//! accumulator or in the engine's send scratch buffer, never as a
//! stored entity.

use crate::buffer::Accumulator;
use crate::crc::crc16_xmodem;

/// Largest legal frame, header included
pub const MAX_FRAME_LEN: usize = 64;

/// Header length without a message id field
pub const BASE_HEADER_LEN: usize = 4;

/// Header length with a message id field
pub const FULL_HEADER_LEN: usize = BASE_HEADER_LEN + 2;

/// Largest payload a frame can carry
pub const MAX_PAYLOAD_LEN: usize = MAX_FRAME_LEN - BASE_HEADER_LEN;

/// Wire offset of the checksum field
pub const CHECKSUM_OFFSET: usize = 2;

/// Wire offset of the message id field, when present
pub const MESSAGE_ID_OFFSET: usize = 4;

/// TYPE-byte flag: the sender expects an acknowledgment
pub const FLAG_NEED_ACK: u8 = 0x80;

/// TYPE-byte flag: acknowledge on receipt, before processing
pub const FLAG_ACK_ON_RECEIVE: u8 = 0x40;

/// Wire profile selecting the TYPE-byte layout
///
/// Both profiles share the accumulator, the checksum, and the
/// extraction state machine; they differ in the flag bits and the
/// built-in message catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Profile {
    /// Ack flags and message ids; type ids 0–63
    Extended,
    /// Bare type byte, no acknowledgment machinery; type ids 0–127
    Simple,
}

impl Profile {
    /// Whether the profile carries ack flags and message ids
    pub const fn supports_ack(self) -> bool {
        matches!(self, Profile::Extended)
    }

    /// Mask selecting the type id bits of the TYPE byte
    pub const fn type_mask(self) -> u8 {
        match self {
            Profile::Extended => 0x3F,
            Profile::Simple => 0x7F,
        }
    }

    /// Largest usable type id
    pub const fn max_type_id(self) -> u8 {
        self.type_mask()
    }
}

/// Errors from frame header parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// The frame cannot hold the header it declares
    TooShort,
    /// The LENGTH byte disagrees with the byte count supplied
    LengthMismatch,
}

/// Parsed frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameHeader {
    /// Total frame length, header included
    pub len: u8,
    /// Message type id, flag bits stripped
    pub type_id: u8,
    /// The sender expects an acknowledgment
    pub needs_ack: bool,
    /// Acknowledge on receipt rather than after processing
    pub ack_on_receive: bool,
    /// Sender-assigned id, present only on need-ack frames
    pub message_id: Option<u16>,
}

impl FrameHeader {
    /// Parse the header of a complete frame
    ///
    /// `frame` must be exactly the extracted frame: its first byte is
    /// the LENGTH field and must match `frame.len()`.
    pub fn parse(frame: &[u8], profile: Profile) -> Result<Self, FrameError> {
        if frame.len() < BASE_HEADER_LEN {
            return Err(FrameError::TooShort);
        }
        if frame[0] as usize != frame.len() {
            return Err(FrameError::LengthMismatch);
        }
        let type_byte = frame[1];
        let type_id = type_byte & profile.type_mask();
        let needs_ack = profile.supports_ack() && (type_byte & FLAG_NEED_ACK) != 0;
        let ack_on_receive = needs_ack && (type_byte & FLAG_ACK_ON_RECEIVE) != 0;
        let message_id = if needs_ack {
            if frame.len() < FULL_HEADER_LEN {
                return Err(FrameError::TooShort);
            }
            Some(u16::from_be_bytes([
                frame[MESSAGE_ID_OFFSET],
                frame[MESSAGE_ID_OFFSET + 1],
            ]))
        } else {
            None
        };
        Ok(Self {
            len: frame[0],
            type_id,
            needs_ack,
            ack_on_receive,
            message_id,
        })
    }

    /// Offset of the first payload byte
    pub fn payload_start(&self) -> usize {
        if self.needs_ack {
            FULL_HEADER_LEN
        } else {
            BASE_HEADER_LEN
        }
    }
}

/// Build the TYPE byte from a type id and the ack flags
///
/// Flags are only representable in the extended profile; the simple
/// profile sends the bare type id.
pub fn management_byte(profile: Profile, type_id: u8, needs_ack: bool, ack_on_receive: bool) -> u8 {
    let mut byte = type_id & profile.type_mask();
    if profile.supports_ack() && needs_ack {
        byte |= FLAG_NEED_ACK;
        if ack_on_receive {
            byte |= FLAG_ACK_ON_RECEIVE;
        }
    }
    byte
}

/// Compute the frame's CRC with the checksum field zeroed and install
/// it big-endian at its wire position
pub fn install_checksum(frame: &mut [u8]) {
    debug_assert!(frame.len() >= BASE_HEADER_LEN);
    frame[CHECKSUM_OFFSET] = 0;
    frame[CHECKSUM_OFFSET + 1] = 0;
    let checksum = crc16_xmodem(frame);
    frame[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 2].copy_from_slice(&checksum.to_be_bytes());
}

/// Outcome of one extraction attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Extracted {
    /// Nothing buffered
    Idle,
    /// A frame has started but not all of its bytes have arrived; the
    /// accumulator is left untouched
    Pending,
    /// A complete frame passed its checksum; `len` bytes were copied
    /// into the caller's buffer and consumed
    Frame { len: usize },
    /// A complete frame failed its checksum; it was consumed and
    /// dropped
    Corrupt { len: usize },
}

/// Run the extraction state machine once against the front of `rx`
///
/// Length bytes that cannot begin a legal frame (zero, smaller than
/// the base header, larger than [`MAX_FRAME_LEN`]) are dropped one at
/// a time until the stream resynchronizes. For every complete frame,
/// valid or corrupt, exactly LENGTH bytes are consumed, so each call
/// makes forward progress. The checksum field of an extracted frame is
/// left zeroed in `out`.
pub fn extract<const N: usize>(
    rx: &mut Accumulator<N>,
    out: &mut [u8; MAX_FRAME_LEN],
) -> Extracted {
    while let Some(first) = rx.peek(0) {
        let len = first as usize;
        if !(BASE_HEADER_LEN..=MAX_FRAME_LEN).contains(&len) {
            // Corrupt length byte; drop it and rescan
            rx.consume(1);
            continue;
        }
        if !rx.has(len) {
            return Extracted::Pending;
        }
        out[..len].copy_from_slice(&rx.as_slice()[..len]);
        rx.consume(len);
        let wire = u16::from_be_bytes([out[CHECKSUM_OFFSET], out[CHECKSUM_OFFSET + 1]]);
        out[CHECKSUM_OFFSET] = 0;
        out[CHECKSUM_OFFSET + 1] = 0;
        let computed = crc16_xmodem(&out[..len]);
        return if wire == computed {
            Extracted::Frame { len }
        } else {
            Extracted::Corrupt { len }
        };
    }
    Extracted::Idle
}
