//! Wire-level core of the Syndesis serial link
//!
//! This crate defines everything that touches raw bytes between the
//! transport and the protocol engine: the fixed-capacity receive
//! accumulator, the CRC-16 checksum, the frame layout with its
//! extraction state machine, and the message abstraction with the
//! built-in catalog.
//!
//! # Frame format
//!
//! All messages travel in a simple binary frame:
//!
//! ```text
//! ┌────────┬──────┬─────────┬───────────────┬─────────┐
//! │ LENGTH │ TYPE │ CRC-16  │ MESSAGE ID    │ PAYLOAD │
//! │ 1B     │ 1B   │ 2B (BE) │ 2B (BE, opt.) │ 0–60B   │
//! └────────┴──────┴─────────┴───────────────┴─────────┘
//! ```
//!
//! LENGTH counts the whole frame, header included. The CRC covers the
//! whole frame with its own field zeroed. MESSAGE ID appears only when
//! the TYPE byte carries the need-ack flag (extended profile).

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod buffer;
pub mod crc;
pub mod frame;
pub mod message;
pub mod messages;

pub use buffer::{Accumulator, BufferError};
pub use crc::crc16_xmodem;
pub use frame::{
    extract, install_checksum, management_byte, Extracted, FrameError, FrameHeader, Profile,
    BASE_HEADER_LEN, FLAG_ACK_ON_RECEIVE, FLAG_NEED_ACK, FULL_HEADER_LEN, MAX_FRAME_LEN,
    MAX_PAYLOAD_LEN,
};
pub use message::{Message, MessageError, MessageFactory};
pub use messages::{
    Ack, AckKind, DataMessage, DebugMessage, SimpleFactory, SimpleMessage, TextMessage,
    ACK_ERR_DECODE, ACK_ERR_UNSUPPORTED_TYPE, MSG_ACK_FAIL, MSG_ACK_SUCCESS, MSG_DATA, MSG_DEBUG,
    MSG_STRING, MSG_UNKNOWN,
};
