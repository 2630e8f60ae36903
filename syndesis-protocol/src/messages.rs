//! Built-in message catalog
//!
//! Two catalogs share the numeric tag space, one per wire profile:
//! the extended profile reserves the low tags for the ack handshake
//! and a send-only string message, while the simple profile knows only
//! raw data and debug text. User-defined types take the remaining
//! range up to the profile's maximum tag.

use heapless::{String, Vec};

use crate::frame::MAX_PAYLOAD_LEN;
use crate::message::{decode_span, encode_span, Message, MessageError, MessageFactory};

// Type ids: extended profile
pub const MSG_UNKNOWN: u8 = 0;
pub const MSG_ACK_SUCCESS: u8 = 1;
pub const MSG_ACK_FAIL: u8 = 2;
pub const MSG_STRING: u8 = 3;

// Type ids: simple profile
pub const MSG_DATA: u8 = 1;
pub const MSG_DEBUG: u8 = 2;

/// Failure-ack error code: the receiver does not know the type tag
pub const ACK_ERR_UNSUPPORTED_TYPE: u8 = 1;

/// Failure-ack error code: the payload did not decode
pub const ACK_ERR_DECODE: u8 = 2;

/// Encoded size of an ack payload
pub const ACK_PAYLOAD_LEN: usize = 4;

/// Whether an ack reports success or failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AckKind {
    Success,
    Fail,
}

/// Acknowledgment of a received message
///
/// Carries the acknowledged message's type and id back to its sender,
/// plus an error code on failure. Payload layout:
/// `[acked_type, id_hi, id_lo, error]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Ack {
    pub kind: AckKind,
    pub acked_type: u8,
    pub acked_id: u16,
    pub error: u8,
}

impl Ack {
    /// Success ack for a received message
    pub fn success(acked_type: u8, acked_id: u16) -> Self {
        Self {
            kind: AckKind::Success,
            acked_type,
            acked_id,
            error: 0,
        }
    }

    /// Failure ack carrying an error code
    pub fn fail(acked_type: u8, acked_id: u16, error: u8) -> Self {
        Self {
            kind: AckKind::Fail,
            acked_type,
            acked_id,
            error,
        }
    }

    /// Blank ack of the given kind, ready to decode into
    pub fn receiver(kind: AckKind) -> Self {
        Self {
            kind,
            acked_type: MSG_UNKNOWN,
            acked_id: 0,
            error: 0,
        }
    }
}

impl Message for Ack {
    fn type_id(&self) -> u8 {
        match self.kind {
            AckKind::Success => MSG_ACK_SUCCESS,
            AckKind::Fail => MSG_ACK_FAIL,
        }
    }

    fn payload_len(&self) -> usize {
        ACK_PAYLOAD_LEN
    }

    fn encode_payload(&self, frame: &mut [u8], at: usize) -> Result<usize, MessageError> {
        let span = encode_span(frame, at, ACK_PAYLOAD_LEN)?;
        span[0] = self.acked_type;
        span[1..3].copy_from_slice(&self.acked_id.to_be_bytes());
        span[3] = self.error;
        Ok(ACK_PAYLOAD_LEN)
    }

    fn decode_payload(
        &mut self,
        frame: &[u8],
        frame_len: usize,
        at: usize,
    ) -> Result<(), MessageError> {
        let span = decode_span(frame, frame_len, at)?;
        if span.len() != ACK_PAYLOAD_LEN {
            return Err(MessageError::Malformed);
        }
        self.acked_type = span[0];
        self.acked_id = u16::from_be_bytes([span[1], span[2]]);
        self.error = span[3];
        Ok(())
    }
}

/// Send-only text message borrowing its contents
///
/// Receivers should treat the payload as a human-readable diagnostic
/// and simply display it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TextMessage<'a> {
    type_id: u8,
    text: &'a str,
}

impl<'a> TextMessage<'a> {
    /// Extended-profile string message
    pub fn string(text: &'a str) -> Self {
        Self {
            type_id: MSG_STRING,
            text,
        }
    }

    /// Simple-profile debug text
    pub fn debug(text: &'a str) -> Self {
        Self {
            type_id: MSG_DEBUG,
            text,
        }
    }

    /// The borrowed text
    pub fn text(&self) -> &str {
        self.text
    }
}

impl Message for TextMessage<'_> {
    fn type_id(&self) -> u8 {
        self.type_id
    }

    fn payload_len(&self) -> usize {
        self.text.len()
    }

    fn encode_payload(&self, frame: &mut [u8], at: usize) -> Result<usize, MessageError> {
        let span = encode_span(frame, at, self.text.len())?;
        span.copy_from_slice(self.text.as_bytes());
        Ok(self.text.len())
    }

    fn decode_payload(
        &mut self,
        _frame: &[u8],
        _frame_len: usize,
        _at: usize,
    ) -> Result<(), MessageError> {
        Err(MessageError::NotDecodable)
    }
}

/// Raw byte payload (simple profile)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DataMessage {
    pub data: Vec<u8, MAX_PAYLOAD_LEN>,
}

impl DataMessage {
    /// Empty data message, ready to decode into
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Data message holding a copy of `bytes`
    pub fn from_slice(bytes: &[u8]) -> Result<Self, MessageError> {
        let mut data = Vec::new();
        data.extend_from_slice(bytes)
            .map_err(|_| MessageError::Capacity)?;
        Ok(Self { data })
    }
}

impl Message for DataMessage {
    fn type_id(&self) -> u8 {
        MSG_DATA
    }

    fn payload_len(&self) -> usize {
        self.data.len()
    }

    fn encode_payload(&self, frame: &mut [u8], at: usize) -> Result<usize, MessageError> {
        let span = encode_span(frame, at, self.data.len())?;
        span.copy_from_slice(&self.data);
        Ok(self.data.len())
    }

    fn decode_payload(
        &mut self,
        frame: &[u8],
        frame_len: usize,
        at: usize,
    ) -> Result<(), MessageError> {
        let span = decode_span(frame, frame_len, at)?;
        self.data.clear();
        self.data
            .extend_from_slice(span)
            .map_err(|_| MessageError::Capacity)?;
        Ok(())
    }
}

/// Owned debug text (simple profile), the receive-side counterpart of
/// [`TextMessage::debug`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DebugMessage {
    pub text: String<MAX_PAYLOAD_LEN>,
}

impl DebugMessage {
    /// Empty debug message, ready to decode into
    pub fn new() -> Self {
        Self {
            text: String::new(),
        }
    }

    /// The decoded text
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl Message for DebugMessage {
    fn type_id(&self) -> u8 {
        MSG_DEBUG
    }

    fn payload_len(&self) -> usize {
        self.text.len()
    }

    fn encode_payload(&self, frame: &mut [u8], at: usize) -> Result<usize, MessageError> {
        let span = encode_span(frame, at, self.text.len())?;
        span.copy_from_slice(self.text.as_bytes());
        Ok(self.text.len())
    }

    fn decode_payload(
        &mut self,
        frame: &[u8],
        frame_len: usize,
        at: usize,
    ) -> Result<(), MessageError> {
        let span = decode_span(frame, frame_len, at)?;
        let text = core::str::from_utf8(span).map_err(|_| MessageError::Malformed)?;
        self.text.clear();
        self.text
            .push_str(text)
            .map_err(|_| MessageError::Capacity)?;
        Ok(())
    }
}

/// Every message the simple profile can receive
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SimpleMessage {
    Data(DataMessage),
    Debug(DebugMessage),
}

impl Message for SimpleMessage {
    fn type_id(&self) -> u8 {
        match self {
            SimpleMessage::Data(message) => message.type_id(),
            SimpleMessage::Debug(message) => message.type_id(),
        }
    }

    fn payload_len(&self) -> usize {
        match self {
            SimpleMessage::Data(message) => message.payload_len(),
            SimpleMessage::Debug(message) => message.payload_len(),
        }
    }

    fn encode_payload(&self, frame: &mut [u8], at: usize) -> Result<usize, MessageError> {
        match self {
            SimpleMessage::Data(message) => message.encode_payload(frame, at),
            SimpleMessage::Debug(message) => message.encode_payload(frame, at),
        }
    }

    fn decode_payload(
        &mut self,
        frame: &[u8],
        frame_len: usize,
        at: usize,
    ) -> Result<(), MessageError> {
        match self {
            SimpleMessage::Data(message) => message.decode_payload(frame, frame_len, at),
            SimpleMessage::Debug(message) => message.decode_payload(frame, frame_len, at),
        }
    }
}

/// The simple profile's two-entry catalog as a ready-made factory
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleFactory;

impl MessageFactory for SimpleFactory {
    type Message = SimpleMessage;

    fn create(&mut self, type_id: u8) -> Option<SimpleMessage> {
        match type_id {
            MSG_DATA => Some(SimpleMessage::Data(DataMessage::new())),
            MSG_DEBUG => Some(SimpleMessage::Debug(DebugMessage::new())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ack_roundtrip() {
        let ack = Ack::fail(7, 0x1234, ACK_ERR_DECODE);
        let mut frame = [0u8; 16];
        let written = ack.encode_payload(&mut frame, 6).unwrap();
        assert_eq!(written, ACK_PAYLOAD_LEN);
        assert_eq!(&frame[6..10], &[7, 0x12, 0x34, ACK_ERR_DECODE]);

        let mut parsed = Ack::receiver(AckKind::Fail);
        parsed
            .decode_payload(&frame, 6 + ACK_PAYLOAD_LEN, 6)
            .unwrap();
        assert_eq!(parsed, ack);
    }

    #[test]
    fn test_ack_type_ids() {
        assert_eq!(Ack::success(1, 2).type_id(), MSG_ACK_SUCCESS);
        assert_eq!(Ack::fail(1, 2, 3).type_id(), MSG_ACK_FAIL);
        assert!(!Ack::success(1, 2).needs_ack()); // acks are never acked
    }

    #[test]
    fn test_ack_rejects_wrong_payload_size() {
        let frame = [0u8; 16];
        let mut ack = Ack::receiver(AckKind::Success);
        assert_eq!(
            ack.decode_payload(&frame, 9, 6),
            Err(MessageError::Malformed)
        );
    }

    #[test]
    fn test_text_encodes_its_bytes() {
        let message = TextMessage::string("hi");
        assert_eq!(message.type_id(), MSG_STRING);
        assert_eq!(message.payload_len(), 2);
        let mut frame = [0u8; 6];
        assert_eq!(message.encode_payload(&mut frame, 4), Ok(2));
        assert_eq!(&frame[4..6], b"hi");
    }

    #[test]
    fn test_text_is_send_only() {
        let mut message = TextMessage::debug("x");
        assert_eq!(message.type_id(), MSG_DEBUG);
        let frame = [0u8; 8];
        assert_eq!(
            message.decode_payload(&frame, 8, 4),
            Err(MessageError::NotDecodable)
        );
    }

    #[test]
    fn test_encode_bounds_are_checked() {
        let message = TextMessage::string("hello");
        let mut frame = [0u8; 6];
        assert_eq!(
            message.encode_payload(&mut frame, 7),
            Err(MessageError::Offset)
        );
        assert_eq!(
            message.encode_payload(&mut frame, 4),
            Err(MessageError::Capacity)
        );
    }

    #[test]
    fn test_data_roundtrip() {
        let message = DataMessage::from_slice(&[1, 2, 3]).unwrap();
        let mut frame = [0u8; 8];
        assert_eq!(message.encode_payload(&mut frame, 4), Ok(3));

        let mut parsed = DataMessage::new();
        parsed.decode_payload(&frame, 7, 4).unwrap();
        assert_eq!(parsed, message);
    }

    #[test]
    fn test_data_respects_payload_capacity() {
        assert_eq!(
            DataMessage::from_slice(&[0; MAX_PAYLOAD_LEN + 1]),
            Err(MessageError::Capacity)
        );
        assert!(DataMessage::from_slice(&[0; MAX_PAYLOAD_LEN]).is_ok());
    }

    #[test]
    fn test_debug_text_roundtrip() {
        let mut frame = [0u8; 8];
        frame[4..6].copy_from_slice(b"ok");
        let mut message = DebugMessage::new();
        message.decode_payload(&frame, 6, 4).unwrap();
        assert_eq!(message.as_str(), "ok");
    }

    #[test]
    fn test_debug_text_rejects_invalid_utf8() {
        let frame = [0u8, 0, 0, 0, 0xFF, 0xFE];
        let mut message = DebugMessage::new();
        assert_eq!(
            message.decode_payload(&frame, 6, 4),
            Err(MessageError::Malformed)
        );
    }

    #[test]
    fn test_simple_factory_catalog() {
        let mut factory = SimpleFactory;
        assert!(matches!(
            factory.create(MSG_DATA),
            Some(SimpleMessage::Data(_))
        ));
        assert!(matches!(
            factory.create(MSG_DEBUG),
            Some(SimpleMessage::Debug(_))
        ));
        assert!(factory.create(MSG_UNKNOWN).is_none());
        assert!(factory.create(99).is_none());
    }
}
