//! The message abstraction
//!
//! Every wire message reports its type tag, its encoded payload size,
//! and its acknowledgment expectations, and knows how to encode itself
//! into and decode itself out of a frame. Receive-side dispatch goes
//! through [`MessageFactory`], the extension point for user-defined
//! message types.

/// Errors from message encode/decode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MessageError {
    /// Start offset lies outside the destination or frame
    Offset,
    /// The write would overrun the destination
    Capacity,
    /// The payload bytes do not parse as this message type
    Malformed,
    /// This variant is send-only
    NotDecodable,
}

/// One logical message carried by a frame
pub trait Message {
    /// Numeric type tag (range depends on the wire profile)
    fn type_id(&self) -> u8;

    /// Encoded payload length in bytes
    fn payload_len(&self) -> usize;

    /// Whether the sender expects an acknowledgment
    fn needs_ack(&self) -> bool {
        false
    }

    /// Whether the acknowledgment should come on receipt, before any
    /// application-level processing
    fn ack_on_receive(&self) -> bool {
        false
    }

    /// Write exactly [`payload_len`](Message::payload_len) bytes into
    /// `frame` starting at `at`
    ///
    /// Returns the number of bytes written. Must not write anything on
    /// failure.
    fn encode_payload(&self, frame: &mut [u8], at: usize) -> Result<usize, MessageError>;

    /// Parse `frame[at..frame_len]` into this instance
    fn decode_payload(&mut self, frame: &[u8], frame_len: usize, at: usize)
        -> Result<(), MessageError>;
}

/// Receive-side factory mapping a type tag to a fresh instance
///
/// Returning `None` marks the tag as unsupported, which the engine
/// reports to an acknowledgment-requesting sender as a failure ack.
pub trait MessageFactory {
    /// The message representation this factory produces
    type Message: Message;

    /// Produce an instance ready to decode a frame of type `type_id`
    fn create(&mut self, type_id: u8) -> Option<Self::Message>;
}

/// Bounds-checked destination span for encoding
pub(crate) fn encode_span(
    frame: &mut [u8],
    at: usize,
    need: usize,
) -> Result<&mut [u8], MessageError> {
    if at > frame.len() {
        return Err(MessageError::Offset);
    }
    if at + need > frame.len() {
        return Err(MessageError::Capacity);
    }
    Ok(&mut frame[at..at + need])
}

/// Bounds-checked source span for decoding
pub(crate) fn decode_span(
    frame: &[u8],
    frame_len: usize,
    at: usize,
) -> Result<&[u8], MessageError> {
    if frame_len > frame.len() || at > frame_len {
        return Err(MessageError::Offset);
    }
    Ok(&frame[at..frame_len])
}
