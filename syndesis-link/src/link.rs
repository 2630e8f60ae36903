//! The protocol engine
//!
//! One [`Link`] owns one transport, one receive accumulator, and one
//! send scratch buffer. Callers poll `receive_data`, drain messages
//! with `next_message`, and reply with `send`; every call either
//! completes synchronously or returns empty-handed.

use core::fmt::Write as _;

use heapless::String;

use syndesis_hal::SerialPort;
use syndesis_protocol::{
    extract, install_checksum, management_byte, Accumulator, Ack, Extracted, FrameHeader, Message,
    MessageError, MessageFactory, Profile, TextMessage, ACK_ERR_DECODE, ACK_ERR_UNSUPPORTED_TYPE,
    BASE_HEADER_LEN, FULL_HEADER_LEN, MAX_FRAME_LEN,
};

/// Receive accumulator capacity: several frames of headroom over the
/// largest legal frame
pub const RX_BUFFER_LEN: usize = MAX_FRAME_LEN * 4;

/// Errors from the engine's send path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkError<E> {
    /// The encoded frame would exceed the wire's frame limit
    FrameTooLarge,
    /// The transport cannot currently accept a frame of this size
    TxFull,
    /// The message failed to encode its payload
    Encode(MessageError),
    /// The transport itself failed
    Transport(E),
}

/// A decoded message handed to the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound<M> {
    /// The decoded message
    pub message: M,
    /// Its type tag, flag bits stripped
    pub type_id: u8,
    /// Message id to acknowledge once processing succeeds, when the
    /// sender asked for a deferred ack
    pub pending_ack: Option<u16>,
}

/// Protocol engine binding a transport to a message catalog
pub struct Link<S, F> {
    serial: S,
    factory: F,
    profile: Profile,
    rx: Accumulator<RX_BUFFER_LEN>,
    scratch: [u8; MAX_FRAME_LEN],
    next_id: u16,
}

impl<S, F> Link<S, F>
where
    S: SerialPort,
    F: MessageFactory,
{
    /// Create an engine over `serial`, dispatching received messages
    /// through `factory`
    pub fn new(serial: S, factory: F, profile: Profile) -> Self {
        Self {
            serial,
            factory,
            profile,
            rx: Accumulator::new(),
            scratch: [0; MAX_FRAME_LEN],
            next_id: 0,
        }
    }

    /// The wire profile this engine speaks
    pub fn profile(&self) -> Profile {
        self.profile
    }

    /// Direct access to the owned transport
    pub fn serial_mut(&mut self) -> &mut S {
        &mut self.serial
    }

    /// Pull whatever the transport currently has into the accumulator
    ///
    /// Performs at most one bounded read. Returns the number of bytes
    /// buffered. When the accumulator is full the bytes are lost:
    /// there is no retransmission layer to recover them, so the loss
    /// is accepted rather than queued.
    pub fn receive_data(&mut self) -> Result<usize, LinkError<S::Error>> {
        if self.serial.bytes_available() == 0 {
            return Ok(0);
        }
        let count = self
            .serial
            .read(&mut self.scratch)
            .map_err(LinkError::Transport)?;
        if count == 0 {
            return Ok(0);
        }
        match self.rx.append(&self.scratch[..count]) {
            Ok(buffered) => Ok(buffered),
            Err(_) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("receive buffer full, dropping {} bytes", count);
                Ok(0)
            }
        }
    }

    /// Extract, validate, and dispatch at most one frame
    ///
    /// Returns the decoded message, or `None` when no complete valid
    /// frame is buffered. Corrupt, unsupported, and undecodable frames
    /// are consumed and reported (failure acks go back when the sender
    /// asked for one), so repeated calls always make progress.
    pub fn next_message(&mut self) -> Option<Inbound<F::Message>> {
        let mut frame = [0u8; MAX_FRAME_LEN];
        match extract(&mut self.rx, &mut frame) {
            Extracted::Idle | Extracted::Pending => None,
            Extracted::Corrupt { len } => {
                // Checksum failures are dropped without a failure ack;
                // the peer only gets a diagnostic
                #[cfg(feature = "defmt")]
                defmt::warn!("dropping {} byte frame: checksum mismatch", len);
                let _ = len;
                self.debug_notify("checksum mismatch");
                None
            }
            Extracted::Frame { len } => self.dispatch(&frame[..len]),
        }
    }

    fn dispatch(&mut self, frame: &[u8]) -> Option<Inbound<F::Message>> {
        let header = match FrameHeader::parse(frame, self.profile) {
            Ok(header) => header,
            Err(_) => {
                self.debug_notify("malformed frame header");
                return None;
            }
        };

        let Some(mut message) = self.factory.create(header.type_id) else {
            let mut text: String<48> = String::new();
            let _ = write!(text, "message type {} not supported", header.type_id);
            self.debug_notify(&text);
            if let Some(id) = header.message_id {
                let _ = self.send_ack_fail(header.type_id, id, ACK_ERR_UNSUPPORTED_TYPE);
            }
            return None;
        };

        match message.decode_payload(frame, frame.len(), header.payload_start()) {
            Ok(()) => {
                let mut pending_ack = None;
                if let Some(id) = header.message_id {
                    if header.ack_on_receive {
                        let _ = self.send_ack_success(header.type_id, id);
                    } else {
                        pending_ack = Some(id);
                    }
                }
                Some(Inbound {
                    message,
                    type_id: header.type_id,
                    pending_ack,
                })
            }
            Err(error) => {
                let mut text: String<48> = String::new();
                let _ = write!(text, "type {} decode failed: {:?}", header.type_id, error);
                self.debug_notify(&text);
                if let Some(id) = header.message_id {
                    let _ = self.send_ack_fail(header.type_id, id, ACK_ERR_DECODE);
                }
                None
            }
        }
    }

    /// Frame and transmit one message
    ///
    /// Builds the header in the scratch buffer, assigns an id when the
    /// message wants an ack, installs the checksum, and hands the
    /// whole frame to the transport. Fails without writing anything if
    /// the frame would exceed the wire limit or the transport lacks
    /// capacity for all of it. Returns the bytes put on the wire.
    pub fn send<M>(&mut self, message: &M) -> Result<usize, LinkError<S::Error>>
    where
        M: Message + ?Sized,
    {
        let mut type_id = message.type_id();
        if type_id > self.profile.max_type_id() {
            self.debug_notify("message type above profile maximum");
            type_id = self.profile.max_type_id();
        }

        let needs_ack = self.profile.supports_ack() && message.needs_ack();
        let header_len = if needs_ack {
            FULL_HEADER_LEN
        } else {
            BASE_HEADER_LEN
        };
        let total = header_len + message.payload_len();
        if total > MAX_FRAME_LEN {
            return Err(LinkError::FrameTooLarge);
        }
        if self.serial.write_capacity() < total {
            return Err(LinkError::TxFull);
        }

        self.scratch[0] = total as u8;
        self.scratch[1] =
            management_byte(self.profile, type_id, needs_ack, message.ack_on_receive());
        self.scratch[2] = 0;
        self.scratch[3] = 0;
        if needs_ack {
            let id = self.next_id;
            self.next_id = self.next_id.wrapping_add(1);
            self.scratch[4..6].copy_from_slice(&id.to_be_bytes());
        }

        let written = message
            .encode_payload(&mut self.scratch, header_len)
            .map_err(LinkError::Encode)?;
        debug_assert_eq!(written, message.payload_len());
        install_checksum(&mut self.scratch[..total]);

        let sent = self
            .serial
            .write(&self.scratch[..total])
            .map_err(LinkError::Transport)?;
        self.serial.flush().map_err(LinkError::Transport)?;
        Ok(sent)
    }

    /// Acknowledge a received message as successfully handled
    pub fn send_ack_success(
        &mut self,
        acked_type: u8,
        acked_id: u16,
    ) -> Result<usize, LinkError<S::Error>> {
        self.send(&Ack::success(acked_type, acked_id))
    }

    /// Report a received message as failed, with an error code
    pub fn send_ack_fail(
        &mut self,
        acked_type: u8,
        acked_id: u16,
        error: u8,
    ) -> Result<usize, LinkError<S::Error>> {
        self.send(&Ack::fail(acked_type, acked_id, error))
    }

    /// Send human-readable text in the profile's text type
    ///
    /// Receivers should treat it as a diagnostic and display it.
    pub fn send_text(&mut self, text: &str) -> Result<usize, LinkError<S::Error>> {
        let message = match self.profile {
            Profile::Extended => TextMessage::string(text),
            Profile::Simple => TextMessage::debug(text),
        };
        self.send(&message)
    }

    /// Emit a diagnostic locally and, best-effort, to the peer
    fn debug_notify(&mut self, text: &str) {
        #[cfg(feature = "defmt")]
        defmt::warn!("{=str}", text);
        let _ = self.send_text(text);
    }
}
