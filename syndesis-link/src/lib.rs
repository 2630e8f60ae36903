//! Protocol engine for the Syndesis serial link
//!
//! [`Link`] binds a transport to a message catalog: it pulls bytes
//! from the port, extracts and validates frames, dispatches decoded
//! messages through a pluggable factory, and answers the
//! acknowledgment handshake.
//!
//! ```text
//! port ──▶ receive_data ──▶ accumulator ──▶ next_message ──▶ app
//!                                               │
//!                            acks, diagnostics  ▼
//! port ◀──────────────── send ◀─────────────────┘
//! ```
//!
//! Everything is caller-driven from one execution context: no
//! threading, no blocking, no internal queues beyond the fixed receive
//! accumulator.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod link;

pub use link::{Inbound, Link, LinkError, RX_BUFFER_LEN};
