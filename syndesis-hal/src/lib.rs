//! Transport abstraction for the Syndesis serial link
//!
//! The protocol engine drives the wire exclusively through the
//! [`SerialPort`] trait. Chip HALs implement it over their UART or USB
//! peripherals; [`LoopbackSerial`] implements it over in-memory queues
//! so the whole stack can run in host tests and simulations.

#![no_std]
#![deny(unsafe_code)]

pub mod loopback;
pub mod serial;

pub use loopback::LoopbackSerial;
pub use serial::SerialPort;
