//! In-memory serial port for host tests and simulation
//!
//! Bytes staged with [`LoopbackSerial::push_inbound`] appear on the
//! read side as if they had arrived on the wire; frames written by the
//! engine land in the outbound queue, where a test can inspect them or
//! feed them to a peer.

use core::convert::Infallible;

use heapless::{Deque, Vec};

use crate::serial::SerialPort;

/// Queue-backed serial port with `N` bytes of buffering per direction
#[derive(Debug, Default)]
pub struct LoopbackSerial<const N: usize> {
    inbound: Deque<u8, N>,
    outbound: Deque<u8, N>,
}

impl<const N: usize> LoopbackSerial<N> {
    /// Create a port with empty queues
    pub fn new() -> Self {
        Self {
            inbound: Deque::new(),
            outbound: Deque::new(),
        }
    }

    /// Stage bytes on the read side
    ///
    /// Returns the number queued; stops early if the queue fills.
    pub fn push_inbound(&mut self, bytes: &[u8]) -> usize {
        let mut queued = 0;
        for &byte in bytes {
            if self.inbound.push_back(byte).is_err() {
                break;
            }
            queued += 1;
        }
        queued
    }

    /// Bytes written by the engine and not yet drained
    pub fn outbound_len(&self) -> usize {
        self.outbound.len()
    }

    /// Take everything the engine has written so far
    pub fn drain_outbound(&mut self) -> Vec<u8, N> {
        let mut out = Vec::new();
        while let Some(byte) = self.outbound.pop_front() {
            // Cannot fail: the queue and the vec share a capacity
            let _ = out.push(byte);
        }
        out
    }
}

impl<const N: usize> SerialPort for LoopbackSerial<N> {
    type Error = Infallible;

    fn bytes_available(&self) -> usize {
        self.inbound.len()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Infallible> {
        let mut count = 0;
        while count < buf.len() {
            match self.inbound.pop_front() {
                Some(byte) => {
                    buf[count] = byte;
                    count += 1;
                }
                None => break,
            }
        }
        Ok(count)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, Infallible> {
        let mut accepted = 0;
        for &byte in data {
            if self.outbound.push_back(byte).is_err() {
                break;
            }
            accepted += 1;
        }
        Ok(accepted)
    }

    fn flush(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn write_capacity(&self) -> usize {
        N - self.outbound.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inbound_bytes_become_readable() {
        let mut port = LoopbackSerial::<8>::new();
        assert_eq!(port.push_inbound(&[1, 2, 3]), 3);
        assert_eq!(port.bytes_available(), 3);

        let mut buf = [0u8; 2];
        assert_eq!(port.read(&mut buf), Ok(2));
        assert_eq!(buf, [1, 2]);
        assert_eq!(port.bytes_available(), 1);
    }

    #[test]
    fn test_read_is_bounded_and_nonblocking() {
        let mut port = LoopbackSerial::<8>::new();
        port.push_inbound(&[9]);
        let mut buf = [0u8; 4];
        assert_eq!(port.read(&mut buf), Ok(1));
        assert_eq!(port.read(&mut buf), Ok(0));
    }

    #[test]
    fn test_push_inbound_stops_at_capacity() {
        let mut port = LoopbackSerial::<4>::new();
        assert_eq!(port.push_inbound(&[0; 6]), 4);
        assert_eq!(port.bytes_available(), 4);
    }

    #[test]
    fn test_written_bytes_can_be_drained() {
        let mut port = LoopbackSerial::<8>::new();
        assert_eq!(port.write(&[5, 6, 7]), Ok(3));
        assert_eq!(port.write_capacity(), 5);
        assert_eq!(port.outbound_len(), 3);

        let drained = port.drain_outbound();
        assert_eq!(&drained[..], &[5, 6, 7]);
        assert_eq!(port.write_capacity(), 8);
    }
}
