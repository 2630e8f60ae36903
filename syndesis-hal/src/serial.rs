//! Serial port trait
//!
//! A byte-oriented, half-duplex stream with capacity queries on both
//! directions. The protocol engine never issues more than one bounded
//! read per poll and never starts a write the port cannot accept
//! whole.

/// Byte-oriented, half-duplex serial port
pub trait SerialPort {
    /// Error type for transport operations
    type Error;

    /// Number of received bytes ready to read
    fn bytes_available(&self) -> usize;

    /// Read up to `buf.len()` bytes, returning the count actually read
    ///
    /// Must not block waiting for more data; a short read is the
    /// normal case.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write bytes, returning the count accepted
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Push any buffered output onto the wire
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Number of bytes the port can currently accept for writing
    fn write_capacity(&self) -> usize;
}
