//! CRC-16 checksum, XModem variant
//!
//! Polynomial 0x1021, initial value 0, no reflection. Multi-byte wire
//! fields carrying the result are big-endian.

/// Compute the XModem CRC-16 over a byte range
///
/// Pure and deterministic; select a sub-range by slicing.
pub fn crc16_xmodem(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ 0x1021;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}
