//! Bit-granular adapters over byte streams.
//!
//! `BitSink`/`BitSource` are parametrized over `std::io::Write`/`std::io::Read`
//! rather than any concrete file or buffer type, so the same code serves
//! files, `Vec<u8>` buffers (via `Cursor`), or pipes. Each holds exactly one
//! partial byte of state, matching the reference implementation's `BitStream`
//! (see `examples/original_source/comp.c`, which this module ports bit for
//! bit): bits are packed MSB-first within each byte.

use crate::Error;
use std::io::{Read, Write};

/// Accumulates bits MSB-first and emits whole bytes to `inner` as they fill.
pub struct BitSink<W: Write> {
    inner: W,
    partial_byte: u8,
    bits_used: u8,
}

impl<W: Write> BitSink<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, partial_byte: 0, bits_used: 0 }
    }

    /// Appends the low `width` bits of `value`, most significant bit first.
    /// `width` may be 1..=32, though callers in this crate only ever use
    /// 4, 8, or 16.
    pub fn write(&mut self, value: u32, width: u8) -> Result<(), Error> {
        let mut remaining = width;
        while remaining > 0 {
            if self.bits_used == 8 {
                self.inner.write_all(&[self.partial_byte])?;
                self.partial_byte = 0;
                self.bits_used = 0;
            }
            let to_send = (8 - self.bits_used).min(remaining);
            let shift = remaining - to_send;
            let mask = (1u32 << to_send) - 1;
            let bits = ((value >> shift) & mask) as u8;
            self.partial_byte |= bits << (8 - self.bits_used - to_send);
            self.bits_used += to_send;
            remaining -= to_send;
        }
        Ok(())
    }

    /// Emits the partial byte, if any, zero-padded on the low end, and
    /// resets. A no-op when already byte-aligned.
    pub fn flush(&mut self) -> Result<(), Error> {
        if self.bits_used > 0 {
            self.inner.write_all(&[self.partial_byte])?;
            self.partial_byte = 0;
            self.bits_used = 0;
        }
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Refills a partial byte from `inner` on demand and hands out bits MSB-first.
pub struct BitSource<R: Read> {
    inner: R,
    partial_byte: u8,
    bits_available: u8,
}

impl<R: Read> BitSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, partial_byte: 0, bits_available: 0 }
    }

    /// Reads the next `width` bits as an integer. Returns `Error::Truncated`
    /// if the underlying stream hits EOF while a refill is needed.
    pub fn read(&mut self, width: u8) -> Result<u32, Error> {
        let mut ret: u32 = 0;
        let mut remaining = width;
        while remaining > 0 {
            let mut to_get = self.bits_available;
            if to_get == 0 {
                let mut byte = [0u8; 1];
                if self.inner.read(&mut byte)? == 0 {
                    return Err(Error::Truncated);
                }
                self.partial_byte = byte[0];
                self.bits_available = 8;
                to_get = 8;
            }
            if remaining < to_get {
                to_get = remaining;
            }
            let shift = self.bits_available - to_get;
            let mask = (1u32 << to_get) - 1;
            ret <<= to_get;
            ret |= ((self.partial_byte >> shift) as u32) & mask;
            remaining -= to_get;
            self.bits_available -= to_get;
        }
        Ok(ret)
    }

    /// Drops any buffered bits, forcing the next `read` to refill from
    /// `inner`. Called at every block boundary to match the encoder's
    /// per-block `flush`.
    pub fn align(&mut self) {
        self.bits_available = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn round_trip_mixed_widths() {
        let mut buf = Vec::new();
        {
            let mut sink = BitSink::new(&mut buf);
            sink.write(0b1, 1).unwrap();
            sink.write(0b01, 2).unwrap();
            sink.write(0b10, 2).unwrap();
            sink.flush().unwrap();
        }
        assert_eq!(buf, vec![0xB0]);

        let mut source = BitSource::new(Cursor::new(buf));
        assert_eq!(source.read(1).unwrap(), 0b1);
        assert_eq!(source.read(2).unwrap(), 0b01);
        assert_eq!(source.read(2).unwrap(), 0b10);
    }

    #[test]
    fn round_trip_wide_values() {
        let mut buf = Vec::new();
        {
            let mut sink = BitSink::new(&mut buf);
            sink.write(4096, 16).unwrap();
            sink.write(9, 4).unwrap();
            sink.write(0, 4).unwrap();
            sink.flush().unwrap();
        }
        let mut source = BitSource::new(Cursor::new(buf));
        assert_eq!(source.read(16).unwrap(), 4096);
        assert_eq!(source.read(4).unwrap(), 9);
        assert_eq!(source.read(4).unwrap(), 0);
    }

    #[test]
    fn flush_idempotent_when_aligned() {
        let mut buf = Vec::new();
        let mut sink = BitSink::new(&mut buf);
        sink.write(0xFF, 8).unwrap();
        sink.flush().unwrap();
        let after_first = buf.clone();
        sink.flush().unwrap();
        assert_eq!(buf, after_first);
    }

    #[test]
    fn truncated_read_reports_error() {
        let mut source = BitSource::new(Cursor::new(Vec::<u8>::new()));
        assert!(matches!(source.read(1), Err(Error::Truncated)));
    }

    #[test]
    fn align_drops_partial_byte() {
        let mut buf = Vec::new();
        {
            let mut sink = BitSink::new(&mut buf);
            sink.write(0b1010, 4).unwrap();
            sink.write(0xFF, 8).unwrap();
            sink.flush().unwrap();
        }
        let mut source = BitSource::new(Cursor::new(buf));
        source.read(2).unwrap();
        source.align();
        // After align, the remaining 6 buffered bits of the first byte are
        // gone; the next read refills from the following byte instead of
        // resuming mid-byte.
        assert_eq!(source.read(4).unwrap(), 0b1111);
    }
}
