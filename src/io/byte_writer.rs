/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! A sequential byte writer, bounded-buffered over a [`std::io::Write`] sink.

use std::io::Write;

use crate::error::Error;

use super::DEFAULT_BUFFER_SIZE;

/// Writes VarUInt, VarInt, double and raw UTF-8 tokens to `W`, buffering up
/// to `capacity` bytes in memory before flushing.
pub struct ByteWriter<W> {
    inner: W,
    buffer: Vec<u8>,
    capacity: usize,
    written: u64,
}

impl<W: Write> ByteWriter<W> {
    pub fn new(inner: W) -> Self {
        Self::with_capacity(inner, DEFAULT_BUFFER_SIZE)
    }

    pub fn with_capacity(inner: W, capacity: usize) -> Self {
        Self {
            inner,
            buffer: Vec::with_capacity(capacity),
            capacity,
            written: 0,
        }
    }

    /// Total number of bytes handed to this writer so far, flushed or not.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    fn push(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.buffer.extend_from_slice(bytes);
        self.written += bytes.len() as u64;
        if self.buffer.len() >= self.capacity {
            self.flush()?;
        }
        Ok(())
    }

    pub fn write_byte(&mut self, byte: u8) -> Result<(), Error> {
        self.push(&[byte])
    }

    /// Writes `value` 7 bits at a time, least significant first, with the
    /// high bit set on every byte but the last.
    pub fn write_varuint(&mut self, value: u64) -> Result<(), Error> {
        let mut value = value;
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            if value == 0 {
                self.write_byte(byte)?;
                return Ok(());
            }
            self.write_byte(byte | 0x80)?;
        }
    }

    /// Writes `value` via two's-complement arithmetic shifts of 7 bits,
    /// stopping once the remaining value fits in a signed 7-bit group.
    pub fn write_varint(&mut self, value: i64) -> Result<(), Error> {
        let mut value = value;
        loop {
            let byte = (value & 0x7f) as u8;
            value >>= 7;
            let done = (value == 0 && byte & 0x40 == 0) || (value == -1 && byte & 0x40 != 0);
            if done {
                self.write_byte(byte)?;
                return Ok(());
            }
            self.write_byte(byte | 0x80)?;
        }
    }

    /// Writes `value`'s exact IEEE-754 bit pattern as 8 little-endian bytes.
    pub fn write_double(&mut self, value: f64) -> Result<(), Error> {
        self.push(&value.to_le_bytes())
    }

    /// Writes `s`'s raw UTF-8 bytes, unprefixed.
    pub fn write_utf8(&mut self, s: &str) -> Result<(), Error> {
        self.push(s.as_bytes())
    }

    /// Flushes any buffered bytes to the sink.
    pub fn flush(&mut self) -> Result<(), Error> {
        if !self.buffer.is_empty() {
            self.inner.write_all(&self.buffer)?;
            self.buffer.clear();
        }
        Ok(())
    }

    /// Flushes and returns the underlying sink.
    pub fn into_inner(mut self) -> Result<W, Error> {
        self.flush()?;
        Ok(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ByteReader;

    #[test]
    fn varuint_round_trips_across_byte_lengths() {
        for &v in &[0u64, 1, 63, 64, 127, 128, 300, u32::MAX as u64, u64::MAX] {
            let mut buf = Vec::new();
            let mut writer = ByteWriter::new(&mut buf);
            writer.write_varuint(v).unwrap();
            writer.flush().unwrap();
            let mut reader = ByteReader::new(buf.as_slice());
            assert_eq!(reader.read_varuint().unwrap(), v, "round-trip of {v}");
        }
    }

    #[test]
    fn varint_round_trips_negative_and_positive() {
        for &v in &[0i64, 1, -1, 63, -64, 64, -65, i32::MIN as i64, i64::MIN, i64::MAX] {
            let mut buf = Vec::new();
            let mut writer = ByteWriter::new(&mut buf);
            writer.write_varint(v).unwrap();
            writer.flush().unwrap();
            let mut reader = ByteReader::new(buf.as_slice());
            assert_eq!(reader.read_varint().unwrap(), v, "round-trip of {v}");
        }
    }

    #[test]
    fn double_preserves_nan_bit_pattern() {
        let payload: u64 = 0x7ff8000000000001;
        let value = f64::from_bits(payload);
        let mut buf = Vec::new();
        let mut writer = ByteWriter::new(&mut buf);
        writer.write_double(value).unwrap();
        writer.flush().unwrap();
        let mut reader = ByteReader::new(buf.as_slice());
        assert_eq!(reader.read_double().unwrap().to_bits(), payload);
    }

    #[test]
    fn flushes_automatically_once_capacity_is_reached() {
        let mut buf = Vec::new();
        {
            let mut writer = ByteWriter::with_capacity(&mut buf, 4);
            writer.write_byte(1).unwrap();
            writer.write_byte(2).unwrap();
            writer.write_byte(3).unwrap();
            writer.write_byte(4).unwrap();
            // capacity reached: already flushed without an explicit call.
            assert_eq!(writer.bytes_written(), 4);
        }
        assert_eq!(buf, vec![1, 2, 3, 4]);
    }
}
