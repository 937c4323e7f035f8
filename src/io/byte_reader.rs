/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! A sequential byte reader over a [`std::io::Read`] source.

use std::io::Read;

use crate::error::Error;

/// Maximum VarUInt/VarInt byte length for a 64-bit result, `⌈64/7⌉`.
const MAX_VARINT_BYTES: u32 = 10;

/// Reads VarUInt, VarInt, double and raw UTF-8 tokens from `R`.
pub struct ByteReader<R> {
    inner: R,
}

impl<R: Read> ByteReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn read_byte(&mut self) -> Result<u8, Error> {
        let mut buf = [0u8; 1];
        self.inner
            .read_exact(&mut buf)
            .map_err(|e| io_or_truncated(e, "byte"))?;
        Ok(buf[0])
    }

    /// Reads a VarUInt: 7 bits at a time, least significant first, stopping
    /// at the first byte with its high bit clear.
    pub fn read_varuint(&mut self) -> Result<u64, Error> {
        let mut result: u64 = 0;
        let mut shift: u32 = 0;
        for count in 1..=MAX_VARINT_BYTES {
            let byte = retag(self.read_byte(), "varuint")?;
            result |= ((byte & 0x7f) as u64) << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
            let _ = count;
        }
        Err(Error::Overflow)
    }

    /// Reads a VarInt, sign-extending the final 7-bit group.
    pub fn read_varint(&mut self) -> Result<i64, Error> {
        let mut result: i64 = 0;
        let mut shift: u32 = 0;
        for _ in 1..=MAX_VARINT_BYTES {
            let byte = retag(self.read_byte(), "varint")?;
            result |= ((byte & 0x7f) as i64) << shift;
            shift += 7;
            if byte & 0x80 == 0 {
                if shift < 64 && (byte & 0x40) != 0 {
                    result |= -1i64 << shift;
                }
                return Ok(result);
            }
        }
        Err(Error::Overflow)
    }

    /// Reads 8 little-endian bytes as an exact IEEE-754 double bit pattern.
    pub fn read_double(&mut self) -> Result<f64, Error> {
        let mut buf = [0u8; 8];
        self.inner
            .read_exact(&mut buf)
            .map_err(|e| io_or_truncated(e, "double"))?;
        Ok(f64::from_le_bytes(buf))
    }

    /// Reads exactly `len` raw bytes and validates them as UTF-8.
    pub fn read_utf8(&mut self, len: usize) -> Result<String, Error> {
        let mut buf = vec![0u8; len];
        self.inner
            .read_exact(&mut buf)
            .map_err(|e| io_or_truncated(e, "utf8 bytes"))?;
        String::from_utf8(buf).map_err(|_| Error::InternalInvariant {
            description: "invalid UTF-8 in byte stream".to_string(),
        })
    }
}

fn retag(result: Result<u8, Error>, what: &'static str) -> Result<u8, Error> {
    result.map_err(|e| match e {
        Error::Truncated { .. } => Error::Truncated { what },
        other => other,
    })
}

fn io_or_truncated(e: std::io::Error, what: &'static str) -> Error {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        Error::Truncated { what }
    } else {
        Error::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncated_varuint_reports_truncated() {
        let bytes: [u8; 1] = [0x80]; // continuation bit set, no next byte
        let mut reader = ByteReader::new(&bytes[..]);
        assert!(matches!(
            reader.read_varuint(),
            Err(Error::Truncated { what: "varuint" })
        ));
    }

    #[test]
    fn overlong_varuint_reports_overflow() {
        let bytes = [0x80u8; 11]; // 11 continuation bytes, one past the limit
        let mut reader = ByteReader::new(&bytes[..]);
        assert!(matches!(reader.read_varuint(), Err(Error::Overflow)));
    }

    #[test]
    fn reads_raw_utf8_without_length_prefix() {
        let bytes = "hello".as_bytes();
        let mut reader = ByteReader::new(bytes);
        assert_eq!(reader.read_utf8(5).unwrap(), "hello");
    }
}
