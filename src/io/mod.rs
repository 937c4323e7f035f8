/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Byte-level I/O primitives (§4.1): a VarUInt/VarInt codec, 8-byte
//! little-endian doubles, and raw UTF-8 bytes, generic over
//! [`std::io::Read`]/[`std::io::Write`] rather than hardcoding `Vec<u8>`.

pub mod byte_reader;
pub mod byte_writer;

pub use byte_reader::ByteReader;
pub use byte_writer::ByteWriter;

/// Default bound on the writer's in-memory buffer before it flushes to the
/// sink, per §5's recommendation.
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;
