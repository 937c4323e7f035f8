/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Tunables that do not change wire semantics (§2 item 9), mirroring the
//! host codebase's small `*Config` structs (e.g. its `BvCompConfig`) rather
//! than an external configuration file format.

use crate::io::DEFAULT_BUFFER_SIZE;

/// Encode/decode tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Size, in bytes, of the writer's in-memory buffer before it flushes.
    pub buffer_size: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }
}
