/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Error types returned by the grammar recoverer, the encoder and the
//! decoder.
//!
//! Following the error kinds table of the specification, every failure mode
//! is a variant of a single [`Error`] enum rather than a string or a
//! type-erased dynamic error: callers that need to branch on a specific
//! failure (e.g. a CLI reporting `VersionMismatch` specially) can match on
//! it directly.

use thiserror::Error;

/// Errors that can occur while recovering a grammar, encoding or decoding.
#[derive(Error, Debug)]
pub enum Error {
    /// The underlying reader or writer failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The byte stream ended in the middle of a token.
    #[error("truncated stream while reading a {what}")]
    Truncated {
        /// What was being read when the stream ran out (e.g. `"varuint"`).
        what: &'static str,
    },

    /// A `VarUInt` used more bytes than fit in a 64-bit result.
    #[error("varuint overflowed 64 bits")]
    Overflow,

    /// The same AST kind was observed with two different property sets.
    #[error("inconsistent shape for kind {kind:?}: expected {expected:?}, got {actual:?}")]
    InconsistentShape {
        /// The AST kind whose shape disagreed across instances.
        kind: String,
        /// The property set first recorded for `kind`.
        expected: Vec<String>,
        /// The conflicting property set observed later.
        actual: Vec<String>,
    },

    /// A value was none of the supported primitive classes (`null`, `⊥`,
    /// `true`, `false`, a finite double, or a UTF-8 string).
    #[error("unsupported primitive value: {description}")]
    UnsupportedPrimitive {
        /// A short description of the offending value (not its full content).
        description: String,
    },

    /// An AST node's kind is absent from the recovered grammar.
    #[error("unknown AST kind {kind:?}")]
    UnknownKind {
        /// The offending kind name.
        kind: String,
    },

    /// The decoder's built-in count did not match the only count this
    /// decoder understands (6).
    #[error("version mismatch: decoder understands 6 built-ins, stream declares {found}")]
    VersionMismatch {
        /// The built-in count found in the stream.
        found: u64,
    },

    /// A tag read during decoding fell outside every known code partition.
    #[error("unknown tag {tag}")]
    UnknownTag {
        /// The offending tag value.
        tag: u64,
    },

    /// The decoded root was not of kind `Script` or `Module`.
    #[error("unexpected root kind {kind:?}, expected Script or Module")]
    UnexpectedRoot {
        /// The kind of the decoded root node.
        kind: String,
    },

    /// A structural invariant of the TreeRePair engine was violated. This
    /// indicates a bug in the encoder, not a problem with the input.
    #[error("internal invariant violated: {description}")]
    InternalInvariant {
        /// What invariant was violated.
        description: String,
    },
}

/// Convenience alias used throughout this crate.
pub type Result<T> = core::result::Result<T, Error>;
