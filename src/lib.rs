/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

#![doc = include_str!("../README.md")]
#![deny(unstable_features)]
#![deny(trivial_casts)]
#![deny(unreachable_code)]
#![deny(unreachable_pub)]
#![deny(unreachable_patterns)]
#![deny(unused_doc_comments)]

pub mod codes;
pub mod decode;
pub mod encode;
pub mod error;
pub mod grammar;
pub mod io;
pub mod options;
pub mod symbol;
pub mod tree;
pub mod treerepair;
pub mod value;

pub use decode::{decode, decode_with_options};
pub use encode::{encode, encode_with_options};
pub use error::Error;
pub use options::Options;
pub use value::{AstNode, Value};

pub mod prelude {
    pub use crate::decode::{decode, decode_with_options};
    pub use crate::encode::{encode, encode_with_options};
    pub use crate::error::{Error, Result};
    pub use crate::options::Options;
    pub use crate::value::{AstNode, Value};
}
