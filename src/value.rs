/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The in-memory AST representation the codec operates over.
//!
//! The real JavaScript parser that produces an AST, and the AST-rewriting
//! utilities that canonicalize it, are external collaborators out of scope
//! for this crate (see the crate-level documentation). What is in scope is
//! the shape such a tree must have for the codec to make sense of it: an
//! opaque typed record identified by a *kind* string, exposing an ordered
//! list of named properties whose values are themselves nodes, lists, or
//! primitives.

/// A property value: either a primitive, an ordered list of values, or a
/// nested node.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// JavaScript `null`.
    Null,
    /// The distinguished "missing" value, written `⊥` in the specification
    /// (used where a grammar production has an optional slot that was not
    /// filled, e.g. a missing `else` branch).
    Absent,
    /// A boolean literal.
    Bool(bool),
    /// A finite or non-finite IEEE-754 double, including `NaN` with an
    /// arbitrary payload. Bit patterns are preserved exactly, not just
    /// numeric value (see the NaN-preservation property in the
    /// specification's testable properties).
    Number(f64),
    /// A UTF-8 string.
    Str(String),
    /// An ordered, homogeneous-in-nesting list of values.
    List(Vec<Value>),
    /// A nested typed node.
    Node(AstNode),
}

/// An AST node: a *kind* tag plus an ordered list of named properties.
///
/// All instances of a given `kind` in a tree handed to [`crate::grammar`]
/// must expose the same property name set (the specification's shape
/// invariant); this type does not enforce that itself, it is enforced at
/// grammar recovery time.
#[derive(Debug, Clone, PartialEq)]
pub struct AstNode {
    pub kind: String,
    pub properties: Vec<(String, Value)>,
}

impl AstNode {
    /// Constructs a node of the given kind from an ordered property list.
    ///
    /// This is the "construct by kind name and property map" contract the
    /// decoder relies on (§6 of the specification): a real embedding would
    /// dispatch to a generated per-kind constructor instead of storing the
    /// kind as a string, but the contract is the same either way.
    pub fn new(kind: impl Into<String>, properties: Vec<(String, Value)>) -> Self {
        Self {
            kind: kind.into(),
            properties,
        }
    }

    /// Returns the value of `name`, if present, in declaration order.
    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }
}

impl Value {
    /// A human-readable tag for error messages, never the full content.
    pub(crate) fn kind_description(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Absent => "absent",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Node(_) => "node",
        }
    }
}
