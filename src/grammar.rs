/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Grammar recovery: walking a typed AST to infer its schema.
//!
//! A [`Grammar`] is an ordered mapping from an AST kind to the sorted list
//! of property names every instance of that kind carries. Insertion order
//! (the order in which a kind is first encountered during the walk) becomes
//! the canonical index order used by [`crate::codes`] to assign grammar-kind
//! codes.

use crate::error::Error;
use crate::value::{AstNode, Value};

/// The reserved discriminator property name excluded from a kind's sorted
/// property list (mirroring how a `type` field in a tagged JSON AST
/// duplicates the `kind` already carried out-of-band here).
const TYPE_DISCRIMINATOR: &str = "type";

/// An AST schema: kind name to its ordered (by-insertion) and, within a
/// kind, sorted property name list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grammar {
    /// Insertion-ordered list of kinds, giving the canonical index order.
    order: Vec<String>,
    /// Per-kind sorted property lists, keyed by kind name.
    shapes: std::collections::HashMap<String, Vec<String>>,
}

impl Grammar {
    /// Returns the kinds in canonical (discovery) order.
    pub fn kinds(&self) -> &[String] {
        &self.order
    }

    /// Returns the number of distinct kinds, `G` in the specification.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns the sorted property list for `kind`, if known.
    pub fn properties(&self, kind: &str) -> Option<&[String]> {
        self.shapes.get(kind).map(Vec::as_slice)
    }

    /// Returns the 0-based index of `kind` in canonical order.
    pub fn index_of(&self, kind: &str) -> Option<usize> {
        self.order.iter().position(|k| k == kind)
    }

    fn record(&mut self, kind: &str, mut properties: Vec<String>) -> Result<(), Error> {
        properties.sort();
        match self.shapes.get(kind) {
            None => {
                self.order.push(kind.to_string());
                self.shapes.insert(kind.to_string(), properties);
            }
            Some(expected) if expected == &properties => {}
            Some(expected) => {
                return Err(Error::InconsistentShape {
                    kind: kind.to_string(),
                    expected: expected.clone(),
                    actual: properties,
                });
            }
        }
        Ok(())
    }

    /// Serializes this grammar to the canonical JSON object the header
    /// emission of the specification requires: `{ "Kind": ["propA", ...] }`
    /// in discovery order.
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for kind in &self.order {
            let props = &self.shapes[kind];
            map.insert(
                kind.clone(),
                serde_json::Value::Array(
                    props
                        .iter()
                        .map(|p| serde_json::Value::String(p.clone()))
                        .collect(),
                ),
            );
        }
        serde_json::Value::Object(map)
    }

    /// Parses a grammar back from the canonical JSON object written by
    /// [`Grammar::to_json`], preserving key order (the `serde_json`
    /// `preserve_order` feature is required for this to be correct).
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        let object = value.as_object()?;
        let mut grammar = Grammar::default();
        for (kind, props) in object {
            let props = props
                .as_array()?
                .iter()
                .map(|p| p.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()?;
            grammar.order.push(kind.clone());
            grammar.shapes.insert(kind.clone(), props);
        }
        Some(grammar)
    }
}

/// Walks `root` and infers its [`Grammar`].
///
/// Lists are traversed element-wise without being schematized: list
/// structure is captured at encode time via `cons`/`nil`, not via the
/// grammar. Fails with [`Error::InconsistentShape`] if two instances of the
/// same kind expose different property sets.
pub fn recover_grammar(root: &AstNode) -> Result<Grammar, Error> {
    let mut grammar = Grammar::default();
    visit_node(root, &mut grammar)?;
    Ok(grammar)
}

fn visit_node(node: &AstNode, grammar: &mut Grammar) -> Result<(), Error> {
    let properties: Vec<String> = node
        .properties
        .iter()
        .map(|(name, _)| name.clone())
        .filter(|name| name != TYPE_DISCRIMINATOR)
        .collect();
    grammar.record(&node.kind, properties)?;
    for (name, value) in &node.properties {
        if name == TYPE_DISCRIMINATOR {
            continue;
        }
        visit_value(value, grammar)?;
    }
    Ok(())
}

fn visit_value(value: &Value, grammar: &mut Grammar) -> Result<(), Error> {
    match value {
        Value::Null | Value::Absent | Value::Bool(_) | Value::Number(_) | Value::Str(_) => Ok(()),
        Value::List(items) => {
            for item in items {
                visit_value(item, grammar)?;
            }
            Ok(())
        }
        Value::Node(node) => visit_node(node, grammar),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(kind: &str, props: Vec<(&str, Value)>) -> AstNode {
        AstNode::new(
            kind,
            props.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        )
    }

    #[test]
    fn recovers_sorted_properties_in_discovery_order() {
        let root = node(
            "Script",
            vec![
                ("statements", Value::List(vec![])),
                ("directives", Value::List(vec![])),
            ],
        );
        let grammar = recover_grammar(&root).unwrap();
        assert_eq!(grammar.kinds(), &["Script".to_string()]);
        assert_eq!(
            grammar.properties("Script").unwrap(),
            &["directives".to_string(), "statements".to_string()]
        );
    }

    #[test]
    fn excludes_type_discriminator() {
        let root = node(
            "Script",
            vec![
                ("type", Value::Str("Script".into())),
                ("statements", Value::List(vec![])),
            ],
        );
        let grammar = recover_grammar(&root).unwrap();
        assert_eq!(grammar.properties("Script").unwrap(), &["statements".to_string()]);
    }

    #[test]
    fn rejects_inconsistent_shapes() {
        let root = node(
            "Script",
            vec![(
                "statements",
                Value::List(vec![
                    Value::Node(node("IdentifierExpression", vec![("name", Value::Str("x".into()))])),
                    Value::Node(node("IdentifierExpression", vec![("other", Value::Str("y".into()))])),
                ]),
            )],
        );
        let err = recover_grammar(&root).unwrap_err();
        assert!(matches!(err, Error::InconsistentShape { .. }));
    }
}
