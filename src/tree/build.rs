/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Builds the initial (uncompressed) [`RankedTree`] from an [`AstNode`],
//! per §4.5 of the specification: primitives become leaves of dedicated
//! terminals, strings and numbers are interned as they are first seen,
//! lists right-fold into `cons`/`nil` chains, and typed nodes become a node
//! labelled by the kind's terminal with one child per declared property, in
//! declared order.

use std::collections::HashMap;

use crate::error::Error;
use crate::grammar::Grammar;
use crate::symbol::{Symbol, Terminal};
use crate::tree::{NodeId, RankedTree};
use crate::value::{AstNode, Value};

/// Tracks first-sight order and use counts for interned string and numeric
/// literals, gathered while the initial tree is built (before any TreeRePair
/// mining happens).
#[derive(Debug, Default)]
pub struct Interner {
    string_order: Vec<String>,
    string_counts: HashMap<String, usize>,
    number_order: Vec<u64>,
    number_counts: HashMap<u64, usize>,
}

impl Interner {
    fn intern_string(&mut self, s: &str) {
        if let Some(count) = self.string_counts.get_mut(s) {
            *count += 1;
        } else {
            self.string_order.push(s.to_string());
            self.string_counts.insert(s.to_string(), 1);
        }
    }

    fn intern_number(&mut self, bits: u64) {
        if let Some(count) = self.number_counts.get_mut(&bits) {
            *count += 1;
        } else {
            self.number_order.push(bits);
            self.number_counts.insert(bits, 1);
        }
    }

    /// Strings in first-sight order, paired with their use count.
    pub fn strings(&self) -> Vec<(String, usize)> {
        self.string_order
            .iter()
            .map(|s| (s.clone(), self.string_counts[s]))
            .collect()
    }

    /// Numeric literal bit patterns in first-sight order, paired with their
    /// use count.
    pub fn numbers(&self) -> Vec<(u64, usize)> {
        self.number_order
            .iter()
            .map(|bits| (*bits, self.number_counts[bits]))
            .collect()
    }
}

/// Builds the initial ranked tree for `root`, validating every primitive and
/// kind against `grammar` along the way.
pub fn build_tree(
    root: &AstNode,
    grammar: &Grammar,
    interner: &mut Interner,
) -> Result<RankedTree, Error> {
    let mut tree = RankedTree::new();
    let root_id = build_node(&mut tree, root, grammar, interner)?;
    tree.set_root(root_id);
    Ok(tree)
}

fn build_node(
    tree: &mut RankedTree,
    node: &AstNode,
    grammar: &Grammar,
    interner: &mut Interner,
) -> Result<NodeId, Error> {
    let properties = grammar
        .properties(&node.kind)
        .ok_or_else(|| Error::UnknownKind {
            kind: node.kind.clone(),
        })?
        .to_vec();

    let mut children = Vec::with_capacity(properties.len());
    for property in &properties {
        let value = node
            .property(property)
            .cloned()
            .unwrap_or(Value::Absent);
        children.push(build_value(tree, &value, grammar, interner)?);
    }

    Ok(tree.alloc(Symbol::Terminal(Terminal::Kind(node.kind.clone())), children))
}

fn build_value(
    tree: &mut RankedTree,
    value: &Value,
    grammar: &Grammar,
    interner: &mut Interner,
) -> Result<NodeId, Error> {
    match value {
        Value::Null => Ok(tree.alloc(Symbol::Terminal(Terminal::Null), vec![])),
        Value::Absent => Ok(tree.alloc(Symbol::Terminal(Terminal::Absent), vec![])),
        Value::Bool(true) => Ok(tree.alloc(Symbol::Terminal(Terminal::True), vec![])),
        Value::Bool(false) => Ok(tree.alloc(Symbol::Terminal(Terminal::False), vec![])),
        Value::Number(n) => {
            if !n.is_finite() && !n.is_nan() {
                return Err(Error::UnsupportedPrimitive {
                    description: "non-finite, non-NaN number".to_string(),
                });
            }
            let bits = n.to_bits();
            interner.intern_number(bits);
            Ok(tree.alloc(Symbol::Terminal(Terminal::Number(bits)), vec![]))
        }
        Value::Str(s) => {
            interner.intern_string(s);
            Ok(tree.alloc(Symbol::Terminal(Terminal::String(s.clone())), vec![]))
        }
        Value::List(items) => build_list(tree, items, grammar, interner),
        Value::Node(node) => build_node(tree, node, grammar, interner),
    }
}

fn build_list(
    tree: &mut RankedTree,
    items: &[Value],
    grammar: &Grammar,
    interner: &mut Interner,
) -> Result<NodeId, Error> {
    let mut tail = tree.alloc(Symbol::Terminal(Terminal::Nil), vec![]);
    for item in items.iter().rev() {
        let head = build_value(tree, item, grammar, interner)?;
        tail = tree.alloc(Symbol::Terminal(Terminal::Cons), vec![head, tail]);
    }
    Ok(tail)
}
