/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Digram discovery for one round of the TreeRePair mining loop.
//!
//! A [`DigramKey`] is the triple `(parent_label, child_position,
//! child_label)` of the specification. [`scan`] walks a tree once in
//! preorder and returns, for every key that occurs, the list of its
//! non-overlapping occurrences (identified by the parent node id), together
//! with the preorder position at which the key was *first* seen — used only
//! to break frequency ties deterministically (§4.3, "pick the one inserted
//! earliest").
//!
//! The index is rebuilt by a full rescan at the start of every mining-loop
//! iteration rather than updated incrementally. Each replacement strictly
//! shrinks the tree (§4.3's termination argument already bounds the number
//! of iterations by the initial node count), so a rescan per iteration
//! keeps the occurrence lists and tie-break order trivially correct without
//! having to special-case the edges touched by a replacement.

use std::collections::HashMap;

use crate::symbol::Symbol;
use crate::tree::{NodeId, RankedTree};

/// `(parent_label, child_position, child_label)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DigramKey {
    pub parent: Symbol,
    pub position: usize,
    pub child: Symbol,
}

/// One key's occurrence list plus its discovery order.
#[derive(Debug, Clone)]
pub struct DigramOccurrences {
    pub key: DigramKey,
    /// Ids of the parent node of each non-overlapping occurrence.
    pub parents: Vec<NodeId>,
    /// Rank among all keys found this scan, by first occurrence in
    /// preorder; used for FIFO tie-breaking.
    pub discovery_order: usize,
}

/// Scans `tree` once, returning every digram key that occurs at least once,
/// with its non-overlapping occurrence list and discovery order.
pub fn scan(tree: &RankedTree) -> Vec<DigramOccurrences> {
    let mut order: Vec<DigramKey> = Vec::new();
    let mut index: HashMap<DigramKey, usize> = HashMap::new();
    let mut occurrences: Vec<Vec<NodeId>> = Vec::new();
    // Nodes already consumed as the "child" half of a counted occurrence,
    // per key; such a node cannot also be counted as the "parent" half of
    // another occurrence of the *same* key (the chain-overlap rule).
    let mut blocked: Vec<std::collections::HashSet<NodeId>> = Vec::new();

    for parent_id in tree.preorder() {
        let parent_symbol = tree.symbol(parent_id).clone();
        let children = tree.children(parent_id);
        for (position, &child_id) in children.iter().enumerate() {
            let child_symbol = tree.symbol(child_id).clone();
            let key = DigramKey {
                parent: parent_symbol.clone(),
                position,
                child: child_symbol,
            };
            let slot = *index.entry(key.clone()).or_insert_with(|| {
                order.push(key.clone());
                occurrences.push(Vec::new());
                blocked.push(std::collections::HashSet::new());
                order.len() - 1
            });
            if blocked[slot].contains(&parent_id) {
                continue;
            }
            occurrences[slot].push(parent_id);
            blocked[slot].insert(child_id);
        }
    }

    order
        .into_iter()
        .zip(occurrences)
        .enumerate()
        .filter(|(_, (_, occs))| !occs.is_empty())
        .map(|(discovery_order, (key, parents))| DigramOccurrences {
            key,
            parents,
            discovery_order,
        })
        .collect()
}
