/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The symbol code space: a single, fixed-order partitioning of every
//! symbol into a non-negative integer code (§4.4).
//!
//! ```text
//! [0, P)                  parameters, discovery order
//! [P, P+6)                built-ins: nil, null, cons, false, true, ⊥
//! [P+6, P+6+M)             meta-rules, grouped by rank ascending, by
//!                         discovery order within a rank
//! [P+6+M, P+6+M+G)         grammar kinds, grammar insertion order
//! [.., +S)                string constants, lexicographic ascending
//! [.., +F)                numeric constants, descending occurrence count
//! ```
//!
//! [`CodeSpace`] is built once — by the encoder from the mined grammar and
//! interned pools, or by the decoder from the header it has just read — and
//! is then used symmetrically: the encoder maps symbols to codes, the
//! decoder maps codes back to symbols via [`CodeSpace::classify`].

use std::collections::HashMap;

use crate::error::Error;
use crate::grammar::Grammar;
use crate::symbol::{Symbol, Terminal};

/// Fixed order of the six built-in terminals: nil, null, cons, false, true, ⊥.
pub const BUILTIN_COUNT: u64 = 6;

/// The result of classifying a raw tag into the symbol it denotes, plus
/// enough information (its rank) for a reader to know how many further
/// tokens to consume.
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    Parameter(usize),
    Nil,
    Null,
    Cons,
    False,
    True,
    Absent,
    Meta { code_index: usize, rank: usize },
    Kind { index: usize, kind: String, rank: usize },
    Str(String),
    Number(u64),
}

impl Tag {
    /// The number of subtrees a reader must recurse into after this tag.
    pub fn rank(&self) -> usize {
        match self {
            Tag::Parameter(_)
            | Tag::Nil
            | Tag::Null
            | Tag::False
            | Tag::True
            | Tag::Absent
            | Tag::Str(_)
            | Tag::Number(_) => 0,
            Tag::Cons => 2,
            Tag::Meta { rank, .. } => *rank,
            Tag::Kind { rank, .. } => *rank,
        }
    }
}

/// The fully resolved symbol code space for one encode or decode call.
#[derive(Debug, Clone)]
pub struct CodeSpace {
    parameter_count: usize,
    /// Rank of the meta-rule at each code-order index.
    meta_ranks: Vec<usize>,
    /// Creation-order id of the meta-rule at each code-order index.
    meta_creation_order: Vec<usize>,
    meta_creation_to_code: HashMap<usize, usize>,
    grammar_kinds: Vec<String>,
    kind_index: HashMap<String, usize>,
    kind_ranks: Vec<usize>,
    strings: Vec<String>,
    string_index: HashMap<String, usize>,
    numbers: Vec<u64>,
    number_index: HashMap<u64, usize>,
}

impl CodeSpace {
    /// Builds a code space from the grammar, the meta-rules in creation
    /// order paired with their rank, and the two pools already in their
    /// final (to-be-written) order.
    pub fn new(
        grammar: &Grammar,
        rule_ranks: &[usize],
        strings: Vec<String>,
        numbers: Vec<u64>,
    ) -> Self {
        let mut meta_creation_order: Vec<usize> = (0..rule_ranks.len()).collect();
        meta_creation_order.sort_by_key(|&id| rule_ranks[id]);
        let meta_ranks: Vec<usize> = meta_creation_order.iter().map(|&id| rule_ranks[id]).collect();
        let meta_creation_to_code: HashMap<usize, usize> = meta_creation_order
            .iter()
            .enumerate()
            .map(|(code_index, &creation_id)| (creation_id, code_index))
            .collect();

        Self::assemble(grammar, meta_ranks, meta_creation_order, meta_creation_to_code, strings, numbers)
    }

    /// Builds a code space purely from header-derived counts, for decoding:
    /// `rank_buckets` is `(rank, count)` in ascending rank order, matching
    /// what [`CodeSpace::rank_histogram`] produced on the encode side.
    /// `strings` and `numbers` are the pools exactly as read (already in
    /// their final code order).
    pub fn from_header(
        grammar: &Grammar,
        rank_buckets: &[(usize, usize)],
        strings: Vec<String>,
        numbers: Vec<u64>,
    ) -> Self {
        let mut meta_ranks = Vec::new();
        for &(rank, count) in rank_buckets {
            meta_ranks.extend(std::iter::repeat(rank).take(count));
        }
        let meta_creation_order: Vec<usize> = (0..meta_ranks.len()).collect();
        let meta_creation_to_code: HashMap<usize, usize> = meta_creation_order
            .iter()
            .enumerate()
            .map(|(code_index, &id)| (id, code_index))
            .collect();

        Self::assemble(grammar, meta_ranks, meta_creation_order, meta_creation_to_code, strings, numbers)
    }

    fn assemble(
        grammar: &Grammar,
        meta_ranks: Vec<usize>,
        meta_creation_order: Vec<usize>,
        meta_creation_to_code: HashMap<usize, usize>,
        strings: Vec<String>,
        numbers: Vec<u64>,
    ) -> Self {
        let grammar_kinds: Vec<String> = grammar.kinds().to_vec();
        let kind_ranks: Vec<usize> = grammar_kinds
            .iter()
            .map(|kind| {
                grammar
                    .properties(kind)
                    .expect("kind came from grammar.kinds()")
                    .len()
            })
            .collect();
        let kind_index: HashMap<String, usize> = grammar_kinds
            .iter()
            .enumerate()
            .map(|(i, k)| (k.clone(), i))
            .collect();
        let string_index: HashMap<String, usize> = strings
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i))
            .collect();
        let number_index: HashMap<u64, usize> = numbers
            .iter()
            .enumerate()
            .map(|(i, n)| (*n, i))
            .collect();

        Self {
            parameter_count: 0,
            meta_ranks,
            meta_creation_order,
            meta_creation_to_code,
            grammar_kinds,
            kind_index,
            kind_ranks,
            strings,
            string_index,
            numbers,
            number_index,
        }
    }

    pub fn set_parameter_count(&mut self, count: usize) {
        self.parameter_count = count;
    }

    pub fn parameter_count(&self) -> usize {
        self.parameter_count
    }

    pub fn meta_count(&self) -> usize {
        self.meta_ranks.len()
    }

    /// The code-order position of meta-rule `creation_id` (its index in
    /// [`crate::treerepair::Compression::rules`]).
    pub fn meta_code_index(&self, creation_id: usize) -> usize {
        self.meta_creation_to_code[&creation_id]
    }

    /// The meta-rules in code order, as their creation ids — used by the
    /// encoder to emit production bodies in the right order.
    pub fn meta_bodies_order(&self) -> &[usize] {
        &self.meta_creation_order
    }

    /// The rank histogram in the on-wire shape: `(rank, count)` pairs in
    /// ascending rank order, collapsing equal adjacent ranks.
    pub fn rank_histogram(&self) -> Vec<(usize, usize)> {
        let mut histogram: Vec<(usize, usize)> = Vec::new();
        for &rank in &self.meta_ranks {
            match histogram.last_mut() {
                Some((last_rank, count)) if *last_rank == rank => *count += 1,
                _ => histogram.push((rank, 1)),
            }
        }
        histogram
    }

    fn builtin_base(&self) -> u64 {
        self.parameter_count as u64
    }

    fn meta_base(&self) -> u64 {
        self.builtin_base() + BUILTIN_COUNT
    }

    fn kind_base(&self) -> u64 {
        self.meta_base() + self.meta_ranks.len() as u64
    }

    fn string_base(&self) -> u64 {
        self.kind_base() + self.grammar_kinds.len() as u64
    }

    fn number_base(&self) -> u64 {
        self.string_base() + self.strings.len() as u64
    }

    /// Encodes `symbol` as its integer code.
    pub fn code_of(&self, symbol: &Symbol) -> Result<u64, Error> {
        match symbol {
            Symbol::Parameter(index) => Ok(*index as u64),
            Symbol::Terminal(Terminal::Nil) => Ok(self.builtin_base()),
            Symbol::Terminal(Terminal::Null) => Ok(self.builtin_base() + 1),
            Symbol::Terminal(Terminal::Cons) => Ok(self.builtin_base() + 2),
            Symbol::Terminal(Terminal::False) => Ok(self.builtin_base() + 3),
            Symbol::Terminal(Terminal::True) => Ok(self.builtin_base() + 4),
            Symbol::Terminal(Terminal::Absent) => Ok(self.builtin_base() + 5),
            Symbol::Nonterminal { id, .. } => {
                Ok(self.meta_base() + self.meta_code_index(*id) as u64)
            }
            Symbol::Terminal(Terminal::Kind(kind)) => self
                .kind_index
                .get(kind)
                .map(|i| self.kind_base() + *i as u64)
                .ok_or_else(|| Error::UnknownKind { kind: kind.clone() }),
            Symbol::Terminal(Terminal::String(s)) => self
                .string_index
                .get(s)
                .map(|i| self.string_base() + *i as u64)
                .ok_or_else(|| Error::InternalInvariant {
                    description: format!("string {s:?} missing from pool"),
                }),
            Symbol::Terminal(Terminal::Number(bits)) => self
                .number_index
                .get(bits)
                .map(|i| self.number_base() + *i as u64)
                .ok_or_else(|| Error::InternalInvariant {
                    description: format!("number {bits:#x} missing from pool"),
                }),
        }
    }

    /// Classifies a raw tag read from the stream into the symbol it
    /// denotes.
    pub fn classify(&self, tag: u64) -> Result<Tag, Error> {
        if tag < self.parameter_count as u64 {
            return Ok(Tag::Parameter(tag as usize));
        }
        if tag < self.meta_base() {
            return Ok(match tag - self.builtin_base() {
                0 => Tag::Nil,
                1 => Tag::Null,
                2 => Tag::Cons,
                3 => Tag::False,
                4 => Tag::True,
                5 => Tag::Absent,
                _ => unreachable!("built-in range is exactly 6 wide"),
            });
        }
        if tag < self.kind_base() {
            let code_index = (tag - self.meta_base()) as usize;
            return Ok(Tag::Meta {
                code_index,
                rank: self.meta_ranks[code_index],
            });
        }
        if tag < self.string_base() {
            let index = (tag - self.kind_base()) as usize;
            return Ok(Tag::Kind {
                index,
                rank: self.kind_ranks[index],
                kind: self.grammar_kinds[index].clone(),
            });
        }
        if tag < self.number_base() {
            let index = (tag - self.string_base()) as usize;
            return Ok(Tag::Str(self.strings[index].clone()));
        }
        let max = self.number_base() + self.numbers.len() as u64;
        if tag < max {
            let index = (tag - self.number_base()) as usize;
            return Ok(Tag::Number(self.numbers[index]));
        }
        Err(Error::UnknownTag { tag })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grammar() -> Grammar {
        let json = serde_json::json!({ "Id": ["name"], "Lit": ["value"] });
        Grammar::from_json(&json).unwrap()
    }

    #[test]
    fn partitions_are_contiguous_and_ordered() {
        let mut space = CodeSpace::new(
            &grammar(),
            &[1, 0, 1], // three meta-rules, ranks 1, 0, 1
            vec!["a".into(), "b".into()],
            vec![10, 20],
        );
        space.set_parameter_count(2);

        assert_eq!(space.classify(0).unwrap(), Tag::Parameter(0));
        assert_eq!(space.classify(1).unwrap(), Tag::Parameter(1));
        assert_eq!(space.classify(2).unwrap(), Tag::Nil);
        assert_eq!(space.classify(7).unwrap(), Tag::Absent);

        // meta-rules: rank-0 bucket (the single rank-0 rule) comes first,
        // then the rank-1 bucket in original creation order (ids 0 then 2).
        match space.classify(8).unwrap() {
            Tag::Meta { rank, .. } => assert_eq!(rank, 0),
            other => panic!("expected Meta, got {other:?}"),
        }
        match space.classify(9).unwrap() {
            Tag::Meta { code_index, rank } => {
                assert_eq!(rank, 1);
                assert_eq!(code_index, 1);
            }
            other => panic!("expected Meta, got {other:?}"),
        }

        match space.classify(11).unwrap() {
            Tag::Kind { kind, rank, .. } => {
                assert_eq!(kind, "Id");
                assert_eq!(rank, 1);
            }
            other => panic!("expected Kind, got {other:?}"),
        }
        assert_eq!(space.classify(13).unwrap(), Tag::Str("a".into()));
        assert_eq!(space.classify(14).unwrap(), Tag::Str("b".into()));
        assert_eq!(space.classify(15).unwrap(), Tag::Number(10));
        assert_eq!(space.classify(16).unwrap(), Tag::Number(20));
        assert!(space.classify(17).is_err());
    }

    #[test]
    fn code_of_is_the_inverse_of_classify_for_kinds_and_constants() {
        let mut space = CodeSpace::new(&grammar(), &[], vec!["z".into()], vec![42]);
        space.set_parameter_count(0);

        let kind_symbol = Symbol::Terminal(Terminal::Kind("Lit".into()));
        let code = space.code_of(&kind_symbol).unwrap();
        match space.classify(code).unwrap() {
            Tag::Kind { kind, .. } => assert_eq!(kind, "Lit"),
            other => panic!("expected Kind, got {other:?}"),
        }

        let string_symbol = Symbol::Terminal(Terminal::String("z".into()));
        let code = space.code_of(&string_symbol).unwrap();
        assert_eq!(space.classify(code).unwrap(), Tag::Str("z".into()));

        let number_symbol = Symbol::Terminal(Terminal::Number(42));
        let code = space.code_of(&number_symbol).unwrap();
        assert_eq!(space.classify(code).unwrap(), Tag::Number(42));
    }

    #[test]
    fn from_header_reproduces_the_same_rank_histogram() {
        let mut space = CodeSpace::new(&grammar(), &[1, 0, 1], vec![], vec![]);
        space.set_parameter_count(0);
        let histogram = space.rank_histogram();
        assert_eq!(histogram, vec![(0, 1), (1, 2)]);

        let rebuilt = CodeSpace::from_header(&grammar(), &histogram, vec![], vec![]);
        assert_eq!(rebuilt.meta_count(), space.meta_count());
    }
}
