/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The encoder (§4.5): grammar recovery, tree building, TreeRePair mining,
//! then header + body emission over the symbol code space.

use std::io::Write;

use crate::codes::{self, CodeSpace};
use crate::error::Error;
use crate::grammar::{recover_grammar, Grammar};
use crate::io::ByteWriter;
use crate::options::Options;
use crate::tree::build::{build_tree, Interner};
use crate::tree::RankedTree;
use crate::treerepair;
use crate::value::AstNode;

/// Encodes `root` to `sink`, returning the number of bytes written.
pub fn encode(root: &AstNode, sink: impl Write) -> Result<u64, Error> {
    encode_with_options(root, sink, Options::default())
}

/// As [`encode`], but with an explicit [`Options`].
pub fn encode_with_options(
    root: &AstNode,
    sink: impl Write,
    options: Options,
) -> Result<u64, Error> {
    let grammar = recover_grammar(root)?;
    log::debug!("recovered grammar with {} kinds", grammar.len());

    let mut interner = Interner::default();
    let tree = build_tree(root, &grammar, &mut interner)?;

    let compression = treerepair::compress(tree, &grammar);
    log::debug!(
        "TreeRePair mined {} meta-rule(s)",
        compression.rules.len()
    );

    let strings = sorted_strings(&interner);
    let numbers = sorted_numbers(&interner);
    let rule_ranks: Vec<usize> = compression.rules.iter().map(|r| r.rank).collect();
    let parameter_count = rule_ranks.iter().copied().max().unwrap_or(0);

    let mut code_space = CodeSpace::new(&grammar, &rule_ranks, strings.clone(), numbers.clone());
    code_space.set_parameter_count(parameter_count);

    let mut writer = ByteWriter::with_capacity(sink, options.buffer_size);
    write_header(&mut writer, &grammar, &code_space, &strings, &numbers)?;

    for &creation_id in code_space.meta_bodies_order() {
        emit_tree(&mut writer, &compression.rules[creation_id].body, &code_space)?;
    }
    emit_tree(&mut writer, &compression.start, &code_space)?;

    writer.flush()?;
    log::debug!("encoded {} bytes", writer.bytes_written());
    Ok(writer.bytes_written())
}

/// Strings in final (lexicographic) pool order. Interning during tree
/// construction already deduplicates, so no tie-break beyond natural
/// `String` ordering is needed.
fn sorted_strings(interner: &Interner) -> Vec<String> {
    let mut strings: Vec<String> = interner.strings().into_iter().map(|(s, _)| s).collect();
    strings.sort();
    strings
}

/// Numeric bit patterns in final pool order: descending use count, ties
/// broken by first-seen order. `sort_by_key` is stable, so ties keep the
/// first-seen relative order already present in `interner.numbers()`.
fn sorted_numbers(interner: &Interner) -> Vec<u64> {
    let mut numbers = interner.numbers();
    numbers.sort_by_key(|&(_, count)| std::cmp::Reverse(count));
    numbers.into_iter().map(|(bits, _)| bits).collect()
}

fn write_header<W: Write>(
    writer: &mut ByteWriter<W>,
    grammar: &Grammar,
    code_space: &CodeSpace,
    strings: &[String],
    numbers: &[u64],
) -> Result<(), Error> {
    let grammar_json =
        serde_json::to_string(&grammar.to_json()).map_err(|e| Error::InternalInvariant {
            description: format!("grammar header serialization failed: {e}"),
        })?;
    writer.write_varuint(grammar_json.len() as u64)?;
    writer.write_utf8(&grammar_json)?;

    writer.write_varuint(code_space.parameter_count() as u64)?;
    writer.write_varuint(codes::BUILTIN_COUNT)?;

    let buckets = with_rank_zero_bucket(code_space.rank_histogram());
    writer.write_varuint((buckets.len() - 1) as u64)?;
    writer.write_varuint(buckets[0].1 as u64)?;
    for pair in buckets.windows(2) {
        let (prev_rank, _) = pair[0];
        let (rank, count) = pair[1];
        writer.write_varuint((rank - prev_rank - 1) as u64)?;
        writer.write_varuint(count as u64)?;
    }

    writer.write_varuint(strings.len() as u64)?;
    for s in strings {
        writer.write_varuint(s.len() as u64)?;
    }
    for s in strings {
        writer.write_utf8(s)?;
    }

    writer.write_varuint(numbers.len() as u64)?;
    for &bits in numbers {
        writer.write_double(f64::from_bits(bits))?;
    }

    Ok(())
}

/// The on-wire histogram always has an explicit rank-0 entry (§4.5 step 4),
/// even when no meta-rule has rank 0.
fn with_rank_zero_bucket(histogram: Vec<(usize, usize)>) -> Vec<(usize, usize)> {
    match histogram.first() {
        Some((0, _)) => histogram,
        _ => {
            let mut buckets = vec![(0, 0)];
            buckets.extend(histogram);
            buckets
        }
    }
}

fn emit_tree<W: Write>(
    writer: &mut ByteWriter<W>,
    tree: &RankedTree,
    code_space: &CodeSpace,
) -> Result<(), Error> {
    for id in tree.preorder() {
        let code = code_space.code_of(tree.symbol(id))?;
        writer.write_varuint(code)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn script(directives: Vec<Value>, statements: Vec<Value>) -> AstNode {
        AstNode::new(
            "Script",
            vec![
                ("directives".to_string(), Value::List(directives)),
                ("statements".to_string(), Value::List(statements)),
            ],
        )
    }

    #[test]
    fn encodes_the_empty_script() {
        let root = script(vec![], vec![]);
        let mut buf = Vec::new();
        let len = encode(&root, &mut buf).unwrap();
        assert_eq!(len as usize, buf.len());
        assert!(!buf.is_empty());
    }

    #[test]
    fn buffer_size_option_does_not_change_the_byte_count() {
        let root = script(vec![], vec![Value::Bool(true)]);
        let mut default_buf = Vec::new();
        let default_len = encode(&root, &mut default_buf).unwrap();

        let mut tiny_buf = Vec::new();
        let tiny_len =
            encode_with_options(&root, &mut tiny_buf, Options::new().with_buffer_size(1)).unwrap();

        assert_eq!(default_len, tiny_len);
        assert_eq!(default_buf, tiny_buf);
    }
}
