/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The decoder (§4.6): header parsing, meta-rule body buffering, and
//! recursive preorder replay.

use std::io::Read;

use crate::codes::{self, CodeSpace, Tag};
use crate::error::Error;
use crate::grammar::Grammar;
use crate::io::ByteReader;
use crate::options::Options;
use crate::value::{AstNode, Value};

/// Decodes a root AST node from `source`.
pub fn decode(source: impl Read) -> Result<AstNode, Error> {
    decode_with_options(source, Options::default())
}

/// As [`decode`], but with an explicit [`Options`] (only the buffer-size
/// tunable affects the encoder; the decoder reads as it goes and does not
/// need a matching buffer, but accepts [`Options`] for API symmetry).
pub fn decode_with_options(source: impl Read, _options: Options) -> Result<AstNode, Error> {
    let mut reader = ByteReader::new(source);

    let grammar = read_grammar(&mut reader)?;
    log::debug!("decoding grammar with {} kinds", grammar.len());

    let parameter_count = reader.read_varuint()? as usize;

    let builtin_count = reader.read_varuint()?;
    if builtin_count != codes::BUILTIN_COUNT {
        return Err(Error::VersionMismatch {
            found: builtin_count,
        });
    }

    let buckets = read_rank_histogram(&mut reader)?;
    let strings = read_string_pool(&mut reader)?;
    let numbers = read_numeric_pool(&mut reader)?;

    let mut code_space = CodeSpace::from_header(&grammar, &buckets, strings, numbers);
    code_space.set_parameter_count(parameter_count);

    let meta_count = code_space.meta_count();
    log::debug!("buffering {meta_count} meta-rule bodies");
    let mut rule_bodies = Vec::with_capacity(meta_count);
    for _ in 0..meta_count {
        rule_bodies.push(buffer_tree(&mut reader, &code_space)?);
    }
    let start_tokens = buffer_tree(&mut reader, &code_space)?;

    log::debug!("replaying start tree ({} tokens)", start_tokens.len());
    let mut pos = 0;
    let root_value = replay(
        &start_tokens,
        &mut pos,
        &[],
        &code_space,
        &grammar,
        &rule_bodies,
    )?;

    match root_value {
        Value::Node(node) if node.kind == "Script" || node.kind == "Module" => Ok(node),
        Value::Node(node) => Err(Error::UnexpectedRoot { kind: node.kind }),
        other => Err(Error::UnexpectedRoot {
            kind: other.kind_description().to_string(),
        }),
    }
}

fn read_grammar<R: Read>(reader: &mut ByteReader<R>) -> Result<Grammar, Error> {
    let len = reader.read_varuint()? as usize;
    let text = reader.read_utf8(len)?;
    let json: serde_json::Value = serde_json::from_str(&text).map_err(|e| Error::InternalInvariant {
        description: format!("invalid grammar header JSON: {e}"),
    })?;
    Grammar::from_json(&json).ok_or_else(|| Error::InternalInvariant {
        description: "grammar header JSON was not an object of string arrays".to_string(),
    })
}

/// Reads the rank histogram (§4.5 step 4) back into `(rank, count)` pairs,
/// always including the explicit leading rank-0 entry.
fn read_rank_histogram<R: Read>(reader: &mut ByteReader<R>) -> Result<Vec<(usize, usize)>, Error> {
    let ranks_minus_one = reader.read_varuint()?;
    let rank_zero_count = reader.read_varuint()? as usize;
    let mut buckets = vec![(0usize, rank_zero_count)];
    let mut prev_rank = 0usize;
    for _ in 0..ranks_minus_one {
        let delta_minus_one = reader.read_varuint()? as usize;
        let count = reader.read_varuint()? as usize;
        let rank = prev_rank + delta_minus_one + 1;
        buckets.push((rank, count));
        prev_rank = rank;
    }
    Ok(buckets)
}

fn read_string_pool<R: Read>(reader: &mut ByteReader<R>) -> Result<Vec<String>, Error> {
    let count = reader.read_varuint()? as usize;
    let mut lengths = Vec::with_capacity(count);
    for _ in 0..count {
        lengths.push(reader.read_varuint()? as usize);
    }
    let mut strings = Vec::with_capacity(count);
    for len in lengths {
        strings.push(reader.read_utf8(len)?);
    }
    Ok(strings)
}

fn read_numeric_pool<R: Read>(reader: &mut ByteReader<R>) -> Result<Vec<u64>, Error> {
    let count = reader.read_varuint()? as usize;
    let mut numbers = Vec::with_capacity(count);
    for _ in 0..count {
        numbers.push(reader.read_double()?.to_bits());
    }
    Ok(numbers)
}

/// Buffers one tree's worth of tokens in preorder, following the
/// self-describing rank of each tag (§4.6 step 6).
fn buffer_tree<R: Read>(reader: &mut ByteReader<R>, code_space: &CodeSpace) -> Result<Vec<u64>, Error> {
    let mut buffer = Vec::new();
    buffer_node(reader, code_space, &mut buffer)?;
    Ok(buffer)
}

fn buffer_node<R: Read>(
    reader: &mut ByteReader<R>,
    code_space: &CodeSpace,
    buffer: &mut Vec<u64>,
) -> Result<(), Error> {
    let tag = reader.read_varuint()?;
    let rank = code_space.classify(tag)?.rank();
    buffer.push(tag);
    for _ in 0..rank {
        buffer_node(reader, code_space, buffer)?;
    }
    Ok(())
}

/// Recursively replays `buffer` from `*pos`, substituting `actuals` for
/// parameter tags, per §4.6 step 8.
fn replay(
    buffer: &[u64],
    pos: &mut usize,
    actuals: &[Value],
    code_space: &CodeSpace,
    grammar: &Grammar,
    rule_bodies: &[Vec<u64>],
) -> Result<Value, Error> {
    let tag = *buffer.get(*pos).ok_or(Error::Truncated {
        what: "replay token",
    })?;
    *pos += 1;

    match code_space.classify(tag)? {
        Tag::Nil => Ok(Value::List(Vec::new())),
        Tag::Cons => {
            let head = replay(buffer, pos, actuals, code_space, grammar, rule_bodies)?;
            let tail = replay(buffer, pos, actuals, code_space, grammar, rule_bodies)?;
            match tail {
                Value::List(mut items) => {
                    items.insert(0, head);
                    Ok(Value::List(items))
                }
                other => Err(Error::InternalInvariant {
                    description: format!(
                        "cons tail decoded to a {}, not a list",
                        other.kind_description()
                    ),
                }),
            }
        }
        Tag::Null => Ok(Value::Null),
        Tag::False => Ok(Value::Bool(false)),
        Tag::True => Ok(Value::Bool(true)),
        Tag::Absent => Ok(Value::Absent),
        Tag::Parameter(index) => actuals
            .get(index)
            .cloned()
            .ok_or_else(|| Error::InternalInvariant {
                description: format!("parameter {index} has no bound actual"),
            }),
        Tag::Meta { code_index, rank } => {
            let mut new_actuals = Vec::with_capacity(rank);
            for _ in 0..rank {
                new_actuals.push(replay(buffer, pos, actuals, code_space, grammar, rule_bodies)?);
            }
            let body = rule_bodies.get(code_index).ok_or(Error::UnknownTag { tag })?;
            let mut body_pos = 0;
            replay(body, &mut body_pos, &new_actuals, code_space, grammar, rule_bodies)
        }
        Tag::Kind { kind, rank, .. } => {
            let properties = grammar.properties(&kind).ok_or_else(|| Error::UnknownKind {
                kind: kind.clone(),
            })?;
            let mut props = Vec::with_capacity(rank);
            for name in properties {
                let value = replay(buffer, pos, actuals, code_space, grammar, rule_bodies)?;
                props.push((name.clone(), value));
            }
            Ok(Value::Node(AstNode::new(kind, props)))
        }
        Tag::Str(s) => Ok(Value::Str(s)),
        Tag::Number(bits) => Ok(Value::Number(f64::from_bits(bits))),
    }
}
