/// Parser for Go's `-coverprofile` format.
///
/// Reference: https://go.dev/blog/cover
///
/// Format:
///   mode: set|count|atomic
///   <file>:<startLine>.<startCol>,<endLine>.<endCol> <numStatements> <count>
///
/// Each line describes a basic block with the number of statements in the
/// block and how many times it was executed. Blocks are kept at block
/// granularity here; attributing them to lines happens once the declarations
/// of the source file are known.
use std::collections::BTreeMap;
use std::io::BufRead;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};
use crate::model::{Position, Profile, ProfileBlock};

/// `<file>:<l>.<c>,<l>.<c> <stmts> <count>`. The file part is greedy so
/// references containing colons still split on the last one.
static BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+):([0-9]+)\.([0-9]+),([0-9]+)\.([0-9]+) ([0-9]+) ([0-9]+)$").unwrap()
});

const MODE_PREFIX: &str = "mode:";

/// Parse a Go coverage profile from raw bytes.
pub fn parse(input: &[u8]) -> Result<Vec<Profile>> {
    parse_reader(&mut &*input)
}

/// Parse a Go coverage profile, returning one `Profile` per source file
/// sorted by file name.
///
/// Any malformed line fails the whole parse: a partially understood profile
/// can't be merged safely with source data.
pub fn parse_reader(reader: &mut dyn BufRead) -> Result<Vec<Profile>> {
    let mut mode: Option<String> = None;
    let mut file_blocks: BTreeMap<String, Vec<(usize, ProfileBlock)>> = BTreeMap::new();
    let mut seen_content = false;

    let mut raw_line = String::new();
    let mut line_no = 0;
    loop {
        raw_line.clear();
        let n = reader.read_line(&mut raw_line).map_err(|e| Error::Profile {
            line: line_no + 1,
            message: e.to_string(),
        })?;
        if n == 0 {
            break;
        }
        line_no += 1;

        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix(MODE_PREFIX) {
            if seen_content {
                return Err(profile_error(line_no, "mode line must come first"));
            }
            let word = rest.trim();
            if word.is_empty() {
                return Err(profile_error(line_no, format!("bad mode line {:?}", line)));
            }
            mode = Some(word.to_string());
            seen_content = true;
            continue;
        }
        seen_content = true;

        let (file, block) = parse_block_line(line, line_no)?;
        file_blocks
            .entry(file.to_string())
            .or_default()
            .push((line_no, block));
    }

    if !seen_content {
        return Err(profile_error(line_no.max(1), "empty coverage profile"));
    }

    let mut profiles = Vec::with_capacity(file_blocks.len());
    for (file_name, blocks) in file_blocks {
        let blocks = merge_blocks(&file_name, blocks, mode.as_deref())?;
        profiles.push(Profile {
            file_name,
            mode: mode.clone(),
            blocks,
        });
    }

    Ok(profiles)
}

fn profile_error(line: usize, message: impl Into<String>) -> Error {
    Error::Profile {
        line,
        message: message.into(),
    }
}

/// Parse a single block line, returning (file_path, ProfileBlock).
fn parse_block_line(line: &str, line_no: usize) -> Result<(&str, ProfileBlock)> {
    let caps = BLOCK_RE.captures(line).ok_or_else(|| {
        profile_error(line_no, format!("line {:?} doesn't match expected format", line))
    })?;

    let file = caps.get(1).map_or("", |m| m.as_str());
    let field = |idx: usize| caps.get(idx).map_or("", |m| m.as_str());
    let number = |idx: usize| -> Result<u32> {
        field(idx)
            .parse()
            .map_err(|e| profile_error(line_no, format!("bad number {:?}: {}", field(idx), e)))
    };

    let block = ProfileBlock {
        start: Position::new(number(2)?, number(3)?),
        end: Position::new(number(4)?, number(5)?),
        num_stmt: number(6)?,
        count: field(7)
            .parse()
            .map_err(|e| profile_error(line_no, format!("bad count {:?}: {}", field(7), e)))?,
    };

    Ok((file, block))
}

/// Sort blocks by start position and fold samples of the same range into
/// one block. In `set` mode a range is covered if any sample covered it;
/// otherwise the counts add up.
fn merge_blocks(
    file_name: &str,
    mut blocks: Vec<(usize, ProfileBlock)>,
    mode: Option<&str>,
) -> Result<Vec<ProfileBlock>> {
    // Stable, so equal ranges keep their input order.
    blocks.sort_by_key(|(_, b)| (b.start, b.end));

    let mut merged: Vec<ProfileBlock> = Vec::with_capacity(blocks.len());
    for (line_no, block) in blocks {
        match merged.last_mut() {
            Some(last) if last.start == block.start && last.end == block.end => {
                if last.num_stmt != block.num_stmt {
                    return Err(profile_error(
                        line_no,
                        format!(
                            "inconsistent statement count for {}:{}.{}: changed from {} to {}",
                            file_name,
                            block.start.line,
                            block.start.column,
                            last.num_stmt,
                            block.num_stmt
                        ),
                    ));
                }
                if mode == Some("set") {
                    last.count = last.count.max(block.count);
                } else {
                    last.count = last.count.saturating_add(block.count);
                }
            }
            _ => merged.push(block),
        }
    }

    Ok(merged)
}
