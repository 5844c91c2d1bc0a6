//! Attribution of profile blocks to declarations.
//!
//! A block contributes its hit count to every line it spans, for every
//! declaration it overlaps. When several blocks (or several methods of the
//! same class) touch one line, the maximum hit count is kept, so each line
//! number appears once per method and once per class.
use std::collections::{BTreeMap, HashMap};

use crate::declarations::Declaration;
use crate::model::{lines_from, Class, Coverage, Method, ProfileBlock};

/// Record `hits` for `line`, keeping the larger count on collision.
fn record(lines: &mut BTreeMap<u32, u64>, line: u32, hits: u64) {
    let entry = lines.entry(line).or_insert(0);
    if hits > *entry {
        *entry = hits;
    }
}

/// Line hits of one declaration, from every block overlapping its range.
fn method_lines(decl: &Declaration, blocks: &[ProfileBlock]) -> BTreeMap<u32, u64> {
    let mut lines = BTreeMap::new();
    // Blocks are sorted by start, so nothing after the declaration's end
    // can overlap it.
    for block in blocks.iter().take_while(|b| b.start < decl.end) {
        if !block.overlaps(decl.start, decl.end) {
            continue;
        }
        for line in block.lines() {
            record(&mut lines, line, block.count);
        }
    }
    lines
}

struct ClassBuilder {
    name: String,
    methods: Vec<Method>,
    lines: BTreeMap<u32, u64>,
}

/// Group a file's declarations into classes keyed by owner type, in order
/// of first appearance, and attach the profile's hits to them.
pub fn file_classes(
    filename: &str,
    declarations: &[Declaration],
    blocks: &[ProfileBlock],
) -> Vec<Class> {
    let mut builders: Vec<ClassBuilder> = Vec::new();
    let mut by_owner: HashMap<&str, usize> = HashMap::new();

    for decl in declarations {
        let idx = *by_owner.entry(decl.owner.as_str()).or_insert_with(|| {
            builders.push(ClassBuilder {
                name: decl.owner.clone(),
                methods: Vec::new(),
                lines: BTreeMap::new(),
            });
            builders.len() - 1
        });
        let class = &mut builders[idx];

        let lines = method_lines(decl, blocks);
        for (&line, &hits) in &lines {
            record(&mut class.lines, line, hits);
        }
        class.methods.push(Method {
            name: decl.name.clone(),
            lines: lines_from(lines),
        });
    }

    builders
        .into_iter()
        .map(|b| Class {
            name: b.name,
            filename: filename.to_string(),
            methods: b.methods,
            lines: lines_from(b.lines),
        })
        .collect()
}

/// Fold a file's classes into the run's accumulator under `package`.
/// Files sharing a directory share one package entry.
pub fn add_classes(coverage: &mut Coverage, package: &str, classes: Vec<Class>) {
    coverage.package_mut(package).classes.extend(classes);
}
