//! In-memory representation of a conversion run: the parsed profile on the
//! input side, and the Cobertura package/class/method tree on the output side.
//! The `Coverage` root is built incrementally and serialized once.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

/// Class name used for free functions, which have no receiver type.
pub const FREE_FUNCTION_OWNER: &str = "-";

/// Compute a coverage rate, returning 0.0 when the total is zero.
#[must_use]
pub fn rate(covered: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        covered as f64 / total as f64
    }
}

/// A 1-based (line, column) source position. Ordering is by line first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// One basic block from a coverage profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileBlock {
    pub start: Position,
    pub end: Position,
    pub num_stmt: u32,
    pub count: u64,
}

impl ProfileBlock {
    /// Every line number the block touches, both ends inclusive.
    pub fn lines(&self) -> RangeInclusive<u32> {
        self.start.line..=self.end.line
    }

    /// Whether the block shares any source text with `[start, end)`.
    pub fn overlaps(&self, start: Position, end: Position) -> bool {
        self.start < end && self.end > start
    }
}

/// All blocks recorded for one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    /// Package-relative file reference, e.g. `example.com/pkg/file.go`.
    pub file_name: String,
    /// Value of the `mode:` header, if the profile had one.
    pub mode: Option<String>,
    /// Sorted by start position, identical ranges merged.
    pub blocks: Vec<ProfileBlock>,
}

impl Profile {
    /// The package-relative directory of the file, trailing separator
    /// stripped. Files at the root belong to the package named `""`.
    pub fn package_name(&self) -> &str {
        match self.file_name.rsplit_once('/') {
            Some((dir, _)) => dir.trim_end_matches('/'),
            None => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    pub number: u32,
    pub hits: u64,
}

/// Collapse a line-number → hits map into sorted `Line` records.
pub fn lines_from(hits: BTreeMap<u32, u64>) -> Vec<Line> {
    hits.into_iter()
        .map(|(number, hits)| Line { number, hits })
        .collect()
}

/// (covered, total) across a set of lines.
fn count_lines<'a>(lines: impl IntoIterator<Item = &'a Line>) -> (u64, u64) {
    lines.into_iter().fold((0, 0), |(covered, total), line| {
        (covered + u64::from(line.hits > 0), total + 1)
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub lines: Vec<Line>,
}

impl Method {
    #[must_use]
    pub fn line_rate(&self) -> f64 {
        let (covered, total) = count_lines(&self.lines);
        rate(covered, total)
    }
}

/// Declarations of one file sharing a receiver type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Class {
    pub name: String,
    pub filename: String,
    pub methods: Vec<Method>,
    /// Union of the methods' lines, one entry per line number.
    pub lines: Vec<Line>,
}

impl Class {
    pub fn line_counts(&self) -> (u64, u64) {
        count_lines(&self.lines)
    }

    #[must_use]
    pub fn line_rate(&self) -> f64 {
        let (covered, total) = self.line_counts();
        rate(covered, total)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub name: String,
    pub classes: Vec<Class>,
}

impl Package {
    pub fn line_counts(&self) -> (u64, u64) {
        self.classes.iter().fold((0, 0), |(covered, total), class| {
            let (c, t) = class.line_counts();
            (covered + c, total + t)
        })
    }

    #[must_use]
    pub fn line_rate(&self) -> f64 {
        let (covered, total) = self.line_counts();
        rate(covered, total)
    }
}

/// A source root as listed in the report's `<sources>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub path: String,
}

/// Root of the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coverage {
    pub sources: Vec<Source>,
    pub packages: Vec<Package>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

impl Coverage {
    pub fn new(sources: Vec<Source>, timestamp: i64) -> Self {
        Self {
            sources,
            packages: Vec::new(),
            timestamp,
        }
    }

    /// Find the package called `name`, appending an empty one if this run
    /// has not seen it yet.
    pub fn package_mut(&mut self, name: &str) -> &mut Package {
        let idx = match self.packages.iter().position(|p| p.name == name) {
            Some(idx) => idx,
            None => {
                self.packages.push(Package {
                    name: name.to_string(),
                    classes: Vec::new(),
                });
                self.packages.len() - 1
            }
        };
        &mut self.packages[idx]
    }

    pub fn line_counts(&self) -> (u64, u64) {
        self.packages.iter().fold((0, 0), |(covered, total), package| {
            let (c, t) = package.line_counts();
            (covered + c, total + t)
        })
    }

    #[must_use]
    pub fn line_rate(&self) -> f64 {
        let (covered, total) = self.line_counts();
        rate(covered, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(number: u32, hits: u64) -> Line {
        Line { number, hits }
    }

    #[test]
    fn test_rate_zero_total() {
        assert_eq!(rate(0, 0), 0.0);
        assert_eq!(rate(3, 3), 1.0);
    }

    #[test]
    fn test_package_name() {
        let profile = |name: &str| Profile {
            file_name: name.to_string(),
            mode: None,
            blocks: Vec::new(),
        };
        assert_eq!(profile("example.com/pkg/f.go").package_name(), "example.com/pkg");
        assert_eq!(profile("f.go").package_name(), "");
        assert_eq!(profile("a//f.go").package_name(), "a");
    }

    #[test]
    fn test_block_overlap() {
        let block = ProfileBlock {
            start: Position::new(3, 10),
            end: Position::new(5, 2),
            num_stmt: 1,
            count: 1,
        };
        assert!(block.overlaps(Position::new(3, 1), Position::new(5, 2)));
        // Ends exactly where the declaration starts.
        assert!(!block.overlaps(Position::new(5, 2), Position::new(9, 2)));
        // Starts exactly where the declaration ends.
        assert!(!block.overlaps(Position::new(1, 1), Position::new(3, 10)));
        assert_eq!(block.lines().collect::<Vec<_>>(), vec![3, 4, 5]);
    }

    #[test]
    fn test_class_rates() {
        let empty = Class {
            name: "-".into(),
            filename: "f.go".into(),
            methods: vec![],
            lines: vec![],
        };
        assert_eq!(empty.line_rate(), 0.0);

        let full = Class {
            lines: vec![line(1, 2), line(2, 1)],
            ..empty.clone()
        };
        assert_eq!(full.line_rate(), 1.0);

        let half = Class {
            lines: vec![line(1, 2), line(2, 0)],
            ..empty
        };
        assert_eq!(half.line_rate(), 0.5);
    }

    #[test]
    fn test_package_mut_merges_by_name() {
        let mut cov = Coverage::new(vec![], 0);
        cov.package_mut("a").classes.push(Class {
            name: "-".into(),
            filename: "a/x.go".into(),
            methods: vec![],
            lines: vec![line(1, 1)],
        });
        cov.package_mut("b");
        cov.package_mut("a").classes.push(Class {
            name: "-".into(),
            filename: "a/y.go".into(),
            methods: vec![],
            lines: vec![line(1, 0)],
        });

        assert_eq!(cov.packages.len(), 2);
        assert_eq!(cov.packages[0].name, "a");
        assert_eq!(cov.packages[0].classes.len(), 2);
        assert_eq!(cov.line_counts(), (1, 2));
    }
}
