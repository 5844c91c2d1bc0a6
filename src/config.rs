//! Run configuration: where sources live and which files to leave out.
use std::sync::LazyLock;

use regex::Regex;

use crate::error::Result;
use crate::model::Profile;
use crate::sources::SourceRoots;

/// Go's marker for machine-generated files, on a line of its own.
static GENERATED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^// Code generated .* DO NOT EDIT\.$").unwrap());

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub sources: SourceRoots,
    pub ignore: Ignore,
}

/// Rules for leaving profile entries out of the report.
#[derive(Debug, Clone, Default)]
pub struct Ignore {
    /// Matched against the package directory.
    pub dirs: Option<Regex>,
    /// Matched against the package-relative file reference.
    pub files: Option<Regex>,
    /// Skip files carrying the generated-code header.
    pub generated_files: bool,
}

impl Ignore {
    pub fn new(dirs: Option<&str>, files: Option<&str>, generated_files: bool) -> Result<Self> {
        Ok(Self {
            dirs: dirs.map(Regex::new).transpose()?,
            files: files.map(Regex::new).transpose()?,
            generated_files,
        })
    }

    /// Whether `profile` is excluded by its directory or file name alone.
    pub fn skips_profile(&self, profile: &Profile) -> bool {
        let dir_match = self
            .dirs
            .as_ref()
            .is_some_and(|re| re.is_match(profile.package_name()));
        let file_match = self
            .files
            .as_ref()
            .is_some_and(|re| re.is_match(&profile.file_name));
        dir_match || file_match
    }

    /// Whether a located source file is excluded by its contents.
    pub fn skips_source(&self, source: &str) -> bool {
        self.generated_files && is_generated(source)
    }
}

pub fn is_generated(source: &str) -> bool {
    GENERATED_RE.is_match(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(name: &str) -> Profile {
        Profile {
            file_name: name.to_string(),
            mode: None,
            blocks: Vec::new(),
        }
    }

    #[test]
    fn test_default_skips_nothing() {
        let ignore = Ignore::default();
        assert!(!ignore.skips_profile(&profile("a/b.go")));
        assert!(!ignore.skips_source("// Code generated by mockgen. DO NOT EDIT.\n"));
    }

    #[test]
    fn test_ignore_dirs_and_files() {
        let ignore = Ignore::new(Some("^vendor/"), Some(r"_mock\.go$"), false).unwrap();
        assert!(ignore.skips_profile(&profile("vendor/x/y.go")));
        assert!(ignore.skips_profile(&profile("pkg/store_mock.go")));
        assert!(!ignore.skips_profile(&profile("pkg/store.go")));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(Ignore::new(Some("("), None, false).is_err());
    }

    #[test]
    fn test_generated_header() {
        assert!(is_generated(
            "// Code generated by protoc-gen-go. DO NOT EDIT.\n\npackage pb\n"
        ));
        assert!(!is_generated("package pb\n// Code generated here, edit freely\n"));

        let ignore = Ignore::new(None, None, true).unwrap();
        assert!(ignore.skips_source("// Code generated by stringer. DO NOT EDIT.\n"));
        assert!(!ignore.skips_source("package main\n"));
    }
}
