#![allow(dead_code)]

use std::path::Path;

use gocover_cobertura::config::Config;
use gocover_cobertura::sources::SourceRoots;
use tempfile::TempDir;

/// Timestamp used wherever output is compared byte for byte.
pub const TIMESTAMP: i64 = 1_700_000_000_000;

/// Create a temporary source root holding `files` (package-relative path,
/// contents). The caller must hold onto `TempDir` to keep it alive.
pub fn source_tree(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, contents) in files {
        let path = dir.path().join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }
    dir
}

pub fn config_for(root: &Path) -> Config {
    Config {
        sources: SourceRoots::new(vec![root.to_path_buf()]),
        ..Config::default()
    }
}

/// Run the whole pipeline with a fixed timestamp and return the XML.
pub fn convert(profile: &str, config: Config) -> gocover_cobertura::error::Result<String> {
    let mut out = Vec::new();
    gocover_cobertura::convert::convert_at(profile.as_bytes(), &mut out, config, TIMESTAMP)?;
    Ok(String::from_utf8(out).unwrap())
}
