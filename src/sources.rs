//! Source roots: the ordered directories that package-relative file
//! references resolve under.
//!
//! Without explicit roots the list mirrors the Go toolchain's source
//! directories: `$GOROOT/src` followed by `<entry>/src` for every `$GOPATH`
//! entry (`$HOME/go` when `GOPATH` is unset).
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use tracing::debug;

use crate::error::{Error, Result};
use crate::model::Source;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRoots {
    roots: Vec<PathBuf>,
}

impl SourceRoots {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Roots derived from the Go build environment, existing directories only.
    pub fn from_env() -> Self {
        Self::from_vars(
            env::var_os("GOROOT"),
            env::var_os("GOPATH"),
            env::var_os("HOME").map(PathBuf::from),
        )
    }

    /// Roots from explicit `GOROOT`, `GOPATH` and `HOME` values. Empty
    /// values count as unset.
    fn from_vars(
        goroot: Option<OsString>,
        gopath: Option<OsString>,
        home: Option<PathBuf>,
    ) -> Self {
        let goroot = goroot.filter(|v| !v.is_empty());
        let gopath = gopath.filter(|v| !v.is_empty());

        let mut candidates = Vec::new();
        if let Some(goroot) = goroot {
            candidates.push(PathBuf::from(goroot).join("src"));
        }
        match gopath {
            Some(gopath) => {
                candidates.extend(env::split_paths(&gopath).map(|p| p.join("src")));
            }
            None => {
                if let Some(home) = home {
                    candidates.push(home.join("go").join("src"));
                }
            }
        }

        let roots: Vec<PathBuf> = candidates.into_iter().filter(|p| p.is_dir()).collect();
        debug!(roots = ?roots, "source roots from environment");
        Self { roots }
    }

    /// The `<source>` entries for the report.
    pub fn to_sources(&self) -> Vec<Source> {
        self.roots
            .iter()
            .map(|root| Source {
                path: root.to_string_lossy().into_owned(),
            })
            .collect()
    }

    /// Resolve a package-relative reference to the first `root/reference`
    /// that exists as a file.
    pub fn locate(&self, reference: &str) -> Result<PathBuf> {
        self.roots
            .iter()
            .map(|root| root.join(reference))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| Error::SourceNotFound(reference.to_string()))
    }

    /// Remove the first root that prefixes `path`, along with the separator
    /// after it. Paths outside every root come back unchanged.
    pub fn strip_known_sources(&self, path: &Path) -> String {
        let path = path.to_string_lossy();
        for root in &self.roots {
            let root = root.to_string_lossy();
            let prefix = format!("{}{}", root.trim_end_matches(MAIN_SEPARATOR), MAIN_SEPARATOR);
            if let Some(rest) = path.strip_prefix(prefix.as_str()) {
                return rest.to_string();
            }
        }
        path.into_owned()
    }
}
