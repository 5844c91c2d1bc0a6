use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML write error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Profile parse error on line {line}: {message}")]
    Profile { line: usize, message: String },

    #[error("Can't find {0} under any source root")]
    SourceNotFound(String),

    #[error("Syntax error in {} at {line}:{column}", .path.display())]
    Syntax {
        path: PathBuf,
        line: usize,
        column: usize,
    },

    #[error("Failed to load Go grammar: {0}")]
    Grammar(#[from] tree_sitter::LanguageError),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
