//! Top-level Go function and method declarations, found with tree-sitter.
use std::path::Path;

use tree_sitter::{Node, Parser as TsParser, Point};
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{Position, FREE_FUNCTION_OWNER};

/// A function or method declared in one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Receiver type without pointer indirection, or `"-"` for free functions.
    pub owner: String,
    pub name: String,
    /// Position of the `func` keyword.
    pub start: Position,
    /// Position just past the closing brace (or signature, for bodiless
    /// declarations).
    pub end: Position,
}

/// Go source parser using tree-sitter.
pub struct Extractor {
    parser: TsParser,
}

impl Extractor {
    pub fn new() -> Result<Self> {
        let mut parser = TsParser::new();
        parser.set_language(&tree_sitter_go::LANGUAGE.into())?;
        Ok(Self { parser })
    }

    /// Parse `source` (read from `path`) and return its top-level
    /// declarations in source order.
    ///
    /// A file with any syntax error is rejected as a whole, reporting the
    /// first error's position.
    pub fn extract(&mut self, path: &Path, source: &str) -> Result<Vec<Declaration>> {
        let tree = self.parser.parse(source, None).ok_or_else(|| Error::Syntax {
            path: path.to_path_buf(),
            line: 1,
            column: 1,
        })?;
        let root = tree.root_node();

        if root.has_error() {
            let at = first_error(root).map_or(Point { row: 0, column: 0 }, |n| n.start_position());
            return Err(Error::Syntax {
                path: path.to_path_buf(),
                line: at.row + 1,
                column: at.column + 1,
            });
        }

        let mut declarations = Vec::new();
        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            let owner = match child.kind() {
                "function_declaration" => FREE_FUNCTION_OWNER.to_string(),
                "method_declaration" => receiver_name(child, source),
                _ => continue,
            };
            let Some(name) = child.child_by_field_name("name") else {
                continue;
            };

            declarations.push(Declaration {
                owner,
                name: node_text(name, source).to_string(),
                start: to_position(child.start_position()),
                end: to_position(child.end_position()),
            });
        }

        debug!(
            path = %path.display(),
            count = declarations.len(),
            "extracted declarations"
        );
        Ok(declarations)
    }
}

/// The receiver's type expression, leading `*` and surrounding whitespace
/// removed: both `(w *Widget)` and `(Widget)` give `Widget`.
fn receiver_name(method: Node, source: &str) -> String {
    let ty = method.child_by_field_name("receiver").and_then(|receiver| {
        let mut cursor = receiver.walk();
        let param = receiver
            .named_children(&mut cursor)
            .find(|n| n.kind() == "parameter_declaration");
        param.and_then(|p| p.child_by_field_name("type"))
    });

    match ty {
        Some(ty) => node_text(ty, source)
            .trim_start_matches('*')
            .trim()
            .to_string(),
        None => FREE_FUNCTION_OWNER.to_string(),
    }
}

/// Extract text from a node
fn node_text<'a>(node: Node<'a>, source: &'a str) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}

/// tree-sitter points are 0-based; profile positions are 1-based.
fn to_position(point: Point) -> Position {
    Position::new(point.row as u32 + 1, point.column as u32 + 1)
}

/// Depth-first search for the first error or missing node.
fn first_error(root: Node) -> Option<Node> {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        // Only descend into subtrees that contain an error.
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(source: &str) -> Result<Vec<Declaration>> {
        Extractor::new().unwrap().extract(Path::new("test.go"), source)
    }

    #[test]
    fn test_free_function() {
        let source = "package foo\n\nfunc Foo() int {\n\treturn 1\n}\n";
        let decls = extract(source).unwrap();
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].owner, "-");
        assert_eq!(decls[0].name, "Foo");
        assert_eq!(decls[0].start, Position::new(3, 1));
        assert_eq!(decls[0].end, Position::new(5, 2));
    }

    #[test]
    fn test_receiver_pointer_stripped() {
        let source = "package w\n\n\
            type Widget struct{}\n\n\
            func (w *Widget) Grow() {}\n\n\
            func (w Widget) Size() int { return 0 }\n\n\
            func (Widget) Anon() {}\n";
        let decls = extract(source).unwrap();
        let owners: Vec<_> = decls.iter().map(|d| d.owner.as_str()).collect();
        let names: Vec<_> = decls.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(owners, vec!["Widget", "Widget", "Widget"]);
        assert_eq!(names, vec!["Grow", "Size", "Anon"]);
    }

    #[test]
    fn test_generic_receiver() {
        let source = "package b\n\n\
            type Box[T any] struct{ v T }\n\n\
            func (b *Box[T]) Get() T { return b.v }\n";
        let decls = extract(source).unwrap();
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].owner, "Box[T]");
    }

    #[test]
    fn test_function_literals_are_not_declarations() {
        let source = "package f\n\n\
            var handler = func() {}\n\n\
            func Outer() {\n\tinner := func() {}\n\tinner()\n}\n";
        let decls = extract(source).unwrap();
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].name, "Outer");
    }

    #[test]
    fn test_syntax_error() {
        let source = "package broken\n\nfunc Foo( {\n";
        match extract(source) {
            Err(Error::Syntax { path, .. }) => assert_eq!(path, Path::new("test.go")),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
