use super::syntax::SyntaxNode;
use std::path::Path;
use thiserror::Error;

/// Errors raised while turning source text into a syntax tree
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to load grammar: {0}")]
    Grammar(#[from] tree_sitter::LanguageError),
    #[error("Parser produced no tree")]
    NoTree,
    #[error("Syntax error at line {line}, column {column}")]
    Syntax { line: usize, column: usize },
}

/// Trait for language-specific parsers
pub trait Parser {
    /// Parse a source file into a lowered syntax tree
    fn parse(&self, path: &Path, contents: &str) -> Result<SyntaxNode, ParseError>;
}

/// Extract text from a node
pub fn node_text<'a>(node: tree_sitter::Node<'a>, source: &'a str) -> &'a str {
    &source[node.start_byte()..node.end_byte()]
}

/// All named children of a node
pub fn named_children(node: tree_sitter::Node) -> Vec<tree_sitter::Node> {
    let mut cursor = node.walk();
    let children = node.named_children(&mut cursor).collect();
    children
}

/// Find all named children of a specific kind
pub fn children_of_kind<'a>(
    node: tree_sitter::Node<'a>,
    kind: &str,
) -> Vec<tree_sitter::Node<'a>> {
    named_children(node)
        .into_iter()
        .filter(|child| child.kind() == kind)
        .collect()
}

/// Find the first named child of a specific kind
pub fn child_of_kind<'a>(node: tree_sitter::Node<'a>, kind: &str) -> Option<tree_sitter::Node<'a>> {
    children_of_kind(node, kind).into_iter().next()
}

/// Locate the first error or missing node, in document order
pub fn first_error(root: tree_sitter::Node) -> Option<tree_sitter::Node> {
    if !root.has_error() {
        return None;
    }
    descendants(root).find(|node| node.is_error() || node.is_missing())
}

/// Iterator over all descendant nodes
pub fn descendants(node: tree_sitter::Node) -> impl Iterator<Item = tree_sitter::Node> {
    DescendantIterator::new(node)
}

struct DescendantIterator<'a> {
    cursor: tree_sitter::TreeCursor<'a>,
    done: bool,
}

impl<'a> DescendantIterator<'a> {
    fn new(node: tree_sitter::Node<'a>) -> Self {
        Self {
            cursor: node.walk(),
            done: false,
        }
    }
}

impl<'a> Iterator for DescendantIterator<'a> {
    type Item = tree_sitter::Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let node = self.cursor.node();

        if self.cursor.goto_first_child() {
            return Some(node);
        }

        loop {
            if self.cursor.goto_next_sibling() {
                return Some(node);
            }

            if !self.cursor.goto_parent() {
                self.done = true;
                return Some(node);
            }
        }
    }
}
