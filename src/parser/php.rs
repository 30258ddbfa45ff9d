use super::common::{child_of_kind, children_of_kind, first_error, named_children, node_text, ParseError, Parser};
use super::syntax::{NodeKind, SyntaxNode};
use std::path::Path;
use tracing::trace;
use tree_sitter::{Node, Parser as TsParser, TreeCursor};

/// Class references that name no class of their own
const RELATIVE_SCOPES: &[&str] = &["self", "static", "parent"];

/// PHP source code parser using tree-sitter
///
/// The parser keeps no per-file state, so one instance can be shared by
/// every worker of a parallel scan.
pub struct PhpParser;

impl PhpParser {
    pub fn new() -> Self {
        Self
    }

    /// Lower a tree-sitter node and its subtree into a [`SyntaxNode`].
    ///
    /// Walks with a cursor and an explicit stack of open nodes, so nesting
    /// depth is bounded by the heap rather than the worker's call stack.
    /// Subtrees that carry no names are dropped and `Other` nodes below the
    /// root are dissolved into their parent.
    fn lower(&self, root: Node, source: &str) -> SyntaxNode {
        let mut cursor = root.walk();
        let mut open: Vec<SyntaxNode> = vec![SyntaxNode::leaf(self.classify(root, source))];

        loop {
            if goto_first_named_child(&mut cursor) {
                open.push(SyntaxNode::leaf(self.classify(cursor.node(), source)));
                continue;
            }

            // the node under the cursor is complete; close it and every
            // ancestor that has no named siblings left
            loop {
                let Some(done) = open.pop() else {
                    return SyntaxNode::leaf(NodeKind::Other);
                };
                let Some(parent) = open.last_mut() else {
                    return done;
                };
                parent.adopt(done);

                if goto_next_named_sibling(&mut cursor) {
                    open.push(SyntaxNode::leaf(self.classify(cursor.node(), source)));
                    break;
                }
                cursor.goto_parent();
            }
        }
    }

    fn classify(&self, node: Node, source: &str) -> NodeKind {
        match node.kind() {
            "namespace_use_declaration" => self.classify_use(node, source),
            "object_creation_expression" => {
                if child_of_kind(node, "declaration_list").is_some() {
                    // anonymous class: `new class(...) extends Base implements I { ... }`
                    self.classify_class(node, source)
                } else {
                    let designator = named_children(node)
                        .into_iter()
                        .find(|c| c.kind() != "arguments" && c.kind() != "attribute_list");
                    NodeKind::Instantiation {
                        class: designator.and_then(|d| self.static_name(d, source)),
                    }
                }
            }
            "class_declaration" | "anonymous_class" => self.classify_class(node, source),
            "scoped_call_expression" => NodeKind::StaticCall {
                class: node
                    .child_by_field_name("scope")
                    .and_then(|scope| self.static_name(scope, source)),
            },
            "scoped_property_access_expression" => NodeKind::StaticPropertyAccess {
                class: node
                    .child_by_field_name("scope")
                    .and_then(|scope| self.static_name(scope, source)),
            },
            "class_constant_access_expression" => NodeKind::ConstantFetch {
                class: named_children(node)
                    .into_iter()
                    .next()
                    .and_then(|scope| self.static_name(scope, source)),
            },
            "binary_expression" if self.is_instanceof(node) => {
                let right = node
                    .child_by_field_name("right")
                    .or_else(|| named_children(node).into_iter().last());
                NodeKind::TypeCheck {
                    class: right.and_then(|r| self.static_name(r, source)),
                }
            }
            "catch_clause" => {
                let types = node
                    .child_by_field_name("type")
                    .or_else(|| child_of_kind(node, "type_list"));
                NodeKind::CatchClause {
                    types: types
                        .map(|list| {
                            named_children(list)
                                .into_iter()
                                .filter_map(|t| self.plain_named_type(t, source))
                                .collect()
                        })
                        .unwrap_or_default(),
                }
            }
            "function_call_expression" => NodeKind::FunctionCall {
                name: node
                    .child_by_field_name("function")
                    .and_then(|f| self.static_name(f, source)),
            },
            "simple_parameter" | "variadic_parameter" | "property_promotion_parameter" => {
                NodeKind::Parameter {
                    type_hint: node
                        .child_by_field_name("type")
                        .and_then(|t| self.plain_named_type(t, source)),
                }
            }
            "function_definition" | "method_declaration" => NodeKind::FunctionDeclaration {
                return_type: node
                    .child_by_field_name("return_type")
                    .and_then(|t| self.plain_named_type(t, source)),
            },
            "property_declaration" => NodeKind::PropertyDeclaration {
                type_hint: node
                    .child_by_field_name("type")
                    .and_then(|t| self.plain_named_type(t, source)),
            },
            "use_declaration" => NodeKind::TraitUse {
                traits: self.names_in(node, source),
            },
            _ => NodeKind::Other,
        }
    }

    fn classify_use(&self, node: Node, source: &str) -> NodeKind {
        if let Some(group) = child_of_kind(node, "namespace_use_group") {
            let prefix = node
                .child_by_field_name("prefix")
                .or_else(|| child_of_kind(node, "namespace_name"))
                .and_then(|p| normalize_name(node_text(p, source)))
                .unwrap_or_default();

            let paths = named_children(group)
                .into_iter()
                .filter(|c| c.kind() == "namespace_use_group_clause" || c.kind() == "namespace_use_clause")
                .filter_map(|clause| self.clause_name(clause, source))
                .collect();

            return NodeKind::GroupedImport { prefix, paths };
        }

        NodeKind::Import {
            paths: children_of_kind(node, "namespace_use_clause")
                .into_iter()
                .filter_map(|clause| self.clause_name(clause, source))
                .collect(),
        }
    }

    /// The imported path of a use clause, without its alias
    fn clause_name(&self, clause: Node, source: &str) -> Option<String> {
        let alias = clause.child_by_field_name("alias").map(|a| a.id());
        named_children(clause)
            .into_iter()
            .filter(|c| Some(c.id()) != alias)
            .find(|c| matches!(c.kind(), "qualified_name" | "namespace_name" | "name"))
            .and_then(|c| normalize_name(node_text(c, source)))
    }

    fn classify_class(&self, node: Node, source: &str) -> NodeKind {
        let extends = child_of_kind(node, "base_clause")
            .and_then(|base| self.names_in(base, source).into_iter().next());
        let implements = child_of_kind(node, "class_interface_clause")
            .map(|clause| self.names_in(clause, source))
            .unwrap_or_default();

        NodeKind::ClassDeclaration { extends, implements }
    }

    fn is_instanceof(&self, node: Node) -> bool {
        let mut cursor = node.walk();
        let found = node
            .children(&mut cursor)
            .any(|c| !c.is_named() && c.kind().eq_ignore_ascii_case("instanceof"));
        found
    }

    /// Names listed directly under a node (`extends A`, `implements B, C`, `use T1, T2;`)
    fn names_in(&self, node: Node, source: &str) -> Vec<String> {
        named_children(node)
            .into_iter()
            .filter_map(|c| self.static_name(c, source))
            .collect()
    }

    /// The literal class or function name of an expression, if it has one
    fn static_name(&self, node: Node, source: &str) -> Option<String> {
        match node.kind() {
            "name" | "qualified_name" => normalize_name(node_text(node, source)),
            "named_type" => named_children(node)
                .into_iter()
                .next()
                .and_then(|inner| self.static_name(inner, source)),
            _ => None,
        }
    }

    /// A type hint that is exactly one named type; nullable, union,
    /// intersection and primitive hints yield nothing
    fn plain_named_type(&self, node: Node, source: &str) -> Option<String> {
        match node.kind() {
            "named_type" | "name" | "qualified_name" => self.static_name(node, source),
            "union_type" | "type" => {
                let members = named_children(node);
                if members.len() == 1 {
                    self.plain_named_type(members[0], source)
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

fn goto_first_named_child(cursor: &mut TreeCursor) -> bool {
    if !cursor.goto_first_child() {
        return false;
    }
    if cursor.node().is_named() || goto_next_named_sibling(cursor) {
        return true;
    }
    cursor.goto_parent();
    false
}

fn goto_next_named_sibling(cursor: &mut TreeCursor) -> bool {
    while cursor.goto_next_sibling() {
        if cursor.node().is_named() {
            return true;
        }
    }
    false
}

/// Strip the leading namespace separator and any whitespace from a name.
/// Relative scopes (`self`, `static`, `parent`) are not names.
pub fn normalize_name(text: &str) -> Option<String> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let name = compact.trim_start_matches('\\');

    if name.is_empty() || RELATIVE_SCOPES.iter().any(|s| name.eq_ignore_ascii_case(s)) {
        return None;
    }
    Some(name.to_string())
}

impl Parser for PhpParser {
    fn parse(&self, path: &Path, contents: &str) -> Result<SyntaxNode, ParseError> {
        let mut parser = TsParser::new();
        parser.set_language(&tree_sitter_php::language_php())?;

        let tree = parser.parse(contents, None).ok_or(ParseError::NoTree)?;
        let root = tree.root_node();

        if let Some(error) = first_error(root) {
            let position = error.start_position();
            return Err(ParseError::Syntax {
                line: position.row + 1,
                column: position.column + 1,
            });
        }

        let lowered = self.lower(root, contents);
        trace!("Parsed {}: {} nodes", path.display(), lowered.node_count());

        Ok(lowered)
    }
}

impl Default for PhpParser {
    fn default() -> Self {
        Self::new()
    }
}
