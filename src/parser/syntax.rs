//! Closed syntax tree handed to the usage extractor.
//!
//! The tree-sitter tree is lowered into [`SyntaxNode`]s as soon as a file is
//! parsed. Each node carries the names the extractor cares about, already
//! reduced to literal strings, plus its children in source order. Names that
//! could not be reduced (dynamic class expressions, nullable or union type
//! hints) are stored as `None`.

/// The kind of a syntax node and the names it references
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// `use A\B, C\D as E;`
    Import { paths: Vec<String> },
    /// `use A\B\{C, D\E};`
    GroupedImport { prefix: String, paths: Vec<String> },
    /// `new Foo(...)`
    Instantiation { class: Option<String> },
    /// `Foo::bar()`
    StaticCall { class: Option<String> },
    /// `Foo::BAR`, `Foo::class`
    ConstantFetch { class: Option<String> },
    /// `Foo::$bar`
    StaticPropertyAccess { class: Option<String> },
    /// `$x instanceof Foo`
    TypeCheck { class: Option<String> },
    /// `catch (A | B $e)`
    CatchClause { types: Vec<String> },
    /// `foo(...)`
    FunctionCall { name: Option<String> },
    /// A function, method or promoted constructor parameter
    Parameter { type_hint: Option<String> },
    /// A function or method declaration
    FunctionDeclaration { return_type: Option<String> },
    /// A typed or untyped property declaration
    PropertyDeclaration { type_hint: Option<String> },
    /// A named or anonymous class
    ClassDeclaration {
        extends: Option<String>,
        implements: Vec<String>,
    },
    /// `use SomeTrait, OtherTrait;` inside a class body
    TraitUse { traits: Vec<String> },
    /// Anything else; only its children matter
    Other,
}

impl NodeKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            NodeKind::Import { .. } => "import",
            NodeKind::GroupedImport { .. } => "grouped import",
            NodeKind::Instantiation { .. } => "instantiation",
            NodeKind::StaticCall { .. } => "static call",
            NodeKind::ConstantFetch { .. } => "constant fetch",
            NodeKind::StaticPropertyAccess { .. } => "static property access",
            NodeKind::TypeCheck { .. } => "type check",
            NodeKind::CatchClause { .. } => "catch clause",
            NodeKind::FunctionCall { .. } => "function call",
            NodeKind::Parameter { .. } => "parameter",
            NodeKind::FunctionDeclaration { .. } => "function declaration",
            NodeKind::PropertyDeclaration { .. } => "property declaration",
            NodeKind::ClassDeclaration { .. } => "class declaration",
            NodeKind::TraitUse { .. } => "trait use",
            NodeKind::Other => "other",
        }
    }
}

/// A node of the lowered syntax tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    pub fn new(kind: NodeKind, children: Vec<SyntaxNode>) -> Self {
        Self { kind, children }
    }

    pub fn leaf(kind: NodeKind) -> Self {
        Self::new(kind, Vec::new())
    }

    /// Child nodes in source order, whatever the kind
    pub fn children(&self) -> &[SyntaxNode] {
        &self.children
    }

    /// Total number of nodes in this subtree
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            count += 1;
            pending.extend(node.children.iter());
        }
        count
    }

    /// Attach a finished child. Inert children are dropped and `Other`
    /// children hand their own children up instead.
    pub fn adopt(&mut self, mut child: SyntaxNode) {
        if child.is_inert() {
            return;
        }
        if child.kind == NodeKind::Other {
            self.children.append(&mut child.children);
        } else {
            self.children.push(child);
        }
    }

    /// Whether this node and its whole subtree carry no names
    pub fn is_inert(&self) -> bool {
        self.kind == NodeKind::Other && self.children.is_empty()
    }
}

// Deep trees are torn down with a worklist instead of nested drop calls
impl Drop for SyntaxNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}
