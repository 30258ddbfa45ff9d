use crate::parser::{NodeKind, ParseError, Parser, PhpParser, SyntaxNode};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;

/// Every statically determinable reference found in a body of sources
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UsageSet {
    /// Class-like and function names seen in any "use this type" position
    pub used_symbols: BTreeSet<String>,

    /// Fully qualified names from import statements
    pub used_namespaces: BTreeSet<String>,
}

impl UsageSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_symbol(&mut self, name: impl Into<String>) {
        self.used_symbols.insert(name.into());
    }

    pub fn add_namespace(&mut self, name: impl Into<String>) {
        self.used_namespaces.insert(name.into());
    }

    /// Set union; order of merging never matters
    pub fn merge(&mut self, other: UsageSet) {
        self.used_symbols.extend(other.used_symbols);
        self.used_namespaces.extend(other.used_namespaces);
    }

    pub fn is_empty(&self) -> bool {
        self.used_symbols.is_empty() && self.used_namespaces.is_empty()
    }

    /// All names, imported namespaces first
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.used_namespaces
            .iter()
            .chain(self.used_symbols.iter())
            .map(String::as_str)
    }
}

/// Walks a lowered syntax tree and collects the names it references
pub struct UsageExtractor {
    parser: PhpParser,
}

impl UsageExtractor {
    pub fn new() -> Self {
        Self {
            parser: PhpParser::new(),
        }
    }

    /// Parse source text and extract its usage
    pub fn extract_source(&self, path: &Path, contents: &str) -> Result<UsageSet, ParseError> {
        let tree = self.parser.parse(path, contents)?;
        Ok(self.extract(&tree))
    }

    /// Extract the usage of one tree. Every node is visited whatever its
    /// ancestors contributed; the worklist keeps deep trees off the stack.
    pub fn extract(&self, tree: &SyntaxNode) -> UsageSet {
        let mut usage = UsageSet::new();
        let mut pending = vec![tree];
        while let Some(node) = pending.pop() {
            Self::record(node, &mut usage);
            pending.extend(node.children().iter().rev());
        }
        usage
    }

    /// Add the names one node references
    fn record(node: &SyntaxNode, usage: &mut UsageSet) {
        match &node.kind {
            NodeKind::Import { paths } => {
                for path in paths {
                    usage.add_namespace(path.as_str());
                }
            }
            NodeKind::GroupedImport { prefix, paths } => {
                for path in paths {
                    if prefix.is_empty() {
                        usage.add_namespace(path.as_str());
                    } else {
                        usage.add_namespace(format!("{}\\{}", prefix, path));
                    }
                }
            }
            NodeKind::Instantiation { class }
            | NodeKind::StaticCall { class }
            | NodeKind::ConstantFetch { class }
            | NodeKind::StaticPropertyAccess { class }
            | NodeKind::TypeCheck { class } => {
                if let Some(class) = class {
                    usage.add_symbol(class.as_str());
                }
            }
            NodeKind::CatchClause { types } => {
                for ty in types {
                    usage.add_symbol(ty.as_str());
                }
            }
            NodeKind::FunctionCall { name } => {
                if let Some(name) = name {
                    usage.add_symbol(name.as_str());
                }
            }
            NodeKind::Parameter { type_hint } | NodeKind::PropertyDeclaration { type_hint } => {
                if let Some(hint) = type_hint {
                    usage.add_symbol(hint.as_str());
                }
            }
            NodeKind::FunctionDeclaration { return_type } => {
                if let Some(ty) = return_type {
                    usage.add_symbol(ty.as_str());
                }
            }
            NodeKind::ClassDeclaration { extends, implements } => {
                if let Some(base) = extends {
                    usage.add_symbol(base.as_str());
                }
                for interface in implements {
                    usage.add_symbol(interface.as_str());
                }
            }
            NodeKind::TraitUse { traits } => {
                for name in traits {
                    usage.add_symbol(name.as_str());
                }
            }
            NodeKind::Other => {}
        }
    }
}

impl Default for UsageExtractor {
    fn default() -> Self {
        Self::new()
    }
}
