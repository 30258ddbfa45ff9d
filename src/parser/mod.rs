mod common;
mod php;
mod syntax;

pub use common::{ParseError, Parser};
pub use php::{normalize_name, PhpParser};
pub use syntax::{NodeKind, SyntaxNode};
