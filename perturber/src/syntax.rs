//! Parser and renderer seams of the engine.

use crate::emit;
use crate::error::ParseError;
use crate::parser;
use crate::tree::Tree;

/// Turns source text into a tree.
pub trait Parse {
    fn parse(&self, source: &str) -> Result<Tree, ParseError>;
}

/// Turns a tree back into source text. Must accept any tree the mutation
/// operators can produce.
pub trait Render {
    fn render(&self, tree: &Tree) -> String;
}

/// The bundled Python parser and unparser.
#[derive(Debug, Default, Copy, Clone)]
pub struct Python;

impl Parse for Python {
    fn parse(&self, source: &str) -> Result<Tree, ParseError> {
        parser::parse(source)
    }
}

impl Render for Python {
    fn render(&self, tree: &Tree) -> String {
        emit::render(tree)
    }
}
