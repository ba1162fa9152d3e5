//! Template syntax tree
//!
//! The node set is closed. A new tag form means a new [`Node`] variant, and
//! the evaluator's exhaustive match flags every place that must handle it.

use crate::tokenizer::Position;

/// A parsed template element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Literal output
    Text(TextNode),
    /// `{{name}}` or `{{a.b.c}}`
    Variable(VariableNode),
    /// `{{for item in items}} ... {{/for}}`
    ForLoop(ForLoopNode),
    /// `{{include:file}}`
    Include(IncludeNode),
}

impl Node {
    /// Source position of the node
    pub fn position(&self) -> Position {
        match self {
            Node::Text(node) => node.position,
            Node::Variable(node) => node.position,
            Node::ForLoop(node) => node.position,
            Node::Include(node) => node.position,
        }
    }

    /// Create a text node
    pub fn text(text: impl Into<String>, position: Position) -> Self {
        Node::Text(TextNode {
            text: text.into(),
            position,
        })
    }
}

/// Literal text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextNode {
    /// Text emitted unchanged
    pub text: String,
    /// Where the text starts
    pub position: Position,
}

/// Variable or property reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableNode {
    /// Dotted path, e.g. `user.name`
    pub path: String,
    /// Position of the tag
    pub position: Position,
}

/// Loop over a collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForLoopNode {
    /// Name bound to each item inside the body
    pub variable: String,
    /// Dotted path of the collection
    pub collection: String,
    /// Parsed loop body
    pub body: Vec<Node>,
    /// Position of the opening tag
    pub position: Position,
}

/// Inclusion of another template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeNode {
    /// Name passed to the content provider
    pub file_name: String,
    /// Position of the tag
    pub position: Position,
}
