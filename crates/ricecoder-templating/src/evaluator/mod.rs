//! Syntax tree evaluation
//!
//! [`Evaluator`] dispatches each [`Node`] variant to its evaluator with an
//! exhaustive match. Evaluators receive a [`RenderScope`] carrying the
//! collaborators of the current render (parser and provider for includes)
//! and its [`RenderSession`].

pub mod nodes;
pub mod session;

use crate::ast::Node;
use crate::context::Context;
use crate::error::Result;
use crate::parser::Parser;
use crate::provider::ContentProvider;
use crate::tokenizer::Tokenizer;

pub use nodes::{ForLoopEvaluator, IncludeEvaluator, TextEvaluator, VariableEvaluator};
pub use session::{IncludeGuard, RenderSession};

/// Evaluates one kind of node
pub trait NodeEvaluator<N> {
    /// Render `node` against `context`
    fn evaluate(&self, node: &N, context: &Context, scope: &mut RenderScope<'_>)
        -> Result<String>;
}

/// Fixed table of node evaluators
#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluator {
    text: TextEvaluator,
    variable: VariableEvaluator,
    for_loop: ForLoopEvaluator,
    include: IncludeEvaluator,
}

impl Evaluator {
    /// Create the evaluator table
    pub fn new() -> Self {
        Self::default()
    }

    /// Render a single node
    pub fn evaluate_node(
        &self,
        node: &Node,
        context: &Context,
        scope: &mut RenderScope<'_>,
    ) -> Result<String> {
        match node {
            Node::Text(text) => self.text.evaluate(text, context, scope),
            Node::Variable(variable) => self.variable.evaluate(variable, context, scope),
            Node::ForLoop(for_loop) => self.for_loop.evaluate(for_loop, context, scope),
            Node::Include(include) => self.include.evaluate(include, context, scope),
        }
    }

    /// Render nodes in order and concatenate the output
    pub fn evaluate_nodes(
        &self,
        nodes: &[Node],
        context: &Context,
        scope: &mut RenderScope<'_>,
    ) -> Result<String> {
        let mut output = String::new();
        for node in nodes {
            output.push_str(&self.evaluate_node(node, context, scope)?);
        }
        Ok(output)
    }
}

/// Collaborators and session state of one render
pub struct RenderScope<'a> {
    evaluator: &'a Evaluator,
    parser: &'a Parser,
    tokenizer: &'a Tokenizer,
    provider: &'a dyn ContentProvider,
    session: &'a mut RenderSession,
}

impl<'a> RenderScope<'a> {
    /// Bundle the collaborators for a render
    pub fn new(
        evaluator: &'a Evaluator,
        parser: &'a Parser,
        tokenizer: &'a Tokenizer,
        provider: &'a dyn ContentProvider,
        session: &'a mut RenderSession,
    ) -> Self {
        Self {
            evaluator,
            parser,
            tokenizer,
            provider,
            session,
        }
    }

    /// Render child nodes through the shared dispatcher
    pub fn evaluate_nodes(&mut self, nodes: &[Node], context: &Context) -> Result<String> {
        let evaluator = self.evaluator;
        evaluator.evaluate_nodes(nodes, context, self)
    }

    /// Session state of this render
    pub fn session(&self) -> &RenderSession {
        self.session
    }

    /// Mutable session state of this render
    pub fn session_mut(&mut self) -> &mut RenderSession {
        self.session
    }
}
