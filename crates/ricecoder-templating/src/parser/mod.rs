//! Template parser
//!
//! Turns a token sequence into a syntax tree. Each tag is offered to an
//! ordered chain of [`ConstructParser`]s and the first that accepts it builds
//! the node. Loop bodies are parsed by re-entering [`Parser::parse_until`], so
//! nested loops and includes come out as nested tree structure.
//!
//! Tags no construct accepts are kept as literal text.

pub mod constructs;

use tracing::debug;

use crate::ast::Node;
use crate::config::{EngineConfig, DEFAULT_MAX_LOOP_NESTING};
use crate::error::Result;
use crate::tokenizer::{tag_source, Token};

pub use constructs::{ConstructParser, IncludeParser, LoopParser, VariableParser, LOOP_END};

/// Cursor over a token sequence
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Vec<Token>,
    index: usize,
    loop_depth: usize,
}

impl TokenStream {
    /// Create a stream positioned at the first token
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            index: 0,
            loop_depth: 0,
        }
    }

    /// Consume the next token
    pub fn next_token(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.index).cloned()?;
        self.index += 1;
        Some(token)
    }

    /// Look at the next token without consuming it
    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    /// Whether all tokens have been consumed
    pub fn is_exhausted(&self) -> bool {
        self.index >= self.tokens.len()
    }

    /// Index of the next token
    pub fn offset(&self) -> usize {
        self.index
    }

    /// Template source of the tokens consumed since `start`
    pub fn source_since(&self, start: usize) -> String {
        self.tokens[start.min(self.index)..self.index]
            .iter()
            .map(Token::to_source)
            .collect()
    }

    /// Number of loops currently being parsed
    pub fn loop_depth(&self) -> usize {
        self.loop_depth
    }

    pub(crate) fn enter_loop(&mut self) {
        self.loop_depth += 1;
    }

    pub(crate) fn exit_loop(&mut self) {
        self.loop_depth = self.loop_depth.saturating_sub(1);
    }
}

/// Drives tokens through the construct parser chain
pub struct Parser {
    constructs: Vec<Box<dyn ConstructParser>>,
    max_loop_nesting: usize,
}

impl Parser {
    /// Create a parser with the default chain: loop, include, variable
    pub fn new() -> Self {
        Self::with_constructs(vec![
            Box::new(LoopParser),
            Box::new(IncludeParser),
            Box::new(VariableParser),
        ])
    }

    /// Create a parser with a custom construct chain, tried in order
    pub fn with_constructs(constructs: Vec<Box<dyn ConstructParser>>) -> Self {
        Self {
            constructs,
            max_loop_nesting: DEFAULT_MAX_LOOP_NESTING,
        }
    }

    /// Apply the nesting limit from an engine configuration
    pub fn with_config(mut self, config: &EngineConfig) -> Self {
        self.max_loop_nesting = config.max_loop_nesting;
        self
    }

    /// Maximum loop nesting accepted
    pub fn max_loop_nesting(&self) -> usize {
        self.max_loop_nesting
    }

    /// Parse a complete token sequence
    pub fn parse(&self, tokens: Vec<Token>) -> Result<Vec<Node>> {
        let mut stream = TokenStream::new(tokens);
        let (nodes, _) = self.parse_nodes(&mut stream, None)?;
        Ok(nodes)
    }

    /// Parse until a tag whose content is exactly `stop_tag`
    ///
    /// The stop tag is consumed. The flag is `false` when the stream ran out
    /// before the stop tag appeared.
    pub fn parse_until(
        &self,
        stream: &mut TokenStream,
        stop_tag: &str,
    ) -> Result<(Vec<Node>, bool)> {
        self.parse_nodes(stream, Some(stop_tag))
    }

    fn parse_nodes(
        &self,
        stream: &mut TokenStream,
        stop_tag: Option<&str>,
    ) -> Result<(Vec<Node>, bool)> {
        let mut nodes = Vec::new();

        while let Some(token) = stream.next_token() {
            match token {
                Token::Text { content, position } => {
                    nodes.push(Node::text(content, position));
                }
                Token::Tag {
                    content, position, ..
                } => {
                    if stop_tag == Some(content.as_str()) {
                        return Ok((nodes, true));
                    }

                    match self.constructs.iter().find(|c| c.can_parse(&content)) {
                        Some(construct) => {
                            nodes.push(construct.parse(&content, position, stream, self)?);
                        }
                        None => {
                            debug!(
                                tag = %content,
                                line = position.line,
                                column = position.column,
                                "Unrecognized tag kept as text"
                            );
                            nodes.push(Node::text(tag_source(&content), position));
                        }
                    }
                }
            }
        }

        Ok((nodes, false))
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field(
                "constructs",
                &self.constructs.iter().map(|c| c.name()).collect::<Vec<_>>(),
            )
            .field("max_loop_nesting", &self.max_loop_nesting)
            .finish()
    }
}
