//! Render entry point
//!
//! [`TemplateEngine`] composes tokenizer, parser and evaluator around a
//! content provider. The engine itself is read-only after construction and
//! can be shared across threads; every render call allocates its own
//! [`RenderSession`].

use std::sync::Arc;

use tracing::debug;

use crate::ast::Node;
use crate::config::EngineConfig;
use crate::context::Context;
use crate::error::Result;
use crate::evaluator::{Evaluator, RenderScope, RenderSession};
use crate::parser::constructs::validate_template_name;
use crate::parser::Parser;
use crate::provider::ContentProvider;
use crate::tokenizer::Tokenizer;

/// Renders named templates against a context
pub struct TemplateEngine {
    provider: Arc<dyn ContentProvider>,
    config: EngineConfig,
    tokenizer: Tokenizer,
    parser: Parser,
    evaluator: Evaluator,
}

impl TemplateEngine {
    /// Create an engine with default limits
    pub fn new(provider: impl ContentProvider + 'static) -> Self {
        Self::build(Arc::new(provider), EngineConfig::default())
    }

    /// Create an engine with custom limits
    ///
    /// Fails with [`InvalidConfig`](crate::TemplateError::InvalidConfig) when a
    /// limit is zero.
    pub fn with_config(
        provider: impl ContentProvider + 'static,
        config: EngineConfig,
    ) -> Result<Self> {
        Self::from_shared(Arc::new(provider), config)
    }

    /// Create an engine over a provider shared with other owners
    ///
    /// Fails with [`InvalidConfig`](crate::TemplateError::InvalidConfig) when a
    /// limit is zero.
    pub fn from_shared(provider: Arc<dyn ContentProvider>, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(provider, config))
    }

    fn build(provider: Arc<dyn ContentProvider>, config: EngineConfig) -> Self {
        Self {
            provider,
            config,
            tokenizer: Tokenizer::new(),
            parser: Parser::new().with_config(&config),
            evaluator: Evaluator::new(),
        }
    }

    /// Replace the construct parser chain
    pub fn with_parser(mut self, parser: Parser) -> Self {
        self.parser = parser.with_config(&self.config);
        self
    }

    /// Limits in effect
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Render the template named `name`
    ///
    /// The name is validated before the provider is asked for it. Any
    /// guard or grammar error aborts the render without partial output.
    pub fn render(&self, name: &str, context: &Context) -> Result<String> {
        validate_template_name(name)?;
        debug!(template = name, "Rendering template");

        let source = self.provider.content(name)?;
        let output = self.render_source(&source, context)?;

        debug!(template = name, bytes = output.len(), "Rendered template");
        Ok(output)
    }

    /// Render template text directly
    ///
    /// Includes inside `source` still go through the provider.
    pub fn render_str(&self, source: &str, context: &Context) -> Result<String> {
        self.render_source(source, context)
    }

    /// Parse the template named `name` without rendering it
    pub fn parse(&self, name: &str) -> Result<Vec<Node>> {
        validate_template_name(name)?;
        let source = self.provider.content(name)?;
        self.parser.parse(self.tokenizer.tokenize(&source))
    }

    fn render_source(&self, source: &str, context: &Context) -> Result<String> {
        let nodes = self.parser.parse(self.tokenizer.tokenize(source))?;

        let mut session = RenderSession::new(&self.config);
        let mut scope = RenderScope::new(
            &self.evaluator,
            &self.parser,
            &self.tokenizer,
            &*self.provider,
            &mut session,
        );
        scope.evaluate_nodes(&nodes, context)
    }
}

impl std::fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("config", &self.config)
            .field("parser", &self.parser)
            .finish_non_exhaustive()
    }
}
