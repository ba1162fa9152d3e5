//! Grammar recognizers for each tag form
//!
//! Each construct owns the syntax and validation of one tag form. The
//! default chain order is loop, include, variable.

use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

use crate::ast::{ForLoopNode, IncludeNode, Node, VariableNode};
use crate::error::{Result, TemplateError};
use crate::parser::{Parser, TokenStream};
use crate::tokenizer::{tag_source, Position};

/// Content of the tag closing a loop body
pub const LOOP_END: &str = "/for";

/// Prefix of include tags
pub const INCLUDE_PREFIX: &str = "include:";

const LOOP_KEYWORD: &str = "for";

/// A recognizer for one tag form
pub trait ConstructParser: Send + Sync {
    /// Short name used in diagnostics
    fn name(&self) -> &'static str;

    /// Whether this construct claims the tag
    fn can_parse(&self, content: &str) -> bool;

    /// Build a node from a claimed tag
    ///
    /// `stream` is positioned just after the tag; block constructs consume
    /// their body from it.
    fn parse(
        &self,
        content: &str,
        position: Position,
        stream: &mut TokenStream,
        parser: &Parser,
    ) -> Result<Node>;
}

fn variable_pattern() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^\w+(\.\w+)*$").expect("Invalid regex"))
}

fn loop_pattern() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        // for <item> in <collection.path>
        Regex::new(r"^for\s+(\w+)\s+in\s+(\w+(?:\.\w+)*)$").expect("Invalid regex")
    })
}

/// `{{name}}` and `{{a.b.c}}`
#[derive(Debug, Clone, Copy, Default)]
pub struct VariableParser;

impl ConstructParser for VariableParser {
    fn name(&self) -> &'static str {
        "variable"
    }

    fn can_parse(&self, content: &str) -> bool {
        variable_pattern().is_match(content)
    }

    fn parse(
        &self,
        content: &str,
        position: Position,
        _stream: &mut TokenStream,
        _parser: &Parser,
    ) -> Result<Node> {
        Ok(Node::Variable(VariableNode {
            path: content.to_string(),
            position,
        }))
    }
}

/// `{{include:relative/name}}`
#[derive(Debug, Clone, Copy, Default)]
pub struct IncludeParser;

impl ConstructParser for IncludeParser {
    fn name(&self) -> &'static str {
        "include"
    }

    fn can_parse(&self, content: &str) -> bool {
        content.starts_with(INCLUDE_PREFIX)
    }

    fn parse(
        &self,
        content: &str,
        position: Position,
        _stream: &mut TokenStream,
        _parser: &Parser,
    ) -> Result<Node> {
        let file_name = content
            .strip_prefix(INCLUDE_PREFIX)
            .ok_or_else(|| {
                TemplateError::Validation(format!(
                    "Include tag '{}' must start with '{}'",
                    content, INCLUDE_PREFIX
                ))
            })?
            .trim();
        validate_template_name(file_name)?;

        Ok(Node::Include(IncludeNode {
            file_name: file_name.to_string(),
            position,
        }))
    }
}

/// `{{for item in items}} ... {{/for}}`
#[derive(Debug, Clone, Copy, Default)]
pub struct LoopParser;

impl ConstructParser for LoopParser {
    fn name(&self) -> &'static str {
        "loop"
    }

    /// Claims every tag starting with `for`, so `{{format}}` is a loop
    /// grammar error rather than a variable
    fn can_parse(&self, content: &str) -> bool {
        content.starts_with(LOOP_KEYWORD)
    }

    fn parse(
        &self,
        content: &str,
        position: Position,
        stream: &mut TokenStream,
        parser: &Parser,
    ) -> Result<Node> {
        let captures = loop_pattern().captures(content).ok_or_else(|| {
            TemplateError::syntax(
                position.line,
                position.column,
                format!(
                    "Malformed loop '{}', expected 'for <item> in <collection>'",
                    content
                ),
            )
        })?;
        let variable = captures[1].to_string();
        let collection = captures[2].to_string();

        if stream.loop_depth() >= parser.max_loop_nesting() {
            return Err(TemplateError::syntax(
                position.line,
                position.column,
                format!(
                    "Loop nesting exceeds maximum of {}",
                    parser.max_loop_nesting()
                ),
            ));
        }

        let body_start = stream.offset();
        stream.enter_loop();
        let parsed = parser.parse_until(stream, LOOP_END);
        stream.exit_loop();
        let (body, closed) = parsed?;

        if !closed {
            warn!(
                line = position.line,
                column = position.column,
                "Loop over '{}' has no closing tag, keeping it as text",
                collection
            );
            // The opening tag is the token just before the body
            let text = match body_start.checked_sub(1) {
                Some(opening) => stream.source_since(opening),
                None => tag_source(content) + &stream.source_since(body_start),
            };
            return Ok(Node::text(text, position));
        }

        Ok(Node::ForLoop(ForLoopNode {
            variable,
            collection,
            body,
            position,
        }))
    }
}

/// Reject blank names and names with a `..` path segment
///
/// Applies to include targets and to top-level template names, before any
/// content is fetched.
pub fn validate_template_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(TemplateError::Validation(
            "Template name cannot be empty".to_string(),
        ));
    }

    if name.split(['/', '\\']).any(|segment| segment == "..") {
        return Err(TemplateError::Validation(format!(
            "Template name '{}' must not contain '..' segments",
            name
        )));
    }

    Ok(())
}
