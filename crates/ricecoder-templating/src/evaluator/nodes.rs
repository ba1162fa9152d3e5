//! Evaluators for each node kind

use tracing::{debug, trace};

use crate::ast::{ForLoopNode, IncludeNode, TextNode, VariableNode};
use crate::context::Context;
use crate::error::Result;
use crate::evaluator::{NodeEvaluator, RenderScope};
use crate::tokenizer::tag_source;
use crate::value::Value;

/// Emits literal text
#[derive(Debug, Clone, Copy, Default)]
pub struct TextEvaluator;

impl NodeEvaluator<TextNode> for TextEvaluator {
    fn evaluate(
        &self,
        node: &TextNode,
        _context: &Context,
        _scope: &mut RenderScope<'_>,
    ) -> Result<String> {
        Ok(node.text.clone())
    }
}

/// Substitutes variable values
///
/// A path bound to null renders empty. A path that does not resolve keeps
/// its `{{path}}` placeholder so missing data stays visible in the output.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariableEvaluator;

impl NodeEvaluator<VariableNode> for VariableEvaluator {
    fn evaluate(
        &self,
        node: &VariableNode,
        context: &Context,
        _scope: &mut RenderScope<'_>,
    ) -> Result<String> {
        match context.lookup(&node.path) {
            Some(Value::Null) => Ok(String::new()),
            Some(value) => Ok(value.render()),
            None => {
                trace!(
                    path = %node.path,
                    line = node.position.line,
                    "Unresolved variable left in place"
                );
                Ok(tag_source(&node.path))
            }
        }
    }
}

/// Repeats a loop body once per collection item
#[derive(Debug, Clone, Copy, Default)]
pub struct ForLoopEvaluator;

impl ForLoopEvaluator {
    /// Child scope for one iteration
    ///
    /// List-valued fields of a record item are bound by name so a nested
    /// loop can iterate them directly. The loop variable wins over a field
    /// of the same name.
    fn iteration_context(context: &Context, variable: &str, item: &Value) -> Context {
        let mut bindings: Vec<(String, Value)> = match item {
            Value::Record(record) => record
                .list_fields()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
            _ => Vec::new(),
        };
        bindings.push((variable.to_string(), item.clone()));
        context.with_bindings(bindings)
    }
}

impl NodeEvaluator<ForLoopNode> for ForLoopEvaluator {
    fn evaluate(
        &self,
        node: &ForLoopNode,
        context: &Context,
        scope: &mut RenderScope<'_>,
    ) -> Result<String> {
        scope.session_mut().record_loop()?;

        let Some(items) = context.lookup(&node.collection).and_then(Value::as_list) else {
            debug!(
                collection = %node.collection,
                line = node.position.line,
                "Loop collection missing or not a list, rendering nothing"
            );
            return Ok(String::new());
        };

        let mut output = String::new();
        for item in items {
            let child = Self::iteration_context(context, &node.variable, item);
            output.push_str(&scope.evaluate_nodes(&node.body, &child)?);
        }
        Ok(output)
    }
}

/// Splices in another template rendered against the caller's context
#[derive(Debug, Clone, Copy, Default)]
pub struct IncludeEvaluator;

impl NodeEvaluator<IncludeNode> for IncludeEvaluator {
    fn evaluate(
        &self,
        node: &IncludeNode,
        context: &Context,
        scope: &mut RenderScope<'_>,
    ) -> Result<String> {
        let mut guard = scope.session.enter_include(&node.file_name)?;

        let content = scope.provider.content(&node.file_name)?;
        let nodes = scope.parser.parse(scope.tokenizer.tokenize(&content))?;

        let mut nested = RenderScope::new(
            scope.evaluator,
            scope.parser,
            scope.tokenizer,
            scope.provider,
            &mut guard,
        );
        nested.evaluate_nodes(&nodes, context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Node;
    use crate::config::EngineConfig;
    use crate::error::TemplateError;
    use crate::evaluator::{Evaluator, RenderSession};
    use crate::parser::Parser;
    use crate::provider::InMemoryProvider;
    use crate::tokenizer::Tokenizer;
    use serde_json::json;

    fn render_with(
        source: &str,
        context: &Context,
        provider: &InMemoryProvider,
        config: &EngineConfig,
    ) -> Result<String> {
        let tokenizer = Tokenizer::new();
        let parser = Parser::new().with_config(config);
        let evaluator = Evaluator::new();
        let nodes: Vec<Node> = parser.parse(tokenizer.tokenize(source))?;
        let mut session = RenderSession::new(config);
        let mut scope = RenderScope::new(&evaluator, &parser, &tokenizer, provider, &mut session);
        scope.evaluate_nodes(&nodes, context)
    }

    fn render(source: &str, context: &Context) -> Result<String> {
        render_with(
            source,
            context,
            &InMemoryProvider::new(),
            &EngineConfig::default(),
        )
    }

    #[test]
    fn test_variable_outcomes() {
        let context = Context::from_json(json!({"name": "World", "nickname": null, "age": 7}));
        assert_eq!(render("{{name}}", &context).unwrap(), "World");
        assert_eq!(render("[{{nickname}}]", &context).unwrap(), "[]");
        assert_eq!(render("{{age}}", &context).unwrap(), "7");
        assert_eq!(render("{{missing}}", &context).unwrap(), "{{missing}}");
        assert_eq!(render("{{name.first}}", &context).unwrap(), "{{name.first}}");
    }

    #[test]
    fn test_loop_over_list() {
        let context = Context::new().with_binding("colors", vec!["red", "green", "blue"]);
        let output = render("{{for c in colors}}<{{c}}>{{/for}}", &context).unwrap();
        assert_eq!(output, "<red><green><blue>");
    }

    #[test]
    fn test_loop_over_missing_or_scalar_is_empty() {
        let context = Context::new().with_binding("title", "x");
        assert_eq!(render("{{for c in nothing}}x{{/for}}", &context).unwrap(), "");
        assert_eq!(render("{{for c in title}}x{{/for}}", &context).unwrap(), "");
    }

    #[test]
    fn test_loop_variable_shadows_only_inside_body() {
        let context = Context::new()
            .with_binding("item", "outer")
            .with_binding("items", vec!["a", "b"]);
        let output = render("{{item}}|{{for item in items}}{{item}}{{/for}}|{{item}}", &context).unwrap();
        assert_eq!(output, "outer|ab|outer");
    }

    #[test]
    fn test_record_list_fields_are_bound_for_nested_loops() {
        let context = Context::from_json(json!({
            "posts": [
                {"title": "One", "tags": ["a", "b"]},
                {"title": "Two", "tags": ["c"]}
            ]
        }));
        let output = render(
            "{{for post in posts}}{{post.title}}:{{for tag in tags}}{{tag}}{{/for}};{{/for}}",
            &context,
        )
        .unwrap();
        assert_eq!(output, "One:ab;Two:c;");
    }

    #[test]
    fn test_loop_variable_wins_over_same_named_field() {
        let context = Context::from_json(json!({
            "groups": [{"groups": ["inner"]}]
        }));
        let output = render(
            "{{for groups in groups}}{{groups.groups}}{{/for}}",
            &context,
        )
        .unwrap();
        assert_eq!(output, r#"["inner"]"#);
    }

    #[test]
    fn test_loop_budget_counts_constructs_not_items() {
        let config = EngineConfig::default().with_max_loop_evaluations(2);
        let context = Context::new().with_binding("items", (0..100).collect::<Vec<i32>>());
        let provider = InMemoryProvider::new();

        let two = "{{for i in items}}{{i}}{{/for}}{{for i in items}}{{/for}}";
        assert!(render_with(two, &context, &provider, &config).is_ok());

        let three = "{{for i in items}}{{/for}}{{for i in items}}{{/for}}{{for i in items}}{{/for}}";
        assert!(matches!(
            render_with(three, &context, &provider, &config),
            Err(TemplateError::IterationLimit { limit: 2 })
        ));
    }

    #[test]
    fn test_nested_loop_counts_each_evaluation() {
        let config = EngineConfig::default().with_max_loop_evaluations(3);
        let context = Context::from_json(json!({"rows": [[1], [2], [3]]}));
        let provider = InMemoryProvider::new();

        // One outer evaluation plus one inner evaluation per row
        let source = "{{for row in rows}}{{for cell in row}}{{cell}}{{/for}}{{/for}}";
        assert!(matches!(
            render_with(source, &context, &provider, &config),
            Err(TemplateError::IterationLimit { .. })
        ));
    }

    #[test]
    fn test_include_sees_caller_context() {
        let provider = InMemoryProvider::new().with_template("greet.html", "Hi {{name}}");
        let context = Context::new().with_binding("users", vec!["Ann", "Bo"]);
        let output = render_with(
            "{{for name in users}}[{{include:greet.html}}]{{/for}}",
            &context,
            &provider,
            &EngineConfig::default(),
        )
        .unwrap();
        assert_eq!(output, "[Hi Ann][Hi Bo]");
    }

    #[test]
    fn test_include_stack_released_after_failure() {
        let provider = InMemoryProvider::new()
            .with_template("bad.html", "{{for x}}")
            .with_template("ok.html", "fine");
        let config = EngineConfig::default();
        let tokenizer = Tokenizer::new();
        let parser = Parser::new();
        let evaluator = Evaluator::new();
        let mut session = RenderSession::new(&config);

        let failing = parser.parse(tokenizer.tokenize("{{include:bad.html}}")).unwrap();
        {
            let mut scope = RenderScope::new(&evaluator, &parser, &tokenizer, &provider, &mut session);
            assert!(scope.evaluate_nodes(&failing, &Context::new()).is_err());
        }
        assert!(session.include_stack().is_empty());
    }

    #[test]
    fn test_repeated_sibling_includes_are_not_cycles() {
        let provider = InMemoryProvider::new().with_template("sep.html", "-");
        let output = render_with(
            "a{{include:sep.html}}b{{include:sep.html}}c",
            &Context::new(),
            &provider,
            &EngineConfig::default(),
        )
        .unwrap();
        assert_eq!(output, "a-b-c");
    }

    #[test]
    fn test_missing_include_is_not_found() {
        assert!(matches!(
            render("{{include:absent.html}}", &Context::new()),
            Err(TemplateError::NotFound(name)) if name == "absent.html"
        ));
    }
}
