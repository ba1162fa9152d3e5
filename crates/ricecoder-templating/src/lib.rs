#![warn(missing_docs)]

//! Template rendering engine for ricecoder
//!
//! Renders text templates containing variable references, loops and file
//! includes against a scoped data context:
//!
//! - `{{name}}`, `{{user.name}}`: variable and property lookup
//! - `{{for item in items}} ... {{/for}}`: iteration
//! - `{{include:partials/header.html}}`: inclusion of another template
//!
//! Rendering runs tokenizer, parser and evaluator in sequence. Path
//! traversal, include cycles, include depth, loop nesting and the total
//! number of evaluated loops are guarded and fail the render. Unknown
//! variables stay in the output as `{{name}}` and null values render empty.
//!
//! ```
//! use ricecoder_templating::{Context, InMemoryProvider, TemplateEngine};
//!
//! let provider = InMemoryProvider::new()
//!     .with_template("page.html", "{{include:header.html}}{{for c in colors}}<b>{{c}}</b>{{/for}}")
//!     .with_template("header.html", "<h1>{{title}}</h1>");
//! let engine = TemplateEngine::new(provider);
//!
//! let context = Context::new()
//!     .with_binding("title", "Palette")
//!     .with_binding("colors", vec!["red", "green"]);
//!
//! let output = engine.render("page.html", &context)?;
//! assert_eq!(output, "<h1>Palette</h1><b>red</b><b>green</b>");
//! # Ok::<(), ricecoder_templating::TemplateError>(())
//! ```

pub mod ast;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod parser;
pub mod provider;
pub mod tokenizer;
pub mod value;

// Re-export public API
pub use ast::{ForLoopNode, IncludeNode, Node, TextNode, VariableNode};
pub use config::EngineConfig;
pub use context::Context;
pub use engine::TemplateEngine;
pub use error::{Result, TemplateError};
pub use evaluator::{Evaluator, NodeEvaluator, RenderScope, RenderSession};
pub use parser::{ConstructParser, IncludeParser, LoopParser, Parser, TokenStream, VariableParser};
pub use provider::{ContentProvider, DirectoryProvider, InMemoryProvider};
pub use tokenizer::{Position, Token, Tokenizer};
pub use value::{FieldAccessor, Record, Value};
