//! Engine configuration
//!
//! Guard limits are loaded from an optional configuration file layered under
//! `RICE_TEMPLATE_*` environment variables.

use std::path::Path;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TemplateError};

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "RICE_TEMPLATE";

/// Default maximum include nesting
pub const DEFAULT_MAX_INCLUDE_DEPTH: usize = 10;

/// Default loop evaluation budget per render
pub const DEFAULT_MAX_LOOP_EVALUATIONS: usize = 1000;

/// Default maximum loop nesting inside one template
pub const DEFAULT_MAX_LOOP_NESTING: usize = 64;

/// Limits enforced by the template engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of includes active at once
    pub max_include_depth: usize,
    /// Maximum number of loop constructs evaluated during one render
    pub max_loop_evaluations: usize,
    /// Maximum loop nesting accepted by the parser
    pub max_loop_nesting: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
            max_loop_evaluations: DEFAULT_MAX_LOOP_EVALUATIONS,
            max_loop_nesting: DEFAULT_MAX_LOOP_NESTING,
        }
    }
}

impl EngineConfig {
    /// Load configuration from an optional file and the environment
    ///
    /// The file format is picked from its extension (toml, yaml, json).
    /// A missing file is not an error. Environment variables such as
    /// `RICE_TEMPLATE_MAX_INCLUDE_DEPTH` override file values.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }

        let config = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let engine_config: EngineConfig = config.try_deserialize()?;
        engine_config.validate()?;
        Ok(engine_config)
    }

    /// Set the maximum include depth
    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = depth;
        self
    }

    /// Set the loop evaluation budget
    pub fn with_max_loop_evaluations(mut self, limit: usize) -> Self {
        self.max_loop_evaluations = limit;
        self
    }

    /// Set the maximum loop nesting
    pub fn with_max_loop_nesting(mut self, nesting: usize) -> Self {
        self.max_loop_nesting = nesting;
        self
    }

    /// Reject limits that would make every template fail
    pub fn validate(&self) -> Result<()> {
        if self.max_include_depth == 0 {
            return Err(TemplateError::InvalidConfig(
                "max_include_depth must be greater than 0".to_string(),
            ));
        }
        if self.max_loop_evaluations == 0 {
            return Err(TemplateError::InvalidConfig(
                "max_loop_evaluations must be greater than 0".to_string(),
            ));
        }
        if self.max_loop_nesting == 0 {
            return Err(TemplateError::InvalidConfig(
                "max_loop_nesting must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
