//! Per-render mutable state
//!
//! A [`RenderSession`] lives for exactly one top-level render call and is
//! threaded through evaluation by `&mut`. It is never stored on the engine,
//! so concurrent renders cannot see each other's include chains or budgets.

use std::ops::{Deref, DerefMut};

use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{Result, TemplateError};

/// Include chain and loop budget for one render
#[derive(Debug, Clone)]
pub struct RenderSession {
    include_stack: Vec<String>,
    loop_evaluations: usize,
    max_include_depth: usize,
    max_loop_evaluations: usize,
}

impl RenderSession {
    /// Start a session with an empty include stack and a zero loop count
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            include_stack: Vec::new(),
            loop_evaluations: 0,
            max_include_depth: config.max_include_depth,
            max_loop_evaluations: config.max_loop_evaluations,
        }
    }

    /// Names of the includes currently being evaluated, outermost first
    pub fn include_stack(&self) -> &[String] {
        &self.include_stack
    }

    /// Loop constructs evaluated so far
    pub fn loop_evaluations(&self) -> usize {
        self.loop_evaluations
    }

    /// Charge one loop evaluation against the budget
    pub fn record_loop(&mut self) -> Result<()> {
        if self.loop_evaluations >= self.max_loop_evaluations {
            return Err(TemplateError::IterationLimit {
                limit: self.max_loop_evaluations,
            });
        }
        self.loop_evaluations += 1;
        Ok(())
    }

    /// Push an include onto the chain
    ///
    /// The returned guard pops it again when dropped, including when
    /// evaluation of the include fails.
    pub fn enter_include(&mut self, name: &str) -> Result<IncludeGuard<'_>> {
        if self.include_stack.iter().any(|active| active == name) {
            let mut chain = self.include_stack.clone();
            chain.push(name.to_string());
            return Err(TemplateError::CircularDependency { chain });
        }

        if self.include_stack.len() >= self.max_include_depth {
            return Err(TemplateError::DepthExceeded {
                max: self.max_include_depth,
            });
        }

        self.include_stack.push(name.to_string());
        debug!(include = name, depth = self.include_stack.len(), "Entering include");
        Ok(IncludeGuard { session: self })
    }
}

/// Keeps an include on the chain for as long as it is alive
#[derive(Debug)]
pub struct IncludeGuard<'a> {
    session: &'a mut RenderSession,
}

impl Deref for IncludeGuard<'_> {
    type Target = RenderSession;

    fn deref(&self) -> &Self::Target {
        self.session
    }
}

impl DerefMut for IncludeGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.session
    }
}

impl Drop for IncludeGuard<'_> {
    fn drop(&mut self) {
        self.session.include_stack.pop();
    }
}
