//! Scoped variable bindings for rendering
//!
//! A [`Context`] is immutable once built. Layering a binding returns a new
//! child context whose bindings shadow the receiver's; the receiver itself is
//! untouched, so a loop body's bindings vanish when the loop ends.
//!
//! Lookups walk the local bindings first, then each parent in order.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::error::Result;
use crate::value::Value;

#[derive(Debug, Default)]
struct Scope {
    bindings: HashMap<String, Value>,
    parents: Vec<Context>,
}

/// Immutable, chainable variable environment
#[derive(Debug, Clone, Default)]
pub struct Context {
    scope: Arc<Scope>,
}

impl Context {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context holding the given bindings
    pub fn from_bindings<K, V, I>(bindings: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::with_scope(collect_bindings(bindings), Vec::new())
    }

    /// Create a context from a JSON object; each key becomes a binding
    ///
    /// Non-object JSON yields an empty context.
    pub fn from_json(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(map) => Self::from_bindings(map),
            _ => Self::new(),
        }
    }

    /// Create a context from any serializable struct or map
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Self::from_json(serde_json::to_value(value)?))
    }

    /// Create a context with no bindings of its own over several parents
    ///
    /// Parents are searched in the order given.
    pub fn layered(parents: impl IntoIterator<Item = Context>) -> Self {
        Self::with_scope(HashMap::new(), parents.into_iter().collect())
    }

    /// Layer one binding over this context
    pub fn with_binding(&self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut bindings = HashMap::with_capacity(1);
        bindings.insert(name.into(), value.into());
        Self::with_scope(bindings, vec![self.clone()])
    }

    /// Layer several bindings over this context in a single scope
    pub fn with_bindings<K, V, I>(&self, bindings: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::with_scope(collect_bindings(bindings), vec![self.clone()])
    }

    /// Make additional contexts visible after this one's own lookups
    pub fn with_parents(&self, parents: impl IntoIterator<Item = Context>) -> Self {
        let mut all = vec![self.clone()];
        all.extend(parents);
        Self::layered(all)
    }

    /// Resolve a dotted path such as `user.address.city`
    ///
    /// The first segment is a binding name; later segments are record
    /// fields. Returns `None` when any segment cannot be resolved, including
    /// descending through a null or non-record value.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let root = self.resolve(segments.next()?)?;
        segments.try_fold(root, |value, segment| value.field(segment))
    }

    /// Whether a path resolves, even if it resolves to null
    pub fn is_accessible(&self, path: &str) -> bool {
        self.lookup(path).is_some()
    }

    /// Whether a name is bound here or in any ancestor
    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    fn resolve(&self, name: &str) -> Option<&Value> {
        if let Some(value) = self.scope.bindings.get(name) {
            return Some(value);
        }
        self.scope
            .parents
            .iter()
            .find_map(|parent| parent.resolve(name))
    }

    fn with_scope(bindings: HashMap<String, Value>, parents: Vec<Context>) -> Self {
        Self {
            scope: Arc::new(Scope { bindings, parents }),
        }
    }
}

fn collect_bindings<K, V, I>(bindings: I) -> HashMap<String, Value>
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    bindings
        .into_iter()
        .map(|(name, value)| (name.into(), value.into()))
        .collect()
}
