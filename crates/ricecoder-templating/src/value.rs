//! Values bound in a rendering context
//!
//! Structured items are modelled as [`Record`]s holding only the fields a
//! type chooses to expose. Rust types expose fields either through
//! [`FieldAccessor`] or through `serde::Serialize` (see
//! [`Value::from_serialize`]); anything not exposed is simply not found
//! during lookup.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::Number;

use crate::error::Result;

/// A value that can be bound to a name in a [`crate::Context`]
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Known but empty
    #[default]
    Null,
    /// Boolean, rendered as `true` / `false`
    Bool(bool),
    /// Integer or float, rendered in base 10
    Number(Number),
    /// Text, rendered verbatim
    String(String),
    /// Ordered collection, iterable by loops
    List(Vec<Value>),
    /// Structured item with named fields
    Record(Record),
}

impl Value {
    /// Convert any serializable value
    ///
    /// Struct fields become record fields; fields skipped by serde are not
    /// visible to templates.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(serde_json::to_value(value)?.into())
    }

    /// Convert an item exposing its fields through [`FieldAccessor`]
    pub fn from_fields<T: FieldAccessor + ?Sized>(item: &T) -> Self {
        Value::Record(item.fields())
    }

    /// Whether this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow as a string slice if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the items if this is a list
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Borrow the fields if this is a record
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Look up a field of a record; other values have no fields
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.as_record().and_then(|record| record.get(name))
    }

    /// Canonical string form used when the value is substituted into output
    ///
    /// Null renders empty. Lists and records render as compact JSON.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Convert into a JSON value
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::from(self)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::List(_) | Value::Record(_) => write!(f, "{}", self.to_json()),
        }
    }
}

/// Named fields of a structured item
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, builder style
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Add or replace a field
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Look up a field by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Iterate over all fields in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Iterate over the fields holding lists
    pub fn list_fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.iter()
            .filter(|(_, value)| matches!(value, Value::List(_)))
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

/// Explicit field access for item types
///
/// Implement this for types whose fields templates may read, returning only
/// the fields that should be visible.
///
/// ```
/// use ricecoder_templating::{FieldAccessor, Record};
///
/// struct User { name: String, password: String }
///
/// impl FieldAccessor for User {
///     fn fields(&self) -> Record {
///         Record::new().with_field("name", self.name.as_str())
///     }
/// }
/// ```
pub trait FieldAccessor {
    /// The fields visible to templates
    fn fields(&self) -> Record;
}

impl FieldAccessor for Record {
    fn fields(&self) -> Record {
        self.clone()
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::String(value.clone())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Number(Number::from(value))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl From<f64> for Value {
    /// Non-finite floats have no JSON number form and become null
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(Value::Null, Value::Number)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::from(f64::from(value))
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::Record(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> FromIterator<T> for Value {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Value::List(iter.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Record(map.into_iter().collect()),
        }
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
            Value::Record(record) => serde_json::Value::Object(
                record
                    .iter()
                    .map(|(name, value)| (name.to_string(), serde_json::Value::from(value)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_forms() {
        assert_eq!(Value::from("hi").render(), "hi");
        assert_eq!(Value::from(42).render(), "42");
        assert_eq!(Value::from(-7i64).render(), "-7");
        assert_eq!(Value::from(true).render(), "true");
        assert_eq!(Value::from(false).render(), "false");
        assert_eq!(Value::from(1.5).render(), "1.5");
        assert_eq!(Value::Null.render(), "");
    }

    #[test]
    fn test_non_finite_float_is_null() {
        assert!(Value::from(f64::NAN).is_null());
    }

    #[test]
    fn test_option_conversion() {
        assert!(Value::from(None::<String>).is_null());
        assert_eq!(Value::from(Some("x")), Value::String("x".to_string()));
    }

    #[test]
    fn test_list_renders_as_json() {
        let value = Value::from(vec!["a", "b"]);
        assert_eq!(value.render(), r#"["a","b"]"#);
    }

    #[test]
    fn test_from_json_object_builds_record() {
        let value = Value::from(json!({"name": "Anna", "tags": ["x"], "age": 30}));
        let record = value.as_record().unwrap();
        assert_eq!(record.get("name"), Some(&Value::from("Anna")));
        assert_eq!(record.get("age"), Some(&Value::from(30)));
        assert_eq!(record.list_fields().count(), 1);
    }

    #[derive(Serialize)]
    struct Account {
        name: String,
        #[serde(skip)]
        #[allow(dead_code)]
        secret: String,
    }

    #[test]
    fn test_from_serialize_hides_skipped_fields() {
        let account = Account {
            name: "ops".to_string(),
            secret: "hunter2".to_string(),
        };
        let value = Value::from_serialize(&account).unwrap();
        assert_eq!(value.field("name"), Some(&Value::from("ops")));
        assert_eq!(value.field("secret"), None);
    }

    struct Badge {
        label: String,
    }

    impl FieldAccessor for Badge {
        fn fields(&self) -> Record {
            Record::new().with_field("label", self.label.as_str())
        }
    }

    #[test]
    fn test_from_fields() {
        let badge = Badge {
            label: "gold".to_string(),
        };
        let value = Value::from_fields(&badge);
        assert_eq!(value.field("label").and_then(Value::as_str), Some("gold"));
    }

    #[test]
    fn test_field_on_non_record_is_none() {
        assert_eq!(Value::from("text").field("len"), None);
    }
}
