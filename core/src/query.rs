//! Form body encoder for analysis requests.
//!
//! # Design
//! The service reads a repeated key as a list of values and expects booleans
//! as the literal tokens `true`/`false`. Generic query-string serializers
//! either index repeated keys or render booleans their own way, so requests
//! are assembled here as an append-only list of pairs.

use url::form_urlencoded;

/// A single option value that may be added under a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    /// Unset. Contributes no pairs.
    Absent,
    Bool(bool),
    Text(String),
    Number(i64),
    /// Flattened depth-first, every leaf repeated under the same key.
    List(Vec<QueryValue>),
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Bool(value)
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Text(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Text(value)
    }
}

impl From<&String> for QueryValue {
    fn from(value: &String) -> Self {
        QueryValue::Text(value.clone())
    }
}

macro_rules! number_into_query_value {
    ($($t:ty),*) => {
        $(
            impl From<$t> for QueryValue {
                fn from(value: $t) -> Self {
                    QueryValue::Number(i64::from(value))
                }
            }
        )*
    };
}

number_into_query_value!(i8, i16, i32, i64, u8, u16, u32);

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(QueryValue::Absent, Into::into)
    }
}

impl<T: Into<QueryValue>> From<Vec<T>> for QueryValue {
    fn from(values: Vec<T>) -> Self {
        QueryValue::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Clone + Into<QueryValue>> From<&[T]> for QueryValue {
    fn from(values: &[T]) -> Self {
        QueryValue::List(values.iter().cloned().map(Into::into).collect())
    }
}

/// Ordered, append-only collection of `key=value` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryBuilder {
    pairs: Vec<(String, String)>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` under `key`. Absent values and empty lists add nothing.
    pub fn add(&mut self, key: &str, value: impl Into<QueryValue>) -> &mut Self {
        self.push_value(key, value.into());
        self
    }

    fn push_value(&mut self, key: &str, value: QueryValue) {
        match value {
            QueryValue::Absent => {}
            QueryValue::List(items) => {
                for item in items {
                    self.push_value(key, item);
                }
            }
            QueryValue::Bool(flag) => {
                let token = if flag { "true" } else { "false" };
                self.pairs.push((key.to_string(), token.to_string()));
            }
            QueryValue::Text(text) => self.pairs.push((key.to_string(), text)),
            QueryValue::Number(n) => self.pairs.push((key.to_string(), n.to_string())),
        }
    }

    /// Raw pairs in insertion order, before encoding.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Encode every pair and join them with `&`.
    pub fn build(&self) -> String {
        self.pairs
            .iter()
            .map(|(key, value)| format!("{}={}", encode(key), encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

fn encode(component: &str) -> String {
    form_urlencoded::byte_serialize(component.as_bytes()).collect()
}
