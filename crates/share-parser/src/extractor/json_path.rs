//! Schema-light access to untyped JSON.
//!
//! Platforms add, drop and rename fields without notice, so resolvers read
//! individual leaves by dotted path (`a.b.0.c`) and treat anything missing
//! as empty instead of deserializing into strict models.

use serde_json::Value;

static NULL: Value = Value::Null;

pub trait JsonPath {
    /// Value at `path`, or `Value::Null` when any segment is missing.
    /// Numeric segments index into arrays.
    fn path(&self, path: &str) -> &Value;

    /// String form of the leaf at `path`; numbers and booleans are
    /// stringified, everything else is empty.
    fn path_str(&self, path: &str) -> String;

    fn path_i64(&self, path: &str) -> i64;

    /// Elements of the array at `path`, empty when absent.
    fn path_array(&self, path: &str) -> &[Value];
}

impl JsonPath for Value {
    fn path(&self, path: &str) -> &Value {
        if path.is_empty() {
            return self;
        }

        let mut current = self;
        for segment in path.split('.') {
            let next = match current {
                Value::Object(map) => map.get(segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            };
            match next {
                Some(value) => current = value,
                None => return &NULL,
            }
        }
        current
    }

    fn path_str(&self, path: &str) -> String {
        match self.path(path) {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => String::new(),
        }
    }

    fn path_i64(&self, path: &str) -> i64 {
        match self.path(path) {
            Value::Number(n) => n.as_i64().unwrap_or_default(),
            Value::String(s) => s.parse().unwrap_or_default(),
            _ => 0,
        }
    }

    fn path_array(&self, path: &str) -> &[Value] {
        self.path(path).as_array().map(Vec::as_slice).unwrap_or_default()
    }
}
