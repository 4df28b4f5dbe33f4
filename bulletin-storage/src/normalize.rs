//! Shape normalization for parsed dataset files.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A normalized dataset: always an ordered list of opaque items.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub items: Vec<Value>,
}

impl Dataset {
    pub fn new(items: Vec<Value>) -> Self {
        Self { items }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Extract the `items` array from a parsed file.
///
/// Anything that is not an object holding an `items` array becomes an empty
/// dataset. Malformed shapes never fail a request.
pub fn normalize(raw: Value) -> Dataset {
    match raw {
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(items)) => Dataset { items },
            _ => Dataset::empty(),
        },
        _ => Dataset::empty(),
    }
}
