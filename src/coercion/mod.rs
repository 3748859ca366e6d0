// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Best-effort conversion of port values to their declared types.
//!
//! The registry maps a [`DataType`] to a [`CoercionRule`]. Coercion never
//! fails: when no rule is registered for the target type, or the rule has
//! nothing to offer for a particular value, the original value is returned
//! unchanged.
//!
//! Four rules are seeded at construction (`string`, `integer`, `float`,
//! `boolean`); callers add or replace rules with [`CoercionRegistry::register`].
//!
//! ```
//! use pipeweave::coercion::{CoercionRegistry, DataType};
//! use serde_json::json;
//!
//! let registry = CoercionRegistry::new();
//! assert_eq!(registry.coerce(&json!(42), &DataType::string()), json!("42"));
//! assert_eq!(registry.coerce(&json!("7"), &DataType::integer()), json!(7));
//!
//! // Unknown types pass values through untouched.
//! assert_eq!(registry.coerce(&json!([1, 2]), &DataType::new("geometry")), json!([1, 2]));
//! ```

mod rules;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::observability::messages::{process::CoercionFallback, StructuredLog};
use crate::traits::CoercionRule;

pub const STRING: &str = "string";
pub const INTEGER: &str = "integer";
pub const FLOAT: &str = "float";
pub const BOOLEAN: &str = "boolean";
pub const ANY: &str = "any";

/// Declared type of a port, identified by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataType(String);

impl DataType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn string() -> Self {
        Self::new(STRING)
    }

    pub fn integer() -> Self {
        Self::new(INTEGER)
    }

    pub fn float() -> Self {
        Self::new(FLOAT)
    }

    pub fn boolean() -> Self {
        Self::new(BOOLEAN)
    }

    /// No rule is seeded for `any`, so values pass through as-is.
    pub fn any() -> Self {
        Self::new(ANY)
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DataType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for DataType {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Short name of a JSON value's kind, used in log messages and errors.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Registry of coercion rules keyed by exact declared type.
///
/// Shared between processes as `Arc<CoercionRegistry>`; registration takes a
/// write lock, coercion a read lock.
pub struct CoercionRegistry {
    rules: RwLock<HashMap<DataType, Arc<dyn CoercionRule>>>,
}

impl CoercionRegistry {
    /// Create a registry seeded with the default rules.
    pub fn new() -> Self {
        let registry = Self::empty();
        registry.register(DataType::string(), rules::to_string);
        registry.register(DataType::integer(), rules::to_integer);
        registry.register(DataType::float(), rules::to_float);
        registry.register(DataType::boolean(), rules::to_boolean);
        registry
    }

    /// Create a registry with no rules at all.
    pub fn empty() -> Self {
        Self {
            rules: RwLock::new(HashMap::new()),
        }
    }

    /// Install or replace the rule for `data_type`.
    pub fn register<R>(&self, data_type: DataType, rule: R)
    where
        R: CoercionRule + 'static,
    {
        let mut rules = self.rules.write().unwrap_or_else(|e| e.into_inner());
        rules.insert(data_type, Arc::new(rule));
    }

    pub fn has_rule(&self, data_type: &DataType) -> bool {
        let rules = self.rules.read().unwrap_or_else(|e| e.into_inner());
        rules.contains_key(data_type)
    }

    /// Convert `value` towards `data_type`, falling back to the original.
    pub fn coerce(&self, value: &Value, data_type: &DataType) -> Value {
        // Clone the rule out so user code never runs under our lock.
        let rule = {
            let rules = self.rules.read().unwrap_or_else(|e| e.into_inner());
            rules.get(data_type).cloned()
        };

        let Some(rule) = rule else {
            return value.clone();
        };

        match rule.convert(value) {
            Some(converted) if !converted.is_null() => converted,
            _ => {
                CoercionFallback {
                    data_type: data_type.name(),
                    value_kind: value_kind(value),
                }
                .log();
                value.clone()
            }
        }
    }
}

impl Default for CoercionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CoercionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rules = self.rules.read().unwrap_or_else(|e| e.into_inner());
        let mut types: Vec<&str> = rules.keys().map(DataType::name).collect();
        types.sort_unstable();
        f.debug_struct("CoercionRegistry")
            .field("types", &types)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_rules_seeded() {
        let registry = CoercionRegistry::new();
        for data_type in [
            DataType::string(),
            DataType::integer(),
            DataType::float(),
            DataType::boolean(),
        ] {
            assert!(registry.has_rule(&data_type), "missing rule for {}", data_type);
        }
        assert!(!registry.has_rule(&DataType::any()));
    }

    #[test]
    fn test_coerce_table_driven() {
        struct TestCase {
            name: &'static str,
            value: Value,
            data_type: DataType,
            expected: Value,
        }

        let test_cases = vec![
            TestCase {
                name: "number to string",
                value: json!(42),
                data_type: DataType::string(),
                expected: json!("42"),
            },
            TestCase {
                name: "bool to string",
                value: json!(true),
                data_type: DataType::string(),
                expected: json!("true"),
            },
            TestCase {
                name: "object to string",
                value: json!({"a": 1}),
                data_type: DataType::string(),
                expected: json!("{\"a\":1}"),
            },
            TestCase {
                name: "numeric string to integer",
                value: json!(" 12 "),
                data_type: DataType::integer(),
                expected: json!(12),
            },
            TestCase {
                name: "float truncated to integer",
                value: json!(3.9),
                data_type: DataType::integer(),
                expected: json!(3),
            },
            TestCase {
                name: "integer widened to float",
                value: json!(2),
                data_type: DataType::float(),
                expected: json!(2.0),
            },
            TestCase {
                name: "yes to boolean",
                value: json!("YES"),
                data_type: DataType::boolean(),
                expected: json!(true),
            },
            TestCase {
                name: "zero to boolean",
                value: json!(0),
                data_type: DataType::boolean(),
                expected: json!(false),
            },
            TestCase {
                name: "unparseable integer falls back",
                value: json!("abc"),
                data_type: DataType::integer(),
                expected: json!("abc"),
            },
            TestCase {
                name: "null string falls back",
                value: Value::Null,
                data_type: DataType::string(),
                expected: Value::Null,
            },
            TestCase {
                name: "unknown type passes through",
                value: json!([1, 2, 3]),
                data_type: DataType::new("table"),
                expected: json!([1, 2, 3]),
            },
        ];

        let registry = CoercionRegistry::new();
        for test_case in test_cases {
            assert_eq!(
                registry.coerce(&test_case.value, &test_case.data_type),
                test_case.expected,
                "Test case '{}'",
                test_case.name
            );
        }
    }

    #[test]
    fn test_coercion_is_idempotent() {
        let registry = CoercionRegistry::new();
        let values = [
            json!(1),
            json!(-7.25),
            json!("42"),
            json!("4.5"),
            json!("no"),
            json!(true),
            json!({"k": [1, 2]}),
            json!("text"),
            Value::Null,
        ];
        let types = [
            DataType::string(),
            DataType::integer(),
            DataType::float(),
            DataType::boolean(),
            DataType::any(),
        ];

        for value in &values {
            for data_type in &types {
                let once = registry.coerce(value, data_type);
                let twice = registry.coerce(&once, data_type);
                assert_eq!(once, twice, "{} -> {}", value, data_type);
            }
        }
    }

    #[test]
    fn test_register_new_type() {
        let registry = CoercionRegistry::new();
        let upper = DataType::new("upper");
        registry.register(upper.clone(), |v: &Value| {
            v.as_str().map(|s| Value::String(s.to_uppercase()))
        });

        assert_eq!(registry.coerce(&json!("abc"), &upper), json!("ABC"));
        // Rule declines non-strings, original kept.
        assert_eq!(registry.coerce(&json!(5), &upper), json!(5));
    }

    #[test]
    fn test_register_replaces_existing_rule() {
        let registry = CoercionRegistry::new();
        registry.register(DataType::string(), |_: &Value| Some(json!("fixed")));

        assert_eq!(registry.coerce(&json!(1), &DataType::string()), json!("fixed"));
    }

    #[test]
    fn test_empty_registry_is_identity() {
        let registry = CoercionRegistry::empty();
        assert_eq!(registry.coerce(&json!(1), &DataType::string()), json!(1));
    }
}
