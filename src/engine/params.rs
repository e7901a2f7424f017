//! Effective rule parameters.

use serde_json::{Map, Value};

/// Parameters for one rule invocation: declared defaults overlaid with
/// supplied values.
///
/// Typed getters take a fallback. A value of the wrong type is logged and
/// the fallback is used, so a bad parameter never aborts a rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    values: Map<String, Value>,
}

impl Params {
    /// Wrap a parameter map.
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Merge supplied values over defaults; supplied values win.
    pub fn merged(defaults: &Map<String, Value>, supplied: &Map<String, Value>) -> Self {
        let mut values = defaults.clone();
        for (key, value) in supplied {
            values.insert(key.clone(), value.clone());
        }
        Self { values }
    }

    /// Builder: set one value.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Raw value lookup.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// The underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Number parameter.
    pub fn f64(&self, key: &str, fallback: f64) -> f64 {
        self.typed(key, fallback, "a number", Value::as_f64)
    }

    /// Integer parameter. Whole floats are accepted.
    pub fn i64(&self, key: &str, fallback: i64) -> i64 {
        self.typed(key, fallback, "an integer", |v| {
            v.as_i64().or_else(|| {
                v.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            })
        })
    }

    /// Boolean parameter.
    pub fn bool(&self, key: &str, fallback: bool) -> bool {
        self.typed(key, fallback, "a boolean", Value::as_bool)
    }

    /// String parameter.
    pub fn str(&self, key: &str, fallback: &str) -> String {
        self.typed(key, fallback.to_string(), "a string", |v| {
            v.as_str().map(str::to_string)
        })
    }

    /// Object parameter of string values (e.g. a font map).
    ///
    /// Non-string entries are skipped with a warning.
    pub fn string_map(&self, key: &str) -> Option<Vec<(String, String)>> {
        let obj = match self.values.get(key)? {
            Value::Object(obj) => obj,
            other => {
                log::warn!("Parameter '{}' should be an object, got {}", key, other);
                return None;
            }
        };
        let mut pairs = Vec::with_capacity(obj.len());
        for (k, v) in obj {
            match v.as_str() {
                Some(s) => pairs.push((k.clone(), s.to_string())),
                None => log::warn!("Ignoring non-string entry '{}' in parameter '{}'", k, key),
            }
        }
        Some(pairs)
    }

    fn typed<T>(&self, key: &str, fallback: T, expected: &str, get: impl Fn(&Value) -> Option<T>) -> T {
        match self.values.get(key) {
            None | Some(Value::Null) => fallback,
            Some(value) => get(value).unwrap_or_else(|| {
                log::warn!(
                    "Parameter '{}' should be {}, got {}; using default",
                    key,
                    expected,
                    value
                );
                fallback
            }),
        }
    }
}

impl From<Map<String, Value>> for Params {
    fn from(values: Map<String, Value>) -> Self {
        Self::new(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(m) => m,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_supplied_values_win() {
        let defaults = map(json!({"font_size_body": 12, "western_font": "Arial"}));
        let supplied = map(json!({"font_size_body": 14}));
        let params = Params::merged(&defaults, &supplied);
        assert_eq!(params.f64("font_size_body", 0.0), 14.0);
        assert_eq!(params.str("western_font", ""), "Arial");
        assert_eq!(params.str("missing", "fallback"), "fallback");
    }

    #[test]
    fn test_wrong_type_uses_fallback() {
        let params = Params::default()
            .with("size", "large")
            .with("rows", 2.0)
            .with("flag", 1);
        assert_eq!(params.f64("size", 12.0), 12.0);
        assert_eq!(params.i64("rows", 1), 2);
        assert!(params.bool("flag", true));
    }

    #[test]
    fn test_string_map() {
        let params = Params::default().with("font_map", json!({"Calibri": "Arial", "bad": 3}));
        assert_eq!(
            params.string_map("font_map").unwrap(),
            vec![("Calibri".to_string(), "Arial".to_string())]
        );
        assert!(params.string_map("absent").is_none());
    }
}
