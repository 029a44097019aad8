//! `${VAR}` / `${VAR:default}` substitution in configuration values

use crate::error::{CoreError, CoreResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value as JsonValue;
use std::collections::HashSet;
use std::env;

static VARIABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}:]+)(?::([^}]*))?\}").expect("valid variable regex"));

/// Environment variable resolver with an optional prefix whitelist.
///
/// Resolved values always stay strings: Drive identifiers such as `0123` or `true`
/// are never reinterpreted as numbers or booleans.
#[derive(Debug, Clone)]
pub struct EnvResolver {
    /// Allowed variable prefixes, empty means unrestricted
    allowed_prefixes: Vec<String>,
    max_depth: usize,
}

impl Default for EnvResolver {
    fn default() -> Self {
        Self::unrestricted()
    }
}

impl EnvResolver {
    pub fn new(allowed_prefixes: Vec<String>) -> Self {
        Self {
            allowed_prefixes,
            max_depth: 10,
        }
    }

    pub fn unrestricted() -> Self {
        Self::new(Vec::new())
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Resolve every string inside a JSON document
    pub fn resolve(&self, value: &JsonValue) -> CoreResult<JsonValue> {
        self.resolve_value(value, 0)
    }

    fn resolve_value(&self, value: &JsonValue, depth: usize) -> CoreResult<JsonValue> {
        if depth > self.max_depth {
            return Err(CoreError::EnvVar("maximum nesting depth exceeded".to_string()));
        }
        match value {
            JsonValue::String(s) => self.resolve_str(s).map(JsonValue::String),
            JsonValue::Object(obj) => {
                let mut resolved = serde_json::Map::with_capacity(obj.len());
                for (key, val) in obj {
                    resolved.insert(key.clone(), self.resolve_value(val, depth + 1)?);
                }
                Ok(JsonValue::Object(resolved))
            }
            JsonValue::Array(items) => items
                .iter()
                .map(|item| self.resolve_value(item, depth + 1))
                .collect::<CoreResult<Vec<_>>>()
                .map(JsonValue::Array),
            other => Ok(other.clone()),
        }
    }

    /// Resolve variables in a single string, following values that themselves
    /// contain references
    pub fn resolve_str(&self, input: &str) -> CoreResult<String> {
        let mut result = input.to_string();
        let mut seen = HashSet::new();

        for _ in 0..=self.max_depth {
            if !VARIABLE.is_match(&result) {
                return Ok(result);
            }
            if !seen.insert(result.clone()) {
                return Err(CoreError::EnvVar(format!(
                    "recursive variable reference in '{}'",
                    input
                )));
            }

            let mut expanded = String::with_capacity(result.len());
            let mut last = 0;
            for caps in VARIABLE.captures_iter(&result) {
                let whole = caps.get(0).map(|m| (m.start(), m.end())).unwrap_or((0, 0));
                let name = &caps[1];
                self.check_allowed(name)?;
                let value = match env::var(name) {
                    Ok(value) => value,
                    Err(_) => match caps.get(2) {
                        Some(default) => default.as_str().to_string(),
                        None => {
                            return Err(CoreError::EnvVar(format!(
                                "environment variable '{}' not found and no default provided",
                                name
                            )))
                        }
                    },
                };
                expanded.push_str(&result[last..whole.0]);
                expanded.push_str(&value);
                last = whole.1;
            }
            expanded.push_str(&result[last..]);
            result = expanded;
        }

        Err(CoreError::EnvVar(format!(
            "recursive variable reference in '{}'",
            input
        )))
    }

    fn check_allowed(&self, name: &str) -> CoreResult<()> {
        if self.allowed_prefixes.is_empty()
            || self.allowed_prefixes.iter().any(|p| name.starts_with(p))
        {
            return Ok(());
        }
        Err(CoreError::EnvVar(format!(
            "environment variable '{}' is not allowed, permitted prefixes: {:?}",
            name, self.allowed_prefixes
        )))
    }
}
