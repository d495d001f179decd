//! Typed access to a module's free-form parameter mapping.
//!
//! Pipeline files describe module parameters as an arbitrary mapping. Modules
//! read them through a [`ParamReader`], which converts values to the expected
//! type and turns every mismatch into a validation error naming the module and
//! the offending key. `null` values are treated as absent.

use crate::error::{CoreResult, validation_error};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;

/// Parameter mapping attached to one module entry of a pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleParams(Map<String, Value>);

impl ModuleParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion, mostly useful in tests and sample generation.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    /// Returns the raw value for `key`, treating `null` as absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Typed view over the parameters; errors are attributed to `module`.
    pub fn reader<'a>(&'a self, module: &'a str) -> ParamReader<'a> {
        ParamReader {
            module,
            params: self,
        }
    }
}

impl From<Map<String, Value>> for ModuleParams {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Typed accessors over a [`ModuleParams`] mapping.
#[derive(Debug, Clone, Copy)]
pub struct ParamReader<'a> {
    module: &'a str,
    params: &'a ModuleParams,
}

impl<'a> ParamReader<'a> {
    pub fn module(&self) -> &'a str {
        self.module
    }

    pub fn contains(&self, key: &str) -> bool {
        self.params.contains(key)
    }

    fn type_error(&self, key: &str, expected: &str, found: &Value) -> crate::error::CoreError {
        validation_error(
            self.module,
            format!("'{key}' must be {expected}, got {found}"),
        )
    }

    fn missing(&self, key: &str) -> crate::error::CoreError {
        validation_error(self.module, format!("missing required parameter '{key}'"))
    }

    pub fn f64(&self, key: &str) -> CoreResult<Option<f64>> {
        let Some(value) = self.params.get(key) else {
            return Ok(None);
        };
        let number = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        match number {
            Some(n) if n.is_finite() => Ok(Some(n)),
            _ => Err(self.type_error(key, "a number", value)),
        }
    }

    pub fn f64_or(&self, key: &str, default: f64) -> CoreResult<f64> {
        Ok(self.f64(key)?.unwrap_or(default))
    }

    /// Like [`f64_or`](Self::f64_or), rejecting values outside `min..=max`.
    pub fn f64_in_range_or(&self, key: &str, default: f64, min: f64, max: f64) -> CoreResult<f64> {
        let value = self.f64_or(key, default)?;
        if value < min || value > max {
            return Err(validation_error(
                self.module,
                format!("'{key}' must be between {min} and {max}, got {value}"),
            ));
        }
        Ok(value)
    }

    pub fn require_f64(&self, key: &str) -> CoreResult<f64> {
        self.f64(key)?.ok_or_else(|| self.missing(key))
    }

    /// Reads a whole number. Floats are accepted when they carry no fraction.
    pub fn i64(&self, key: &str) -> CoreResult<Option<i64>> {
        let Some(value) = self.params.get(key) else {
            return Ok(None);
        };
        if let Some(n) = value.as_i64() {
            return Ok(Some(n));
        }
        match self.f64(key)? {
            Some(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => Ok(Some(n as i64)),
            _ => Err(self.type_error(key, "an integer", value)),
        }
    }

    pub fn i64_or(&self, key: &str, default: i64) -> CoreResult<i64> {
        Ok(self.i64(key)?.unwrap_or(default))
    }

    /// Reads a strictly positive pixel dimension.
    pub fn dimension(&self, key: &str) -> CoreResult<Option<u32>> {
        let Some(n) = self.i64(key)? else {
            return Ok(None);
        };
        if n <= 0 || n > u32::MAX as i64 {
            return Err(validation_error(
                self.module,
                format!("'{key}' must be a positive integer, got {n}"),
            ));
        }
        Ok(Some(n as u32))
    }

    pub fn dimension_or(&self, key: &str, default: u32) -> CoreResult<u32> {
        Ok(self.dimension(key)?.unwrap_or(default))
    }

    pub fn bool(&self, key: &str) -> CoreResult<Option<bool>> {
        let Some(value) = self.params.get(key) else {
            return Ok(None);
        };
        match value {
            Value::Bool(b) => Ok(Some(*b)),
            Value::String(s) => match s.to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(Some(true)),
                "false" | "no" | "0" => Ok(Some(false)),
                _ => Err(self.type_error(key, "a boolean", value)),
            },
            _ => Err(self.type_error(key, "a boolean", value)),
        }
    }

    pub fn bool_or(&self, key: &str, default: bool) -> CoreResult<bool> {
        Ok(self.bool(key)?.unwrap_or(default))
    }

    /// Reads a string. Numbers and booleans are rendered to text.
    pub fn string(&self, key: &str) -> CoreResult<Option<String>> {
        let Some(value) = self.params.get(key) else {
            return Ok(None);
        };
        match value {
            Value::String(s) => Ok(Some(s.clone())),
            Value::Number(n) => Ok(Some(n.to_string())),
            Value::Bool(b) => Ok(Some(b.to_string())),
            _ => Err(self.type_error(key, "a string", value)),
        }
    }

    pub fn string_or(&self, key: &str, default: &str) -> CoreResult<String> {
        Ok(self.string(key)?.unwrap_or_else(|| default.to_string()))
    }

    pub fn require_string(&self, key: &str) -> CoreResult<String> {
        match self.string(key)? {
            Some(s) if !s.trim().is_empty() => Ok(s),
            _ => Err(self.missing(key)),
        }
    }

    pub fn path(&self, key: &str) -> CoreResult<Option<PathBuf>> {
        Ok(self
            .string(key)?
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from))
    }

    pub fn require_path(&self, key: &str) -> CoreResult<PathBuf> {
        self.path(key)?.ok_or_else(|| self.missing(key))
    }

    /// Reads either a single number or a list of numbers.
    pub fn f64_list(&self, key: &str) -> CoreResult<Option<Vec<f64>>> {
        let Some(value) = self.params.get(key) else {
            return Ok(None);
        };
        match value {
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::Number(n) => n.as_f64().ok_or_else(|| self.type_error(key, "a list of numbers", value)),
                    _ => Err(self.type_error(key, "a list of numbers", value)),
                })
                .collect::<CoreResult<Vec<_>>>()
                .map(Some),
            _ => Ok(self.f64(key)?.map(|n| vec![n])),
        }
    }

    /// Reads either a single string or a list of strings.
    pub fn string_list(&self, key: &str) -> CoreResult<Option<Vec<String>>> {
        let Some(value) = self.params.get(key) else {
            return Ok(None);
        };
        match value {
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    _ => Err(self.type_error(key, "a list of strings", value)),
                })
                .collect::<CoreResult<Vec<_>>>()
                .map(Some),
            _ => Ok(self.string(key)?.map(|s| vec![s])),
        }
    }

    /// Reads a nested mapping, used by modules that wrap other modules.
    pub fn params(&self, key: &str) -> CoreResult<ModuleParams> {
        match self.params.get(key) {
            None => Ok(ModuleParams::new()),
            Some(Value::Object(map)) => Ok(ModuleParams::from(map.clone())),
            Some(other) => Err(self.type_error(key, "a mapping", other)),
        }
    }
}
