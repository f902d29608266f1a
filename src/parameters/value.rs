//! Parameter values

use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::Value;

use super::descriptor::FieldType;
use crate::error::{McatError, Result};

/// A typed parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    /// Name of the selected enum variant
    Enum(String),
    Path(PathBuf),
    /// Free-form structured value
    Custom(Value),
}

impl ParameterValue {
    /// The field type this value belongs to
    pub fn field_type(&self) -> FieldType {
        match self {
            ParameterValue::Bool(_) => FieldType::Bool,
            ParameterValue::Int(_) => FieldType::Int,
            ParameterValue::Double(_) => FieldType::Double,
            ParameterValue::String(_) => FieldType::String,
            ParameterValue::Enum(_) => FieldType::Enum,
            ParameterValue::Path(_) => FieldType::Path,
            ParameterValue::Custom(_) => FieldType::Custom,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParameterValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ParameterValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view; integers are widened
    pub fn as_double(&self) -> Option<f64> {
        match self {
            ParameterValue::Double(d) => Some(*d),
            ParameterValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// String view of string and enum values
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParameterValue::String(s) | ParameterValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            ParameterValue::Path(p) => Some(p),
            _ => None,
        }
    }

    /// JSON representation used in holder documents
    pub fn to_json(&self) -> Value {
        match self {
            ParameterValue::Bool(b) => Value::Bool(*b),
            ParameterValue::Int(i) => Value::from(*i),
            ParameterValue::Double(d) => Value::from(*d),
            ParameterValue::String(s) | ParameterValue::Enum(s) => Value::String(s.clone()),
            ParameterValue::Path(p) => Value::String(p.to_string_lossy().into_owned()),
            ParameterValue::Custom(v) => v.clone(),
        }
    }

    /// Decode a JSON value written by [`ParameterValue::to_json`]
    pub fn from_json(field_type: FieldType, json: &Value) -> Option<Self> {
        match field_type {
            FieldType::Bool => json.as_bool().map(ParameterValue::Bool),
            FieldType::Int => json.as_i64().map(ParameterValue::Int),
            FieldType::Double => json.as_f64().map(ParameterValue::Double),
            FieldType::String => json.as_str().map(|s| ParameterValue::String(s.to_string())),
            FieldType::Enum => json.as_str().map(|s| ParameterValue::Enum(s.to_string())),
            FieldType::Path => json.as_str().map(|s| ParameterValue::Path(PathBuf::from(s))),
            FieldType::Custom => Some(ParameterValue::Custom(json.clone())),
        }
    }

    /// Parse user input (e.g. from the command line) as `field_type`
    pub fn parse(field_type: FieldType, input: &str) -> Result<Self> {
        let invalid = || McatError::InvalidValue {
            field_type,
            input: input.to_string(),
        };
        let trimmed = input.trim();
        match field_type {
            FieldType::Bool => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(ParameterValue::Bool(true)),
                "false" | "no" | "0" => Ok(ParameterValue::Bool(false)),
                _ => Err(invalid()),
            },
            FieldType::Int => trimmed
                .parse()
                .map(ParameterValue::Int)
                .map_err(|_| invalid()),
            FieldType::Double => trimmed
                .parse()
                .map(ParameterValue::Double)
                .map_err(|_| invalid()),
            FieldType::String => Ok(ParameterValue::String(input.to_string())),
            FieldType::Enum => Ok(ParameterValue::Enum(trimmed.to_string())),
            FieldType::Path => Ok(ParameterValue::Path(PathBuf::from(trimmed))),
            FieldType::Custom => serde_json::from_str(input)
                .map(ParameterValue::Custom)
                .map_err(|_| invalid()),
        }
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Bool(b) => write!(f, "{}", b),
            ParameterValue::Int(i) => write!(f, "{}", i),
            ParameterValue::Double(d) => write!(f, "{}", d),
            ParameterValue::String(s) | ParameterValue::Enum(s) => f.write_str(s),
            ParameterValue::Path(p) => write!(f, "{}", p.display()),
            ParameterValue::Custom(v) => write!(f, "{}", v),
        }
    }
}

impl From<bool> for ParameterValue {
    fn from(value: bool) -> Self {
        ParameterValue::Bool(value)
    }
}

impl From<i64> for ParameterValue {
    fn from(value: i64) -> Self {
        ParameterValue::Int(value)
    }
}

impl From<i32> for ParameterValue {
    fn from(value: i32) -> Self {
        ParameterValue::Int(value.into())
    }
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        ParameterValue::Double(value)
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        ParameterValue::String(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        ParameterValue::String(value)
    }
}

impl From<PathBuf> for ParameterValue {
    fn from(value: PathBuf) -> Self {
        ParameterValue::Path(value)
    }
}
