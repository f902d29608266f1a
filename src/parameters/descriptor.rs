//! Parameter descriptors
//!
//! A descriptor is the immutable schema of one parameter: its key, its
//! semantic type and its documentation.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::value::ParameterValue;
use crate::error::{McatError, Result};

/// Semantic type tag of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    Bool,
    Int,
    Double,
    String,
    Enum,
    Path,
    Custom,
}

impl FieldType {
    /// All field types, in declaration order
    pub const ALL: [FieldType; 7] = [
        FieldType::Bool,
        FieldType::Int,
        FieldType::Double,
        FieldType::String,
        FieldType::Enum,
        FieldType::Path,
        FieldType::Custom,
    ];

    /// Stable lowercase identifier, identical to the serialized tag
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Bool => "bool",
            FieldType::Int => "int",
            FieldType::Double => "double",
            FieldType::String => "string",
            FieldType::Enum => "enum",
            FieldType::Path => "path",
            FieldType::Custom => "custom",
        }
    }

    /// Parse a type tag as written by [`FieldType::as_str`]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }

    /// The value an unset parameter of this type reads as
    pub fn zero_value(&self) -> ParameterValue {
        match self {
            FieldType::Bool => ParameterValue::Bool(false),
            FieldType::Int => ParameterValue::Int(0),
            FieldType::Double => ParameterValue::Double(0.0),
            FieldType::String => ParameterValue::String(String::new()),
            FieldType::Enum => ParameterValue::Enum(String::new()),
            FieldType::Path => ParameterValue::Path(Default::default()),
            FieldType::Custom => ParameterValue::Custom(serde_json::Value::Null),
        }
    }

    /// Convert `value` to this type if the types are compatible.
    ///
    /// Integers widen to doubles; every other combination must match exactly.
    /// On mismatch the type of the offending value is returned.
    pub fn coerce(&self, value: ParameterValue) -> std::result::Result<ParameterValue, FieldType> {
        match (self, value) {
            (FieldType::Double, ParameterValue::Int(i)) => Ok(ParameterValue::Double(i as f64)),
            (expected, value) if value.field_type() == *expected => Ok(value),
            (_, value) => Err(value.field_type()),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who gets to see a parameter.
///
/// Lower visibilities override higher ones while traversing nested holders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Visibility {
    /// Visible wherever its holder appears in a traversal
    #[default]
    TransitiveVisible,
    /// Visible only when its holder is the traversal root
    Visible,
    /// Never shown to users, only serialized
    Hidden,
}

impl Visibility {
    /// Effective visibility of a parameter found `depth` levels below the root
    pub fn is_visible_at(&self, depth: usize) -> bool {
        match self {
            Visibility::TransitiveVisible => true,
            Visibility::Visible => depth == 0,
            Visibility::Hidden => false,
        }
    }
}

/// Schema of one parameter exposed by a holder
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDescriptor {
    /// Unique key within the holder
    pub key: String,
    /// Human-readable name
    pub name: String,
    /// Longer documentation
    pub description: String,
    /// Semantic type of the value
    pub field_type: FieldType,
    /// Whether users see this parameter
    pub visibility: Visibility,
    /// Short key for compact parameter strings; empty falls back to `key`
    pub short_key: String,
    /// Serialization ordering hint; higher priorities are applied first on read
    pub priority: f64,
    /// Accepted values of an enum parameter; empty accepts any
    pub choices: Vec<String>,
}

impl ParameterDescriptor {
    /// Create a descriptor whose display name is its key
    pub fn new(key: impl Into<String>, field_type: FieldType) -> Self {
        let key = key.into();
        Self {
            name: key.clone(),
            key,
            description: String::new(),
            field_type,
            visibility: Visibility::default(),
            short_key: String::new(),
            priority: 0.0,
            choices: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_short_key(mut self, short_key: impl Into<String>) -> Self {
        self.short_key = short_key.into();
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_priority(mut self, priority: f64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    /// Key used in compact parameter strings
    pub fn short_key_or_key(&self) -> &str {
        if self.short_key.is_empty() {
            &self.key
        } else {
            &self.short_key
        }
    }

    /// Type-check `value` against this descriptor.
    ///
    /// No range checks happen here; ranges are a holder or editor concern.
    pub fn accept(&self, value: ParameterValue) -> Result<ParameterValue> {
        let value = self
            .field_type
            .coerce(value)
            .map_err(|found| McatError::TypeMismatch {
                key: self.key.clone(),
                expected: self.field_type,
                found,
            })?;

        if let ParameterValue::Double(number) = &value {
            if !number.is_finite() {
                return Err(McatError::InvalidValue {
                    field_type: FieldType::Double,
                    input: number.to_string(),
                });
            }
        }

        if let ParameterValue::Enum(choice) = &value {
            if !self.choices.is_empty() && !self.choices.iter().any(|c| c == choice) {
                return Err(McatError::InvalidValue {
                    field_type: FieldType::Enum,
                    input: choice.clone(),
                });
            }
        }

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_values_match_type() {
        for field_type in FieldType::ALL {
            assert_eq!(field_type.zero_value().field_type(), field_type);
        }
    }

    #[test]
    fn test_tags_round_trip() {
        for field_type in FieldType::ALL {
            assert_eq!(FieldType::from_tag(field_type.as_str()), Some(field_type));
        }
        assert_eq!(FieldType::from_tag("image"), None);
    }

    #[test]
    fn test_int_widens_to_double() {
        assert_eq!(
            FieldType::Double.coerce(ParameterValue::Int(3)),
            Ok(ParameterValue::Double(3.0))
        );
        assert_eq!(
            FieldType::Int.coerce(ParameterValue::Double(3.0)),
            Err(FieldType::Double)
        );
    }

    #[test]
    fn test_enum_choices() {
        let descriptor = ParameterDescriptor::new("mode", FieldType::Enum).with_choices(["A", "B"]);
        assert!(descriptor.accept(ParameterValue::Enum("A".into())).is_ok());
        assert!(descriptor.accept(ParameterValue::Enum("C".into())).is_err());
        assert!(descriptor.accept(ParameterValue::String("A".into())).is_err());
    }

    #[test]
    fn test_non_finite_doubles_are_refused() {
        let descriptor = ParameterDescriptor::new("ratio", FieldType::Double);
        for number in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = descriptor.accept(ParameterValue::Double(number)).unwrap_err();
            assert_eq!(err.error_code(), "INVALID_VALUE");
        }
        assert_eq!(
            descriptor.accept(ParameterValue::Double(1.5)).unwrap(),
            ParameterValue::Double(1.5)
        );
    }

    #[test]
    fn test_visibility_depth() {
        assert!(Visibility::Visible.is_visible_at(0));
        assert!(!Visibility::Visible.is_visible_at(1));
        assert!(Visibility::TransitiveVisible.is_visible_at(3));
        assert!(!Visibility::Hidden.is_visible_at(0));
    }

    #[test]
    fn test_short_key_fallback() {
        let descriptor = ParameterDescriptor::new("kmeans-k", FieldType::Int);
        assert_eq!(descriptor.short_key_or_key(), "kmeans-k");
        assert_eq!(descriptor.with_short_key("k").short_key_or_key(), "k");
    }
}
