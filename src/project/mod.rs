//! Workbench domain entities
//!
//! The project owns the global analysis settings and the samples; every
//! entity is a parameter holder and can be traversed, edited and saved
//! through the parameter registry.

pub mod clustering;
pub mod postprocessing;
#[allow(clippy::module_inception)]
pub mod project;
pub mod sample;

pub use clustering::{ClusteringHierarchy, ClusteringParameters};
pub use postprocessing::{AucDataConditions, PostprocessingMethod};
pub use project::{Project, PROJECT_FILE, SCHEMA_VERSION};
pub use sample::{InputType, Sample, SampleParameters};

use crate::parameters::{FieldType, ParameterDescriptor, ParameterValue};

/// Closed set of named choices stored in an enum parameter
pub trait ChoiceParameter: Copy + PartialEq + Sized + 'static {
    const ALL: &'static [Self];

    /// Identifier stored in documents
    fn as_str(&self) -> &'static str;

    /// Human-readable label
    fn label(&self) -> &'static str {
        self.as_str()
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == name)
    }

    fn to_value(&self) -> ParameterValue {
        ParameterValue::Enum(self.as_str().to_string())
    }

    fn from_value(value: &ParameterValue) -> Option<Self> {
        match value {
            ParameterValue::Enum(name) => Self::from_name(name),
            _ => None,
        }
    }

    /// Enum descriptor listing every choice
    fn descriptor(key: &str) -> ParameterDescriptor {
        ParameterDescriptor::new(key, FieldType::Enum)
            .with_choices(Self::ALL.iter().map(|c| c.as_str()))
    }
}
