//! Parameter registry
//!
//! Typed, documented parameters exposed by holders, user-extensible dynamic
//! collections, tree traversal, change notification and JSON documents.

pub mod access;
pub mod descriptor;
pub mod dynamic;
pub mod events;
pub mod generators;
pub mod holder;
pub mod registry;
pub mod serialization;
pub mod traversal;
pub mod value;

pub use access::{AccessKind, ParameterAccess, ParameterTable, StaticParameter, StaticParameters};
pub use descriptor::{FieldType, ParameterDescriptor, Visibility};
pub use dynamic::{DynamicParameter, DynamicParameterCollection};
pub use events::{ChangeEvent, ChangeKind, ParameterEvents, SubscriptionId};
pub use generators::{
    NumberSequenceGenerator, ParameterGenerator, SequenceNumber, MAX_GENERATED_VALUES,
};
pub use holder::{resolve_holder_mut, ParameterHolder};
pub use registry::{
    CheckboxEditor, Documentation, EditorFactory, GeneratorFactory, ParameterEditor,
    ParameterTypeRegistry, TextEditor,
};
pub use serialization::{holder_to_string, parameters_to_string, read_holder, write_holder};
pub use traversal::{qualify, ParameterSource, TraversedParameter, TraversedParameters};
pub use value::ParameterValue;
