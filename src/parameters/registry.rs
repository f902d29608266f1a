//! Parameter type registry
//!
//! Maps each field type to its documentation, the editor used to present
//! it and the generators available for batch sweeps.

use std::collections::HashMap;

use super::descriptor::{FieldType, ParameterDescriptor};
use super::generators::{NumberSequenceGenerator, ParameterGenerator};
use super::value::ParameterValue;

/// Name and description of a registered item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Documentation {
    pub name: String,
    pub description: String,
}

impl Documentation {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Presents and edits one parameter
pub trait ParameterEditor {
    fn descriptor(&self) -> &ParameterDescriptor;

    /// Whether the editor wants a separate name label next to it
    fn is_label_enabled(&self) -> bool {
        true
    }

    /// Refresh from the parameter's current value
    fn reload(&mut self, value: &ParameterValue);

    /// Current presentation
    fn render(&self) -> String;
}

pub type EditorFactory = fn(&ParameterDescriptor) -> Box<dyn ParameterEditor>;
pub type GeneratorFactory = fn() -> Box<dyn ParameterGenerator>;

struct GeneratorEntry {
    documentation: Documentation,
    factory: GeneratorFactory,
}

/// Registry of field type documentation, editors and generators
pub struct ParameterTypeRegistry {
    documentation: HashMap<FieldType, Documentation>,
    editors: HashMap<FieldType, EditorFactory>,
    generators: HashMap<FieldType, Vec<GeneratorEntry>>,
}

impl ParameterTypeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            documentation: HashMap::new(),
            editors: HashMap::new(),
            generators: HashMap::new(),
        }
    }

    /// Registry with the standard text editors and number generators
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register_documentation(FieldType::Bool, Documentation::new("Boolean", "A yes/no value"));
        registry.register_documentation(FieldType::Int, Documentation::new("Integer", "A whole number"));
        registry.register_documentation(
            FieldType::Double,
            Documentation::new("Number", "A floating point number"),
        );
        registry.register_documentation(FieldType::String, Documentation::new("Text", "A line of text"));
        registry.register_documentation(
            FieldType::Enum,
            Documentation::new("Selection", "One of a fixed set of choices"),
        );
        registry.register_documentation(FieldType::Path, Documentation::new("Path", "A file or folder"));
        registry.register_documentation(
            FieldType::Custom,
            Documentation::new("Structured value", "A free-form JSON value"),
        );

        for field_type in FieldType::ALL {
            let factory: EditorFactory = match field_type {
                FieldType::Bool => |d: &ParameterDescriptor| -> Box<dyn ParameterEditor> {
                    Box::new(CheckboxEditor::new(d.clone()))
                },
                _ => |d: &ParameterDescriptor| -> Box<dyn ParameterEditor> {
                    Box::new(TextEditor::new(d.clone()))
                },
            };
            registry.register_editor(field_type, factory);
        }

        registry.register_generator(
            FieldType::Int,
            Documentation::new("Number sequence", "Integers from a start to an end value"),
            || -> Box<dyn ParameterGenerator> { Box::new(NumberSequenceGenerator::<i64>::default()) },
        );
        registry.register_generator(
            FieldType::Double,
            Documentation::new("Number sequence", "Numbers from a start to an end value"),
            || -> Box<dyn ParameterGenerator> { Box::new(NumberSequenceGenerator::<f64>::default()) },
        );

        registry
    }

    pub fn register_documentation(&mut self, field_type: FieldType, documentation: Documentation) {
        self.documentation.insert(field_type, documentation);
    }

    pub fn documentation_for(&self, field_type: FieldType) -> Option<&Documentation> {
        self.documentation.get(&field_type)
    }

    /// Register (or replace) the editor of a field type
    pub fn register_editor(&mut self, field_type: FieldType, factory: EditorFactory) {
        self.editors.insert(field_type, factory);
    }

    pub fn has_editor_for(&self, field_type: FieldType) -> bool {
        self.editors.contains_key(&field_type)
    }

    /// New editor for `descriptor`, if its field type has one
    pub fn create_editor_for(&self, descriptor: &ParameterDescriptor) -> Option<Box<dyn ParameterEditor>> {
        self.editors
            .get(&descriptor.field_type)
            .map(|factory| factory(descriptor))
    }

    pub fn register_generator(
        &mut self,
        field_type: FieldType,
        documentation: Documentation,
        factory: GeneratorFactory,
    ) {
        self.generators
            .entry(field_type)
            .or_default()
            .push(GeneratorEntry {
                documentation,
                factory,
            });
    }

    /// Documentation of the generators for `field_type`, in registration order
    pub fn generators_for(&self, field_type: FieldType) -> Vec<&Documentation> {
        self.generators
            .get(&field_type)
            .map(|entries| entries.iter().map(|e| &e.documentation).collect())
            .unwrap_or_default()
    }

    /// Instantiate the generator registered under `name` for `field_type`
    pub fn create_generator(&self, field_type: FieldType, name: &str) -> Option<Box<dyn ParameterGenerator>> {
        self.generators
            .get(&field_type)?
            .iter()
            .find(|e| e.documentation.name == name)
            .map(|e| (e.factory)())
    }
}

impl Default for ParameterTypeRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Editor showing the value as text next to a name label
pub struct TextEditor {
    descriptor: ParameterDescriptor,
    text: String,
}

impl TextEditor {
    pub fn new(descriptor: ParameterDescriptor) -> Self {
        let text = descriptor.field_type.zero_value().to_string();
        Self { descriptor, text }
    }
}

impl ParameterEditor for TextEditor {
    fn descriptor(&self) -> &ParameterDescriptor {
        &self.descriptor
    }

    fn reload(&mut self, value: &ParameterValue) {
        self.text = value.to_string();
    }

    fn render(&self) -> String {
        if self.descriptor.choices.is_empty() {
            self.text.clone()
        } else {
            format!("{} [{}]", self.text, self.descriptor.choices.join("|"))
        }
    }
}

/// Checkbox carrying its own label
pub struct CheckboxEditor {
    descriptor: ParameterDescriptor,
    checked: bool,
}

impl CheckboxEditor {
    pub fn new(descriptor: ParameterDescriptor) -> Self {
        Self {
            descriptor,
            checked: false,
        }
    }
}

impl ParameterEditor for CheckboxEditor {
    fn descriptor(&self) -> &ParameterDescriptor {
        &self.descriptor
    }

    fn is_label_enabled(&self) -> bool {
        false
    }

    fn reload(&mut self, value: &ParameterValue) {
        self.checked = value.as_bool().unwrap_or(false);
    }

    fn render(&self) -> String {
        let mark = if self.checked { "x" } else { " " };
        format!("[{}] {}", mark, self.descriptor.name)
    }
}
