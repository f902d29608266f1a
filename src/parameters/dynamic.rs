//! Dynamic parameter collections
//!
//! A user-extensible set of typed parameters. Structural edits (add, remove,
//! clear) post `StructureChanged` on the collection's bus unless they happen
//! inside a modification block, which folds them into one event.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use super::access::AccessKind;
use super::descriptor::{FieldType, ParameterDescriptor};
use super::events::{ChangeEvent, ParameterEvents};
use super::holder::ParameterHolder;
use super::value::ParameterValue;
use crate::error::{McatError, Result};

/// One run-time parameter: its descriptor and its current value
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicParameter {
    pub descriptor: ParameterDescriptor,
    value: ParameterValue,
}

impl DynamicParameter {
    /// New parameter holding the zero value of `field_type`
    pub fn new(key: impl Into<String>, field_type: FieldType) -> Self {
        Self::from_descriptor(ParameterDescriptor::new(key, field_type))
    }

    pub fn from_descriptor(descriptor: ParameterDescriptor) -> Self {
        let value = descriptor.field_type.zero_value();
        Self { descriptor, value }
    }

    /// Parameter with an initial value.
    ///
    /// Fails if `value` does not fit the descriptor.
    pub fn with_value(descriptor: ParameterDescriptor, value: ParameterValue) -> Result<Self> {
        let value = descriptor.accept(value)?;
        Ok(Self { descriptor, value })
    }

    pub fn key(&self) -> &str {
        &self.descriptor.key
    }

    pub fn field_type(&self) -> FieldType {
        self.descriptor.field_type
    }

    pub fn value(&self) -> &ParameterValue {
        &self.value
    }
}

/// Holds a user-definable set of parameters
#[derive(Debug)]
pub struct DynamicParameterCollection {
    name: String,
    description: String,
    parameters: BTreeMap<String, DynamicParameter>,
    allowed_types: BTreeSet<FieldType>,
    allow_user_modification: bool,
    delay_events: bool,
    events: ParameterEvents,
}

impl DynamicParameterCollection {
    /// Creates a collection accepting `allowed_types`, modifiable by users
    pub fn new(allowed_types: impl IntoIterator<Item = FieldType>) -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            parameters: BTreeMap::new(),
            allowed_types: allowed_types.into_iter().collect(),
            allow_user_modification: true,
            delay_events: false,
            events: ParameterEvents::new(),
        }
    }

    /// Creates a collection accepting every field type
    pub fn unrestricted() -> Self {
        Self::new(FieldType::ALL)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_user_modification(mut self, allow: bool) -> Self {
        self.allow_user_modification = allow;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn allowed_types(&self) -> &BTreeSet<FieldType> {
        &self.allowed_types
    }

    pub fn set_allowed_types(&mut self, allowed_types: impl IntoIterator<Item = FieldType>) {
        self.allowed_types = allowed_types.into_iter().collect();
    }

    pub fn is_type_allowed(&self, field_type: FieldType) -> bool {
        self.allowed_types.contains(&field_type)
    }

    pub fn allow_user_modification(&self) -> bool {
        self.allow_user_modification
    }

    pub fn set_allow_user_modification(&mut self, allow: bool) {
        self.allow_user_modification = allow;
    }

    /// Whether a modification block is open
    pub fn is_in_modification_block(&self) -> bool {
        self.delay_events
    }

    /// Adds a new zero-valued parameter
    pub fn add_parameter(
        &mut self,
        key: impl Into<String>,
        field_type: FieldType,
    ) -> Result<&DynamicParameter> {
        self.add_entry(DynamicParameter::new(key, field_type))
    }

    /// Adds a fully described parameter
    pub fn add_entry(&mut self, parameter: DynamicParameter) -> Result<&DynamicParameter> {
        let key = parameter.key().to_string();
        if self.parameters.contains_key(&key) {
            return Err(McatError::DuplicateKey { key });
        }
        if !self.is_type_allowed(parameter.field_type()) {
            return Err(McatError::TypeNotAllowed {
                key,
                field_type: parameter.field_type(),
            });
        }

        debug!("Adding parameter '{}' ({})", key, parameter.field_type());
        self.parameters.insert(key.clone(), parameter);
        self.structure_changed();
        self.parameters
            .get(&key)
            .ok_or(McatError::UnknownParameter { key })
    }

    /// Removes a parameter; absent keys are ignored
    pub fn remove_parameter(&mut self, key: &str) -> Option<DynamicParameter> {
        let removed = self.parameters.remove(key)?;
        self.structure_changed();
        Some(removed)
    }

    /// Removes all parameters
    pub fn clear(&mut self) {
        self.parameters.clear();
        self.structure_changed();
    }

    pub fn get_parameter(&self, key: &str) -> Option<&DynamicParameter> {
        self.parameters.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.parameters.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Parameters in key order
    pub fn iter(&self) -> impl Iterator<Item = &DynamicParameter> {
        self.parameters.values()
    }

    /// Halts `StructureChanged` events until [`Self::end_modification_block`].
    ///
    /// # Panics
    /// If a block is already open.
    pub fn begin_modification_block(&mut self) {
        assert!(
            !self.delay_events,
            "Modification block already started on '{}'",
            self.name
        );
        self.delay_events = true;
    }

    /// Closes the block and posts one `StructureChanged`.
    ///
    /// # Panics
    /// If no block is open.
    pub fn end_modification_block(&mut self) {
        assert!(self.delay_events, "No modification block on '{}'", self.name);
        self.delay_events = false;
        self.events
            .post(ChangeEvent::structure_changed(self.holder_name()));
    }

    /// Runs `edit` inside a modification block
    pub fn with_modification_block<R>(&mut self, edit: impl FnOnce(&mut Self) -> R) -> R {
        self.begin_modification_block();
        let result = edit(self);
        self.end_modification_block();
        result
    }

    /// Replaces the whitelist, modifiability and entries of `target` with
    /// copies of this collection's, posting a single `StructureChanged`.
    pub fn copy_to(&self, target: &mut DynamicParameterCollection) {
        target.allowed_types = self.allowed_types.clone();
        target.allow_user_modification = self.allow_user_modification;
        target.with_modification_block(|target| {
            target.clear();
            for (key, parameter) in &self.parameters {
                target.parameters.insert(key.clone(), parameter.clone());
            }
        });
    }

    /// Replace every entry at once, inside one modification block.
    ///
    /// All entries are checked first; on error the collection is unchanged.
    pub fn replace_entries(&mut self, entries: Vec<DynamicParameter>) -> Result<()> {
        self.check_entries(&entries)?;

        self.with_modification_block(|collection| {
            collection.parameters.clear();
            for entry in entries {
                collection.parameters.insert(entry.key().to_string(), entry);
            }
        });
        Ok(())
    }

    /// Whether [`replace_entries`](Self::replace_entries) would accept `entries`
    pub fn check_entries(&self, entries: &[DynamicParameter]) -> Result<()> {
        let mut seen = BTreeSet::new();
        for entry in entries {
            if !seen.insert(entry.key().to_string()) {
                return Err(McatError::DuplicateKey {
                    key: entry.key().to_string(),
                });
            }
            if !self.is_type_allowed(entry.field_type()) {
                return Err(McatError::TypeNotAllowed {
                    key: entry.key().to_string(),
                    field_type: entry.field_type(),
                });
            }
        }
        Ok(())
    }

    fn structure_changed(&self) {
        if !self.delay_events {
            self.events
                .post(ChangeEvent::structure_changed(self.holder_name()));
        }
    }
}

impl Default for DynamicParameterCollection {
    fn default() -> Self {
        Self::unrestricted()
    }
}

impl Clone for DynamicParameterCollection {
    fn clone(&self) -> Self {
        let mut copy = Self::new([])
            .with_name(self.name.clone())
            .with_description(self.description.clone());
        self.copy_to(&mut copy);
        copy
    }
}

impl ParameterHolder for DynamicParameterCollection {
    fn holder_name(&self) -> String {
        self.name.clone()
    }

    fn holder_description(&self) -> String {
        self.description.clone()
    }

    fn events(&self) -> &ParameterEvents {
        &self.events
    }

    fn parameters(&self) -> Vec<ParameterDescriptor> {
        self.parameters
            .values()
            .map(|p| p.descriptor.clone())
            .collect()
    }

    fn read_parameter(&self, key: &str) -> Option<ParameterValue> {
        self.parameters.get(key).map(|p| p.value.clone())
    }

    fn write_parameter(&mut self, key: &str, value: ParameterValue) -> bool {
        match self.parameters.get_mut(key) {
            Some(parameter) => {
                parameter.value = value;
                true
            }
            None => false,
        }
    }

    fn access_kind(&self) -> AccessKind {
        AccessKind::Dynamic
    }

    fn as_dynamic(&self) -> Option<&DynamicParameterCollection> {
        Some(self)
    }

    fn as_dynamic_mut(&mut self) -> Option<&mut DynamicParameterCollection> {
        Some(self)
    }
}
