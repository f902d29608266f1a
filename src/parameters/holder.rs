//! Parameter holders
//!
//! A holder is any object exposing named, typed parameters. Holders nest:
//! a sample holds its sample parameters, a dynamic collection and the
//! providers bound to its data slots.

use log::debug;

use super::access::AccessKind;
use super::descriptor::ParameterDescriptor;
use super::dynamic::DynamicParameterCollection;
use super::events::{ChangeEvent, ParameterEvents};
use super::value::ParameterValue;
use crate::error::{McatError, Result};

/// Object exposing a set of named, typed parameters
pub trait ParameterHolder {
    /// Display name, used to group parameters by source
    fn holder_name(&self) -> String;

    /// Optional longer documentation of the holder
    fn holder_description(&self) -> String {
        String::new()
    }

    /// The holder's own change bus
    fn events(&self) -> &ParameterEvents;

    /// Descriptors of the parameters declared directly on this holder,
    /// in a deterministic order
    fn parameters(&self) -> Vec<ParameterDescriptor>;

    /// Raw read of a stored value
    fn read_parameter(&self, key: &str) -> Option<ParameterValue>;

    /// Raw write of an already type-checked value.
    ///
    /// Returning false refuses the value; implementations must then leave
    /// their state untouched.
    fn write_parameter(&mut self, key: &str, value: ParameterValue) -> bool;

    /// How this holder stores its parameters
    fn access_kind(&self) -> AccessKind {
        AccessKind::Static
    }

    /// Nested holders, keyed by their path segment, in declared order
    fn sub_holders(&self) -> Vec<(String, &dyn ParameterHolder)> {
        Vec::new()
    }

    /// Mutable access to the nested holder stored under `key`
    fn sub_holder_mut(&mut self, _key: &str) -> Option<&mut dyn ParameterHolder> {
        None
    }

    fn as_dynamic(&self) -> Option<&DynamicParameterCollection> {
        None
    }

    fn as_dynamic_mut(&mut self) -> Option<&mut DynamicParameterCollection> {
        None
    }

    /// Descriptor of the parameter `key`
    fn parameter(&self, key: &str) -> Option<ParameterDescriptor> {
        self.parameters().into_iter().find(|p| p.key == key)
    }

    /// Current value of `key`, or the type's zero value if it is unset
    fn get_value(&self, key: &str) -> Option<ParameterValue> {
        let descriptor = self.parameter(key)?;
        Some(
            self.read_parameter(key)
                .unwrap_or_else(|| descriptor.field_type.zero_value()),
        )
    }

    /// Type-check and store `value`, then post `ValueChanged(key)`.
    fn try_set_value(&mut self, key: &str, value: ParameterValue) -> Result<()> {
        let descriptor = self
            .parameter(key)
            .ok_or_else(|| McatError::UnknownParameter {
                key: key.to_string(),
            })?;
        let value = descriptor.accept(value)?;

        if !self.write_parameter(key, value) {
            return Err(McatError::ValueRejected {
                key: key.to_string(),
            });
        }

        self.events()
            .post(ChangeEvent::value_changed(self.holder_name(), key));
        Ok(())
    }

    /// Like [`ParameterHolder::try_set_value`], reporting only success.
    ///
    /// A false return means nothing was stored.
    fn set_value(&mut self, key: &str, value: ParameterValue) -> bool {
        match self.try_set_value(key, value) {
            Ok(()) => true,
            Err(err) => {
                debug!("Rejected write on '{}': {}", self.holder_name(), err);
                false
            }
        }
    }
}

/// Follow `path` from `root` through [`ParameterHolder::sub_holder_mut`]
pub fn resolve_holder_mut<'a>(
    root: &'a mut dyn ParameterHolder,
    path: &[String],
) -> Option<&'a mut dyn ParameterHolder> {
    let mut current = root;
    for segment in path {
        current = current.sub_holder_mut(segment)?;
    }
    Some(current)
}
