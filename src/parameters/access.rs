//! Parameter access
//!
//! [`ParameterAccess`] is the uniform read/write handle over one parameter,
//! whether it lives in a fixed struct field (static) or in the map of a
//! [`DynamicParameterCollection`](super::DynamicParameterCollection).
//!
//! Static parameters are declared once per holder type in a
//! [`ParameterTable`], which the type caches and hands out through
//! [`StaticParameters::parameter_table`].

use super::descriptor::ParameterDescriptor;
use super::holder::ParameterHolder;
use super::value::ParameterValue;
use crate::error::Result;

/// Storage behind a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessKind {
    /// Bound to a struct field, declared once per type
    Static,
    /// Bound to a map entry created at run time
    Dynamic,
}

/// Read/write handle binding a descriptor to its holder
pub struct ParameterAccess<'a> {
    holder: &'a mut dyn ParameterHolder,
    descriptor: ParameterDescriptor,
}

impl<'a> ParameterAccess<'a> {
    /// Handle for `key` on `holder`, if the holder declares it
    pub fn new(holder: &'a mut dyn ParameterHolder, key: &str) -> Option<Self> {
        let descriptor = holder.parameter(key)?;
        Some(Self { holder, descriptor })
    }

    pub fn descriptor(&self) -> &ParameterDescriptor {
        &self.descriptor
    }

    pub fn key(&self) -> &str {
        &self.descriptor.key
    }

    pub fn kind(&self) -> AccessKind {
        self.holder.access_kind()
    }

    /// The holder owning the parameter
    pub fn holder(&self) -> &dyn ParameterHolder {
        &*self.holder
    }

    /// Stored value, or the zero value of the field type if unset
    pub fn get(&self) -> ParameterValue {
        self.holder
            .read_parameter(&self.descriptor.key)
            .unwrap_or_else(|| self.descriptor.field_type.zero_value())
    }

    /// Store `value`; false means it was rejected and nothing changed
    pub fn set(&mut self, value: ParameterValue) -> bool {
        self.holder.set_value(&self.descriptor.key, value)
    }

    /// Store `value`, returning why it was rejected
    pub fn try_set(&mut self, value: ParameterValue) -> Result<()> {
        self.holder.try_set_value(&self.descriptor.key, value)
    }
}

/// A parameter bound to a field of `H` through accessor functions
pub struct StaticParameter<H> {
    pub descriptor: ParameterDescriptor,
    getter: fn(&H) -> ParameterValue,
    setter: fn(&mut H, ParameterValue) -> bool,
}

/// Static parameters of one holder type, in declared order
pub struct ParameterTable<H> {
    parameters: Vec<StaticParameter<H>>,
}

impl<H> ParameterTable<H> {
    pub fn new() -> Self {
        Self {
            parameters: Vec::new(),
        }
    }

    /// Declare a parameter.
    ///
    /// The setter receives a value already checked against the descriptor's
    /// field type and may still refuse it by returning false.
    ///
    /// # Panics
    /// If `descriptor.key` is already declared.
    pub fn with(
        mut self,
        descriptor: ParameterDescriptor,
        getter: fn(&H) -> ParameterValue,
        setter: fn(&mut H, ParameterValue) -> bool,
    ) -> Self {
        assert!(
            self.find(&descriptor.key).is_none(),
            "parameter '{}' declared twice",
            descriptor.key
        );
        self.parameters.push(StaticParameter {
            descriptor,
            getter,
            setter,
        });
        self
    }

    pub fn find(&self, key: &str) -> Option<&StaticParameter<H>> {
        self.parameters.iter().find(|p| p.descriptor.key == key)
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &ParameterDescriptor> {
        self.parameters.iter().map(|p| &p.descriptor)
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn read(&self, holder: &H, key: &str) -> Option<ParameterValue> {
        self.find(key).map(|p| (p.getter)(holder))
    }

    pub fn write(&self, holder: &mut H, key: &str, value: ParameterValue) -> bool {
        match self.find(key) {
            Some(p) => (p.setter)(holder, value),
            None => false,
        }
    }
}

impl<H> Default for ParameterTable<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Types whose parameters are declared once in a static table
pub trait StaticParameters: Sized + 'static {
    fn parameter_table() -> &'static ParameterTable<Self>;
}

/// Implements the table-backed [`ParameterHolder`] methods inside an
/// `impl ParameterHolder for T` block, where `T: StaticParameters`.
#[macro_export]
macro_rules! impl_static_parameters {
    () => {
        fn parameters(&self) -> Vec<$crate::parameters::ParameterDescriptor> {
            <Self as $crate::parameters::StaticParameters>::parameter_table()
                .descriptors()
                .cloned()
                .collect()
        }

        fn read_parameter(&self, key: &str) -> Option<$crate::parameters::ParameterValue> {
            <Self as $crate::parameters::StaticParameters>::parameter_table().read(self, key)
        }

        fn write_parameter(&mut self, key: &str, value: $crate::parameters::ParameterValue) -> bool {
            <Self as $crate::parameters::StaticParameters>::parameter_table().write(self, key, value)
        }
    };
}
