//! Data slots
//!
//! A slot is a typed placeholder for one piece of pipeline input or output.
//! It is filled by binding one of the providers its data kind offers.

use std::fmt;
use std::marker::PhantomData;

use log::{debug, warn};

use super::provider::DataProvider;
use super::types::{DataKind, DataType};
use crate::error::{McatError, Result};
use crate::parameters::{ChangeEvent, ParameterEvents};
use crate::validity::ValidityReport;

/// Typed placeholder bound to at most one [`DataProvider`]
pub struct DataSlot<T: DataKind> {
    name: String,
    current: Option<DataProvider>,
    prototypes: Vec<DataProvider>,
    events: ParameterEvents,
    _kind: PhantomData<fn() -> T>,
}

impl<T: DataKind> DataSlot<T> {
    /// Unbound slot offering the default providers of `T`
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_prototypes(name, T::provider_prototypes())
    }

    /// Unbound slot offering `prototypes`; incompatible ones are dropped
    pub fn with_prototypes(name: impl Into<String>, prototypes: Vec<DataProvider>) -> Self {
        let name = name.into();
        let prototypes = prototypes
            .into_iter()
            .filter(|p| {
                let compatible = p.data_type() == T::DATA_TYPE;
                if !compatible {
                    warn!(
                        "Dropping {} provider prototype from {} slot '{}'",
                        p.data_type(),
                        T::DATA_TYPE,
                        name
                    );
                }
                compatible
            })
            .collect();

        Self {
            name,
            current: None,
            prototypes,
            events: ParameterEvents::new(),
            _kind: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> DataType {
        T::DATA_TYPE
    }

    /// The slot's change bus; binding posts `StructureChanged(name)` here
    pub fn events(&self) -> &ParameterEvents {
        &self.events
    }

    /// Providers that can be bound, as fresh copies
    pub fn available_providers(&self) -> Vec<DataProvider> {
        self.prototypes.iter().map(DataProvider::duplicate).collect()
    }

    pub fn current_provider(&self) -> Option<&DataProvider> {
        self.current.as_ref()
    }

    pub fn current_provider_mut(&mut self) -> Option<&mut DataProvider> {
        self.current.as_mut()
    }

    pub fn is_bound(&self) -> bool {
        self.current.is_some()
    }

    /// Bind `provider`, replacing any current one.
    ///
    /// Fails without changing the slot if the provider produces another
    /// data type.
    pub fn bind(&mut self, provider: DataProvider) -> Result<()> {
        if provider.data_type() != T::DATA_TYPE {
            return Err(McatError::IncompatibleProvider {
                slot: self.name.clone(),
                expected: T::DATA_TYPE,
                found: provider.data_type(),
            });
        }

        debug!("Binding {} provider to slot '{}'", provider.kind_id(), self.name);
        self.current = Some(provider);
        self.events
            .post(ChangeEvent::structure_changed_at(self.name.clone(), self.name.clone()));
        Ok(())
    }

    /// Remove the current provider, if any
    pub fn unbind(&mut self) -> Option<DataProvider> {
        let previous = self.current.take()?;
        self.events
            .post(ChangeEvent::structure_changed_at(self.name.clone(), self.name.clone()));
        Some(previous)
    }

    /// Bound provider, binding a copy of the first prototype if there is none.
    ///
    /// A slot that is already bound is returned untouched and posts nothing.
    pub fn ensure_data_provider(&mut self) -> Result<&mut DataProvider> {
        if self.current.is_none() {
            let provider = self
                .prototypes
                .first()
                .map(DataProvider::duplicate)
                .ok_or_else(|| McatError::NoProviderAvailable {
                    slot: self.name.clone(),
                })?;
            self.bind(provider)?;
        }

        self.current.as_mut().ok_or_else(|| McatError::NoProviderAvailable {
            slot: self.name.clone(),
        })
    }

    /// Bound and the provider is valid
    pub fn is_valid(&self) -> bool {
        self.current.as_ref().map(DataProvider::is_valid).unwrap_or(false)
    }

    pub fn report_validity(&self, report: &mut ValidityReport) {
        match &self.current {
            Some(provider) => provider.report_validity(report),
            None => report.report_is_invalid(
                "No data provider selected!",
                format!("The {} slot '{}' has no data source.", T::DATA_TYPE, self.name),
                "Please select a data provider.",
                self.name.clone(),
            ),
        }
    }
}

impl<T: DataKind> Clone for DataSlot<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            current: self.current.as_ref().map(DataProvider::duplicate),
            prototypes: self.prototypes.clone(),
            events: ParameterEvents::new(),
            _kind: PhantomData,
        }
    }
}

impl<T: DataKind> fmt::Debug for DataSlot<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataSlot")
            .field("name", &self.name)
            .field("data_type", &T::DATA_TYPE)
            .field("current", &self.current)
            .finish()
    }
}
