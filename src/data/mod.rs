//! Data slots and the providers that fill them

pub mod provider;
pub mod slot;
pub mod types;

pub use provider::{ComputedDataProvider, DataProvider, FileDataProvider};
pub use slot::DataSlot;
pub use types::{AucData, ClusterCentersData, DataKind, DataType, HyperstackData, RoiData};
