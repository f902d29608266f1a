//! Data types carried by slots and providers

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::provider::{ComputedDataProvider, DataProvider, FileDataProvider};

/// Kind of data flowing through the analysis pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataType {
    /// Multi-wavelength image stack
    Hyperstack,
    /// Region of interest
    Roi,
    ClusterCenters,
    /// Area-under-curve table
    AucData,
}

impl DataType {
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Hyperstack => "Hyperstack",
            DataType::Roi => "ROI",
            DataType::ClusterCenters => "Cluster centers",
            DataType::AucData => "AUC data",
        }
    }

    /// File extensions accepted by a file-backed provider, lowercase
    pub fn file_extensions(&self) -> &'static [&'static str] {
        match self {
            DataType::Hyperstack => &["tif", "tiff"],
            DataType::Roi => &["roi", "zip"],
            DataType::ClusterCenters | DataType::AucData => &["csv"],
        }
    }

    /// Whether `path` carries one of [`DataType::file_extensions`]
    pub fn accepts_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.file_extensions().iter().any(|e| *e == ext)
            })
            .unwrap_or(false)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Compile-time marker binding a slot to one [`DataType`]
pub trait DataKind: 'static {
    const DATA_TYPE: DataType;

    /// Providers a slot of this kind offers, first one preferred
    fn provider_prototypes() -> Vec<DataProvider> {
        vec![DataProvider::File(FileDataProvider::new(Self::DATA_TYPE))]
    }
}

/// Raw multi-wavelength input image
#[derive(Debug, Clone, Copy)]
pub struct HyperstackData;

impl DataKind for HyperstackData {
    const DATA_TYPE: DataType = DataType::Hyperstack;
}

/// Tissue region of interest
#[derive(Debug, Clone, Copy)]
pub struct RoiData;

impl DataKind for RoiData {
    const DATA_TYPE: DataType = DataType::Roi;
}

/// Cluster centers produced by the clustering step
#[derive(Debug, Clone, Copy)]
pub struct ClusterCentersData;

impl DataKind for ClusterCentersData {
    const DATA_TYPE: DataType = DataType::ClusterCenters;

    fn provider_prototypes() -> Vec<DataProvider> {
        vec![
            DataProvider::Computed(ComputedDataProvider::new(Self::DATA_TYPE, "clustering")),
            DataProvider::File(FileDataProvider::new(Self::DATA_TYPE)),
        ]
    }
}

/// Area under curve per cluster
#[derive(Debug, Clone, Copy)]
pub struct AucData;

impl DataKind for AucData {
    const DATA_TYPE: DataType = DataType::AucData;

    fn provider_prototypes() -> Vec<DataProvider> {
        vec![DataProvider::Computed(ComputedDataProvider::new(
            Self::DATA_TYPE,
            "postprocessing",
        ))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prototypes_match_kind() {
        for provider in ClusterCentersData::provider_prototypes() {
            assert_eq!(provider.data_type(), DataType::ClusterCenters);
        }
        assert_eq!(HyperstackData::provider_prototypes()[0].kind_id(), "file");
        assert_eq!(AucData::provider_prototypes()[0].kind_id(), "computed");
    }

    #[test]
    fn test_display() {
        assert_eq!(DataType::Roi.to_string(), "ROI");
    }

    #[test]
    fn test_accepts_file_by_extension() {
        assert!(DataType::Hyperstack.accepts_file(Path::new("scans/mouse-1.TIF")));
        assert!(DataType::Roi.accepts_file(Path::new("tissue.zip")));
        assert!(!DataType::Hyperstack.accepts_file(Path::new("tissue.roi")));
        assert!(!DataType::AucData.accepts_file(Path::new("auc")));
    }
}
