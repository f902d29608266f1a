//! Data providers
//!
//! A provider supplies the content of a data slot. Each provider is a
//! parameter holder, so choosing a file or inspecting a computed output
//! goes through the same parameter machinery as any other setting.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::types::DataType;
use crate::error::{McatError, Result};
use crate::parameters::{
    AccessKind, FieldType, ParameterDescriptor, ParameterEvents, ParameterHolder, ParameterTable,
    ParameterValue, StaticParameters, Visibility,
};
use crate::validity::ValidityReport;

fn optional_path(value: &Option<PathBuf>) -> ParameterValue {
    ParameterValue::Path(value.clone().unwrap_or_default())
}

fn store_optional_path(target: &mut Option<PathBuf>, value: ParameterValue) -> bool {
    match value {
        ParameterValue::Path(path) => {
            *target = if path.as_os_str().is_empty() {
                None
            } else {
                Some(path)
            };
            true
        }
        _ => false,
    }
}

/// Reads its data from a user-selected file
#[derive(Debug, Clone)]
pub struct FileDataProvider {
    data_type: DataType,
    file_path: Option<PathBuf>,
    events: ParameterEvents,
}

impl FileDataProvider {
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            file_path: None,
            events: ParameterEvents::new(),
        }
    }

    pub fn with_file_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Set the path and post `ValueChanged("file-path")`
    pub fn set_file_path(&mut self, path: impl Into<PathBuf>) -> bool {
        self.set_value("file-path", ParameterValue::Path(path.into()))
    }

    /// Valid iff a path is set and exists
    pub fn is_valid(&self) -> bool {
        self.file_path.as_deref().map(Path::exists).unwrap_or(false)
    }

    pub fn report_validity(&self, report: &mut ValidityReport) {
        let category = report.for_category("File path");
        match &self.file_path {
            None => category.report_is_invalid(
                "No file selected!",
                format!("A {} file is required.", self.data_type),
                "Please select a file.",
                self.holder_name(),
            ),
            Some(path) if !path.exists() => category.report_is_invalid(
                "File path is invalid!",
                format!("The selected file '{}' does not exist!", path.display()),
                "Please select a valid file.",
                self.holder_name(),
            ),
            Some(_) => {}
        }
    }
}

impl StaticParameters for FileDataProvider {
    fn parameter_table() -> &'static ParameterTable<Self> {
        static TABLE: OnceLock<ParameterTable<FileDataProvider>> = OnceLock::new();
        TABLE.get_or_init(|| {
            ParameterTable::<Self>::new().with(
                ParameterDescriptor::new("file-path", FieldType::Path)
                    .with_name("File path")
                    .with_description("File the data is read from"),
                |p| optional_path(&p.file_path),
                |p, v| store_optional_path(&mut p.file_path, v),
            )
        })
    }
}

impl ParameterHolder for FileDataProvider {
    crate::impl_static_parameters!();

    fn holder_name(&self) -> String {
        "File".to_string()
    }

    fn holder_description(&self) -> String {
        format!("Loads {} data from a file", self.data_type)
    }

    fn events(&self) -> &ParameterEvents {
        &self.events
    }
}

/// Takes its data from the output of a pipeline step
#[derive(Debug, Clone)]
pub struct ComputedDataProvider {
    data_type: DataType,
    producer: String,
    output_path: Option<PathBuf>,
    events: ParameterEvents,
}

impl ComputedDataProvider {
    pub fn new(data_type: DataType, producer: impl Into<String>) -> Self {
        Self {
            data_type,
            producer: producer.into(),
            output_path: None,
            events: ParameterEvents::new(),
        }
    }

    /// Name of the step producing the data
    pub fn producer(&self) -> &str {
        &self.producer
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    /// Record where the producing step wrote its output
    pub fn set_output_path(&mut self, path: impl Into<PathBuf>) -> bool {
        self.set_value("output-path", ParameterValue::Path(path.into()))
    }

    /// Valid once the producing step has written an existing output
    pub fn is_valid(&self) -> bool {
        self.output_path.as_deref().map(Path::exists).unwrap_or(false)
    }

    pub fn report_validity(&self, report: &mut ValidityReport) {
        if self.is_valid() {
            return;
        }
        report.for_category("Output").report_is_invalid(
            "Data is not computed yet!",
            format!("No {} output of step '{}' is available.", self.data_type, self.producer),
            format!("Run the '{}' step first.", self.producer),
            self.holder_name(),
        );
    }
}

impl StaticParameters for ComputedDataProvider {
    fn parameter_table() -> &'static ParameterTable<Self> {
        static TABLE: OnceLock<ParameterTable<ComputedDataProvider>> = OnceLock::new();
        TABLE.get_or_init(|| {
            ParameterTable::<Self>::new()
                .with(
                    ParameterDescriptor::new("producer", FieldType::String)
                        .with_name("Producer")
                        .with_description("Pipeline step computing the data")
                        .with_visibility(Visibility::Visible),
                    |p| ParameterValue::String(p.producer.clone()),
                    |p, v| match v {
                        ParameterValue::String(producer) => {
                            p.producer = producer;
                            true
                        }
                        _ => false,
                    },
                )
                .with(
                    ParameterDescriptor::new("output-path", FieldType::Path)
                        .with_name("Output path")
                        .with_visibility(Visibility::Hidden),
                    |p| optional_path(&p.output_path),
                    |p, v| store_optional_path(&mut p.output_path, v),
                )
        })
    }
}

impl ParameterHolder for ComputedDataProvider {
    crate::impl_static_parameters!();

    fn holder_name(&self) -> String {
        "Computed".to_string()
    }

    fn holder_description(&self) -> String {
        format!("{} computed by '{}'", self.data_type, self.producer)
    }

    fn events(&self) -> &ParameterEvents {
        &self.events
    }
}

/// Interchangeable source of a slot's data
#[derive(Debug, Clone)]
pub enum DataProvider {
    File(FileDataProvider),
    Computed(ComputedDataProvider),
}

impl DataProvider {
    /// Kind identifiers accepted by [`DataProvider::from_kind`]
    pub const KINDS: [&'static str; 2] = ["file", "computed"];

    /// Empty provider of the given kind
    pub fn from_kind(kind: &str, data_type: DataType) -> Result<Self> {
        match kind {
            "file" => Ok(DataProvider::File(FileDataProvider::new(data_type))),
            "computed" => Ok(DataProvider::Computed(ComputedDataProvider::new(data_type, ""))),
            _ => Err(McatError::UnknownProviderKind {
                kind: kind.to_string(),
            }),
        }
    }

    /// Stable identifier of the variant, used in project documents
    pub fn kind_id(&self) -> &'static str {
        match self {
            DataProvider::File(_) => "file",
            DataProvider::Computed(_) => "computed",
        }
    }

    pub fn name(&self) -> String {
        match self {
            DataProvider::File(p) => p.holder_name(),
            DataProvider::Computed(p) => p.holder_name(),
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            DataProvider::File(p) => p.data_type,
            DataProvider::Computed(p) => p.data_type,
        }
    }

    pub fn is_valid(&self) -> bool {
        match self {
            DataProvider::File(p) => p.is_valid(),
            DataProvider::Computed(p) => p.is_valid(),
        }
    }

    pub fn report_validity(&self, report: &mut ValidityReport) {
        match self {
            DataProvider::File(p) => p.report_validity(report),
            DataProvider::Computed(p) => p.report_validity(report),
        }
    }

    /// Deep copy with its own, empty change bus
    pub fn duplicate(&self) -> Self {
        self.clone()
    }

    fn holder(&self) -> &dyn ParameterHolder {
        match self {
            DataProvider::File(p) => p,
            DataProvider::Computed(p) => p,
        }
    }

    fn holder_mut(&mut self) -> &mut dyn ParameterHolder {
        match self {
            DataProvider::File(p) => p,
            DataProvider::Computed(p) => p,
        }
    }
}

impl ParameterHolder for DataProvider {
    fn holder_name(&self) -> String {
        self.holder().holder_name()
    }

    fn holder_description(&self) -> String {
        self.holder().holder_description()
    }

    fn events(&self) -> &ParameterEvents {
        self.holder().events()
    }

    fn parameters(&self) -> Vec<ParameterDescriptor> {
        self.holder().parameters()
    }

    fn read_parameter(&self, key: &str) -> Option<ParameterValue> {
        self.holder().read_parameter(key)
    }

    fn write_parameter(&mut self, key: &str, value: ParameterValue) -> bool {
        self.holder_mut().write_parameter(key, value)
    }

    fn access_kind(&self) -> AccessKind {
        AccessKind::Static
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::ChangeKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_file_provider_validity() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("image.tif");
        std::fs::write(&existing, b"II*").unwrap();

        let mut provider = FileDataProvider::new(DataType::Hyperstack);
        assert!(!provider.is_valid());

        assert!(provider.set_file_path(dir.path().join("missing.tif")));
        assert!(!provider.is_valid());
        let mut report = ValidityReport::new();
        provider.report_validity(&mut report);
        assert_eq!(report.invalid_entries()[0].1.message, "File path is invalid!");

        assert!(provider.set_file_path(existing.clone()));
        assert!(provider.is_valid());
        let mut report = ValidityReport::new();
        provider.report_validity(&mut report);
        assert!(report.is_valid());
    }

    #[test]
    fn test_setting_path_posts_value_changed() {
        let mut provider = DataProvider::File(FileDataProvider::new(DataType::Roi));
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        provider
            .events()
            .subscribe(move |e| sink.borrow_mut().push((e.kind, e.key.clone())));

        assert!(provider.set_value("file-path", ParameterValue::Path("a.roi".into())));
        assert_eq!(
            *log.borrow(),
            vec![(ChangeKind::ValueChanged, Some("file-path".to_string()))]
        );
    }

    #[test]
    fn test_duplicate_is_deep() {
        let original = DataProvider::File(
            FileDataProvider::new(DataType::Hyperstack).with_file_path("a.tif"),
        );
        original.events().subscribe(|_| {});

        let mut copy = original.duplicate();
        assert_eq!(copy.events().subscriber_count(), 0);
        assert!(copy.set_value("file-path", ParameterValue::Path("b.tif".into())));
        assert_eq!(
            original.get_value("file-path"),
            Some(ParameterValue::Path("a.tif".into()))
        );
    }

    #[test]
    fn test_from_kind() {
        let provider = DataProvider::from_kind("computed", DataType::AucData).unwrap();
        assert_eq!(provider.kind_id(), "computed");
        assert_eq!(provider.data_type(), DataType::AucData);
        assert!(DataProvider::from_kind("database", DataType::AucData).is_err());
    }

    #[test]
    fn test_computed_provider_output_is_hidden() {
        let provider = ComputedDataProvider::new(DataType::ClusterCenters, "clustering");
        let output = provider.parameter("output-path").unwrap();
        assert_eq!(output.visibility, Visibility::Hidden);
        assert!(!provider.is_valid());

        let mut report = ValidityReport::new();
        provider.report_validity(&mut report);
        assert!(report.invalid_entries()[0].1.solution.contains("clustering"));
    }
}
