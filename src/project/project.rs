//! Projects
//!
//! A project owns the global analysis settings and every sample. It is
//! persisted as one JSON document:
//!
//! ```json
//! {
//!   "schema-version": "1.0.0",
//!   "id": "…",
//!   "created-at": "…",
//!   "modified-at": "…",
//!   "parameters": { "clustering": { … }, "postprocessing": { … } },
//!   "samples": {
//!     "<name>": { "data-providers": { "raw-input-image": "file" }, "parameters": { … } }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::clustering::ClusteringParameters;
use super::postprocessing::AucDataConditions;
use super::sample::Sample;
use crate::error::{McatError, Result};
use crate::parameters::{
    qualify, read_holder, write_holder, ChangeEvent, ParameterDescriptor, ParameterEvents,
    ParameterHolder, ParameterValue,
};
use crate::validity::ValidityReport;

/// Default project file name.
pub const PROJECT_FILE: &str = "project.json";

/// Version of the project document layout.
pub const SCHEMA_VERSION: &str = "1.0.0";

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ProjectDocument {
    schema_version: String,
    id: Uuid,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
    parameters: serde_json::Value,
    #[serde(default)]
    samples: BTreeMap<String, SampleDocument>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct SampleDocument {
    #[serde(default)]
    data_providers: BTreeMap<String, String>,
    parameters: serde_json::Value,
}

/// Analysis project: global settings plus named samples
#[derive(Debug, Clone)]
pub struct Project {
    id: Uuid,
    created_at: DateTime<Utc>,
    modified_at: DateTime<Utc>,
    clustering: ClusteringParameters,
    postprocessing: AucDataConditions,
    samples: BTreeMap<String, Sample>,
    events: ParameterEvents,
}

impl Project {
    pub const CLUSTERING: &'static str = "clustering";
    pub const POSTPROCESSING: &'static str = "postprocessing";

    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            modified_at: now,
            clustering: ClusteringParameters::new(),
            postprocessing: AucDataConditions::default(),
            samples: BTreeMap::new(),
            events: ParameterEvents::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn modified_at(&self) -> DateTime<Utc> {
        self.modified_at
    }

    pub fn clustering(&self) -> &ClusteringParameters {
        &self.clustering
    }

    pub fn clustering_mut(&mut self) -> &mut ClusteringParameters {
        &mut self.clustering
    }

    pub fn postprocessing(&self) -> &AucDataConditions {
        &self.postprocessing
    }

    pub fn postprocessing_mut(&mut self) -> &mut AucDataConditions {
        &mut self.postprocessing
    }

    // Samples

    /// Samples in name order
    pub fn samples(&self) -> impl Iterator<Item = &Sample> {
        self.samples.values()
    }

    pub fn sample_names(&self) -> Vec<&str> {
        self.samples.keys().map(String::as_str).collect()
    }

    pub fn sample(&self, name: &str) -> Option<&Sample> {
        self.samples.get(name)
    }

    pub fn sample_mut(&mut self, name: &str) -> Option<&mut Sample> {
        self.samples.get_mut(name)
    }

    /// Get a sample or fail with `SampleNotFound`
    pub fn require_sample_mut(&mut self, name: &str) -> Result<&mut Sample> {
        self.samples
            .get_mut(name)
            .ok_or_else(|| McatError::SampleNotFound {
                name: name.to_string(),
            })
    }

    /// Create an empty sample
    pub fn add_sample(&mut self, name: &str) -> Result<&mut Sample> {
        self.insert_sample(Sample::new(name))
    }

    /// Add a sample under its own name
    pub fn insert_sample(&mut self, sample: Sample) -> Result<&mut Sample> {
        let name = sample.name().to_string();
        if self.samples.contains_key(&name) {
            return Err(McatError::SampleAlreadyExists { name });
        }

        info!("Adding sample '{}'", name);
        self.samples.insert(name.clone(), sample);
        self.structure_changed();
        self.require_sample_mut(&name)
    }

    pub fn remove_sample(&mut self, name: &str) -> Result<Sample> {
        let sample = self
            .samples
            .remove(name)
            .ok_or_else(|| McatError::SampleNotFound {
                name: name.to_string(),
            })?;
        self.structure_changed();
        Ok(sample)
    }

    pub fn rename_sample(&mut self, name: &str, new_name: &str) -> Result<()> {
        if name == new_name {
            return Ok(());
        }
        if self.samples.contains_key(new_name) {
            return Err(McatError::SampleAlreadyExists {
                name: new_name.to_string(),
            });
        }

        let mut sample = self
            .samples
            .remove(name)
            .ok_or_else(|| McatError::SampleNotFound {
                name: name.to_string(),
            })?;
        sample.set_name(new_name);
        self.samples.insert(new_name.to_string(), sample);
        self.structure_changed();
        Ok(())
    }

    /// Copy of `name` added as `new_name`
    pub fn duplicate_sample(&mut self, name: &str, new_name: &str) -> Result<&mut Sample> {
        let copy = self
            .sample(name)
            .ok_or_else(|| McatError::SampleNotFound {
                name: name.to_string(),
            })?
            .duplicate(new_name);
        self.insert_sample(copy)
    }

    fn structure_changed(&self) {
        self.events.post(ChangeEvent::structure_changed("Project"));
    }

    // Validation

    pub fn is_valid(&self) -> bool {
        self.samples.values().all(Sample::is_valid)
    }

    /// Report every sample's problems under a category named after it
    pub fn report_validity(&self, report: &mut ValidityReport) {
        if self.samples.is_empty() {
            report.for_category("Samples").report_is_invalid(
                "No samples!",
                "The project does not contain any sample.",
                "Add at least one sample.",
                "Project",
            );
        }
        for (name, sample) in &self.samples {
            sample.report_validity(report.for_category("Samples").for_category(name));
        }
    }

    // Persistence

    /// Serialize into a project document
    pub fn to_document(&self) -> Result<serde_json::Value> {
        let samples = self
            .samples
            .iter()
            .map(|(name, sample)| {
                let document = SampleDocument {
                    data_providers: sample
                        .provider_kinds()
                        .into_iter()
                        .map(|(slot, kind)| (slot.to_string(), kind.to_string()))
                        .collect(),
                    parameters: write_holder(sample),
                };
                (name.clone(), document)
            })
            .collect();

        let document = ProjectDocument {
            schema_version: SCHEMA_VERSION.to_string(),
            id: self.id,
            created_at: self.created_at,
            modified_at: self.modified_at,
            parameters: write_holder(self),
            samples,
        };
        Ok(serde_json::to_value(document)?)
    }

    /// Rebuild a project from a document.
    ///
    /// Returns the project and the qualified keys that could not be
    /// applied, prefixed with `samples/<name>` for sample parameters.
    pub fn from_document(document: serde_json::Value) -> Result<(Self, Vec<String>)> {
        let document: ProjectDocument = serde_json::from_value(document)?;
        if document.schema_version != SCHEMA_VERSION {
            warn!(
                "Project schema version {} differs from {}",
                document.schema_version, SCHEMA_VERSION
            );
        }

        let mut project = Project::new();
        project.id = document.id;
        project.created_at = document.created_at;
        project.modified_at = document.modified_at;

        let mut skipped = read_holder(&mut project, &document.parameters)?;

        for (name, sample_document) in document.samples {
            let mut sample = Sample::new(name.as_str());
            for (slot, kind) in &sample_document.data_providers {
                sample.bind_provider(slot, kind)?;
            }

            let sample_path = vec!["samples".to_string(), name.clone()];
            skipped.extend(
                read_holder(&mut sample, &sample_document.parameters)?
                    .into_iter()
                    .map(|key| qualify(&sample_path, &key)),
            );
            project.insert_sample(sample)?;
        }

        Ok((project, skipped))
    }

    /// Write the project document to `path`
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.modified_at = Utc::now();

        let content = serde_json::to_string_pretty(&self.to_document()?)?;
        fs::write(path, content).map_err(|e| McatError::FileWriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        info!("Saved project with {} samples to {}", self.samples.len(), path.display());
        Ok(())
    }

    /// Load a project document from `path`
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(McatError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path).map_err(|e| McatError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let document: serde_json::Value = serde_json::from_str(&content)?;

        let (project, skipped) = Self::from_document(document)?;
        if !skipped.is_empty() {
            warn!("Ignored {} stored values: {}", skipped.len(), skipped.join(", "));
        }

        info!("Loaded project with {} samples from {}", project.samples.len(), path.display());
        Ok(project)
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

impl ParameterHolder for Project {
    fn holder_name(&self) -> String {
        "Project".to_string()
    }

    fn holder_description(&self) -> String {
        "Settings shared by all samples".to_string()
    }

    fn events(&self) -> &ParameterEvents {
        &self.events
    }

    fn parameters(&self) -> Vec<ParameterDescriptor> {
        Vec::new()
    }

    fn read_parameter(&self, _key: &str) -> Option<ParameterValue> {
        None
    }

    fn write_parameter(&mut self, _key: &str, _value: ParameterValue) -> bool {
        false
    }

    fn sub_holders(&self) -> Vec<(String, &dyn ParameterHolder)> {
        vec![
            (
                Self::CLUSTERING.to_string(),
                &self.clustering as &dyn ParameterHolder,
            ),
            (
                Self::POSTPROCESSING.to_string(),
                &self.postprocessing as &dyn ParameterHolder,
            ),
        ]
    }

    fn sub_holder_mut(&mut self, key: &str) -> Option<&mut dyn ParameterHolder> {
        match key {
            Self::CLUSTERING => Some(&mut self.clustering),
            Self::POSTPROCESSING => Some(&mut self.postprocessing),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::ChangeKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_sample_names_are_unique() {
        let mut project = Project::new();
        project.add_sample("A").unwrap();

        let err = project.add_sample("A").unwrap_err();
        assert_eq!(err.error_code(), "SAMPLE_ALREADY_EXISTS");
        assert_eq!(project.sample_names(), vec!["A"]);
    }

    #[test]
    fn test_rename_keeps_name_in_sync() {
        let mut project = Project::new();
        project.add_sample("A").unwrap();
        project.add_sample("B").unwrap();

        assert!(project.rename_sample("A", "B").is_err());
        project.rename_sample("A", "C").unwrap();

        assert_eq!(project.sample_names(), vec!["B", "C"]);
        assert_eq!(project.sample("C").unwrap().name(), "C");
        assert!(project.rename_sample("missing", "D").is_err());
    }

    #[test]
    fn test_structure_events() {
        let mut project = Project::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        project.events().subscribe(move |e| sink.borrow_mut().push(e.kind));

        project.add_sample("A").unwrap();
        project.duplicate_sample("A", "B").unwrap();
        project.remove_sample("A").unwrap();

        assert_eq!(*log.borrow(), vec![ChangeKind::StructureChanged; 3]);
    }

    #[test]
    fn test_empty_project_is_reported() {
        let project = Project::new();
        let mut report = ValidityReport::new();
        project.report_validity(&mut report);
        assert!(!report.is_valid());
    }

    #[test]
    fn test_document_restores_settings() {
        let mut project = Project::new();
        project.clustering_mut().set_kmeans_k(9);
        let sample = project.add_sample("A").unwrap();
        sample.sample_parameters_mut().set_treatment("control");
        sample.ensure_data_providers().unwrap();

        let document = project.to_document().unwrap();
        let (restored, skipped) = Project::from_document(document.clone()).unwrap();

        assert!(skipped.is_empty());
        assert_eq!(restored.id(), project.id());
        assert_eq!(restored.clustering().kmeans_k(), 9);
        let sample = restored.sample("A").unwrap();
        assert_eq!(sample.sample_parameters().treatment(), "control");
        assert!(sample.tissue_roi().is_bound());
        assert_eq!(restored.to_document().unwrap(), document);
    }
}
