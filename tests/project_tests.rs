//! Project Tests
//!
//! Saving and loading project files and editing them through traversal.

use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::TempDir;
use test_case::test_case;

use mcat::parameters::{
    read_holder, write_holder, FieldType, ParameterHolder, ParameterValue, TraversedParameters,
};
use mcat::project::{ClusteringHierarchy, PostprocessingMethod, Project, Sample, PROJECT_FILE};
use mcat::validity::ValidityReport;

fn sample_project() -> Project {
    let mut project = Project::new();
    project.clustering_mut().set_kmeans_k(7);
    project
        .clustering_mut()
        .set_clustering_hierarchy(ClusteringHierarchy::PerSubject);
    project
        .postprocessing_mut()
        .set_method(PostprocessingMethod::MinPooling);

    let sample = project.add_sample("mouse-1").unwrap();
    sample.sample_parameters_mut().set_treatment("control");
    sample.ensure_data_providers().unwrap();
    let custom = sample.custom_parameters_mut();
    custom.add_parameter("weight", FieldType::Double).unwrap();
    custom.set_value("weight", ParameterValue::Double(21.5));

    project.add_sample("mouse-2").unwrap();
    project
}

// === Persistence Tests ===

#[test]
fn test_save_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(PROJECT_FILE);

    let mut project = sample_project();
    project.save(&path).unwrap();
    let loaded = Project::load(&path).unwrap();

    assert_eq!(loaded.id(), project.id());
    assert_eq!(loaded.sample_names(), vec!["mouse-1", "mouse-2"]);
    assert_eq!(loaded.clustering(), project.clustering());
    assert_eq!(loaded.postprocessing(), project.postprocessing());

    let sample = loaded.sample("mouse-1").unwrap();
    assert_eq!(sample.sample_parameters().treatment(), "control");
    assert_eq!(
        sample.custom_parameters().get_value("weight"),
        Some(ParameterValue::Double(21.5))
    );
    assert!(sample.raw_input_image().is_bound());
    assert!(!loaded.sample("mouse-2").unwrap().raw_input_image().is_bound());

    assert_eq!(loaded.to_document().unwrap(), project.to_document().unwrap());
}

#[test]
fn test_load_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = Project::load(&dir.path().join(PROJECT_FILE)).unwrap_err();
    assert_eq!(err.error_code(), "FILE_NOT_FOUND");
}

#[test]
fn test_unknown_stored_keys_are_skipped() {
    let project = sample_project();
    let mut document = project.to_document().unwrap();
    document["parameters"]["clustering"]["kmeans-k"] = serde_json::json!(-1);
    document["parameters"]["clustering"]["smoothing"] = serde_json::json!(true);

    let (restored, skipped) = Project::from_document(document).unwrap();

    assert_eq!(skipped, vec!["clustering/kmeans-k", "clustering/smoothing"]);
    assert_eq!(restored.clustering().kmeans_k(), 5);
    assert_eq!(
        restored.clustering().clustering_hierarchy(),
        ClusteringHierarchy::PerSubject
    );
}

#[test]
fn test_non_finite_custom_value_keeps_project_loadable() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(PROJECT_FILE);

    let mut project = Project::new();
    let custom = project.add_sample("A").unwrap().custom_parameters_mut();
    custom.add_parameter("ratio", FieldType::Double).unwrap();

    assert!(!custom.set_value("ratio", ParameterValue::Double(f64::NAN)));
    assert!(!custom.set_value("ratio", ParameterValue::Double(f64::INFINITY)));
    assert_eq!(custom.get_value("ratio"), Some(ParameterValue::Double(0.0)));

    project.save(&path).unwrap();
    let loaded = Project::load(&path).unwrap();
    assert_eq!(
        loaded
            .sample("A")
            .map(Sample::custom_parameters)
            .and_then(|c| c.get_value("ratio")),
        Some(ParameterValue::Double(0.0))
    );
}

// === Sample Document Tests ===

fn annotated_sample(custom_count: usize) -> Sample {
    let mut sample = Sample::new("A");
    sample.sample_parameters_mut().set_treatment("control");
    sample.ensure_data_providers().unwrap();
    sample
        .raw_input_image_mut()
        .current_provider_mut()
        .unwrap()
        .set_value("file-path", ParameterValue::Path("scans/a.tif".into()));

    let entries = [
        ("weight", ParameterValue::Double(21.5)),
        ("age", ParameterValue::Int(12)),
        ("note", ParameterValue::String("left kidney".into())),
    ];
    let custom = sample.custom_parameters_mut();
    for (key, value) in entries.into_iter().take(custom_count) {
        custom.add_parameter(key, value.field_type()).unwrap();
        custom.set_value(key, value);
    }
    sample
}

#[test_case(0 ; "no custom parameters")]
#[test_case(1 ; "one custom parameter")]
#[test_case(3 ; "mixed custom parameters")]
fn test_sample_document_text_is_stable(custom_count: usize) {
    let sample = annotated_sample(custom_count);
    let first = serde_json::to_string(&write_holder(&sample)).unwrap();

    let mut restored = Sample::new("A");
    restored.ensure_data_providers().unwrap();
    let document: serde_json::Value = serde_json::from_str(&first).unwrap();
    let skipped = read_holder(&mut restored, &document).unwrap();

    assert!(skipped.is_empty());
    assert_eq!(restored.custom_parameters().len(), custom_count);
    assert_eq!(serde_json::to_string(&write_holder(&restored)).unwrap(), first);
}

#[test]
fn test_bad_nested_collection_applies_nothing() {
    let mut sample = annotated_sample(1);
    let mut document = write_holder(&sample);
    document["sample-parameters"]["treatment"] = json!("treated");
    document["raw-input-image"]["file-path"] = json!("scans/b.tif");
    document["custom-parameters"]["parameters"]["scan"] =
        json!({ "field-type": "hyperstack", "value": 1 });

    let err = read_holder(&mut sample, &document).unwrap_err();

    assert_eq!(err.error_code(), "INVALID_DOCUMENT");
    assert_eq!(sample.sample_parameters().treatment(), "control");
    assert_eq!(
        sample
            .raw_input_image()
            .current_provider()
            .and_then(|p| p.get_value("file-path")),
        Some(ParameterValue::Path("scans/a.tif".into()))
    );
    assert_eq!(sample.custom_parameters().len(), 1);
}

// === Traversal Tests ===

#[test]
fn test_project_traversal_keys() {
    let project = sample_project();
    let traversed = TraversedParameters::traverse(&project);

    let keys: Vec<_> = traversed.keys().cloned().collect();
    assert_eq!(
        keys,
        vec![
            "clustering/clustering-hierarchy",
            "clustering/kmeans-k",
            "clustering/min-length",
            "postprocessing/auc-method",
        ]
    );
}

#[test]
fn test_sample_edit_through_traversal() {
    let mut project = sample_project();
    let sample = project.sample_mut("mouse-1").unwrap();
    let traversed = TraversedParameters::traverse(&*sample);

    assert!(traversed.contains_key("custom-parameters/weight"));
    assert!(traversed.set_value(
        &mut *sample,
        "sample-parameters/treatment",
        ParameterValue::String("treated".into())
    ));
    assert!(!traversed.set_value(
        &mut *sample,
        "custom-parameters/weight",
        ParameterValue::String("heavy".into())
    ));

    assert_eq!(sample.sample_parameters().treatment(), "treated");
}

// === Validity Tests ===

#[test]
fn test_validity_groups_by_sample() {
    let project = sample_project();
    let mut report = ValidityReport::new();
    project.report_validity(&mut report);

    assert!(!project.is_valid());
    let categories: Vec<_> = report
        .invalid_entries()
        .into_iter()
        .map(|(path, issue)| (path.join("/"), issue.message.clone()))
        .collect();
    assert_eq!(
        categories,
        vec![
            (
                "Samples/mouse-1/Raw input image/File path".to_string(),
                "No file selected!".to_string()
            ),
            (
                "Samples/mouse-1/Tissue ROI/File path".to_string(),
                "No file selected!".to_string()
            ),
            (
                "Samples/mouse-2/Raw input image".to_string(),
                "No data provider selected!".to_string()
            ),
            (
                "Samples/mouse-2/Tissue ROI".to_string(),
                "No data provider selected!".to_string()
            ),
        ]
    );
}

#[test]
fn test_duplicate_sample_copies_custom_parameters() {
    let mut project = sample_project();
    project.duplicate_sample("mouse-1", "mouse-3").unwrap();

    let copy = project.sample_mut("mouse-3").unwrap();
    assert_eq!(copy.name(), "mouse-3");
    copy.custom_parameters_mut()
        .set_value("weight", ParameterValue::Double(30.0));

    assert_eq!(
        project
            .sample("mouse-1")
            .map(Sample::custom_parameters)
            .and_then(|c| c.get_value("weight")),
        Some(ParameterValue::Double(21.5))
    );
}
