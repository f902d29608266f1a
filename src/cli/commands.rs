//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command. Every command loads the
//! project document, works on it through the parameter registry and writes
//! it back when something changed.

use std::path::Path;

use anyhow::{bail, Context, Result};
use log::{info, warn};

use crate::data::DataType;
use crate::parameters::{
    holder_to_string, FieldType, ParameterHolder, ParameterTypeRegistry, ParameterValue,
    TraversedParameters,
};
use crate::project::{Project, Sample};
use crate::validity::ValidityReport;

fn load(path: &Path) -> Result<Project> {
    Project::load(path).with_context(|| format!("Failed to load project {}", path.display()))
}

fn save(project: &mut Project, path: &Path) -> Result<()> {
    project
        .save(path)
        .with_context(|| format!("Failed to save project {}", path.display()))
}

fn parse_field_type(tag: &str) -> Result<FieldType> {
    FieldType::from_tag(tag).with_context(|| {
        let known: Vec<_> = FieldType::ALL.iter().map(FieldType::as_str).collect();
        format!("Unknown field type '{}' (expected one of {})", tag, known.join(", "))
    })
}

/// Create a new, empty project file.
pub fn create_project(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists, use --force to overwrite it", path.display());
    }

    info!("Creating new project at: {}", path.display());
    let mut project = Project::new();
    save(&mut project, path)?;

    println!("Project created: {}", path.display());
    println!("Project id: {}", project.id());
    Ok(())
}

fn set_slot_file(sample: &mut Sample, slot: &str, data_type: DataType, file: &Path) -> Result<()> {
    if !file.exists() {
        warn!("{} does not exist yet", file.display());
    }
    if !data_type.accepts_file(file) {
        warn!(
            "{} does not look like {} data (expected {})",
            file.display(),
            data_type,
            data_type.file_extensions().join(", ")
        );
    }
    let provider = sample
        .sub_holder_mut(slot)
        .with_context(|| format!("Slot '{}' has no data provider", slot))?;
    provider.try_set_value("file-path", ParameterValue::Path(file.to_path_buf()))?;
    Ok(())
}

/// Add a sample, binding the default provider of each data slot.
pub fn add_sample(
    path: &Path,
    name: &str,
    treatment: Option<&str>,
    raw_image: Option<&Path>,
    roi: Option<&Path>,
) -> Result<()> {
    let mut project = load(path)?;

    let sample = project.add_sample(name)?;
    sample.ensure_data_providers()?;
    if let Some(treatment) = treatment {
        sample.sample_parameters_mut().set_treatment(treatment);
    }
    if let Some(file) = raw_image {
        let data_type = sample.raw_input_image().data_type();
        set_slot_file(sample, Sample::RAW_INPUT_IMAGE, data_type, file)?;
    }
    if let Some(file) = roi {
        let data_type = sample.tissue_roi().data_type();
        set_slot_file(sample, Sample::TISSUE_ROI, data_type, file)?;
    }

    save(&mut project, path)?;
    println!("Sample added: {}", name);
    Ok(())
}

fn print_parameters(root: &dyn ParameterHolder, all: bool) {
    let registry = ParameterTypeRegistry::with_defaults();
    let traversed = TraversedParameters::traverse(root);

    for source in traversed.sources() {
        let entries: Vec<_> = traversed
            .parameters_of(source)
            .filter(|p| all || p.visible)
            .collect();
        if entries.is_empty() {
            continue;
        }

        if source.path.is_empty() {
            println!("{}", source.name);
        } else {
            println!("{} ({})", source.name, source.path.join("/"));
        }
        println!("{:-<60}", "");

        for parameter in entries {
            let rendered = match registry.create_editor_for(&parameter.descriptor) {
                Some(mut editor) => {
                    editor.reload(&parameter.value);
                    if editor.is_label_enabled() {
                        format!("{:<28} {}", parameter.descriptor.name, editor.render())
                    } else {
                        editor.render()
                    }
                }
                None => format!("{:<28} {}", parameter.descriptor.name, parameter.value),
            };
            println!("  {:<56} {}", rendered, parameter.qualified_key());
        }
        println!();
    }
}

/// Print the parameters of the project settings or of one sample.
pub fn show(path: &Path, sample: Option<&str>, all: bool) -> Result<()> {
    let project = load(path)?;

    match sample {
        Some(name) => {
            let sample = project
                .sample(name)
                .with_context(|| format!("Sample not found: {}", name))?;
            print_parameters(sample, all);
        }
        None => {
            println!("Project {} ({} samples)", project.id(), project.sample_names().len());
            println!("Last modified: {}", project.modified_at());
            println!();
            print_parameters(&project, all);
        }
    }
    Ok(())
}

/// Set one parameter, addressed by its qualified key.
pub fn set_parameter(path: &Path, key: &str, input: &str, sample: Option<&str>) -> Result<()> {
    let mut project = load(path)?;

    let value = {
        let root: &mut dyn ParameterHolder = match sample {
            Some(name) => project.require_sample_mut(name)? as &mut dyn ParameterHolder,
            None => &mut project as &mut dyn ParameterHolder,
        };

        let traversed = TraversedParameters::traverse(&*root);
        let entry = traversed
            .get(key)
            .with_context(|| format!("Unknown parameter '{}'", key))?;
        let value = ParameterValue::parse(entry.descriptor.field_type, input)?;

        let mut access = traversed
            .access(&mut *root, key)
            .with_context(|| format!("Parameter '{}' is no longer reachable", key))?;
        access
            .try_set(value.clone())
            .with_context(|| format!("Cannot set '{}' to '{}'", key, input))?;
        value
    };

    save(&mut project, path)?;
    println!("{} = {}", key, value);
    Ok(())
}

/// Add a custom parameter to a sample.
pub fn add_parameter(
    path: &Path,
    sample: &str,
    key: &str,
    field_type: &str,
    input: Option<&str>,
) -> Result<()> {
    let field_type = parse_field_type(field_type)?;
    let mut project = load(path)?;

    let custom = project.require_sample_mut(sample)?.custom_parameters_mut();
    if !custom.allow_user_modification() {
        bail!("Custom parameters of '{}' cannot be modified", sample);
    }
    custom.add_parameter(key, field_type)?;
    if let Some(input) = input {
        custom.try_set_value(key, ParameterValue::parse(field_type, input)?)?;
    }

    save(&mut project, path)?;
    println!("Parameter added: {}/{}/{} ({})", sample, Sample::CUSTOM_PARAMETERS, key, field_type);
    Ok(())
}

/// Print the validity report; returns whether the project is valid.
pub fn validate(path: &Path) -> Result<bool> {
    let project = load(path)?;

    let mut report = ValidityReport::new();
    project.report_validity(&mut report);

    if report.is_valid() {
        println!("Project is valid.");
        return Ok(true);
    }

    let count = report.invalid_entries().len();
    println!("Found {} problem(s):", count);
    println!("{:-<60}", "");
    print!("{}", report);
    Ok(false)
}

/// Print a generated value sequence.
pub fn generate(field_type: &str, from: &str, to: &str, step: &str, generator: &str) -> Result<()> {
    let field_type = parse_field_type(field_type)?;
    let registry = ParameterTypeRegistry::with_defaults();

    let mut instance = registry.create_generator(field_type, generator).with_context(|| {
        let names: Vec<_> = registry
            .generators_for(field_type)
            .into_iter()
            .map(|d| d.name.clone())
            .collect();
        format!(
            "No generator '{}' for {} (available: {})",
            generator,
            field_type,
            names.join(", ")
        )
    })?;

    for (key, input) in [("from", from), ("to", to), ("step", step)] {
        instance
            .try_set_value(key, ParameterValue::parse(field_type, input)?)
            .with_context(|| format!("Invalid generator setting {}={}", key, input))?;
    }

    let values: Vec<_> = instance.generate()?.iter().map(ToString::to_string).collect();
    println!("{}", values.join(" "));
    Ok(())
}

/// Print the compact label of the clustering settings or of one sample.
pub fn label(path: &Path, sample: Option<&str>) -> Result<()> {
    let project = load(path)?;

    let label = match sample {
        Some(name) => {
            let sample = project
                .sample(name)
                .with_context(|| format!("Sample not found: {}", name))?;
            holder_to_string(sample)
        }
        None => project.clustering().to_string(),
    };

    println!("{}", label);
    Ok(())
}
