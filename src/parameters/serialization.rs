//! JSON documents for parameter holders
//!
//! Static parameters are written under their key and nested holders under
//! their path segment. A dynamic collection is written as
//!
//! ```json
//! { "parameters": { "<key>": { "field-type": "int", "name": "...", "value": 3 } } }
//! ```
//!
//! Maps are key-sorted, so writing the same tree twice yields identical text.

use log::warn;
use serde_json::{json, Map, Value};

use super::descriptor::{FieldType, ParameterDescriptor, Visibility};
use super::dynamic::{DynamicParameter, DynamicParameterCollection};
use super::holder::ParameterHolder;
use super::traversal::{qualify, TraversedParameter, TraversedParameters};
use super::value::ParameterValue;
use crate::error::{McatError, Result};

const DYNAMIC_PARAMETERS: &str = "parameters";

/// Serialize `holder` and everything nested below it
pub fn write_holder(holder: &dyn ParameterHolder) -> Value {
    let mut document = Map::new();

    if let Some(collection) = holder.as_dynamic() {
        document.insert(DYNAMIC_PARAMETERS.to_string(), write_dynamic(collection));
    } else {
        for descriptor in holder.parameters() {
            let value = holder
                .read_parameter(&descriptor.key)
                .unwrap_or_else(|| descriptor.field_type.zero_value());
            document.insert(descriptor.key.clone(), value.to_json());
        }
    }

    for (key, child) in holder.sub_holders() {
        document.insert(key, write_holder(child));
    }

    Value::Object(document)
}

fn write_dynamic(collection: &DynamicParameterCollection) -> Value {
    let mut entries = Map::new();
    for parameter in collection.iter() {
        let descriptor = &parameter.descriptor;
        let mut entry = json!({
            "field-type": descriptor.field_type.as_str(),
            "name": descriptor.name,
            "description": descriptor.description,
            "short-key": descriptor.short_key,
            "visibility": descriptor.visibility,
            "priority": descriptor.priority,
            "value": parameter.value().to_json(),
        });
        if !descriptor.choices.is_empty() {
            entry["choices"] = json!(descriptor.choices);
        }
        entries.insert(descriptor.key.clone(), entry);
    }
    Value::Object(entries)
}

/// Apply `document` to `holder` and everything nested below it.
///
/// Parameters are applied in priority order, highest first, before nested
/// holders. Keys that do not exist or whose value is refused are skipped,
/// logged and returned as qualified keys. A malformed dynamic collection
/// anywhere in the tree fails the read before anything is applied.
pub fn read_holder(holder: &mut dyn ParameterHolder, document: &Value) -> Result<Vec<String>> {
    check_document(&*holder, document, &[])?;

    let mut skipped = Vec::new();
    read_into(holder, document, &[], &mut skipped)?;
    Ok(skipped)
}

fn as_object<'v>(document: &'v Value, path: &[String]) -> Result<&'v Map<String, Value>> {
    document.as_object().ok_or_else(|| McatError::InvalidDocument {
        reason: format!("'{}' is not an object", display_path(path)),
    })
}

/// Structural checks for every dynamic collection that `document` would replace
fn check_document(holder: &dyn ParameterHolder, document: &Value, path: &[String]) -> Result<()> {
    let object = as_object(document, path)?;

    if let Some(collection) = holder.as_dynamic() {
        if let Some(entries) = object.get(DYNAMIC_PARAMETERS) {
            collection.check_entries(&read_dynamic(entries, path)?)?;
        }
    }

    for (key, child) in holder.sub_holders() {
        let Some(child_document) = object.get(&key) else {
            continue;
        };
        let mut child_path = path.to_vec();
        child_path.push(key);
        check_document(child, child_document, &child_path)?;
    }
    Ok(())
}

fn read_into(
    holder: &mut dyn ParameterHolder,
    document: &Value,
    path: &[String],
    skipped: &mut Vec<String>,
) -> Result<()> {
    let object = as_object(document, path)?;

    let children: Vec<String> = holder.sub_holders().into_iter().map(|(key, _)| key).collect();
    let is_dynamic = holder.as_dynamic().is_some();
    let mut descriptors = if is_dynamic {
        Vec::new()
    } else {
        holder.parameters()
    };
    descriptors.sort_by(|a, b| b.priority.total_cmp(&a.priority));

    let mut known: Vec<&str> = children.iter().map(String::as_str).collect();
    known.extend(descriptors.iter().map(|d| d.key.as_str()));

    if let Some(collection) = holder.as_dynamic_mut() {
        known.push(DYNAMIC_PARAMETERS);
        if let Some(entries) = object.get(DYNAMIC_PARAMETERS) {
            let parameters = read_dynamic(entries, path)?;
            collection.replace_entries(parameters)?;
        }
    }

    for descriptor in &descriptors {
        let Some(json) = object.get(&descriptor.key) else {
            continue;
        };
        let applied = ParameterValue::from_json(descriptor.field_type, json)
            .map(|value| holder.set_value(&descriptor.key, value))
            .unwrap_or(false);
        if !applied {
            let key = qualify(path, &descriptor.key);
            warn!("Could not apply stored value {} to '{}'", json, key);
            skipped.push(key);
        }
    }

    for key in object.keys() {
        if !known.contains(&key.as_str()) {
            let key = qualify(path, key);
            warn!("Unknown parameter '{}' in document", key);
            skipped.push(key);
        }
    }

    for child in &children {
        let Some(child_document) = object.get(child) else {
            continue;
        };
        if let Some(child_holder) = holder.sub_holder_mut(child) {
            let mut child_path = path.to_vec();
            child_path.push(child.clone());
            read_into(child_holder, child_document, &child_path, skipped)?;
        }
    }

    Ok(())
}

fn read_dynamic(entries: &Value, path: &[String]) -> Result<Vec<DynamicParameter>> {
    let entries = entries.as_object().ok_or_else(|| McatError::InvalidDocument {
        reason: format!("parameters of '{}' are not an object", display_path(path)),
    })?;

    let mut parameters = Vec::with_capacity(entries.len());
    for (key, entry) in entries {
        let invalid = |reason: &str| McatError::InvalidDocument {
            reason: format!("'{}': {}", qualify(path, key), reason),
        };

        let tag = entry
            .get("field-type")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid("missing field type"))?;
        let field_type =
            FieldType::from_tag(tag).ok_or_else(|| invalid(&format!("unknown field type '{}'", tag)))?;

        let text = |name: &str| {
            entry
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let visibility: Visibility = match entry.get("visibility") {
            Some(v) => serde_json::from_value(v.clone()).map_err(|_| invalid("bad visibility"))?,
            None => Visibility::default(),
        };
        let choices: Vec<String> = match entry.get("choices") {
            Some(v) => serde_json::from_value(v.clone()).map_err(|_| invalid("bad choices"))?,
            None => Vec::new(),
        };

        let priority = match entry.get("priority") {
            Some(v) => v.as_f64().ok_or_else(|| invalid("bad priority"))?,
            None => 0.0,
        };

        let mut descriptor = ParameterDescriptor::new(key.clone(), field_type)
            .with_description(text("description"))
            .with_short_key(text("short-key"))
            .with_visibility(visibility)
            .with_priority(priority)
            .with_choices(choices);
        if let Some(name) = entry.get("name").and_then(Value::as_str) {
            descriptor.name = name.to_string();
        }

        let parameter = match entry.get("value") {
            Some(json) => {
                let value = ParameterValue::from_json(field_type, json)
                    .ok_or_else(|| invalid("value does not match its field type"))?;
                DynamicParameter::with_value(descriptor, value)?
            }
            None => DynamicParameter::from_descriptor(descriptor),
        };
        parameters.push(parameter);
    }
    Ok(parameters)
}

fn display_path(path: &[String]) -> String {
    if path.is_empty() {
        "<root>".to_string()
    } else {
        path.join("/")
    }
}

/// Compact `short=value` rendering, used for labels and file names
pub fn parameters_to_string<'p>(
    parameters: impl IntoIterator<Item = &'p TraversedParameter>,
    element_separator: &str,
    value_separator: &str,
) -> String {
    parameters
        .into_iter()
        .map(|p| {
            format!(
                "{}{}{}",
                p.descriptor.short_key_or_key(),
                value_separator,
                p.value
            )
        })
        .collect::<Vec<_>>()
        .join(element_separator)
}

/// [`parameters_to_string`] over every parameter below `holder`
pub fn holder_to_string(holder: &dyn ParameterHolder) -> String {
    parameters_to_string(TraversedParameters::traverse(holder).values(), ",", "=")
}
