//! Samples
//!
//! A sample is one measured subject: its fixed parameters, user-defined
//! custom parameters and the data slots feeding the pipeline.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use super::ChoiceParameter;
use crate::data::{DataProvider, DataSlot, DataType, HyperstackData, RoiData};
use crate::error::{McatError, Result};
use crate::parameters::{
    DynamicParameterCollection, FieldType, ParameterDescriptor, ParameterEvents, ParameterHolder,
    ParameterTable, ParameterValue, StaticParameters,
};
use crate::validity::ValidityReport;

/// Stage of the pipeline the sample's input comes from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputType {
    #[default]
    RawData,
    PreprocessedData,
    ClusteredData,
}

impl ChoiceParameter for InputType {
    const ALL: &'static [Self] = &[
        InputType::RawData,
        InputType::PreprocessedData,
        InputType::ClusteredData,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            InputType::RawData => "RawData",
            InputType::PreprocessedData => "PreprocessedData",
            InputType::ClusteredData => "ClusteredData",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            InputType::RawData => "Raw data",
            InputType::PreprocessedData => "Preprocessed data",
            InputType::ClusteredData => "Clustered data",
        }
    }
}

/// Fixed per-sample settings
#[derive(Debug, Clone, Default)]
pub struct SampleParameters {
    treatment: String,
    input_type: InputType,
    events: ParameterEvents,
}

impl SampleParameters {
    pub fn treatment(&self) -> &str {
        &self.treatment
    }

    pub fn set_treatment(&mut self, treatment: impl Into<String>) -> bool {
        self.set_value("treatment", ParameterValue::String(treatment.into()))
    }

    pub fn input_type(&self) -> InputType {
        self.input_type
    }

    pub fn set_input_type(&mut self, input_type: InputType) -> bool {
        self.set_value("input-type", input_type.to_value())
    }
}

impl StaticParameters for SampleParameters {
    fn parameter_table() -> &'static ParameterTable<Self> {
        static TABLE: OnceLock<ParameterTable<SampleParameters>> = OnceLock::new();
        TABLE.get_or_init(|| {
            ParameterTable::<Self>::new()
                .with(
                    ParameterDescriptor::new("treatment", FieldType::String)
                        .with_name("Treatment")
                        .with_description("Samples sharing a treatment are clustered together"),
                    |s| ParameterValue::String(s.treatment.clone()),
                    |s, v| match v {
                        ParameterValue::String(treatment) => {
                            s.treatment = treatment;
                            true
                        }
                        _ => false,
                    },
                )
                .with(
                    InputType::descriptor("input-type").with_name("Input type"),
                    |s| s.input_type.to_value(),
                    |s, v| match InputType::from_value(&v) {
                        Some(input_type) => {
                            s.input_type = input_type;
                            true
                        }
                        None => false,
                    },
                )
        })
    }
}

impl ParameterHolder for SampleParameters {
    crate::impl_static_parameters!();

    fn holder_name(&self) -> String {
        "Sample parameters".to_string()
    }

    fn events(&self) -> &ParameterEvents {
        &self.events
    }
}

/// One measured subject of a project
#[derive(Debug, Clone)]
pub struct Sample {
    name: String,
    parameters: SampleParameters,
    custom_parameters: DynamicParameterCollection,
    raw_input_image: DataSlot<HyperstackData>,
    tissue_roi: DataSlot<RoiData>,
    events: ParameterEvents,
}

impl Sample {
    pub const SAMPLE_PARAMETERS: &'static str = "sample-parameters";
    pub const CUSTOM_PARAMETERS: &'static str = "custom-parameters";
    pub const RAW_INPUT_IMAGE: &'static str = "raw-input-image";
    pub const TISSUE_ROI: &'static str = "tissue-roi";

    /// Names of the data slots, in declared order
    pub const SLOTS: [&'static str; 2] = [Self::RAW_INPUT_IMAGE, Self::TISSUE_ROI];

    /// Sample with unbound slots and no custom parameters
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: SampleParameters::default(),
            custom_parameters: DynamicParameterCollection::unrestricted()
                .with_name("Custom parameters")
                .with_description("User-defined sample annotations"),
            raw_input_image: DataSlot::new(Self::RAW_INPUT_IMAGE),
            tissue_roi: DataSlot::new(Self::TISSUE_ROI),
            events: ParameterEvents::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renaming is owned by the project, which keeps names unique
    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn sample_parameters(&self) -> &SampleParameters {
        &self.parameters
    }

    pub fn sample_parameters_mut(&mut self) -> &mut SampleParameters {
        &mut self.parameters
    }

    pub fn custom_parameters(&self) -> &DynamicParameterCollection {
        &self.custom_parameters
    }

    pub fn custom_parameters_mut(&mut self) -> &mut DynamicParameterCollection {
        &mut self.custom_parameters
    }

    pub fn raw_input_image(&self) -> &DataSlot<HyperstackData> {
        &self.raw_input_image
    }

    pub fn raw_input_image_mut(&mut self) -> &mut DataSlot<HyperstackData> {
        &mut self.raw_input_image
    }

    pub fn tissue_roi(&self) -> &DataSlot<RoiData> {
        &self.tissue_roi
    }

    pub fn tissue_roi_mut(&mut self) -> &mut DataSlot<RoiData> {
        &mut self.tissue_roi
    }

    /// Bind the default provider of every unbound slot
    pub fn ensure_data_providers(&mut self) -> Result<()> {
        self.raw_input_image.ensure_data_provider()?;
        self.tissue_roi.ensure_data_provider()?;
        Ok(())
    }

    /// Bind a fresh provider of `kind` to the slot named `slot`
    pub fn bind_provider(&mut self, slot: &str, kind: &str) -> Result<()> {
        match slot {
            Self::RAW_INPUT_IMAGE => self
                .raw_input_image
                .bind(DataProvider::from_kind(kind, DataType::Hyperstack)?),
            Self::TISSUE_ROI => self
                .tissue_roi
                .bind(DataProvider::from_kind(kind, DataType::Roi)?),
            _ => Err(McatError::UnknownParameter {
                key: slot.to_string(),
            }),
        }
    }

    /// Kind of the provider bound to each slot, by slot name
    pub fn provider_kinds(&self) -> Vec<(&'static str, &'static str)> {
        let mut kinds = Vec::new();
        if let Some(provider) = self.raw_input_image.current_provider() {
            kinds.push((Self::RAW_INPUT_IMAGE, provider.kind_id()));
        }
        if let Some(provider) = self.tissue_roi.current_provider() {
            kinds.push((Self::TISSUE_ROI, provider.kind_id()));
        }
        kinds
    }

    /// Deep copy under another name, with fresh change buses throughout
    pub fn duplicate(&self, name: impl Into<String>) -> Self {
        let mut copy = self.clone();
        copy.name = name.into();
        copy
    }

    pub fn is_valid(&self) -> bool {
        self.raw_input_image.is_valid() && self.tissue_roi.is_valid()
    }

    pub fn report_validity(&self, report: &mut ValidityReport) {
        self.raw_input_image
            .report_validity(report.for_category("Raw input image"));
        self.tissue_roi.report_validity(report.for_category("Tissue ROI"));
    }
}

impl ParameterHolder for Sample {
    fn holder_name(&self) -> String {
        self.name.clone()
    }

    fn holder_description(&self) -> String {
        format!("Sample '{}'", self.name)
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
        let mut holders: Vec<(String, &dyn ParameterHolder)> = vec![
            (
                Self::SAMPLE_PARAMETERS.to_string(),
                &self.parameters as &dyn ParameterHolder,
            ),
            (
                Self::CUSTOM_PARAMETERS.to_string(),
                &self.custom_parameters as &dyn ParameterHolder,
            ),
        ];
        if let Some(provider) = self.raw_input_image.current_provider() {
            holders.push((Self::RAW_INPUT_IMAGE.to_string(), provider as &dyn ParameterHolder));
        }
        if let Some(provider) = self.tissue_roi.current_provider() {
            holders.push((Self::TISSUE_ROI.to_string(), provider as &dyn ParameterHolder));
        }
        holders
    }

    fn sub_holder_mut(&mut self, key: &str) -> Option<&mut dyn ParameterHolder> {
        match key {
            Self::SAMPLE_PARAMETERS => Some(&mut self.parameters),
            Self::CUSTOM_PARAMETERS => Some(&mut self.custom_parameters),
            Self::RAW_INPUT_IMAGE => self
                .raw_input_image
                .current_provider_mut()
                .map(|p| p as &mut dyn ParameterHolder),
            Self::TISSUE_ROI => self
                .tissue_roi
                .current_provider_mut()
                .map(|p| p as &mut dyn ParameterHolder),
            _ => None,
        }
    }
}
