//! Postprocessing (AUC) conditions

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use super::ChoiceParameter;
use crate::parameters::{ParameterEvents, ParameterHolder, ParameterTable, StaticParameters};

/// How the area under curve is derived from the cluster abundances
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PostprocessingMethod {
    #[default]
    MaxPooling,
    MinPooling,
    AverageAuc,
}

impl ChoiceParameter for PostprocessingMethod {
    const ALL: &'static [Self] = &[
        PostprocessingMethod::MaxPooling,
        PostprocessingMethod::MinPooling,
        PostprocessingMethod::AverageAuc,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            PostprocessingMethod::MaxPooling => "MaxPooling",
            PostprocessingMethod::MinPooling => "MinPooling",
            PostprocessingMethod::AverageAuc => "AverageAuc",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            PostprocessingMethod::MaxPooling => "Max pooling",
            PostprocessingMethod::MinPooling => "Min pooling",
            PostprocessingMethod::AverageAuc => "Average AUC",
        }
    }
}

/// Conditions under which AUC data is generated
#[derive(Debug, Clone, Default)]
pub struct AucDataConditions {
    method: PostprocessingMethod,
    events: ParameterEvents,
}

impl AucDataConditions {
    pub fn new(method: PostprocessingMethod) -> Self {
        Self {
            method,
            events: ParameterEvents::new(),
        }
    }

    pub fn method(&self) -> PostprocessingMethod {
        self.method
    }

    pub fn set_method(&mut self, method: PostprocessingMethod) -> bool {
        self.set_value("auc-method", method.to_value())
    }
}

impl PartialEq for AucDataConditions {
    fn eq(&self, other: &Self) -> bool {
        self.method == other.method
    }
}

impl StaticParameters for AucDataConditions {
    fn parameter_table() -> &'static ParameterTable<Self> {
        static TABLE: OnceLock<ParameterTable<AucDataConditions>> = OnceLock::new();
        TABLE.get_or_init(|| {
            ParameterTable::<Self>::new().with(
                PostprocessingMethod::descriptor("auc-method").with_name("AUC generating method"),
                |c| c.method.to_value(),
                |c, v| match PostprocessingMethod::from_value(&v) {
                    Some(method) => {
                        c.method = method;
                        true
                    }
                    None => false,
                },
            )
        })
    }
}

impl ParameterHolder for AucDataConditions {
    crate::impl_static_parameters!();

    fn holder_name(&self) -> String {
        "Postprocessing".to_string()
    }

    fn events(&self) -> &ParameterEvents {
        &self.events
    }
}
