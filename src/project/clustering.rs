//! Clustering parameters

use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use super::ChoiceParameter;
use crate::parameters::{
    holder_to_string, FieldType, ParameterDescriptor, ParameterEvents, ParameterHolder,
    ParameterTable, ParameterValue, StaticParameters,
};

/// Which samples are clustered together
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClusteringHierarchy {
    #[default]
    PerTreatment,
    PerSubject,
    AllInOne,
}

impl ChoiceParameter for ClusteringHierarchy {
    const ALL: &'static [Self] = &[
        ClusteringHierarchy::PerTreatment,
        ClusteringHierarchy::PerSubject,
        ClusteringHierarchy::AllInOne,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            ClusteringHierarchy::PerTreatment => "PerTreatment",
            ClusteringHierarchy::PerSubject => "PerSubject",
            ClusteringHierarchy::AllInOne => "AllInOne",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            ClusteringHierarchy::PerTreatment => "Per treatment",
            ClusteringHierarchy::PerSubject => "Per subject",
            ClusteringHierarchy::AllInOne => "All in one",
        }
    }
}

/// Settings of the k-means clustering step
#[derive(Debug, Clone)]
pub struct ClusteringParameters {
    clustering_hierarchy: ClusteringHierarchy,
    kmeans_k: i32,
    min_length: i32,
    events: ParameterEvents,
}

impl ClusteringParameters {
    pub fn new() -> Self {
        Self {
            clustering_hierarchy: ClusteringHierarchy::default(),
            kmeans_k: 5,
            min_length: i32::MAX,
            events: ParameterEvents::new(),
        }
    }

    pub fn clustering_hierarchy(&self) -> ClusteringHierarchy {
        self.clustering_hierarchy
    }

    pub fn set_clustering_hierarchy(&mut self, hierarchy: ClusteringHierarchy) -> bool {
        self.set_value("clustering-hierarchy", hierarchy.to_value())
    }

    pub fn kmeans_k(&self) -> i32 {
        self.kmeans_k
    }

    /// Refuses `k <= 0`
    pub fn set_kmeans_k(&mut self, k: i32) -> bool {
        self.set_value("kmeans-k", ParameterValue::from(k))
    }

    pub fn min_length(&self) -> i32 {
        self.min_length
    }

    pub fn set_min_length(&mut self, min_length: i32) -> bool {
        self.set_value("min-length", ParameterValue::from(min_length))
    }
}

impl Default for ClusteringParameters {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for ClusteringParameters {
    fn eq(&self, other: &Self) -> bool {
        self.clustering_hierarchy == other.clustering_hierarchy
            && self.kmeans_k == other.kmeans_k
            && self.min_length == other.min_length
    }
}

impl StaticParameters for ClusteringParameters {
    fn parameter_table() -> &'static ParameterTable<Self> {
        static TABLE: OnceLock<ParameterTable<ClusteringParameters>> = OnceLock::new();
        TABLE.get_or_init(|| {
            ParameterTable::<Self>::new()
                .with(
                    ClusteringHierarchy::descriptor("clustering-hierarchy")
                        .with_name("Clustering hierarchy")
                        .with_short_key("ch"),
                    |p| p.clustering_hierarchy.to_value(),
                    |p, v| match ClusteringHierarchy::from_value(&v) {
                        Some(hierarchy) => {
                            p.clustering_hierarchy = hierarchy;
                            true
                        }
                        None => false,
                    },
                )
                .with(
                    ParameterDescriptor::new("kmeans-k", FieldType::Int)
                        .with_name("K-Means groups (K)")
                        .with_short_key("k"),
                    |p| ParameterValue::from(p.kmeans_k),
                    |p, v| match v.as_int().and_then(|k| i32::try_from(k).ok()) {
                        Some(k) if k > 0 => {
                            p.kmeans_k = k;
                            true
                        }
                        _ => false,
                    },
                )
                .with(
                    ParameterDescriptor::new("min-length", FieldType::Int)
                        .with_name("Minimum length")
                        .with_short_key("mlength"),
                    |p| ParameterValue::from(p.min_length),
                    |p, v| match v.as_int().and_then(|l| i32::try_from(l).ok()) {
                        Some(min_length) => {
                            p.min_length = min_length;
                            true
                        }
                        None => false,
                    },
                )
        })
    }
}

impl ParameterHolder for ClusteringParameters {
    crate::impl_static_parameters!();

    fn holder_name(&self) -> String {
        "Clustering".to_string()
    }

    fn events(&self) -> &ParameterEvents {
        &self.events
    }
}

impl fmt::Display for ClusteringParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&holder_to_string(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::ChangeKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_defaults() {
        let params = ClusteringParameters::new();
        assert_eq!(params.kmeans_k(), 5);
        assert_eq!(params.min_length(), i32::MAX);
        assert_eq!(params.clustering_hierarchy(), ClusteringHierarchy::PerTreatment);
    }

    #[test]
    fn test_non_positive_k_is_rejected() {
        let mut params = ClusteringParameters::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        params
            .events()
            .subscribe(move |e| sink.borrow_mut().push((e.kind, e.key.clone())));

        assert!(!params.set_kmeans_k(0));
        assert!(!params.set_kmeans_k(-3));
        assert!(log.borrow().is_empty());
        assert_eq!(params.kmeans_k(), 5);

        assert!(params.set_kmeans_k(8));
        assert_eq!(
            *log.borrow(),
            vec![(ChangeKind::ValueChanged, Some("kmeans-k".to_string()))]
        );
    }

    #[test]
    fn test_out_of_range_int_is_rejected() {
        let mut params = ClusteringParameters::new();
        assert!(!params.set_value("min-length", ParameterValue::Int(i64::from(i32::MAX) + 1)));
        assert_eq!(params.min_length(), i32::MAX);
    }

    #[test]
    fn test_unknown_hierarchy_is_rejected() {
        let mut params = ClusteringParameters::new();
        assert!(!params.set_value("clustering-hierarchy", ParameterValue::Enum("PerPixel".into())));
        assert!(params.set_clustering_hierarchy(ClusteringHierarchy::AllInOne));
        assert_eq!(params.clustering_hierarchy(), ClusteringHierarchy::AllInOne);
    }

    #[test]
    fn test_compact_string_uses_short_keys() {
        let mut params = ClusteringParameters::new();
        params.set_min_length(100);
        assert_eq!(params.to_string(), "ch=PerTreatment,k=5,mlength=100");
    }

    #[test]
    fn test_equality_ignores_subscribers() {
        let params = ClusteringParameters::new();
        params.events().subscribe(|_| {});
        assert_eq!(params, params.clone());
    }
}
