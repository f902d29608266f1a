//! Parameter traversal
//!
//! Flattens a holder tree into one addressable parameter set. Qualified keys
//! join the holder path and the local key with `/`; parameters of the root
//! holder are unprefixed.

use std::collections::{BTreeMap, HashSet};

use log::warn;

use super::access::{AccessKind, ParameterAccess};
use super::descriptor::ParameterDescriptor;
use super::holder::{resolve_holder_mut, ParameterHolder};
use super::value::ParameterValue;

/// Separator between path segments of a qualified key
pub const PATH_SEPARATOR: char = '/';

/// Join a holder path and a local key
pub fn qualify(path: &[String], key: &str) -> String {
    if path.is_empty() {
        return key.to_string();
    }
    let mut qualified = path.join("/");
    qualified.push(PATH_SEPARATOR);
    qualified.push_str(key);
    qualified
}

/// One parameter found during traversal
#[derive(Debug, Clone, PartialEq)]
pub struct TraversedParameter {
    /// Path of the owning holder below the root
    pub path: Vec<String>,
    pub descriptor: ParameterDescriptor,
    /// Value at traversal time
    pub value: ParameterValue,
    pub kind: AccessKind,
    /// Display name of the owning holder
    pub source_name: String,
    /// Effective visibility at this depth
    pub visible: bool,
}

impl TraversedParameter {
    pub fn key(&self) -> &str {
        &self.descriptor.key
    }

    pub fn qualified_key(&self) -> String {
        qualify(&self.path, &self.descriptor.key)
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }
}

/// A holder that contributed parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSource {
    pub path: Vec<String>,
    pub name: String,
    pub description: String,
    pub kind: AccessKind,
    /// Whether users may add or remove parameters (dynamic sources only)
    pub user_modifiable: bool,
    /// Qualified keys, in the holder's declared order
    pub keys: Vec<String>,
}

/// Flattened, source-grouped view of a holder tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraversedParameters {
    entries: BTreeMap<String, TraversedParameter>,
    sources: Vec<ParameterSource>,
}

impl TraversedParameters {
    /// Walk `root` depth-first.
    ///
    /// Each holder contributes its own parameters, then its sub-holders in
    /// declared order. A holder reached a second time is skipped.
    pub fn traverse(root: &dyn ParameterHolder) -> Self {
        let mut result = Self::default();
        let mut visited = HashSet::new();
        result.visit(root, Vec::new(), &mut visited);

        if result.sources.len() > 1 {
            result.sources[1..].sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.path.cmp(&b.path)));
        }
        result
    }

    fn visit(&mut self, holder: &dyn ParameterHolder, path: Vec<String>, visited: &mut HashSet<usize>) {
        if !visited.insert(holder.events().channel_id()) {
            warn!(
                "Holder '{}' reached twice while traversing, skipping '{}'",
                holder.holder_name(),
                path.join("/")
            );
            return;
        }

        let depth = path.len();
        let kind = holder.access_kind();
        let source_name = holder.holder_name();
        let mut keys = Vec::new();

        for descriptor in holder.parameters() {
            let value = holder
                .read_parameter(&descriptor.key)
                .unwrap_or_else(|| descriptor.field_type.zero_value());
            let entry = TraversedParameter {
                path: path.clone(),
                visible: descriptor.visibility.is_visible_at(depth),
                descriptor,
                value,
                kind,
                source_name: source_name.clone(),
            };
            let qualified = entry.qualified_key();
            keys.push(qualified.clone());
            self.entries.insert(qualified, entry);
        }

        self.sources.push(ParameterSource {
            path: path.clone(),
            name: source_name,
            description: holder.holder_description(),
            kind,
            user_modifiable: holder
                .as_dynamic()
                .map(|d| d.allow_user_modification())
                .unwrap_or(false),
            keys,
        });

        for (segment, child) in holder.sub_holders() {
            let mut child_path = path.clone();
            child_path.push(segment);
            self.visit(child, child_path, visited);
        }
    }

    pub fn get(&self, qualified_key: &str) -> Option<&TraversedParameter> {
        self.entries.get(qualified_key)
    }

    pub fn contains_key(&self, qualified_key: &str) -> bool {
        self.entries.contains_key(qualified_key)
    }

    /// Entries in qualified-key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &TraversedParameter)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &TraversedParameter> {
        self.entries.values()
    }

    /// Entries a user should see
    pub fn visible(&self) -> impl Iterator<Item = &TraversedParameter> {
        self.entries.values().filter(|p| p.visible)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Contributing holders: root first, then by display name and path
    pub fn sources(&self) -> &[ParameterSource] {
        &self.sources
    }

    /// Parameters of one source, in the holder's declared order
    pub fn parameters_of<'s>(
        &'s self,
        source: &'s ParameterSource,
    ) -> impl Iterator<Item = &'s TraversedParameter> + 's {
        source.keys.iter().filter_map(|key| self.entries.get(key))
    }

    /// Live access to a traversed parameter, resolved from the same `root`
    pub fn access<'a>(
        &self,
        root: &'a mut dyn ParameterHolder,
        qualified_key: &str,
    ) -> Option<ParameterAccess<'a>> {
        let entry = self.entries.get(qualified_key)?;
        let holder = resolve_holder_mut(root, &entry.path)?;
        ParameterAccess::new(holder, &entry.descriptor.key)
    }

    /// Write through to the holder under `root`; false if unknown or rejected
    pub fn set_value(
        &self,
        root: &mut dyn ParameterHolder,
        qualified_key: &str,
        value: ParameterValue,
    ) -> bool {
        match self.access(root, qualified_key) {
            Some(mut access) => access.set(value),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::{
        DynamicParameterCollection, FieldType, ParameterEvents, ParameterTable, StaticParameters,
        Visibility,
    };
    use std::sync::OnceLock;

    #[derive(Default)]
    struct Leaf {
        gain: f64,
        secret: String,
        events: ParameterEvents,
    }

    impl StaticParameters for Leaf {
        fn parameter_table() -> &'static ParameterTable<Self> {
            static TABLE: OnceLock<ParameterTable<Leaf>> = OnceLock::new();
            TABLE.get_or_init(|| {
                ParameterTable::<Leaf>::new()
                    .with(
                        ParameterDescriptor::new("gain", FieldType::Double).with_short_key("g"),
                        |l| ParameterValue::Double(l.gain),
                        |l, v| match v.as_double() {
                            Some(gain) => {
                                l.gain = gain;
                                true
                            }
                            None => false,
                        },
                    )
                    .with(
                        ParameterDescriptor::new("secret", FieldType::String)
                            .with_visibility(Visibility::Visible),
                        |l| ParameterValue::String(l.secret.clone()),
                        |l, v| match v {
                            ParameterValue::String(s) => {
                                l.secret = s;
                                true
                            }
                            _ => false,
                        },
                    )
            })
        }
    }

    impl ParameterHolder for Leaf {
        crate::impl_static_parameters!();

        fn holder_name(&self) -> String {
            "Leaf".to_string()
        }

        fn events(&self) -> &ParameterEvents {
            &self.events
        }
    }

    struct Root {
        leaf: Leaf,
        custom: DynamicParameterCollection,
        events: ParameterEvents,
    }

    impl Root {
        fn new() -> Self {
            let mut custom = DynamicParameterCollection::unrestricted().with_name("Custom");
            custom.add_parameter("gain", FieldType::Int).unwrap();
            Self {
                leaf: Leaf::default(),
                custom,
                events: ParameterEvents::new(),
            }
        }
    }

    impl ParameterHolder for Root {
        fn holder_name(&self) -> String {
            "Root".to_string()
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
                ("leaf".to_string(), &self.leaf as &dyn ParameterHolder),
                ("custom".to_string(), &self.custom as &dyn ParameterHolder),
            ]
        }

        fn sub_holder_mut(&mut self, key: &str) -> Option<&mut dyn ParameterHolder> {
            match key {
                "leaf" => Some(&mut self.leaf),
                "custom" => Some(&mut self.custom),
                _ => None,
            }
        }
    }

    #[test]
    fn test_same_key_disambiguated_by_path() {
        let root = Root::new();
        let traversed = TraversedParameters::traverse(&root);

        let keys: Vec<_> = traversed.keys().cloned().collect();
        assert_eq!(keys, vec!["custom/gain", "leaf/gain", "leaf/secret"]);
        assert_eq!(traversed.get("custom/gain").unwrap().kind, AccessKind::Dynamic);
        assert_eq!(traversed.get("leaf/gain").unwrap().kind, AccessKind::Static);
    }

    #[test]
    fn test_sources_root_first_then_by_name() {
        let root = Root::new();
        let traversed = TraversedParameters::traverse(&root);

        let names: Vec<_> = traversed.sources().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Root", "Custom", "Leaf"]);
        assert!(traversed.sources()[1].user_modifiable);

        let leaf = &traversed.sources()[2];
        let leaf_keys: Vec<_> = traversed.parameters_of(leaf).map(|p| p.key()).collect();
        assert_eq!(leaf_keys, vec!["gain", "secret"]);
    }

    #[test]
    fn test_traversal_is_idempotent() {
        let root = Root::new();
        assert_eq!(
            TraversedParameters::traverse(&root),
            TraversedParameters::traverse(&root)
        );
    }

    #[test]
    fn test_visible_only_at_root() {
        let root = Root::new();
        let traversed = TraversedParameters::traverse(&root);
        assert!(!traversed.get("leaf/secret").unwrap().visible);
        assert_eq!(traversed.visible().count(), 2);

        let leaf = Leaf::default();
        let traversed = TraversedParameters::traverse(&leaf);
        assert!(traversed.get("secret").unwrap().visible);
    }

    #[test]
    fn test_write_through_access() {
        let mut root = Root::new();
        let traversed = TraversedParameters::traverse(&root);

        assert!(traversed.set_value(&mut root, "leaf/gain", ParameterValue::Int(2)));
        assert!(traversed.set_value(&mut root, "custom/gain", ParameterValue::Int(4)));
        assert!(!traversed.set_value(&mut root, "custom/gain", ParameterValue::Bool(true)));
        assert!(!traversed.set_value(&mut root, "nowhere", ParameterValue::Int(1)));

        approx::assert_relative_eq!(root.leaf.gain, 2.0);
        assert_eq!(root.custom.get_value("gain"), Some(ParameterValue::Int(4)));
    }

    struct Looping {
        inner: Leaf,
        events: ParameterEvents,
    }

    impl ParameterHolder for Looping {
        fn holder_name(&self) -> String {
            "Looping".to_string()
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
                ("a".to_string(), &self.inner as &dyn ParameterHolder),
                ("b".to_string(), &self.inner as &dyn ParameterHolder),
            ]
        }
    }

    #[test]
    fn test_holder_reached_twice_is_skipped() {
        let looping = Looping {
            inner: Leaf::default(),
            events: ParameterEvents::new(),
        };
        let traversed = TraversedParameters::traverse(&looping);

        assert!(traversed.contains_key("a/gain"));
        assert!(!traversed.contains_key("b/gain"));
        assert_eq!(traversed.sources().len(), 2);
    }
}
