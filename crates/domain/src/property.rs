// crates/domain/src/property.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as Json};
use std::collections::BTreeMap;

// ─────────────────────────────────────────────────────────────────────────────
// Property parameters
// ─────────────────────────────────────────────────────────────────────────────

/// Template-declared parameter attached to a property (`provider`,
/// `max_per_page`, `properties`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyParameter {
    pub name: String,
    pub value: ParameterValue,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl PropertyParameter {
    pub fn new(name: impl Into<String>, value: impl Into<Json>) -> Self {
        Self {
            name: name.into(),
            value: ParameterValue::Scalar(value.into()),
            kind: None,
        }
    }

    pub fn collection(name: impl Into<String>, items: Vec<PropertyParameter>) -> Self {
        Self {
            name: name.into(),
            value: ParameterValue::Collection(items),
            kind: Some("collection".to_string()),
        }
    }
}

/// Either a plain value or a nested, ordered list of parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Collection(Vec<PropertyParameter>),
    Scalar(Json),
}

impl ParameterValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParameterValue::Scalar(Json::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Accepts booleans and the strings `"true"` / `"false"`.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParameterValue::Scalar(Json::Bool(b)) => Some(*b),
            ParameterValue::Scalar(Json::String(s)) => match s.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Accepts integers and numeric strings.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParameterValue::Scalar(Json::Number(n)) => n.as_i64(),
            ParameterValue::Scalar(Json::String(s)) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&[PropertyParameter]> {
        match self {
            ParameterValue::Collection(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Collections become `{name: value}` objects.
    pub fn to_json(&self) -> Json {
        match self {
            ParameterValue::Scalar(v) => v.clone(),
            ParameterValue::Collection(items) => {
                let mut obj = JsonMap::new();
                for item in items {
                    obj.insert(item.name.clone(), item.value.to_json());
                }
                Json::Object(obj)
            }
        }
    }
}

/// Ordered parameter list of a property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyParams(Vec<PropertyParameter>);

impl PropertyParams {
    pub fn new(params: Vec<PropertyParameter>) -> Self {
        Self(params)
    }

    pub fn get(&self, name: &str) -> Option<&PropertyParameter> {
        self.0.iter().find(|p| p.name == name)
    }

    pub fn str_value(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|p| p.value.as_str())
    }

    pub fn bool_value(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(|p| p.value.as_bool())
    }

    pub fn i64_value(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(|p| p.value.as_i64())
    }

    pub fn iter(&self) -> impl Iterator<Item = &PropertyParameter> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn insert(&mut self, param: PropertyParameter) {
        match self.0.iter_mut().find(|p| p.name == param.name) {
            Some(existing) => *existing = param,
            None => self.0.push(param),
        }
    }

    /// `defaults` overridden by the parameters declared on `self`.
    pub fn with_defaults(&self, defaults: &[PropertyParameter]) -> PropertyParams {
        let mut merged = PropertyParams(defaults.to_vec());
        for param in &self.0 {
            merged.insert(param.clone());
        }
        merged
    }

    /// `{name: value}` view of all parameters.
    pub fn to_json(&self) -> Json {
        ParameterValue::Collection(self.0.clone()).to_json()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Property descriptors
// ─────────────────────────────────────────────────────────────────────────────

/// A named group of child properties: one block instance, or the child
/// property template of one hotspot type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyType {
    pub name: String,
    #[serde(default = "empty_object")]
    pub settings: Json,
    #[serde(default)]
    pub properties: Vec<Property>,
}

impl PropertyType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            settings: empty_object(),
            properties: Vec::new(),
        }
    }

    pub fn with_settings(mut self, settings: Json) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    pub fn setting(&self, key: &str) -> Option<&Json> {
        self.settings.get(key)
    }
}

fn empty_object() -> Json {
    Json::Object(JsonMap::new())
}

/// Shape of a property beyond its raw value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    #[default]
    Simple,

    /// Ordered, typed block instances, each carrying its own child values.
    Block { instances: Vec<PropertyType> },

    /// Hotspot types available to an image map, keyed by type name.
    /// Child properties here are templates without values.
    ImageMap { types: BTreeMap<String, PropertyType> },

    /// Visual grouping of properties inside a template.
    Section { properties: Vec<Property> },
}

/// A named, typed slot on a structure.
///
/// Properties are immutable descriptors: re-resolving a child with a
/// different value goes through [`Property::with_value`] on a clone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(default)]
    pub value: Json,
    #[serde(default)]
    pub params: PropertyParams,
    #[serde(default)]
    pub kind: PropertyKind,
}

impl Property {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            value: Json::Null,
            params: PropertyParams::default(),
            kind: PropertyKind::Simple,
        }
    }

    pub fn with_value(mut self, value: impl Into<Json>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_param(mut self, param: PropertyParameter) -> Self {
        self.params.insert(param);
        self
    }

    pub fn with_params(mut self, params: PropertyParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_kind(mut self, kind: PropertyKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn param(&self, name: &str) -> Option<&PropertyParameter> {
        self.params.get(name)
    }

    /// Number of block instances; zero for non-block properties.
    pub fn length(&self) -> usize {
        match &self.kind {
            PropertyKind::Block { instances } => instances.len(),
            _ => 0,
        }
    }

    /// Block instance at `index`.
    pub fn properties_at(&self, index: usize) -> Option<&PropertyType> {
        match &self.kind {
            PropertyKind::Block { instances } => instances.get(index),
            _ => None,
        }
    }

    /// Fresh child property descriptors for a hotspot of `hotspot_type`.
    pub fn init_properties(&self, hotspot_type: &str) -> Option<PropertyType> {
        match &self.kind {
            PropertyKind::ImageMap { types } => types.get(hotspot_type).cloned(),
            _ => None,
        }
    }

    /// Children of a section, if this property is one.
    pub fn section_properties(&self) -> Option<&[Property]> {
        match &self.kind {
            PropertyKind::Section { properties } => Some(properties.as_slice()),
            _ => None,
        }
    }
}
