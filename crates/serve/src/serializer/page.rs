// crates/serve/src/serializer/page.rs

use domain::{property::PropertyParams, structure::Structure};
use serde_json::Value as Json;

use crate::{
    ctx::ResolveAttributes, resolver::ResolveContext, structure::resolve_structure_properties,
    Result,
};

/// Pages referenced from other content resolve a small property map
/// instead of the full template.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageSerializer;

impl PageSerializer {
    /// `title` and `url` plus the entries of the `properties` parameter,
    /// later entries overriding earlier keys.
    pub fn property_map(params: &PropertyParams) -> Vec<(String, String)> {
        let mut map: Vec<(String, String)> = vec![
            ("title".into(), "title".into()),
            ("url".into(), "url".into()),
        ];

        let extra = params
            .get("properties")
            .and_then(|p| p.value.as_collection())
            .unwrap_or_default();

        for param in extra {
            let Some(source) = param.value.as_str() else {
                continue;
            };
            match map.iter_mut().find(|(key, _)| *key == param.name) {
                Some(entry) => entry.1 = source.to_string(),
                None => map.push((param.name.clone(), source.to_string())),
            }
        }

        map
    }

    /// Names of plain template properties in `map`, for query hints.
    pub fn property_names(map: &[(String, String)]) -> Vec<String> {
        map.iter()
            .filter(|(_, source)| !source.contains('.'))
            .map(|(_, source)| source.clone())
            .collect()
    }

    pub async fn serialize(
        &self,
        cx: &ResolveContext<'_>,
        structure: &Structure,
        property_map: &[(String, String)],
        locale: &str,
        attributes: &ResolveAttributes,
    ) -> Result<Json> {
        resolve_structure_properties(cx, structure, property_map, locale, false, attributes)
            .await?
            .to_json()
    }
}
