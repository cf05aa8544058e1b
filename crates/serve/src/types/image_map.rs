// crates/serve/src/types/image_map.rs

use async_trait::async_trait;
use domain::{content::ContentView, property::Property};
use serde_json::{json, Map as JsonMap, Value as Json};
use std::sync::Arc;

use super::{is_blank, json_i64};
use crate::{
    backend::MediaManager,
    ctx::ResolveAttributes,
    resolver::{ContentTypeResolver, ResolveContext},
    serializer::MediaSerializer,
    Error, Result,
};

/// `{imageId, hotspots: [{type, hotspot, ...child values}]}`.
///
/// Each hotspot's child values are resolved through the registry with the
/// child properties of its hotspot type and written back under the same
/// keys; every other key of the hotspot is kept as is.
pub struct ImageMapResolver {
    media: Arc<dyn MediaManager>,
    serializer: MediaSerializer,
}

impl ImageMapResolver {
    pub fn new(media: Arc<dyn MediaManager>, serializer: MediaSerializer) -> Self {
        Self { media, serializer }
    }
}

#[async_trait]
impl ContentTypeResolver for ImageMapResolver {
    fn content_type(&self) -> &'static str {
        "image_map"
    }

    async fn resolve(
        &self,
        data: &Json,
        property: &Property,
        locale: &str,
        attributes: &ResolveAttributes,
        cx: &ResolveContext<'_>,
    ) -> Result<ContentView> {
        let raw_image = data.get("imageId").unwrap_or(&Json::Null);
        let image_id = if is_blank(raw_image) {
            None
        } else {
            Some(json_i64(raw_image).ok_or_else(|| {
                Error::invalid_value(
                    property.content_type.clone(),
                    format!("image id `{raw_image}` is not numeric"),
                )
            })?)
        };

        let image = match image_id {
            Some(id) => {
                let media = self.media.get_by_id(id, locale).await?;
                self.serializer.serialize(&media)?
            }
            None => Json::Null,
        };

        let hotspots = data
            .get("hotspots")
            .and_then(Json::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let mut hotspot_contents = Vec::with_capacity(hotspots.len());
        let mut hotspot_views = Vec::with_capacity(hotspots.len());

        for hotspot in hotspots {
            let hotspot_type = hotspot
                .get("type")
                .and_then(Json::as_str)
                .unwrap_or_default();

            let template = property.init_properties(hotspot_type).ok_or_else(|| {
                Error::UnknownHotspotType {
                    property: property.name.clone(),
                    hotspot_type: hotspot_type.to_string(),
                }
            })?;

            let mut content = hotspot.as_object().cloned().unwrap_or_default();
            let mut view = JsonMap::new();

            for child in template.properties {
                let value = hotspot.get(&child.name).cloned().unwrap_or(Json::Null);
                let child = child.with_value(value);

                let cv = cx.resolve(&child.value, &child, locale, attributes).await?;
                let (child_content, child_view) = cv.into_parts();
                content.insert(child.name.clone(), child_content);
                view.insert(child.name, child_view);
            }

            hotspot_contents.push(Json::Object(content));
            hotspot_views.push(Json::Object(view));
        }

        Ok(ContentView::new(
            json!({ "image": image, "hotspots": hotspot_contents }),
            json!({ "imageId": image_id, "hotspots": hotspot_views }),
        ))
    }
}
