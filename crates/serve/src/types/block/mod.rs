// crates/serve/src/types/block/mod.rs

pub mod visitor;

use async_trait::async_trait;
use domain::{content::ContentView, property::Property};
use serde_json::{Map as JsonMap, Value as Json};
use std::sync::Arc;
use tracing::debug;

use self::visitor::BlockVisitor;
use crate::{
    ctx::ResolveAttributes,
    resolver::{ContentTypeResolver, ResolveContext},
    Result,
};

/// Walks the block instances of the property itself; `data` is unused.
///
/// `content[i]` is `{type, settings, ...child contents}` and `view[i]` is
/// `{...child views}` for every instance that passed all visitors.
pub struct BlockResolver {
    visitors: Vec<Arc<dyn BlockVisitor>>,
}

impl BlockResolver {
    pub fn new(visitors: Vec<Arc<dyn BlockVisitor>>) -> Self {
        Self { visitors }
    }
}

impl Default for BlockResolver {
    fn default() -> Self {
        Self::new(visitor::default_visitors())
    }
}

#[async_trait]
impl ContentTypeResolver for BlockResolver {
    fn content_type(&self) -> &'static str {
        "block"
    }

    async fn resolve(
        &self,
        _data: &Json,
        property: &Property,
        locale: &str,
        attributes: &ResolveAttributes,
        cx: &ResolveContext<'_>,
    ) -> Result<ContentView> {
        let mut content = Vec::with_capacity(property.length());
        let mut view = Vec::with_capacity(property.length());

        for index in 0..property.length() {
            let Some(instance) = property.properties_at(index) else {
                continue;
            };

            let mut block = Some(instance.clone());
            for visitor in &self.visitors {
                block = block.and_then(|b| visitor.visit(b, attributes));
            }
            let Some(block) = block else {
                debug!(property = %property.name, index, "block instance dropped by visitor");
                continue;
            };

            let mut block_content = JsonMap::new();
            let mut block_view = JsonMap::new();
            block_content.insert("type".into(), Json::String(block.name.clone()));
            block_content.insert("settings".into(), block.settings.clone());

            for child in &block.properties {
                let cv = cx.resolve(&child.value, child, locale, attributes).await?;
                let (child_content, child_view) = cv.into_parts();
                block_content.insert(child.name.clone(), child_content);
                block_view.insert(child.name.clone(), child_view);
            }

            content.push(Json::Object(block_content));
            view.push(Json::Object(block_view));
        }

        Ok(ContentView::new(content, view))
    }
}
