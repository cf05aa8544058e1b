// crates/serve/src/types/text_editor.rs

use async_trait::async_trait;
use domain::{content::ContentView, property::Property};
use serde_json::Value as Json;
use std::sync::Arc;

use crate::{
    backend::MarkupParser,
    ctx::ResolveAttributes,
    resolver::{ContentTypeResolver, ResolveContext},
    Error, Result,
};

pub struct TextEditorResolver {
    markup: Arc<dyn MarkupParser>,
}

impl TextEditorResolver {
    pub fn new(markup: Arc<dyn MarkupParser>) -> Self {
        Self { markup }
    }
}

#[async_trait]
impl ContentTypeResolver for TextEditorResolver {
    fn content_type(&self) -> &'static str {
        "text_editor"
    }

    async fn resolve(
        &self,
        data: &Json,
        property: &Property,
        locale: &str,
        _attributes: &ResolveAttributes,
        _cx: &ResolveContext<'_>,
    ) -> Result<ContentView> {
        match data {
            Json::Null => Ok(ContentView::empty()),
            Json::String(html) => {
                let html = self.markup.parse(html, locale).await?;
                Ok(ContentView::content_only(html))
            }
            other => Err(Error::invalid_value(
                property.content_type.clone(),
                format!("expected markup string, got {other}"),
            )),
        }
    }
}
