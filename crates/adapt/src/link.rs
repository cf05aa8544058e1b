// crates/adapt/src/link.rs

//! Link providers for `link` properties and `<sulu-link>` markup.

use async_trait::async_trait;
use domain::entity::LinkItem;
use serve::backend::{BackendResult, LinkProvider, LinkProviderPool};
use std::{collections::HashMap, sync::Arc};

use crate::store::InMemoryBackend;

pub const PAGE_PROVIDER: &str = "page";
pub const MEDIA_PROVIDER: &str = "media";

/// Links to pages by uuid; the URL is the page's resource locator.
pub struct PageLinkProvider {
    backend: Arc<InMemoryBackend>,
}

impl PageLinkProvider {
    pub fn new(backend: Arc<InMemoryBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl LinkProvider for PageLinkProvider {
    async fn preload(
        &self,
        hrefs: &[String],
        locale: &str,
        published: bool,
    ) -> BackendResult<Vec<LinkItem>> {
        Ok(hrefs
            .iter()
            .filter_map(|href| {
                let pages = self.backend.pages();
                pages.iter().find(|r| r.uuid() == href && r.locale() == locale)
            })
            .filter(|r| !published || r.published)
            .filter_map(|r| {
                Some(LinkItem {
                    id: r.uuid().to_string(),
                    title: r.title().unwrap_or_default().to_string(),
                    url: r.structure.resource_locator()?,
                    published: r.published,
                })
            })
            .collect())
    }
}

/// Links to media by id; the URL is the media's own URL.
pub struct MediaLinkProvider {
    backend: Arc<InMemoryBackend>,
}

impl MediaLinkProvider {
    pub fn new(backend: Arc<InMemoryBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl LinkProvider for MediaLinkProvider {
    async fn preload(
        &self,
        hrefs: &[String],
        _locale: &str,
        _published: bool,
    ) -> BackendResult<Vec<LinkItem>> {
        Ok(hrefs
            .iter()
            .filter_map(|href| href.parse::<i64>().ok())
            .filter_map(|id| self.backend.media_items().find(|m| m.id == id))
            .map(|m| LinkItem {
                id: m.id.to_string(),
                title: m.title.clone().unwrap_or_else(|| m.name.clone()),
                url: m
                    .url
                    .clone()
                    .unwrap_or_else(|| format!("/media/{}/download/{}", m.id, m.name)),
                published: true,
            })
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryLinkProviderPool {
    providers: HashMap<String, Arc<dyn LinkProvider>>,
}

impl InMemoryLinkProviderPool {
    /// `page` and `media` providers over `backend`.
    pub fn new(backend: Arc<InMemoryBackend>) -> Self {
        Self::default()
            .with_provider(PAGE_PROVIDER, Arc::new(PageLinkProvider::new(backend.clone())))
            .with_provider(MEDIA_PROVIDER, Arc::new(MediaLinkProvider::new(backend)))
    }

    pub fn with_provider(mut self, key: impl Into<String>, provider: Arc<dyn LinkProvider>) -> Self {
        self.providers.insert(key.into(), provider);
        self
    }
}

impl LinkProviderPool for InMemoryLinkProviderPool {
    fn provider(&self, key: &str) -> Option<Arc<dyn LinkProvider>> {
        self.providers.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::Fixture;
    use serde_json::json;

    fn pool() -> InMemoryLinkProviderPool {
        let fixture: Fixture = serde_json::from_value(json!({
            "media": [
                { "id": 3, "name": "doc.pdf" },
                { "id": 4, "name": "pic.jpg", "title": "Picture", "url": "/uploads/pic.jpg" }
            ],
            "pages": [
                { "uuid": "about", "template": "default",
                  "properties": [
                      { "name": "title", "type": "text_line", "value": "About" },
                      { "name": "url", "type": "resource_locator", "value": "/about" }
                  ] },
                { "uuid": "draft", "template": "default", "published": false,
                  "properties": [{ "name": "url", "type": "resource_locator", "value": "/draft" }] }
            ]
        }))
        .expect("fixture");
        let backend = InMemoryBackend::from_fixture(&fixture, "example").expect("backend");
        InMemoryLinkProviderPool::new(Arc::new(backend))
    }

    #[tokio::test]
    async fn page_links_respect_publication() {
        let pages = pool().provider(PAGE_PROVIDER).expect("page provider");

        let hrefs = vec!["about".to_string(), "draft".to_string(), "nope".to_string()];
        let published = pages.preload(&hrefs, "en", true).await.expect("preload");
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].url, "/about");
        assert_eq!(published[0].title, "About");

        let preview = pages.preload(&hrefs, "en", false).await.expect("preload");
        assert_eq!(preview.iter().map(|l| l.url.as_str()).collect::<Vec<_>>(), vec!["/about", "/draft"]);
    }

    #[tokio::test]
    async fn media_links_fall_back_to_download_url() {
        let media = pool().provider(MEDIA_PROVIDER).expect("media provider");
        let links = media
            .preload(&["3".into(), "4".into(), "x".into()], "en", true)
            .await
            .expect("preload");
        assert_eq!(links[0].url, "/media/3/download/doc.pdf");
        assert_eq!(links[1].url, "/uploads/pic.jpg");
        assert_eq!(links[1].title, "Picture");
    }

    #[test]
    fn unknown_provider_is_none() {
        assert!(pool().provider("article").is_none());
    }
}
