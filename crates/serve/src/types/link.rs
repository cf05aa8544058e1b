// crates/serve/src/types/link.rs

use async_trait::async_trait;
use domain::{content::ContentView, property::Property};
use serde_json::{Map as JsonMap, Value as Json};
use std::sync::Arc;

use crate::{
    backend::LinkProviderPool,
    ctx::ResolveAttributes,
    resolver::{ContentTypeResolver, ResolveContext},
    Error, Result,
};

pub const EXTERNAL_PROVIDER: &str = "external";

/// Reads `{provider, locale, href, target?, title?, anchor?}` from the
/// property value; `data` is not used.
pub struct LinkResolver {
    providers: Arc<dyn LinkProviderPool>,
}

impl LinkResolver {
    pub fn new(providers: Arc<dyn LinkProviderPool>) -> Self {
        Self { providers }
    }
}

#[async_trait]
impl ContentTypeResolver for LinkResolver {
    fn content_type(&self) -> &'static str {
        "link"
    }

    async fn resolve(
        &self,
        _data: &Json,
        property: &Property,
        locale: &str,
        attributes: &ResolveAttributes,
        _cx: &ResolveContext<'_>,
    ) -> Result<ContentView> {
        let Some(value) = property.value.as_object().filter(|v| !v.is_empty()) else {
            return Ok(ContentView::empty());
        };

        let field = |key: &str| value.get(key).filter(|v| !v.is_null());

        let mut view = JsonMap::new();
        view.insert("provider".into(), field("provider").cloned().unwrap_or(Json::Null));
        view.insert("locale".into(), field("locale").cloned().unwrap_or(Json::Null));
        for key in ["target", "title"] {
            if let Some(v) = field(key) {
                view.insert(key.into(), v.clone());
            }
        }

        let provider = field("provider").and_then(Json::as_str).unwrap_or_default();
        let href = field("href").and_then(Json::as_str).unwrap_or_default();

        if provider == EXTERNAL_PROVIDER {
            return Ok(ContentView::new(Json::String(href.to_string()), view));
        }

        let link_provider = self
            .providers
            .provider(provider)
            .ok_or_else(|| Error::LinkProviderNotFound(provider.to_string()))?;

        let items = link_provider
            .preload(&[href.to_string()], locale, !attributes.preview)
            .await?;

        let Some(item) = items.into_iter().next() else {
            return Ok(ContentView::new(Json::Null, view));
        };

        let mut url = item.url;
        if let Some(anchor) = field("anchor").and_then(Json::as_str).filter(|a| !a.is_empty()) {
            url.push('#');
            url.push_str(anchor);
        }

        Ok(ContentView::new(Json::String(url), view))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::{MockLinkProvider, MockLinkProviderPool},
        resolver::ContentResolver,
    };
    use domain::entity::LinkItem;
    use serde_json::json;

    fn registry(pool: MockLinkProviderPool) -> ContentResolver {
        ContentResolver::builder()
            .register(Arc::new(LinkResolver::new(Arc::new(pool))))
            .build()
    }

    fn link(value: Json) -> Property {
        Property::new("link", "link").with_value(value)
    }

    #[tokio::test]
    async fn external_link_skips_pool() {
        let mut pool = MockLinkProviderPool::new();
        pool.expect_provider().never();

        let property = link(json!({ "provider": "external", "href": "https://x.com" }));
        let cv = registry(pool)
            .resolve(&Json::Null, &property, "en", &ResolveAttributes::new())
            .await
            .expect("resolve");

        assert_eq!(cv.content(), &json!("https://x.com"));
        assert_eq!(cv.view(), &json!({ "provider": "external", "locale": null }));
    }

    #[tokio::test]
    async fn internal_link_uses_first_preloaded_url_and_anchor() {
        let mut provider = MockLinkProvider::new();
        provider
            .expect_preload()
            .withf(|hrefs, locale, published| hrefs == ["p-1"] && locale == "en" && *published)
            .times(1)
            .returning(|_, _, _| {
                Ok(vec![LinkItem {
                    id: "p-1".into(),
                    url: "/about".into(),
                    ..Default::default()
                }])
            });
        let provider: Arc<dyn crate::backend::LinkProvider> = Arc::new(provider);

        let mut pool = MockLinkProviderPool::new();
        pool.expect_provider()
            .withf(|key| key == "page")
            .return_const(Some(provider));

        let property = link(json!({
            "provider": "page",
            "locale": "en",
            "href": "p-1",
            "anchor": "team",
            "target": "_blank",
            "title": "About us"
        }));
        let cv = registry(pool)
            .resolve(&Json::Null, &property, "en", &ResolveAttributes::new())
            .await
            .expect("resolve");

        assert_eq!(cv.content(), &json!("/about#team"));
        assert_eq!(
            cv.view(),
            &json!({ "provider": "page", "locale": "en", "target": "_blank", "title": "About us" })
        );
    }

    #[tokio::test]
    async fn unresolvable_target_is_null() {
        let mut provider = MockLinkProvider::new();
        provider.expect_preload().returning(|_, _, _| Ok(vec![]));
        let provider: Arc<dyn crate::backend::LinkProvider> = Arc::new(provider);

        let mut pool = MockLinkProviderPool::new();
        pool.expect_provider().return_const(Some(provider));

        let property = link(json!({ "provider": "page", "locale": "en", "href": "gone" }));
        let cv = registry(pool)
            .resolve(&Json::Null, &property, "en", &ResolveAttributes::new())
            .await
            .expect("resolve");

        assert!(cv.content().is_null());
        assert_eq!(cv.view(), &json!({ "provider": "page", "locale": "en" }));
    }

    #[tokio::test]
    async fn unknown_provider_is_an_error() {
        let mut pool = MockLinkProviderPool::new();
        pool.expect_provider().return_const(None);

        let property = link(json!({ "provider": "article", "href": "a-1" }));
        let err = registry(pool)
            .resolve(&Json::Null, &property, "en", &ResolveAttributes::new())
            .await
            .expect_err("unknown");
        assert!(matches!(err, Error::LinkProviderNotFound(key) if key == "article"));
    }

    #[tokio::test]
    async fn empty_value_is_null() {
        let mut pool = MockLinkProviderPool::new();
        pool.expect_provider().never();

        let cv = registry(pool)
            .resolve(&Json::Null, &Property::new("link", "link"), "en", &ResolveAttributes::new())
            .await
            .expect("resolve");
        assert_eq!(cv, ContentView::empty());
    }
}
