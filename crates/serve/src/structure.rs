// crates/serve/src/structure.rs

//! Whole-structure resolution.
//!
//! Walks the properties of a page or snippet through the registry and
//! assembles the resolved document: content and view trees plus the
//! metadata of the underlying document.

use chrono::{DateTime, Utc};
use domain::{
    content::ContentView,
    structure::{Redirect, Structure},
};
use serde::Serialize;
use serde_json::{Map as JsonMap, Value as Json};
use std::{collections::HashSet, sync::Arc};
use tracing::debug;

use crate::{
    ctx::ResolveAttributes,
    resolver::{ContentResolver, ResolveContext},
    Error, Result,
};

/// Extension keys that need their own resolution and are left out for now.
const STRIPPED_EXTENSION_KEYS: &[&str] = &[
    "categories",
    "tags",
    "icon",
    "images",
    "audience_targeting_groups",
];

// ─────────────────────────────────────────────────────────────────────────────
// Resolved document
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedDocument {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub template: String,
    pub content: JsonMap<String, Json>,
    pub view: JsonMap<String, Json>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<JsonMap<String, Json>>,
    pub author: Option<i64>,
    pub authored: Option<DateTime<Utc>>,
    pub changer: Option<i64>,
    pub changed: Option<DateTime<Utc>>,
    pub creator: Option<i64>,
    pub created: Option<DateTime<Utc>>,
}

impl ResolvedDocument {
    fn insert(&mut self, key: String, cv: ContentView) {
        let (content, view) = cv.into_parts();
        self.content.insert(key.clone(), content);
        self.view.insert(key, view);
    }

    pub fn to_json(&self) -> Result<Json> {
        Ok(serde_json::to_value(self)?)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Structure resolver
// ─────────────────────────────────────────────────────────────────────────────

/// Entry point for callers holding a loaded structure.
#[derive(Debug, Clone)]
pub struct StructureResolver {
    resolver: Arc<ContentResolver>,
}

impl StructureResolver {
    pub fn new(resolver: Arc<ContentResolver>) -> Self {
        Self { resolver }
    }

    pub fn registry(&self) -> &ContentResolver {
        &self.resolver
    }

    pub async fn resolve(
        &self,
        structure: &Structure,
        locale: &str,
        include_extension: bool,
    ) -> Result<ResolvedDocument> {
        self.resolve_in(structure, locale, include_extension, &ResolveAttributes::new())
            .await
    }

    /// Like [`Self::resolve`] with request-level attributes (query, segment,
    /// preview) applied to every property.
    #[tracing::instrument(skip_all, fields(uuid = %structure.uuid, locale = %locale))]
    pub async fn resolve_in(
        &self,
        structure: &Structure,
        locale: &str,
        include_extension: bool,
        base: &ResolveAttributes,
    ) -> Result<ResolvedDocument> {
        let cx = self.resolver.context();
        resolve_structure(&cx, structure, locale, include_extension, base).await
    }

    pub async fn resolve_properties(
        &self,
        structure: &Structure,
        property_map: &[(String, String)],
        locale: &str,
        include_extension: bool,
    ) -> Result<ResolvedDocument> {
        let cx = self.resolver.context();
        resolve_structure_properties(
            &cx,
            structure,
            property_map,
            locale,
            include_extension,
            &ResolveAttributes::new(),
        )
        .await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Nested entry points (used by page/snippet selections and providers)
// ─────────────────────────────────────────────────────────────────────────────

pub async fn resolve_structure(
    cx: &ResolveContext<'_>,
    structure: &Structure,
    locale: &str,
    include_extension: bool,
    base: &ResolveAttributes,
) -> Result<ResolvedDocument> {
    let target = redirect_target(structure)?;
    let attributes = property_attributes(structure, base);
    let mut document = document_metadata(structure, target, include_extension);

    for property in target.properties(true) {
        let cv = cx
            .resolve(&property.value, property, locale, &attributes)
            .await?;
        document.insert(property.name.clone(), cv);
    }

    Ok(document)
}

/// Resolves only the properties in `property_map`, written under their
/// target keys. A source of the form `extension.key` reads raw extension
/// data instead of a template property.
pub async fn resolve_structure_properties(
    cx: &ResolveContext<'_>,
    structure: &Structure,
    property_map: &[(String, String)],
    locale: &str,
    include_extension: bool,
    base: &ResolveAttributes,
) -> Result<ResolvedDocument> {
    let target = redirect_target(structure)?;
    let attributes = property_attributes(structure, base);
    let mut document = document_metadata(structure, target, include_extension);

    for (target_key, source) in property_map {
        let cv = match source.split_once('.') {
            Some((extension, key)) => ContentView::content_only(
                target
                    .extension(extension)
                    .and_then(|data| data.get(key))
                    .cloned()
                    .unwrap_or(Json::Null),
            ),
            None => {
                let Some(property) = target.property(source) else {
                    debug!(property = %source, template = %target.key, "property not in template, skipped");
                    continue;
                };
                cx.resolve(&property.value, property, locale, &attributes)
                    .await?
            }
        };
        document.insert(target_key.clone(), cv);
    }

    Ok(document)
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Follows internal redirects to the structure whose content is shown.
fn redirect_target(structure: &Structure) -> Result<&Structure> {
    let mut seen = HashSet::new();
    seen.insert(structure.uuid.as_str());

    let mut target = structure;
    while let Some(Redirect::Internal(next)) = &target.redirect {
        if !seen.insert(next.uuid.as_str()) {
            return Err(Error::RedirectLoop(next.uuid.clone()));
        }
        target = next;
    }

    Ok(target)
}

fn property_attributes(structure: &Structure, base: &ResolveAttributes) -> ResolveAttributes {
    let mut attributes = base
        .clone()
        .with_structure_uuid(structure.uuid.clone())
        .with_resource_locator(structure.resource_locator_override());

    if !structure.webspace_key.is_empty() {
        attributes = attributes.with_webspace(structure.webspace_key.clone());
    }

    attributes
}

fn document_metadata(
    requested: &Structure,
    target: &Structure,
    include_extension: bool,
) -> ResolvedDocument {
    let authorship = target.document.authorship();
    let audit = target.document.audit();

    ResolvedDocument {
        id: requested.uuid.clone(),
        kind: target.kind.as_str().to_string(),
        template: target.key.clone(),
        content: JsonMap::new(),
        view: JsonMap::new(),
        extension: include_extension.then(|| extension_data(target)),
        author: authorship.and_then(|a| a.author()),
        authored: authorship.and_then(|a| a.authored()),
        changer: audit.and_then(|a| a.changer()),
        changed: audit.and_then(|a| a.changed()),
        creator: audit.and_then(|a| a.creator()),
        created: audit.and_then(|a| a.created()),
    }
}

fn extension_data(structure: &Structure) -> JsonMap<String, Json> {
    structure
        .extensions
        .iter()
        .map(|(name, data)| {
            let mut data = data.clone();
            for key in STRIPPED_EXTENSION_KEYS {
                data.remove(*key);
            }
            (name.clone(), Json::Object(data))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::ContentTypeResolver;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use domain::{
        property::Property,
        structure::{PageDocument, SnippetDocument},
    };
    use serde_json::json;

    /// Uppercases strings and records the attributes it was handed.
    struct Upper;

    #[async_trait]
    impl ContentTypeResolver for Upper {
        fn content_type(&self) -> &'static str {
            "upper"
        }

        async fn resolve(
            &self,
            data: &Json,
            _property: &Property,
            _locale: &str,
            attributes: &ResolveAttributes,
            _cx: &ResolveContext<'_>,
        ) -> Result<ContentView> {
            Ok(ContentView::new(
                json!(data.as_str().unwrap_or_default().to_uppercase()),
                json!({
                    "uuid": attributes.structure_uuid,
                    "webspace": attributes.webspace_key,
                    "url": attributes.resource_locator,
                }),
            ))
        }
    }

    fn resolver() -> StructureResolver {
        StructureResolver::new(Arc::new(
            ContentResolver::builder().register(Arc::new(Upper)).build(),
        ))
    }

    fn excerpt() -> JsonMap<String, Json> {
        json!({
            "title": "Excerpt title",
            "tags": ["a"],
            "categories": [1],
            "icon": [],
            "images": [],
            "audience_targeting_groups": [],
            "description": "d"
        })
        .as_object()
        .cloned()
        .unwrap_or_default()
    }

    fn page() -> Structure {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).single().expect("valid");
        Structure::page("p-1", "default")
            .with_webspace("example")
            .with_locale("en")
            .with_property(Property::new("title", "upper").with_value("hello"))
            .with_property(Property::new("url", "resource_locator").with_value("/hello"))
            .with_extension("excerpt", excerpt())
            .with_document(Arc::new(PageDocument {
                author: Some(1),
                authored: Some(at),
                created: Some(at),
                ..PageDocument::default()
            }))
    }

    #[tokio::test]
    async fn resolves_every_property_with_metadata() {
        let doc = resolver().resolve(&page(), "en", false).await.expect("resolve");

        assert_eq!(doc.id, "p-1");
        assert_eq!(doc.kind, "page");
        assert_eq!(doc.template, "default");
        assert_eq!(doc.content["title"], json!("HELLO"));
        assert_eq!(doc.content["url"], json!("/hello"));
        assert_eq!(doc.view["title"]["uuid"], json!("p-1"));
        assert_eq!(doc.view["title"]["webspace"], json!("example"));
        assert_eq!(doc.author, Some(1));

        let out = doc.to_json().expect("json");
        assert!(out.get("extension").is_none());
        assert_eq!(out["authored"], json!("2024-01-02T03:04:05Z"));
        assert!(out["changer"].is_null());
    }

    #[tokio::test]
    async fn extension_strips_unresolved_keys() {
        let doc = resolver().resolve(&page(), "en", true).await.expect("resolve");
        let ext = doc.extension.expect("extension");

        assert_eq!(
            Json::Object(ext),
            json!({ "excerpt": { "title": "Excerpt title", "description": "d" } })
        );
    }

    #[tokio::test]
    async fn snippet_documents_have_no_authorship() {
        let snippet = Structure::snippet("s-1", "hotel")
            .with_document(Arc::new(SnippetDocument::default()));

        let doc = resolver().resolve(&snippet, "en", false).await.expect("resolve");
        assert_eq!(doc.kind, "snippet");
        assert!(doc.author.is_none());
        assert!(doc.content.is_empty());
    }

    #[tokio::test]
    async fn resolve_properties_maps_keys_and_extensions() {
        let map = vec![
            ("headline".to_string(), "title".to_string()),
            ("excerptTitle".to_string(), "excerpt.title".to_string()),
            ("missing".to_string(), "nope".to_string()),
            ("seoTitle".to_string(), "seo.title".to_string()),
        ];

        let doc = resolver()
            .resolve_properties(&page(), &map, "en", false)
            .await
            .expect("resolve");

        assert_eq!(doc.content["headline"], json!("HELLO"));
        assert_eq!(doc.content["excerptTitle"], json!("Excerpt title"));
        assert_eq!(doc.view["excerptTitle"], json!({}));
        assert!(doc.content["seoTitle"].is_null());
        assert!(!doc.content.contains_key("missing"));
        assert!(!doc.content.contains_key("url"));
    }

    #[tokio::test]
    async fn internal_redirect_shows_target_under_requested_id() {
        let link = Structure::page("link-1", "default")
            .with_webspace("example")
            .with_redirect(Redirect::Internal(Box::new(page())));

        let doc = resolver().resolve(&link, "en", false).await.expect("resolve");

        assert_eq!(doc.id, "link-1");
        assert_eq!(doc.content["title"], json!("HELLO"));
        assert_eq!(doc.view["title"]["url"], json!("/hello"));
    }

    #[tokio::test]
    async fn redirect_loop_is_an_error() {
        let inner = Structure::page("a", "default")
            .with_redirect(Redirect::Internal(Box::new(Structure::page("b", "default"))));
        let outer = Structure::page("b", "default").with_redirect(Redirect::Internal(Box::new(inner)));

        let err = resolver().resolve(&outer, "en", false).await.expect_err("loop");
        assert!(matches!(err, Error::RedirectLoop(uuid) if uuid == "b"));
    }
}
