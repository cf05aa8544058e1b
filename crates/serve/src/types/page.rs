// crates/serve/src/types/page.rs

use async_trait::async_trait;
use domain::{
    content::ContentView,
    property::{Property, PropertyParams},
    structure::Structure,
};
use serde_json::Value as Json;
use std::sync::Arc;

use super::{empty_ids_view, ids_view, is_blank, order_by_ids, string_ids};
use crate::{
    backend::{ContentMapper, ContentQueryBuilder, QueryOptions},
    ctx::ResolveAttributes,
    resolver::{ContentTypeResolver, ResolveContext},
    serializer::PageSerializer,
    Result,
};

/// Batch loader shared by page selection and the page/snippet data providers.
#[derive(Clone)]
pub struct StructureLoader {
    query_builder: Arc<dyn ContentQueryBuilder>,
    mapper: Arc<dyn ContentMapper>,
}

impl StructureLoader {
    pub fn new(query_builder: Arc<dyn ContentQueryBuilder>, mapper: Arc<dyn ContentMapper>) -> Self {
        Self {
            query_builder,
            mapper,
        }
    }

    /// Structures for `ids` in `ids` order; unknown ids are dropped.
    pub async fn load(
        &self,
        ids: &[String],
        properties: Vec<String>,
        locale: &str,
        attributes: &ResolveAttributes,
    ) -> Result<Vec<Structure>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let webspace = attributes.webspace_key();
        let options = QueryOptions {
            ids: ids.to_vec(),
            properties,
            published: !attributes.preview,
        };
        let query = self
            .query_builder
            .build(&options, webspace, &[locale.to_string()]);

        let structures = self.mapper.load_by_query(&query, locale, webspace).await?;

        Ok(order_by_ids(ids, structures, |s| s.uuid.clone()))
    }

    /// Loads and serializes `ids` with the property map derived from `params`.
    pub async fn serialize(
        &self,
        ids: &[String],
        params: &PropertyParams,
        locale: &str,
        attributes: &ResolveAttributes,
        cx: &ResolveContext<'_>,
    ) -> Result<Vec<Json>> {
        let property_map = PageSerializer::property_map(params);
        let structures = self
            .load(
                ids,
                PageSerializer::property_names(&property_map),
                locale,
                attributes,
            )
            .await?;

        let mut items = Vec::with_capacity(structures.len());
        for structure in &structures {
            items.push(
                PageSerializer
                    .serialize(cx, structure, &property_map, locale, attributes)
                    .await?,
            );
        }
        Ok(items)
    }
}

pub struct PageSelectionResolver {
    loader: StructureLoader,
}

impl PageSelectionResolver {
    pub fn new(loader: StructureLoader) -> Self {
        Self { loader }
    }
}

#[async_trait]
impl ContentTypeResolver for PageSelectionResolver {
    fn content_type(&self) -> &'static str {
        "page_selection"
    }

    async fn resolve(
        &self,
        data: &Json,
        property: &Property,
        locale: &str,
        attributes: &ResolveAttributes,
        cx: &ResolveContext<'_>,
    ) -> Result<ContentView> {
        if is_blank(data) {
            return Ok(ContentView::new(Json::Array(vec![]), empty_ids_view()));
        }

        let ids = string_ids(data);
        let content = self
            .loader
            .serialize(&ids, &property.params, locale, attributes, cx)
            .await?;

        Ok(ContentView::new(content, ids_view(data)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        backend::{ContentQuery, MockContentMapper, MockContentQueryBuilder},
        resolver::ContentResolver,
        types::SingleSelectionResolver,
    };
    use domain::property::PropertyParameter;
    use serde_json::json;

    fn page(uuid: &str, title: &str) -> Structure {
        Structure::page(uuid, "default")
            .with_webspace("example")
            .with_property(Property::new("title", "text_line").with_value(title))
            .with_property(
                Property::new("url", "resource_locator").with_value(format!("/{title}")),
            )
            .with_property(Property::new("teaser", "text_area").with_value("hidden"))
    }

    fn builder() -> MockContentQueryBuilder {
        let mut qb = MockContentQueryBuilder::new();
        qb.expect_build()
            .returning(|options, webspace, locales| ContentQuery {
                ids: options.ids.clone(),
                properties: options.properties.clone(),
                published: options.published,
                webspace_key: webspace.to_string(),
                locales: locales.to_vec(),
            });
        qb
    }

    fn registry(qb: MockContentQueryBuilder, mapper: MockContentMapper) -> ContentResolver {
        let list = Arc::new(PageSelectionResolver::new(StructureLoader::new(
            Arc::new(qb),
            Arc::new(mapper),
        )));
        ContentResolver::builder()
            .register(list.clone())
            .register(Arc::new(SingleSelectionResolver::new(
                "single_page_selection",
                list,
            )))
            .build()
    }

    #[tokio::test]
    async fn pages_resolve_property_map_in_order() {
        let mut mapper = MockContentMapper::new();
        mapper
            .expect_load_by_query()
            .withf(|query, locale, webspace| {
                query.ids == ["b", "a", "gone"]
                    && query.published
                    && query.properties.contains(&"title".to_string())
                    && locale == "en"
                    && webspace == "example"
            })
            .times(1)
            .returning(|_, _, _| Ok(vec![page("a", "alpha"), page("b", "beta")]));

        let property = Property::new("pages", "page_selection").with_param(
            PropertyParameter::collection(
                "properties",
                vec![PropertyParameter::new("lead", "teaser")],
            ),
        );
        let attributes = ResolveAttributes::new().with_webspace("example");

        let cv = registry(builder(), mapper)
            .resolve(&json!(["b", "a", "gone"]), &property, "en", &attributes)
            .await
            .expect("resolve");

        let pages = cv.content().as_array().expect("list");
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0]["id"], json!("b"));
        assert_eq!(pages[0]["content"]["title"], json!("beta"));
        assert_eq!(pages[0]["content"]["url"], json!("/beta"));
        assert_eq!(pages[0]["content"]["lead"], json!("hidden"));
        assert_eq!(pages[1]["id"], json!("a"));
        assert_eq!(cv.view(), &json!({ "ids": ["b", "a", "gone"] }));
    }

    #[tokio::test]
    async fn preview_loads_drafts() {
        let mut mapper = MockContentMapper::new();
        mapper
            .expect_load_by_query()
            .withf(|query, _, _| !query.published)
            .returning(|_, _, _| Ok(vec![]));

        let cv = registry(builder(), mapper)
            .resolve(
                &json!(["a"]),
                &Property::new("pages", "page_selection"),
                "en",
                &ResolveAttributes::new().with_preview(true),
            )
            .await
            .expect("resolve");
        assert_eq!(cv.content(), &json!([]));
    }

    #[tokio::test]
    async fn empty_selection_builds_no_query() {
        let mut qb = MockContentQueryBuilder::new();
        qb.expect_build().never();
        let mut mapper = MockContentMapper::new();
        mapper.expect_load_by_query().never();
        let registry = registry(qb, mapper);

        let cv = registry
            .resolve(
                &json!([]),
                &Property::new("pages", "page_selection"),
                "en",
                &ResolveAttributes::new(),
            )
            .await
            .expect("resolve");
        assert_eq!(cv, ContentView::new(json!([]), json!({ "ids": [] })));

        let single = registry
            .resolve(
                &json!(""),
                &Property::new("page", "single_page_selection"),
                "en",
                &ResolveAttributes::new(),
            )
            .await
            .expect("resolve");
        assert_eq!(single, ContentView::new(Json::Null, json!({ "id": null })));
    }
}
