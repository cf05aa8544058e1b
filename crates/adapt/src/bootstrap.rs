// crates/adapt/src/bootstrap.rs

//! Wires the in-memory adapters into the [`Services`] bundle the default
//! resolver is built from.

use domain::setting::Settings;
use serve::{
    backend::ContentMapper,
    ctx::request::{QueryCategoryRequestHandler, QueryTagRequestHandler, TargetGroupStore},
    registry::{default_resolver, Services},
    resolver::ContentResolver,
};
use std::sync::Arc;
use tracing::debug;

use crate::{
    fixture::Fixture,
    link::InMemoryLinkProviderPool,
    markup::LolHtmlMarkupParser,
    provider::InMemoryDataProvider,
    store::{FixedTargetGroupStore, InMemoryBackend},
    Result,
};

/// A fixture loaded for one webspace, with everything needed to resolve it.
#[derive(Clone)]
pub struct Site {
    pub webspace: String,
    pub backend: Arc<InMemoryBackend>,
    pub services: Services,
}

impl Site {
    pub fn load(fixture: &Fixture, webspace: &str) -> Result<Self> {
        let backend = Arc::new(InMemoryBackend::from_fixture(fixture, webspace)?);
        let links = Arc::new(InMemoryLinkProviderPool::new(backend.clone()));

        let services = Services {
            media: backend.clone(),
            accounts: backend.clone(),
            contacts: backend.clone(),
            categories: backend.clone(),
            collections: backend.clone(),
            teasers: backend.clone(),
            tags: backend.clone(),
            query_builder: backend.clone(),
            content_mapper: backend.clone(),
            markup: Arc::new(LolHtmlMarkupParser::new(links.clone())),
            links,
            tag_requests: Arc::new(QueryTagRequestHandler),
            category_requests: Arc::new(QueryCategoryRequestHandler),
            target_groups: fixture
                .target_group_id
                .map(|id| Arc::new(FixedTargetGroupStore(Some(id))) as Arc<dyn TargetGroupStore>),
            page_provider: Arc::new(InMemoryDataProvider::pages(&backend)),
            snippet_provider: Arc::new(InMemoryDataProvider::snippets(&backend)),
            media_provider: Arc::new(InMemoryDataProvider::media(&backend)),
            account_provider: Arc::new(InMemoryDataProvider::accounts(&backend)),
            contact_provider: Arc::new(InMemoryDataProvider::contacts(&backend)),
        };

        debug!(
            "site `{webspace}` loaded: {} page(s), {} snippet(s)",
            backend.pages().len(),
            backend.snippets().len()
        );

        Ok(Self {
            webspace: webspace.to_string(),
            backend,
            services,
        })
    }

    pub fn resolver(&self, settings: &Settings) -> ContentResolver {
        default_resolver(&self.services, settings)
    }

    pub fn content_mapper(&self) -> Arc<dyn ContentMapper> {
        self.services.content_mapper.clone()
    }
}
