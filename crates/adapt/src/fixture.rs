// crates/adapt/src/fixture.rs

//! JSON fixture describing a small site: entities, tags, teasers, pages and
//! snippets.
//!
//! ```json
//! {
//!   "media": [{ "id": 1, "name": "cover.jpg", "version": 1 }],
//!   "tags": [{ "id": 222, "name": "sulu" }],
//!   "pages": [{
//!     "uuid": "home", "template": "default", "locale": "en",
//!     "tags": [222],
//!     "properties": [{ "name": "title", "type": "text_line", "value": "Home" }],
//!     "extensions": { "excerpt": { "title": "Welcome" } }
//!   }]
//! }
//! ```

use domain::{
    entity::{Account, Category, Collection, Contact, Media, Tag, Teaser},
    property::Property,
    structure::{PageDocument, Redirect, SnippetDocument, Structure, StructureKind},
};
use serde::Deserialize;
use serde_json::{Map as JsonMap, Value as Json};
use std::{collections::BTreeMap, path::Path, sync::Arc};

use crate::{Error, Result};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Fixture {
    pub media: Vec<Media>,
    pub accounts: Vec<Account>,
    pub contacts: Vec<Contact>,
    pub categories: Vec<Category>,
    pub collections: Vec<Collection>,
    pub tags: Vec<Tag>,
    pub teasers: Vec<Teaser>,
    pub pages: Vec<StructureFixture>,
    pub snippets: Vec<StructureFixture>,
    /// Audience targeting group reported for every request.
    pub target_group_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureFixture {
    pub uuid: String,
    pub template: String,
    /// Falls back to the webspace of the fixture settings.
    #[serde(default)]
    pub webspace: Option<String>,
    #[serde(default = "default_locale")]
    pub locale: String,
    #[serde(default = "default_published")]
    pub published: bool,
    #[serde(default)]
    pub tags: Vec<i64>,
    #[serde(default)]
    pub categories: Vec<i64>,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default)]
    pub extensions: BTreeMap<String, JsonMap<String, Json>>,
    /// Authorship and audit data; snippets keep only the audit part.
    #[serde(default)]
    pub document: PageDocument,
    #[serde(default)]
    pub redirect: Option<RedirectFixture>,
}

fn default_locale() -> String {
    "en".into()
}

fn default_published() -> bool {
    true
}

/// Link pages: `{"type": "internal", "target": "<uuid>"}` or
/// `{"type": "external", "url": "https://..."}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RedirectFixture {
    Internal { target: String },
    External { url: String },
}

/// A loaded structure plus the data the in-memory providers filter on.
#[derive(Debug, Clone)]
pub struct StructureRecord {
    pub structure: Structure,
    pub published: bool,
    pub tags: Vec<i64>,
    pub categories: Vec<i64>,
}

impl StructureRecord {
    pub fn uuid(&self) -> &str {
        &self.structure.uuid
    }

    pub fn locale(&self) -> &str {
        &self.structure.language_code
    }

    /// Raw value of the `title` property, if any.
    pub fn title(&self) -> Option<&str> {
        self.structure
            .property("title")
            .and_then(|p| p.value.as_str())
    }
}

impl Fixture {
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn page_records(&self, webspace: &str) -> Result<Vec<StructureRecord>> {
        self.records(&self.pages, StructureKind::Page, webspace)
    }

    pub fn snippet_records(&self, webspace: &str) -> Result<Vec<StructureRecord>> {
        self.records(&self.snippets, StructureKind::Snippet, webspace)
    }

    fn records(
        &self,
        fixtures: &[StructureFixture],
        kind: StructureKind,
        webspace: &str,
    ) -> Result<Vec<StructureRecord>> {
        fixtures
            .iter()
            .map(|fixture| {
                Ok(StructureRecord {
                    structure: self.build(fixture, kind, webspace, &mut Vec::new())?,
                    published: fixture.published,
                    tags: fixture.tags.clone(),
                    categories: fixture.categories.clone(),
                })
            })
            .collect()
    }

    /// Internal redirects are followed into the target page; `visiting`
    /// holds the chain so far.
    fn build(
        &self,
        fixture: &StructureFixture,
        kind: StructureKind,
        webspace: &str,
        visiting: &mut Vec<String>,
    ) -> Result<Structure> {
        visiting.push(fixture.uuid.clone());

        let mut structure = Structure::new(&fixture.uuid, &fixture.template, kind)
            .with_webspace(fixture.webspace.as_deref().unwrap_or(webspace))
            .with_locale(&fixture.locale)
            .with_properties(fixture.properties.clone());

        for (name, data) in &fixture.extensions {
            structure = structure.with_extension(name.clone(), data.clone());
        }

        structure = match kind {
            StructureKind::Page => structure.with_document(Arc::new(fixture.document.clone())),
            StructureKind::Snippet => structure.with_document(Arc::new(SnippetDocument {
                creator: fixture.document.creator,
                created: fixture.document.created,
                changer: fixture.document.changer,
                changed: fixture.document.changed,
            })),
        };

        match &fixture.redirect {
            None => {}
            Some(RedirectFixture::External { url }) => {
                structure = structure.with_redirect(Redirect::External(url.clone()));
            }
            Some(RedirectFixture::Internal { target }) => {
                if visiting.contains(target) {
                    return Err(Error::fixture(format!(
                        "redirect loop: {} -> {target}",
                        visiting.join(" -> ")
                    )));
                }
                let target_fixture = self.page(target, &fixture.locale).ok_or_else(|| {
                    Error::fixture(format!("redirect target `{target}` of `{}` not found", fixture.uuid))
                })?;
                let target = self.build(target_fixture, StructureKind::Page, webspace, visiting)?;
                structure = structure.with_redirect(Redirect::Internal(Box::new(target)));
            }
        }

        visiting.pop();
        Ok(structure)
    }

    /// Page `uuid` in `locale`, or in any locale when that one is missing.
    fn page(&self, uuid: &str, locale: &str) -> Option<&StructureFixture> {
        let mut candidates = self.pages.iter().filter(|p| p.uuid == uuid);
        let first = candidates.next()?;
        if first.locale == locale {
            return Some(first);
        }
        candidates.find(|p| p.locale == locale).or(Some(first))
    }
}
