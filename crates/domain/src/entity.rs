// crates/domain/src/entity.rs

//! Backend entities referenced by selection properties.
//!
//! These are the shapes the manager traits hand back. Serializers in the
//! `serve` crate decide which fields reach the resolved output.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as Json};

// ─────────────────────────────────────────────────────────────────────────────
// Media
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Media {
    pub id: i64,
    pub locale: String,
    #[serde(rename = "type")]
    pub media_type: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub credits: Option<String>,
    pub copyright: Option<String>,
    pub name: String,
    pub mime_type: Option<String>,
    pub size: Option<u64>,
    pub version: i64,
    pub subversion: i64,
    pub url: Option<String>,
    pub collection_id: Option<i64>,
    pub focus_point_x: Option<i64>,
    pub focus_point_y: Option<i64>,
    pub properties: JsonMap<String, Json>,
    pub tags: Vec<String>,

    // Internal bookkeeping never exposed in resolved content.
    pub storage_options: Option<Json>,
    pub download_counter: Option<i64>,
    pub preview_image_id: Option<i64>,

    pub creator: Option<i64>,
    pub created: Option<DateTime<Utc>>,
    pub changer: Option<i64>,
    pub changed: Option<DateTime<Utc>>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Accounts & contacts
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub number: Option<String>,
    pub corporation: Option<String>,
    pub uid: Option<String>,
    pub note: Option<String>,
    pub main_email: Option<String>,
    pub main_phone: Option<String>,
    pub main_url: Option<String>,
    pub logo: Option<Media>,
    pub medias: Vec<Media>,
    pub tags: Vec<String>,
    pub bank_accounts: Vec<Json>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Contact {
    pub id: i64,
    pub form_of_address: Option<i64>,
    pub title: Option<String>,
    pub salutation: Option<String>,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub position: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub main_email: Option<String>,
    pub main_phone: Option<String>,
    pub avatar: Option<Media>,
    pub medias: Vec<Media>,
    pub tags: Vec<String>,
    pub bank_accounts: Vec<Json>,
}

impl Contact {
    pub fn full_name(&self) -> String {
        [self.first_name.as_str(), self.last_name.as_str()]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Categories & collections
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryTranslation {
    pub locale: String,
    pub name: String,
    pub description: Option<String>,
    pub medias: Vec<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Category {
    pub id: i64,
    pub key: Option<String>,
    pub default_locale: String,
    pub parent_id: Option<i64>,
    pub translations: Vec<CategoryTranslation>,
    pub creator: Option<i64>,
    pub created: Option<DateTime<Utc>>,
    pub changer: Option<i64>,
    pub changed: Option<DateTime<Utc>>,
}

impl Category {
    /// Translation for `locale`, falling back to the default locale.
    pub fn translation(&self, locale: &str) -> Option<&CategoryTranslation> {
        self.translations
            .iter()
            .find(|t| t.locale == locale)
            .or_else(|| {
                self.translations
                    .iter()
                    .find(|t| t.locale == self.default_locale)
            })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CollectionMeta {
    pub locale: String,
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Collection {
    pub id: i64,
    pub key: Option<String>,
    pub parent_id: Option<i64>,
    pub meta: Vec<CollectionMeta>,
}

impl Collection {
    pub fn meta(&self, locale: &str) -> Option<&CollectionMeta> {
        self.meta
            .iter()
            .find(|m| m.locale == locale)
            .or_else(|| self.meta.first())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Teasers, tags, links
// ─────────────────────────────────────────────────────────────────────────────

/// Reference to a teaser as stored in a `teaser_selection` value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeaserItem {
    pub id: String,
    #[serde(rename = "type")]
    pub teaser_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_id: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Teaser {
    pub id: String,
    #[serde(rename = "type")]
    pub teaser_type: String,
    pub locale: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub more_text: Option<String>,
    pub media_id: Option<i64>,
    pub url: Option<String>,
    pub attributes: JsonMap<String, Json>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

/// A link target as returned by a link provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinkItem {
    pub id: String,
    pub title: String,
    pub url: String,
    pub published: bool,
}
