// crates/serve/src/serializer/mod.rs

//! Entity serializers: backend entities to flat, render-ready JSON maps.

mod page;
mod teaser;

pub use page::PageSerializer;
pub use teaser::TeaserSerializer;

use domain::entity::{Account, Category, Collection, Contact, Media};
use serde::Serialize;
use serde_json::{Map as JsonMap, Value as Json};

use crate::Result;

/// Serde view of an entity as an object.
pub(crate) fn to_map<T: Serialize>(entity: &T) -> Result<JsonMap<String, Json>> {
    match serde_json::to_value(entity)? {
        Json::Object(map) => Ok(map),
        other => {
            let mut map = JsonMap::new();
            map.insert("value".into(), other);
            Ok(map)
        }
    }
}

fn strip(map: &mut JsonMap<String, Json>, keys: &[&str]) {
    for key in keys {
        map.remove(*key);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Media
// ─────────────────────────────────────────────────────────────────────────────

const MEDIA_INTERNAL: &[&str] = &[
    "storageOptions",
    "downloadCounter",
    "previewImageId",
    "creator",
    "changer",
];

#[derive(Debug, Clone)]
pub struct MediaSerializer {
    format_uri: String,
}

impl MediaSerializer {
    /// `format_uri` placeholders: `{id}`, `{name}`, `{version}`,
    /// `{subversion}`. `{format}` is left for the client.
    pub fn new(format_uri: impl Into<String>) -> Self {
        Self {
            format_uri: format_uri.into(),
        }
    }

    pub fn serialize(&self, media: &Media) -> Result<Json> {
        let mut map = to_map(media)?;
        strip(&mut map, MEDIA_INTERNAL);
        map.insert("formatUri".into(), Json::String(self.format_uri(media)));
        Ok(Json::Object(map))
    }

    fn format_uri(&self, media: &Media) -> String {
        self.format_uri
            .replace("{id}", &media.id.to_string())
            .replace("{name}", &media.name)
            .replace("{version}", &media.version.to_string())
            .replace("{subversion}", &media.subversion.to_string())
    }
}

impl Default for MediaSerializer {
    fn default() -> Self {
        Self::new(domain::setting::MediaSettings::default().format_uri)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Accounts & contacts
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct AccountSerializer {
    media: MediaSerializer,
}

impl AccountSerializer {
    pub fn new(media: MediaSerializer) -> Self {
        Self { media }
    }

    pub fn serialize(&self, account: &Account) -> Result<Json> {
        let mut map = to_map(account)?;
        strip(&mut map, &["bankAccounts", "medias"]);

        let logo = match &account.logo {
            Some(logo) => self.media.serialize(logo)?,
            None => Json::Null,
        };
        map.insert("logo".into(), logo);

        Ok(Json::Object(map))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContactSerializer {
    media: MediaSerializer,
}

impl ContactSerializer {
    pub fn new(media: MediaSerializer) -> Self {
        Self { media }
    }

    pub fn serialize(&self, contact: &Contact) -> Result<Json> {
        let mut map = to_map(contact)?;
        strip(&mut map, &["bankAccounts", "medias"]);

        let avatar = match &contact.avatar {
            Some(avatar) => self.media.serialize(avatar)?,
            None => Json::Null,
        };
        map.insert("avatar".into(), avatar);
        map.insert("fullName".into(), Json::String(contact.full_name()));

        Ok(Json::Object(map))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Categories & collections
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct CategorySerializer;

impl CategorySerializer {
    /// Flattens the translation for `locale` into the category.
    pub fn serialize(&self, category: &Category, locale: &str) -> Result<Json> {
        let translation = category.translation(locale);

        let mut map = JsonMap::new();
        map.insert("id".into(), Json::from(category.id));
        map.insert(
            "locale".into(),
            Json::String(translation.map_or(locale, |t| t.locale.as_str()).to_string()),
        );
        map.insert("key".into(), serde_json::to_value(&category.key)?);
        map.insert("defaultLocale".into(), Json::String(category.default_locale.clone()));
        map.insert(
            "name".into(),
            translation.map_or(Json::Null, |t| Json::String(t.name.clone())),
        );
        map.insert(
            "description".into(),
            serde_json::to_value(translation.and_then(|t| t.description.clone()))?,
        );
        map.insert(
            "medias".into(),
            serde_json::to_value(translation.map(|t| t.medias.clone()).unwrap_or_default())?,
        );
        map.insert("parentId".into(), serde_json::to_value(category.parent_id)?);
        map.insert("created".into(), serde_json::to_value(category.created)?);
        map.insert("changed".into(), serde_json::to_value(category.changed)?);

        Ok(Json::Object(map))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CollectionSerializer;

impl CollectionSerializer {
    pub fn serialize(&self, collection: &Collection, locale: &str) -> Result<Json> {
        let meta = collection.meta(locale);

        let mut map = JsonMap::new();
        map.insert("id".into(), Json::from(collection.id));
        map.insert("key".into(), serde_json::to_value(&collection.key)?);
        map.insert("locale".into(), Json::String(locale.to_string()));
        map.insert(
            "title".into(),
            meta.map_or(Json::Null, |m| Json::String(m.title.clone())),
        );
        map.insert(
            "description".into(),
            serde_json::to_value(meta.and_then(|m| m.description.clone()))?,
        );
        map.insert("parentId".into(), serde_json::to_value(collection.parent_id)?);

        Ok(Json::Object(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::entity::{CategoryTranslation, CollectionMeta};
    use serde_json::json;

    fn media() -> Media {
        Media {
            id: 3,
            name: "sunset.jpg".into(),
            version: 2,
            subversion: 1,
            storage_options: Some(json!({ "segment": "04" })),
            download_counter: Some(12),
            creator: Some(1),
            ..Default::default()
        }
    }

    #[test]
    fn media_strips_internal_fields_and_adds_format_uri() {
        let out = MediaSerializer::new("/media/{id}/{format}/{name}?v={version}-{subversion}")
            .serialize(&media())
            .expect("serialize");

        assert_eq!(out["formatUri"], json!("/media/3/{format}/sunset.jpg?v=2-1"));
        assert!(out.get("storageOptions").is_none());
        assert!(out.get("downloadCounter").is_none());
        assert!(out.get("creator").is_none());
        assert_eq!(out["id"], json!(3));
    }

    #[test]
    fn account_embeds_serialized_logo() {
        let account = Account {
            id: 1,
            name: "ACME".into(),
            logo: Some(media()),
            bank_accounts: vec![json!({ "iban": "x" })],
            ..Default::default()
        };

        let out = AccountSerializer::default().serialize(&account).expect("serialize");
        assert_eq!(out["logo"]["id"], json!(3));
        assert!(out["logo"].get("storageOptions").is_none());
        assert!(out.get("bankAccounts").is_none());
    }

    #[test]
    fn contact_gets_full_name_and_null_avatar() {
        let contact = Contact {
            id: 2,
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            ..Default::default()
        };

        let out = ContactSerializer::default().serialize(&contact).expect("serialize");
        assert_eq!(out["fullName"], json!("Ada Lovelace"));
        assert!(out["avatar"].is_null());
    }

    #[test]
    fn category_uses_requested_translation() {
        let category = Category {
            id: 5,
            default_locale: "en".into(),
            translations: vec![
                CategoryTranslation {
                    locale: "en".into(),
                    name: "Sport".into(),
                    ..Default::default()
                },
                CategoryTranslation {
                    locale: "de".into(),
                    name: "Sportarten".into(),
                    medias: vec![9],
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let out = CategorySerializer.serialize(&category, "de").expect("serialize");
        assert_eq!(out["name"], json!("Sportarten"));
        assert_eq!(out["medias"], json!([9]));
        assert_eq!(out["locale"], json!("de"));
    }

    #[test]
    fn collection_uses_meta_title() {
        let collection = Collection {
            id: 4,
            meta: vec![CollectionMeta {
                locale: "en".into(),
                title: "Press".into(),
                description: None,
            }],
            ..Default::default()
        };

        let out = CollectionSerializer.serialize(&collection, "en").expect("serialize");
        assert_eq!(out["title"], json!("Press"));
        assert!(out["description"].is_null());
    }
}
