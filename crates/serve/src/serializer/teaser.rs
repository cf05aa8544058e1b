// crates/serve/src/serializer/teaser.rs

use domain::entity::Teaser;
use serde_json::Value as Json;
use std::sync::Arc;
use tracing::debug;

use super::{to_map, MediaSerializer};
use crate::{backend::MediaManager, Result};

/// Teasers reference their image by id; the serialized form embeds it.
#[derive(Clone)]
pub struct TeaserSerializer {
    media_manager: Arc<dyn MediaManager>,
    media: MediaSerializer,
}

impl TeaserSerializer {
    pub fn new(media_manager: Arc<dyn MediaManager>, media: MediaSerializer) -> Self {
        Self {
            media_manager,
            media,
        }
    }

    /// A teaser image that no longer exists serializes as `null`.
    pub async fn serialize(&self, teaser: &Teaser, locale: &str) -> Result<Json> {
        let mut map = to_map(teaser)?;
        map.remove("mediaId");

        let media = match teaser.media_id {
            None => Json::Null,
            Some(id) => match self.media_manager.get_by_id(id, locale).await {
                Ok(media) => self.media.serialize(&media)?,
                Err(e) if e.is_not_found() => {
                    debug!(teaser = %teaser.id, media = id, "teaser media missing");
                    Json::Null
                }
                Err(e) => return Err(e.into()),
            },
        };
        map.insert("media".into(), media);

        Ok(Json::Object(map))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{backend::MockMediaManager, BackendError};
    use domain::entity::Media;
    use serde_json::json;

    fn teaser(media_id: Option<i64>) -> Teaser {
        Teaser {
            id: "p-1".into(),
            teaser_type: "pages".into(),
            locale: "en".into(),
            title: Some("Hello".into()),
            media_id,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn embeds_media() {
        let mut mm = MockMediaManager::new();
        mm.expect_get_by_id()
            .withf(|id, locale| *id == 7 && locale == "en")
            .times(1)
            .returning(|id, _| {
                Ok(Media {
                    id,
                    name: "a.jpg".into(),
                    ..Default::default()
                })
            });

        let out = TeaserSerializer::new(Arc::new(mm), MediaSerializer::default())
            .serialize(&teaser(Some(7)), "en")
            .await
            .expect("serialize");

        assert_eq!(out["media"]["id"], json!(7));
        assert!(out.get("mediaId").is_none());
        assert_eq!(out["title"], json!("Hello"));
    }

    #[tokio::test]
    async fn missing_media_becomes_null() {
        let mut mm = MockMediaManager::new();
        mm.expect_get_by_id()
            .returning(|id, _| Err(BackendError::not_found("media", id)));

        let out = TeaserSerializer::new(Arc::new(mm), MediaSerializer::default())
            .serialize(&teaser(Some(7)), "en")
            .await
            .expect("serialize");

        assert!(out["media"].is_null());
    }

    #[tokio::test]
    async fn no_media_id_skips_lookup() {
        let mut mm = MockMediaManager::new();
        mm.expect_get_by_id().never();

        let out = TeaserSerializer::new(Arc::new(mm), MediaSerializer::default())
            .serialize(&teaser(None), "en")
            .await
            .expect("serialize");

        assert!(out["media"].is_null());
    }
}
