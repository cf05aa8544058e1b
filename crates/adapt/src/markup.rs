// crates/adapt/src/markup.rs

//! `<sulu-link>` rewriting for text editor content.
//!
//! `<sulu-link provider="page" href="<uuid>" target="_blank">About</sulu-link>`
//! becomes `<a href="/about" target="_blank">About</a>`. Links that no provider
//! can resolve lose their tag but keep their content.

use async_trait::async_trait;
use domain::entity::LinkItem;
use lol_html::{element, html_content::Element, rewrite_str, Settings};
use serve::backend::{BackendResult, LinkProviderPool, MarkupParser};
use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};
use tracing::debug;

use crate::{link::PAGE_PROVIDER, Error, Result};

const LINK_TAG: &str = "sulu-link";
const PROVIDER_ATTR: &str = "provider";

pub struct LolHtmlMarkupParser {
    links: Arc<dyn LinkProviderPool>,
}

impl LolHtmlMarkupParser {
    pub fn new(links: Arc<dyn LinkProviderPool>) -> Self {
        Self { links }
    }

    async fn preload(
        &self,
        wanted: BTreeMap<String, Vec<String>>,
        locale: &str,
    ) -> BackendResult<HashMap<(String, String), LinkItem>> {
        let mut resolved = HashMap::new();
        for (key, hrefs) in wanted {
            let Some(provider) = self.links.provider(&key) else {
                debug!("no link provider `{key}`, {} link(s) left unresolved", hrefs.len());
                continue;
            };
            for item in provider.preload(&hrefs, locale, true).await? {
                resolved.insert((key.clone(), item.id.clone()), item);
            }
        }
        Ok(resolved)
    }
}

fn provider_of(el: &Element) -> String {
    el.get_attribute(PROVIDER_ATTR)
        .unwrap_or_else(|| PAGE_PROVIDER.to_string())
}

/// Hrefs of every link tag, grouped by provider.
fn collect_links(html: &str) -> Result<BTreeMap<String, Vec<String>>> {
    let mut wanted: BTreeMap<String, Vec<String>> = BTreeMap::new();

    rewrite_str(
        html,
        Settings {
            element_content_handlers: vec![element!(LINK_TAG, |el| {
                if let Some(href) = el.get_attribute("href") {
                    let hrefs = wanted.entry(provider_of(el)).or_default();
                    if !hrefs.contains(&href) {
                        hrefs.push(href);
                    }
                }
                Ok(())
            })],
            ..Settings::default()
        },
    )
    .map_err(|e| Error::markup(e.to_string()))?;

    Ok(wanted)
}

fn replace_links(html: &str, resolved: &HashMap<(String, String), LinkItem>) -> Result<String> {
    rewrite_str(
        html,
        Settings {
            element_content_handlers: vec![element!(LINK_TAG, |el| {
                let item = el
                    .get_attribute("href")
                    .and_then(|href| resolved.get(&(provider_of(el), href)));

                match item {
                    Some(item) => {
                        el.set_tag_name("a")?;
                        el.remove_attribute(PROVIDER_ATTR);
                        el.set_attribute("href", &item.url)?;
                    }
                    None => el.remove_and_keep_content(),
                }
                Ok(())
            })],
            ..Settings::default()
        },
    )
    .map_err(|e| Error::markup(e.to_string()))
}

#[async_trait]
impl MarkupParser for LolHtmlMarkupParser {
    #[tracing::instrument(skip_all)]
    async fn parse(&self, html: &str, locale: &str) -> BackendResult<String> {
        if !html.contains(LINK_TAG) {
            return Ok(html.to_string());
        }

        let wanted = collect_links(html)?;
        let resolved = self.preload(wanted, locale).await?;
        debug!("{} link(s) resolved", resolved.len());

        Ok(replace_links(html, &resolved)?)
    }
}
