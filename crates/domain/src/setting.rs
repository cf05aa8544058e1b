use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// Maximum nesting depth of property resolution.
    pub max_depth: usize,

    /// Data provider alias used by smart content without a `provider` param.
    pub default_provider: String,

    /// Query parameters read by smart content.
    pub page_parameter: String,
    pub tags_parameter: String,
    pub categories_parameter: String,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            max_depth: 32,
            default_provider: "pages".into(),
            page_parameter: "p".into(),
            tags_parameter: "tags".into(),
            categories_parameter: "categories".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MediaSettings {
    /// Placeholders: `{id}`, `{format}`, `{name}`, `{version}`, `{subversion}`.
    pub format_uri: String,
}

impl Default for MediaSettings {
    fn default() -> Self {
        Self {
            format_uri: "/media/{id}/{format}/{name}?v={version}-{subversion}".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FixtureSettings {
    /// Relative paths resolve against the settings directory.
    pub path: PathBuf,
    pub webspace: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub resolver: ResolverSettings,
    pub media: MediaSettings,
    pub fixtures: Option<FixtureSettings>,
}
