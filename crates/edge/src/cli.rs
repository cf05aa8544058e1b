// crates/edge/src/cli.rs

use adapt::{bootstrap::Site, fixture::Fixture};
use chrono::Utc;
use clap::{builder::ValueHint, Parser, Subcommand};
use domain::{
    setting::{FixtureSettings, Settings},
    structure::StructureKind,
};
use serde_json::Value as Json;
use serve::{
    backend::ContentMapper,
    ctx::{RequestScope, ResolveAttributes},
    structure::StructureResolver,
};
use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
};
use tracing::{debug, error, info};

use crate::Error;

pub type Result<T> = std::result::Result<T, Error>;

const SETTINGS_FILE: &str = "settings.toml";
const DEFAULT_FIXTURE: &str = "fixtures.json";
const DEFAULT_WEBSPACE: &str = "example";

/// Headless content resolver CLI
#[tokio::main(flavor = "multi_thread")]
#[tracing::instrument(skip_all)]
pub async fn start() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Resolve(cmd) => do_resolve(cmd).await,
    };

    result.map_or_else(
        |e| {
            error!("Failed to resolve content: {}", e);
            ExitCode::FAILURE
        },
        |document| {
            println!("{document}");
            ExitCode::SUCCESS
        },
    )
}

/// Runs `resolve` and returns the pretty printed document.
#[tracing::instrument(skip_all)]
pub async fn do_resolve(cmd: ResolveCmd) -> Result<String> {
    let then = Utc::now();
    let process = ResolveProcess::<CommandIssued>::parse_settings_file(cmd)?;
    info!(
        "Settings parsed in {} milliseconds",
        Utc::now().timestamp_millis() - then.timestamp_millis()
    );

    let then = Utc::now();
    let process = process.load_site()?;
    info!(
        "Fixtures loaded in {} milliseconds",
        Utc::now().timestamp_millis() - then.timestamp_millis()
    );

    let then = Utc::now();
    let process = process.resolve().await?;
    info!(
        "Content resolved in {} milliseconds",
        Utc::now().timestamp_millis() - then.timestamp_millis()
    );

    Ok(serde_json::to_string_pretty(&process.state.document)?)
}

#[derive(Parser, Debug)]
#[command(name = "headless", version, about = "Resolves structured content into JSON")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve one page or snippet of the site in the specified directory
    Resolve(ResolveCmd),
}

#[derive(Parser, Debug, Clone)]
pub struct ResolveCmd {
    /// Site directory containing `settings.toml` (or set HEADLESS_DIR)
    #[arg(
        value_name = "DIR",
        env = "HEADLESS_DIR",
        required = true,
        value_hint = ValueHint::DirPath,
        value_parser = dir_must_exist
    )]
    pub dir: PathBuf,

    /// Uuid of the page or snippet
    #[arg(long)]
    pub id: String,

    #[arg(long, default_value = "en")]
    pub locale: String,

    /// Include extension data (excerpt, seo, ...)
    #[arg(long)]
    pub extension: bool,

    /// Request query string, e.g. `p=2&tags=news`
    #[arg(long, default_value = "")]
    pub query: String,

    /// Segment of the current request
    #[arg(long)]
    pub segment: Option<String>,

    /// Resolve a snippet instead of a page
    #[arg(long)]
    pub snippet: bool,

    /// Include unpublished content
    #[arg(long)]
    pub preview: bool,
}

fn dir_must_exist(s: &str) -> std::result::Result<PathBuf, String> {
    let p = PathBuf::from(s);
    if !p.exists() {
        return Err(format!("Not found: {}", p.display()));
    }
    if !p.is_dir() {
        return Err(format!("Not a directory: {}", p.display()));
    }
    Ok(p)
}

/// Reads `<dir>/settings.toml`; a missing file means default settings.
pub fn load_settings(dir: &Path) -> Result<Settings> {
    let path = dir.join(SETTINGS_FILE);
    if !path.exists() {
        debug!("{} not found, using defaults", path.display());
        return Ok(Settings::default());
    }

    let text = std::fs::read_to_string(&path)
        .map_err(|err| Error::Config(format!("Failed reading {}: {}", path.display(), err)))?;

    toml::from_str(&text).map_err(|err| {
        Error::Config(format!(
            "Invalid settings.toml at {}: {}",
            path.display(),
            err
        ))
    })
}

/// Fixture settings with relative paths resolved against `dir`.
pub fn fixture_settings(dir: &Path, settings: &Settings) -> FixtureSettings {
    let fixtures = settings.fixtures.clone().unwrap_or_else(|| FixtureSettings {
        path: PathBuf::from(DEFAULT_FIXTURE),
        webspace: DEFAULT_WEBSPACE.into(),
    });

    FixtureSettings {
        path: dir.join(fixtures.path),
        webspace: fixtures.webspace,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Resolve process state machine
// ─────────────────────────────────────────────────────────────────────────────

trait ProcessState {}

struct CommandIssued;

struct SettingsLoaded {
    command: ResolveCmd,
    settings: Settings,
    fixtures: FixtureSettings,
}

struct SiteLoaded {
    command: ResolveCmd,
    settings: Settings,
    site: Site,
}

struct Resolved {
    document: Json,
}

impl ProcessState for CommandIssued {}
impl ProcessState for SettingsLoaded {}
impl ProcessState for SiteLoaded {}
impl ProcessState for Resolved {}

struct ResolveProcess<S: ProcessState> {
    state: S,
}

impl ResolveProcess<CommandIssued> {
    #[tracing::instrument(skip_all)]
    fn parse_settings_file(command: ResolveCmd) -> Result<ResolveProcess<SettingsLoaded>> {
        let settings = load_settings(&command.dir)?;
        let fixtures = fixture_settings(&command.dir, &settings);

        Ok(ResolveProcess {
            state: SettingsLoaded {
                command,
                settings,
                fixtures,
            },
        })
    }
}

impl ResolveProcess<SettingsLoaded> {
    #[tracing::instrument(skip_all)]
    fn load_site(self) -> Result<ResolveProcess<SiteLoaded>> {
        let fixtures = &self.state.fixtures;
        let fixture = Fixture::from_path(&fixtures.path)?;
        let site = Site::load(&fixture, &fixtures.webspace)?;

        Ok(ResolveProcess {
            state: SiteLoaded {
                command: self.state.command,
                settings: self.state.settings,
                site,
            },
        })
    }
}

impl ResolveProcess<SiteLoaded> {
    #[tracing::instrument(skip_all)]
    async fn resolve(self) -> Result<ResolveProcess<Resolved>> {
        let SiteLoaded {
            command,
            settings,
            site,
        } = self.state;

        let structure = site
            .content_mapper()
            .load(&command.id, &site.webspace, &command.locale)
            .await
            .map_err(serve::Error::from)?;

        let expected = if command.snippet {
            StructureKind::Snippet
        } else {
            StructureKind::Page
        };
        if structure.kind != expected {
            return Err(Error::WrongKind {
                id: command.id,
                found: structure.kind.as_str(),
                expected: expected.as_str(),
            });
        }

        let mut request = RequestScope::from_query_string(&command.query);
        if let Some(segment) = &command.segment {
            request = request.with_segment(segment.clone());
        }
        let attributes = ResolveAttributes::new()
            .with_webspace(site.webspace.clone())
            .with_preview(command.preview)
            .with_request(request);

        let resolver = StructureResolver::new(Arc::new(site.resolver(&settings)));
        let document = resolver
            .resolve_in(&structure, &command.locale, command.extension, &attributes)
            .await?
            .to_json()?;

        Ok(ResolveProcess {
            state: Resolved { document },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "pages": [{
            "uuid": "home", "template": "default",
            "properties": [
                { "name": "title", "type": "text_line", "value": "Home" },
                { "name": "footer", "type": "snippet_selection", "value": ["footer"] }
            ]
        }],
        "snippets": [{
            "uuid": "footer", "template": "footer",
            "properties": [{ "name": "text", "type": "text_line", "value": "Footer" }]
        }]
    }"#;

    fn site_dir(settings: Option<&str>) -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        if let Some(settings) = settings {
            std::fs::write(dir.path().join(SETTINGS_FILE), settings).expect("settings");
        }
        dir
    }

    fn command(dir: &Path, id: &str) -> ResolveCmd {
        ResolveCmd {
            dir: dir.to_path_buf(),
            id: id.into(),
            locale: "en".into(),
            extension: false,
            query: String::new(),
            segment: None,
            snippet: false,
            preview: false,
        }
    }

    #[test]
    fn settings_from_toml() {
        let dir = site_dir(Some(
            r#"
            [resolver]
            max_depth = 8

            [media]
            format_uri = "/img/{id}/{format}"

            [fixtures]
            path = "data/site.json"
            webspace = "blog"
            "#,
        ));

        let settings = load_settings(dir.path()).expect("settings");
        assert_eq!(settings.resolver.max_depth, 8);
        assert_eq!(settings.resolver.page_parameter, "p");
        assert_eq!(settings.media.format_uri, "/img/{id}/{format}");

        let fixtures = fixture_settings(dir.path(), &settings);
        assert_eq!(fixtures.path, dir.path().join("data/site.json"));
        assert_eq!(fixtures.webspace, "blog");
    }

    #[test]
    fn missing_settings_use_defaults() {
        let dir = site_dir(None);
        let settings = load_settings(dir.path()).expect("settings");
        assert_eq!(settings.resolver.max_depth, 32);

        let fixtures = fixture_settings(dir.path(), &settings);
        assert_eq!(fixtures.path, dir.path().join(DEFAULT_FIXTURE));
        assert_eq!(fixtures.webspace, DEFAULT_WEBSPACE);
    }

    #[test]
    fn invalid_settings_are_config_errors() {
        let dir = site_dir(Some("[resolver]\nmax_depth = \"deep\""));
        assert!(matches!(load_settings(dir.path()), Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn resolves_page_from_site_dir() {
        let dir = site_dir(None);
        std::fs::write(dir.path().join(DEFAULT_FIXTURE), FIXTURE).expect("fixture");

        let out = do_resolve(command(dir.path(), "home")).await.expect("resolve");
        let doc: Json = serde_json::from_str(&out).expect("json");
        assert_eq!(doc["content"]["title"], "Home");
        assert_eq!(doc["content"]["footer"][0]["content"]["text"], "Footer");
    }

    #[tokio::test]
    async fn snippet_flag_must_match_kind() {
        let dir = site_dir(None);
        std::fs::write(dir.path().join(DEFAULT_FIXTURE), FIXTURE).expect("fixture");

        let err = do_resolve(command(dir.path(), "footer")).await.expect_err("page expected");
        assert!(matches!(err, Error::WrongKind { found: "snippet", .. }), "{err}");

        let mut snippet = command(dir.path(), "footer");
        snippet.snippet = true;
        let out = do_resolve(snippet).await.expect("snippet");
        assert!(out.contains("\"Footer\""));
    }

    #[tokio::test]
    async fn unknown_id_fails() {
        let dir = site_dir(None);
        std::fs::write(dir.path().join(DEFAULT_FIXTURE), FIXTURE).expect("fixture");

        let err = do_resolve(command(dir.path(), "nope")).await.expect_err("missing");
        assert!(matches!(err, Error::ServeError(ref e) if e.is_not_found()), "{err}");
    }
}
