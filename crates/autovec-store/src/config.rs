use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use autovec_core::model::{IndexDefinition, TitleFilter, VectorSearchQuery};
use confyg::{env, Confygery};
use serde::{Deserialize, Deserializer, Serialize};

use crate::wait::{PollSettings, WaitMode, WaitStrategy};

/// Configuration for autovec.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (AUTOVEC_* prefix)
/// 3. Config file (~/.config/autovec/config.toml)
/// 4. Built-in defaults (lowest priority)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// MongoDB connection string.
    ///
    /// Can be set via:
    /// - CLI: --uri mongodb://host:port
    /// - ENV: AUTOVEC_CONNECTION_URI
    /// - Config: connection_uri = "..."
    pub connection_uri: String,

    /// Database holding the article collection.
    pub database: String,

    /// Collection the search index is attached to.
    pub collection: String,

    /// Name of the vector search index.
    pub index_name: String,

    /// Document field the database embeds.
    pub embedding_path: String,

    /// Embedding model used for auto-embedding.
    pub embedding_model: String,

    /// Fields indexed for filtering alongside vector similarity.
    ///
    /// ENV: AUTOVEC_FILTER_PATHS=title,author
    #[serde(deserialize_with = "list_or_comma_separated")]
    pub filter_paths: Vec<String>,

    /// How the smoke test waits for embeddings: "fixed" or "poll".
    pub wait_mode: WaitMode,

    /// Sleep duration for the fixed wait.
    #[serde(deserialize_with = "number_or_string")]
    pub wait_secs: u64,

    /// Initial delay between index status probes in poll mode.
    #[serde(deserialize_with = "number_or_string")]
    pub poll_interval_secs: u64,

    /// Maximum number of status probes in poll mode.
    #[serde(deserialize_with = "number_or_string")]
    pub poll_max_attempts: usize,

    /// Default log filter when RUST_LOG is not set.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            connection_uri: "mongodb://localhost:27020/wikipedia".to_string(),
            database: "wikipedia".to_string(),
            collection: "articles".to_string(),
            index_name: "vector_index".to_string(),
            embedding_path: "content".to_string(),
            embedding_model: "voyage-4".to_string(),
            filter_paths: vec!["title".to_string()],
            wait_mode: WaitMode::Fixed,
            wait_secs: 30,
            poll_interval_secs: 2,
            poll_max_attempts: 30,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/autovec/config.toml
    /// Reads environment variables with AUTOVEC_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration using `config_path` instead of the default file.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let mut builder = Confygery::new().context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path
                .to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder
                .add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("autovec");
        builder
            .add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder
            .build()
            .context("Failed to build configuration")?;

        Ok(config)
    }

    /// The index definition the provisioner submits.
    #[must_use]
    pub fn index_definition(&self) -> IndexDefinition {
        self.filter_paths.iter().fold(
            IndexDefinition::auto_embed(
                self.index_name.as_str(),
                self.embedding_path.as_str(),
                self.embedding_model.as_str(),
            ),
            |def, path| def.with_filter(path.as_str()),
        )
    }

    /// A query against the configured index and embedding field.
    #[must_use]
    pub fn query(&self, text: impl Into<String>) -> VectorSearchQuery {
        VectorSearchQuery::new(self.index_name.as_str(), self.embedding_path.as_str(), text)
    }

    /// An ad-hoc query, optionally restricted to articles titled `title`.
    ///
    /// The title filter applies to the first configured filter path.
    #[must_use]
    pub fn search_query(
        &self,
        text: impl Into<String>,
        limit: u32,
        num_candidates: u32,
        title: Option<String>,
    ) -> VectorSearchQuery {
        let query = self
            .query(text)
            .with_limit(limit)
            .with_num_candidates(num_candidates);

        match title {
            Some(title) => {
                let path = self
                    .filter_paths
                    .first()
                    .map(String::as_str)
                    .unwrap_or("title");
                query.with_filter(TitleFilter::equals(path, title))
            }
            None => query,
        }
    }

    /// The smoke test's wait strategy.
    #[must_use]
    pub fn wait_strategy(&self) -> WaitStrategy {
        match self.wait_mode {
            WaitMode::Fixed => WaitStrategy::Fixed(Duration::from_secs(self.wait_secs)),
            WaitMode::Poll => WaitStrategy::Poll(PollSettings {
                interval: Duration::from_secs(self.poll_interval_secs),
                max_attempts: self.poll_max_attempts,
            }),
        }
    }
}

// Environment variables always reach the parser as strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString<T> {
    Number(T),
    Text(String),
}

fn number_or_string<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: fmt::Display,
{
    match NumberOrString::<T>::deserialize(deserializer)? {
        NumberOrString::Number(value) => Ok(value),
        NumberOrString::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListOrString {
    List(Vec<String>),
    Text(String),
}

fn list_or_comma_separated<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match ListOrString::deserialize(deserializer)? {
        ListOrString::List(items) => items,
        ListOrString::Text(text) => text
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect(),
    })
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/autovec/config.toml
/// - macOS: ~/Library/Application Support/autovec/config.toml
/// - Windows: %APPDATA%\autovec\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("autovec")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Autovec Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (AUTOVEC_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)

# MongoDB endpoint with vector search and auto-embedding enabled
#
# Can also be set via:
# - CLI: autovec --uri mongodb://host:port provision
# - Environment: AUTOVEC_CONNECTION_URI=mongodb://host:port
connection_uri = "mongodb://localhost:27020/wikipedia"

database = "wikipedia"
collection = "articles"

# Search index settings
index_name = "vector_index"
embedding_path = "content"
embedding_model = "voyage-4"
filter_paths = ["title"]

# Smoke test wait strategy
#
# "fixed" sleeps for wait_secs before querying.
# "poll" probes the index status until it reports READY and queryable,
# backing off from poll_interval_secs for at most poll_max_attempts probes.
wait_mode = "fixed"
wait_secs = 30
poll_interval_secs = 2
poll_max_attempts = 30

# Default log filter (overridden by RUST_LOG)
log_level = "info"
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    write_config_file(&config_file_path())
}

fn write_config_file(config_path: &Path) -> Result<bool> {
    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create config directory")?;
    }

    std::fs::write(config_path, example_config()).context("Failed to write config file")?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.database, "wikipedia");
        assert_eq!(config.collection, "articles");
        assert_eq!(config.wait_secs, 30);
        assert_eq!(
            config.wait_strategy(),
            WaitStrategy::Fixed(Duration::from_secs(30))
        );
    }

    #[test]
    fn test_default_index_definition() {
        let def = Config::default().index_definition();
        assert_eq!(
            def,
            IndexDefinition::auto_embed("vector_index", "content", "voyage-4").with_filter("title")
        );
    }

    #[test]
    fn test_poll_strategy() {
        let config = Config {
            wait_mode: WaitMode::Poll,
            poll_interval_secs: 1,
            poll_max_attempts: 5,
            ..Config::default()
        };
        assert_eq!(
            config.wait_strategy(),
            WaitStrategy::Poll(PollSettings {
                interval: Duration::from_secs(1),
                max_attempts: 5,
            })
        );
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = Config::load_from(&temp_dir.path().join("absent.toml"));
        assert!(result.is_ok());
    }

    #[test]
    fn test_env_overrides_typed_fields() {
        let temp_dir = TempDir::new().unwrap();
        std::env::set_var("AUTOVEC_WAIT_SECS", "5");
        std::env::set_var("AUTOVEC_POLL_MAX_ATTEMPTS", "12");
        std::env::set_var("AUTOVEC_FILTER_PATHS", "title, author");

        let result = Config::load_from(&temp_dir.path().join("absent.toml"));

        std::env::remove_var("AUTOVEC_WAIT_SECS");
        std::env::remove_var("AUTOVEC_POLL_MAX_ATTEMPTS");
        std::env::remove_var("AUTOVEC_FILTER_PATHS");

        let config = result.unwrap();
        assert_eq!(config.wait_secs, 5);
        assert_eq!(config.poll_max_attempts, 12);
        assert_eq!(config.filter_paths, vec!["title", "author"]);
    }

    #[test]
    fn test_numbers_as_strings() {
        let parsed: Config =
            toml::from_str("wait_secs = '5'\npoll_interval_secs = ' 3 '\nfilter_paths = 'title'\n")
                .unwrap();
        assert_eq!(parsed.wait_secs, 5);
        assert_eq!(parsed.poll_interval_secs, 3);
        assert_eq!(parsed.filter_paths, vec!["title"]);

        assert!(toml::from_str::<Config>("wait_secs = 'soon'\n").is_err());
    }

    #[test]
    fn test_unknown_wait_mode_rejected() {
        assert!(toml::from_str::<Config>("wait_mode = 'pol'\n").is_err());
        let parsed: Config = toml::from_str("wait_mode = 'poll'\n").unwrap();
        assert_eq!(parsed.wait_mode, WaitMode::Poll);
    }

    #[test]
    fn test_search_query_title_filter() {
        let config = Config {
            filter_paths: vec!["headline".to_string()],
            ..Config::default()
        };
        let query = config.search_query("neural nets", 3, 50, Some("Deep Learning".to_string()));
        assert_eq!(query.limit, 3);
        assert_eq!(query.num_candidates, 50);
        assert_eq!(
            query.filter,
            Some(TitleFilter::equals("headline", "Deep Learning"))
        );
        assert!(config.search_query("neural nets", 3, 50, None).filter.is_none());
    }

    #[test]
    fn test_write_config_file_once() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("autovec").join("config.toml");

        assert!(write_config_file(&path).unwrap());
        assert!(!write_config_file(&path).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), example_config());
    }

    #[test]
    fn test_example_config_matches_defaults() {
        let parsed: Config = toml::from_str(example_config()).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let parsed: Config = toml::from_str("collection = \"papers\"\nwait_secs = 5\n").unwrap();
        assert_eq!(parsed.collection, "papers");
        assert_eq!(parsed.wait_secs, 5);
        assert_eq!(parsed.index_name, "vector_index");
    }
}
