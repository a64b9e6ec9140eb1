use anyhow::Result;
use autovec_store::Config;
use clap::Parser;
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "autovec", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// MongoDB connection string (default: mongodb://localhost:27020/wikipedia)
    #[arg(long, global = true)]
    uri: Option<String>,

    /// Database name (default: wikipedia)
    #[arg(long, global = true)]
    database: Option<String>,

    /// Collection name (default: articles)
    #[arg(long, global = true)]
    collection: Option<String>,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Create the collection and its auto-embedding vector search index
    ///
    /// Creates the collection if it does not exist, then submits a
    /// vectorSearch index definition with:
    ///
    /// - an autoEmbed field (text modality) on the embedding path, using
    ///   the configured embedding model
    /// - a filter field for each configured filter path
    ///
    /// The command returns as soon as the database accepts the definition.
    /// The index build and the embedding backfill continue in the
    /// background; use 'autovec status' to follow them.
    ///
    /// Fails if an index with the same name already exists with a
    /// different definition, or if the model is not recognized.
    Provision {
        /// Index name (default: vector_index)
        #[arg(long)]
        index: Option<String>,

        /// Embedding model (default: voyage-4)
        #[arg(long)]
        model: Option<String>,
    },
    /// Insert sample articles, wait for embeddings, run a semantic query
    ///
    /// Not idempotent: every run inserts the articles again.
    SmokeTest {
        /// JSON array of {"title", "content"} objects to insert instead of
        /// the built-in samples
        #[arg(long)]
        documents: Option<PathBuf>,

        /// Wait strategy before querying
        #[arg(long, value_enum)]
        wait: Option<WaitMode>,

        /// Seconds to sleep with the fixed wait (default: 30)
        #[arg(long)]
        wait_secs: Option<u64>,

        /// Query text
        #[arg(long, default_value = autovec_store::DEFAULT_QUERY)]
        query: String,

        #[arg(long, default_value_t = 10)]
        limit: u32,

        /// Candidate pool size considered before ranking
        #[arg(long, default_value_t = 100)]
        num_candidates: u32,
    },
    /// Run a semantic query against the index
    Search {
        /// Natural-language query text
        query: String,

        #[arg(long, default_value_t = 10)]
        limit: u32,

        /// Candidate pool size considered before ranking
        #[arg(long, default_value_t = 100)]
        num_candidates: u32,

        /// Only match articles with exactly this title
        #[arg(long)]
        title: Option<String>,
    },
    /// Show search index build status and document count
    Status,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum WaitMode {
    /// Sleep for a fixed number of seconds
    Fixed,
    /// Poll the index build status with backoff
    Poll,
}

impl From<WaitMode> for autovec_store::WaitMode {
    fn from(mode: WaitMode) -> Self {
        match mode {
            WaitMode::Fixed => Self::Fixed,
            WaitMode::Poll => Self::Poll,
        }
    }
}

#[derive(Debug, clap::Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Print the config file path
    Path,
    /// Print an example config file
    Example,
    /// Create the config file with defaults
    Init,
}

fn init_logging(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load()?;
    init_logging(&config.log_level);

    if let Some(uri) = cli.uri {
        config.connection_uri = uri;
    }
    if let Some(database) = cli.database {
        config.database = database;
    }
    if let Some(collection) = cli.collection {
        config.collection = collection;
    }

    match cli.command {
        Commands::Provision { index, model } => {
            if let Some(index) = index {
                config.index_name = index;
            }
            if let Some(model) = model {
                config.embedding_model = model;
            }
            commands::run_provision(&config).await?;
        }
        Commands::SmokeTest {
            documents,
            wait,
            wait_secs,
            query,
            limit,
            num_candidates,
        } => {
            if let Some(wait) = wait {
                config.wait_mode = wait.into();
            }
            if let Some(wait_secs) = wait_secs {
                config.wait_secs = wait_secs;
            }
            let query = config
                .query(query)
                .with_limit(limit)
                .with_num_candidates(num_candidates);
            commands::run_smoke_test(&config, documents, query).await?;
        }
        Commands::Search {
            query,
            limit,
            num_candidates,
            title,
        } => {
            commands::run_search(&config, query, limit, num_candidates, title).await?;
        }
        Commands::Status => {
            commands::show_status(&config).await?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show_config(&config)?,
            ConfigAction::Path => commands::config::show_path()?,
            ConfigAction::Example => commands::config::show_example()?,
            ConfigAction::Init => commands::config::init_config()?,
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_smoke_test_defaults() {
        let cli = Cli::try_parse_from(["autovec", "smoke-test"]).unwrap();
        match cli.command {
            Commands::SmokeTest {
                query,
                limit,
                num_candidates,
                wait,
                ..
            } => {
                assert_eq!(query, autovec_store::DEFAULT_QUERY);
                assert_eq!(limit, 10);
                assert_eq!(num_candidates, 100);
                assert!(wait.is_none());
            }
            other => panic!("Expected SmokeTest, got {other:?}"),
        }
    }

    #[test]
    fn test_global_connection_flags() {
        let cli = Cli::try_parse_from([
            "autovec",
            "status",
            "--uri",
            "mongodb://db.internal:27017",
            "--database",
            "encyclopedia",
        ])
        .unwrap();
        assert_eq!(cli.uri.as_deref(), Some("mongodb://db.internal:27017"));
        assert_eq!(cli.database.as_deref(), Some("encyclopedia"));
        assert!(matches!(cli.command, Commands::Status));
    }

    #[test]
    fn test_poll_wait_flag() {
        let cli = Cli::try_parse_from(["autovec", "smoke-test", "--wait", "poll"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::SmokeTest {
                wait: Some(WaitMode::Poll),
                ..
            }
        ));
        assert_eq!(
            autovec_store::WaitMode::from(WaitMode::Poll),
            autovec_store::WaitMode::Poll
        );
    }
}
