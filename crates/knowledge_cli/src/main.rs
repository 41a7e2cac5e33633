//! Command-line entry point over `knowledge_core`.
//!
//! # Responsibility
//! - Map flags and environment onto `StoreConfig`.
//! - Call exactly one store operation per invocation and print its result.
//!
//! # Invariants
//! - Not-found is reported with exit code 1; other failures with exit code 2.
//! - Failures and not-found results are also logged when `--log-dir` is set.
//! - Structured results are printed as pretty JSON on stdout.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use knowledge_core::config::BASE_PATH_ENV;
use knowledge_core::{
    default_log_level, init_logging, ArticleRepository, FsArticleRepository, IdentifierPolicy,
    MissingBodyPolicy, SearchQuery, StoreConfig,
};
use log::{error, info, warn};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "knowledge", about = "Manage a personal knowledge base", version)]
struct Cli {
    #[command(flatten)]
    store: StoreArgs,

    /// Absolute directory for rolling log files; logging stays off when unset.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct StoreArgs {
    /// Repository root holding `articles/` and `metadata/`.
    #[arg(long, global = true, env = BASE_PATH_ENV, default_value = "knowledge")]
    base_path: PathBuf,

    /// Use bare `YYYYMMDD_HHMMSS` ids; a same-second create overwrites.
    #[arg(long, global = true)]
    legacy_ids: bool,

    /// Leave articles with a missing body out of search results instead of failing.
    #[arg(long, global = true)]
    skip_missing_bodies: bool,
}

impl StoreArgs {
    fn to_config(&self) -> StoreConfig {
        let identifier_policy = if self.legacy_ids {
            IdentifierPolicy::Timestamp
        } else {
            IdentifierPolicy::TimestampWithCounter
        };
        let missing_body_policy = if self.skip_missing_bodies {
            MissingBodyPolicy::Skip
        } else {
            MissingBodyPolicy::Fail
        };
        StoreConfig::new(&self.base_path)
            .with_identifier_policy(identifier_policy)
            .with_missing_body_policy(missing_body_policy)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create an article and print its id.
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        /// Repeat for multiple tags.
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Replace an article's content and/or tags.
    Update {
        id: String,
        #[arg(long)]
        content: Option<String>,
        /// Replaces the whole tag list. Repeat for multiple tags.
        #[arg(long = "tag", conflicts_with = "clear_tags")]
        tags: Vec<String>,
        /// Replace the tag list with an empty one.
        #[arg(long)]
        clear_tags: bool,
    },
    /// Print summaries of articles whose body contains QUERY.
    Search {
        query: String,
        /// Keep only articles sharing at least one of these tags.
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Print one article with its metadata.
    Get { id: String },
    /// Print `pong` to check the binary links against core.
    Ping,
}

impl Commands {
    /// Stable name used in log events.
    fn name(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Update { .. } => "update",
            Self::Search { .. } => "search",
            Self::Get { .. } => "get",
            Self::Ping => "ping",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let command = cli.command.name();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            // No-op unless `--log-dir` initialized logging.
            error!(
                "event=cli_command module=cli status=error command={} error={}",
                command,
                err.root_cause()
            );
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    if let Some(log_dir) = cli.log_dir.as_ref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        let log_dir = log_dir.to_string_lossy();
        init_logging(level, &log_dir).map_err(anyhow::Error::msg)?;
        info!(
            "event=cli_command module=cli status=start command={}",
            cli.command.name()
        );
    }

    match cli.command {
        Commands::Create {
            title,
            content,
            tags,
        } => {
            let article_id = open_store(&cli.store)?
                .create_article(&title, &content, &tags)
                .context("failed to create article")?;
            println!("{article_id}");
        }
        Commands::Update {
            id,
            content,
            tags,
            clear_tags,
        } => {
            let tags = (clear_tags || !tags.is_empty()).then_some(tags);
            let updated = open_store(&cli.store)?
                .update_article(&id, content.as_deref(), tags.as_deref())
                .with_context(|| format!("failed to update article `{id}`"))?;
            if !updated {
                warn!("event=cli_command module=cli status=not_found command=update");
                eprintln!("article not found: {id}");
                return Ok(ExitCode::from(1));
            }
        }
        Commands::Search { query, tags } => {
            let mut search = SearchQuery::new(query);
            if !tags.is_empty() {
                search = search.with_tags(tags);
            }
            let hits = open_store(&cli.store)?
                .search_articles(&search)
                .context("failed to search articles")?;
            println!("{}", serde_json::to_string_pretty(&hits)?);
        }
        Commands::Get { id } => {
            let Some(article) = open_store(&cli.store)?
                .get_article(&id)
                .with_context(|| format!("failed to read article `{id}`"))?
            else {
                warn!("event=cli_command module=cli status=not_found command=get");
                eprintln!("article not found: {id}");
                return Ok(ExitCode::from(1));
            };
            println!("{}", serde_json::to_string_pretty(&article)?);
        }
        Commands::Ping => {
            println!("knowledge_core ping={}", knowledge_core::ping());
            println!("knowledge_core version={}", knowledge_core::core_version());
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn open_store(args: &StoreArgs) -> Result<FsArticleRepository> {
    FsArticleRepository::open(args.to_config())
        .with_context(|| format!("failed to open store at `{}`", args.base_path.display()))
}

#[cfg(test)]
mod tests {
    use super::{Cli, Commands};
    use clap::{CommandFactory, Parser};
    use knowledge_core::{IdentifierPolicy, MissingBodyPolicy};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn store_flags_map_onto_config() {
        let cli = Cli::parse_from([
            "knowledge",
            "--base-path",
            "/tmp/kb",
            "--legacy-ids",
            "--skip-missing-bodies",
            "get",
            "20240101_000000",
        ]);
        let config = cli.store.to_config();
        assert_eq!(config.base_path, std::path::PathBuf::from("/tmp/kb"));
        assert_eq!(config.identifier_policy, IdentifierPolicy::Timestamp);
        assert_eq!(config.missing_body_policy, MissingBodyPolicy::Skip);
    }

    #[test]
    fn update_collects_repeated_tags() {
        let cli = Cli::parse_from([
            "knowledge", "update", "abc", "--tag", "one", "--tag", "two",
        ]);
        match cli.command {
            Commands::Update {
                id,
                content,
                tags,
                clear_tags,
            } => {
                assert_eq!(id, "abc");
                assert_eq!(content, None);
                assert_eq!(tags, vec!["one".to_string(), "two".to_string()]);
                assert!(!clear_tags);
            }
            _ => panic!("expected update command"),
        }
    }

    #[test]
    fn command_names_are_stable_for_log_events() {
        let cli = Cli::parse_from(["knowledge", "search", "apollo", "--tag", "space"]);
        assert_eq!(cli.command.name(), "search");
        let cli = Cli::parse_from(["knowledge", "ping"]);
        assert_eq!(cli.command.name(), "ping");
    }
}
