//! relgraph CLI - explore the relationship graph over business records

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use relgraph::config::{RelgraphConfig, default_config_path, default_database_path, load_config};
use relgraph::{EntityKey, EntityType, RelationshipKind};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "relgraph")]
#[command(version)]
#[command(about = "Entity relationship resolver - on-demand relationship graph over typed business records")]
#[command(long_about = r#"
relgraph resolves how business records relate to each other, on demand:
  • Forward and reverse relationships, grouped by kind
  • Cross-type substring search
  • Relationship statistics and related-entity lookups

Example usage:
  relgraph init
  relgraph import fixtures.json
  relgraph relationships client:5
  relgraph related saf:10 --type coc
  relgraph search acme --type client
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file (overrides the config)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputMode::Text)]
    format: OutputMode,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config and create the database schema
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },

    /// Load records from a JSON file of `{ "<table>": [rows...] }`
    Import {
        /// JSON file to import
        file: PathBuf,
    },

    /// Show one entity
    Show {
        /// Entity key, e.g. client:5
        key: EntityKey,
    },

    /// List an entity's relationships grouped by kind
    Relationships {
        /// Entity key, e.g. client:5
        key: EntityKey,

        /// Only include these kinds
        #[arg(short, long = "kind")]
        kinds: Vec<RelationshipKind>,

        /// Exclude these kinds
        #[arg(short, long)]
        exclude: Vec<RelationshipKind>,

        /// Maximum number of relationships
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// List entities of one type related to an entity
    Related {
        /// Entity key, e.g. saf:10
        key: EntityKey,

        /// Type of the related entities
        #[arg(short = 't', long = "type")]
        related_type: EntityType,

        /// Restrict to one relationship kind
        #[arg(short, long)]
        kind: Option<RelationshipKind>,
    },

    /// Search entities across types
    Search {
        /// Substring to match (omit to list everything)
        query: Option<String>,

        /// Entity types to search, in order
        #[arg(short = 't', long = "type")]
        types: Vec<EntityType>,

        /// Maximum number of results
        #[arg(short, long, allow_negative_numbers = true)]
        limit: Option<i64>,

        /// Rows to skip in the first searched type
        #[arg(short, long, allow_negative_numbers = true)]
        offset: Option<i64>,
    },

    /// Relationship statistics for an entity, or row counts per table
    Stats {
        /// Entity key, e.g. client:5
        key: Option<EntityKey>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputMode {
    #[default]
    Text,
    Json,
}

impl OutputMode {
    pub fn is_human(self) -> bool {
        self == OutputMode::Text
    }
}

#[derive(Serialize)]
struct Envelope<'a, T: Serialize> {
    ok: bool,
    command: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub fn emit_success(output_mode: OutputMode, command: &str, data: impl Serialize) -> anyhow::Result<()> {
    if output_mode.is_human() {
        return Ok(());
    }
    let envelope = Envelope {
        ok: true,
        command,
        data: Some(data),
        error: None,
    };
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

fn emit_error(output_mode: OutputMode, command: &str, err: &anyhow::Error) {
    if output_mode.is_human() {
        relgraph::ui::error(&format!("{:#}", err));
        return;
    }
    let envelope: Envelope<'_, ()> = Envelope {
        ok: false,
        command,
        data: None,
        error: Some(format!("{:#}", err)),
    };
    match serde_json::to_string_pretty(&envelope) {
        Ok(json) => println!("{}", json),
        Err(_) => eprintln!("{:#}", err),
    }
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Init { .. } => "init",
            Commands::Import { .. } => "import",
            Commands::Show { .. } => "show",
            Commands::Relationships { .. } => "relationships",
            Commands::Related { .. } => "related",
            Commands::Search { .. } => "search",
            Commands::Stats { .. } => "stats",
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn build_context(cli: &Cli) -> anyhow::Result<commands::Context> {
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config = match &cli.command {
        // init writes the config, so an existing broken one must not block it
        Commands::Init { .. } => RelgraphConfig::default(),
        _ => load_config(Some(&config_path))?.unwrap_or_default(),
    };

    let database = cli
        .database
        .clone()
        .or_else(|| config.database.as_ref().map(PathBuf::from))
        .unwrap_or_else(default_database_path);
    let settings = config.settings()?;
    tracing::debug!(config = %config_path.display(), database = %database.display(), ?settings, "resolved configuration");

    Ok(commands::Context {
        output_mode: cli.format,
        config_path,
        database,
        settings,
    })
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = build_context(&cli)?;

    match cli.command {
        Commands::Init { force } => commands::run_init(&ctx, force),
        Commands::Import { file } => commands::run_import(&ctx, &file),
        Commands::Show { key } => commands::run_show(&ctx, key),
        Commands::Relationships {
            key,
            kinds,
            exclude,
            limit,
        } => commands::run_relationships(&ctx, key, kinds, exclude, limit),
        Commands::Related {
            key,
            related_type,
            kind,
        } => commands::run_related(&ctx, key, related_type, kind),
        Commands::Search {
            query,
            types,
            limit,
            offset,
        } => commands::run_search(&ctx, query, types, limit, offset),
        Commands::Stats { key } => commands::run_stats(&ctx, key),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let output_mode = cli.format;
    let command = cli.command.name();
    if let Err(err) = run(cli) {
        emit_error(output_mode, command, &err);
        std::process::exit(1);
    }
}
