use std::path::{Path, PathBuf};

use anyhow::Context as _;
use owo_colors::OwoColorize;
use relgraph::config::{RelgraphConfig, ensure_db_dir, write_config};
use relgraph::ui::{self, Icons};
use relgraph::{
    EngineSettings, EntityKey, EntityRegistry, EntityType, QueryEngine, RelationshipKind, RelationshipOptions,
    RuleTable, SearchParams, SqliteStore,
};

use crate::{OutputMode, emit_success};

/// Resolved global options shared by every command
pub struct Context {
    pub output_mode: OutputMode,
    pub config_path: PathBuf,
    pub database: PathBuf,
    pub settings: EngineSettings,
}

impl Context {
    fn open_store(&self) -> anyhow::Result<SqliteStore> {
        if !self.database.exists() {
            anyhow::bail!(
                "database not found at {} (run `relgraph init` first)",
                self.database.display()
            );
        }
        Ok(SqliteStore::open(&self.database)?)
    }
}

/// Standard registry and rule table, built once per invocation
struct Graph {
    registry: EntityRegistry,
    rules: RuleTable,
}

impl Graph {
    fn standard() -> Self {
        Self {
            registry: EntityRegistry::standard(),
            rules: RuleTable::standard(),
        }
    }

    fn engine<'a>(&'a self, store: &'a SqliteStore, settings: EngineSettings) -> QueryEngine<'a> {
        QueryEngine::new(store, &self.registry, &self.rules).with_settings(settings)
    }
}

pub fn run_init(ctx: &Context, force: bool) -> anyhow::Result<()> {
    let config = RelgraphConfig {
        database: Some(ctx.database.display().to_string()),
        ..RelgraphConfig::with_defaults()
    };
    write_config(&ctx.config_path, &config, force)?;

    ensure_db_dir(&ctx.database)?;
    let store = SqliteStore::open(&ctx.database)?;
    let stats = store.stats()?;
    tracing::debug!(database = %ctx.database.display(), tables = stats.tables.len(), "schema ready");

    if ctx.output_mode.is_human() {
        ui::success("Initialized relgraph");
        ui::status(Icons::GEAR, "Config", &ctx.config_path.display().to_string());
        ui::status(Icons::DATABASE, "Database", &ctx.database.display().to_string());
    } else {
        let data = serde_json::json!({
            "config": ctx.config_path.display().to_string(),
            "database": ctx.database.display().to_string(),
            "tables": stats.tables.len(),
        });
        emit_success(ctx.output_mode, "init", data)?;
    }
    Ok(())
}

pub fn run_import(ctx: &Context, file: &Path) -> anyhow::Result<()> {
    let contents = std::fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;
    let document: serde_json::Value =
        serde_json::from_str(&contents).with_context(|| format!("{} is not valid JSON", file.display()))?;

    ensure_db_dir(&ctx.database)?;
    let mut store = SqliteStore::open(&ctx.database)?;
    let rows = store.import_json(&document)?;
    tracing::info!(rows, file = %file.display(), "import complete");

    if ctx.output_mode.is_human() {
        ui::success(&format!("Imported {} rows from {}", rows, file.display()));
    } else {
        emit_success(ctx.output_mode, "import", serde_json::json!({ "rows": rows }))?;
    }
    Ok(())
}

pub fn run_show(ctx: &Context, key: EntityKey) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let graph = Graph::standard();
    let entity = graph.engine(&store, ctx.settings).get_entity(key.entity_type, key.id)?;

    if !ctx.output_mode.is_human() {
        return emit_success(ctx.output_mode, "show", &entity);
    }
    match entity {
        Some(entity) => ui::entity_detail(&entity),
        None => ui::empty(&format!("No {} found with id {}", key.entity_type.title(), key.id)),
    }
    Ok(())
}

pub fn run_relationships(
    ctx: &Context,
    key: EntityKey,
    kinds: Vec<RelationshipKind>,
    exclude: Vec<RelationshipKind>,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let graph = Graph::standard();
    let engine = graph.engine(&store, ctx.settings);

    let options = RelationshipOptions {
        include_kinds: (!kinds.is_empty()).then_some(kinds),
        exclude_kinds: (!exclude.is_empty()).then_some(exclude),
        limit,
    };
    let subject = engine.get_entity(key.entity_type, key.id)?;
    let groups = engine.get_entity_relationships(key.entity_type, key.id, &options)?;

    if !ctx.output_mode.is_human() {
        let data = serde_json::json!({ "entity": subject, "groups": groups });
        return emit_success(ctx.output_mode, "relationships", data);
    }

    let Some(subject) = subject else {
        ui::empty(&format!("No {} found with id {}", key.entity_type.title(), key.id));
        return Ok(());
    };
    ui::entity_line(&subject);

    if groups.is_empty() {
        ui::empty("No relationships");
        return Ok(());
    }
    for group in &groups {
        ui::group_heading(group);
        println!("{}", ui::relationship_table(group.relationships()));
    }
    Ok(())
}

pub fn run_related(
    ctx: &Context,
    key: EntityKey,
    related_type: EntityType,
    kind: Option<RelationshipKind>,
) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let graph = Graph::standard();
    let related = graph
        .engine(&store, ctx.settings)
        .get_related_entities(key.entity_type, key.id, related_type, kind)?;

    if !ctx.output_mode.is_human() {
        return emit_success(ctx.output_mode, "related", &related);
    }

    let via = kind.map(|k| format!(" via {}", k)).unwrap_or_default();
    ui::section(&format!(" {} entities related to {}{} ", related_type.title(), key, via));
    if related.is_empty() {
        ui::empty("Nothing related");
    } else {
        println!("{}", ui::entity_table(&related));
    }
    Ok(())
}

pub fn run_search(
    ctx: &Context,
    query: Option<String>,
    types: Vec<EntityType>,
    limit: Option<i64>,
    offset: Option<i64>,
) -> anyhow::Result<()> {
    let store = ctx.open_store()?;
    let graph = Graph::standard();

    let params = SearchParams {
        query,
        entity_types: (!types.is_empty()).then_some(types),
        limit,
        offset,
    };
    let results = graph.engine(&store, ctx.settings).search_entities(&params)?;

    if !ctx.output_mode.is_human() {
        return emit_success(ctx.output_mode, "search", &results);
    }

    let label = params.query.as_deref().unwrap_or("*");
    println!("{} Searching for: '{}'", Icons::SEARCH, label.bold());
    if results.entities.is_empty() {
        ui::empty("No entities found");
        return Ok(());
    }
    println!("{}", ui::entity_table(&results.entities));
    ui::summary_row("Total:", &results.total.to_string());
    if results.has_more {
        println!("  {}", ui::muted("More results may be available (use --offset)"));
    }
    Ok(())
}

pub fn run_stats(ctx: &Context, key: Option<EntityKey>) -> anyhow::Result<()> {
    let store = ctx.open_store()?;

    let Some(key) = key else {
        let stats = store.stats()?;
        if !ctx.output_mode.is_human() {
            return emit_success(ctx.output_mode, "stats", &stats);
        }

        ui::header(&format!("relgraph statistics ({})", ctx.database.display()));
        let mut rows: Vec<(&str, String)> = stats
            .tables
            .iter()
            .map(|(table, count)| (table.as_str(), count.to_string()))
            .collect();
        rows.push(("total", stats.total_rows().to_string()));
        println!("{}", ui::stats_table(&rows));
        return Ok(());
    };

    let graph = Graph::standard();
    let engine = graph.engine(&store, ctx.settings);
    let stats = engine.get_relationship_stats(key.entity_type, key.id)?;

    if !ctx.output_mode.is_human() {
        return emit_success(ctx.output_mode, "stats", &stats);
    }

    if let Some(subject) = engine.get_entity(key.entity_type, key.id)? {
        ui::entity_line(&subject);
    }
    let mut rows = vec![
        ("Total", stats.total_relationships.to_string()),
        ("Forward", stats.forward.to_string()),
        ("Reverse", stats.reverse.to_string()),
    ];
    rows.extend(
        stats
            .relationship_types
            .iter()
            .map(|(kind, count)| (kind.as_str(), count.to_string())),
    );
    println!("{} Relationship statistics", Icons::STATS);
    println!("{}", ui::stats_table(&rows));
    Ok(())
}
