//! # relgraph - Entity Relationship Resolver
//!
//! On-demand relationship graph over typed business records.
//!
//! relgraph provides:
//! - An explicit registry of entity shapes (table, label, display and search fields)
//! - A declarative relationship rule table (owns / contains / authorizes / references)
//! - Forward and reverse resolution, grouped by relationship kind
//! - Cross-type substring search
//! - SQLite-backed storage; nothing about the graph itself is persisted

pub mod config;
pub mod entity;
pub mod key;
pub mod query;
pub mod registry;
pub mod relationship;
pub mod rules;
pub mod storage;
pub mod ui;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-exports for convenient access
pub use config::{EngineSettings, RelgraphConfig};
pub use entity::{EntityReference, EntityType};
pub use key::EntityKey;
pub use query::{QueryEngine, RelationshipOptions, RelationshipStats, SearchParams, SearchResults};
pub use registry::{EntityDefinition, EntityRegistry};
pub use relationship::{Direction, Relationship, RelationshipGroup, RelationshipKind};
pub use rules::{Access, RelationshipRule, RuleTable};
pub use storage::SqliteStore;

/// Result type alias for relgraph operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for relgraph operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The type tag is not registered; a configuration defect, never swallowed
    #[error("Unknown entity type: {0}")]
    UnknownEntityType(String),

    #[error("Unknown relationship kind: {0}")]
    UnknownRelationshipKind(String),

    #[error("Invalid entity key: {0}")]
    InvalidKey(String),

    #[error("Invalid parameters: {0}")]
    Validation(String),

    /// Backing store failure; the resolver logs and isolates these per fetch
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}
