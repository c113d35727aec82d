//! Relationship queries
//!
//! Everything is computed on demand from the store; nothing here caches.

pub mod engine;
pub mod grouper;
pub mod resolver;
pub mod search;

pub use engine::{QueryEngine, RelationshipStats};
pub use grouper::{RelationshipOptions, group_relationships};
pub use resolver::RelationshipResolver;
pub use search::{EntitySearch, SearchParams, SearchResults};
