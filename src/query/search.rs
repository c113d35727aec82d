//! Cross-type entity search
//!
//! Visits the requested entity types in order and runs a case-insensitive
//! substring match over each type's searchable fields. Each type contributes
//! at most `per_type_limit` rows per call so one busy table cannot crowd out
//! the rest. `total` is the number collected in this call, not a corpus-wide
//! count.

use crate::entity::{EntityReference, EntityType};
use crate::registry::EntityRegistry;
use crate::storage::SqliteStore;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Search request. `limit`/`offset` are signed so malformed input can be
/// rejected instead of wrapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
    pub entity_types: Option<Vec<EntityType>>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn types(mut self, types: impl IntoIterator<Item = EntityType>) -> Self {
        self.entity_types = Some(types.into_iter().collect());
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub entities: Vec<EntityReference>,
    /// Entities collected in this call
    pub total: usize,
    /// True when exactly `limit` entities were collected
    pub has_more: bool,
}

pub struct EntitySearch<'a> {
    store: &'a SqliteStore,
    registry: &'a EntityRegistry,
    default_limit: usize,
    per_type_limit: usize,
}

impl<'a> EntitySearch<'a> {
    pub fn new(store: &'a SqliteStore, registry: &'a EntityRegistry, default_limit: usize, per_type_limit: usize) -> Self {
        Self {
            store,
            registry,
            default_limit,
            per_type_limit,
        }
    }

    pub fn search(&self, params: &SearchParams) -> Result<SearchResults> {
        let limit = non_negative("limit", params.limit)?.unwrap_or(self.default_limit);
        let offset = non_negative("offset", params.offset)?.unwrap_or(0);

        let types: Vec<EntityType> = match &params.entity_types {
            Some(types) => types.clone(),
            None => self.registry.types().collect(),
        };
        let definitions = types
            .iter()
            .map(|entity_type| self.registry.get(*entity_type))
            .collect::<Result<Vec<_>>>()?;

        let query = params.query.as_deref();
        let mut entities = Vec::new();

        for (index, def) in definitions.into_iter().enumerate() {
            if entities.len() >= limit {
                break;
            }
            let capacity = (limit - entities.len()).min(self.per_type_limit);
            let type_offset = if index == 0 { offset } else { 0 };

            match self.store.search(def, query, capacity, type_offset) {
                Ok(rows) => {
                    tracing::debug!(entity_type = %def.entity_type, hits = rows.len(), "search visited type");
                    entities.extend(rows.iter().map(|row| def.to_reference(row)));
                }
                Err(err) => {
                    tracing::warn!(entity_type = %def.entity_type, query = ?query, error = %err, "search failed for type, skipping");
                }
            }
        }

        let total = entities.len();
        Ok(SearchResults {
            entities,
            total,
            has_more: total == limit,
        })
    }
}

fn non_negative(name: &str, value: Option<i64>) -> Result<Option<usize>> {
    match value {
        Some(v) if v < 0 => Err(Error::Validation(format!("{} must be non-negative, got {}", name, v))),
        Some(v) => Ok(Some(v as usize)),
        None => Ok(None),
    }
}
