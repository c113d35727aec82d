//! Forward and reverse relationship resolution
//!
//! One generic loop interprets the [`RuleTable`]:
//! 1. Fetch the subject once through the registry
//! 2. For each rule registered for the subject's type and direction,
//!    run its filtered fetch (capped at the row limit)
//! 3. Pair the subject with every fetched row
//!
//! A storage fault in one rule is logged and that rule is skipped; the
//! remaining rules still run. Rules whose target type is missing from the
//! registry are skipped the same way, so a partial registry still resolves
//! the relationships it can describe.

use crate::Result;
use crate::entity::{EntityReference, EntityType};
use crate::registry::EntityRegistry;
use crate::relationship::{Direction, Relationship};
use crate::rules::{RelationshipRule, RuleTable};
use crate::storage::SqliteStore;

pub struct RelationshipResolver<'a> {
    store: &'a SqliteStore,
    registry: &'a EntityRegistry,
    rules: &'a RuleTable,
    row_limit: usize,
}

impl<'a> RelationshipResolver<'a> {
    pub fn new(store: &'a SqliteStore, registry: &'a EntityRegistry, rules: &'a RuleTable, row_limit: usize) -> Self {
        Self {
            store,
            registry,
            rules,
            row_limit,
        }
    }

    /// Point lookup; `Ok(None)` when the row is missing or unreachable
    pub fn get_entity(&self, entity_type: EntityType, id: i64) -> Result<Option<EntityReference>> {
        let def = self.registry.get(entity_type)?;

        match self.store.fetch_by_id(def, id) {
            Ok(row) => Ok(row.map(|row| def.to_reference(&row))),
            Err(err) => {
                tracing::warn!(entity_type = %entity_type, id, error = %err, "entity lookup failed, treating as not found");
                Ok(None)
            }
        }
    }

    /// Relationships the subject owns/contains/authorizes/references
    pub fn resolve_forward(&self, entity_type: EntityType, id: i64) -> Result<Vec<Relationship>> {
        match self.get_entity(entity_type, id)? {
            Some(subject) => self.resolve_for(&subject, Direction::Forward),
            None => Ok(Vec::new()),
        }
    }

    /// Relationships other records hold against the subject
    pub fn resolve_reverse(&self, entity_type: EntityType, id: i64) -> Result<Vec<Relationship>> {
        match self.get_entity(entity_type, id)? {
            Some(subject) => self.resolve_for(&subject, Direction::Reverse),
            None => Ok(Vec::new()),
        }
    }

    /// Forward relationships followed by reverse ones, fetching the subject once
    pub fn resolve_all(&self, entity_type: EntityType, id: i64) -> Result<Vec<Relationship>> {
        let Some(subject) = self.get_entity(entity_type, id)? else {
            tracing::debug!(entity_type = %entity_type, id, "subject not found, no relationships");
            return Ok(Vec::new());
        };

        let mut relationships = self.resolve_for(&subject, Direction::Forward)?;
        relationships.extend(self.resolve_for(&subject, Direction::Reverse)?);
        Ok(relationships)
    }

    /// Apply every rule for the subject's type in the given direction
    pub fn resolve_for(&self, subject: &EntityReference, direction: Direction) -> Result<Vec<Relationship>> {
        let mut relationships = Vec::new();

        for rule in self.rules.rules_for(subject.entity_type, direction) {
            if !self.registry.contains(rule.target_type) {
                tracing::warn!(rule = %rule, target = %rule.target_type, "rule target type not registered, skipping");
                continue;
            }

            match self.apply_rule(subject, rule) {
                Ok(resolved) => {
                    tracing::debug!(rule = %rule, count = resolved.len(), "rule resolved");
                    relationships.extend(resolved);
                }
                Err(crate::Error::Storage(err)) => {
                    tracing::warn!(
                        entity_type = %subject.entity_type,
                        id = subject.id,
                        rule = %rule,
                        error = %err,
                        "relationship rule failed, skipping"
                    );
                }
                Err(err) => return Err(err),
            }
        }

        Ok(relationships)
    }

    fn apply_rule(&self, subject: &EntityReference, rule: &RelationshipRule) -> Result<Vec<Relationship>> {
        let subject_def = self.registry.get(subject.entity_type)?;
        let target_def = self.registry.get(rule.target_type)?;

        let rows = self
            .store
            .fetch_related(target_def, subject_def, &rule.access, subject.id, self.row_limit)?;

        let relationships = rows
            .iter()
            .map(|row| {
                let other = target_def.to_reference(row);
                let relationship = match rule.direction {
                    Direction::Forward => Relationship::forward(subject.clone(), other, rule.kind),
                    Direction::Reverse => Relationship::reverse(other, subject.clone(), rule.kind),
                };
                relationship.with_strength(rule.strength)
            })
            .collect();

        Ok(relationships)
    }
}
