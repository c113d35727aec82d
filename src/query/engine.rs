//! Query engine implementation
//!
//! Provides the high-level operations:
//! - Entity lookup
//! - Grouped forward + reverse relationships
//! - Cross-type search
//! - Relationship statistics
//! - Related-entity projection

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use super::grouper::{RelationshipOptions, group_relationships};
use super::resolver::RelationshipResolver;
use super::search::{EntitySearch, SearchParams, SearchResults};
use crate::Result;
use crate::config::EngineSettings;
use crate::entity::{EntityReference, EntityType};
use crate::registry::EntityRegistry;
use crate::relationship::{Relationship, RelationshipGroup, RelationshipKind};
use crate::rules::RuleTable;
use crate::storage::SqliteStore;

/// Summary of one entity's relationships
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipStats {
    pub total_relationships: usize,
    pub relationship_types: BTreeMap<RelationshipKind, usize>,
    /// Relationships where the entity is the owner
    pub forward: usize,
    /// Relationships other records hold against the entity
    pub reverse: usize,
}

impl RelationshipStats {
    pub fn from_groups(groups: &[RelationshipGroup]) -> Self {
        let mut relationship_types = BTreeMap::new();
        let mut reverse = 0;

        for group in groups {
            *relationship_types.entry(group.kind()).or_insert(0) += group.count();
            reverse += group.relationships().iter().filter(|rel| rel.is_reverse).count();
        }

        let total_relationships = groups.iter().map(RelationshipGroup::count).sum();
        Self {
            total_relationships,
            relationship_types,
            forward: total_relationships - reverse,
            reverse,
        }
    }
}

impl std::fmt::Display for RelationshipStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Relationship Statistics:")?;
        writeln!(f, "  Total: {} (forward: {}, reverse: {})", self.total_relationships, self.forward, self.reverse)?;
        for (kind, count) in &self.relationship_types {
            writeln!(f, "  {}: {}", kind, count)?;
        }
        Ok(())
    }
}

/// Query engine for the relationship graph
///
/// Holds only borrowed, immutable configuration; every call recomputes from
/// the store.
pub struct QueryEngine<'a> {
    store: &'a SqliteStore,
    registry: &'a EntityRegistry,
    rules: &'a RuleTable,
    settings: EngineSettings,
}

impl<'a> QueryEngine<'a> {
    /// Create a new query engine with default settings
    pub fn new(store: &'a SqliteStore, registry: &'a EntityRegistry, rules: &'a RuleTable) -> Self {
        Self {
            store,
            registry,
            rules,
            settings: EngineSettings::default(),
        }
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    fn resolver(&self) -> RelationshipResolver<'a> {
        RelationshipResolver::new(self.store, self.registry, self.rules, self.settings.rule_row_limit)
    }

    /// Look up one entity; `Ok(None)` means not found
    pub fn get_entity(&self, entity_type: EntityType, id: i64) -> Result<Option<EntityReference>> {
        self.resolver().get_entity(entity_type, id)
    }

    pub fn resolve_forward(&self, entity_type: EntityType, id: i64) -> Result<Vec<Relationship>> {
        self.resolver().resolve_forward(entity_type, id)
    }

    pub fn resolve_reverse(&self, entity_type: EntityType, id: i64) -> Result<Vec<Relationship>> {
        self.resolver().resolve_reverse(entity_type, id)
    }

    /// Forward and reverse relationships grouped by kind
    pub fn get_entity_relationships(
        &self,
        entity_type: EntityType,
        id: i64,
        options: &RelationshipOptions,
    ) -> Result<Vec<RelationshipGroup>> {
        let relationships = self.resolver().resolve_all(entity_type, id)?;
        Ok(group_relationships(relationships, options))
    }

    pub fn search_entities(&self, params: &SearchParams) -> Result<SearchResults> {
        EntitySearch::new(
            self.store,
            self.registry,
            self.settings.search_limit,
            self.settings.search_per_type_limit,
        )
        .search(params)
    }

    pub fn get_relationship_stats(&self, entity_type: EntityType, id: i64) -> Result<RelationshipStats> {
        let groups = self.get_entity_relationships(entity_type, id, &RelationshipOptions::default())?;
        Ok(RelationshipStats::from_groups(&groups))
    }

    /// Counterparts of the given type, de-duplicated by `(type, id)`
    pub fn get_related_entities(
        &self,
        entity_type: EntityType,
        id: i64,
        related_type: EntityType,
        kind: Option<RelationshipKind>,
    ) -> Result<Vec<EntityReference>> {
        let options = RelationshipOptions {
            include_kinds: kind.map(|kind| vec![kind]),
            ..Default::default()
        };
        let groups = self.get_entity_relationships(entity_type, id, &options)?;

        let mut seen = HashSet::new();
        let related = groups
            .into_iter()
            .flat_map(RelationshipGroup::into_relationships)
            .filter(|rel| rel.counterpart_type() == related_type)
            .map(|rel| if rel.is_reverse { rel.source_entity } else { rel.target_entity })
            .filter(|entity| seen.insert(entity.key()))
            .collect();

        Ok(related)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::fixtures;

    fn engine<'a>(store: &'a SqliteStore, registry: &'a EntityRegistry, rules: &'a RuleTable) -> QueryEngine<'a> {
        QueryEngine::new(store, registry, rules)
    }

    fn summary(groups: &[RelationshipGroup]) -> Vec<(RelationshipKind, usize)> {
        groups.iter().map(|g| (g.kind(), g.count())).collect()
    }

    #[test]
    fn test_client_with_three_contracts() {
        let store = fixtures::portfolio();
        let (registry, rules) = (EntityRegistry::standard(), RuleTable::standard());
        let engine = engine(&store, &registry, &rules);

        let groups = engine
            .get_entity_relationships(EntityType::Client, 5, &RelationshipOptions::default())
            .unwrap();
        assert_eq!(summary(&groups), vec![(RelationshipKind::Owns, 3)]);
    }

    #[test]
    fn test_saf_authorizes_across_target_types() {
        let store = fixtures::compliance();
        let (registry, rules) = (EntityRegistry::standard(), RuleTable::standard());
        let engine = engine(&store, &registry, &rules);

        let groups = engine
            .get_entity_relationships(EntityType::Saf, 10, &RelationshipOptions::default())
            .unwrap();
        let authorizes = groups
            .iter()
            .find(|g| g.kind() == RelationshipKind::Authorizes)
            .unwrap();

        assert_eq!(authorizes.count(), 3);
        let targets: HashSet<_> = authorizes
            .relationships()
            .iter()
            .map(|r| r.target_entity.entity_type)
            .collect();
        assert_eq!(targets, HashSet::from([EntityType::Coc, EntityType::ServiceScope]));
        assert_eq!(groups.iter().filter(|g| g.kind() == RelationshipKind::Authorizes).count(), 1);
    }

    #[test]
    fn test_coc_reverse_groups() {
        let store = fixtures::compliance();
        let (registry, rules) = (EntityRegistry::standard(), RuleTable::standard());
        let engine = engine(&store, &registry, &rules);

        let groups = engine
            .get_entity_relationships(EntityType::Coc, 7, &RelationshipOptions::default())
            .unwrap();
        assert_eq!(
            summary(&groups),
            vec![(RelationshipKind::Owns, 1), (RelationshipKind::Authorizes, 1)]
        );
        assert!(groups.iter().flat_map(|g| g.relationships()).all(|r| r.is_reverse));

        let saf = &groups[1].relationships()[0];
        assert_eq!(saf.source_entity.key().to_key_string(), "saf:10");
    }

    #[test]
    fn test_storage_fault_isolated_to_one_rule() {
        let store = fixtures::portfolio();
        store.execute_batch("DROP TABLE client_assets").unwrap();
        let (registry, rules) = (EntityRegistry::standard(), RuleTable::standard());
        let engine = engine(&store, &registry, &rules);

        let groups = engine
            .get_entity_relationships(EntityType::Client, 5, &RelationshipOptions::default())
            .unwrap();
        assert_eq!(summary(&groups), vec![(RelationshipKind::Owns, 3)]);
        assert!(
            groups[0]
                .relationships()
                .iter()
                .all(|r| r.target_entity.entity_type == EntityType::Contract)
        );
    }

    #[test]
    fn test_search_for_acme_clients() {
        let store = fixtures::portfolio();
        let (registry, rules) = (EntityRegistry::standard(), RuleTable::standard());
        let engine = engine(&store, &registry, &rules);

        let params = SearchParams::new().query("acme").types([EntityType::Client]).limit(5);
        let results = engine.search_entities(&params).unwrap();

        assert!(results.entities.len() <= 5);
        assert!(!results.entities.is_empty());
        for entity in &results.entities {
            assert_eq!(entity.entity_type, EntityType::Client);
            let haystack = serde_json::to_string(&entity.summary_fields).unwrap().to_lowercase();
            assert!(haystack.contains("acme"), "{} does not mention acme", entity.display_label);
        }
        assert!(results.entities.iter().all(|e| e.id != 7 && e.id != 8));
    }

    #[test]
    fn test_unknown_type_for_every_operation() {
        let store = fixtures::portfolio();
        let registry = EntityRegistry::builder()
            .register(EntityRegistry::standard().get(EntityType::Client).unwrap().clone())
            .build();
        let rules = RuleTable::standard();
        let engine = engine(&store, &registry, &rules);

        let options = RelationshipOptions::default();
        assert!(matches!(engine.get_entity(EntityType::Coc, 1), Err(Error::UnknownEntityType(_))));
        assert!(matches!(
            engine.get_entity_relationships(EntityType::Coc, 1, &options),
            Err(Error::UnknownEntityType(_))
        ));
        assert!(matches!(engine.get_relationship_stats(EntityType::Coc, 1), Err(Error::UnknownEntityType(_))));
        assert!(matches!(
            engine.get_related_entities(EntityType::Coc, 1, EntityType::Client, None),
            Err(Error::UnknownEntityType(_))
        ));
    }

    #[test]
    fn test_partial_registry_still_groups_known_kinds() {
        let store = fixtures::portfolio();
        let standard = EntityRegistry::standard();
        let registry = EntityRegistry::builder()
            .register(standard.get(EntityType::Client).unwrap().clone())
            .register(standard.get(EntityType::Contract).unwrap().clone())
            .build();
        let rules = RuleTable::standard();
        let engine = engine(&store, &registry, &rules);

        let groups = engine
            .get_entity_relationships(EntityType::Client, 5, &RelationshipOptions::default())
            .unwrap();
        assert_eq!(summary(&groups), vec![(RelationshipKind::Owns, 3)]);
    }

    #[test]
    fn test_not_found_is_not_an_error() {
        let store = fixtures::portfolio();
        let (registry, rules) = (EntityRegistry::standard(), RuleTable::standard());
        let engine = engine(&store, &registry, &rules);

        for entity_type in EntityType::all() {
            assert!(engine.get_entity(*entity_type, -1).unwrap().is_none());
            assert!(
                engine
                    .get_entity_relationships(*entity_type, -1, &RelationshipOptions::default())
                    .unwrap()
                    .is_empty()
            );
        }
    }

    #[test]
    fn test_stats_total_matches_groups() {
        let store = fixtures::compliance();
        let (registry, rules) = (EntityRegistry::standard(), RuleTable::standard());
        let engine = engine(&store, &registry, &rules);

        for (entity_type, id) in [
            (EntityType::Client, 5),
            (EntityType::Saf, 10),
            (EntityType::Coc, 7),
            (EntityType::Contract, 101),
            (EntityType::ServiceScope, 20),
        ] {
            let groups = engine
                .get_entity_relationships(entity_type, id, &RelationshipOptions::default())
                .unwrap();
            let stats = engine.get_relationship_stats(entity_type, id).unwrap();

            let sum: usize = groups.iter().map(|g| g.count()).sum();
            assert_eq!(sum, stats.total_relationships);
            assert_eq!(stats.forward + stats.reverse, stats.total_relationships);
            for group in &groups {
                assert_eq!(stats.relationship_types[&group.kind()], group.count());
            }
        }
    }

    #[test]
    fn test_saf_stats_breakdown() {
        let store = fixtures::compliance();
        let (registry, rules) = (EntityRegistry::standard(), RuleTable::standard());
        let engine = engine(&store, &registry, &rules);

        let stats = engine.get_relationship_stats(EntityType::Saf, 10).unwrap();
        assert_eq!(stats.total_relationships, 4);
        assert_eq!(stats.relationship_types[&RelationshipKind::Authorizes], 3);
        assert_eq!(stats.relationship_types[&RelationshipKind::Owns], 1);
        assert_eq!(stats.forward, 3);
        assert_eq!(stats.reverse, 1);
    }

    #[test]
    fn test_relationships_are_idempotent() {
        let store = fixtures::compliance();
        let (registry, rules) = (EntityRegistry::standard(), RuleTable::standard());
        let engine = engine(&store, &registry, &rules);

        let first = engine
            .get_entity_relationships(EntityType::Client, 5, &RelationshipOptions::default())
            .unwrap();
        let second = engine
            .get_entity_relationships(EntityType::Client, 5, &RelationshipOptions::default())
            .unwrap();

        assert_eq!(first, second);
        let ids = |groups: &[RelationshipGroup]| -> Vec<String> {
            groups.iter().flat_map(|g| g.relationships()).map(|r| r.id.clone()).collect()
        };
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn test_edge_id_matches_from_both_ends() {
        let store = fixtures::compliance();
        let (registry, rules) = (EntityRegistry::standard(), RuleTable::standard());
        let engine = engine(&store, &registry, &rules);

        let from_saf = engine.resolve_forward(EntityType::Saf, 10).unwrap();
        let from_coc = engine.resolve_reverse(EntityType::Coc, 7).unwrap();

        let edge = "saf:10->coc:7:authorizes";
        assert!(from_saf.iter().any(|r| r.id == edge));
        assert!(from_coc.iter().any(|r| r.id == edge));
    }

    #[test]
    fn test_related_entities_projection() {
        let store = fixtures::compliance();
        let (registry, rules) = (EntityRegistry::standard(), RuleTable::standard());
        let engine = engine(&store, &registry, &rules);

        let cocs = engine
            .get_related_entities(EntityType::Client, 5, EntityType::Coc, None)
            .unwrap();
        let ids: Vec<_> = cocs.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![7, 8]);

        let owners = engine
            .get_related_entities(EntityType::Coc, 7, EntityType::Client, Some(RelationshipKind::Owns))
            .unwrap();
        assert_eq!(owners.len(), 1);
        assert_eq!(owners[0].display_label, "Acme Corp");

        let none = engine
            .get_related_entities(EntityType::Coc, 7, EntityType::Client, Some(RelationshipKind::Authorizes))
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn test_related_entities_deduplicated() {
        let store = fixtures::compliance();
        store
            .execute_batch("INSERT INTO documents (id, client_id, contract_id, title) VALUES (50, 5, 101, 'MSA')")
            .unwrap();
        let (registry, rules) = (EntityRegistry::standard(), RuleTable::standard());
        let engine = engine(&store, &registry, &rules);

        let owners = engine
            .get_related_entities(EntityType::Document, 50, EntityType::Client, None)
            .unwrap();
        assert_eq!(owners.len(), 1);

        // Two rules reaching the same document

        let rules = RuleTable::builder()
            .relate(
                EntityType::Client,
                RelationshipKind::Owns,
                EntityType::Document,
                crate::rules::Access::ForeignKey { column: "client_id" },
            )
            .relate(
                EntityType::Client,
                RelationshipKind::References,
                EntityType::Document,
                crate::rules::Access::ForeignKey { column: "client_id" },
            )
            .build();
        let engine = QueryEngine::new(&store, &registry, &rules);
        let docs = engine
            .get_related_entities(EntityType::Client, 5, EntityType::Document, None)
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, 50);
    }

    #[test]
    fn test_options_flow_through_engine() {
        let store = fixtures::compliance();
        let (registry, rules) = (EntityRegistry::standard(), RuleTable::standard());
        let engine = engine(&store, &registry, &rules);

        let options = RelationshipOptions::new().exclude([RelationshipKind::Authorizes]);
        let groups = engine.get_entity_relationships(EntityType::Saf, 10, &options).unwrap();
        assert_eq!(summary(&groups), vec![(RelationshipKind::Owns, 1)]);

        let capped = RelationshipOptions::new().with_limit(1);
        let groups = engine.get_entity_relationships(EntityType::Saf, 10, &capped).unwrap();
        assert_eq!(summary(&groups), vec![(RelationshipKind::Authorizes, 1)]);
    }

    #[test]
    fn test_settings_row_limit() {
        let store = fixtures::portfolio();
        let (registry, rules) = (EntityRegistry::standard(), RuleTable::standard());
        let engine = engine(&store, &registry, &rules).with_settings(EngineSettings {
            rule_row_limit: 1,
            ..EngineSettings::default()
        });

        let stats = engine.get_relationship_stats(EntityType::Client, 5).unwrap();
        assert_eq!(stats.total_relationships, 1);
    }
}
