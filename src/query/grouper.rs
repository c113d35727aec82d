//! Relationship grouping by kind

use crate::relationship::{Relationship, RelationshipGroup, RelationshipKind};
use serde::{Deserialize, Serialize};

/// Filters applied to resolved relationships before grouping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationshipOptions {
    /// Keep only these kinds
    pub include_kinds: Option<Vec<RelationshipKind>>,
    /// Drop these kinds
    pub exclude_kinds: Option<Vec<RelationshipKind>>,
    /// Cap on the number of relationships kept
    pub limit: Option<usize>,
}

impl RelationshipOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include(mut self, kinds: impl IntoIterator<Item = RelationshipKind>) -> Self {
        self.include_kinds = Some(kinds.into_iter().collect());
        self
    }

    pub fn exclude(mut self, kinds: impl IntoIterator<Item = RelationshipKind>) -> Self {
        self.exclude_kinds = Some(kinds.into_iter().collect());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn allows(&self, kind: RelationshipKind) -> bool {
        let included = self.include_kinds.as_ref().is_none_or(|kinds| kinds.contains(&kind));
        let excluded = self.exclude_kinds.as_ref().is_some_and(|kinds| kinds.contains(&kind));
        included && !excluded
    }
}

/// Filter, cap, then partition by kind
///
/// Groups appear in the order their kind is first encountered; members keep
/// their input order.
pub fn group_relationships(relationships: Vec<Relationship>, options: &RelationshipOptions) -> Vec<RelationshipGroup> {
    let limit = options.limit.unwrap_or(usize::MAX);
    let mut groups: Vec<RelationshipGroup> = Vec::new();

    for relationship in relationships
        .into_iter()
        .filter(|rel| options.allows(rel.kind))
        .take(limit)
    {
        match groups.iter_mut().find(|group| group.kind() == relationship.kind) {
            Some(group) => group.push(relationship),
            None => groups.push(RelationshipGroup::new(relationship.kind, vec![relationship])),
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityReference, EntityType};

    fn rel(target: EntityType, id: i64, kind: RelationshipKind) -> Relationship {
        let subject = EntityReference::new(EntityType::Contract, 1, "Support");
        Relationship::forward(subject, EntityReference::new(target, id, "x"), kind)
    }

    fn sample() -> Vec<Relationship> {
        vec![
            rel(EntityType::ServiceScope, 1, RelationshipKind::Contains),
            rel(EntityType::Client, 5, RelationshipKind::Owns),
            rel(EntityType::Proposal, 2, RelationshipKind::Contains),
            rel(EntityType::Document, 3, RelationshipKind::Contains),
        ]
    }

    #[test]
    fn test_groups_in_encounter_order() {
        let groups = group_relationships(sample(), &RelationshipOptions::default());

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].kind(), RelationshipKind::Contains);
        assert_eq!(groups[0].count(), 3);
        assert_eq!(groups[1].kind(), RelationshipKind::Owns);

        let order: Vec<_> = groups[0].relationships().iter().map(|r| r.target_entity.id).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn test_include_and_exclude() {
        let only_owns = group_relationships(sample(), &RelationshipOptions::new().include([RelationshipKind::Owns]));
        assert_eq!(only_owns.len(), 1);
        assert_eq!(only_owns[0].kind(), RelationshipKind::Owns);

        let no_contains = group_relationships(sample(), &RelationshipOptions::new().exclude([RelationshipKind::Contains]));
        assert_eq!(no_contains.len(), 1);
        assert_eq!(no_contains[0].count(), 1);
    }

    #[test]
    fn test_limit_applies_after_filtering() {
        let options = RelationshipOptions::new()
            .exclude([RelationshipKind::Owns])
            .with_limit(2);
        let groups = group_relationships(sample(), &options);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].count(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(group_relationships(Vec::new(), &RelationshipOptions::default()).is_empty());
    }
}
