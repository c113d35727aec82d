//! Relationship types - resolved edges between business records
//!
//! Every relationship reduces to one of four kinds:
//! - `Owns`: client → contract, asset, SAF, COC, document, license pool
//! - `Contains`: contract → service scope, proposal, transaction, document
//! - `Authorizes`: SAF → COC, service scope
//! - `References`: service scope → service, audit log → user

use crate::entity::{EntityReference, EntityType};
use crate::key::EntityKey;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Relationship kinds between business records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipKind {
    /// Source owns the target (client owns a contract)
    Owns,
    /// Source contains the target (contract contains a proposal)
    Contains,
    /// Source authorizes the target (SAF authorizes a COC)
    Authorizes,
    /// Source points at the target without owning it
    References,
}

impl RelationshipKind {
    /// Get the string representation of the relationship kind
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipKind::Owns => "owns",
            RelationshipKind::Contains => "contains",
            RelationshipKind::Authorizes => "authorizes",
            RelationshipKind::References => "references",
        }
    }

    /// Get all relationship kinds
    pub fn all() -> &'static [RelationshipKind] {
        &[
            RelationshipKind::Owns,
            RelationshipKind::Contains,
            RelationshipKind::Authorizes,
            RelationshipKind::References,
        ]
    }

    /// Strength assigned to edges of this kind unless a rule overrides it
    pub fn default_strength(&self) -> f32 {
        match self {
            RelationshipKind::Owns | RelationshipKind::Contains | RelationshipKind::Authorizes => 1.0,
            RelationshipKind::References => 0.8,
        }
    }
}

impl FromStr for RelationshipKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "owns" | "own" => Ok(RelationshipKind::Owns),
            "contains" | "contain" => Ok(RelationshipKind::Contains),
            "authorizes" | "authorize" | "authorises" => Ok(RelationshipKind::Authorizes),
            "references" | "reference" | "ref" => Ok(RelationshipKind::References),
            _ => Err(crate::Error::UnknownRelationshipKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which side of a rule the subject sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Subject is the owner; targets are what it owns/contains/authorizes
    Forward,
    /// Subject is the owned side; targets are the records holding it
    Reverse,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Reverse => "reverse",
        }
    }

    pub fn is_reverse(&self) -> bool {
        matches!(self, Direction::Reverse)
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Deterministic id of an edge: `{srcType}:{srcId}->{tgtType}:{tgtId}:{kind}`
pub fn relationship_id(source: EntityKey, target: EntityKey, kind: RelationshipKind) -> String {
    format!("{}->{}:{}", source, target, kind.as_str())
}

/// One resolved edge between two entity references.
///
/// Edges are always oriented owner → owned. A relationship discovered from
/// the owned side keeps that orientation and sets `is_reverse`, so both ends
/// of the same edge produce the same `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    pub id: String,
    pub source_entity: EntityReference,
    pub target_entity: EntityReference,
    pub kind: RelationshipKind,
    /// True when the subject is `target_entity`
    pub is_reverse: bool,
    /// Strength in `[0.0, 1.0]`
    pub strength: f32,
}

impl Relationship {
    /// Edge from the subject to something it owns/contains/authorizes
    pub fn forward(subject: EntityReference, target: EntityReference, kind: RelationshipKind) -> Self {
        Self::build(subject, target, kind, false)
    }

    /// Edge from another record that holds the subject
    pub fn reverse(holder: EntityReference, subject: EntityReference, kind: RelationshipKind) -> Self {
        Self::build(holder, subject, kind, true)
    }

    fn build(source: EntityReference, target: EntityReference, kind: RelationshipKind, is_reverse: bool) -> Self {
        Self {
            id: relationship_id(source.key(), target.key(), kind),
            source_entity: source,
            target_entity: target,
            kind,
            is_reverse,
            strength: kind.default_strength(),
        }
    }

    /// Override the strength (clamped to `[0.0, 1.0]`)
    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = strength.clamp(0.0, 1.0);
        self
    }

    /// The entity the relationship was resolved for
    pub fn subject(&self) -> &EntityReference {
        if self.is_reverse { &self.target_entity } else { &self.source_entity }
    }

    /// The other side of the relationship
    pub fn counterpart(&self) -> &EntityReference {
        if self.is_reverse { &self.source_entity } else { &self.target_entity }
    }

    pub fn counterpart_type(&self) -> EntityType {
        self.counterpart().entity_type
    }
}

impl PartialEq for Relationship {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.is_reverse == other.is_reverse
    }
}

impl Eq for Relationship {}

impl std::hash::Hash for Relationship {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.is_reverse.hash(state);
    }
}

/// All relationships of one kind for one subject.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationshipGroup {
    kind: RelationshipKind,
    count: usize,
    relationships: Vec<Relationship>,
}

impl RelationshipGroup {
    pub fn new(kind: RelationshipKind, relationships: Vec<Relationship>) -> Self {
        Self {
            kind,
            count: relationships.len(),
            relationships,
        }
    }

    pub(crate) fn push(&mut self, relationship: Relationship) {
        self.relationships.push(relationship);
        self.count = self.relationships.len();
    }

    pub fn kind(&self) -> RelationshipKind {
        self.kind
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    pub fn into_relationships(self) -> Vec<Relationship> {
        self.relationships
    }
}
