//! Entity types - the business record shapes in the relationship graph
//!
//! Every record the resolver touches is one of thirteen shapes:
//! - Commercial: `Client`, `Contract`, `Proposal`, `FinancialTransaction`
//! - Delivery: `ServiceScope`, `Service`, `Asset`, `LicensePool`
//! - Compliance: `Saf` (service authorization form), `Coc` (compliance certificate)
//! - Supporting: `Document`, `User`, `AuditLog`

use crate::key::EntityKey;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Tag identifying one business record shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityType {
    Client,
    Contract,
    ServiceScope,
    Asset,
    /// Service authorization form
    Saf,
    /// Compliance certificate
    Coc,
    Proposal,
    Document,
    FinancialTransaction,
    LicensePool,
    Service,
    User,
    AuditLog,
}

impl EntityType {
    /// Get the string tag of the entity type
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Client => "client",
            EntityType::Contract => "contract",
            EntityType::ServiceScope => "service-scope",
            EntityType::Asset => "asset",
            EntityType::Saf => "saf",
            EntityType::Coc => "coc",
            EntityType::Proposal => "proposal",
            EntityType::Document => "document",
            EntityType::FinancialTransaction => "financial-transaction",
            EntityType::LicensePool => "license-pool",
            EntityType::Service => "service",
            EntityType::User => "user",
            EntityType::AuditLog => "audit-log",
        }
    }

    /// Human readable name, used for fallback labels
    pub fn title(&self) -> &'static str {
        match self {
            EntityType::Client => "Client",
            EntityType::Contract => "Contract",
            EntityType::ServiceScope => "Service Scope",
            EntityType::Asset => "Asset",
            EntityType::Saf => "SAF",
            EntityType::Coc => "COC",
            EntityType::Proposal => "Proposal",
            EntityType::Document => "Document",
            EntityType::FinancialTransaction => "Financial Transaction",
            EntityType::LicensePool => "License Pool",
            EntityType::Service => "Service",
            EntityType::User => "User",
            EntityType::AuditLog => "Audit Log",
        }
    }

    /// Get all entity types
    pub fn all() -> &'static [EntityType] {
        &[
            EntityType::Client,
            EntityType::Contract,
            EntityType::ServiceScope,
            EntityType::Asset,
            EntityType::Saf,
            EntityType::Coc,
            EntityType::Proposal,
            EntityType::Document,
            EntityType::FinancialTransaction,
            EntityType::LicensePool,
            EntityType::Service,
            EntityType::User,
            EntityType::AuditLog,
        ]
    }
}

impl FromStr for EntityType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "client" | "customer" => Ok(EntityType::Client),
            "contract" => Ok(EntityType::Contract),
            "service-scope" | "scope" => Ok(EntityType::ServiceScope),
            "asset" => Ok(EntityType::Asset),
            "saf" | "authorization-form" | "service-authorization-form" => Ok(EntityType::Saf),
            "coc" | "compliance-certificate" | "certificate" => Ok(EntityType::Coc),
            "proposal" => Ok(EntityType::Proposal),
            "document" | "doc" => Ok(EntityType::Document),
            "financial-transaction" | "transaction" => Ok(EntityType::FinancialTransaction),
            "license-pool" | "license" => Ok(EntityType::LicensePool),
            "service" => Ok(EntityType::Service),
            "user" => Ok(EntityType::User),
            "audit-log" | "audit" => Ok(EntityType::AuditLog),
            _ => Err(Error::UnknownEntityType(s.to_string())),
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normalized, read-only snapshot of one record.
///
/// Built fresh from a backing row on every fetch. Identity is the
/// `(entity_type, id)` pair; the label and summary only mirror the row
/// at read time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityReference {
    pub entity_type: EntityType,
    pub id: i64,
    pub display_label: String,
    /// Display fields of the row that were not null
    pub summary_fields: BTreeMap<String, serde_json::Value>,
}

impl EntityReference {
    /// Create a reference with no summary fields
    pub fn new(entity_type: EntityType, id: i64, display_label: impl Into<String>) -> Self {
        Self {
            entity_type,
            id,
            display_label: display_label.into(),
            summary_fields: BTreeMap::new(),
        }
    }

    /// Add a summary field
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.summary_fields.insert(name.into(), value.into());
        self
    }

    pub fn key(&self) -> EntityKey {
        EntityKey::new(self.entity_type, self.id)
    }
}

impl PartialEq for EntityReference {
    fn eq(&self, other: &Self) -> bool {
        self.entity_type == other.entity_type && self.id == other.id
    }
}

impl Eq for EntityReference {}

impl std::hash::Hash for EntityReference {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.entity_type.hash(state);
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_type_roundtrip() {
        for entity_type in EntityType::all() {
            let parsed: EntityType = entity_type.as_str().parse().unwrap();
            assert_eq!(*entity_type, parsed);
        }
    }

    #[test]
    fn test_entity_type_aliases() {
        assert_eq!(EntityType::from_str("service_scope").unwrap(), EntityType::ServiceScope);
        assert_eq!(EntityType::from_str("Compliance-Certificate").unwrap(), EntityType::Coc);
        assert_eq!(EntityType::from_str("authorization-form").unwrap(), EntityType::Saf);
        assert_eq!(EntityType::from_str("transaction").unwrap(), EntityType::FinancialTransaction);
    }

    #[test]
    fn test_unknown_entity_type() {
        let err = EntityType::from_str("invoice").unwrap_err();
        assert!(matches!(err, Error::UnknownEntityType(tag) if tag == "invoice"));
    }

    #[test]
    fn test_serde_tag_matches_as_str() {
        let json = serde_json::to_string(&EntityType::FinancialTransaction).unwrap();
        assert_eq!(json, "\"financial-transaction\"");
    }

    #[test]
    fn test_reference_identity_ignores_label() {
        let a = EntityReference::new(EntityType::Client, 5, "Acme Corp").with_field("status", "active");
        let b = EntityReference::new(EntityType::Client, 5, "Acme Corporation");
        let c = EntityReference::new(EntityType::Contract, 5, "Acme Corp");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.key().to_key_string(), "client:5");
    }
}
