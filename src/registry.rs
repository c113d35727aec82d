//! Entity Registry - per-type table definitions and row transformers
//!
//! The registry is an ordinary value: build it once (usually with
//! [`EntityRegistry::standard`]) and hand it to the query engine by
//! reference. Registration order is the default visiting order for search.

use crate::entity::{EntityReference, EntityType};
use crate::storage::Row;
use crate::{Error, Result};

/// How one entity type is stored and presented.
#[derive(Debug, Clone)]
pub struct EntityDefinition {
    pub entity_type: EntityType,
    /// Backing table; primary key column is always `id`
    pub table: &'static str,
    /// Fields joined (non-empty only) to build the display label
    pub label_fields: &'static [&'static str],
    /// Fields copied into `EntityReference::summary_fields`
    pub display_fields: &'static [&'static str],
    /// Fields eligible for substring matching in search
    pub searchable_fields: &'static [&'static str],
}

impl EntityDefinition {
    pub fn new(entity_type: EntityType, table: &'static str) -> Self {
        Self {
            entity_type,
            table,
            label_fields: &[],
            display_fields: &[],
            searchable_fields: &[],
        }
    }

    pub fn label(mut self, fields: &'static [&'static str]) -> Self {
        self.label_fields = fields;
        self
    }

    pub fn display(mut self, fields: &'static [&'static str]) -> Self {
        self.display_fields = fields;
        self
    }

    pub fn searchable(mut self, fields: &'static [&'static str]) -> Self {
        self.searchable_fields = fields;
        self
    }

    /// Columns to select, `id` first, without duplicates
    pub fn columns(&self) -> Vec<&'static str> {
        let mut columns = vec!["id"];
        for field in self
            .label_fields
            .iter()
            .chain(self.display_fields)
            .chain(self.searchable_fields)
        {
            if !columns.contains(field) {
                columns.push(field);
            }
        }
        columns
    }

    /// Transform a fetched row into a normalized reference
    pub fn to_reference(&self, row: &Row) -> EntityReference {
        let parts: Vec<String> = self
            .label_fields
            .iter()
            .filter_map(|field| row.text(field))
            .filter(|text| !text.trim().is_empty())
            .collect();

        let display_label = if parts.is_empty() {
            format!("{} #{}", self.entity_type.title(), row.id)
        } else {
            parts.join(" - ")
        };

        let mut reference = EntityReference::new(self.entity_type, row.id, display_label);
        for field in self.display_fields {
            if let Some(value) = row.values.get(*field).filter(|v| !v.is_null()) {
                reference.summary_fields.insert((*field).to_string(), value.clone());
            }
        }
        reference
    }
}

/// Immutable mapping from entity type to its definition.
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    definitions: Vec<EntityDefinition>,
}

impl EntityRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Registry with every business record shape
    pub fn standard() -> Self {
        Self::builder()
            .register(
                EntityDefinition::new(EntityType::Client, "clients")
                    .label(&["name"])
                    .display(&["name", "email", "phone", "industry", "status"])
                    .searchable(&["name", "email", "industry"]),
            )
            .register(
                EntityDefinition::new(EntityType::Contract, "contracts")
                    .label(&["contract_number", "contract_name"])
                    .display(&["contract_number", "contract_name", "status", "start_date", "end_date", "total_value"])
                    .searchable(&["contract_name", "contract_number"]),
            )
            .register(
                EntityDefinition::new(EntityType::ServiceScope, "service_scopes")
                    .label(&["scope_name"])
                    .display(&["scope_name", "status", "description"])
                    .searchable(&["scope_name", "description"]),
            )
            .register(
                EntityDefinition::new(EntityType::Asset, "assets")
                    .label(&["name", "asset_tag"])
                    .display(&["name", "asset_tag", "asset_type", "serial_number", "status"])
                    .searchable(&["name", "asset_tag", "serial_number"]),
            )
            .register(
                EntityDefinition::new(EntityType::Saf, "safs")
                    .label(&["saf_number", "title"])
                    .display(&["saf_number", "title", "status"])
                    .searchable(&["saf_number", "title"]),
            )
            .register(
                EntityDefinition::new(EntityType::Coc, "cocs")
                    .label(&["coc_number", "title"])
                    .display(&["coc_number", "title", "status", "issued_date"])
                    .searchable(&["coc_number", "title"]),
            )
            .register(
                EntityDefinition::new(EntityType::Proposal, "proposals")
                    .label(&["proposal_number", "title"])
                    .display(&["proposal_number", "title", "status"])
                    .searchable(&["title", "proposal_number"]),
            )
            .register(
                EntityDefinition::new(EntityType::Document, "documents")
                    .label(&["title"])
                    .display(&["title", "filename", "document_type"])
                    .searchable(&["title", "filename"]),
            )
            .register(
                EntityDefinition::new(EntityType::FinancialTransaction, "financial_transactions")
                    .label(&["reference_number", "description"])
                    .display(&["reference_number", "transaction_type", "amount", "description"])
                    .searchable(&["reference_number", "description"]),
            )
            .register(
                EntityDefinition::new(EntityType::LicensePool, "license_pools")
                    .label(&["product_name"])
                    .display(&["product_name", "vendor", "license_type", "total_licenses"])
                    .searchable(&["product_name", "vendor"]),
            )
            .register(
                EntityDefinition::new(EntityType::Service, "services")
                    .label(&["name"])
                    .display(&["name", "category", "description"])
                    .searchable(&["name", "category", "description"]),
            )
            .register(
                EntityDefinition::new(EntityType::User, "users")
                    .label(&["name"])
                    .display(&["name", "email", "role"])
                    .searchable(&["name", "email"]),
            )
            .register(
                EntityDefinition::new(EntityType::AuditLog, "audit_logs")
                    .label(&["action", "description"])
                    .display(&["action", "entity_type", "entity_id", "description", "created_at"])
                    .searchable(&["action", "description"]),
            )
            .build()
    }

    /// Look up a definition; unregistered types are a configuration error
    pub fn get(&self, entity_type: EntityType) -> Result<&EntityDefinition> {
        self.definitions
            .iter()
            .find(|def| def.entity_type == entity_type)
            .ok_or_else(|| Error::UnknownEntityType(entity_type.as_str().to_string()))
    }

    pub fn contains(&self, entity_type: EntityType) -> bool {
        self.definitions.iter().any(|def| def.entity_type == entity_type)
    }

    /// Registered types in registration order
    pub fn types(&self) -> impl Iterator<Item = EntityType> + '_ {
        self.definitions.iter().map(|def| def.entity_type)
    }

    pub fn definitions(&self) -> &[EntityDefinition] {
        &self.definitions
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct RegistryBuilder {
    definitions: Vec<EntityDefinition>,
}

impl RegistryBuilder {
    /// Register a definition; a later registration for the same type replaces
    /// the earlier one in place
    pub fn register(mut self, definition: EntityDefinition) -> Self {
        match self
            .definitions
            .iter_mut()
            .find(|def| def.entity_type == definition.entity_type)
        {
            Some(existing) => *existing = definition,
            None => self.definitions.push(definition),
        }
        self
    }

    pub fn build(self) -> EntityRegistry {
        EntityRegistry {
            definitions: self.definitions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(id: i64, values: serde_json::Value) -> Row {
        let values = values
            .as_object()
            .map(|map| map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default();
        Row { id, values }
    }

    #[test]
    fn test_standard_registers_every_type() {
        let registry = EntityRegistry::standard();
        assert_eq!(registry.len(), EntityType::all().len());
        let types: Vec<_> = registry.types().collect();
        assert_eq!(types, EntityType::all());
    }

    #[test]
    fn test_unregistered_type_is_error() {
        let registry = EntityRegistry::builder()
            .register(EntityDefinition::new(EntityType::Client, "clients"))
            .build();

        assert!(registry.get(EntityType::Client).is_ok());
        assert!(matches!(registry.get(EntityType::Coc), Err(Error::UnknownEntityType(tag)) if tag == "coc"));
    }

    #[test]
    fn test_columns_are_deduplicated() {
        let registry = EntityRegistry::standard();
        let columns = registry.get(EntityType::Contract).unwrap().columns();
        assert_eq!(columns[0], "id");
        assert_eq!(columns.iter().filter(|c| **c == "contract_name").count(), 1);
    }

    #[test]
    fn test_label_joins_non_empty_fields() {
        let registry = EntityRegistry::standard();
        let def = registry.get(EntityType::Contract).unwrap();

        let reference = def.to_reference(&row(3, json!({
            "contract_number": "CN-003",
            "contract_name": "Managed Print",
            "status": "active",
            "end_date": null,
        })));
        assert_eq!(reference.display_label, "CN-003 - Managed Print");
        assert_eq!(reference.summary_fields.get("status"), Some(&json!("active")));
        assert!(!reference.summary_fields.contains_key("end_date"));

        let partial = def.to_reference(&row(4, json!({ "contract_number": "", "contract_name": "Backup" })));
        assert_eq!(partial.display_label, "Backup");
    }

    #[test]
    fn test_label_falls_back_to_type_and_id() {
        let registry = EntityRegistry::standard();
        let def = registry.get(EntityType::ServiceScope).unwrap();
        let reference = def.to_reference(&row(12, json!({})));
        assert_eq!(reference.display_label, "Service Scope #12");
    }

    #[test]
    fn test_register_replaces_in_place() {
        let registry = EntityRegistry::builder()
            .register(EntityDefinition::new(EntityType::Client, "clients"))
            .register(EntityDefinition::new(EntityType::User, "users"))
            .register(EntityDefinition::new(EntityType::Client, "customers"))
            .build();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.definitions()[0].table, "customers");
    }
}
