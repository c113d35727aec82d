//! Relationship Rule Table - declarative relationship semantics
//!
//! Every relationship the resolver can produce is declared here as data.
//! A rule says: starting from a subject of `source_type`, fetch rows of
//! `target_type` through `access`, and label the resulting edges `kind`.
//! Adding a new entity-type pair is one [`RuleTableBuilder::relate`] call,
//! which registers the forward rule and its mirrored reverse rule.

use crate::entity::EntityType;
use crate::relationship::{Direction, RelationshipKind};
use std::fmt;

/// Declarative filtered fetch from a subject id to target rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Target rows whose `column` equals the subject id
    ForeignKey { column: &'static str },
    /// The target row whose id is stored in the subject row's `column`
    ParentKey { column: &'static str },
    /// Target rows linked through an assignment table
    JoinTable {
        table: &'static str,
        subject_column: &'static str,
        target_column: &'static str,
    },
}

impl Access {
    /// The same link walked from the other end
    pub fn mirrored(&self) -> Access {
        match *self {
            Access::ForeignKey { column } => Access::ParentKey { column },
            Access::ParentKey { column } => Access::ForeignKey { column },
            Access::JoinTable { table, subject_column, target_column } => Access::JoinTable {
                table,
                subject_column: target_column,
                target_column: subject_column,
            },
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::ForeignKey { column } => write!(f, "target.{}", column),
            Access::ParentKey { column } => write!(f, "subject.{}", column),
            Access::JoinTable { table, subject_column, target_column } => {
                write!(f, "{}({} -> {})", table, subject_column, target_column)
            }
        }
    }
}

/// One declared relationship from the point of view of `source_type`.
#[derive(Debug, Clone, PartialEq)]
pub struct RelationshipRule {
    /// Type of the subject the rule is evaluated for
    pub source_type: EntityType,
    /// Type of the rows the rule fetches
    pub target_type: EntityType,
    pub kind: RelationshipKind,
    pub direction: Direction,
    pub access: Access,
    pub strength: f32,
}

impl RelationshipRule {
    pub fn new(
        source_type: EntityType,
        target_type: EntityType,
        kind: RelationshipKind,
        direction: Direction,
        access: Access,
    ) -> Self {
        Self {
            source_type,
            target_type,
            kind,
            direction,
            access,
            strength: kind.default_strength(),
        }
    }

    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = strength.clamp(0.0, 1.0);
        self
    }

    /// The rule evaluated from the target's side
    pub fn mirrored(&self) -> RelationshipRule {
        RelationshipRule {
            source_type: self.target_type,
            target_type: self.source_type,
            kind: self.kind,
            direction: match self.direction {
                Direction::Forward => Direction::Reverse,
                Direction::Reverse => Direction::Forward,
            },
            access: self.access.mirrored(),
            strength: self.strength,
        }
    }
}

impl fmt::Display for RelationshipRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -{}-> {} ({}, via {})",
            self.source_type, self.kind, self.target_type, self.direction, self.access
        )
    }
}

/// Immutable table of relationship rules, in registration order.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<RelationshipRule>,
}

impl RuleTable {
    pub fn builder() -> RuleTableBuilder {
        RuleTableBuilder::default()
    }

    /// Relationship semantics of the services-management domain
    pub fn standard() -> Self {
        use EntityType::*;
        use RelationshipKind::*;

        Self::builder()
            .relate(Client, Owns, Contract, Access::ForeignKey { column: "client_id" })
            .relate(
                Client,
                Owns,
                Asset,
                Access::JoinTable {
                    table: "client_assets",
                    subject_column: "client_id",
                    target_column: "asset_id",
                },
            )
            .relate(Client, Owns, Saf, Access::ForeignKey { column: "client_id" })
            .relate(Client, Owns, Coc, Access::ForeignKey { column: "client_id" })
            .relate(Client, Owns, Document, Access::ForeignKey { column: "client_id" })
            .relate(
                Client,
                Owns,
                LicensePool,
                Access::JoinTable {
                    table: "license_assignments",
                    subject_column: "client_id",
                    target_column: "license_pool_id",
                },
            )
            .relate(Contract, Contains, ServiceScope, Access::ForeignKey { column: "contract_id" })
            .relate(Contract, Contains, Proposal, Access::ForeignKey { column: "contract_id" })
            .relate(Contract, Contains, FinancialTransaction, Access::ForeignKey { column: "contract_id" })
            .relate(Contract, Contains, Document, Access::ForeignKey { column: "contract_id" })
            .relate(Saf, Authorizes, Coc, Access::ForeignKey { column: "saf_id" })
            .relate(Saf, Authorizes, ServiceScope, Access::ForeignKey { column: "saf_id" })
            .relate(ServiceScope, References, Service, Access::ParentKey { column: "service_id" })
            .relate(AuditLog, References, User, Access::ParentKey { column: "user_id" })
            .build()
    }

    /// Rules evaluated for a subject of `entity_type` in the given direction
    pub fn rules_for(&self, entity_type: EntityType, direction: Direction) -> impl Iterator<Item = &RelationshipRule> {
        self.rules
            .iter()
            .filter(move |rule| rule.source_type == entity_type && rule.direction == direction)
    }

    pub fn rules(&self) -> &[RelationshipRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct RuleTableBuilder {
    rules: Vec<RelationshipRule>,
}

impl RuleTableBuilder {
    /// Declare `owner -kind-> owned`, registering the forward rule on the
    /// owner and the mirrored reverse rule on the owned type
    pub fn relate(self, owner: EntityType, kind: RelationshipKind, owned: EntityType, access: Access) -> Self {
        let forward = RelationshipRule::new(owner, owned, kind, Direction::Forward, access);
        let reverse = forward.mirrored();
        self.rule(forward).rule(reverse)
    }

    /// Register a single rule as-is
    pub fn rule(mut self, rule: RelationshipRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn build(self) -> RuleTable {
        RuleTable { rules: self.rules }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_forward_rule_has_a_mirror() {
        let table = RuleTable::standard();
        for rule in table.rules().iter().filter(|r| r.direction == Direction::Forward) {
            let mirror = rule.mirrored();
            assert!(
                table.rules().contains(&mirror),
                "missing reverse rule for {}",
                rule
            );
        }
    }

    #[test]
    fn test_client_forward_rules_in_registration_order() {
        let table = RuleTable::standard();
        let targets: Vec<_> = table
            .rules_for(EntityType::Client, Direction::Forward)
            .map(|r| r.target_type)
            .collect();
        assert_eq!(
            targets,
            vec![
                EntityType::Contract,
                EntityType::Asset,
                EntityType::Saf,
                EntityType::Coc,
                EntityType::Document,
                EntityType::LicensePool,
            ]
        );
        assert_eq!(table.rules_for(EntityType::Client, Direction::Reverse).count(), 0);
    }

    #[test]
    fn test_coc_reverse_rules() {
        let table = RuleTable::standard();
        let reverse: Vec<_> = table
            .rules_for(EntityType::Coc, Direction::Reverse)
            .map(|r| (r.target_type, r.kind))
            .collect();
        assert_eq!(
            reverse,
            vec![
                (EntityType::Client, RelationshipKind::Owns),
                (EntityType::Saf, RelationshipKind::Authorizes),
            ]
        );
    }

    #[test]
    fn test_access_mirroring() {
        let fk = Access::ForeignKey { column: "client_id" };
        assert_eq!(fk.mirrored(), Access::ParentKey { column: "client_id" });
        assert_eq!(fk.mirrored().mirrored(), fk);

        let join = Access::JoinTable {
            table: "client_assets",
            subject_column: "client_id",
            target_column: "asset_id",
        };
        assert_eq!(
            join.mirrored(),
            Access::JoinTable {
                table: "client_assets",
                subject_column: "asset_id",
                target_column: "client_id",
            }
        );
    }

    #[test]
    fn test_rule_display() {
        let rule = RelationshipRule::new(
            EntityType::Saf,
            EntityType::Coc,
            RelationshipKind::Authorizes,
            Direction::Forward,
            Access::ForeignKey { column: "saf_id" },
        );
        assert_eq!(rule.to_string(), "saf -authorizes-> coc (forward, via target.saf_id)");
    }
}
