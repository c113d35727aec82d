//! Entity key - stable textual identity for a record
//!
//! Format: `<type>:<id>`
//!
//! Examples:
//! - `client:5`
//! - `service-scope:12`

use crate::entity::EntityType;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identity of one record: its type tag plus primary key.
///
/// Used as:
/// - CLI argument syntax
/// - de-duplication key for projections
/// - building block of relationship ids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityKey {
    pub entity_type: EntityType,
    pub id: i64,
}

impl EntityKey {
    pub fn new(entity_type: EntityType, id: i64) -> Self {
        Self { entity_type, id }
    }

    /// Parse a key string
    ///
    /// Expected format: `<type>:<id>`. Type aliases are accepted.
    pub fn parse(key: &str) -> Result<Self> {
        let (type_str, id_str) = key
            .rsplit_once(':')
            .ok_or_else(|| Error::InvalidKey(format!("Key must be <type>:<id>, got {}", key)))?;

        let entity_type = EntityType::from_str(type_str)?;
        let id: i64 = id_str
            .trim()
            .parse()
            .map_err(|_| Error::InvalidKey(format!("Invalid id: {}", id_str)))?;

        Ok(Self { entity_type, id })
    }

    /// Convert to key string
    pub fn to_key_string(&self) -> String {
        format!("{}:{}", self.entity_type.as_str(), self.id)
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_key_string())
    }
}

impl FromStr for EntityKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for EntityKey {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_key_string())
    }
}

impl<'de> Deserialize<'de> for EntityKey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        EntityKey::parse(&s).map_err(serde::de::Error::custom)
    }
}
