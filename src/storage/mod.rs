//! Storage Layer - SQLite backing store for business records
//!
//! The resolver only reads from the store:
//! - point lookup by primary key
//! - filtered list through a relationship [`Access`](crate::rules::Access)
//! - case-insensitive substring match over named columns
//!
//! Writes exist for fixture import and tests.

pub mod schema;
pub mod sqlite;

pub use sqlite::{DbStats, Row, SqliteStore};
