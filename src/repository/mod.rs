//! Repository layer for datastore operations
//!
//! Services only see the store traits below. `Repository::new` wires the
//! PostgreSQL implementations, `Repository::in_memory` a process-local store.

pub mod equipment;
pub mod equipment_types;
pub mod memory;
pub mod users;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{Equipment, EquipmentType, User},
};

/// Equipment persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EquipmentStore: Send + Sync {
    /// Whether any equipment (of any type) already uses this serial number
    async fn serial_exists(&self, serial_number: &str, exclude_id: Option<i32>) -> AppResult<bool>;

    /// All equipment sharing a type and notation, in storage order
    async fn list_by_group(&self, type_id: i32, notation: &str) -> AppResult<Vec<Equipment>>;

    /// Insert one record per serial number, all or nothing
    async fn create_batch(
        &self,
        type_id: i32,
        notation: &str,
        serial_numbers: &[String],
    ) -> AppResult<Vec<Equipment>>;

    async fn get_by_id(&self, id: i32) -> AppResult<Equipment>;

    /// Page of equipment whose type name or serial number matches every term
    async fn list(&self, terms: &[String], page: i64, per_page: i64) -> AppResult<(Vec<Equipment>, i64)>;

    async fn update(
        &self,
        id: i32,
        type_id: i32,
        serial_number: &str,
        notation: &str,
    ) -> AppResult<Equipment>;

    async fn delete(&self, id: i32) -> AppResult<()>;
}

/// Equipment type persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EquipmentTypeStore: Send + Sync {
    async fn get_by_id(&self, id: i32) -> AppResult<EquipmentType>;

    /// Page of types whose name or mask matches every term
    async fn list(&self, terms: &[String], page: i64, per_page: i64) -> AppResult<(Vec<EquipmentType>, i64)>;

    async fn create(&self, name: &str, serial_number_mask: &str) -> AppResult<EquipmentType>;

    async fn update(&self, id: i32, name: &str, serial_number_mask: &str) -> AppResult<EquipmentType>;

    /// Delete a type together with all of its equipment
    async fn delete(&self, id: i32) -> AppResult<()>;
}

/// User account persistence
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_by_login(&self, login: &str) -> AppResult<Option<User>>;

    async fn create(&self, login: &str, password_hash: &str, is_admin: bool) -> AppResult<User>;
}

/// Main repository struct holding the datastore collaborators
#[derive(Clone)]
pub struct Repository {
    pub equipment: Arc<dyn EquipmentStore>,
    pub equipment_types: Arc<dyn EquipmentTypeStore>,
    pub users: Arc<dyn UserStore>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            equipment: Arc::new(equipment::EquipmentRepository::new(pool.clone())),
            equipment_types: Arc::new(equipment_types::EquipmentTypesRepository::new(pool.clone())),
            users: Arc::new(users::UsersRepository::new(pool)),
        }
    }

    /// Create a repository backed by a fresh in-memory store
    pub fn in_memory() -> Self {
        let store = memory::MemoryStore::default();
        Self {
            equipment: Arc::new(store.clone()),
            equipment_types: Arc::new(store.clone()),
            users: Arc::new(store),
        }
    }
}

/// Row offset of a page; saturates instead of overflowing on huge page numbers
pub(crate) fn page_offset(page: i64, per_page: i64) -> i64 {
    (page.max(1) - 1).saturating_mul(per_page.max(0))
}

/// `ILIKE` pattern matching `term` anywhere, with wildcards in the term escaped
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// `WHERE` clause requiring each term to match one of `columns`.
///
/// Placeholders are numbered from `$1`, one per term; bind `like_pattern(term)` for each.
pub(crate) fn search_clause(columns: &[&str], term_count: usize) -> String {
    if term_count == 0 {
        return String::new();
    }
    let conditions: Vec<String> = (1..=term_count)
        .map(|idx| {
            let alternatives: Vec<String> = columns
                .iter()
                .map(|column| format!("{} ILIKE ${}", column, idx))
                .collect();
            format!("({})", alternatives.join(" OR "))
        })
        .collect();
    format!("WHERE {}", conditions.join(" AND "))
}
