//! In-memory datastore
//!
//! Enforces the same constraints as the PostgreSQL schema: globally unique
//! serial numbers, equipment referencing an existing type, cascade on type
//! delete, unique logins. Rows are kept in id order.

use std::{collections::BTreeMap, sync::Arc};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::{page_offset, EquipmentStore, EquipmentTypeStore, UserStore};
use crate::{
    error::{AppError, AppResult},
    models::{Equipment, EquipmentType, User},
};

#[derive(Default)]
struct MemoryState {
    last_equipment_id: i32,
    last_type_id: i32,
    last_user_id: i32,
    equipment: BTreeMap<i32, Equipment>,
    types: BTreeMap<i32, EquipmentType>,
    users: BTreeMap<i32, User>,
}

impl MemoryState {
    fn serial_taken(&self, serial_number: &str, exclude_id: Option<i32>) -> bool {
        self.equipment
            .values()
            .any(|e| e.serial_number == serial_number && Some(e.id) != exclude_id)
    }

    fn require_type(&self, type_id: i32) -> AppResult<()> {
        if self.types.contains_key(&type_id) {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Equipment type {} not found", type_id)))
        }
    }
}

/// Case-insensitive: every term is contained in at least one field
fn matches_terms(fields: &[&str], terms: &[String]) -> bool {
    let fields: Vec<String> = fields.iter().map(|f| f.to_lowercase()).collect();
    terms.iter().all(|term| {
        let term = term.to_lowercase();
        fields.iter().any(|f| f.contains(&term))
    })
}

fn paginate<T: Clone>(rows: Vec<T>, page: i64, per_page: i64) -> (Vec<T>, i64) {
    let total = rows.len() as i64;
    let offset = usize::try_from(page_offset(page, per_page)).unwrap_or(usize::MAX);
    let page_rows = rows
        .into_iter()
        .skip(offset)
        .take(per_page.max(0) as usize)
        .collect();
    (page_rows, total)
}

/// Process-local store; clones share the same state
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

#[async_trait]
impl EquipmentStore for MemoryStore {
    async fn serial_exists(&self, serial_number: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let state = self.state.lock().await;
        Ok(state.serial_taken(serial_number, exclude_id))
    }

    async fn list_by_group(&self, type_id: i32, notation: &str) -> AppResult<Vec<Equipment>> {
        let state = self.state.lock().await;
        Ok(state
            .equipment
            .values()
            .filter(|e| e.type_id == type_id && e.notation == notation)
            .cloned()
            .collect())
    }

    async fn create_batch(
        &self,
        type_id: i32,
        notation: &str,
        serial_numbers: &[String],
    ) -> AppResult<Vec<Equipment>> {
        let mut state = self.state.lock().await;
        state.require_type(type_id)?;

        // Check the whole batch before touching the map
        for (idx, serial_number) in serial_numbers.iter().enumerate() {
            if state.serial_taken(serial_number, None) || serial_numbers[..idx].contains(serial_number) {
                return Err(AppError::duplicate_serial(serial_number));
            }
        }

        let now = Utc::now();
        let mut created = Vec::with_capacity(serial_numbers.len());
        for serial_number in serial_numbers {
            state.last_equipment_id += 1;
            let equipment = Equipment {
                id: state.last_equipment_id,
                type_id,
                serial_number: serial_number.clone(),
                notation: notation.to_string(),
                created_at: now,
                updated_at: now,
            };
            state.equipment.insert(equipment.id, equipment.clone());
            created.push(equipment);
        }
        Ok(created)
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Equipment> {
        let state = self.state.lock().await;
        state
            .equipment
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    async fn list(&self, terms: &[String], page: i64, per_page: i64) -> AppResult<(Vec<Equipment>, i64)> {
        let state = self.state.lock().await;
        let rows: Vec<Equipment> = state
            .equipment
            .values()
            .filter(|e| {
                let type_name = state
                    .types
                    .get(&e.type_id)
                    .map(|t| t.name.as_str())
                    .unwrap_or_default();
                matches_terms(&[type_name, e.serial_number.as_str()], terms)
            })
            .cloned()
            .collect();
        Ok(paginate(rows, page, per_page))
    }

    async fn update(
        &self,
        id: i32,
        type_id: i32,
        serial_number: &str,
        notation: &str,
    ) -> AppResult<Equipment> {
        let mut state = self.state.lock().await;
        if !state.equipment.contains_key(&id) {
            return Err(AppError::NotFound(format!("Equipment {} not found", id)));
        }
        state.require_type(type_id)?;
        if state.serial_taken(serial_number, Some(id)) {
            return Err(AppError::duplicate_serial(serial_number));
        }

        let equipment = state
            .equipment
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))?;
        equipment.type_id = type_id;
        equipment.serial_number = serial_number.to_string();
        equipment.notation = notation.to_string();
        equipment.updated_at = Utc::now();
        Ok(equipment.clone())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state
            .equipment
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }
}

#[async_trait]
impl EquipmentTypeStore for MemoryStore {
    async fn get_by_id(&self, id: i32) -> AppResult<EquipmentType> {
        let state = self.state.lock().await;
        state
            .types
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Equipment type {} not found", id)))
    }

    async fn list(&self, terms: &[String], page: i64, per_page: i64) -> AppResult<(Vec<EquipmentType>, i64)> {
        let state = self.state.lock().await;
        let rows: Vec<EquipmentType> = state
            .types
            .values()
            .filter(|t| matches_terms(&[t.name.as_str(), t.serial_number_mask.as_str()], terms))
            .cloned()
            .collect();
        Ok(paginate(rows, page, per_page))
    }

    async fn create(&self, name: &str, serial_number_mask: &str) -> AppResult<EquipmentType> {
        let mut state = self.state.lock().await;
        state.last_type_id += 1;
        let equipment_type = EquipmentType {
            id: state.last_type_id,
            name: name.to_string(),
            serial_number_mask: serial_number_mask.to_string(),
        };
        state.types.insert(equipment_type.id, equipment_type.clone());
        Ok(equipment_type)
    }

    async fn update(&self, id: i32, name: &str, serial_number_mask: &str) -> AppResult<EquipmentType> {
        let mut state = self.state.lock().await;
        let equipment_type = state
            .types
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Equipment type {} not found", id)))?;
        equipment_type.name = name.to_string();
        equipment_type.serial_number_mask = serial_number_mask.to_string();
        Ok(equipment_type.clone())
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if state.types.remove(&id).is_none() {
            return Err(AppError::NotFound(format!("Equipment type {} not found", id)));
        }
        state.equipment.retain(|_, e| e.type_id != id);
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_by_login(&self, login: &str) -> AppResult<Option<User>> {
        let state = self.state.lock().await;
        Ok(state.users.values().find(|u| u.login == login).cloned())
    }

    async fn create(&self, login: &str, password_hash: &str, is_admin: bool) -> AppResult<User> {
        let mut state = self.state.lock().await;
        if state.users.values().any(|u| u.login == login) {
            return Err(AppError::Conflict("Login already exists".to_string()));
        }
        state.last_user_id += 1;
        let user = User {
            id: state.last_user_id,
            login: login.to_string(),
            password: password_hash.to_string(),
            is_admin,
        };
        state.users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serials(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_create_batch_is_all_or_nothing() {
        let store = MemoryStore::default();
        let t = EquipmentTypeStore::create(&store, "Router", "NN").await.unwrap();
        store.create_batch(t.id, "rack", &serials(&["11"])).await.unwrap();

        let result = store.create_batch(t.id, "rack", &serials(&["12", "11"])).await;
        assert!(matches!(result, Err(AppError::SerialNumbers(_))));
        assert!(!store.serial_exists("12", None).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_batch_rejects_repeats_and_unknown_type() {
        let store = MemoryStore::default();
        let t = EquipmentTypeStore::create(&store, "Router", "NN").await.unwrap();
        let repeated = store.create_batch(t.id, "rack", &serials(&["13", "13"])).await;
        assert!(matches!(repeated, Err(AppError::SerialNumbers(_))));

        let unknown = store.create_batch(t.id + 1, "rack", &serials(&["14"])).await;
        assert!(matches!(unknown, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_type_delete_cascades() {
        let store = MemoryStore::default();
        let kept = EquipmentTypeStore::create(&store, "Switch", "NN").await.unwrap();
        let dropped = EquipmentTypeStore::create(&store, "Router", "NN").await.unwrap();
        store.create_batch(kept.id, "a", &serials(&["01"])).await.unwrap();
        store.create_batch(dropped.id, "a", &serials(&["02", "03"])).await.unwrap();

        EquipmentTypeStore::delete(&store, dropped.id).await.unwrap();

        let (rows, total) = EquipmentStore::list(&store, &[], 1, 20).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].serial_number, "01");
    }

    #[tokio::test]
    async fn test_list_search_and_pages() {
        let store = MemoryStore::default();
        let laptop = EquipmentTypeStore::create(&store, "Laptop", "AN").await.unwrap();
        let phone = EquipmentTypeStore::create(&store, "Phone", "AN").await.unwrap();
        store.create_batch(laptop.id, "x", &serials(&["A1", "B2"])).await.unwrap();
        store.create_batch(phone.id, "x", &serials(&["C3"])).await.unwrap();

        let (rows, total) = EquipmentStore::list(&store, &serials(&["LAP"]), 1, 20).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(rows.len(), 2);

        let (rows, _) = EquipmentStore::list(&store, &serials(&["laptop", "b2"]), 1, 20).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].serial_number, "B2");

        let (rows, total) = EquipmentStore::list(&store, &[], 2, 2).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].serial_number, "C3");

        let (rows, total) = EquipmentStore::list(&store, &[], i64::MAX, 100).await.unwrap();
        assert_eq!(total, 3);
        assert!(rows.is_empty());
    }
}
