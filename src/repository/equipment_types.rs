//! Equipment types repository (PostgreSQL)

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::{like_pattern, page_offset, search_clause, EquipmentTypeStore};
use crate::{
    error::{AppError, AppResult},
    models::EquipmentType,
};

#[derive(Clone)]
pub struct EquipmentTypesRepository {
    pool: Pool<Postgres>,
}

impl EquipmentTypesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EquipmentTypeStore for EquipmentTypesRepository {
    #[tracing::instrument(skip(self))]
    async fn get_by_id(&self, id: i32) -> AppResult<EquipmentType> {
        sqlx::query_as::<_, EquipmentType>("SELECT * FROM equipment_types WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment type {} not found", id)))
    }

    #[tracing::instrument(skip(self))]
    async fn list(&self, terms: &[String], page: i64, per_page: i64) -> AppResult<(Vec<EquipmentType>, i64)> {
        let offset = page_offset(page, per_page);
        let where_clause = search_clause(&["name", "serial_number_mask"], terms.len());
        let patterns: Vec<String> = terms.iter().map(|t| like_pattern(t)).collect();

        let count_q = format!("SELECT COUNT(*) FROM equipment_types {}", where_clause);
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_q);
        for pattern in &patterns {
            count_builder = count_builder.bind(pattern);
        }
        let total = count_builder.fetch_one(&self.pool).await?;

        let select_q = format!(
            "SELECT * FROM equipment_types {} ORDER BY id LIMIT {} OFFSET {}",
            where_clause, per_page, offset
        );
        let mut builder = sqlx::query_as::<_, EquipmentType>(&select_q);
        for pattern in &patterns {
            builder = builder.bind(pattern);
        }

        let rows = builder.fetch_all(&self.pool).await?;
        Ok((rows, total))
    }

    #[tracing::instrument(skip(self))]
    async fn create(&self, name: &str, serial_number_mask: &str) -> AppResult<EquipmentType> {
        let row = sqlx::query_as::<_, EquipmentType>(
            "INSERT INTO equipment_types (name, serial_number_mask) VALUES ($1, $2) RETURNING *",
        )
        .bind(name)
        .bind(serial_number_mask)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    #[tracing::instrument(skip(self))]
    async fn update(&self, id: i32, name: &str, serial_number_mask: &str) -> AppResult<EquipmentType> {
        sqlx::query_as::<_, EquipmentType>(
            "UPDATE equipment_types SET name = $1, serial_number_mask = $2 WHERE id = $3 RETURNING *",
        )
        .bind(name)
        .bind(serial_number_mask)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Equipment type {} not found", id)))
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: i32) -> AppResult<()> {
        // equipment rows go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM equipment_types WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Equipment type {} not found", id)));
        }
        Ok(())
    }
}
