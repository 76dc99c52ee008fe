//! Equipment repository (PostgreSQL)

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::{like_pattern, page_offset, search_clause, EquipmentStore};
use crate::{
    error::{AppError, AppResult},
    models::Equipment,
};

#[derive(Clone)]
pub struct EquipmentRepository {
    pool: Pool<Postgres>,
}

impl EquipmentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

/// Translate constraint violations raised while writing `serial_number` for `type_id`
fn map_write_error(e: sqlx::Error, type_id: i32, serial_number: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::duplicate_serial(serial_number);
        }
        if db_err.is_foreign_key_violation() {
            return AppError::NotFound(format!("Equipment type {} not found", type_id));
        }
    }
    e.into()
}

#[async_trait]
impl EquipmentStore for EquipmentRepository {
    #[tracing::instrument(skip(self))]
    async fn serial_exists(&self, serial_number: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM equipment WHERE serial_number = $1 AND ($2::int IS NULL OR id != $2))",
        )
        .bind(serial_number)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    #[tracing::instrument(skip(self))]
    async fn list_by_group(&self, type_id: i32, notation: &str) -> AppResult<Vec<Equipment>> {
        let rows = sqlx::query_as::<_, Equipment>(
            "SELECT * FROM equipment WHERE type_id = $1 AND notation = $2 ORDER BY id",
        )
        .bind(type_id)
        .bind(notation)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    #[tracing::instrument(skip(self))]
    async fn create_batch(
        &self,
        type_id: i32,
        notation: &str,
        serial_numbers: &[String],
    ) -> AppResult<Vec<Equipment>> {
        // Dropping the transaction on an early return rolls back earlier inserts
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(serial_numbers.len());

        for serial_number in serial_numbers {
            let row = sqlx::query_as::<_, Equipment>(
                r#"
                INSERT INTO equipment (type_id, serial_number, notation)
                VALUES ($1, $2, $3)
                RETURNING *
                "#,
            )
            .bind(type_id)
            .bind(serial_number)
            .bind(notation)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| map_write_error(e, type_id, serial_number))?;
            created.push(row);
        }

        tx.commit().await?;
        Ok(created)
    }

    #[tracing::instrument(skip(self))]
    async fn get_by_id(&self, id: i32) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>("SELECT * FROM equipment WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    #[tracing::instrument(skip(self))]
    async fn list(&self, terms: &[String], page: i64, per_page: i64) -> AppResult<(Vec<Equipment>, i64)> {
        let offset = page_offset(page, per_page);
        let where_clause = search_clause(&["t.name", "e.serial_number"], terms.len());
        let patterns: Vec<String> = terms.iter().map(|t| like_pattern(t)).collect();

        // Count total
        let count_q = format!(
            "SELECT COUNT(*) FROM equipment e JOIN equipment_types t ON t.id = e.type_id {}",
            where_clause
        );
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_q);
        for pattern in &patterns {
            count_builder = count_builder.bind(pattern);
        }
        let total = count_builder.fetch_one(&self.pool).await?;

        // Fetch rows
        let select_q = format!(
            "SELECT e.* FROM equipment e JOIN equipment_types t ON t.id = e.type_id {} ORDER BY e.id LIMIT {} OFFSET {}",
            where_clause, per_page, offset
        );
        let mut builder = sqlx::query_as::<_, Equipment>(&select_q);
        for pattern in &patterns {
            builder = builder.bind(pattern);
        }

        let rows = builder.fetch_all(&self.pool).await?;
        Ok((rows, total))
    }

    #[tracing::instrument(skip(self))]
    async fn update(
        &self,
        id: i32,
        type_id: i32,
        serial_number: &str,
        notation: &str,
    ) -> AppResult<Equipment> {
        sqlx::query_as::<_, Equipment>(
            r#"
            UPDATE equipment
            SET type_id = $1, serial_number = $2, notation = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(type_id)
        .bind(serial_number)
        .bind(notation)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, type_id, serial_number))?
        .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM equipment WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Equipment {} not found", id)));
        }
        Ok(())
    }
}
