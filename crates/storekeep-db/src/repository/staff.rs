//! # Staff Repository
//!
//! Staff members of one store. Staff numbers are chosen by the business
//! (badge numbers) and unique per store, archived staff included.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::{ensure_store, missing_parent, new_id};
use crate::error::{DbError, DbResult};
use storekeep_core::{NewStaff, Staff, StaffUpdate};

/// Repository for staff database operations.
#[derive(Debug, Clone)]
pub struct StaffRepository {
    pool: SqlitePool,
}

impl StaffRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StaffRepository { pool }
    }

    /// Creates a staff member.
    ///
    /// ## Errors
    /// - `Validation` for missing name, staff number or phone
    /// - `NotFound` if the store doesn't exist
    /// - `UniqueViolation` if the staff number is taken in the store
    pub async fn create(&self, store_id: &str, payload: NewStaff) -> DbResult<Staff> {
        let payload = payload.validate()?;
        let now = Utc::now();

        let staff = Staff {
            id: new_id(),
            store_id: store_id.to_string(),
            name: payload.name,
            staff_number: payload.staff_number,
            mobile_number: payload.mobile_number,
            country_code: payload.country_code,
            pay_per_month_cents: payload.pay_per_month_cents,
            signed_contract: payload.signed_contract,
            is_archived: false,
            created_at: now,
            updated_at: now,
        };

        debug!(store_id = %store_id, staff_number = %staff.staff_number, "Creating staff");

        sqlx::query(
            r#"
            INSERT INTO staff (
                id, store_id, name, staff_number, mobile_number, country_code,
                pay_per_month_cents, signed_contract, is_archived, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&staff.id)
        .bind(&staff.store_id)
        .bind(&staff.name)
        .bind(&staff.staff_number)
        .bind(&staff.mobile_number)
        .bind(&staff.country_code)
        .bind(staff.pay_per_month_cents)
        .bind(staff.signed_contract)
        .bind(staff.is_archived)
        .bind(staff.created_at)
        .bind(staff.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            missing_parent(e.into(), "Store", store_id).with_duplicate_value(staff.staff_number.clone())
        })?;

        info!(id = %staff.id, "Staff created");
        Ok(staff)
    }

    /// Gets a staff member of a store, archived or not.
    pub async fn get(&self, store_id: &str, id: &str) -> DbResult<Staff> {
        sqlx::query_as::<_, Staff>("SELECT * FROM staff WHERE id = ?1 AND store_id = ?2")
            .bind(id)
            .bind(store_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Staff", id))
    }

    pub async fn list_active(&self, store_id: &str) -> DbResult<Vec<Staff>> {
        ensure_store(&self.pool, store_id).await?;
        let staff = sqlx::query_as::<_, Staff>(
            "SELECT * FROM staff WHERE store_id = ?1 AND is_archived = 0 ORDER BY staff_number",
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(staff)
    }

    pub async fn list_all(&self, store_id: &str) -> DbResult<Vec<Staff>> {
        ensure_store(&self.pool, store_id).await?;
        let staff = sqlx::query_as::<_, Staff>(
            "SELECT * FROM staff WHERE store_id = ?1 ORDER BY staff_number",
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(staff)
    }

    /// Applies a partial update. Changing the staff number is allowed as
    /// long as the new one is free.
    pub async fn update(&self, store_id: &str, id: &str, update: StaffUpdate) -> DbResult<Staff> {
        let mut staff = self.get(store_id, id).await?;
        update.apply(&mut staff)?;
        staff.updated_at = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE staff SET
                name = ?3, staff_number = ?4, mobile_number = ?5, country_code = ?6,
                pay_per_month_cents = ?7, signed_contract = ?8, updated_at = ?9
            WHERE id = ?1 AND store_id = ?2
            "#,
        )
        .bind(id)
        .bind(store_id)
        .bind(&staff.name)
        .bind(&staff.staff_number)
        .bind(&staff.mobile_number)
        .bind(&staff.country_code)
        .bind(staff.pay_per_month_cents)
        .bind(staff.signed_contract)
        .bind(staff.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(staff.staff_number.clone()))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Staff", id));
        }

        Ok(staff)
    }

    pub async fn archive(&self, store_id: &str, id: &str) -> DbResult<Staff> {
        self.set_archived(store_id, id, true).await
    }

    pub async fn restore(&self, store_id: &str, id: &str) -> DbResult<Staff> {
        self.set_archived(store_id, id, false).await
    }

    async fn set_archived(&self, store_id: &str, id: &str, archived: bool) -> DbResult<Staff> {
        let staff = sqlx::query_as::<_, Staff>(
            r#"
            UPDATE staff SET is_archived = ?3, updated_at = ?4
            WHERE id = ?1 AND store_id = ?2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(store_id)
        .bind(archived)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Staff", id))?;

        info!(id = %id, archived, "Staff archive state changed");
        Ok(staff)
    }
}
