//! # Business Repository
//!
//! Tenant roots. A business owns stores and can only be deleted once it
//! owns none.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::{count_dependents, new_id, restricted};
use crate::error::{DbError, DbResult};
use storekeep_core::{Business, BusinessUpdate, NewBusiness};

/// Repository for business database operations.
#[derive(Debug, Clone)]
pub struct BusinessRepository {
    pool: SqlitePool,
}

impl BusinessRepository {
    /// Creates a new BusinessRepository.
    pub fn new(pool: SqlitePool) -> Self {
        BusinessRepository { pool }
    }

    /// Creates a business.
    pub async fn create(&self, payload: NewBusiness) -> DbResult<Business> {
        let payload = payload.validate()?;
        let now = Utc::now();

        let business = Business {
            id: new_id(),
            name: payload.name,
            address: payload.address,
            phone: payload.phone,
            email: payload.email,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %business.id, name = %business.name, "Creating business");

        sqlx::query(
            r#"
            INSERT INTO businesses (id, name, address, phone, email, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&business.id)
        .bind(&business.name)
        .bind(&business.address)
        .bind(&business.phone)
        .bind(&business.email)
        .bind(business.created_at)
        .bind(business.updated_at)
        .execute(&self.pool)
        .await?;

        info!(id = %business.id, "Business created");
        Ok(business)
    }

    /// Gets a business by ID.
    pub async fn get(&self, id: &str) -> DbResult<Business> {
        sqlx::query_as::<_, Business>("SELECT * FROM businesses WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Business", id))
    }

    /// Lists all businesses by name.
    pub async fn list(&self) -> DbResult<Vec<Business>> {
        let businesses = sqlx::query_as::<_, Business>("SELECT * FROM businesses ORDER BY name, id")
            .fetch_all(&self.pool)
            .await?;
        Ok(businesses)
    }

    /// Applies a partial update.
    pub async fn update(&self, id: &str, update: BusinessUpdate) -> DbResult<Business> {
        let mut business = self.get(id).await?;
        update.apply(&mut business)?;
        business.updated_at = Utc::now();

        debug!(id = %id, "Updating business");

        let result = sqlx::query(
            r#"
            UPDATE businesses SET
                name = ?2, address = ?3, phone = ?4, email = ?5, updated_at = ?6
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&business.name)
        .bind(&business.address)
        .bind(&business.phone)
        .bind(&business.email)
        .bind(business.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Business", id));
        }

        Ok(business)
    }

    /// Deletes a business that owns no stores.
    ///
    /// ## Errors
    /// - `NotFound` if the business doesn't exist
    /// - `ForeignKeyViolation` (Conflict) while stores remain
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        self.get(id).await?;

        if count_dependents(&self.pool, "stores", "business_id", id).await? > 0 {
            return Err(restricted("Business", id, "stores"));
        }

        let result = sqlx::query("DELETE FROM businesses WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Business", id));
        }

        info!(id = %id, "Business deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::{Database, DbConfig};
    use storekeep_core::{BusinessUpdate, NewBusiness, NewStore};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let db = setup().await;
        let created = db
            .businesses()
            .create(NewBusiness {
                name: "  Acme Retail ".to_string(),
                email: Some("owner@acme.test".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let fetched = db.businesses().get(&created.id).await.unwrap();
        assert_eq!(fetched.name, "Acme Retail");
        assert_eq!(fetched.email.as_deref(), Some("owner@acme.test"));
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let db = setup().await;
        let err = db
            .businesses()
            .create(NewBusiness::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_update_clears_optional_field() {
        let db = setup().await;
        let business = db
            .businesses()
            .create(NewBusiness {
                name: "Acme".to_string(),
                address: Some("1 Main St".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        let updated = db
            .businesses()
            .update(
                &business.id,
                BusinessUpdate {
                    address: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.address, None);
        assert_eq!(db.businesses().get(&business.id).await.unwrap().address, None);
    }

    #[tokio::test]
    async fn test_delete_restricted_while_stores_exist() {
        let db = setup().await;
        let business = db
            .businesses()
            .create(NewBusiness {
                name: "Acme".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let store = db
            .stores()
            .create(
                &business.id,
                NewStore {
                    name: "New York".to_string(),
                    code: "NYC".to_string(),
                    is_active: true,
                },
            )
            .await
            .unwrap();

        let err = db.businesses().delete(&business.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        db.stores().delete(&business.id, &store.id).await.unwrap();
        db.businesses().delete(&business.id).await.unwrap();
        assert_eq!(
            db.businesses().get(&business.id).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }
}
