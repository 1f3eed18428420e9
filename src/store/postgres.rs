use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, postgres::PgRow, PgPool, Row};

use crate::model::{Id, ServiceInstance};
use crate::store::traits::{InstanceStore, StoreError, StoreResult};

const CREATE_SERVICE_INSTANCES: &str = r#"
CREATE TABLE IF NOT EXISTS service_instances (
    id TEXT PRIMARY KEY,
    service_id TEXT NOT NULL,
    plan_id TEXT NOT NULL,
    parameters TEXT NOT NULL DEFAULT 'null',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Create the instance table if it does not exist yet
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::query(CREATE_SERVICE_INSTANCES)
            .execute(&self.pool)
            .await
            .context("Failed to create service_instances table")?;
        Ok(())
    }
}

fn instance_from_row(row: &PgRow) -> ServiceInstance {
    ServiceInstance {
        id: row.get("id"),
        service_id: row.get("service_id"),
        plan_id: row.get("plan_id"),
        parameters: row.get("parameters"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait::async_trait]
impl InstanceStore for PostgresStore {
    async fn find(&self, id: &Id) -> StoreResult<Option<ServiceInstance>> {
        let row = sqlx::query(
            "SELECT id, service_id, plan_id, parameters, created_at, updated_at FROM service_instances WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch service instance")?;

        Ok(row.as_ref().map(instance_from_row))
    }

    async fn insert(&self, instance: ServiceInstance) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO service_instances (id, service_id, plan_id, parameters, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&instance.id)
        .bind(&instance.service_id)
        .bind(&instance.plan_id)
        .bind(&instance.parameters)
        .bind(instance.created_at)
        .bind(instance.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(StoreError::Conflict(db_err.message().to_string()))
            }
            Err(e) => Err(anyhow::Error::new(e)
                .context("Failed to insert service instance")
                .into()),
        }
    }

    async fn update(&self, instance: ServiceInstance) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE service_instances
            SET service_id = $2, plan_id = $3, parameters = $4, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(&instance.id)
        .bind(&instance.service_id)
        .bind(&instance.plan_id)
        .bind(&instance.parameters)
        .execute(&self.pool)
        .await
        .context("Failed to update service instance")?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: &Id) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM service_instances WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete service instance")?;

        Ok(result.rows_affected() > 0)
    }
}
