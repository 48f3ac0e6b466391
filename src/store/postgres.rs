//! PostgreSQL store over a `PgPool`. Each session is one transaction at READ COMMITTED.

use super::{already_exists, CustomerStore, StoreSession};
use crate::error::AppError;
use crate::model::{Catalog, Customer, CustomerCode, CustomerFields, CustomerPatch, Grade, NewCustomer, ProbeMode};
use crate::sql::{self, QueryBuf};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Postgres, Transaction};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    schema: String,
}

impl PgStore {
    /// `schema` must already be a validated identifier (see `ServerConfig`).
    pub fn new(pool: PgPool, schema: impl Into<String>) -> Self {
        PgStore {
            pool,
            schema: schema.into(),
        }
    }
}

#[async_trait]
impl CustomerStore for PgStore {
    async fn acquire(&self) -> Result<Box<dyn StoreSession>, AppError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgSession {
            tx,
            schema: self.schema.clone(),
        }))
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").fetch_optional(&self.pool).await?;
        Ok(())
    }
}

/// Holds the checked-out connection inside `tx`; dropping it rolls back and releases.
pub struct PgSession {
    tx: Transaction<'static, Postgres>,
    schema: String,
}

impl PgSession {
    async fn fetch_customers(&mut self, q: QueryBuf) -> Result<Vec<Customer>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query_as::<_, Customer>(&q.sql);
        for p in q.params {
            query = query.bind(p);
        }
        Ok(query.fetch_all(&mut *self.tx).await?)
    }

    async fn execute(&mut self, q: QueryBuf) -> Result<u64, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "execute");
        let mut query = sqlx::query(&q.sql);
        for p in q.params {
            query = query.bind(p);
        }
        Ok(query.execute(&mut *self.tx).await?.rows_affected())
    }
}

#[async_trait]
impl StoreSession for PgSession {
    async fn list_customers(&mut self) -> Result<Vec<Customer>, AppError> {
        let q = sql::select_customers(&self.schema);
        self.fetch_customers(q).await
    }

    async fn customers_by_grade(&mut self, grade: Grade) -> Result<Vec<Customer>, AppError> {
        let q = sql::select_customers_by_grade(&self.schema, grade.get());
        self.fetch_customers(q).await
    }

    async fn customers_by_code(&mut self, code: &CustomerCode) -> Result<Vec<Customer>, AppError> {
        let q = sql::select_customers_by_code(&self.schema, code);
        self.fetch_customers(q).await
    }

    async fn customer_exists(&mut self, code: &CustomerCode, mode: ProbeMode) -> Result<bool, AppError> {
        let q = sql::probe_customer(&self.schema, code, mode);
        tracing::debug!(sql = %q.sql, params = ?q.params, "probe");
        let mut query = sqlx::query(&q.sql);
        for p in q.params {
            query = query.bind(p);
        }
        let row = query.fetch_optional(&mut *self.tx).await?;
        Ok(row.is_some())
    }

    async fn insert_customer(&mut self, customer: &NewCustomer) -> Result<u64, AppError> {
        let q = sql::insert_customer(&self.schema, customer);
        match self.execute(q).await {
            Err(AppError::Db(sqlx::Error::Database(e))) if e.is_unique_violation() => {
                Err(already_exists(&customer.code))
            }
            other => other,
        }
    }

    async fn replace_customer(&mut self, code: &CustomerCode, fields: &CustomerFields) -> Result<u64, AppError> {
        let q = sql::replace_customer(&self.schema, code, fields);
        self.execute(q).await
    }

    async fn patch_customer(&mut self, code: &CustomerCode, patch: &CustomerPatch) -> Result<u64, AppError> {
        let q = sql::patch_customer(&self.schema, code, patch)
            .ok_or_else(|| AppError::Validation("no fields to update".into()))?;
        self.execute(q).await
    }

    async fn delete_customer(&mut self, code: &CustomerCode) -> Result<u64, AppError> {
        let q = sql::delete_customer(&self.schema, code);
        self.execute(q).await
    }

    async fn list_catalog(&mut self, catalog: Catalog) -> Result<Vec<Value>, AppError> {
        let q = sql::select_catalog(&self.schema, catalog);
        tracing::debug!(sql = %q.sql, "query");
        let rows: Vec<(Value,)> = sqlx::query_as(&q.sql).fetch_all(&mut *self.tx).await?;
        Ok(rows.into_iter().map(|(row,)| row).collect())
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        self.tx.commit().await?;
        Ok(())
    }
}
