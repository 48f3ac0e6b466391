//! Store seam: a pool that hands out scoped sessions.
//!
//! A session owns one pooled connection and one open transaction for its whole
//! lifetime. Dropping it without [`StoreSession::commit`] rolls back and
//! returns the connection to the pool, so every exit path releases exactly once.

mod bootstrap;
pub mod memory;
mod postgres;

pub use bootstrap::{ensure_database_exists, ensure_tables};
pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::error::AppError;
use crate::model::{Catalog, Customer, CustomerCode, CustomerFields, CustomerPatch, Grade, NewCustomer, ProbeMode};
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Check out a connection and open a session on it. Suspends while the pool is exhausted.
    async fn acquire(&self) -> Result<Box<dyn StoreSession>, AppError>;

    /// Round-trip to the store without holding a session, for readiness checks.
    async fn ping(&self) -> Result<(), AppError>;
}

#[async_trait]
pub trait StoreSession: Send {
    async fn list_customers(&mut self) -> Result<Vec<Customer>, AppError>;

    async fn customers_by_grade(&mut self, grade: Grade) -> Result<Vec<Customer>, AppError>;

    async fn customers_by_code(&mut self, code: &CustomerCode) -> Result<Vec<Customer>, AppError>;

    /// Existence probe for the check-then-act handlers.
    async fn customer_exists(&mut self, code: &CustomerCode, mode: ProbeMode) -> Result<bool, AppError>;

    /// Insert one row; a duplicate key surfaces as [`AppError::Conflict`].
    async fn insert_customer(&mut self, customer: &NewCustomer) -> Result<u64, AppError>;

    async fn replace_customer(&mut self, code: &CustomerCode, fields: &CustomerFields) -> Result<u64, AppError>;

    /// Callers reject an empty patch before acquiring a session.
    async fn patch_customer(&mut self, code: &CustomerCode, patch: &CustomerPatch) -> Result<u64, AppError>;

    async fn delete_customer(&mut self, code: &CustomerCode) -> Result<u64, AppError>;

    async fn list_catalog(&mut self, catalog: Catalog) -> Result<Vec<Value>, AppError>;

    /// Make the session's writes durable and release the connection.
    async fn commit(self: Box<Self>) -> Result<(), AppError>;
}

pub(crate) fn already_exists(code: &CustomerCode) -> AppError {
    AppError::Conflict(format!("customer {} already exists", code))
}
