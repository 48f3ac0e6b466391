//! Customer operations over a scoped store session.
//!
//! Each operation acquires exactly one session, runs its probe and mutation on
//! it, and commits. Any early return drops the session, which rolls back and
//! releases the connection.

use crate::error::AppError;
use crate::model::{
    Catalog, Customer, CustomerCode, CustomerFields, CustomerPatch, Grade, MutationResult, NewCustomer, ProbeMode,
};
use crate::store::{already_exists, CustomerStore};
use serde_json::Value;

pub struct CustomerService;

fn does_not_exist(code: &CustomerCode) -> AppError {
    AppError::NotFound(format!("customer {} does not exist", code))
}

impl CustomerService {
    pub async fn list(store: &dyn CustomerStore) -> Result<Vec<Customer>, AppError> {
        let mut session = store.acquire().await?;
        let rows = session.list_customers().await?;
        session.commit().await?;
        Ok(rows)
    }

    pub async fn list_by_grade(store: &dyn CustomerStore, grade: Grade) -> Result<Vec<Customer>, AppError> {
        let mut session = store.acquire().await?;
        let rows = session.customers_by_grade(grade).await?;
        session.commit().await?;
        Ok(rows)
    }

    /// Zero or one rows; an unknown code is an empty result, not an error.
    pub async fn get(store: &dyn CustomerStore, code: &CustomerCode) -> Result<Vec<Customer>, AppError> {
        let mut session = store.acquire().await?;
        let rows = session.customers_by_code(code).await?;
        session.commit().await?;
        Ok(rows)
    }

    pub async fn create(store: &dyn CustomerStore, customer: &NewCustomer) -> Result<MutationResult, AppError> {
        let mut session = store.acquire().await?;
        if session.customer_exists(&customer.code, ProbeMode::Read).await? {
            return Err(already_exists(&customer.code));
        }
        let affected = session.insert_customer(customer).await?;
        session.commit().await?;
        tracing::info!(code = %customer.code, "customer created");
        Ok(MutationResult::created(affected, &customer.code))
    }

    pub async fn replace(
        store: &dyn CustomerStore,
        code: &CustomerCode,
        fields: &CustomerFields,
    ) -> Result<MutationResult, AppError> {
        let mut session = store.acquire().await?;
        if !session.customer_exists(code, ProbeMode::ForUpdate).await? {
            return Err(does_not_exist(code));
        }
        let affected = session.replace_customer(code, fields).await?;
        session.commit().await?;
        tracing::info!(code = %code, "customer replaced");
        Ok(MutationResult::affected(affected))
    }

    pub async fn patch(
        store: &dyn CustomerStore,
        code: &CustomerCode,
        patch: &CustomerPatch,
    ) -> Result<MutationResult, AppError> {
        if patch.is_empty() {
            return Err(AppError::Validation("no fields to update".into()));
        }
        let mut session = store.acquire().await?;
        if !session.customer_exists(code, ProbeMode::ForUpdate).await? {
            return Err(does_not_exist(code));
        }
        let affected = session.patch_customer(code, patch).await?;
        session.commit().await?;
        tracing::info!(code = %code, "customer patched");
        Ok(MutationResult::affected(affected))
    }

    pub async fn delete(store: &dyn CustomerStore, code: &CustomerCode) -> Result<MutationResult, AppError> {
        let mut session = store.acquire().await?;
        if !session.customer_exists(code, ProbeMode::ForUpdate).await? {
            return Err(does_not_exist(code));
        }
        let affected = session.delete_customer(code).await?;
        session.commit().await?;
        tracing::info!(code = %code, "customer deleted");
        Ok(MutationResult::affected(affected))
    }

    pub async fn list_catalog(store: &dyn CustomerStore, catalog: Catalog) -> Result<Vec<Value>, AppError> {
        let mut session = store.acquire().await?;
        let rows = session.list_catalog(catalog).await?;
        session.commit().await?;
        Ok(rows)
    }
}
