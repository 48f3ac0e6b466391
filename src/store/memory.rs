//! In-process store with the same session contract as PostgreSQL.
//!
//! A session holds the table lock for its whole lifetime and works on a staged
//! copy, so sessions are serialized and an uncommitted session leaves no trace.
//! Counters expose how many sessions were opened and released, which is what
//! tests use to check that rejected requests never reach the store.

use super::{already_exists, CustomerStore, StoreSession};
use crate::error::AppError;
use crate::model::{Catalog, Customer, CustomerCode, CustomerFields, CustomerPatch, Grade, NewCustomer, ProbeMode};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Clone, Debug, Default)]
struct Tables {
    customers: BTreeMap<String, Customer>,
    agents: Vec<Value>,
    orders: Vec<Value>,
}

#[derive(Debug, Default)]
struct Counters {
    acquired: AtomicUsize,
    released: AtomicUsize,
    statements: AtomicUsize,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    counters: Arc<Counters>,
    failing: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed customers, agents, and orders. Customers are keyed by their `id`.
    pub fn with_rows(customers: Vec<Customer>, agents: Vec<Value>, orders: Vec<Value>) -> Self {
        let tables = Tables {
            customers: customers.into_iter().map(|c| (c.id.clone(), c)).collect(),
            agents,
            orders,
        };
        MemoryStore {
            tables: Arc::new(Mutex::new(tables)),
            ..Self::default()
        }
    }

    /// When set, every statement fails with a store error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of sessions handed out so far.
    pub fn acquisitions(&self) -> usize {
        self.counters.acquired.load(Ordering::SeqCst)
    }

    /// Sessions acquired but not yet released.
    pub fn open_sessions(&self) -> usize {
        self.acquisitions() - self.counters.released.load(Ordering::SeqCst)
    }

    /// Number of statements run across all sessions.
    pub fn statements(&self) -> usize {
        self.counters.statements.load(Ordering::SeqCst)
    }

    pub async fn customer(&self, code: &str) -> Option<Customer> {
        self.tables.lock().await.customers.get(code).cloned()
    }

    pub async fn customer_count(&self) -> usize {
        self.tables.lock().await.customers.len()
    }
}

#[async_trait]
impl CustomerStore for MemoryStore {
    async fn acquire(&self) -> Result<Box<dyn StoreSession>, AppError> {
        let guard = self.tables.clone().lock_owned().await;
        let staged = Tables::clone(&guard);
        self.counters.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemorySession {
            guard,
            staged,
            counters: self.counters.clone(),
            failing: self.failing.clone(),
        }))
    }

    async fn ping(&self) -> Result<(), AppError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(injected_failure());
        }
        Ok(())
    }
}

pub struct MemorySession {
    guard: OwnedMutexGuard<Tables>,
    staged: Tables,
    counters: Arc<Counters>,
    failing: Arc<AtomicBool>,
}

impl MemorySession {
    fn statement(&self) -> Result<(), AppError> {
        self.counters.statements.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(injected_failure());
        }
        Ok(())
    }

    fn matching(&self, keep: impl Fn(&Customer) -> bool) -> Vec<Customer> {
        self.staged.customers.values().filter(|c| keep(*c)).cloned().collect()
    }
}

impl Drop for MemorySession {
    fn drop(&mut self) {
        self.counters.released.fetch_add(1, Ordering::SeqCst);
    }
}

fn injected_failure() -> AppError {
    AppError::Db(sqlx::Error::Protocol("injected store failure".into()))
}

#[async_trait]
impl StoreSession for MemorySession {
    async fn list_customers(&mut self) -> Result<Vec<Customer>, AppError> {
        self.statement()?;
        Ok(self.matching(|_| true))
    }

    async fn customers_by_grade(&mut self, grade: Grade) -> Result<Vec<Customer>, AppError> {
        self.statement()?;
        Ok(self.matching(|c| c.grade == grade.get()))
    }

    async fn customers_by_code(&mut self, code: &CustomerCode) -> Result<Vec<Customer>, AppError> {
        self.statement()?;
        Ok(self.matching(|c| c.id == code.as_str()))
    }

    async fn customer_exists(&mut self, code: &CustomerCode, _mode: ProbeMode) -> Result<bool, AppError> {
        self.statement()?;
        Ok(self.staged.customers.contains_key(code.as_str()))
    }

    async fn insert_customer(&mut self, customer: &NewCustomer) -> Result<u64, AppError> {
        self.statement()?;
        if self.staged.customers.contains_key(customer.code.as_str()) {
            return Err(already_exists(&customer.code));
        }
        self.staged
            .customers
            .insert(customer.code.to_string(), Customer::from(customer));
        Ok(1)
    }

    async fn replace_customer(&mut self, code: &CustomerCode, fields: &CustomerFields) -> Result<u64, AppError> {
        self.statement()?;
        let Some(row) = self.staged.customers.get_mut(code.as_str()) else {
            return Ok(0);
        };
        row.name = fields.name.clone();
        row.grade = fields.grade.get();
        row.phone = fields.phone.clone();
        row.city = fields.city.clone();
        Ok(1)
    }

    async fn patch_customer(&mut self, code: &CustomerCode, patch: &CustomerPatch) -> Result<u64, AppError> {
        if patch.is_empty() {
            return Err(AppError::Validation("no fields to update".into()));
        }
        self.statement()?;
        let Some(row) = self.staged.customers.get_mut(code.as_str()) else {
            return Ok(0);
        };
        patch.apply(row);
        Ok(1)
    }

    async fn delete_customer(&mut self, code: &CustomerCode) -> Result<u64, AppError> {
        self.statement()?;
        Ok(u64::from(self.staged.customers.remove(code.as_str()).is_some()))
    }

    async fn list_catalog(&mut self, catalog: Catalog) -> Result<Vec<Value>, AppError> {
        self.statement()?;
        Ok(match catalog {
            Catalog::Agents => self.staged.agents.clone(),
            Catalog::Orders => self.staged.orders.clone(),
        })
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        let mut session = self;
        session.statement()?;
        *session.guard = std::mem::take(&mut session.staged);
        Ok(())
    }
}
