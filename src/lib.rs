//! Customer API: REST endpoints for the customer/agent/order dataset over PostgreSQL.

pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod response;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use config::ServerConfig;
pub use error::{AppError, ConfigError};
pub use routes::{app, common_routes_with_ready, customer_routes};
pub use service::{CustomerService, RequestValidator};
pub use state::AppState;
pub use store::{ensure_database_exists, ensure_tables, CustomerStore, MemoryStore, PgStore, StoreSession};
