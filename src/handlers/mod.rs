//! HTTP handlers for customers and the read-only agent/order tables.

pub mod catalog;
pub mod customers;
pub use catalog::*;
pub use customers::*;
