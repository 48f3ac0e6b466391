//! Success response helpers. Bodies are JSON, so `Content-Type: application/json` is always set.

use crate::model::MutationResult;
use axum::{http::StatusCode, Json};
use serde::Serialize;

/// Bare JSON array of rows.
pub fn rows<T: Serialize>(data: Vec<T>) -> (StatusCode, Json<Vec<T>>) {
    (StatusCode::OK, Json(data))
}

/// Result of an insert, update, or delete.
pub fn mutation(result: MutationResult) -> (StatusCode, Json<MutationResult>) {
    (StatusCode::OK, Json(result))
}
