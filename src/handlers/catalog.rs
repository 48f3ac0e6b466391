//! Read-only agent and order listings, returned as opaque rows.

use crate::error::AppError;
use crate::model::Catalog;
use crate::response;
use crate::service::CustomerService;
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse};

pub async fn list_agents(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let rows = CustomerService::list_catalog(state.store.as_ref(), Catalog::Agents).await?;
    Ok(response::rows(rows))
}

pub async fn list_orders(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let rows = CustomerService::list_catalog(state.store.as_ref(), Catalog::Orders).await?;
    Ok(response::rows(rows))
}
