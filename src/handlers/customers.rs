//! Customer handlers: list, filter, read, create, replace, patch, delete.
//! Path and body are validated before the store is touched.

use crate::error::AppError;
use crate::model::{CustomerBody, CustomerCode, Grade};
use crate::response;
use crate::service::{CustomerService, RequestValidator};
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

/// Body over the configured limit keeps its 413; every other rejection is a 400.
fn parse_body(payload: Result<Json<CustomerBody>, JsonRejection>) -> Result<CustomerBody, AppError> {
    payload.map(|Json(body)| body).map_err(|e| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(e.body_text())
        } else {
            AppError::BadRequest(e.body_text())
        }
    })
}

pub async fn list_customers(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let rows = CustomerService::list(state.store.as_ref()).await?;
    Ok(response::rows(rows))
}

pub async fn customers_by_grade(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let grade = Grade::parse(&raw)?;
    let rows = CustomerService::list_by_grade(state.store.as_ref(), grade).await?;
    Ok(response::rows(rows))
}

pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let code = CustomerCode::parse(&id)?;
    let rows = CustomerService::get(state.store.as_ref(), &code).await?;
    Ok(response::rows(rows))
}

pub async fn create_customer(
    State(state): State<AppState>,
    payload: Result<Json<CustomerBody>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let customer = RequestValidator::create(parse_body(payload)?)?;
    let result = CustomerService::create(state.store.as_ref(), &customer).await?;
    Ok(response::mutation(result))
}

pub async fn replace_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<CustomerBody>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let code = CustomerCode::parse(&id)?;
    let fields = RequestValidator::replace(parse_body(payload)?)?;
    let result = CustomerService::replace(state.store.as_ref(), &code, &fields).await?;
    Ok(response::mutation(result))
}

pub async fn patch_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<CustomerBody>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let code = CustomerCode::parse(&id)?;
    let patch = RequestValidator::patch(parse_body(payload)?)?;
    let result = CustomerService::patch(state.store.as_ref(), &code, &patch).await?;
    Ok(response::mutation(result))
}

pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let code = CustomerCode::parse(&id)?;
    let result = CustomerService::delete(state.store.as_ref(), &code).await?;
    Ok(response::mutation(result))
}
