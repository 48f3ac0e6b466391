//! Request validation for customer bodies. Runs before any store access.

use crate::error::AppError;
use crate::model::{CustomerBody, CustomerCode, CustomerFields, CustomerPatch, Grade, NewCustomer};

pub struct RequestValidator;

impl RequestValidator {
    /// POST body: `id`, `name`, `city`, `phone` non-empty and `grade` present.
    ///
    /// Grade is only required to be present here, not to be within 1..=5;
    /// the filter, replace, and patch paths check the range, create does not.
    pub fn create(body: CustomerBody) -> Result<NewCustomer, AppError> {
        let id = required_text("id", body.id)?;
        let name = required_text("name", body.name)?;
        let city = required_text("city", body.city)?;
        let phone = required_text("phone", body.phone)?;
        let code = CustomerCode::parse(&id)?;
        let grade = body
            .grade
            .ok_or_else(|| AppError::Validation("grade is required".into()))?;
        Ok(NewCustomer {
            code,
            name,
            grade,
            city,
            phone,
        })
    }

    /// PUT body: every mutable field required, grade within range. A body `id` is ignored.
    pub fn replace(body: CustomerBody) -> Result<CustomerFields, AppError> {
        let name = required_text("name", body.name)?;
        let city = required_text("city", body.city)?;
        let phone = required_text("phone", body.phone)?;
        let grade = body
            .grade
            .ok_or_else(|| AppError::Validation("grade is required".into()))?;
        Ok(CustomerFields {
            name,
            grade: Grade::new(grade)?,
            city,
            phone,
        })
    }

    /// PATCH body: any subset, at least one field. Present fields follow the PUT rules.
    pub fn patch(body: CustomerBody) -> Result<CustomerPatch, AppError> {
        let patch = CustomerPatch {
            name: optional_text("name", body.name)?,
            grade: body.grade.map(Grade::new).transpose()?,
            phone: optional_text("phone", body.phone)?,
            city: optional_text("city", body.city)?,
        };
        if patch.is_empty() {
            return Err(AppError::Validation("no fields to update".into()));
        }
        Ok(patch)
    }
}

fn required_text(field: &str, value: Option<String>) -> Result<String, AppError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!("{} is required", field))),
    }
}

fn optional_text(field: &str, value: Option<String>) -> Result<Option<String>, AppError> {
    match value {
        Some(v) if v.is_empty() => Err(AppError::Validation(format!("{} must not be empty", field))),
        other => Ok(other),
    }
}
