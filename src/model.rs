//! Customer domain types shared by handlers, SQL builders, and stores.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Required length of a customer code, counted in characters.
pub const CODE_LEN: usize = 6;

pub const MIN_GRADE: i32 = 1;
pub const MAX_GRADE: i32 = 5;

/// Primary key of a customer row. Always exactly [`CODE_LEN`] characters.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CustomerCode(String);

impl CustomerCode {
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        if raw.chars().count() != CODE_LEN {
            return Err(AppError::Validation(format!(
                "id must be exactly {} characters",
                CODE_LEN
            )));
        }
        Ok(CustomerCode(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Grade in the closed range 1..=5.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grade(i32);

impl Grade {
    pub fn new(value: i32) -> Result<Self, AppError> {
        if (MIN_GRADE..=MAX_GRADE).contains(&value) {
            Ok(Grade(value))
        } else {
            Err(AppError::Validation(format!(
                "grade must be an integer between {} and {}",
                MIN_GRADE, MAX_GRADE
            )))
        }
    }

    /// Parse a path segment. Anything that is not an integer in range is rejected.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let value: i32 = raw.parse().map_err(|_| {
            AppError::Validation(format!(
                "grade must be an integer between {} and {}",
                MIN_GRADE, MAX_GRADE
            ))
        })?;
        Self::new(value)
    }

    pub fn get(self) -> i32 {
        self.0
    }
}

/// A customer row as returned to clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub grade: i32,
    pub city: String,
    pub phone: String,
}

/// Validated input for insert. Grade is deliberately not range-checked on create.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewCustomer {
    pub code: CustomerCode,
    pub name: String,
    pub grade: i32,
    pub city: String,
    pub phone: String,
}

impl From<&NewCustomer> for Customer {
    fn from(c: &NewCustomer) -> Self {
        Customer {
            id: c.code.to_string(),
            name: c.name.clone(),
            grade: c.grade,
            city: c.city.clone(),
            phone: c.phone.clone(),
        }
    }
}

/// Validated input for a full replace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomerFields {
    pub name: String,
    pub grade: Grade,
    pub city: String,
    pub phone: String,
}

/// Validated input for a partial update. At least one field is set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CustomerPatch {
    pub name: Option<String>,
    pub grade: Option<Grade>,
    pub phone: Option<String>,
    pub city: Option<String>,
}

impl CustomerPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.grade.is_none() && self.phone.is_none() && self.city.is_none()
    }

    /// Apply onto an existing row, leaving absent fields untouched.
    pub fn apply(&self, customer: &mut Customer) {
        if let Some(name) = &self.name {
            customer.name = name.clone();
        }
        if let Some(grade) = self.grade {
            customer.grade = grade.get();
        }
        if let Some(phone) = &self.phone {
            customer.phone = phone.clone();
        }
        if let Some(city) = &self.city {
            customer.city = city.clone();
        }
    }
}

/// Request body shared by POST, PUT, and PATCH. Presence rules differ per verb.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CustomerBody {
    pub id: Option<String>,
    pub name: Option<String>,
    pub grade: Option<i32>,
    pub city: Option<String>,
    pub phone: Option<String>,
}

/// Outcome of a mutating statement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MutationResult {
    pub affected_rows: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl MutationResult {
    pub fn affected(affected_rows: u64) -> Self {
        MutationResult {
            affected_rows,
            id: None,
        }
    }

    pub fn created(affected_rows: u64, code: &CustomerCode) -> Self {
        MutationResult {
            affected_rows,
            id: Some(code.to_string()),
        }
    }
}

/// Read-only tables exposed as opaque rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Catalog {
    Agents,
    Orders,
}

impl Catalog {
    pub fn table_name(self) -> &'static str {
        match self {
            Catalog::Agents => "agents",
            Catalog::Orders => "orders",
        }
    }

    pub fn key_column(self) -> &'static str {
        match self {
            Catalog::Agents => "agent_code",
            Catalog::Orders => "ord_num",
        }
    }
}

/// Whether an existence probe should lock the matched row for the rest of the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbeMode {
    Read,
    ForUpdate,
}
