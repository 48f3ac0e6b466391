//! Builds parameterized SELECT, INSERT, UPDATE, DELETE for the customer tables.

use crate::model::{Catalog, CustomerCode, CustomerFields, CustomerPatch, NewCustomer, ProbeMode};
use crate::sql::PgBindValue;

const CUSTOMER_TABLE: &str = "customer";
const CODE_COLUMN: &str = "cust_code";

/// Customer columns aliased to the names used on the wire.
const CUSTOMER_SELECT: &str =
    "\"cust_code\" AS \"id\", \"cust_name\" AS \"name\", \"grade\", \"cust_city\" AS \"city\", \"phone_no\" AS \"phone\"";

/// Quote identifier for PostgreSQL (safe: only from config and constants).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Full qualified table name.
fn qualified_table(schema: &str, table: &str) -> String {
    format!("{}.{}", quoted(schema), quoted(table))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<PgBindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: impl Into<PgBindValue>) -> usize {
        self.params.push(v.into());
        self.params.len()
    }
}

/// SELECT every customer ordered by code.
pub fn select_customers(schema: &str) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT {} FROM {} ORDER BY {}",
        CUSTOMER_SELECT,
        qualified_table(schema, CUSTOMER_TABLE),
        quoted(CODE_COLUMN)
    );
    q
}

pub fn select_customers_by_grade(schema: &str, grade: i32) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(grade);
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = ${} ORDER BY {}",
        CUSTOMER_SELECT,
        qualified_table(schema, CUSTOMER_TABLE),
        quoted("grade"),
        n,
        quoted(CODE_COLUMN)
    );
    q
}

pub fn select_customers_by_code(schema: &str, code: &CustomerCode) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(code.as_str());
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = ${}",
        CUSTOMER_SELECT,
        qualified_table(schema, CUSTOMER_TABLE),
        quoted(CODE_COLUMN),
        n
    );
    q
}

/// Existence probe. `ForUpdate` holds a row lock until the surrounding transaction ends.
pub fn probe_customer(schema: &str, code: &CustomerCode, mode: ProbeMode) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(code.as_str());
    let lock = match mode {
        ProbeMode::Read => "",
        ProbeMode::ForUpdate => " FOR UPDATE",
    };
    q.sql = format!(
        "SELECT 1 FROM {} WHERE {} = ${}{}",
        qualified_table(schema, CUSTOMER_TABLE),
        quoted(CODE_COLUMN),
        n,
        lock
    );
    q
}

pub fn insert_customer(schema: &str, c: &NewCustomer) -> QueryBuf {
    let mut q = QueryBuf::new();
    let placeholders = [
        q.push_param(c.code.as_str()),
        q.push_param(c.name.as_str()),
        q.push_param(c.grade),
        q.push_param(c.city.as_str()),
        q.push_param(c.phone.as_str()),
    ]
    .iter()
    .map(|n| format!("${}", n))
    .collect::<Vec<_>>();
    let cols = [CODE_COLUMN, "cust_name", "grade", "cust_city", "phone_no"]
        .iter()
        .map(|c| quoted(c))
        .collect::<Vec<_>>();
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        qualified_table(schema, CUSTOMER_TABLE),
        cols.join(", "),
        placeholders.join(", ")
    );
    q
}

/// UPDATE all mutable columns of one customer.
pub fn replace_customer(schema: &str, code: &CustomerCode, fields: &CustomerFields) -> QueryBuf {
    update_statement(
        schema,
        code,
        vec![
            ("cust_name", PgBindValue::from(fields.name.as_str())),
            ("grade", PgBindValue::Int(fields.grade.get())),
            ("phone_no", PgBindValue::from(fields.phone.as_str())),
            ("cust_city", PgBindValue::from(fields.city.as_str())),
        ],
    )
}

/// UPDATE only the columns present in the patch, assigned in the fixed order
/// name, grade, phone, city. Returns `None` when nothing would be assigned.
pub fn patch_customer(schema: &str, code: &CustomerCode, patch: &CustomerPatch) -> Option<QueryBuf> {
    let candidates: [(&'static str, Option<PgBindValue>); 4] = [
        ("cust_name", patch.name.as_deref().map(PgBindValue::from)),
        ("grade", patch.grade.map(|g| PgBindValue::Int(g.get()))),
        ("phone_no", patch.phone.as_deref().map(PgBindValue::from)),
        ("cust_city", patch.city.as_deref().map(PgBindValue::from)),
    ];
    let present: Vec<_> = candidates
        .into_iter()
        .filter_map(|(col, value)| value.map(|v| (col, v)))
        .collect();
    if present.is_empty() {
        return None;
    }
    Some(update_statement(schema, code, present))
}

/// Caller guarantees `assignments` is non-empty.
fn update_statement(
    schema: &str,
    code: &CustomerCode,
    assignments: Vec<(&'static str, PgBindValue)>,
) -> QueryBuf {
    let mut q = QueryBuf::new();
    let sets: Vec<String> = assignments
        .into_iter()
        .map(|(col, value)| format!("{} = ${}", quoted(col), q.push_param(value)))
        .collect();
    let id_param = q.push_param(code.as_str());
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = ${}",
        qualified_table(schema, CUSTOMER_TABLE),
        sets.join(", "),
        quoted(CODE_COLUMN),
        id_param
    );
    q
}

pub fn delete_customer(schema: &str, code: &CustomerCode) -> QueryBuf {
    let mut q = QueryBuf::new();
    let n = q.push_param(code.as_str());
    q.sql = format!(
        "DELETE FROM {} WHERE {} = ${}",
        qualified_table(schema, CUSTOMER_TABLE),
        quoted(CODE_COLUMN),
        n
    );
    q
}

/// Whole rows of a read-only table, each serialized by the store as one JSON object.
pub fn select_catalog(schema: &str, catalog: Catalog) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT row_to_json(t) AS \"row\" FROM {} t ORDER BY t.{}",
        qualified_table(schema, catalog.table_name()),
        quoted(catalog.key_column())
    );
    q
}
