//! Startup DDL: create the database and the sample tables when they are missing.

use crate::error::{AppError, ConfigError};
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::str::FromStr;

/// Table definitions in creation order (orders references customer and agents).
const TABLES: &[(&str, &str)] = &[
    (
        "agents",
        r#"
            agent_code TEXT PRIMARY KEY,
            agent_name TEXT,
            working_area TEXT,
            commission DOUBLE PRECISION,
            phone_no TEXT,
            country TEXT
        "#,
    ),
    (
        "customer",
        r#"
            cust_code TEXT PRIMARY KEY,
            cust_name TEXT NOT NULL,
            grade INTEGER NOT NULL,
            cust_city TEXT NOT NULL,
            phone_no TEXT NOT NULL
        "#,
    ),
    (
        "orders",
        r#"
            ord_num INTEGER PRIMARY KEY,
            ord_amount DOUBLE PRECISION NOT NULL,
            advance_amount DOUBLE PRECISION NOT NULL,
            ord_date DATE NOT NULL,
            cust_code TEXT NOT NULL,
            agent_code TEXT NOT NULL,
            ord_description TEXT
        "#,
    ),
];

/// Create `schema` if not exists, then the customer, agents, and orders tables.
/// Existing tables are left untouched.
pub async fn ensure_tables(pool: &PgPool, schema: &str) -> Result<(), AppError> {
    let q_schema = quote_ident(schema);
    sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", q_schema))
        .execute(pool)
        .await?;
    for (table, columns) in TABLES {
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {}.{} ({})",
            q_schema,
            quote_ident(table),
            columns
        );
        tracing::debug!(sql = %ddl, "bootstrap");
        sqlx::query(&ddl).execute(pool).await?;
    }
    Ok(())
}

/// Connect to the maintenance database and create the target database if it does not exist.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = sqlx::postgres::PgConnectOptions::from_str(&admin_url)
        .map_err(|e| ConfigError::Validation(format!("invalid DATABASE_URL: {}", e)))?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        tracing::info!(database = %db_name, "creating database");
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let path_start = url
        .rfind('/')
        .ok_or_else(|| ConfigError::Validation("DATABASE_URL: no path".into()))?
        + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    let query = path_and_query
        .find('?')
        .map(|i| &path_and_query[i..])
        .unwrap_or("");
    let admin_url = format!("{}postgres{}", base, query);
    Ok((admin_url, db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
