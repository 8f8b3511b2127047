//! Farmer operations for PostgreSQL database.
//!
//! This module provides functions for managing rows of the `farmer` table with
//! automatic timestamp tracking for the insert_at and update_at columns.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{Postgres, Transaction};

use crate::{Farmer, FarmerError, FarmingOption, NewFarmer};

/// Result type for database operations.
pub type SqlResult<T> = Result<T, FarmerError>;

#[derive(Debug, sqlx::FromRow)]
struct FarmerRow {
    cpf_cnpj: String,
    name: String,
    farm_name: String,
    city: String,
    state: String,
    total_area: i32,
    agricultural_area: i32,
    vegetation_area: i32,
    farming_options: Json<Vec<FarmingOption>>,
    insert_at: DateTime<Utc>,
    update_at: DateTime<Utc>,
}

impl From<FarmerRow> for Farmer {
    fn from(row: FarmerRow) -> Self {
        Farmer {
            cpf_cnpj: row.cpf_cnpj,
            name: row.name,
            farm_name: row.farm_name,
            city: row.city,
            state: row.state,
            total_area: row.total_area,
            agricultural_area: row.agricultural_area,
            vegetation_area: row.vegetation_area,
            farming_options: row.farming_options.0,
            insert_at: row.insert_at,
            update_at: row.update_at,
        }
    }
}

/// Inserts a new farmer.
///
/// `insert_at` and `update_at` both default to the transaction's timestamp, so
/// they are equal on the returned record.
///
/// # Returns
/// * `Ok(Farmer)` - The stored record
/// * `Err(FarmerError::AlreadyRegistered)` - The identifier is taken
/// * `Err(FarmerError::Persistence)` - Database error
///
/// # Examples
/// ```no_run
/// # use agro::{CpfCnpj, FarmingOption, NewFarmer, sql};
/// # use sqlx::PgPool;
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let data = NewFarmer {
///     cpf_cnpj: CpfCnpj::parse("42063478082")?,
///     name: "Aragorn".to_string(),
///     farm_name: "Fazenda LOTR".to_string(),
///     city: "Joao Pessoa".to_string(),
///     state: "PB".to_string(),
///     total_area: 100,
///     agricultural_area: 30,
///     vegetation_area: 20,
///     farming_options: vec![FarmingOption::Soy],
/// };
/// let mut tx = pool.begin().await?;
/// sql::farmer::create(&mut tx, &data).await?;
/// tx.commit().await?;
/// # Ok(())
/// # }
/// ```
pub async fn create(tx: &mut Transaction<'_, Postgres>, data: &NewFarmer) -> SqlResult<Farmer> {
    let result = sqlx::query_as::<_, FarmerRow>(
        r#"
        INSERT INTO farmer (
            cpf_cnpj, name, farm_name, city, state,
            total_area, agricultural_area, vegetation_area, farming_options
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING cpf_cnpj, name, farm_name, city, state,
                  total_area, agricultural_area, vegetation_area, farming_options,
                  insert_at, update_at
        "#,
    )
    .bind(data.cpf_cnpj.as_str())
    .bind(&data.name)
    .bind(&data.farm_name)
    .bind(&data.city)
    .bind(&data.state)
    .bind(data.total_area)
    .bind(data.agricultural_area)
    .bind(data.vegetation_area)
    .bind(Json(&data.farming_options))
    .fetch_one(&mut **tx)
    .await;

    match result {
        Ok(row) => Ok(row.into()),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            Err(FarmerError::AlreadyRegistered)
        }
        Err(e) => {
            tracing::error!(error = %e, "database error creating farmer");
            Err(FarmerError::Persistence(e.to_string()))
        }
    }
}

/// Retrieves a farmer by identifier.
///
/// # Returns
/// * `Ok(Some(Farmer))` - Farmer found
/// * `Ok(None)` - No farmer under that identifier
/// * `Err(FarmerError::Persistence)` - Database error
pub async fn get(tx: &mut Transaction<'_, Postgres>, cpf_cnpj: &str) -> SqlResult<Option<Farmer>> {
    let result = sqlx::query_as::<_, FarmerRow>(
        r#"
        SELECT cpf_cnpj, name, farm_name, city, state,
               total_area, agricultural_area, vegetation_area, farming_options,
               insert_at, update_at
        FROM farmer
        WHERE cpf_cnpj = $1
        "#,
    )
    .bind(cpf_cnpj)
    .fetch_optional(&mut **tx)
    .await;

    match result {
        Ok(row) => Ok(row.map(Farmer::from)),
        Err(e) => {
            tracing::error!(error = %e, "database error getting farmer");
            Err(FarmerError::Persistence(e.to_string()))
        }
    }
}

/// Lists up to `limit` farmers after skipping `offset`.
///
/// No ordering is applied; callers must not rely on the order across calls.
pub async fn list(
    tx: &mut Transaction<'_, Postgres>,
    limit: i64,
    offset: i64,
) -> SqlResult<Vec<Farmer>> {
    let result = sqlx::query_as::<_, FarmerRow>(
        r#"
        SELECT cpf_cnpj, name, farm_name, city, state,
               total_area, agricultural_area, vegetation_area, farming_options,
               insert_at, update_at
        FROM farmer
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(&mut **tx)
    .await;

    match result {
        Ok(rows) => Ok(rows.into_iter().map(Farmer::from).collect()),
        Err(e) => {
            tracing::error!(error = %e, "database error listing farmers");
            Err(FarmerError::Persistence(e.to_string()))
        }
    }
}

/// Writes every mutable column of `farmer` and refreshes `update_at`.
///
/// `insert_at` and the identifier are never written.
///
/// # Returns
/// * `Ok(Some(Farmer))` - The stored record after the update
/// * `Ok(None)` - No farmer under that identifier
/// * `Err(FarmerError::Persistence)` - Database error
pub async fn update(
    tx: &mut Transaction<'_, Postgres>,
    farmer: &Farmer,
) -> SqlResult<Option<Farmer>> {
    let result = sqlx::query_as::<_, FarmerRow>(
        r#"
        UPDATE farmer
        SET name = $2,
            farm_name = $3,
            city = $4,
            state = $5,
            total_area = $6,
            agricultural_area = $7,
            vegetation_area = $8,
            farming_options = $9,
            update_at = CURRENT_TIMESTAMP
        WHERE cpf_cnpj = $1
        RETURNING cpf_cnpj, name, farm_name, city, state,
                  total_area, agricultural_area, vegetation_area, farming_options,
                  insert_at, update_at
        "#,
    )
    .bind(&farmer.cpf_cnpj)
    .bind(&farmer.name)
    .bind(&farmer.farm_name)
    .bind(&farmer.city)
    .bind(&farmer.state)
    .bind(farmer.total_area)
    .bind(farmer.agricultural_area)
    .bind(farmer.vegetation_area)
    .bind(Json(&farmer.farming_options))
    .fetch_optional(&mut **tx)
    .await;

    match result {
        Ok(row) => Ok(row.map(Farmer::from)),
        Err(e) => {
            tracing::error!(error = %e, cpf_cnpj = %farmer.cpf_cnpj, "database error updating farmer");
            Err(FarmerError::Persistence(e.to_string()))
        }
    }
}

/// Deletes a farmer.
///
/// # Returns
/// * `Ok(true)` - Farmer existed and was deleted
/// * `Ok(false)` - Farmer did not exist
/// * `Err(FarmerError::Persistence)` - Database error
pub async fn delete(tx: &mut Transaction<'_, Postgres>, cpf_cnpj: &str) -> SqlResult<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM farmer
        WHERE cpf_cnpj = $1
        "#,
    )
    .bind(cpf_cnpj)
    .execute(&mut **tx)
    .await;

    match result {
        Ok(result) => Ok(result.rows_affected() > 0),
        Err(e) => {
            tracing::error!(error = %e, "database error deleting farmer");
            Err(FarmerError::Persistence(e.to_string()))
        }
    }
}
