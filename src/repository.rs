//! # Farmer Repository
//!
//! The persistence abstraction behind the farmer entity. The `FarmerRepository`
//! trait is implemented twice:
//!
//! - **PostgresFarmerRepository**: one transaction per call against the `farmer`
//!   table, delegating to [`crate::sql::farmer`]
//! - **InMemoryFarmerRepository**: a `Mutex<BTreeMap>` for tests and for running
//!   the daemon without a database
//!
//! Every operation logs a structured event before it touches storage.
//!
//! ```rust
//! use agro::{CpfCnpj, FarmerRepository, InMemoryFarmerRepository, NewFarmer};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let repository = InMemoryFarmerRepository::new();
//! let data = NewFarmer {
//!     cpf_cnpj: CpfCnpj::parse("42063478082").unwrap(),
//!     name: "Aragorn".to_string(),
//!     farm_name: "Fazenda LOTR".to_string(),
//!     city: "Joao Pessoa".to_string(),
//!     state: "PB".to_string(),
//!     total_area: 100,
//!     agricultural_area: 30,
//!     vegetation_area: 20,
//!     farming_options: vec![],
//! };
//! let created = repository.create(&data).await.unwrap();
//! assert_eq!(created.insert_at, created.update_at);
//! # });
//! ```

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use axum::async_trait;
use chrono::{Duration, Utc};
use sqlx::PgPool;

use crate::{Farmer, FarmerChanges, FarmerError, NewFarmer};

/// Storage capabilities the farmer entity relies on.
///
/// Implementors must be shareable across request tasks.
#[async_trait]
pub trait FarmerRepository: Send + Sync {
    /// Inserts a new farmer.
    ///
    /// # Returns
    /// * `Ok(Farmer)` - The stored record, with `insert_at == update_at`
    /// * `Err(FarmerError::AlreadyRegistered)` - The identifier is taken
    /// * `Err(FarmerError::Persistence)` - Storage failure
    async fn create(&self, data: &NewFarmer) -> Result<Farmer, FarmerError>;

    /// Looks a farmer up by identifier; `NotFound` when absent.
    async fn get_by_id(&self, cpf_cnpj: &str) -> Result<Farmer, FarmerError>;

    /// Returns up to `limit` farmers after skipping `offset`, in no particular order.
    async fn get_all(&self, limit: i64, offset: i64) -> Result<Vec<Farmer>, FarmerError>;

    /// Applies `changes` on top of the already-fetched `farmer` and stores the result.
    ///
    /// `update_at` is refreshed; `insert_at` and the identifier are preserved.
    async fn update(&self, farmer: &Farmer, changes: &FarmerChanges)
    -> Result<Farmer, FarmerError>;

    /// Deletes a farmer; `NotFound` when nothing was deleted.
    async fn delete(&self, cpf_cnpj: &str) -> Result<(), FarmerError>;
}

////////////////////////////////////////////// PostgreSQL /////////////////////////////////////////////

/// Repository backed by the PostgreSQL `farmer` table.
///
/// Each call runs in its own transaction. A failed call drops its transaction
/// uncommitted, which rolls it back.
#[derive(Debug, Clone)]
pub struct PostgresFarmerRepository {
    pool: PgPool,
}

impl PostgresFarmerRepository {
    /// Wraps a connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

const POSTGRES: &str = "PostgreSQL";

#[async_trait]
impl FarmerRepository for PostgresFarmerRepository {
    async fn create(&self, data: &NewFarmer) -> Result<Farmer, FarmerError> {
        tracing::info!(
            service = POSTGRES,
            service_method = "create",
            cpf_cnpj = %data.cpf_cnpj,
            "Creating farmer."
        );
        let mut tx = self.pool.begin().await?;
        let farmer = crate::sql::farmer::create(&mut tx, data).await?;
        tx.commit().await?;
        Ok(farmer)
    }

    async fn get_by_id(&self, cpf_cnpj: &str) -> Result<Farmer, FarmerError> {
        tracing::info!(
            service = POSTGRES,
            service_method = "get_by_cpf_cnpj",
            cpf_cnpj,
            "Getting farmer by cpf_cnpj."
        );
        let mut tx = self.pool.begin().await?;
        let farmer = crate::sql::farmer::get(&mut tx, cpf_cnpj).await?;
        tx.commit().await?;
        farmer.ok_or(FarmerError::NotFound)
    }

    async fn get_all(&self, limit: i64, offset: i64) -> Result<Vec<Farmer>, FarmerError> {
        tracing::info!(
            service = POSTGRES,
            service_method = "get_all",
            limit,
            offset,
            "Getting farmers."
        );
        let mut tx = self.pool.begin().await?;
        let farmers = crate::sql::farmer::list(&mut tx, limit, offset).await?;
        tx.commit().await?;
        Ok(farmers)
    }

    async fn update(
        &self,
        farmer: &Farmer,
        changes: &FarmerChanges,
    ) -> Result<Farmer, FarmerError> {
        tracing::info!(
            service = POSTGRES,
            service_method = "update",
            cpf_cnpj = %farmer.cpf_cnpj,
            changes = ?changes,
            "Updating farmer."
        );
        let merged = farmer.merged(changes);
        let mut tx = self.pool.begin().await?;
        let updated = crate::sql::farmer::update(&mut tx, &merged)
            .await?
            .ok_or(FarmerError::NotFound)?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn delete(&self, cpf_cnpj: &str) -> Result<(), FarmerError> {
        tracing::info!(
            service = POSTGRES,
            service_method = "delete",
            cpf_cnpj,
            "Deleting farmer."
        );
        let mut tx = self.pool.begin().await?;
        let deleted = crate::sql::farmer::delete(&mut tx, cpf_cnpj).await?;
        tx.commit().await?;
        if deleted {
            Ok(())
        } else {
            Err(FarmerError::NotFound)
        }
    }
}

////////////////////////////////////////////// In-memory //////////////////////////////////////////////

/// Thread-safe in-memory repository.
///
/// Farmers are kept in identifier order, which is also the listing order.
#[derive(Debug, Default)]
pub struct InMemoryFarmerRepository {
    farmers: Mutex<BTreeMap<String, Farmer>>,
}

const MEMORY: &str = "memory";

impl InMemoryFarmerRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    fn farmers(&self) -> Result<MutexGuard<'_, BTreeMap<String, Farmer>>, FarmerError> {
        self.farmers
            .lock()
            .map_err(|_| FarmerError::Persistence("farmer store lock poisoned".to_string()))
    }
}

#[async_trait]
impl FarmerRepository for InMemoryFarmerRepository {
    async fn create(&self, data: &NewFarmer) -> Result<Farmer, FarmerError> {
        tracing::info!(
            service = MEMORY,
            service_method = "create",
            cpf_cnpj = %data.cpf_cnpj,
            "Creating farmer."
        );
        let mut farmers = self.farmers()?;
        if farmers.contains_key(data.cpf_cnpj.as_str()) {
            return Err(FarmerError::AlreadyRegistered);
        }
        let farmer = data.clone().into_farmer(Utc::now());
        farmers.insert(farmer.cpf_cnpj.clone(), farmer.clone());
        Ok(farmer)
    }

    async fn get_by_id(&self, cpf_cnpj: &str) -> Result<Farmer, FarmerError> {
        tracing::info!(
            service = MEMORY,
            service_method = "get_by_cpf_cnpj",
            cpf_cnpj,
            "Getting farmer by cpf_cnpj."
        );
        self.farmers()?
            .get(cpf_cnpj)
            .cloned()
            .ok_or(FarmerError::NotFound)
    }

    async fn get_all(&self, limit: i64, offset: i64) -> Result<Vec<Farmer>, FarmerError> {
        tracing::info!(
            service = MEMORY,
            service_method = "get_all",
            limit,
            offset,
            "Getting farmers."
        );
        let limit = usize::try_from(limit).unwrap_or(0);
        let offset = usize::try_from(offset).unwrap_or(0);
        Ok(self
            .farmers()?
            .values()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        farmer: &Farmer,
        changes: &FarmerChanges,
    ) -> Result<Farmer, FarmerError> {
        tracing::info!(
            service = MEMORY,
            service_method = "update",
            cpf_cnpj = %farmer.cpf_cnpj,
            changes = ?changes,
            "Updating farmer."
        );
        let mut farmers = self.farmers()?;
        let stored = farmers
            .get_mut(&farmer.cpf_cnpj)
            .ok_or(FarmerError::NotFound)?;
        let mut merged = farmer.merged(changes);
        // update_at must strictly advance even when the clock has not ticked.
        merged.update_at = Utc::now().max(stored.update_at + Duration::microseconds(1));
        merged.insert_at = stored.insert_at;
        *stored = merged.clone();
        Ok(merged)
    }

    async fn delete(&self, cpf_cnpj: &str) -> Result<(), FarmerError> {
        tracing::info!(
            service = MEMORY,
            service_method = "delete",
            cpf_cnpj,
            "Deleting farmer."
        );
        match self.farmers()?.remove(cpf_cnpj) {
            Some(_) => Ok(()),
            None => Err(FarmerError::NotFound),
        }
    }
}
