//! # Farmer Entity
//!
//! The farmer record and the stateless operations that guard it. Every
//! operation takes the repository it should use; nothing is kept between calls.
//!
//! ```text
//! HTTP handler ──> Farmer::{create, update, delete, get_all}
//!                        │  area invariant, option merging
//!                        ▼
//!                  dyn FarmerRepository (PostgreSQL or in-memory)
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    CpfCnpj, FarmerError, FarmerRepository, FarmingOption, normalize_farming_options,
    validate_total_area,
};

////////////////////////////////////////////// Farmer //////////////////////////////////////////////

/// A registered farmer as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Farmer {
    /// CPF or CNPJ; the primary key.
    pub cpf_cnpj: String,
    /// Farmer's name.
    pub name: String,
    /// Farm name.
    pub farm_name: String,
    /// City the farm is in.
    pub city: String,
    /// Two-character state code.
    pub state: String,
    /// Total farm area in hectares.
    pub total_area: i32,
    /// Agricultural area in hectares.
    pub agricultural_area: i32,
    /// Vegetation area in hectares.
    pub vegetation_area: i32,
    /// Crops and activities on the farm.
    pub farming_options: Vec<FarmingOption>,
    /// When the farmer was registered.
    pub insert_at: DateTime<Utc>,
    /// When the record last changed.
    pub update_at: DateTime<Utc>,
}

/// The data needed to register a farmer; timestamps are assigned on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFarmer {
    /// CPF or CNPJ.
    pub cpf_cnpj: CpfCnpj,
    /// Farmer's name.
    pub name: String,
    /// Farm name.
    pub farm_name: String,
    /// City the farm is in.
    pub city: String,
    /// Two-character state code.
    pub state: String,
    /// Total farm area in hectares.
    pub total_area: i32,
    /// Agricultural area in hectares.
    pub agricultural_area: i32,
    /// Vegetation area in hectares.
    pub vegetation_area: i32,
    /// Crops and activities on the farm.
    pub farming_options: Vec<FarmingOption>,
}

impl NewFarmer {
    /// Builds the stored record this registration produces at time `now`.
    pub fn into_farmer(self, now: DateTime<Utc>) -> Farmer {
        Farmer {
            cpf_cnpj: self.cpf_cnpj.into_string(),
            name: self.name,
            farm_name: self.farm_name,
            city: self.city,
            state: self.state,
            total_area: self.total_area,
            agricultural_area: self.agricultural_area,
            vegetation_area: self.vegetation_area,
            farming_options: self.farming_options,
            insert_at: now,
            update_at: now,
        }
    }
}

/// A partial update. `None` leaves the stored value as it is.
///
/// The identifier is deliberately absent: it cannot change after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmerChanges {
    /// New name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New farm name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub farm_name: Option<String>,
    /// New city.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    /// New state code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// New total area.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_area: Option<i32>,
    /// New agricultural area.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agricultural_area: Option<i32>,
    /// New vegetation area.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vegetation_area: Option<i32>,
    /// Options to store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub farming_options: Option<Vec<FarmingOption>>,
}

impl Farmer {
    /// Builds a new record from `self` with every supplied change applied.
    ///
    /// Timestamps are copied; refreshing `update_at` is the repository's job.
    pub fn merged(&self, changes: &FarmerChanges) -> Farmer {
        Farmer {
            cpf_cnpj: self.cpf_cnpj.clone(),
            name: changes.name.clone().unwrap_or_else(|| self.name.clone()),
            farm_name: changes
                .farm_name
                .clone()
                .unwrap_or_else(|| self.farm_name.clone()),
            city: changes.city.clone().unwrap_or_else(|| self.city.clone()),
            state: changes.state.clone().unwrap_or_else(|| self.state.clone()),
            total_area: changes.total_area.unwrap_or(self.total_area),
            agricultural_area: changes.agricultural_area.unwrap_or(self.agricultural_area),
            vegetation_area: changes.vegetation_area.unwrap_or(self.vegetation_area),
            farming_options: changes
                .farming_options
                .clone()
                .unwrap_or_else(|| self.farming_options.clone()),
            insert_at: self.insert_at,
            update_at: self.update_at,
        }
    }

    ///////////////////////////////////////// Operations /////////////////////////////////////////

    /// Lists up to `limit` farmers after skipping `offset`.
    pub async fn get_all(
        limit: i64,
        offset: i64,
        repository: &dyn FarmerRepository,
    ) -> Result<Vec<Farmer>, FarmerError> {
        repository.get_all(limit, offset).await
    }

    /// Registers a farmer.
    ///
    /// The area invariant is checked here as well as in the request schema so
    /// that direct callers cannot bypass it.
    pub async fn create(
        data: NewFarmer,
        repository: &dyn FarmerRepository,
    ) -> Result<Farmer, FarmerError> {
        validate_total_area(data.total_area, data.agricultural_area, data.vegetation_area)?;
        repository.create(&data).await
    }

    /// Removes the farmer registered under `cpf_cnpj`.
    pub async fn delete(cpf_cnpj: &str, repository: &dyn FarmerRepository) -> Result<(), FarmerError> {
        repository.delete(cpf_cnpj).await
    }

    /// Applies a partial update to the farmer registered under `cpf_cnpj`.
    ///
    /// The area invariant is evaluated on the merged view of stored and incoming
    /// values before anything is written. Incoming farming options are merged
    /// into the stored ones rather than replacing them.
    pub async fn update(
        cpf_cnpj: &str,
        changes: FarmerChanges,
        repository: &dyn FarmerRepository,
    ) -> Result<Farmer, FarmerError> {
        let farmer = repository.get_by_id(cpf_cnpj).await?;
        validate_total_area(
            changes.total_area.unwrap_or(farmer.total_area),
            changes.agricultural_area.unwrap_or(farmer.agricultural_area),
            changes.vegetation_area.unwrap_or(farmer.vegetation_area),
        )?;
        let farming_options = normalize_farming_options(
            &farmer.farming_options,
            changes.farming_options.as_deref().unwrap_or_default(),
        );
        let changes = FarmerChanges {
            farming_options: Some(farming_options),
            ..changes
        };
        repository.update(&farmer, &changes).await
    }
}
