//! # Agro: a registry of rural producers
//!
//! Agro keeps one record per farmer, keyed by the farmer's Brazilian taxpayer
//! identifier (an 11-digit CPF or a 14-digit CNPJ), and serves it over a small
//! JSON HTTP API.
//!
//! This crate provides:
//!
//! - **Validated identifiers**: [`CpfCnpj`] checks both check digits on
//!   construction, so a value in hand is always well formed
//! - **Business rules**: the area invariant and set-style merging of
//!   [`FarmingOption`] tags, applied by the [`Farmer`] operations before
//!   anything is written
//! - **Pluggable storage**: the [`FarmerRepository`] trait, implemented over
//!   PostgreSQL and in memory
//! - **HTTP API**: axum routers with field-level validation errors
//!
//! ## Core Concepts
//!
//! ### The area invariant
//! Every stored farmer satisfies
//! `agricultural_area + vegetation_area <= total_area`. Creation checks the
//! incoming triple; partial updates check the merged view of stored and
//! incoming values.
//!
//! ### Farming options
//! A closed vocabulary (`SOY`, `CORN`, `COFFEE`, `COTTON`, `SUGARCANE`) kept as
//! a set. Updates add to the stored set rather than replacing it.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ HTTP API (axum handlers, schemas)       │
//! ├─────────────────────────────────────────┤
//! │ Farmer operations (business rules)      │
//! ├─────────────────────────────────────────┤
//! │ FarmerRepository (trait)                │
//! ├───────────────────┬─────────────────────┤
//! │ PostgreSQL (sqlx) │ In-memory           │
//! └───────────────────┴─────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! # use agro::{CpfCnpj, DocumentKind};
//! let cpf = CpfCnpj::parse("42063478082").unwrap();
//! assert_eq!(cpf.kind(), DocumentKind::Cpf);
//!
//! // A wrong check digit is rejected.
//! assert!(CpfCnpj::parse("42063478083").is_err());
//!
//! // Check digits can be computed from the base digits.
//! let cnpj = CpfCnpj::complete("988774090001").unwrap();
//! assert_eq!(cnpj.as_str(), "98877409000195");
//! ```
//!
//! Serving the API over the in-memory store:
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use agro::{InMemoryFarmerRepository, create_app};
//! # async fn serve() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app(Arc::new(InMemoryFarmerRepository::new()));
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
mod api;
mod document;
mod errors;
mod farmer;
mod farming_option;
mod repository;
mod validate;

/// Command-line interface utilities for program termination and output formatting.
///
/// This module provides common CLI utilities for agro binaries, including
/// error handling, formatted output, and program termination functions.
pub mod cli_utils;

/// Command-line interface command handlers for the agroctl CLI application.
pub mod commands;

/// Server configuration resolved from flags and environment.
pub mod config;

/// HTTP client utilities for interacting with the agro API.
pub mod http_utils;

/// Log subscriber setup.
pub mod logging;

/// Request body and query string parsing.
pub mod schemas;

/// PostgreSQL database operations and migrations.
pub mod sql;

pub use api::{
    ApiError, SERVICE_NAME, SharedRepository, create_app, create_farmer_router,
    create_health_router,
};
pub use document::{CpfCnpj, CpfCnpjError, DocumentKind};
pub use errors::FarmerError;
pub use farmer::{Farmer, FarmerChanges, NewFarmer};
pub use farming_option::{FarmingOption, UnknownFarmingOption};
pub use repository::{FarmerRepository, InMemoryFarmerRepository, PostgresFarmerRepository};
pub use validate::{
    MISSING_QUERY_PARAMETER, VALIDATION_FAILED, ValidationErrors, dedup_farming_options,
    normalize_farming_options, validate_total_area,
};
