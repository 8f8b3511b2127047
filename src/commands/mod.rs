//! # Command Handlers
//!
//! This module contains organized command handlers for the agroctl CLI application.
//!
//! ## Structure
//!
//! - `farmer` - Farmer management commands (list, create, update, delete)
//! - `shared` - Shared utilities and validation functions

pub mod farmer;
pub mod shared;

pub use farmer::handle_farmer_command;
