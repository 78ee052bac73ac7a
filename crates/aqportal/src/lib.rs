//! `aqportal` - Air quality and pollution tracking portal
//!
//! This library keeps air quality readings, pollutant definitions, citizen
//! profiles, alerts and health guidelines as JSON collections, and provides
//! the reports, bulk import and text menus built on top of them.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod import;
pub mod logging;
pub mod menu;
pub mod model;
pub mod report;
pub mod seed;
pub mod storage;
pub mod table;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use storage::{Store, StoreStats};
