//! Paginated cleanup of expired, tag-marked items in a remote shop catalog.
//!
//! The sweeper lists the whole catalog through the admin REST API, selects
//! items carrying a marker tag (optionally only those older than a maximum
//! age) and deletes them one at a time, reporting per-item failures without
//! aborting the run.
//!
//! ```rust,ignore
//! use catalog_sweeper::{
//!     catalog::HttpCatalogClient,
//!     config::SweeperConfig,
//!     sweep::{CleanupEngine, EnumerationLimits, Policy},
//! };
//!
//! let config = SweeperConfig::from_file("catalog-sweeper.toml")?;
//! let client = HttpCatalogClient::from_config(&config.catalog)?;
//! let engine = CleanupEngine::new(client, EnumerationLimits::from(&config.catalog));
//! let result = engine.cleanup(&Policy::from_config(&config.policy)).await?;
//! println!("deleted {} of {}", result.deleted, result.found);
//! ```

pub mod catalog;
pub mod config;
pub mod observability;
pub mod sweep;
