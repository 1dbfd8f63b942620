//! Remote catalog client.
//!
//! Talks to the shop admin REST API: lists products page by page following
//! the cursor in the `Link` response header, and deletes products by id.
//!
//! Read and write access are separate traits so that read-only callers can be
//! written against [`CatalogReader`] alone and never gain the ability to
//! delete.
//!
//! # Usage
//!
//! ```rust,ignore
//! use catalog_sweeper::catalog::{CatalogReader, HttpCatalogClient};
//!
//! let client = HttpCatalogClient::from_config(&config.catalog)?;
//! let page = client.list_page(None, 250).await?;
//! for item in &page.items {
//!     println!("{} {:?}", item.id, item.tags);
//! }
//! ```

mod client;
mod error;
pub mod link;
pub mod retry;
mod types;

pub use client::{CatalogReader, CatalogWriter, HttpCatalogClient};
pub use error::{CatalogError, CatalogResult};
pub use types::{Candidate, CatalogItem, ItemId, Page, parse_tags};
