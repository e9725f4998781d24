//! Regions and the geography catalog
//!
//! - `RegionKey` / `Level` - a country, province or city address
//! - `RegionResolver` - the seam the permission store validates keys through
//! - `RegionCatalog` - the CSV-loaded catalog implementing it

mod catalog;
mod key;

pub use catalog::{CatalogRow, RegionCatalog, RegionInfo, RegionResolver};
pub use key::{Level, RegionKey};

#[cfg(test)]
pub(crate) use catalog::sample_catalog;
