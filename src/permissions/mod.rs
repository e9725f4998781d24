//! Hierarchical permission store
//!
//! Each distributor owns a `PermissionSet`: a country → province → city trie
//! where every node carries a default `Access` and records only the children
//! that differ from it.
//!
//! ## Components
//!
//! - `PermissionSet`: the trie and its mark / intersect / union operations
//! - `PermissionStore`: per-distributor sets behind one reader/writer lock
//! - `evaluate`: three-way `Verdict` for a region
//! - `PermissionReport`: flattened `INCLUDE` / `EXCLUDE` region strings
//!
//! ## Example
//!
//! ```rust,ignore
//! use region_grants::permissions::{PermissionStore, Verdict};
//! use region_grants::region::RegionKey;
//!
//! let store = PermissionStore::new(catalog.clone());
//! store.add_distributor("DISTRIBUTOR1")?;
//! store.mark_included("DISTRIBUTOR1", &RegionKey::country("IN"))?;
//! store.mark_excluded("DISTRIBUTOR1", &RegionKey::province("IN", "KA"))?;
//!
//! match store.evaluate("DISTRIBUTOR1", &RegionKey::country("IN"))? {
//!     Verdict::FullyAllowed => { /* everything in India */ }
//!     Verdict::PartiallyAllowed => { /* India, with exceptions */ }
//!     Verdict::FullyDenied => { /* nothing */ }
//! }
//! ```

mod evaluator;
mod node;
mod reporter;
mod set;
mod store;

pub use evaluator::{evaluate, Verdict};
pub use node::{Access, CountryNode, NodeState, ProvinceNode};
pub use reporter::{entries, PermissionReport, ReportEntry};
pub use set::PermissionSet;
pub use store::PermissionStore;
