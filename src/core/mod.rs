//! Core types shared by every component
//!
//! - `GrantError` / `GrantResult` - the error taxonomy returned at every call boundary

pub mod error;

pub use error::{GrantError, GrantResult};
