pub mod core;
pub mod region;
pub mod permissions;
pub mod contract;
pub mod service;

// Server components
pub mod config;
pub mod http;
pub mod logging;

pub use crate::core::{GrantError, GrantResult};
pub use crate::service::DistributionService;
