//! Error types for the permission core

use thiserror::Error;

/// Errors returned by store, contract and catalog operations
#[derive(Error, Debug)]
pub enum GrantError {
    /// Distributor is not registered
    #[error("distributor {0} not found")]
    DistributorNotFound(String),

    /// Contract names a parent that is not registered
    #[error("parent distributor {0} not found")]
    ParentDistributorNotFound(String),

    /// Region key is malformed or absent from the catalog
    #[error("region not found: {0}")]
    RegionNotFound(String),

    /// Distributor is already registered
    #[error("distributor {0} already exists")]
    DistributorExists(String),

    /// Contract violates a structural rule
    #[error("invalid contract: {0}")]
    InvalidContract(String),

    /// Stored state broke a normalization invariant
    #[error("internal inconsistency: {0}")]
    InternalInconsistency(String),

    /// Catalog file has an unexpected shape
    #[error("invalid region catalog: {0}")]
    InvalidCatalog(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV decoding error
    #[error("CSV error: {0}")]
    Csv(#[from] csv_async::Error),
}

impl GrantError {
    /// Create an invalid contract error
    pub fn invalid_contract(reason: impl Into<String>) -> Self {
        GrantError::InvalidContract(reason.into())
    }

    /// Create a region not found error
    pub fn region_not_found(region: impl Into<String>) -> Self {
        GrantError::RegionNotFound(region.into())
    }

    /// Stable machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            GrantError::DistributorNotFound(_) => "DISTRIBUTOR_NOT_FOUND",
            GrantError::ParentDistributorNotFound(_) => "PARENT_DISTRIBUTOR_NOT_FOUND",
            GrantError::RegionNotFound(_) => "REGION_NOT_FOUND",
            GrantError::DistributorExists(_) => "DISTRIBUTOR_EXISTS",
            GrantError::InvalidContract(_) => "INVALID_CONTRACT",
            GrantError::InternalInconsistency(_)
            | GrantError::InvalidCatalog(_)
            | GrantError::InvalidConfig(_)
            | GrantError::Io(_)
            | GrantError::Csv(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

/// Result type alias for permission operations
pub type GrantResult<T> = Result<T, GrantError>;
