//! Distribution service
//!
//! The operation surface shared by every front end: distributor lifecycle,
//! direct marking, contract application, checks, reports and region
//! listings. Errors come back as `GrantError` values carrying a stable code.

use std::sync::Arc;

use crate::contract::{self, Contract};
use crate::core::{GrantError, GrantResult};
use crate::permissions::{PermissionReport, PermissionStore, Verdict};
use crate::region::{RegionCatalog, RegionInfo, RegionKey, RegionResolver};

/// Permission operations over one geography catalog
#[derive(Debug)]
pub struct DistributionService {
    catalog: Arc<RegionCatalog>,
    store: PermissionStore,
}

impl DistributionService {
    /// Create a service with an empty store over `catalog`
    pub fn new(catalog: Arc<RegionCatalog>) -> Self {
        let store = PermissionStore::new(catalog.clone());
        Self { catalog, store }
    }

    pub fn catalog(&self) -> &RegionCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &PermissionStore {
        &self.store
    }

    pub fn add_distributor(&self, distributor: &str) -> GrantResult<()> {
        self.store.add_distributor(distributor.trim())
    }

    pub fn remove_distributor(&self, distributor: &str) -> GrantResult<()> {
        self.store.remove_distributor(distributor.trim())
    }

    /// Registered distributors, sorted
    pub fn list_distributors(&self) -> Vec<String> {
        self.store.distributors()
    }

    /// Evaluate a composite region key for a distributor
    ///
    /// The region is resolved before the distributor is looked up, so an
    /// unknown region wins over an unknown distributor.
    pub fn check(&self, distributor: &str, region: &str) -> GrantResult<Verdict> {
        let region = self.catalog.parse(region)?;
        self.store.evaluate(distributor.trim(), &region)
    }

    /// Grant a composite region key to a distributor
    pub fn allow(&self, distributor: &str, region: &str) -> GrantResult<()> {
        self.mark(distributor, region, true)
    }

    /// Deny a composite region key to a distributor
    pub fn disallow(&self, distributor: &str, region: &str) -> GrantResult<()> {
        self.mark(distributor, region, false)
    }

    fn mark(&self, distributor: &str, region: &str, allow: bool) -> GrantResult<()> {
        let distributor = distributor.trim();
        // unknown distributor is reported ahead of a bad region
        if !self.store.contains(distributor) {
            return Err(GrantError::DistributorNotFound(distributor.to_string()));
        }
        let region = self.catalog.parse(region)?;
        if allow {
            self.store.mark_included(distributor, &region)
        } else {
            self.store.mark_excluded(distributor, &region)
        }
    }

    pub fn apply_contract(&self, contract: &Contract) -> GrantResult<()> {
        contract::apply_contract(&self.store, contract)
    }

    /// Parse contract text and apply it
    pub fn apply_contract_text(&self, text: &str) -> GrantResult<()> {
        let contract = contract::parse_contract(text, self.catalog.as_ref())?;
        self.apply_contract(&contract)
    }

    /// Structured permission lists for a distributor
    pub fn permissions(&self, distributor: &str) -> GrantResult<PermissionReport> {
        self.store.report(distributor.trim())
    }

    /// Permissions rendered in contract text form
    pub fn permissions_text(&self, distributor: &str) -> GrantResult<String> {
        Ok(self.permissions(distributor)?.to_text())
    }

    pub fn countries(&self) -> Vec<RegionInfo> {
        self.catalog.countries()
    }

    pub fn provinces(&self, country: &str) -> GrantResult<Vec<RegionInfo>> {
        self.catalog.provinces(country.trim())
    }

    pub fn cities(&self, country: &str, province: &str) -> GrantResult<Vec<RegionInfo>> {
        self.catalog.cities(country.trim(), province.trim())
    }

    /// Resolve a composite key against the catalog
    pub fn resolve(&self, region: &str) -> GrantResult<RegionKey> {
        self.catalog.parse(region)
    }
}
