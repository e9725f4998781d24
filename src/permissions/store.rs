//! Permission store
//!
//! Owns one `PermissionSet` per distributor behind a single reader/writer
//! lock. Reads (existence, evaluation, reporting, snapshots) take the shared
//! lock; every mutation runs to completion under the exclusive lock, so no
//! caller ever observes a half-applied change.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use super::evaluator::{self, Verdict};
use super::node::Access;
use super::reporter::PermissionReport;
use super::set::PermissionSet;
use crate::core::{GrantError, GrantResult};
use crate::region::{RegionKey, RegionResolver};

/// Shared store of distributor permission sets
///
/// Constructed once and shared by reference (typically inside an `Arc`)
/// between every request handler.
pub struct PermissionStore {
    /// Permission set per distributor
    distributors: RwLock<HashMap<String, PermissionSet>>,
    /// Region validation
    resolver: Arc<dyn RegionResolver>,
}

impl PermissionStore {
    /// Create an empty store validating regions through `resolver`
    pub fn new(resolver: Arc<dyn RegionResolver>) -> Self {
        Self {
            distributors: RwLock::new(HashMap::new()),
            resolver,
        }
    }

    pub fn resolver(&self) -> &Arc<dyn RegionResolver> {
        &self.resolver
    }

    /// Register a distributor with an empty permission set
    pub fn add_distributor(&self, distributor: &str) -> GrantResult<()> {
        let mut distributors = self.distributors.write();
        if distributors.contains_key(distributor) {
            return Err(GrantError::DistributorExists(distributor.to_string()));
        }
        distributors.insert(distributor.to_string(), PermissionSet::new());
        tracing::info!("Added distributor: {}", distributor);
        Ok(())
    }

    /// Remove a distributor and discard its permission set
    pub fn remove_distributor(&self, distributor: &str) -> GrantResult<()> {
        if self.distributors.write().remove(distributor).is_none() {
            return Err(GrantError::DistributorNotFound(distributor.to_string()));
        }
        tracing::info!("Removed distributor: {}", distributor);
        Ok(())
    }

    /// Check if a distributor is registered
    pub fn contains(&self, distributor: &str) -> bool {
        self.distributors.read().contains_key(distributor)
    }

    /// All registered distributors, sorted
    pub fn distributors(&self) -> Vec<String> {
        let mut names: Vec<String> = self.distributors.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Get the number of registered distributors
    pub fn len(&self) -> usize {
        self.distributors.read().len()
    }

    /// Check if no distributor is registered
    pub fn is_empty(&self) -> bool {
        self.distributors.read().is_empty()
    }

    /// Grant `region` to `distributor`
    pub fn mark_included(&self, distributor: &str, region: &RegionKey) -> GrantResult<()> {
        self.mark(distributor, region, Access::Allow)
    }

    /// Deny `region` to `distributor`
    pub fn mark_excluded(&self, distributor: &str, region: &RegionKey) -> GrantResult<()> {
        self.mark(distributor, region, Access::Deny)
    }

    fn mark(&self, distributor: &str, region: &RegionKey, access: Access) -> GrantResult<()> {
        let mut distributors = self.distributors.write();
        let set = distributors
            .get_mut(distributor)
            .ok_or_else(|| GrantError::DistributorNotFound(distributor.to_string()))?;
        if !self.resolver.contains(region) {
            return Err(GrantError::region_not_found(region.to_string()));
        }
        set.mark(region, access);
        tracing::info!("Marked {} as {:?} for {}", region, access, distributor);
        Ok(())
    }

    /// Copy of a distributor's current permission set
    pub fn snapshot(&self, distributor: &str) -> GrantResult<PermissionSet> {
        self.distributors
            .read()
            .get(distributor)
            .cloned()
            .ok_or_else(|| GrantError::DistributorNotFound(distributor.to_string()))
    }

    /// Evaluate `region` for `distributor`
    pub fn evaluate(&self, distributor: &str, region: &RegionKey) -> GrantResult<Verdict> {
        let distributors = self.distributors.read();
        let set = distributors
            .get(distributor)
            .ok_or_else(|| GrantError::DistributorNotFound(distributor.to_string()))?;
        let verdict = evaluator::evaluate(set, region)?;
        tracing::debug!("Checked {} for {}: {}", region, distributor, verdict);
        Ok(verdict)
    }

    /// Flattened report of a distributor's permission set
    pub fn report(&self, distributor: &str) -> GrantResult<PermissionReport> {
        let distributors = self.distributors.read();
        let set = distributors
            .get(distributor)
            .ok_or_else(|| GrantError::DistributorNotFound(distributor.to_string()))?;
        Ok(PermissionReport::from_set(distributor, set))
    }

    /// Run `f` on a distributor's set under the exclusive lock
    ///
    /// The distributor is created with an empty set if absent. Returns the
    /// closure's result and whether the distributor was created.
    pub fn upsert_with<T>(
        &self,
        distributor: &str,
        f: impl FnOnce(&mut PermissionSet) -> T,
    ) -> (T, bool) {
        let mut distributors = self.distributors.write();
        let created = !distributors.contains_key(distributor);
        let set = distributors.entry(distributor.to_string()).or_default();
        (f(set), created)
    }
}

impl std::fmt::Debug for PermissionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionStore")
            .field("distributors", &self.len())
            .finish()
    }
}
