//! Contract DTO

use std::collections::BTreeSet;

use crate::permissions::{entries, Access, PermissionSet};
use crate::region::RegionKey;

/// A delegation request: regions granted to `recipient`, optionally bounded
/// by what `parent` currently holds
///
/// Consumed once by the contract processor and then discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contract {
    /// Distributor receiving the grant
    pub recipient: String,
    /// Distributor whose current grant bounds this one
    pub parent: Option<String>,
    /// Regions granted
    pub included: BTreeSet<RegionKey>,
    /// Exceptions beneath included regions
    pub excluded: BTreeSet<RegionKey>,
}

impl Contract {
    /// Create an empty contract for `recipient`
    pub fn new(recipient: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            ..Default::default()
        }
    }

    /// Bound the contract by a parent distributor
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Add an included region
    pub fn include(mut self, region: RegionKey) -> Self {
        self.included.insert(region);
        self
    }

    /// Add an excluded region
    pub fn exclude(mut self, region: RegionKey) -> Self {
        self.excluded.insert(region);
        self
    }

    /// Every region the contract mentions
    pub fn regions(&self) -> impl Iterator<Item = &RegionKey> {
        self.included.iter().chain(self.excluded.iter())
    }

    /// The permission set this contract grants on its own
    pub fn grant(&self) -> PermissionSet {
        let mut marks: Vec<(&RegionKey, Access)> = self
            .included
            .iter()
            .map(|r| (r, Access::Allow))
            .chain(self.excluded.iter().map(|r| (r, Access::Deny)))
            .collect();
        marks.sort_by(|a, b| a.0.cmp(b.0));

        let mut set = PermissionSet::new();
        for (region, access) in marks {
            set.mark(region, access);
        }
        set
    }

    /// Rebuild a contract from a permission set, keeping the parties
    pub fn with_grant(&self, grant: &PermissionSet) -> Contract {
        let mut contract = Contract {
            recipient: self.recipient.clone(),
            parent: self.parent.clone(),
            ..Default::default()
        };
        for entry in entries(grant) {
            match entry.access {
                Access::Allow => contract.included.insert(entry.region),
                Access::Deny => contract.excluded.insert(entry.region),
            };
        }
        contract
    }
}
