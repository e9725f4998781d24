//! Per-node permission state
//!
//! Every country and province node carries a default `Access` that applies to
//! everything beneath it, plus explicit overrides for children whose access
//! differs from that default. A node never stores a child that agrees with
//! it; this is what keeps a `PermissionSet` minimal.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Default coverage of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Access {
    Allow,
    #[default]
    Deny,
}

impl Access {
    pub fn is_allowed(self) -> bool {
        matches!(self, Access::Allow)
    }

    pub fn and(self, other: Access) -> Access {
        if self.is_allowed() && other.is_allowed() {
            Access::Allow
        } else {
            Access::Deny
        }
    }

    pub fn or(self, other: Access) -> Access {
        if self.is_allowed() || other.is_allowed() {
            Access::Allow
        } else {
            Access::Deny
        }
    }
}

/// Summarised state of a node: allow-all, deny-all, or consult children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    Allow,
    Deny,
    Custom,
}

impl From<Access> for NodeState {
    fn from(access: Access) -> Self {
        match access {
            Access::Allow => NodeState::Allow,
            Access::Deny => NodeState::Deny,
        }
    }
}

/// A province and its city overrides
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProvinceNode {
    access: Access,
    cities: BTreeMap<String, Access>,
}

impl ProvinceNode {
    pub fn new(access: Access) -> Self {
        Self {
            access,
            cities: BTreeMap::new(),
        }
    }

    pub fn access(&self) -> Access {
        self.access
    }

    /// City overrides, each differing from the province default
    pub fn cities(&self) -> impl Iterator<Item = (&String, Access)> {
        self.cities.iter().map(|(code, access)| (code, *access))
    }

    pub fn city_access(&self, city: &str) -> Access {
        self.cities.get(city).copied().unwrap_or(self.access)
    }

    pub fn state(&self) -> NodeState {
        if self.cities.is_empty() {
            self.access.into()
        } else {
            NodeState::Custom
        }
    }

    /// Record a city's access, dropping the override when it matches the default
    pub(crate) fn set_city(&mut self, city: &str, access: Access) {
        if access == self.access {
            self.cities.remove(city);
        } else {
            self.cities.insert(city.to_string(), access);
        }
    }

    /// A node that adds nothing over what it inherits
    pub(crate) fn is_vacuous(&self, inherited: Access) -> bool {
        self.access == inherited && self.cities.is_empty()
    }

    pub(crate) fn is_normalized(&self, inherited: Access) -> bool {
        !self.is_vacuous(inherited) && self.cities.values().all(|a| *a != self.access)
    }
}

/// A country and its province overrides
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CountryNode {
    access: Access,
    provinces: BTreeMap<String, ProvinceNode>,
}

impl CountryNode {
    pub fn new(access: Access) -> Self {
        Self {
            access,
            provinces: BTreeMap::new(),
        }
    }

    pub fn access(&self) -> Access {
        self.access
    }

    pub fn provinces(&self) -> impl Iterator<Item = (&String, &ProvinceNode)> {
        self.provinces.iter()
    }

    pub fn province(&self, province: &str) -> Option<&ProvinceNode> {
        self.provinces.get(province)
    }

    pub fn province_access(&self, province: &str) -> Access {
        self.provinces
            .get(province)
            .map(|p| p.access)
            .unwrap_or(self.access)
    }

    pub fn city_access(&self, province: &str, city: &str) -> Access {
        self.provinces
            .get(province)
            .map(|p| p.city_access(city))
            .unwrap_or(self.access)
    }

    pub fn state(&self) -> NodeState {
        if self.provinces.is_empty() {
            self.access.into()
        } else {
            NodeState::Custom
        }
    }

    /// Set a province to a uniform access, discarding its city overrides
    pub(crate) fn set_province(&mut self, province: &str, access: Access) {
        if access == self.access {
            self.provinces.remove(province);
        } else {
            self.provinces
                .insert(province.to_string(), ProvinceNode::new(access));
        }
    }

    pub(crate) fn set_city(&mut self, province: &str, city: &str, access: Access) {
        let inherited = self.access;
        let node = self
            .provinces
            .entry(province.to_string())
            .or_insert_with(|| ProvinceNode::new(inherited));
        node.set_city(city, access);
        if node.is_vacuous(inherited) {
            self.provinces.remove(province);
        }
    }

    /// Insert an already-built province node unless it is vacuous
    pub(crate) fn put_province(&mut self, province: String, node: ProvinceNode) {
        if !node.is_vacuous(self.access) {
            self.provinces.insert(province, node);
        }
    }

    /// A denied country with no overrides is the same as no entry at all
    pub(crate) fn is_vacuous(&self) -> bool {
        self.access == Access::Deny && self.provinces.is_empty()
    }

    pub(crate) fn is_normalized(&self) -> bool {
        !self.is_vacuous()
            && self
                .provinces
                .values()
                .all(|p| p.is_normalized(self.access))
    }
}
