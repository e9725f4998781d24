//! Per-distributor permission set
//!
//! A three-level trie of country → province → city nodes. Whether a country
//! node's default is `Allow` decides how everything beneath it reads: under
//! an allowed country, province and city entries are exceptions; under a
//! denied one they are grants. Marks keep the trie normalized so that no
//! entry ever repeats what its ancestor already says.

use std::collections::{BTreeMap, BTreeSet};

use super::node::{Access, CountryNode, ProvinceNode};
use crate::region::RegionKey;

/// Granted and excepted regions of one distributor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    countries: BTreeMap<String, CountryNode>,
}

impl PermissionSet {
    /// Create an empty (deny-all) permission set
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if nothing is granted anywhere
    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    pub fn country(&self, country: &str) -> Option<&CountryNode> {
        self.countries.get(country)
    }

    pub fn countries(&self) -> impl Iterator<Item = (&String, &CountryNode)> {
        self.countries.iter()
    }

    /// Grant a region, undoing any exception on it
    pub fn include(&mut self, region: &RegionKey) {
        self.mark(region, Access::Allow);
    }

    /// Deny a region, retracting any grant on it
    pub fn exclude(&mut self, region: &RegionKey) {
        self.mark(region, Access::Deny);
    }

    /// Set a region (and everything beneath it) to `access`
    ///
    /// Decision table:
    ///
    /// | level    | effect                                                     |
    /// |----------|------------------------------------------------------------|
    /// | country  | replace the node; an allowed country drops all sub-entries, |
    /// |          | a denied one is removed entirely                           |
    /// | province | override under the country unless it matches the country's |
    /// |          | default, in which case the override is dropped; city       |
    /// |          | entries beneath it are cleared either way                  |
    /// | city     | override under the governing province (or the country when |
    /// |          | the province has no entry) unless it matches its default   |
    pub fn mark(&mut self, region: &RegionKey, access: Access) {
        match region {
            RegionKey::Country { country } => match access {
                Access::Allow => {
                    self.countries
                        .insert(country.clone(), CountryNode::new(Access::Allow));
                }
                Access::Deny => {
                    self.countries.remove(country);
                }
            },
            RegionKey::Province { country, province } => {
                self.countries
                    .entry(country.clone())
                    .or_default()
                    .set_province(province, access);
                self.prune(country);
            }
            RegionKey::City {
                country,
                province,
                city,
            } => {
                self.countries
                    .entry(country.clone())
                    .or_default()
                    .set_city(province, city, access);
                self.prune(country);
            }
        }
    }

    /// Effective access of exactly this region
    ///
    /// For countries and provinces this is the node default; exceptions
    /// beneath it are not considered.
    pub fn access_of(&self, region: &RegionKey) -> Access {
        let Some(node) = self.countries.get(region.country_code()) else {
            return Access::Deny;
        };
        match region {
            RegionKey::Country { .. } => node.access(),
            RegionKey::Province { province, .. } => node.province_access(province),
            RegionKey::City { province, city, .. } => node.city_access(province, city),
        }
    }

    /// Regions allowed by both sets
    pub fn intersect(&self, other: &PermissionSet) -> PermissionSet {
        self.combine(other, Access::and)
    }

    /// Regions allowed by either set
    pub fn union(&self, other: &PermissionSet) -> PermissionSet {
        self.combine(other, Access::or)
    }

    /// Combine two sets region by region
    ///
    /// Every region's access in the result is `op` applied to its effective
    /// access on each side. Only codes mentioned by at least one side need
    /// visiting; everything else follows the combined defaults.
    fn combine(&self, other: &PermissionSet, op: fn(Access, Access) -> Access) -> PermissionSet {
        let denied = CountryNode::default();
        let codes: BTreeSet<&String> = self
            .countries
            .keys()
            .chain(other.countries.keys())
            .collect();

        let mut out = PermissionSet::new();
        for code in codes {
            let a = self.countries.get(code).unwrap_or(&denied);
            let b = other.countries.get(code).unwrap_or(&denied);

            let mut node = CountryNode::new(op(a.access(), b.access()));
            let provinces: BTreeSet<&String> = a
                .provinces()
                .map(|(p, _)| p)
                .chain(b.provinces().map(|(p, _)| p))
                .collect();

            for province in provinces {
                let pa = a.province(province);
                let pb = b.province(province);
                let mut merged = ProvinceNode::new(op(
                    a.province_access(province),
                    b.province_access(province),
                ));
                let cities: BTreeSet<&String> = pa
                    .into_iter()
                    .flat_map(|p| p.cities().map(|(c, _)| c))
                    .chain(pb.into_iter().flat_map(|p| p.cities().map(|(c, _)| c)))
                    .collect();
                for city in cities {
                    let access = op(
                        a.city_access(province, city),
                        b.city_access(province, city),
                    );
                    merged.set_city(city, access);
                }
                node.put_province(province.clone(), merged);
            }

            if !node.is_vacuous() {
                out.countries.insert(code.clone(), node);
            }
        }
        out
    }

    fn prune(&mut self, country: &str) {
        if self
            .countries
            .get(country)
            .map(CountryNode::is_vacuous)
            .unwrap_or(false)
        {
            self.countries.remove(country);
        }
    }
}
