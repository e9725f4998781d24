//! Geography catalog
//!
//! Holds every known country, province and city. Loaded once at startup from
//! a CSV file whose columns are, positionally:
//! `city_code, province_code, country_code, city_name, province_name, country_name`.
//! The first row is a header and is skipped.

use std::collections::BTreeMap;
use std::path::Path;

use futures::StreamExt;
use serde::Serialize;

use super::key::{Level, RegionKey};
use crate::core::{GrantError, GrantResult};

/// Resolves composite keys against known geography
///
/// The permission store only needs to know whether a key names a real
/// region; listing and names stay on `RegionCatalog`.
pub trait RegionResolver: Send + Sync {
    /// Check whether the region exists
    fn contains(&self, region: &RegionKey) -> bool;

    /// Parse a composite key and check that it exists
    fn parse(&self, composite: &str) -> GrantResult<RegionKey> {
        let key = RegionKey::split_composite(composite)
            .ok_or_else(|| GrantError::region_not_found(composite.trim()))?;
        if self.contains(&key) {
            Ok(key)
        } else {
            Err(GrantError::region_not_found(key.to_string()))
        }
    }
}

/// One row of the catalog file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRow {
    pub city_code: String,
    pub province_code: String,
    pub country_code: String,
    pub city_name: String,
    pub province_name: String,
    pub country_name: String,
}

/// Code and display name of a region, used for listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionInfo {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
struct CountryEntry {
    name: String,
    provinces: BTreeMap<String, ProvinceEntry>,
}

#[derive(Debug, Clone, Default)]
struct ProvinceEntry {
    name: String,
    cities: BTreeMap<String, String>,
}

/// In-memory geography catalog
#[derive(Debug, Clone, Default)]
pub struct RegionCatalog {
    countries: BTreeMap<String, CountryEntry>,
}

impl RegionCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the catalog from a CSV file
    pub async fn load(path: impl AsRef<Path>) -> GrantResult<Self> {
        let path = path.as_ref();
        tracing::info!("Loading region catalog from {:?}", path);

        let file = tokio::fs::File::open(path).await?;
        let mut reader = csv_async::AsyncReaderBuilder::new()
            .has_headers(true)
            .trim(csv_async::Trim::All)
            .create_reader(file);

        let mut catalog = RegionCatalog::new();
        let mut records = reader.records();
        let mut line = 1;
        while let Some(record) = records.next().await {
            let record = record?;
            line += 1;
            let field = |i: usize| {
                record
                    .get(i)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .ok_or_else(|| {
                        let message = format!("line {}: missing column {}", line, i + 1);
                        GrantError::InvalidCatalog(message)
                    })
            };
            catalog.insert(CatalogRow {
                city_code: field(0)?,
                province_code: field(1)?,
                country_code: field(2)?,
                city_name: field(3)?,
                province_name: field(4)?,
                country_name: field(5)?,
            });
        }

        tracing::info!(
            "Region catalog loaded: {} countries, {} cities",
            catalog.countries.len(),
            catalog.city_count()
        );
        Ok(catalog)
    }

    /// Add a city (and its province and country, if new)
    pub fn insert(&mut self, row: CatalogRow) {
        let country = self
            .countries
            .entry(row.country_code)
            .or_insert_with(|| CountryEntry {
                name: row.country_name,
                provinces: BTreeMap::new(),
            });
        let province = country
            .provinces
            .entry(row.province_code)
            .or_insert_with(|| ProvinceEntry {
                name: row.province_name,
                cities: BTreeMap::new(),
            });
        province.cities.insert(row.city_code, row.city_name);
    }

    pub fn contains_country(&self, country: &str) -> bool {
        self.countries.contains_key(country)
    }

    pub fn contains_province(&self, country: &str, province: &str) -> bool {
        self.countries
            .get(country)
            .map(|c| c.provinces.contains_key(province))
            .unwrap_or(false)
    }

    pub fn contains_city(&self, country: &str, province: &str, city: &str) -> bool {
        self.countries
            .get(country)
            .and_then(|c| c.provinces.get(province))
            .map(|p| p.cities.contains_key(city))
            .unwrap_or(false)
    }

    /// Validate codes given coarsest-first for the given level
    pub fn validate(&self, level: Level, codes: &[&str]) -> bool {
        match (level, codes) {
            (Level::Country, [country]) => self.contains_country(country),
            (Level::Province, [country, province]) => self.contains_province(country, province),
            (Level::City, [country, province, city]) => {
                self.contains_city(country, province, city)
            }
            _ => false,
        }
    }

    /// List all countries, sorted by code
    pub fn countries(&self) -> Vec<RegionInfo> {
        self.countries
            .iter()
            .map(|(code, c)| RegionInfo {
                code: code.clone(),
                name: c.name.clone(),
            })
            .collect()
    }

    /// List the provinces of a country, sorted by code
    pub fn provinces(&self, country: &str) -> GrantResult<Vec<RegionInfo>> {
        let entry = self
            .countries
            .get(country)
            .ok_or_else(|| GrantError::region_not_found(country))?;
        Ok(entry
            .provinces
            .iter()
            .map(|(code, p)| RegionInfo {
                code: code.clone(),
                name: p.name.clone(),
            })
            .collect())
    }

    /// List the cities of a province, sorted by code
    pub fn cities(&self, country: &str, province: &str) -> GrantResult<Vec<RegionInfo>> {
        let entry = self
            .countries
            .get(country)
            .and_then(|c| c.provinces.get(province))
            .ok_or_else(|| GrantError::region_not_found(format!("{}-{}", province, country)))?;
        Ok(entry
            .cities
            .iter()
            .map(|(code, name)| RegionInfo {
                code: code.clone(),
                name: name.clone(),
            })
            .collect())
    }

    /// Total number of cities
    pub fn city_count(&self) -> usize {
        self.countries
            .values()
            .flat_map(|c| c.provinces.values())
            .map(|p| p.cities.len())
            .sum()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

impl RegionResolver for RegionCatalog {
    fn contains(&self, region: &RegionKey) -> bool {
        match region {
            RegionKey::Country { country } => self.validate(Level::Country, &[country.as_str()]),
            RegionKey::Province { country, province } => {
                self.validate(Level::Province, &[country.as_str(), province.as_str()])
            }
            RegionKey::City {
                country,
                province,
                city,
            } => self.validate(
                Level::City,
                &[country.as_str(), province.as_str(), city.as_str()],
            ),
        }
    }
}

impl FromIterator<CatalogRow> for RegionCatalog {
    fn from_iter<I: IntoIterator<Item = CatalogRow>>(iter: I) -> Self {
        let mut catalog = RegionCatalog::new();
        for row in iter {
            catalog.insert(row);
        }
        catalog
    }
}

/// Small catalog shared by unit tests across the crate
#[cfg(test)]
pub(crate) fn sample_catalog() -> RegionCatalog {
    let rows = [
        ("BLR", "KA", "IN", "Bangalore", "Karnataka", "India"),
        ("YADGR", "KA", "IN", "Yadgir", "Karnataka", "India"),
        ("CENAI", "TN", "IN", "Chennai", "Tamil Nadu", "India"),
        ("MDU", "TN", "IN", "Madurai", "Tamil Nadu", "India"),
        ("MUM", "MH", "IN", "Mumbai", "Maharashtra", "India"),
        ("LA", "CA", "US", "Los Angeles", "California", "United States"),
        ("SF", "CA", "US", "San Francisco", "California", "United States"),
        ("NYC", "NY", "US", "New York City", "New York", "United States"),
        ("LIS", "LI", "PT", "Lisbon", "Lisboa", "Portugal"),
    ];
    rows.into_iter()
        .map(|(city, province, country, city_name, province_name, country_name)| CatalogRow {
            city_code: city.into(),
            province_code: province.into(),
            country_code: country.into(),
            city_name: city_name.into(),
            province_name: province_name.into(),
            country_name: country_name.into(),
        })
        .collect()
}
