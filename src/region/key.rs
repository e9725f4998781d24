//! Region keys
//!
//! A region is addressed by a composite key written finest-to-coarsest and
//! separated by dashes: `CITY-PROVINCE-COUNTRY`, `PROVINCE-COUNTRY` or
//! `COUNTRY`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hierarchy level of a region
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Country,
    Province,
    City,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Country => write!(f, "country"),
            Level::Province => write!(f, "province"),
            Level::City => write!(f, "city"),
        }
    }
}

/// A country, province or city
///
/// Ordering sorts by level first (countries before provinces before cities),
/// then by country, province and city code. Replaying marks in this order
/// always applies coarser regions before the regions nested in them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RegionKey {
    Country {
        country: String,
    },
    Province {
        country: String,
        province: String,
    },
    City {
        country: String,
        province: String,
        city: String,
    },
}

impl RegionKey {
    /// Create a country key
    pub fn country(country: impl Into<String>) -> Self {
        RegionKey::Country {
            country: country.into(),
        }
    }

    /// Create a province key
    pub fn province(country: impl Into<String>, province: impl Into<String>) -> Self {
        RegionKey::Province {
            country: country.into(),
            province: province.into(),
        }
    }

    /// Create a city key
    pub fn city(
        country: impl Into<String>,
        province: impl Into<String>,
        city: impl Into<String>,
    ) -> Self {
        RegionKey::City {
            country: country.into(),
            province: province.into(),
            city: city.into(),
        }
    }

    /// Split a composite key without consulting a catalog
    ///
    /// Returns `None` for an empty part or more than three parts.
    pub fn split_composite(composite: &str) -> Option<Self> {
        let parts: Vec<&str> = composite.trim().split('-').collect();
        if parts.iter().any(|p| p.is_empty()) {
            return None;
        }
        match parts.as_slice() {
            [country] => Some(RegionKey::country(*country)),
            [province, country] => Some(RegionKey::province(*country, *province)),
            [city, province, country] => Some(RegionKey::city(*country, *province, *city)),
            _ => None,
        }
    }

    /// Level of this region
    pub fn level(&self) -> Level {
        match self {
            RegionKey::Country { .. } => Level::Country,
            RegionKey::Province { .. } => Level::Province,
            RegionKey::City { .. } => Level::City,
        }
    }

    pub fn country_code(&self) -> &str {
        match self {
            RegionKey::Country { country }
            | RegionKey::Province { country, .. }
            | RegionKey::City { country, .. } => country,
        }
    }

    pub fn province_code(&self) -> Option<&str> {
        match self {
            RegionKey::Country { .. } => None,
            RegionKey::Province { province, .. } | RegionKey::City { province, .. } => {
                Some(province)
            }
        }
    }

    pub fn city_code(&self) -> Option<&str> {
        match self {
            RegionKey::City { city, .. } => Some(city),
            _ => None,
        }
    }

    /// The enclosing region, if any
    pub fn parent(&self) -> Option<RegionKey> {
        match self {
            RegionKey::Country { .. } => None,
            RegionKey::Province { country, .. } => Some(RegionKey::country(country.clone())),
            RegionKey::City {
                country, province, ..
            } => Some(RegionKey::province(country.clone(), province.clone())),
        }
    }

    /// Whether `self` is `other` or nested inside it
    pub fn is_within(&self, other: &RegionKey) -> bool {
        match other {
            RegionKey::Country { country } => self.country_code() == country,
            RegionKey::Province { country, province } => {
                self.country_code() == country && self.province_code() == Some(province.as_str())
            }
            RegionKey::City { .. } => self == other,
        }
    }
}

impl fmt::Display for RegionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionKey::Country { country } => write!(f, "{}", country),
            RegionKey::Province { country, province } => write!(f, "{}-{}", province, country),
            RegionKey::City {
                country,
                province,
                city,
            } => write!(f, "{}-{}-{}", city, province, country),
        }
    }
}
