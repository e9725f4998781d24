//! Structural contract validation
//!
//! Only exceptions may sit beneath an included region, and an exception is
//! only meaningful beneath an included region. A city may be granted again
//! inside an excluded province of an included country.

use super::model::Contract;
use crate::core::{GrantError, GrantResult};
use crate::region::RegionKey;

/// Check a contract's structure without touching any store
pub fn validate_contract(contract: &Contract) -> GrantResult<()> {
    if contract.recipient.trim().is_empty() {
        return Err(GrantError::invalid_contract("recipient distributor is empty"));
    }
    if let Some(parent) = &contract.parent {
        if parent.trim().is_empty() {
            return Err(GrantError::invalid_contract("parent distributor is empty"));
        }
        if *parent == contract.recipient {
            return Err(GrantError::invalid_contract(format!(
                "distributor {} cannot delegate to itself",
                parent
            )));
        }
    }
    if contract.included.is_empty() {
        return Err(GrantError::invalid_contract("no included regions found"));
    }

    for region in &contract.included {
        if contract.excluded.contains(region) {
            return Err(GrantError::invalid_contract(format!(
                "{} is both included and excluded",
                region
            )));
        }
        // a coarser inclusion already covers this one unless an exclusion sits in between
        if let Some(ancestor) = covering_inclusion(contract, region) {
            return Err(GrantError::invalid_contract(format!(
                "{} is included, but {} is also included; only exclusions may follow an included region",
                ancestor, region
            )));
        }
    }

    for region in &contract.excluded {
        match region {
            RegionKey::Country { country } => {
                return Err(GrantError::invalid_contract(format!(
                    "excluding country {} is meaningless since there is no world-level inclusion to exclude from",
                    country
                )));
            }
            RegionKey::Province { country, .. } => {
                if !contract.included.contains(&RegionKey::country(country.clone())) {
                    return Err(GrantError::invalid_contract(format!(
                        "{} is excluded, but country {} is not included",
                        region, country
                    )));
                }
            }
            RegionKey::City {
                country, province, ..
            } => {
                let covered = contract.included.contains(&RegionKey::country(country.clone()))
                    || contract
                        .included
                        .contains(&RegionKey::province(country.clone(), province.clone()));
                if !covered {
                    return Err(GrantError::invalid_contract(format!(
                        "{} is excluded, but neither its country nor its province is included",
                        region
                    )));
                }
            }
        }
    }

    Ok(())
}

/// Nearest ancestor mentioned by the contract, if that ancestor is an inclusion
fn covering_inclusion<'a>(contract: &'a Contract, region: &RegionKey) -> Option<&'a RegionKey> {
    let mut current = region.parent();
    while let Some(ancestor) = current {
        if let Some(found) = contract.included.get(&ancestor) {
            return Some(found);
        }
        if contract.excluded.contains(&ancestor) {
            return None;
        }
        current = ancestor.parent();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> RegionKey {
        RegionKey::split_composite(s).unwrap()
    }

    fn reason(contract: &Contract) -> String {
        match validate_contract(contract) {
            Err(GrantError::InvalidContract(reason)) => reason,
            other => panic!("expected invalid contract, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_contract() {
        let contract = Contract::new("D1")
            .include(key("IN"))
            .include(key("KA-US"))
            .exclude(key("TN-IN"))
            .exclude(key("BLR-KA-IN"));
        assert!(validate_contract(&contract).is_ok());
    }

    #[test]
    fn test_rejects_include_and_exclude() {
        let contract = Contract::new("D1")
            .include(key("IN"))
            .include(key("KA-IN"));
        let mut both = Contract::new("D1").include(key("US")).include(key("NY-IN"));
        both.excluded.insert(key("NY-IN"));

        assert!(reason(&contract).contains("only exclusions"));
        assert!(reason(&both).contains("both included and excluded"));
    }

    #[test]
    fn test_rejects_country_in_both_sets() {
        let mut contract = Contract::new("D1").include(key("IN"));
        contract.excluded.insert(key("IN"));
        assert!(validate_contract(&contract).is_err());
    }

    #[test]
    fn test_rejects_nested_inclusions() {
        let contract = Contract::new("D1")
            .include(key("KA-IN"))
            .include(key("BLR-KA-IN"));
        assert!(reason(&contract).contains("KA-IN is included"));

        let contract = Contract::new("D1")
            .include(key("IN"))
            .include(key("BLR-KA-IN"));
        assert!(reason(&contract).contains("IN is included"));
    }

    #[test]
    fn test_rejects_orphan_exclusions() {
        let contract = Contract::new("D1")
            .include(key("US"))
            .exclude(key("TN-IN"));
        assert!(reason(&contract).contains("country IN is not included"));

        let contract = Contract::new("D1")
            .include(key("KA-IN"))
            .exclude(key("CENAI-TN-IN"));
        assert!(reason(&contract).contains("neither its country nor its province"));

        let contract = Contract::new("D1")
            .include(key("KA-IN"))
            .exclude(key("BLR-KA-IN"));
        assert!(validate_contract(&contract).is_ok());
    }

    #[test]
    fn test_accepts_city_grant_inside_excluded_province() {
        let contract = Contract::new("D1")
            .include(key("IN"))
            .exclude(key("KA-IN"))
            .include(key("BLR-KA-IN"));
        assert!(validate_contract(&contract).is_ok());

        let grant = contract.grant();
        assert_eq!(grant.access_of(&key("BLR-KA-IN")), crate::permissions::Access::Allow);
        assert_eq!(grant.access_of(&key("YADGR-KA-IN")), crate::permissions::Access::Deny);
    }

    #[test]
    fn test_rejects_country_exclusion() {
        let contract = Contract::new("D1").include(key("US")).exclude(key("IN"));
        assert!(reason(&contract).contains("meaningless"));
    }

    #[test]
    fn test_rejects_bad_parties() {
        assert!(reason(&Contract::new("").include(key("IN"))).contains("recipient"));
        assert!(reason(&Contract::new("D1").with_parent("D1").include(key("IN")))
            .contains("itself"));
        assert!(reason(&Contract::new("D1")).contains("no included regions"));
    }
}
