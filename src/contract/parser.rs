//! Contract text parser
//!
//! ```text
//! Permissions for DISTRIBUTOR2 < DISTRIBUTOR1
//! INCLUDE: IN
//! INCLUDE: US
//! EXCLUDE: KA-IN
//! EXCLUDE: CENAI-TN-IN
//! ```
//!
//! The heading names the recipient and, after `<`, its parent. Longer chains
//! (`A < B < C`) are accepted; names past the parent are only checked for
//! emptiness and duplicates. Spaces inside names and region keys are ignored.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::model::Contract;
use crate::core::{GrantError, GrantResult};
use crate::region::{RegionKey, RegionResolver};

static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*Permissions for\b(?P<chain>.*)$").expect("heading pattern is valid")
});

const INCLUDE: &str = "INCLUDE:";
const EXCLUDE: &str = "EXCLUDE:";

/// Parse contract text, resolving every region through `resolver`
pub fn parse_contract(text: &str, resolver: &dyn RegionResolver) -> GrantResult<Contract> {
    let mut lines = text.lines();
    let heading = lines
        .next()
        .filter(|l| !l.trim().is_empty())
        .ok_or_else(|| GrantError::invalid_contract("contract is empty"))?;

    let mut contract = parse_heading(heading)?;

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(region) = line.strip_prefix(INCLUDE) {
            let region = resolver.parse(&strip_spaces(region))?;
            contract.included.insert(region);
        } else if let Some(region) = line.strip_prefix(EXCLUDE) {
            let composite = strip_spaces(region);
            let region = resolver.parse(&composite)?;
            if let RegionKey::Country { .. } = region {
                return Err(GrantError::invalid_contract(format!(
                    "excluding a country (line: '{}') is meaningless since there is no world-level inclusion to exclude from",
                    line
                )));
            }
            contract.excluded.insert(region);
        } else {
            return Err(GrantError::invalid_contract(format!(
                "invalid line found: {}",
                line
            )));
        }
    }

    if contract.included.is_empty() {
        return Err(GrantError::invalid_contract("no included regions found in contract"));
    }

    Ok(contract)
}

fn parse_heading(heading: &str) -> GrantResult<Contract> {
    let chain = HEADING
        .captures(heading)
        .and_then(|c| c.name("chain"))
        .map(|m| strip_spaces(m.as_str()))
        .ok_or_else(|| {
            GrantError::invalid_contract("heading line must start with 'Permissions for '")
        })?;

    if chain.is_empty() {
        return Err(GrantError::invalid_contract(
            "distributor(s) not found in heading line after 'Permissions for'",
        ));
    }

    let names: Vec<&str> = chain.split('<').collect();
    let mut seen = HashSet::new();
    for name in &names {
        if name.is_empty() {
            return Err(GrantError::invalid_contract(format!(
                "empty distributor found in heading: {}",
                chain
            )));
        }
        if !seen.insert(*name) {
            return Err(GrantError::invalid_contract(format!(
                "duplicate distributor found in heading: {}",
                chain
            )));
        }
    }

    let mut contract = Contract::new(names[0]);
    if let Some(parent) = names.get(1) {
        contract = contract.with_parent(*parent);
    }
    Ok(contract)
}

fn strip_spaces(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::sample_catalog;

    fn parse(text: &str) -> GrantResult<Contract> {
        parse_contract(text, &sample_catalog())
    }

    fn key(s: &str) -> RegionKey {
        RegionKey::split_composite(s).unwrap()
    }

    #[test]
    fn test_parse_full_contract() {
        let contract = parse(
            "Permissions for DISTRIBUTOR2 < DISTRIBUTOR1\n\
             INCLUDE: IN\n\
             INCLUDE:  US\n\
             \n\
             EXCLUDE: KA-IN\n\
             EXCLUDE: CENAI - TN - IN\n",
        )
        .unwrap();

        assert_eq!(contract.recipient, "DISTRIBUTOR2");
        assert_eq!(contract.parent.as_deref(), Some("DISTRIBUTOR1"));
        assert!(contract.included.contains(&key("IN")));
        assert!(contract.included.contains(&key("US")));
        assert!(contract.excluded.contains(&key("KA-IN")));
        assert!(contract.excluded.contains(&key("CENAI-TN-IN")));
    }

    #[test]
    fn test_parse_without_parent() {
        let contract = parse("Permissions for DISTRIBUTOR1\r\nINCLUDE: YADGR-KA-IN").unwrap();
        assert_eq!(contract.recipient, "DISTRIBUTOR1");
        assert!(contract.parent.is_none());
    }

    #[test]
    fn test_parse_longer_chain() {
        let contract = parse("Permissions for D1 < D2 < D3\nINCLUDE: IN").unwrap();
        assert_eq!(contract.parent.as_deref(), Some("D2"));
    }

    #[test]
    fn test_rejects_bad_headings() {
        for text in [
            "Permissions for \nINCLUDE: PT",
            "Permissifsfdsfdsf D2 < D1\nINCLUDE: PT",
            "Permissions for D1 < D1\nINCLUDE: IN",
            "Permissions for D1 < \nINCLUDE: IN",
            "",
        ] {
            assert!(
                matches!(parse(text), Err(GrantError::InvalidContract(_))),
                "accepted: {:?}",
                text
            );
        }
    }

    #[test]
    fn test_rejects_bad_lines() {
        let err = parse("Permissions for D1\nINCLUDE: PT\nBLA BLA").unwrap_err();
        assert!(matches!(err, GrantError::InvalidContract(ref r) if r.contains("BLA BLA")));

        let err = parse("Permissions for D4\nEXCLUDE: KA-IN\nEXCLUDE: CENAI-TN-IN").unwrap_err();
        assert!(matches!(err, GrantError::InvalidContract(_)));
    }

    #[test]
    fn test_unknown_regions() {
        let err = parse("Permissions for D1\nINCLUDE: IN\nEXCLUDE: KAA-IN").unwrap_err();
        assert!(matches!(err, GrantError::RegionNotFound(_)));

        let err = parse("Permissions for D1\nINCLUDE: IN\nEXCLUDE: XX").unwrap_err();
        assert!(matches!(err, GrantError::RegionNotFound(_)));
    }

    #[test]
    fn test_rejects_country_exclusion() {
        let err = parse("Permissions for D1\nINCLUDE: US\nEXCLUDE: IN").unwrap_err();
        assert!(matches!(err, GrantError::InvalidContract(ref r) if r.contains("meaningless")));
    }
}
