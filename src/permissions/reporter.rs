//! Flattening a permission set into region strings

use serde::{Deserialize, Serialize};

use super::node::Access;
use super::set::PermissionSet;
use crate::region::RegionKey;

/// One recorded grant or exception
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    pub access: Access,
    pub region: RegionKey,
}

/// Flatten `set` into its recorded entries, coarse to fine
///
/// Marking the entries in the returned order onto an empty set rebuilds an
/// equal set.
pub fn entries(set: &PermissionSet) -> Vec<ReportEntry> {
    let mut out = Vec::new();
    for (country, node) in set.countries() {
        if node.access().is_allowed() {
            out.push(ReportEntry {
                access: Access::Allow,
                region: RegionKey::country(country.clone()),
            });
        }
        for (province, pnode) in node.provinces() {
            if pnode.access() != node.access() {
                out.push(ReportEntry {
                    access: pnode.access(),
                    region: RegionKey::province(country.clone(), province.clone()),
                });
            }
            for (city, access) in pnode.cities() {
                out.push(ReportEntry {
                    access,
                    region: RegionKey::city(country.clone(), province.clone(), city.clone()),
                });
            }
        }
    }
    out.sort_by(|a, b| a.region.cmp(&b.region));
    out
}

/// Included and excluded regions of one distributor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionReport {
    pub distributor: String,
    pub included: Vec<String>,
    pub excluded: Vec<String>,
}

impl PermissionReport {
    /// Build a report from a single snapshot of a permission set
    pub fn from_set(distributor: impl Into<String>, set: &PermissionSet) -> Self {
        let mut report = PermissionReport {
            distributor: distributor.into(),
            ..Default::default()
        };
        for entry in entries(set) {
            match entry.access {
                Access::Allow => report.included.push(entry.region.to_string()),
                Access::Deny => report.excluded.push(entry.region.to_string()),
            }
        }
        report
    }

    /// Human-readable dump in the contract text format
    ///
    /// Lines are ordered coarse to fine with inclusions and exclusions
    /// interleaved, so replaying them top to bottom rebuilds the set.
    pub fn to_text(&self) -> String {
        let mut lines: Vec<(Option<RegionKey>, &str, &str)> = self
            .included
            .iter()
            .map(|r| (RegionKey::split_composite(r), "INCLUDE", r.as_str()))
            .chain(
                self.excluded
                    .iter()
                    .map(|r| (RegionKey::split_composite(r), "EXCLUDE", r.as_str())),
            )
            .collect();
        lines.sort_by(|a, b| a.0.cmp(&b.0));

        let mut text = format!("Permissions for {}", self.distributor);
        for (_, verb, region) in lines {
            text.push('\n');
            text.push_str(verb);
            text.push_str(": ");
            text.push_str(region);
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> RegionKey {
        RegionKey::split_composite(s).unwrap()
    }

    fn sample_set() -> PermissionSet {
        let mut set = PermissionSet::new();
        set.include(&key("IN"));
        set.exclude(&key("TN-IN"));
        set.include(&key("CENAI-TN-IN"));
        set.exclude(&key("BLR-KA-IN"));
        set.include(&key("CA-US"));
        set.exclude(&key("SF-CA-US"));
        set.include(&key("LIS-LI-PT"));
        set
    }

    #[test]
    fn test_report_lists() {
        let report = PermissionReport::from_set("DISTRIBUTOR1", &sample_set());
        assert_eq!(
            report.included,
            vec!["IN", "CA-US", "CENAI-TN-IN", "LIS-LI-PT"]
        );
        assert_eq!(report.excluded, vec!["TN-IN", "BLR-KA-IN", "SF-CA-US"]);
    }

    #[test]
    fn test_report_text() {
        let mut set = PermissionSet::new();
        set.include(&key("US"));
        set.exclude(&key("NY-US"));
        let text = PermissionReport::from_set("D1", &set).to_text();
        assert_eq!(text, "Permissions for D1\nINCLUDE: US\nEXCLUDE: NY-US");
    }

    #[test]
    fn test_report_text_interleaves_levels() {
        let mut set = PermissionSet::new();
        set.include(&key("IN"));
        set.exclude(&key("TN-IN"));
        set.include(&key("CENAI-TN-IN"));
        let text = PermissionReport::from_set("D1", &set).to_text();
        assert_eq!(
            text,
            "Permissions for D1\nINCLUDE: IN\nEXCLUDE: TN-IN\nINCLUDE: CENAI-TN-IN"
        );
    }

    #[test]
    fn test_replaying_text_rebuilds_set() {
        let original = sample_set();
        let text = PermissionReport::from_set("D1", &original).to_text();

        let mut rebuilt = PermissionSet::new();
        for line in text.lines().skip(1) {
            let (verb, region) = line.split_once(": ").unwrap();
            match verb {
                "INCLUDE" => rebuilt.include(&key(region)),
                "EXCLUDE" => rebuilt.exclude(&key(region)),
                other => panic!("unexpected line kind {}", other),
            }
        }
        assert_eq!(rebuilt, original);
    }

    #[test]
    fn test_replaying_entries_rebuilds_set() {
        let original = sample_set();
        let mut rebuilt = PermissionSet::new();
        for entry in entries(&original) {
            rebuilt.mark(&entry.region, entry.access);
        }
        assert_eq!(rebuilt, original);
    }

    #[test]
    fn test_empty_report() {
        let report = PermissionReport::from_set("D1", &PermissionSet::new());
        assert!(report.included.is_empty());
        assert!(report.excluded.is_empty());
        assert_eq!(report.to_text(), "Permissions for D1");
    }
}
