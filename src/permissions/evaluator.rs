//! Permission evaluation

use serde::{Deserialize, Serialize};
use std::fmt;

use super::node::NodeState;
use super::set::PermissionSet;
use crate::core::{GrantError, GrantResult};
use crate::region::RegionKey;

/// Outcome of a permission check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// The region and everything in it is allowed
    FullyAllowed,
    /// Some, but not all, of the region is allowed
    PartiallyAllowed,
    /// Nothing in the region is allowed
    FullyDenied,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::FullyAllowed => "FULLY_ALLOWED",
            Verdict::PartiallyAllowed => "PARTIALLY_ALLOWED",
            Verdict::FullyDenied => "FULLY_DENIED",
        }
    }

    pub fn is_fully_allowed(&self) -> bool {
        matches!(self, Verdict::FullyAllowed)
    }
}

impl From<NodeState> for Verdict {
    fn from(state: NodeState) -> Self {
        match state {
            NodeState::Allow => Verdict::FullyAllowed,
            NodeState::Deny => Verdict::FullyDenied,
            NodeState::Custom => Verdict::PartiallyAllowed,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decide whether `region` is allowed under `set`
///
/// Resolution descends from the country node. A missing node at any level
/// means the region inherits its ancestor's default. Countries and provinces
/// with overrides beneath them are partially allowed; cities are always
/// fully allowed or fully denied.
///
/// Returns `InternalInconsistency` if the nodes on the path are not
/// normalized, since their summarised state would then be wrong.
pub fn evaluate(set: &PermissionSet, region: &RegionKey) -> GrantResult<Verdict> {
    let Some(country) = set.country(region.country_code()) else {
        return Ok(Verdict::FullyDenied);
    };
    if !country.is_normalized() {
        return Err(GrantError::InternalInconsistency(format!(
            "country node {} is not normalized",
            region.country_code()
        )));
    }

    let verdict = match region {
        RegionKey::Country { .. } => country.state().into(),
        RegionKey::Province { province, .. } => match country.province(province) {
            Some(node) => node.state().into(),
            None => NodeState::from(country.access()).into(),
        },
        RegionKey::City { province, city, .. } => {
            NodeState::from(country.city_access(province, city)).into()
        }
    };
    Ok(verdict)
}
