//! Contract processing: validate, narrow against the parent, merge
//!
//! Contracts are applied in two phases. Validation, region checks and
//! parent narrowing read the store only through shared snapshots; the
//! recipient is mutated once, under a single exclusive acquisition, after
//! all of them succeed.

use super::model::Contract;
use super::validate::validate_contract;
use crate::core::{GrantError, GrantResult};
use crate::permissions::{PermissionSet, PermissionStore};

/// Narrow a contract to what `parent` currently holds
///
/// Any region the contract grants but the parent does not fully hold is
/// shrunk to exactly the parts the parent does hold, and the parent's own
/// exceptions become exceptions of the contract. Never fails; a contract
/// that asks for nothing the parent holds narrows to an empty grant.
pub fn filter_against_parent(contract: &Contract, parent: &PermissionSet) -> Contract {
    let requested = contract.grant();
    let narrowed = requested.intersect(parent);
    if narrowed != requested {
        tracing::debug!(
            "Narrowed contract for {} to the grant held by {:?}",
            contract.recipient,
            contract.parent
        );
    }
    contract.with_grant(&narrowed)
}

/// Merge a (possibly narrowed) contract into the recipient's set
///
/// Grants are unioned: nothing the recipient already holds is revoked by
/// omission. An exclusion on either side survives only while the other
/// side does not allow that region, so a fresh inclusion (directly or
/// through an ancestor) overrides a stale exclusion, and an exclusion the
/// new contract does not cover is kept.
///
/// Creates the recipient if absent. Returns whether it was created.
pub fn apply_contract_on_distributor(store: &PermissionStore, contract: &Contract) -> bool {
    let grant = contract.grant();
    let ((), created) = store.upsert_with(&contract.recipient, |set| {
        *set = set.union(&grant);
    });
    created
}

/// Validate, narrow and apply a contract
///
/// Nothing is mutated unless every check passes.
pub fn apply_contract(store: &PermissionStore, contract: &Contract) -> GrantResult<()> {
    if let Err(err) = validate_contract(contract) {
        tracing::warn!("Rejected contract for {}: {}", contract.recipient, err);
        return Err(err);
    }

    if let Some(region) = contract.regions().find(|r| !store.resolver().contains(r)) {
        return Err(GrantError::region_not_found(region.to_string()));
    }

    let contract = match &contract.parent {
        Some(parent) => {
            // own shared acquisition, released before the recipient is locked
            let snapshot = store.snapshot(parent).map_err(|err| match err {
                GrantError::DistributorNotFound(name) => {
                    GrantError::ParentDistributorNotFound(name)
                }
                other => other,
            })?;
            filter_against_parent(contract, &snapshot)
        }
        None => contract.clone(),
    };

    let created = apply_contract_on_distributor(store, &contract);
    tracing::info!(
        "Applied contract for {} (parent: {:?}, created: {}, {} included, {} excluded)",
        contract.recipient,
        contract.parent,
        created,
        contract.included.len(),
        contract.excluded.len()
    );
    Ok(())
}
