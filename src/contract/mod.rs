//! Delegation contracts
//!
//! A contract grants regions to a recipient distributor, optionally bounded
//! by a parent distributor's current grant:
//!
//! 1. `parse_contract` turns contract text into a `Contract`
//! 2. `validate_contract` checks its structure
//! 3. `filter_against_parent` narrows it to what the parent holds
//! 4. `apply_contract_on_distributor` merges it into the recipient's set
//!
//! `apply_contract` runs steps 2 to 4 against a `PermissionStore`.

mod model;
mod parser;
mod processor;
mod validate;

pub use model::Contract;
pub use parser::parse_contract;
pub use processor::{apply_contract, apply_contract_on_distributor, filter_against_parent};
pub use validate::validate_contract;
