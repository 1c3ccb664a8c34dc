//! Delegation of review work between admins
//!
//! Reassigns the reviewer responsible for a document. Delegation never
//! changes a document's status.

pub mod eligibility;
pub mod manager;

pub use eligibility::check_target;
pub use manager::DelegationManager;
