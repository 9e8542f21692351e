//! Resident directory and complaint ledger over a pluggable document store.
//!
//! Residents own an ordered list of complaint references and every complaint points back
//! at exactly one resident. The store does not enforce that link; the directory and ledger
//! keep both sides in step on every mutation.

pub mod directory;
pub mod domain;
pub mod error;
pub mod ledger;
pub mod memory;
pub mod mongo;
pub mod router;
pub mod store;
mod validation;

#[cfg(test)]
mod tests;

pub use directory::{FiledComplaint, ResidentDirectory};
pub use domain::{
    Complaint, ComplaintDraft, ComplaintId, ComplaintStatus, ComplaintType,
    ComplaintWithResident, Resident, ResidentId, ResidentWithComplaints,
};
pub use error::RegistryError;
pub use ledger::ComplaintLedger;
pub use memory::InMemoryStore;
pub use mongo::MongoStore;
pub use router::{registry_router, RegistryState};
pub use store::{ComplaintScope, RegistryStore, StoreError};
