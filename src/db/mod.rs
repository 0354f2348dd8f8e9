//! Persistence layer (local JSON document and proof files).

pub mod json_store;
pub mod proof_store;

pub use json_store::JsonStore;
pub use proof_store::{ProofFile, ProofStore, StoredProof};

/// Default file names inside the data directory.
pub mod paths {
    pub const DATA_FILE: &str = "fitness-data.json";
    pub const PROOFS_DIR: &str = "proofs";
}
