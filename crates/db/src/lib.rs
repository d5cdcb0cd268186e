//! `coak-db`: store gateways, document models and repositories.

pub mod blob;
pub mod error;
pub mod gateway;
pub mod memory;
pub mod models;
pub mod repositories;

pub use blob::BlobStore;
pub use error::StoreError;
pub use gateway::{Cursor, Document, DocumentStore, Fields, Query};
pub use memory::{MemoryBlobStore, MemoryStore, Snapshot, StoreOp};
