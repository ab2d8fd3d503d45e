//! ledgerlens-sync: duplicate gate, batched upload coordinator, stores and import pipelines

pub mod dedup;
pub mod error;
pub mod pipeline;
pub mod store;
pub mod upload;

pub use dedup::{DedupOutcome, dedupe};
pub use error::SyncError;
pub use pipeline::{JsonFileSource, MessageSource, import_messages, import_statement};
pub use store::{
    HttpStore, JsonFileStore, MemoryStore, NewTransaction, StoredTransaction, TransactionStore,
};
pub use upload::{DEFAULT_BATCH_SIZE, UploadCoordinator, UploadReport};
