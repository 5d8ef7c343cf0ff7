use std::path::Path;
use std::sync::Arc;

use rm_core::{Error, LedgerStore, Result};

pub mod backends;
pub mod ledger;

pub use backends::{JsonlStore, MemoryStore};
pub use ledger::Ledger;

/// Build a ledger store by name. `jsonl` is the durable backend; `memory`
/// keeps everything in-process for tests and dry runs.
pub fn create_store(kind: &str, data_dir: &Path) -> Result<Arc<dyn LedgerStore>> {
    match kind {
        "memory" => Ok(Arc::new(MemoryStore::new())),
        "jsonl" => Ok(Arc::new(JsonlStore::new(data_dir)?)),
        other => Err(Error::Storage(format!("unknown storage backend: {other}"))),
    }
}

pub mod prelude {
    pub use super::{create_store, Ledger};
    pub use rm_core::{Article, LedgerStore, Result};
}
