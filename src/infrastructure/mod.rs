//! Adapters behind the domain ports.

pub mod credentials;
pub mod in_memory;
pub mod notifier;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;

use crate::domain::ports::Stores;
use crate::error::Result;
use std::path::Path;

pub const ROCKSDB_FALLBACK_WARNING: &str = "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage.";

/// Whether `open_stores` can honour a database path in this build.
pub const PERSISTENT_STORAGE: bool = cfg!(feature = "storage-rocksdb");

/// Opens RocksDB at `db_path` when given, else in-memory stores.
///
/// Without the `storage-rocksdb` feature the path is ignored; callers are
/// expected to warn about it using [`ROCKSDB_FALLBACK_WARNING`].
pub fn open_stores(db_path: Option<&Path>) -> Result<Stores> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => Ok(rocksdb::RocksDBStore::open(path)?.stores()),
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => Ok(Stores::in_memory()),
        None => Ok(Stores::in_memory()),
    }
}
