//! Remote attribute queries: size, checksum, and unique id of a stored file.
//!
//! dCache answers these through pseudo-files in the file's directory
//! ([`PnfsAttributeStore`]). Tests swap in [`MemoryAttributeStore`].

mod memory;
mod pnfs;

pub use memory::MemoryAttributeStore;
pub use pnfs::{checksum_sidecar, id_sidecar, parse_checksum, PnfsAttributeStore, CHECKSUM_PREFIX};

use std::io;
use std::path::Path;

/// Capability to query attributes the storage system computed for a file.
pub trait AttributeStore {
    /// Current size of `path` as the store reports it.
    fn size(&self, path: &Path) -> io::Result<u64> {
        Ok(std::fs::metadata(path)?.len())
    }

    /// Adler-32 the store computed for `path`. `Ok(None)` means the store
    /// answered but reported no Adler-32 value.
    fn checksum(&self, path: &Path) -> io::Result<Option<String>>;

    /// Store-unique identifier of `path` (the pnfs id).
    fn identifier(&self, path: &Path) -> io::Result<String>;
}
