//! In-memory attribute store for tests and dry runs.

use std::collections::{HashMap, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use super::AttributeStore;

#[derive(Debug, Default)]
struct Entry {
    checksum: Option<String>,
    identifier: Option<String>,
    /// Scripted answers for `size`; the last one repeats.
    sizes: VecDeque<u64>,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<PathBuf, Entry>,
    size_queries: usize,
    metadata_queries: usize,
}

/// Attribute store backed by a map. Paths without scripted sizes fall back
/// to the real file size on disk.
#[derive(Debug, Default)]
pub struct MemoryAttributeStore {
    inner: Mutex<Inner>,
}

impl MemoryAttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<T>(&self, f: impl FnOnce(&mut Inner) -> T) -> T {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut inner)
    }

    /// Set what the store reports as the Adler-32 of `path`. `None` simulates a
    /// checksum pseudo-file without an `ADLER32:` line.
    pub fn set_checksum(&self, path: &Path, checksum: Option<&str>) {
        self.with(|i| {
            i.entries.entry(path.to_path_buf()).or_default().checksum =
                checksum.map(str::to_string);
        });
    }

    pub fn set_identifier(&self, path: &Path, id: &str) {
        self.with(|i| {
            i.entries.entry(path.to_path_buf()).or_default().identifier = Some(id.to_string());
        });
    }

    /// Answer successive `size` calls with `sizes` in order, repeating the last.
    pub fn script_sizes(&self, path: &Path, sizes: impl IntoIterator<Item = u64>) {
        self.with(|i| {
            i.entries.entry(path.to_path_buf()).or_default().sizes = sizes.into_iter().collect();
        });
    }

    /// Number of `size` calls served.
    pub fn size_queries(&self) -> usize {
        self.with(|i| i.size_queries)
    }

    /// Number of `checksum` and `identifier` calls served.
    pub fn metadata_queries(&self) -> usize {
        self.with(|i| i.metadata_queries)
    }
}

fn not_found(path: &Path, what: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("no {} recorded for {}", what, path.display()),
    )
}

impl AttributeStore for MemoryAttributeStore {
    fn size(&self, path: &Path) -> io::Result<u64> {
        let scripted = self.with(|i| -> Option<u64> {
            i.size_queries += 1;
            let entry = i.entries.get_mut(path)?;
            if entry.sizes.len() > 1 {
                entry.sizes.pop_front()
            } else {
                entry.sizes.front().copied()
            }
        });
        match scripted {
            Some(size) => Ok(size),
            None => Ok(std::fs::metadata(path)?.len()),
        }
    }

    fn checksum(&self, path: &Path) -> io::Result<Option<String>> {
        self.with(|i| {
            i.metadata_queries += 1;
            i.entries
                .get(path)
                .map(|e| e.checksum.clone())
                .ok_or_else(|| not_found(path, "checksum"))
        })
    }

    fn identifier(&self, path: &Path) -> io::Result<String> {
        self.with(|i| {
            i.metadata_queries += 1;
            i.entries
                .get(path)
                .and_then(|e| e.identifier.clone())
                .ok_or_else(|| not_found(path, "identifier"))
        })
    }
}
