//! dCache/pnfs "dot-command" pseudo-files.
//!
//! For a file `B` in directory `D`, reading `D/.(get)(B)(checksum)` returns
//! the checksums dCache holds for it, one per line (`ADLER32:<hex>`), and
//! reading `D/.(id)(B)` returns its pnfs id.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::AttributeStore;

/// Line prefix that marks the Adler-32 entry in the checksum pseudo-file.
pub const CHECKSUM_PREFIX: &str = "ADLER32:";

/// Reads attributes through the pnfs pseudo-file convention.
#[derive(Debug, Clone, Copy, Default)]
pub struct PnfsAttributeStore;

impl PnfsAttributeStore {
    pub fn new() -> Self {
        Self
    }
}

impl AttributeStore for PnfsAttributeStore {
    fn checksum(&self, path: &Path) -> io::Result<Option<String>> {
        let sidecar = checksum_sidecar(path)?;
        let contents = read_sidecar(&sidecar)?;
        let found = parse_checksum(&contents);
        tracing::debug!(
            sidecar = %sidecar.display(),
            found = found.is_some(),
            "read checksum pseudo-file"
        );
        Ok(found)
    }

    fn identifier(&self, path: &Path) -> io::Result<String> {
        let sidecar = id_sidecar(path)?;
        let contents = read_sidecar(&sidecar)?;
        Ok(contents.trim().to_string())
    }
}

/// `D/.(get)(B)(checksum)` for `D/B`.
pub fn checksum_sidecar(path: &Path) -> io::Result<PathBuf> {
    sidecar(path, ".(get)(", ")(checksum)")
}

/// `D/.(id)(B)` for `D/B`.
pub fn id_sidecar(path: &Path) -> io::Result<PathBuf> {
    sidecar(path, ".(id)(", ")")
}

fn sidecar(path: &Path, head: &str, tail: &str) -> io::Result<PathBuf> {
    let base = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("no file name in {}", path.display()),
        )
    })?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut name = OsString::from(head);
    name.push(base);
    name.push(tail);
    Ok(dir.join(name))
}

fn read_sidecar(sidecar: &Path) -> io::Result<String> {
    fs::read_to_string(sidecar)
        .map_err(|e| io::Error::new(e.kind(), format!("{}: {}", sidecar.display(), e)))
}

/// Value after the first `ADLER32:` found in `contents`, trimmed.
pub fn parse_checksum(contents: &str) -> Option<String> {
    contents.lines().find_map(|line| {
        line.find(CHECKSUM_PREFIX)
            .map(|i| line[i + CHECKSUM_PREFIX.len()..].trim().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sidecar_names() {
        let p = Path::new("/pnfs/example.org/data/run7/file.dat");
        assert_eq!(
            checksum_sidecar(p).unwrap(),
            PathBuf::from("/pnfs/example.org/data/run7/.(get)(file.dat)(checksum)")
        );
        assert_eq!(
            id_sidecar(p).unwrap(),
            PathBuf::from("/pnfs/example.org/data/run7/.(id)(file.dat)")
        );
    }

    #[test]
    fn bare_file_name_uses_current_dir() {
        assert_eq!(
            checksum_sidecar(Path::new("file.dat")).unwrap(),
            PathBuf::from("./.(get)(file.dat)(checksum)")
        );
    }

    #[test]
    fn path_without_file_name_is_rejected() {
        let err = id_sidecar(Path::new("/")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn parse_finds_adler_line() {
        let contents = "MD5_TYPE:0123456789abcdef\nADLER32:024d0127\n";
        assert_eq!(parse_checksum(contents).as_deref(), Some("024d0127"));
    }

    #[test]
    fn parse_trims_and_accepts_mid_line_prefix() {
        assert_eq!(
            parse_checksum("checksums: ADLER32:  0a1b2c3d \r\n").as_deref(),
            Some("0a1b2c3d")
        );
    }

    #[test]
    fn parse_without_adler_line_is_none() {
        assert_eq!(parse_checksum("MD5_TYPE:0123\n"), None);
        assert_eq!(parse_checksum(""), None);
    }

    #[test]
    fn reads_pseudo_files_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("f.bin");
        std::fs::write(checksum_sidecar(&target).unwrap(), "ADLER32:024d0127\n").unwrap();
        std::fs::write(id_sidecar(&target).unwrap(), "0000A1B2C3D4\n").unwrap();

        let store = PnfsAttributeStore::new();
        assert_eq!(store.checksum(&target).unwrap().as_deref(), Some("024d0127"));
        assert_eq!(store.identifier(&target).unwrap(), "0000A1B2C3D4");
    }

    #[test]
    fn missing_pseudo_file_is_io_error_naming_it() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("f.bin");
        let err = PnfsAttributeStore::new().checksum(&target).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(err.to_string().contains(".(get)(f.bin)(checksum)"));
    }

    #[test]
    fn size_reads_file_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("f.bin");
        std::fs::write(&target, b"12345").unwrap();
        assert_eq!(PnfsAttributeStore::new().size(&target).unwrap(), 5);
    }
}
