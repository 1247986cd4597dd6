//! Read access to the zip container of an OOXML package.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::{Error, Result};

pub const CORE_PROPERTIES: &str = "docProps/core.xml";
pub const CUSTOM_PROPERTIES: &str = "docProps/custom.xml";
pub const MAIN_DOCUMENT: &str = "word/document.xml";

/// An open package. The archive (and the file behind it) is closed on drop.
pub struct Package<R = BufReader<File>> {
    path: PathBuf,
    archive: ZipArchive<R>,
}

impl Package {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| Error::PackageOpen {
            path: path.clone(),
            source: ZipError::Io(e),
        })?;
        Self::from_reader(path, BufReader::new(file))
    }
}

impl<R: Read + Seek> Package<R> {
    pub fn from_reader(path: PathBuf, reader: R) -> Result<Self> {
        match ZipArchive::new(reader) {
            Ok(archive) => Ok(Self { path, archive }),
            Err(source) => Err(Error::PackageOpen { path, source }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens one internal entry as a buffered stream. The stream borrows the
    /// package, so it is always released before the package itself.
    pub fn entry(&mut self, name: &str) -> Result<BufReader<impl Read + '_>> {
        match self.archive.by_name(name) {
            Ok(file) => Ok(BufReader::new(file)),
            Err(ZipError::FileNotFound) => Err(Error::EntryNotFound { entry: name.to_string() }),
            Err(source) => Err(Error::EntryRead { entry: name.to_string(), source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::PackageFixture;
    use std::io::Cursor;

    #[test]
    fn opens_entries_by_name() {
        let bytes = PackageFixture::new().title("Hello").to_bytes();
        let mut pkg = Package::from_reader("mem.docx".into(), Cursor::new(bytes)).unwrap();
        let mut core = String::new();
        pkg.entry(CORE_PROPERTIES).unwrap().read_to_string(&mut core).unwrap();
        assert!(core.contains("Hello"));
    }

    #[test]
    fn missing_entry_is_entry_not_found() {
        let bytes = PackageFixture::new().without_custom().to_bytes();
        let mut pkg = Package::from_reader("mem.docx".into(), Cursor::new(bytes)).unwrap();
        match pkg.entry(CUSTOM_PROPERTIES) {
            Err(Error::EntryNotFound { entry }) => assert_eq!(entry, CUSTOM_PROPERTIES),
            other => panic!("unexpected: {:?}", other.map(|_| ())),
        };
    }

    #[test]
    fn garbage_is_package_open_error() {
        let res = Package::from_reader("junk.docx".into(), Cursor::new(b"not a zip".to_vec()));
        assert!(matches!(res, Err(Error::PackageOpen { .. })));
    }
}
