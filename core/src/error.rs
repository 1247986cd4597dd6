use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot open package {path}: {source}")]
    PackageOpen {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("package entry {entry} not found")]
    EntryNotFound { entry: String },

    #[error("cannot read package entry {entry}: {source}")]
    EntryRead {
        entry: String,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("xml decode error in {entry}: {source}")]
    Xml {
        entry: String,
        #[source]
        source: quick_xml::Error,
    },

    #[error("malformed document: {0}")]
    MalformedDocument(String),

    #[error("field {field}: {value:?} is not a DD.MM.YYYY date")]
    DateParse { field: String, value: String },

    #[error("cannot walk corpus directory: {0}")]
    DirectoryWalk(#[from] walkdir::Error),

    #[error("full-text search failed: {0}")]
    Search(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Every error that made one source file unusable. Never empty.
#[derive(Debug)]
pub struct Diagnostics(Vec<Error>);

impl Diagnostics {
    pub fn new(first: Error) -> Self {
        Self(vec![first])
    }

    /// Returns `None` when nothing was collected.
    pub fn from_errors(errors: Vec<Error>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self(errors))
        }
    }

    pub fn errors(&self) -> &[Error] {
        &self.0
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostics {}
