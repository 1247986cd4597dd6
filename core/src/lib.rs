//! Faceted full-text search over a corpus of OOXML word-processing packages.
//!
//! Ingestion runs once: every `.docx` below a root directory is opened
//! ([`package`]), its property streams and body are decoded ([`metadata`],
//! [`body`]), and the result is assembled into a [`Document`] whose facets
//! are derived as [`Tag`]s. The [`Index`] holds the documents, one posting
//! list per tag and a full-text engine, and answers conjunctive queries.

pub mod body;
pub mod document;
pub mod error;
pub mod fulltext;
pub mod index;
pub mod metadata;
pub mod package;
pub mod query;
pub mod snippet;
pub mod tags;
pub mod tokenizer;

#[doc(hidden)]
pub mod testing;

pub use document::{Assembled, Document, ParsedDocument};
pub use error::{Diagnostics, Error, Result};
pub use fulltext::{Field, Location, MemoryEngine};
pub use index::{BuildOptions, BuildReport, Index, SkippedFile};
pub use query::{Hit, SearchRequest};
pub use tags::Tag;

pub type DocId = u32;
