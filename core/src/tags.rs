//! Facet tags and their derivation from document metadata.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::metadata::split_list;

pub const REFERENCE: &str = "Aktenzeichen";
pub const DOCUMENT_TYPE: &str = "Entscheidungsform";
pub const DECISION: &str = "Entscheidung";
pub const KEYWORD: &str = "Schlagwort";
pub const AREA: &str = "Sachgebiet";

/// Joins the levels of a hierarchical area (U+25B8, black right-pointing
/// small triangle, padded with spaces).
pub const AREA_SEPARATOR: &str = " \u{25B8} ";

/// One facet value. Equality and hashing are by `(key, value)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Levels of a raw area string: split on comma or semicolon, trimmed,
/// empty parts dropped.
pub fn area_parts(raw: &str) -> Vec<String> {
    split_list(raw)
}

/// One area value per prefix of the hierarchy: `[A, B, C]` gives
/// `A`, `A ▸ B` and `A ▸ B ▸ C`.
pub fn area_prefixes(parts: &[String]) -> Vec<String> {
    (1..=parts.len()).map(|n| parts[..n].join(AREA_SEPARATOR)).collect()
}

/// Every tag of a document, deduplicated. Each rule applies only when its
/// source field is present.
pub fn derive_tags(doc: &Document) -> BTreeSet<Tag> {
    let mut tags = BTreeSet::new();

    if let Some(reference) = &doc.reference {
        tags.insert(Tag::new(REFERENCE, reference));
    }
    if let Some(document_type) = &doc.document_type {
        tags.insert(Tag::new(DOCUMENT_TYPE, document_type));
    }
    if let Some(decision) = &doc.decision {
        tags.insert(Tag::new(DECISION, decision));
    }
    // the author type names the facet, e.g. "Kammer" -> author
    if let (Some(author_type), Some(author)) = (&doc.author_type, &doc.author) {
        tags.insert(Tag::new(author_type, author));
    }
    for keyword in &doc.keywords {
        tags.insert(Tag::new(KEYWORD, keyword));
    }
    if let Some(area) = &doc.area {
        for prefix in area_prefixes(&area_parts(area)) {
            tags.insert(Tag::new(AREA, prefix));
        }
    }

    tags
}
