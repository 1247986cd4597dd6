use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::body::extract_text;
use crate::error::{Diagnostics, Error};
use crate::metadata::{parse_core_properties, parse_custom_properties, parse_date, CustomProperties};
use crate::package::{Package, CORE_PROPERTIES, CUSTOM_PROPERTIES, MAIN_DOCUMENT};
use crate::tags::{area_parts, AREA_SEPARATOR};
use crate::DocId;

pub const REFERENCE_PROPERTY: &str = "Aktenzeichen";
pub const DOCUMENT_TYPE_PROPERTY: &str = "DokumententypVisJustiz";
pub const DATE_PROPERTY: &str = "Datum";

/// One indexed source file. Built once by the index and never modified.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: DocId,
    pub reference: Option<String>,
    pub document_type: Option<String>,
    pub date: Option<String>,
    pub decision: Option<String>,
    pub author_type: Option<String>,
    pub author: Option<String>,
    pub area: Option<String>,
    pub subject: Option<String>,
    pub keywords: Vec<String>,
    pub comments: Vec<String>,
    #[serde(skip)]
    pub content: String,
    #[serde(skip)]
    pub path: PathBuf,
}

impl Document {
    /// Area levels joined with the hierarchy separator, or the file stem
    /// when the document has no usable area. For display only.
    pub fn area_label(&self) -> String {
        let parts = self.area.as_deref().map(area_parts).unwrap_or_default();
        if parts.is_empty() {
            self.path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default()
        } else {
            parts.join(AREA_SEPARATOR)
        }
    }

    pub fn file_name(&self) -> String {
        self.path.file_name().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default()
    }
}

/// A document that has been read but not yet given an id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedDocument {
    pub reference: Option<String>,
    pub document_type: Option<String>,
    pub date: Option<String>,
    pub decision: Option<String>,
    pub author_type: Option<String>,
    pub author: Option<String>,
    pub area: Option<String>,
    pub subject: Option<String>,
    pub keywords: Vec<String>,
    pub comments: Vec<String>,
    pub content: String,
    pub path: PathBuf,
}

impl ParsedDocument {
    pub fn with_id(self, id: DocId) -> Document {
        Document {
            id,
            reference: self.reference,
            document_type: self.document_type,
            date: self.date,
            decision: self.decision,
            author_type: self.author_type,
            author: self.author,
            area: self.area,
            subject: self.subject,
            keywords: self.keywords,
            comments: self.comments,
            content: self.content,
            path: self.path,
        }
    }
}

/// A usable document plus the problems that only degraded it.
#[derive(Debug)]
pub struct Assembled {
    pub document: ParsedDocument,
    pub warnings: Vec<Error>,
}

/// Reads one package file into a document. Every stage runs even after an
/// earlier one failed so that all problems of a file are reported together.
pub fn assemble<P: AsRef<Path>>(path: P) -> Result<Assembled, Diagnostics> {
    let mut package = Package::open(path).map_err(Diagnostics::new)?;
    assemble_package(&mut package)
}

pub fn assemble_package<R: Read + Seek>(package: &mut Package<R>) -> Result<Assembled, Diagnostics> {
    tracing::debug!(path = %package.path().display(), "parsing package");
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let core = match package.entry(CORE_PROPERTIES).and_then(parse_core_properties) {
        Ok(core) => Some(core),
        Err(err) => {
            errors.push(err);
            None
        }
    };

    let custom = match package.entry(CUSTOM_PROPERTIES).and_then(parse_custom_properties) {
        Ok(custom) => custom,
        Err(err) => {
            warnings.push(err);
            CustomProperties::new()
        }
    };

    let content = match package.entry(MAIN_DOCUMENT).and_then(extract_text) {
        Ok(content) => Some(content),
        Err(err) => {
            errors.push(err);
            None
        }
    };

    let (Some(core), Some(content)) = (core, content) else {
        errors.append(&mut warnings);
        return Err(Diagnostics::from_errors(errors)
            .unwrap_or_else(|| Diagnostics::new(Error::MalformedDocument("incomplete package".into()))));
    };

    let date = match custom.get(DATE_PROPERTY) {
        Some(raw) => match parse_date(DATE_PROPERTY, raw) {
            Ok(_) => Some(raw.clone()),
            Err(err) => {
                warnings.push(err);
                None
            }
        },
        None => None,
    };

    let document = ParsedDocument {
        reference: custom.get(REFERENCE_PROPERTY).cloned(),
        document_type: custom.get(DOCUMENT_TYPE_PROPERTY).cloned(),
        date,
        keywords: core.keyword_list(),
        comments: core.comment_list(),
        decision: core.content_status,
        author_type: core.category,
        author: core.creator,
        area: core.subject,
        subject: core.title,
        content,
        path: package.path().to_path_buf(),
    };
    Ok(Assembled { document, warnings })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::PackageFixture;
    use std::io::Cursor;

    fn assemble_bytes(bytes: Vec<u8>) -> Result<Assembled, Diagnostics> {
        let mut pkg = Package::from_reader("Beschluss 12.docx".into(), Cursor::new(bytes)).unwrap();
        assemble_package(&mut pkg)
    }

    #[test]
    fn maps_properties_to_fields() {
        let bytes = PackageFixture::new()
            .title("Gegenstand")
            .subject("Steuer; Berufung")
            .creator("Müller")
            .category("Kammer")
            .content_status("abgewiesen")
            .keywords("Frist; Kosten")
            .description("Kommentar eins\nKommentar zwei")
            .custom("Aktenzeichen", "1 K 23/19")
            .custom("DokumententypVisJustiz", "Urteil")
            .custom("Datum", "03.04.2019")
            .paragraph("Der Kläger")
            .paragraph("trägt die Kosten.")
            .to_bytes();
        let Assembled { document: doc, warnings } = assemble_bytes(bytes).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(doc.reference.as_deref(), Some("1 K 23/19"));
        assert_eq!(doc.document_type.as_deref(), Some("Urteil"));
        assert_eq!(doc.date.as_deref(), Some("03.04.2019"));
        assert_eq!(doc.decision.as_deref(), Some("abgewiesen"));
        assert_eq!(doc.author_type.as_deref(), Some("Kammer"));
        assert_eq!(doc.author.as_deref(), Some("Müller"));
        assert_eq!(doc.area.as_deref(), Some("Steuer; Berufung"));
        assert_eq!(doc.subject.as_deref(), Some("Gegenstand"));
        assert_eq!(doc.keywords, vec!["Frist", "Kosten"]);
        assert_eq!(doc.comments, vec!["Kommentar eins", "Kommentar zwei"]);
        assert_eq!(doc.content, "Der Kläger trägt die Kosten. ");
    }

    #[test]
    fn missing_custom_properties_degrade() {
        let bytes = PackageFixture::new().title("T").without_custom().paragraph("x").to_bytes();
        let assembled = assemble_bytes(bytes).unwrap();
        assert_eq!(assembled.document.reference, None);
        assert_eq!(assembled.warnings.len(), 1);
        assert!(matches!(assembled.warnings[0], Error::EntryNotFound { .. }));
    }

    #[test]
    fn bad_date_degrades_field_only() {
        let bytes = PackageFixture::new().custom("Datum", "2019-04-03").paragraph("x").to_bytes();
        let assembled = assemble_bytes(bytes).unwrap();
        assert_eq!(assembled.document.date, None);
        assert!(matches!(assembled.warnings[..], [Error::DateParse { .. }]));
    }

    #[test]
    fn missing_body_is_fatal() {
        let bytes = PackageFixture::new().title("T").without_body().to_bytes();
        let diagnostics = assemble_bytes(bytes).unwrap_err();
        assert!(diagnostics
            .errors()
            .iter()
            .any(|e| matches!(e, Error::EntryNotFound { entry } if entry == MAIN_DOCUMENT)));
    }

    #[test]
    fn collects_every_fatal_error() {
        let bytes = PackageFixture::new().without_core().raw_body("<w:document><w:t><w:r/></w:document>").to_bytes();
        let diagnostics = assemble_bytes(bytes).unwrap_err();
        assert_eq!(diagnostics.errors().len(), 2);
        assert!(matches!(diagnostics.errors()[0], Error::EntryNotFound { .. }));
        assert!(matches!(diagnostics.errors()[1], Error::MalformedDocument(_)));
    }

    #[test]
    fn area_label_falls_back_to_file_stem() {
        let doc = ParsedDocument { path: "corpus/Beschluss 12.docx".into(), ..Default::default() }.with_id(3);
        assert_eq!(doc.area_label(), "Beschluss 12");
        assert_eq!(doc.file_name(), "Beschluss 12.docx");
        let doc = ParsedDocument { area: Some("A;B".into()), ..Default::default() }.with_id(3);
        assert_eq!(doc.area_label(), "A \u{25B8} B");
    }
}
