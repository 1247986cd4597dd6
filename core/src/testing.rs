//! Builders for small OOXML packages used by tests.

use std::io::{Cursor, Write};
use std::path::Path;

use quick_xml::escape::escape;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::package::{CORE_PROPERTIES, CUSTOM_PROPERTIES, MAIN_DOCUMENT};

#[derive(Debug, Clone)]
pub struct PackageFixture {
    core: Vec<(&'static str, String)>,
    custom: Vec<(String, String)>,
    paragraphs: Vec<String>,
    raw_body: Option<String>,
    with_core: bool,
    with_custom: bool,
    with_body: bool,
}

impl Default for PackageFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageFixture {
    pub fn new() -> Self {
        Self {
            core: Vec::new(),
            custom: Vec::new(),
            paragraphs: Vec::new(),
            raw_body: None,
            with_core: true,
            with_custom: true,
            with_body: true,
        }
    }

    fn core_field(mut self, element: &'static str, value: &str) -> Self {
        self.core.push((element, value.to_string()));
        self
    }

    pub fn title(self, v: &str) -> Self {
        self.core_field("dc:title", v)
    }
    pub fn subject(self, v: &str) -> Self {
        self.core_field("dc:subject", v)
    }
    pub fn creator(self, v: &str) -> Self {
        self.core_field("dc:creator", v)
    }
    pub fn keywords(self, v: &str) -> Self {
        self.core_field("cp:keywords", v)
    }
    pub fn description(self, v: &str) -> Self {
        self.core_field("dc:description", v)
    }
    pub fn category(self, v: &str) -> Self {
        self.core_field("cp:category", v)
    }
    pub fn content_status(self, v: &str) -> Self {
        self.core_field("cp:contentStatus", v)
    }

    pub fn custom(mut self, name: &str, value: &str) -> Self {
        self.custom.push((name.to_string(), value.to_string()));
        self
    }

    pub fn paragraph(mut self, text: &str) -> Self {
        self.paragraphs.push(text.to_string());
        self
    }

    /// Replaces the generated `word/document.xml` verbatim.
    pub fn raw_body(mut self, xml: &str) -> Self {
        self.raw_body = Some(xml.to_string());
        self
    }

    pub fn without_core(mut self) -> Self {
        self.with_core = false;
        self
    }

    pub fn without_custom(mut self) -> Self {
        self.with_custom = false;
        self
    }

    pub fn without_body(mut self) -> Self {
        self.with_body = false;
        self
    }

    fn core_xml(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/">"#,
        );
        for (element, value) in &self.core {
            xml.push_str(&format!("<{element}>{}</{element}>", escape(value)));
        }
        xml.push_str("</cp:coreProperties>");
        xml
    }

    fn custom_xml(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/custom-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#,
        );
        for (pid, (name, value)) in self.custom.iter().enumerate() {
            xml.push_str(&format!(
                r#"<property fmtid="{{D5CDD505-2E9C-101B-9397-08002B2CF9AE}}" pid="{}" name="{}"><vt:lpwstr>{}</vt:lpwstr></property>"#,
                pid + 2,
                escape(name),
                escape(value)
            ));
        }
        xml.push_str("</Properties>");
        xml
    }

    fn body_xml(&self) -> String {
        if let Some(raw) = &self.raw_body {
            return raw.clone();
        }
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#,
        );
        for p in &self.paragraphs {
            xml.push_str(&format!("<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>", escape(p)));
        }
        xml.push_str("</w:body></w:document>");
        xml
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        let mut entries = Vec::new();
        if self.with_core {
            entries.push((CORE_PROPERTIES, self.core_xml()));
        }
        if self.with_custom {
            entries.push((CUSTOM_PROPERTIES, self.custom_xml()));
        }
        if self.with_body {
            entries.push((MAIN_DOCUMENT, self.body_xml()));
        }
        for (name, xml) in entries {
            zip.start_file(name, options).expect("start zip entry");
            zip.write_all(xml.as_bytes()).expect("write zip entry");
        }
        zip.finish().expect("finish zip").into_inner()
    }

    pub fn write_to<P: AsRef<Path>>(&self, path: P) {
        std::fs::write(path, self.to_bytes()).expect("write fixture package");
    }
}
