//! Decoding of the `docProps/core.xml` and `docProps/custom.xml` streams.

use std::collections::BTreeMap;
use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use time::macros::format_description;
use time::Date;

use crate::error::{Error, Result};
use crate::package::{CORE_PROPERTIES, CUSTOM_PROPERTIES};

/// The fixed-schema part of the package metadata. `None` means the element
/// was absent; an element present without text is `Some("")`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoreProperties {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub keywords: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub content_status: Option<String>,
}

impl CoreProperties {
    fn slot(&mut self, local_name: &[u8]) -> Option<&mut Option<String>> {
        match local_name {
            b"title" => Some(&mut self.title),
            b"subject" => Some(&mut self.subject),
            b"creator" => Some(&mut self.creator),
            b"keywords" => Some(&mut self.keywords),
            b"description" => Some(&mut self.description),
            b"category" => Some(&mut self.category),
            b"contentStatus" => Some(&mut self.content_status),
            _ => None,
        }
    }

    /// Keywords separated by comma or semicolon, trimmed, empties dropped.
    pub fn keyword_list(&self) -> Vec<String> {
        split_list(self.keywords.as_deref().unwrap_or(""))
    }

    /// One comment per non-blank line of the description.
    pub fn comment_list(&self) -> Vec<String> {
        self.description
            .as_deref()
            .unwrap_or("")
            .lines()
            .map(str::trim_end)
            .filter(|l| !l.trim().is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Free-form name/value pairs from the custom properties stream.
pub type CustomProperties = BTreeMap<String, String>;

fn xml_reader<R: BufRead>(input: R) -> Reader<R> {
    let mut reader = Reader::from_reader(input);
    // Mismatched end tags are tolerated; the surrounding values stay as decoded.
    reader.check_end_names(false);
    reader
}

fn xml_error(entry: &str) -> impl Fn(quick_xml::Error) -> Error + '_ {
    move |source| Error::Xml { entry: entry.to_string(), source }
}

pub fn parse_core_properties<R: BufRead>(input: R) -> Result<CoreProperties> {
    let mut reader = xml_reader(input);
    let to_err = xml_error(CORE_PROPERTIES);
    let mut props = CoreProperties::default();
    let mut buf = Vec::new();
    let mut depth = 0usize;
    // (element local name, accumulated text) of the property being read
    let mut current: Option<(Vec<u8>, String)> = None;

    loop {
        match reader.read_event_into(&mut buf).map_err(&to_err)? {
            Event::Start(e) => {
                depth += 1;
                if depth == 2 {
                    let name = e.local_name().as_ref().to_vec();
                    if props.slot(&name).is_some() {
                        current = Some((name, String::new()));
                    }
                }
            }
            Event::Empty(e) => {
                if depth == 1 {
                    if let Some(slot) = props.slot(e.local_name().as_ref()) {
                        *slot = Some(String::new());
                    }
                }
            }
            Event::Text(t) => {
                if let Some((_, text)) = current.as_mut() {
                    text.push_str(&t.unescape().map_err(&to_err)?);
                }
            }
            Event::CData(c) => {
                if let Some((_, text)) = current.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Event::End(_) => {
                if depth == 2 {
                    if let Some((name, text)) = current.take() {
                        if let Some(slot) = props.slot(&name) {
                            *slot = Some(text);
                        }
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(props)
}

fn attribute(e: &BytesStart<'_>, local: &[u8]) -> Result<Option<String>, quick_xml::Error> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == local {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Reads `<property name="..."><vt:*>value</vt:*></property>` pairs. A
/// property without a typed value child maps to the empty string.
pub fn parse_custom_properties<R: BufRead>(input: R) -> Result<CustomProperties> {
    let mut reader = xml_reader(input);
    let to_err = xml_error(CUSTOM_PROPERTIES);
    let mut props = CustomProperties::new();
    let mut buf = Vec::new();
    let mut name: Option<String> = None;
    let mut value = String::new();
    let mut in_value = false;

    loop {
        match reader.read_event_into(&mut buf).map_err(&to_err)? {
            Event::Start(e) if e.local_name().as_ref() == b"property" => {
                name = attribute(&e, b"name").map_err(&to_err)?;
                value.clear();
            }
            Event::Empty(e) if e.local_name().as_ref() == b"property" => {
                if let Some(n) = attribute(&e, b"name").map_err(&to_err)? {
                    props.insert(n, String::new());
                }
            }
            Event::Start(_) if name.is_some() => in_value = true,
            Event::Text(t) if in_value => value.push_str(&t.unescape().map_err(&to_err)?),
            Event::CData(c) if in_value => value.push_str(&String::from_utf8_lossy(&c.into_inner())),
            Event::End(e) if e.local_name().as_ref() == b"property" => {
                if let Some(n) = name.take() {
                    props.insert(n, std::mem::take(&mut value));
                }
                in_value = false;
            }
            Event::End(_) => in_value = false,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(props)
}

/// Parses a `DD.MM.YYYY` date.
pub fn parse_date(field: &str, value: &str) -> Result<Date> {
    let format = format_description!("[day].[month].[year]");
    Date::parse(value.trim(), &format)
        .map_err(|_| Error::DateParse { field: field.to_string(), value: value.to_string() })
}

/// Splits on comma or semicolon, trims each part and drops empty parts.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split([',', ';'])
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}
