//! Paragraph text extraction from `word/document.xml`.
//!
//! Every `<w:t>` run marker must be followed directly by its character data;
//! anything else is reported as [`Error::MalformedDocument`].

use std::io::BufRead;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{Error, Result};
use crate::package::MAIN_DOCUMENT;

const TEXT_MARKER: &[u8] = b"t";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitingMarker,
    AwaitingText,
}

/// Single forward pass over the token stream. Each text run is appended
/// followed by one space.
pub fn extract_text<R: BufRead>(input: R) -> Result<String> {
    let mut reader = Reader::from_reader(input);
    let mut buf = Vec::new();
    let mut text = String::new();
    let mut state = State::AwaitingMarker;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|source| Error::Xml { entry: MAIN_DOCUMENT.to_string(), source })?;
        state = match (state, event) {
            (State::AwaitingText, Event::Text(t)) => {
                let data = t
                    .unescape()
                    .map_err(|source| Error::Xml { entry: MAIN_DOCUMENT.to_string(), source })?;
                text.push_str(&data);
                text.push(' ');
                State::AwaitingMarker
            }
            (State::AwaitingText, Event::CData(c)) => {
                text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                text.push(' ');
                State::AwaitingMarker
            }
            (State::AwaitingText, other) => {
                return Err(Error::MalformedDocument(format!(
                    "text run at byte {} is not followed by character data (found {})",
                    reader.buffer_position(),
                    describe(&other)
                )));
            }
            (State::AwaitingMarker, Event::Start(e)) if e.local_name().as_ref() == TEXT_MARKER => {
                State::AwaitingText
            }
            (State::AwaitingMarker, Event::Eof) => break,
            (State::AwaitingMarker, _) => State::AwaitingMarker,
        };
        buf.clear();
    }
    Ok(text)
}

fn describe(event: &Event<'_>) -> &'static str {
    match event {
        Event::Start(_) => "start element",
        Event::End(_) => "end element",
        Event::Empty(_) => "empty element",
        Event::Comment(_) => "comment",
        Event::PI(_) => "processing instruction",
        Event::Decl(_) => "declaration",
        Event::DocType(_) => "doctype",
        Event::Eof => "end of stream",
        Event::Text(_) | Event::CData(_) => "character data",
    }
}
