//! Highlighted excerpts of the body text around full-text matches.

use quick_xml::escape::escape;

use crate::fulltext::{Field, Location};

pub const MAX_FRAGMENTS: usize = 10;
const SEPARATOR: &str = " ... ";

fn is_boundary(c: char) -> bool {
    c == '.' || c == '\n'
}

/// Renders up to `max` content matches, each extended to the enclosing
/// sentence, with the matched word wrapped in `<b>`. `None` when no location
/// falls in the body text. Locations may come in any order.
pub fn render(content: &str, locations: &[Location], max: usize) -> Option<String> {
    let mut in_content: Vec<&Location> = locations.iter().filter(|l| l.field == Field::Content).collect();
    in_content.sort_by_key(|l| (l.start, l.end));

    let mut fragments = Vec::new();
    let mut last_end = 0;
    for loc in in_content {
        if fragments.len() == max {
            break;
        }
        if loc.end > content.len() || !content.is_char_boundary(loc.start) || !content.is_char_boundary(loc.end) {
            continue;
        }
        let start = content[..loc.start].rfind(is_boundary).map_or(0, |i| i + 1);
        let end = content[loc.end..].find(is_boundary).map_or(content.len(), |i| loc.end + i);
        // one fragment per sentence
        if start < last_end {
            continue;
        }
        last_end = end;
        fragments.push(format!(
            "{}<b>{}</b>{}",
            escape(content[start..loc.start].trim_start()),
            escape(&content[loc.start..loc.end]),
            escape(&content[loc.end..end])
        ));
    }
    if fragments.is_empty() {
        None
    } else {
        Some(fragments.join(SEPARATOR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(field: Field, start: usize, end: usize) -> Location {
        Location { field, value: 0, term: String::new(), start, end }
    }

    #[test]
    fn highlights_within_sentence() {
        let content = "Erster Satz. Die Klage wird abgewiesen. Letzter";
        let start = content.find("Klage").unwrap();
        let s = render(content, &[loc(Field::Content, start, start + 5)], MAX_FRAGMENTS).unwrap();
        assert_eq!(s, "Die <b>Klage</b> wird abgewiesen");
    }

    #[test]
    fn joins_fragments_and_escapes() {
        let content = "a <x> b. c & d";
        let s = render(content, &[loc(Field::Content, 0, 1), loc(Field::Content, 13, 14)], MAX_FRAGMENTS).unwrap();
        assert_eq!(s, "<b>a</b> &lt;x&gt; b ... c &amp; <b>d</b>");
    }

    #[test]
    fn unordered_locations_keep_every_sentence() {
        let content = "Die Klage ist zulässig. Die Berufung hat Erfolg.";
        let locs = [loc(Field::Content, 42, 48), loc(Field::Content, 4, 9)];
        assert_eq!(
            render(content, &locs, MAX_FRAGMENTS).unwrap(),
            "Die <b>Klage</b> ist zulässig ... Die Berufung hat <b>Erfolg</b>"
        );
    }

    #[test]
    fn ignores_other_fields_and_caps_count() {
        let content = "eins. zwei. drei.";
        assert_eq!(render(content, &[loc(Field::Subject, 0, 4)], MAX_FRAGMENTS), None);
        let locs = [loc(Field::Content, 0, 4), loc(Field::Content, 6, 10), loc(Field::Content, 12, 16)];
        assert_eq!(render(content, &locs, 2).unwrap(), "<b>eins</b> ... <b>zwei</b>");
    }
}
