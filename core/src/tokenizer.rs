use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)[\p{L}\p{N}][\p{L}\p{N}_]*").expect("valid regex");
}

/// A normalised term and the byte span it came from in the original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub term: String,
    pub start: usize,
    pub end: usize,
}

fn normalize(word: &str) -> String {
    word.nfkc().collect::<String>().to_lowercase()
}

/// Tokenize text into words using NFKC normalization and lowercase. No
/// stemming: prefix queries must see the surface forms.
pub fn tokenize(text: &str) -> Vec<Token> {
    RE.find_iter(text)
        .map(|m| Token { term: normalize(m.as_str()), start: m.start(), end: m.end() })
        .collect()
}

/// Query terms: whitespace separated, normalised like indexed terms.
pub fn query_terms(query: &str) -> Vec<String> {
    query.split_whitespace().map(normalize).collect()
}
