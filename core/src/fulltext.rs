//! Full-text engine contract and the in-memory engine behind it.
//!
//! The index talks to the engine through two traits: [`TextIndexer`] while
//! documents are being added and [`TextSearch`] once the engine is finished.
//! [`MemoryEngine`] is a TF-IDF inverted index with a sorted term dictionary,
//! so a prefix query is a range scan.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::error::Result;
use crate::tokenizer::tokenize;
use crate::DocId;

pub type TermId = u32;

/// The text-bearing fields of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Content,
    Subject,
    Comment,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Content, Field::Subject, Field::Comment];
}

/// Where a query term matched. `value` is the position of the text among the
/// values inserted for that field (comments are inserted one by one); `start`
/// and `end` are byte offsets into that text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub field: Field,
    pub value: usize,
    pub term: String,
    pub start: usize,
    pub end: usize,
}

/// Disjunction of prefix matches: any term against any of the fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixQuery {
    pub terms: Vec<String>,
    pub fields: Vec<Field>,
}

impl PrefixQuery {
    pub fn all_fields(terms: Vec<String>) -> Self {
        Self { terms, fields: Field::ALL.to_vec() }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextMatch {
    pub doc: DocId,
    pub score: f32,
    pub locations: Vec<Location>,
}

pub trait TextIndexer {
    type Engine: TextSearch;

    fn insert(&mut self, doc: DocId, field: Field, text: &str);

    fn finish(self) -> Self::Engine;
}

/// Read side of a finished engine. Shared by concurrent queries.
pub trait TextSearch: Send + Sync {
    /// Matches sorted by document id, each with its locations in
    /// `(field, value, start)` order.
    fn search(&self, query: &PrefixQuery) -> Result<Vec<TextMatch>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    value: usize,
    start: usize,
    end: usize,
}

#[derive(Debug, Clone)]
struct Posting {
    doc_id: DocId,
    field: Field,
    weight: f32, // log-tf * idf, normalized per (doc, field)
    spans: Vec<Span>,
}

#[derive(Default)]
struct FieldTerms {
    values: usize,
    terms: HashMap<TermId, Vec<Span>>,
}

/// Accumulates documents for a [`MemoryEngine`].
#[derive(Default)]
pub struct MemoryIndexer {
    dictionary: BTreeMap<String, TermId>,
    units: BTreeMap<(DocId, Field), FieldTerms>,
}

impl MemoryIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    fn term_id(&mut self, term: String) -> TermId {
        let next = self.dictionary.len() as TermId;
        *self.dictionary.entry(term).or_insert(next)
    }
}

impl TextIndexer for MemoryIndexer {
    type Engine = MemoryEngine;

    fn insert(&mut self, doc: DocId, field: Field, text: &str) {
        let tokens = tokenize(text);
        let mut spans: Vec<(TermId, Span)> = Vec::with_capacity(tokens.len());
        let value = self.units.get(&(doc, field)).map_or(0, |u| u.values);
        for token in tokens {
            let tid = self.term_id(token.term);
            spans.push((tid, Span { value, start: token.start, end: token.end }));
        }
        let unit = self.units.entry((doc, field)).or_default();
        unit.values += 1;
        for (tid, span) in spans {
            unit.terms.entry(tid).or_default().push(span);
        }
    }

    fn finish(self) -> MemoryEngine {
        let num_docs = {
            let mut ids: Vec<DocId> = self.units.keys().map(|(d, _)| *d).collect();
            ids.dedup();
            ids.len()
        };
        let mut df: Vec<u32> = vec![0; self.dictionary.len()];
        for unit in self.units.values() {
            for tid in unit.terms.keys() {
                df[*tid as usize] += 1;
            }
        }

        let n = num_docs.max(1) as f32;
        let mut postings: Vec<Vec<Posting>> = vec![Vec::new(); self.dictionary.len()];
        for ((doc_id, field), unit) in self.units {
            let mut weighted: Vec<(TermId, f32, Vec<Span>)> = unit
                .terms
                .into_iter()
                .map(|(tid, spans)| {
                    let tf = 1.0 + (spans.len() as f32).ln();
                    let idf = (1.0 + n / df[tid as usize].max(1) as f32).ln();
                    (tid, tf * idf, spans)
                })
                .collect();
            let mut norm = weighted.iter().map(|(_, w, _)| w * w).sum::<f32>().sqrt();
            if norm == 0.0 {
                norm = 1.0;
            }
            for (tid, w, spans) in weighted.drain(..) {
                postings[tid as usize].push(Posting { doc_id, field, weight: w / norm, spans });
            }
        }
        // units are visited in (doc, field) order, so every list is already sorted

        tracing::debug!(num_docs, num_terms = self.dictionary.len(), "full-text engine ready");
        MemoryEngine { dictionary: self.dictionary, postings, num_docs }
    }
}

/// Immutable in-memory inverted index.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    dictionary: BTreeMap<String, TermId>,
    postings: Vec<Vec<Posting>>,
    num_docs: usize,
}

impl MemoryEngine {
    pub fn num_docs(&self) -> usize {
        self.num_docs
    }

    fn expand<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a String, TermId)> + 'a {
        self.dictionary
            .range::<str, _>((std::ops::Bound::Included(prefix), std::ops::Bound::Unbounded))
            .take_while(move |(term, _)| term.starts_with(prefix))
            .map(|(term, tid)| (term, *tid))
    }
}

impl TextSearch for MemoryEngine {
    fn search(&self, query: &PrefixQuery) -> Result<Vec<TextMatch>> {
        // overlapping prefixes ("kla", "klage") expand to the same terms; each counts once
        let mut expanded: BTreeMap<TermId, &String> = BTreeMap::new();
        for prefix in query.terms.iter().filter(|t| !t.is_empty()) {
            expanded.extend(self.expand(prefix).map(|(term, tid)| (tid, term)));
        }

        let mut matches: BTreeMap<DocId, TextMatch> = BTreeMap::new();
        for (tid, term) in expanded {
            for posting in &self.postings[tid as usize] {
                if !query.fields.contains(&posting.field) {
                    continue;
                }
                let m = matches.entry(posting.doc_id).or_insert_with(|| TextMatch {
                    doc: posting.doc_id,
                    score: 0.0,
                    locations: Vec::new(),
                });
                m.score += posting.weight;
                m.locations.extend(posting.spans.iter().map(|s| Location {
                    field: posting.field,
                    value: s.value,
                    term: term.clone(),
                    start: s.start,
                    end: s.end,
                }));
            }
        }

        let mut matches: Vec<TextMatch> = matches.into_values().collect();
        for m in &mut matches {
            m.locations.sort_by_key(|l| (l.field, l.value, l.start, l.end));
        }
        Ok(matches)
    }
}
