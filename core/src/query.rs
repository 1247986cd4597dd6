//! Conjunctive queries: every tag filter and the free-text part must match.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::fulltext::{Location, PrefixQuery, TextMatch, TextSearch};
use crate::index::Index;
use crate::tags::Tag;
use crate::tokenizer::query_terms;
use crate::DocId;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Return match locations for highlighting.
    #[serde(default)]
    pub locations: bool,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, tags: Vec<Tag>) -> Self {
        Self { query: query.into(), tags, locations: false }
    }

    pub fn with_locations(mut self) -> Self {
        self.locations = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Hit<'a> {
    pub document: &'a Document,
    /// Full-text relevance; zero when the query had no free text.
    pub score: f32,
    pub locations: Vec<Location>,
}

impl<E: TextSearch> Index<E> {
    pub fn query(&self, text: &str, tags: &[Tag]) -> crate::Result<Vec<Hit<'_>>> {
        self.search(&SearchRequest::new(text, tags.to_vec()))
    }

    /// A document is returned iff it is in the posting list of every filter
    /// tag and, when the request has free text, in the full-text match set.
    /// Results are ordered by descending score, then ascending id.
    pub fn search(&self, request: &SearchRequest) -> crate::Result<Vec<Hit<'_>>> {
        let terms = query_terms(&request.query);
        let text_matches: Option<HashMap<DocId, TextMatch>> = if terms.is_empty() {
            None
        } else {
            let matches = self.engine().search(&PrefixQuery::all_fields(terms))?;
            Some(matches.into_iter().map(|m| (m.doc, m)).collect())
        };

        let required = request.tags.len() + usize::from(text_matches.is_some());
        let ids: Vec<DocId> = if required == 0 {
            (0..self.len() as DocId).collect()
        } else {
            let mut tally: HashMap<DocId, usize> = HashMap::new();
            for tag in &request.tags {
                for id in self.postings(tag) {
                    *tally.entry(*id).or_insert(0) += 1;
                }
            }
            if let Some(matches) = &text_matches {
                for id in matches.keys() {
                    *tally.entry(*id).or_insert(0) += 1;
                }
            }
            tally.into_iter().filter(|(_, n)| *n == required).map(|(id, _)| id).collect()
        };

        let mut hits: Vec<Hit<'_>> = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(document) = self.document(id) else { continue };
            let (score, locations) = match text_matches.as_ref().and_then(|m| m.get(&id)) {
                Some(m) if request.locations => (m.score, m.locations.clone()),
                Some(m) => (m.score, Vec::new()),
                None => (0.0, Vec::new()),
            };
            hits.push(Hit { document, score, locations });
        }
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.document.id.cmp(&b.document.id))
        });
        tracing::debug!(query = %request.query, tags = request.tags.len(), hits = hits.len(), "search");
        Ok(hits)
    }
}
