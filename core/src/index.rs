use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::document::{assemble, Assembled, Document, ParsedDocument};
use crate::error::{Diagnostics, Error, Result};
use crate::fulltext::{Field, MemoryEngine, MemoryIndexer, TextIndexer};
use crate::tags::{derive_tags, Tag};
use crate::DocId;

#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// File extension of document packages, without the dot. Compared
    /// case-insensitively.
    pub extension: String,
    /// Assemble files on the rayon pool. Ids are assigned in traversal order
    /// either way.
    pub parallel: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self { extension: "docx".to_string(), parallel: true }
    }
}

#[derive(Debug)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub diagnostics: Diagnostics,
}

/// What happened to each file found during a build.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub indexed: usize,
    pub skipped: Vec<SkippedFile>,
    /// Problems that degraded a field of an indexed document.
    pub warnings: Vec<(PathBuf, Error)>,
}

/// Documents, one posting list per tag and a full-text engine. Nothing
/// mutates an index once it is constructed.
pub struct Index<E = MemoryEngine> {
    documents: Vec<Document>,
    tags: HashMap<Tag, Vec<DocId>>,
    engine: E,
}

impl Index {
    /// Walks `root` in file-name order and indexes every document package
    /// below it. Only a failure to enumerate the root fails the build; files
    /// that cannot be assembled are reported and left out.
    pub fn build<P: AsRef<Path>>(root: P, options: &BuildOptions) -> Result<(Index, BuildReport)> {
        let root = root.as_ref();
        tracing::info!(root = %root.display(), "building index");

        let files = discover(root, &options.extension)?;
        let assembled: Vec<(PathBuf, Result<Assembled, Diagnostics>)> = if options.parallel {
            files
                .into_par_iter()
                .map(|path| {
                    let res = assemble(&path);
                    (path, res)
                })
                .collect()
        } else {
            files
                .into_iter()
                .map(|path| {
                    let res = assemble(&path);
                    (path, res)
                })
                .collect()
        };

        let mut report = BuildReport::default();
        let mut documents: Vec<ParsedDocument> = Vec::with_capacity(assembled.len());
        for (path, result) in assembled {
            match result {
                Ok(Assembled { document, warnings }) => {
                    for warning in warnings {
                        tracing::warn!(path = %path.display(), error = %warning, "degraded document");
                        report.warnings.push((path.clone(), warning));
                    }
                    documents.push(document);
                }
                Err(diagnostics) => {
                    tracing::warn!(path = %path.display(), error = %diagnostics, "skipping document");
                    report.skipped.push(SkippedFile { path, diagnostics });
                }
            }
        }
        report.indexed = documents.len();

        let index = Index::from_documents(documents, MemoryIndexer::new());
        tracing::info!(
            num_docs = index.len(),
            num_tags = index.tags.len(),
            skipped = report.skipped.len(),
            "index build complete"
        );
        Ok((index, report))
    }
}

fn discover(root: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => return Err(Error::DirectoryWalk(err)),
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable directory entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let p = entry.path();
        if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
            if ext.eq_ignore_ascii_case(extension) {
                files.push(p.to_path_buf());
            }
        }
    }
    Ok(files)
}

impl<E> Index<E> {
    /// Assigns ids in iteration order, fills the tag posting lists and feeds
    /// content, subject and every comment to the text engine.
    pub fn from_documents<I, W>(documents: I, mut indexer: W) -> Index<E>
    where
        I: IntoIterator<Item = ParsedDocument>,
        W: TextIndexer<Engine = E>,
    {
        let mut docs = Vec::new();
        let mut tags: HashMap<Tag, Vec<DocId>> = HashMap::new();
        for (i, parsed) in documents.into_iter().enumerate() {
            let id = i as DocId;
            let doc = parsed.with_id(id);
            for tag in derive_tags(&doc) {
                tags.entry(tag).or_default().push(id);
            }
            indexer.insert(id, Field::Content, &doc.content);
            if let Some(subject) = &doc.subject {
                indexer.insert(id, Field::Subject, subject);
            }
            for comment in &doc.comments {
                indexer.insert(id, Field::Comment, comment);
            }
            docs.push(doc);
        }
        Index { documents: docs, tags, engine: indexer.finish() }
    }

    /// All tags, sorted.
    pub fn tags(&self) -> Vec<&Tag> {
        let mut tags: Vec<&Tag> = self.tags.keys().collect();
        tags.sort();
        tags
    }

    /// All tags with the number of documents carrying them, sorted by tag.
    pub fn tag_counts(&self) -> Vec<(&Tag, usize)> {
        let mut counts: Vec<(&Tag, usize)> = self.tags.iter().map(|(t, ids)| (t, ids.len())).collect();
        counts.sort();
        counts
    }

    /// Ids carrying `tag`, in insertion order. Empty for unknown tags.
    pub fn postings(&self, tag: &Tag) -> &[DocId] {
        self.tags.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn document(&self, id: DocId) -> Option<&Document> {
        self.documents.get(id as usize)
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::{AREA, KEYWORD};

    fn parsed(area: Option<&str>, keywords: &[&str]) -> ParsedDocument {
        ParsedDocument {
            area: area.map(str::to_string),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            content: "text".into(),
            ..Default::default()
        }
    }

    #[test]
    fn ids_are_dense_in_insertion_order() {
        let index = Index::from_documents(
            vec![parsed(None, &[]), parsed(None, &[]), parsed(None, &[])],
            MemoryIndexer::new(),
        );
        let ids: Vec<DocId> = index.documents().iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(index.document(2).map(|d| d.id), Some(2));
        assert!(index.document(3).is_none());
    }

    #[test]
    fn posting_lists_follow_tags() {
        let index = Index::from_documents(
            vec![parsed(Some("Tax"), &["a", "a"]), parsed(Some("Tax; Appeals"), &["a"]), parsed(None, &[])],
            MemoryIndexer::new(),
        );
        assert_eq!(index.postings(&Tag::new(AREA, "Tax")), &[0, 1]);
        assert_eq!(index.postings(&Tag::new(AREA, "Tax \u{25B8} Appeals")), &[1]);
        assert_eq!(index.postings(&Tag::new(KEYWORD, "a")), &[0, 1]);
        assert!(index.postings(&Tag::new(KEYWORD, "b")).is_empty());
        assert_eq!(index.tags().len(), 3);
        assert!(index.tag_counts().contains(&(&Tag::new(KEYWORD, "a"), 2)));
    }
}
