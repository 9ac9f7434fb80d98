//! Walking the pages of several documents as one stream

use std::collections::HashMap;
use std::sync::Arc;

use lopdf::{Document, ObjectId};

use crate::types::{ImposeError, Result};

use super::{RetentionPolicy, SourceDocument, SourceRange};

/// A page handed out by the sequencer
#[derive(Debug, Clone)]
pub struct SequencedPage {
    /// Document the page belongs to
    pub document: Arc<Document>,
    /// Identifies the document among all documents of the sequencer
    pub doc_key: usize,
    /// Page object id inside `document`
    pub page_id: ObjectId,
    /// 0-based page index inside `document`
    pub doc_page: usize,
    /// Position in the current stream (primary or append)
    pub index: usize,
    /// Whether the page comes from the append stream
    pub appended: bool,
}

#[derive(Debug, Clone)]
struct ResolvedRange {
    doc_key: usize,
    from_page: usize,
    to_page: usize,
    page_number_offset: i32,
}

impl ResolvedRange {
    fn page_count(&self) -> usize {
        self.to_page - self.from_page + 1
    }
}

#[derive(Debug)]
struct LoadedDocument {
    document: Arc<Document>,
    page_ids: Vec<ObjectId>,
}

impl LoadedDocument {
    fn new(document: Arc<Document>) -> Self {
        let page_ids = document.get_pages().into_values().collect();
        Self { document, page_ids }
    }
}

#[derive(Debug, Clone, Default)]
struct Cursor {
    append: bool,
    range: usize,
    page: Option<usize>,
    position: usize,
    current: Option<(usize, usize)>,
}

/// Cursor over the pages of a primary list of ranges, optionally followed
/// by an append list
#[derive(Debug)]
pub struct PageSequencer {
    documents: Vec<SourceDocument>,
    primary: Vec<ResolvedRange>,
    append: Vec<ResolvedRange>,
    policy: RetentionPolicy,
    loaded: HashMap<usize, Arc<LoadedDocument>>,
    cursor: Cursor,
}

impl PageSequencer {
    /// Resolve all ranges against their documents.
    ///
    /// `to_page` is clipped to the last page of the document; a range
    /// starting past the end of its document, or ending before it starts,
    /// is an error.
    pub fn open(
        primary: Vec<SourceRange>,
        append: Vec<SourceRange>,
        policy: RetentionPolicy,
    ) -> Result<Self> {
        let mut sequencer = Self {
            documents: Vec::new(),
            primary: Vec::new(),
            append: Vec::new(),
            policy,
            loaded: HashMap::new(),
            cursor: Cursor::default(),
        };
        sequencer.primary = sequencer.resolve_all(primary)?;
        sequencer.append = sequencer.resolve_all(append)?;

        log::debug!(
            "Sequencing {} page(s) from {} range(s), {} appended page(s)",
            sequencer.total_pages(),
            sequencer.primary.len(),
            sequencer.appended_pages()
        );
        Ok(sequencer)
    }

    fn resolve_all(&mut self, ranges: Vec<SourceRange>) -> Result<Vec<ResolvedRange>> {
        ranges
            .into_iter()
            .map(|range| self.resolve(range))
            .collect()
    }

    fn resolve(&mut self, range: SourceRange) -> Result<ResolvedRange> {
        let doc_key = match self
            .documents
            .iter()
            .position(|known| known.same_as(&range.document))
        {
            Some(key) => key,
            None => {
                self.documents.push(range.document.clone());
                self.documents.len() - 1
            }
        };

        let available = self.load(doc_key)?.page_ids.len();
        let to_page = range
            .to_page
            .map_or(available.saturating_sub(1), |to| {
                to.min(available.saturating_sub(1))
            });
        if range.from_page >= available || range.from_page > to_page {
            return Err(ImposeError::PageRange {
                document: range.document.label(),
                from: range.from_page,
                to: range.to_page.unwrap_or(to_page),
                available,
            });
        }
        self.release(doc_key);

        Ok(ResolvedRange {
            doc_key,
            from_page: range.from_page,
            to_page,
            page_number_offset: range.page_number_offset,
        })
    }

    fn load(&mut self, doc_key: usize) -> Result<Arc<LoadedDocument>> {
        if let Some(loaded) = self.loaded.get(&doc_key) {
            return Ok(Arc::clone(loaded));
        }
        let document = match self.documents.get(doc_key) {
            Some(SourceDocument::Memory(document)) => Arc::clone(document),
            Some(SourceDocument::Path(path)) => {
                log::debug!("Loading {}", path.display());
                Arc::new(Document::load(path)?)
            }
            None => {
                return Err(ImposeError::Config(format!(
                    "unknown source document {doc_key}"
                )));
            }
        };
        let loaded = Arc::new(LoadedDocument::new(document));
        self.loaded.insert(doc_key, Arc::clone(&loaded));
        Ok(loaded)
    }

    fn release(&mut self, doc_key: usize) {
        if self.policy == RetentionPolicy::OpenOnDemand {
            self.loaded.remove(&doc_key);
        }
    }

    fn ranges(&self) -> &[ResolvedRange] {
        if self.cursor.append {
            &self.append
        } else {
            &self.primary
        }
    }

    /// Next page of the current stream, or `None` when it is exhausted
    pub fn next(&mut self) -> Result<Option<SequencedPage>> {
        loop {
            let Some(range) = self.ranges().get(self.cursor.range).cloned() else {
                return Ok(None);
            };
            let doc_page = *self.cursor.page.get_or_insert(range.from_page);

            if doc_page <= range.to_page {
                let loaded = self.load(range.doc_key)?;
                let page_id = loaded.page_ids.get(doc_page).copied().ok_or_else(|| {
                    ImposeError::PageRange {
                        document: self.documents[range.doc_key].label(),
                        from: range.from_page,
                        to: range.to_page,
                        available: loaded.page_ids.len(),
                    }
                })?;

                let index = self.cursor.position;
                self.cursor.page = Some(doc_page + 1);
                self.cursor.position += 1;
                self.cursor.current = Some((range.doc_key, doc_page));

                return Ok(Some(SequencedPage {
                    document: Arc::clone(&loaded.document),
                    doc_key: range.doc_key,
                    page_id,
                    doc_page,
                    index,
                    appended: self.cursor.append,
                }));
            }

            self.release(range.doc_key);
            self.cursor.range += 1;
            self.cursor.page = None;
        }
    }

    /// Document key and page index of the page last returned by
    /// [`PageSequencer::next`]
    pub fn current(&self) -> Option<(usize, usize)> {
        self.cursor.current
    }

    /// Page number offset of the primary range holding stream position `index`.
    ///
    /// Positions past the end of the primary stream have offset 0.
    pub fn page_number_offset(&self, index: usize) -> i32 {
        let mut remaining = index;
        for range in &self.primary {
            if remaining < range.page_count() {
                return range.page_number_offset;
            }
            remaining -= range.page_count();
        }
        0
    }

    /// Printed page number of stream position `index`
    pub fn printed_page_number(&self, index: usize) -> i64 {
        index as i64 - self.page_number_offset(index) as i64 + 1
    }

    /// Switch to the append stream.
    ///
    /// Fails when already appending or when there is nothing to append.
    pub fn start_append(&mut self) -> Result<()> {
        if self.cursor.append || self.append.is_empty() {
            return Err(ImposeError::AppendUnavailable);
        }
        if let Some(range) = self.primary.get(self.cursor.range) {
            let doc_key = range.doc_key;
            self.release(doc_key);
        }
        self.cursor = Cursor {
            append: true,
            ..Cursor::default()
        };
        Ok(())
    }

    /// Pages in the primary stream
    pub fn total_pages(&self) -> usize {
        self.primary.iter().map(ResolvedRange::page_count).sum()
    }

    /// Pages in the append stream
    pub fn appended_pages(&self) -> usize {
        self.append.iter().map(ResolvedRange::page_count).sum()
    }

    /// Page counts of the primary ranges, in order
    pub fn range_page_counts(&self) -> Vec<usize> {
        self.primary.iter().map(ResolvedRange::page_count).collect()
    }

    pub fn has_append(&self) -> bool {
        !self.append.is_empty()
    }

    pub fn in_append_mode(&self) -> bool {
        self.cursor.append
    }

    /// Number of documents currently held in memory
    pub fn loaded_documents(&self) -> usize {
        self.loaded.len()
    }
}
