//! The destination document being assembled

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::constants::LABEL_FONT_NAME;
use crate::layout::Rect;
use crate::merge::ResourceNamespace;
use crate::render::{
    copy_dictionary, copy_namespace, label_font_dictionary, page_dictionary, page_resources,
};
use crate::sequence::SequencedPage;
use crate::types::Result;

/// Output document plus the bookkeeping needed while pages are added
pub(crate) struct OutputDocument {
    doc: Document,
    pages_id: ObjectId,
    page_refs: Vec<ObjectId>,
    /// Source id → output id, per source document
    caches: HashMap<usize, HashMap<ObjectId, ObjectId>>,
    label_font: Option<ObjectId>,
}

impl OutputDocument {
    pub fn new(version: &str) -> Self {
        let mut doc = Document::with_version(version);
        let pages_id = doc.new_object_id();
        Self {
            doc,
            pages_id,
            page_refs: Vec::new(),
            caches: HashMap::new(),
            label_font: None,
        }
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn page_refs(&self) -> &[ObjectId] {
        &self.page_refs
    }

    pub fn page_count(&self) -> usize {
        self.page_refs.len()
    }

    /// Create a page object without adding it to the page list yet
    pub fn create_page(
        &mut self,
        media_box: &Rect,
        content: Vec<u8>,
        resources: Dictionary,
    ) -> ObjectId {
        let content_id = self.doc.add_object(Stream::new(Dictionary::new(), content));
        let page = page_dictionary(self.pages_id, media_box, content_id, resources);
        self.doc.add_object(page)
    }

    /// Append a page created with [`OutputDocument::create_page`]
    pub fn push_page(&mut self, page_id: ObjectId) {
        self.page_refs.push(page_id);
    }

    pub fn add_page(
        &mut self,
        media_box: &Rect,
        content: Vec<u8>,
        resources: Dictionary,
    ) -> ObjectId {
        let page_id = self.create_page(media_box, content, resources);
        self.push_page(page_id);
        page_id
    }

    /// Copy the resources of a source page and describe them as a namespace
    pub fn copy_namespace(&mut self, page: &SequencedPage) -> Result<ResourceNamespace> {
        let Some(resources) = page_resources(&page.document, page.page_id) else {
            return Ok(ResourceNamespace::new());
        };
        let cache = self.caches.entry(page.doc_key).or_default();
        copy_namespace(&mut self.doc, &page.document, resources, cache)
    }

    /// Copy the resource dictionary of a source page verbatim
    pub fn copy_resources(&mut self, page: &SequencedPage) -> Result<Dictionary> {
        let Some(resources) = page_resources(&page.document, page.page_id) else {
            return Ok(Dictionary::new());
        };
        let cache = self.caches.entry(page.doc_key).or_default();
        copy_dictionary(&mut self.doc, &page.document, resources, cache)
    }

    /// Namespace holding only the label font, created on first use
    pub fn label_namespace(&mut self) -> ResourceNamespace {
        let font_id = match self.label_font {
            Some(id) => id,
            None => {
                let id = self.doc.add_object(label_font_dictionary());
                self.label_font = Some(id);
                id
            }
        };
        let mut namespace = ResourceNamespace::new();
        namespace.insert(b"Font", LABEL_FONT_NAME, font_id);
        namespace
    }

    /// Write the page tree and the catalog.
    ///
    /// `catalog` holds extra catalog entries (outline, page labels).
    pub fn finish(mut self, catalog: Dictionary) -> Document {
        let count = self.page_refs.len() as i64;
        let kids = self.page_refs.iter().map(|id| Object::Reference(*id)).collect();
        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(count)),
        ]);
        self.doc
            .objects
            .insert(self.pages_id, Object::Dictionary(pages_dict));

        let mut catalog_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_id)),
        ]);
        for (key, value) in catalog.iter() {
            catalog_dict.set(key.clone(), value.clone());
        }
        let catalog_id = self.doc.add_object(catalog_dict);

        self.doc.trailer.set("Root", catalog_id);
        self.doc
    }
}
