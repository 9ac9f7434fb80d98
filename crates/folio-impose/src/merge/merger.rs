//! Merging the resources of several source pages into one destination page

use crate::constants::UNIQUE_NAME_PREFIX;
use crate::types::{ImposeError, Result};

use super::{RenameList, ResourceNamespace};

/// Accumulates the resource namespaces of the destination pages of one
/// signature.
///
/// Names minted to resolve collisions are unique per merger instance, even
/// across [`ResourceMerger::resize`].
#[derive(Debug, Clone)]
pub struct ResourceMerger {
    pages: Vec<ResourceNamespace>,
    next_name: u64,
}

impl ResourceMerger {
    pub fn new(dest_pages: usize) -> Self {
        Self {
            pages: vec![ResourceNamespace::new(); dest_pages],
            next_name: 1,
        }
    }

    /// Start over with `dest_pages` empty namespaces
    pub fn resize(&mut self, dest_pages: usize) {
        self.pages.clear();
        self.pages.resize(dest_pages, ResourceNamespace::new());
    }

    pub fn dest_pages(&self) -> usize {
        self.pages.len()
    }

    pub fn resources(&self, dest_page: usize) -> Option<&ResourceNamespace> {
        self.pages.get(dest_page)
    }

    /// Hand over the namespace of a finished destination page, leaving an
    /// empty one behind
    pub fn take_resources(&mut self, dest_page: usize) -> Option<ResourceNamespace> {
        self.pages.get_mut(dest_page).map(std::mem::take)
    }

    /// Merge `source` into the namespace of `dest_page`.
    ///
    /// Returns the renames the source content must go through to keep
    /// referring to the same objects.
    pub fn merge(&mut self, dest_page: usize, source: &ResourceNamespace) -> Result<RenameList> {
        let count = self.pages.len();
        let namespace = self
            .pages
            .get_mut(dest_page)
            .ok_or(ImposeError::DestinationPage {
                index: dest_page,
                count,
            })?;

        for tag in source.proc_set() {
            namespace.add_proc_set(tag);
        }

        let mut renames = RenameList::new();
        for (class, entries) in source.classes() {
            for (name, &object) in entries {
                if let Some(existing) = namespace.name_of(class, object) {
                    if existing != name.as_slice() {
                        let existing = existing.to_vec();
                        renames.insert(class, name, &existing);
                    }
                    continue;
                }

                if namespace.get(class, name).is_some() {
                    let fresh = mint_name(&mut self.next_name, namespace);
                    log::debug!(
                        "Resource /{} of class {} renamed to /{} on destination page {}",
                        String::from_utf8_lossy(name),
                        String::from_utf8_lossy(class),
                        String::from_utf8_lossy(&fresh),
                        dest_page
                    );
                    renames.insert(class, name, &fresh);
                    namespace.insert(class, &fresh, object);
                } else {
                    namespace.insert(class, name, object);
                }
            }
        }

        debug_assert!(namespace.is_consistent());
        Ok(renames)
    }
}

fn mint_name(counter: &mut u64, namespace: &ResourceNamespace) -> Vec<u8> {
    loop {
        let candidate = format!("{}{}", UNIQUE_NAME_PREFIX, *counter).into_bytes();
        *counter += 1;
        if !namespace.uses_name(&candidate) {
            return candidate;
        }
    }
}
