//! Named resources of one destination page

use std::collections::BTreeMap;

use lopdf::{Dictionary, Object, ObjectId};

use crate::constants::PROC_SET;

/// Resource names of a page, grouped by class (`Font`, `XObject`, ...).
///
/// Within a class every name maps to one object and every object is known
/// under one name. Objects are identified by their id in the destination
/// document, never by value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceNamespace {
    classes: BTreeMap<Vec<u8>, BTreeMap<Vec<u8>, ObjectId>>,
    proc_set: Vec<Vec<u8>>,
}

impl ResourceNamespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` for `object` in `class`, returning the object the name
    /// used to refer to.
    pub fn insert(&mut self, class: &[u8], name: &[u8], object: ObjectId) -> Option<ObjectId> {
        self.classes
            .entry(class.to_vec())
            .or_default()
            .insert(name.to_vec(), object)
    }

    /// Add a procedure set tag, ignoring duplicates
    pub fn add_proc_set(&mut self, tag: &[u8]) {
        if !self.proc_set.iter().any(|known| known == tag) {
            self.proc_set.push(tag.to_vec());
        }
    }

    pub fn get(&self, class: &[u8], name: &[u8]) -> Option<ObjectId> {
        self.classes.get(class)?.get(name).copied()
    }

    /// Name under which `object` is known in `class`
    pub fn name_of(&self, class: &[u8], object: ObjectId) -> Option<&[u8]> {
        self.classes
            .get(class)?
            .iter()
            .find(|(_, id)| **id == object)
            .map(|(name, _)| name.as_slice())
    }

    /// Whether `name` is used by any class
    pub fn uses_name(&self, name: &[u8]) -> bool {
        self.classes.values().any(|entries| entries.contains_key(name))
    }

    /// Class names with their entries
    pub fn classes(&self) -> impl Iterator<Item = (&[u8], &BTreeMap<Vec<u8>, ObjectId>)> {
        self.classes
            .iter()
            .map(|(class, entries)| (class.as_slice(), entries))
    }

    pub fn proc_set(&self) -> &[Vec<u8>] {
        &self.proc_set
    }

    /// Number of named entries over all classes
    pub fn len(&self) -> usize {
        self.classes.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0 && self.proc_set.is_empty()
    }

    /// Build the `/Resources` dictionary of the page
    pub fn to_dictionary(&self) -> Dictionary {
        let mut resources = Dictionary::new();
        for (class, entries) in &self.classes {
            let mut dict = Dictionary::new();
            for (name, id) in entries {
                dict.set(name.clone(), Object::Reference(*id));
            }
            resources.set(class.clone(), Object::Dictionary(dict));
        }
        if !self.proc_set.is_empty() {
            let tags = self
                .proc_set
                .iter()
                .map(|tag| Object::Name(tag.clone()))
                .collect();
            resources.set(PROC_SET, Object::Array(tags));
        }
        resources
    }

    /// One name per object within every class
    pub(crate) fn is_consistent(&self) -> bool {
        self.classes.values().all(|entries| {
            let mut ids: Vec<ObjectId> = entries.values().copied().collect();
            ids.sort_unstable();
            ids.windows(2).all(|pair| pair[0] != pair[1])
        })
    }
}
