//! Copying objects from a source document into the output document

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::constants::PROC_SET;
use crate::merge::ResourceNamespace;
use crate::types::Result;

use super::source::resolve;

// =============================================================================
// Deep Copy
// =============================================================================

/// Deep copy an object from source to output document, following references.
///
/// Uses a cache to avoid copying the same object multiple times. The output
/// id of a referenced object is reserved before its value is copied, so
/// reference cycles terminate.
pub fn copy_object_deep(
    output: &mut Document,
    source: &Document,
    obj: &Object,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Object> {
    match obj {
        Object::Reference(id) => {
            if let Some(&new_id) = cache.get(id) {
                return Ok(Object::Reference(new_id));
            }

            let new_id = output.new_object_id();
            cache.insert(*id, new_id);

            let referenced = source.get_object(*id)?;
            let copied = copy_object_deep(output, source, referenced, cache)?;
            output.objects.insert(new_id, copied);

            Ok(Object::Reference(new_id))
        }
        Object::Dictionary(dict) => Ok(Object::Dictionary(copy_dictionary(
            output, source, dict, cache,
        )?)),
        Object::Array(arr) => {
            let new_arr: Result<Vec<_>> = arr
                .iter()
                .map(|item| copy_object_deep(output, source, item, cache))
                .collect();
            Ok(Object::Array(new_arr?))
        }
        Object::Stream(stream) => Ok(Object::Stream(Stream {
            dict: copy_dictionary(output, source, &stream.dict, cache)?,
            content: stream.content.clone(),
            allows_compression: stream.allows_compression,
            start_position: None,
        })),
        // Primitive types: just clone
        _ => Ok(obj.clone()),
    }
}

/// Deep copy every value of a dictionary
pub fn copy_dictionary(
    output: &mut Document,
    source: &Document,
    dict: &Dictionary,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<Dictionary> {
    let mut new_dict = Dictionary::new();
    for (key, value) in dict.iter() {
        new_dict.set(key.clone(), copy_object_deep(output, source, value, cache)?);
    }
    Ok(new_dict)
}

// =============================================================================
// Resources
// =============================================================================

/// Copy the resources of a page into the output and describe them as a
/// namespace.
///
/// Every named resource ends up as an indirect object of the output, so
/// resources shared by several pages keep a single identity.
pub fn copy_namespace(
    output: &mut Document,
    source: &Document,
    resources: &Dictionary,
    cache: &mut HashMap<ObjectId, ObjectId>,
) -> Result<ResourceNamespace> {
    let mut namespace = ResourceNamespace::new();

    for (class, value) in resources.iter() {
        let value = resolve(source, value)?;

        if class.as_slice() == PROC_SET {
            if let Ok(tags) = value.as_array() {
                for tag in tags {
                    if let Ok(tag) = tag.as_name() {
                        namespace.add_proc_set(tag);
                    }
                }
            }
            continue;
        }

        let Ok(entries) = value.as_dict() else {
            log::debug!(
                "Skipping resource class {} that is not a dictionary",
                String::from_utf8_lossy(class)
            );
            continue;
        };

        for (name, entry) in entries.iter() {
            let id = match entry {
                Object::Reference(_) => copy_object_deep(output, source, entry, cache)?
                    .as_reference()?,
                direct => {
                    let copied = copy_object_deep(output, source, direct, cache)?;
                    output.add_object(copied)
                }
            };
            namespace.insert(class, name, id);
        }
    }

    Ok(namespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    #[test]
    fn test_copy_follows_cycles() {
        let mut source = Document::with_version("1.5");
        let a = source.new_object_id();
        let b = source.add_object(dictionary! { "Next" => a });
        source
            .objects
            .insert(a, Object::Dictionary(dictionary! { "Next" => b }));

        let mut output = Document::with_version("1.5");
        let mut cache = HashMap::new();
        let copied = copy_object_deep(&mut output, &source, &Object::Reference(a), &mut cache)
            .unwrap()
            .as_reference()
            .unwrap();

        let next = output
            .get_dictionary(copied)
            .unwrap()
            .get(b"Next")
            .unwrap()
            .as_reference()
            .unwrap();
        let back = output
            .get_dictionary(next)
            .unwrap()
            .get(b"Next")
            .unwrap()
            .as_reference()
            .unwrap();
        assert_eq!(back, copied);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_namespace_promotes_direct_resources() {
        let mut source = Document::with_version("1.5");
        let font = source.add_object(dictionary! { "Type" => "Font", "BaseFont" => "Helvetica" });
        let resources = dictionary! {
            "Font" => dictionary! { "F1" => font },
            "ExtGState" => dictionary! { "GS0" => dictionary! { "CA" => Object::Real(0.5) } },
            "ProcSet" => vec![Object::Name(b"PDF".to_vec()), Object::Name(b"Text".to_vec())],
        };

        let mut output = Document::with_version("1.5");
        let mut cache = HashMap::new();
        let namespace = copy_namespace(&mut output, &source, &resources, &mut cache).unwrap();

        let font_id = namespace.get(b"Font", b"F1").unwrap();
        assert_eq!(cache.get(&font), Some(&font_id));
        assert!(namespace.get(b"ExtGState", b"GS0").is_some());
        assert_eq!(namespace.proc_set().len(), 2);

        // copying again through the same cache yields the same identity
        let again = copy_namespace(&mut output, &source, &resources, &mut cache).unwrap();
        assert_eq!(again.get(b"Font", b"F1"), Some(font_id));
    }
}
