//! Rewriting resource names inside copied content

use std::collections::BTreeMap;

use lopdf::Object;
use lopdf::content::Content;

/// How a name operand of a content operator is resolved
enum OperandClass {
    /// Names a resource of this class
    Resource(&'static [u8]),
    /// Not a resource name (marked-content tags and the like)
    Literal,
    /// Operator not known to take resource names
    Unknown,
}

fn operand_class(operator: &str, index: usize, count: usize) -> OperandClass {
    match (operator, index) {
        ("Tf", 0) => OperandClass::Resource(b"Font"),
        ("Do", 0) => OperandClass::Resource(b"XObject"),
        ("gs", 0) => OperandClass::Resource(b"ExtGState"),
        ("cs" | "CS", 0) => OperandClass::Resource(b"ColorSpace"),
        ("sh", 0) => OperandClass::Resource(b"Shading"),
        ("scn" | "SCN", i) if i + 1 == count => OperandClass::Resource(b"Pattern"),
        ("BDC" | "DP", 1) => OperandClass::Resource(b"Properties"),
        ("Tf" | "Do" | "gs" | "cs" | "CS" | "sh" | "scn" | "SCN" | "BDC" | "DP" | "BMC" | "MP", _) => {
            OperandClass::Literal
        }
        _ => OperandClass::Unknown,
    }
}

/// Names changed by one merge: `(class, old name) → new name`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameList {
    entries: BTreeMap<(Vec<u8>, Vec<u8>), Vec<u8>>,
}

impl RenameList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, class: &[u8], old: &[u8], new: &[u8]) {
        self.entries
            .insert((class.to_vec(), old.to_vec()), new.to_vec());
    }

    pub fn get(&self, class: &[u8], name: &[u8]) -> Option<&[u8]> {
        self.entries
            .get(&(class.to_vec(), name.to_vec()))
            .map(Vec::as_slice)
    }

    /// New name of `name` when exactly one class renamed it
    fn get_unambiguous(&self, name: &[u8]) -> Option<&[u8]> {
        let mut matches = self
            .entries
            .iter()
            .filter(|((_, old), _)| old.as_slice() == name)
            .map(|(_, new)| new.as_slice());
        let first = matches.next()?;
        matches.next().is_none().then_some(first)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &[u8], &[u8])> {
        self.entries
            .iter()
            .map(|((class, old), new)| (class.as_slice(), old.as_slice(), new.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up the new name of a resource name used as operand `index` of
    /// `operator`
    pub fn rename_operand(
        &self,
        operator: &str,
        index: usize,
        count: usize,
        name: &[u8],
    ) -> Option<&[u8]> {
        match operand_class(operator, index, count) {
            OperandClass::Resource(class) => self.get(class, name),
            OperandClass::Literal => None,
            OperandClass::Unknown => self.get_unambiguous(name),
        }
    }

    /// Rewrite the name operands of `content`.
    ///
    /// Returns the number of operands changed.
    pub fn apply(&self, content: &mut Content) -> usize {
        if self.is_empty() {
            return 0;
        }
        let mut changed = 0;
        for operation in &mut content.operations {
            let operator = operation.operator.as_str();
            let count = operation.operands.len();
            for (index, operand) in operation.operands.iter_mut().enumerate() {
                if let Object::Name(name) = operand {
                    if let Some(new) = self.rename_operand(operator, index, count, name) {
                        *name = new.to_vec();
                        changed += 1;
                    }
                }
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::Operation;

    fn name(value: &str) -> Object {
        Object::Name(value.as_bytes().to_vec())
    }

    fn operand_name(operation: &Operation, index: usize) -> &[u8] {
        match &operation.operands[index] {
            Object::Name(name) => name,
            other => panic!("not a name: {other:?}"),
        }
    }

    #[test]
    fn test_apply_by_operator_class() {
        let mut renames = RenameList::new();
        renames.insert(b"Font", b"F1", b"Imp1");
        renames.insert(b"XObject", b"F1", b"Imp2");

        let mut content = Content {
            operations: vec![
                Operation::new("Tf", vec![name("F1"), Object::Integer(12)]),
                Operation::new("Do", vec![name("F1")]),
                Operation::new("gs", vec![name("F1")]),
            ],
        };
        assert_eq!(renames.apply(&mut content), 2);
        assert_eq!(operand_name(&content.operations[0], 0), b"Imp1");
        assert_eq!(operand_name(&content.operations[1], 0), b"Imp2");
        assert_eq!(operand_name(&content.operations[2], 0), b"F1");
    }

    #[test]
    fn test_marked_content_tag_untouched() {
        let mut renames = RenameList::new();
        renames.insert(b"Properties", b"OC", b"Imp3");
        renames.insert(b"Properties", b"MC0", b"Imp4");

        let mut content = Content {
            operations: vec![Operation::new("BDC", vec![name("OC"), name("MC0")])],
        };
        renames.apply(&mut content);
        assert_eq!(operand_name(&content.operations[0], 0), b"OC");
        assert_eq!(operand_name(&content.operations[0], 1), b"Imp4");
    }

    #[test]
    fn test_pattern_is_last_operand() {
        let mut renames = RenameList::new();
        renames.insert(b"Pattern", b"P0", b"Imp5");

        let mut content = Content {
            operations: vec![Operation::new(
                "scn",
                vec![Object::Real(0.5), Object::Real(0.5), name("P0")],
            )],
        };
        assert_eq!(renames.apply(&mut content), 1);
        assert_eq!(operand_name(&content.operations[0], 2), b"Imp5");
    }

    #[test]
    fn test_unknown_operator_needs_unambiguous_name() {
        let mut renames = RenameList::new();
        renames.insert(b"Font", b"R1", b"Imp1");
        renames.insert(b"Shading", b"R2", b"Imp2");
        renames.insert(b"XObject", b"R2", b"Imp3");

        let mut content = Content {
            operations: vec![Operation::new("XX", vec![name("R1"), name("R2")])],
        };
        assert_eq!(renames.apply(&mut content), 1);
        assert_eq!(operand_name(&content.operations[0], 0), b"Imp1");
        assert_eq!(operand_name(&content.operations[0], 1), b"R2");
    }

    #[test]
    fn test_empty_list_changes_nothing() {
        let mut content = Content {
            operations: vec![Operation::new("Tf", vec![name("F1"), Object::Integer(9)])],
        };
        assert_eq!(RenameList::new().apply(&mut content), 0);
    }
}
