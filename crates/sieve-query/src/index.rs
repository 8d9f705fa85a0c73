//! In-memory record index and predicate evaluation.
//!
//! Distinct records are stored once, in first-insertion order. For every
//! registered attribute the index keeps posting lists from an equality key
//! to the ids of the records holding it. Evaluation walks a [`Predicate`]
//! and combines posting lists, so results always come back in insertion
//! order.

use crate::attribute::{parse_number, Attribute, AttributeRegistry, AttributeValue};
use crate::config::MixedTypePolicy;
use crate::error::EvalError;
use crate::ir::Predicate;
use crate::record::{FieldValue, Record};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Position of a distinct record in the index
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(usize);

impl RecordId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Equality key stored in posting lists.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndexKey {
    /// Bit pattern of a normalized `f64`
    Number(u64),
    Text(String),
}

impl IndexKey {
    pub fn number(n: f64) -> Self {
        // -0.0 and 0.0 compare equal, so they must share a key
        let n = if n == 0.0 { 0.0 } else { n };
        Self::Number(n.to_bits())
    }

    /// Key a query literal under `attribute`.
    ///
    /// Numeric attributes compare numerically when the literal is a number,
    /// otherwise by text.
    pub fn for_literal(attribute: &Attribute, literal: &str) -> Self {
        match attribute {
            Attribute::Numeric { .. } => match parse_number(literal) {
                Some(n) => Self::number(n),
                None => Self::Text(literal.to_string()),
            },
            Attribute::Text { .. } => Self::Text(literal.to_string()),
        }
    }
}

/// Sorted record ids
type Postings = Vec<RecordId>;

#[derive(Debug, Default)]
pub struct RecordIndex {
    records: Vec<Record>,
    ids: HashMap<Record, RecordId>,
    postings: HashMap<String, HashMap<IndexKey, Postings>>,
}

impl RecordIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index over `records` and index every registered attribute.
    pub fn build(
        records: impl IntoIterator<Item = Record>,
        registry: &AttributeRegistry,
        mixed_types: MixedTypePolicy,
    ) -> Result<Self, EvalError> {
        let mut index = Self::new();
        for record in records {
            index.insert(record);
        }
        index.index_attributes(registry, mixed_types)?;
        Ok(index)
    }

    /// Store a record, returning the id of the identical record if one is
    /// already present.
    pub fn insert(&mut self, record: Record) -> RecordId {
        if let Some(&id) = self.ids.get(&record) {
            return id;
        }
        let id = RecordId::new(self.records.len());
        self.ids.insert(record.clone(), id);
        self.records.push(record);
        id
    }

    /// (Re)build posting lists for every attribute in `registry`.
    pub fn index_attributes(
        &mut self,
        registry: &AttributeRegistry,
        mixed_types: MixedTypePolicy,
    ) -> Result<(), EvalError> {
        self.postings.clear();
        for attribute in registry.iter() {
            let mut lists: HashMap<IndexKey, Postings> = HashMap::new();
            for (idx, record) in self.records.iter().enumerate() {
                let key = record_key(attribute, record, mixed_types)?;
                lists.entry(key).or_default().push(RecordId::new(idx));
            }
            self.postings.insert(attribute.name().to_string(), lists);
        }
        debug!(
            records = self.records.len(),
            attributes = self.postings.len(),
            "Indexed records"
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn record(&self, id: RecordId) -> Option<&Record> {
        self.records.get(id.index())
    }

    /// Evaluate `predicate`, returning matching ids in insertion order.
    ///
    /// Every field the predicate references must be registered.
    pub fn evaluate(
        &self,
        predicate: &Predicate,
        registry: &AttributeRegistry,
    ) -> Result<Vec<RecordId>, EvalError> {
        for field in predicate.fields() {
            if !registry.contains(field) {
                return Err(EvalError::UnknownAttribute(field.to_string()));
            }
        }
        Ok(self.eval(predicate, registry))
    }

    fn eval(&self, predicate: &Predicate, registry: &AttributeRegistry) -> Postings {
        match predicate {
            Predicate::Equal { field, value } => {
                let Some(attribute) = registry.get(field) else {
                    return Vec::new();
                };
                let key = IndexKey::for_literal(attribute, value);
                self.postings
                    .get(field)
                    .and_then(|lists| lists.get(&key))
                    .cloned()
                    .unwrap_or_default()
            }
            Predicate::And(children) => {
                let mut children = children.iter();
                let Some(first) = children.next() else {
                    return self.all();
                };
                let mut acc = self.eval(first, registry);
                for child in children {
                    if acc.is_empty() {
                        break;
                    }
                    acc = intersect(&acc, &self.eval(child, registry));
                }
                acc
            }
            Predicate::Or(children) => children
                .iter()
                .fold(Vec::new(), |acc, child| union(&acc, &self.eval(child, registry))),
        }
    }

    fn all(&self) -> Postings {
        (0..self.records.len()).map(RecordId::new).collect()
    }
}

fn record_key(
    attribute: &Attribute,
    record: &Record,
    mixed_types: MixedTypePolicy,
) -> Result<IndexKey, EvalError> {
    match attribute.extract(record) {
        Some(AttributeValue::Number(n)) => Ok(IndexKey::number(n)),
        Some(AttributeValue::Text(text)) => Ok(IndexKey::Text(text)),
        // Numeric attribute whose value is missing or not a number
        None => {
            let text = attribute.text_of(record);
            let present = matches!(
                record.get(attribute.name()),
                Some(FieldValue::Text(_)) | Some(FieldValue::Number(_))
            );
            if present {
                if mixed_types == MixedTypePolicy::Reject {
                    return Err(EvalError::MixedType {
                        field: attribute.name().to_string(),
                        value: text,
                    });
                }
                warn!(
                    field = attribute.name(),
                    value = %text,
                    "Non-numeric value under numeric attribute, comparing as text"
                );
            }
            Ok(IndexKey::Text(text))
        }
    }
}

fn intersect(a: &[RecordId], b: &[RecordId]) -> Postings {
    let (mut i, mut j) = (0, 0);
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}

fn union(a: &[RecordId], b: &[RecordId]) -> Postings {
    let (mut i, mut j) = (0, 0);
    let mut out = Vec::with_capacity(a.len() + b.len());
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => {
                out.push(a[i]);
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                out.push(b[j]);
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn developer(name: &str, language: &str, framework: &str, age: i64) -> Record {
        let mut record = Record::new();
        record.insert("name", name);
        record.insert("language", language);
        record.insert("framework", framework);
        record.insert("age", age);
        record
    }

    fn fixture() -> (RecordIndex, AttributeRegistry) {
        let records = vec![
            developer("Sai", "Kotlin", "SpringBoot", 31),
            developer("Kris", "Kotlin", "JavaEE", 45),
            developer("Joe", "Kotlin", "SpringBoot", 28),
            developer("Jane", "Java", "SpringBoot", 31),
            developer("Sanga", "Scala", "Play", 39),
        ];
        let registry = AttributeRegistry::from_records(&records);
        let index = RecordIndex::build(records, &registry, MixedTypePolicy::TextFallback).unwrap();
        (index, registry)
    }

    fn names(index: &RecordIndex, ids: &[RecordId]) -> Vec<String> {
        ids.iter()
            .map(|id| index.record(*id).unwrap().get("name").unwrap().to_text())
            .collect()
    }

    // =========================================================================
    // Equality
    // =========================================================================

    #[test]
    fn test_equal_text() {
        let (index, registry) = fixture();
        let ids = index
            .evaluate(&Predicate::equal("language", "Kotlin"), &registry)
            .unwrap();

        assert_eq!(names(&index, &ids), vec!["Sai", "Kris", "Joe"]);
    }

    #[test]
    fn test_equal_numeric_accepts_equivalent_literals() {
        let (index, registry) = fixture();

        for literal in ["31", "31.0", " 31 "] {
            let ids = index
                .evaluate(&Predicate::equal("age", literal), &registry)
                .unwrap();
            assert_eq!(names(&index, &ids), vec!["Sai", "Jane"], "literal {literal:?}");
        }
    }

    #[test]
    fn test_equal_no_match() {
        let (index, registry) = fixture();
        let ids = index
            .evaluate(&Predicate::equal("language", "Python"), &registry)
            .unwrap();

        assert!(ids.is_empty());
    }

    #[test]
    fn test_unknown_attribute() {
        let (index, registry) = fixture();
        let err = index
            .evaluate(&Predicate::equal("nonExistentAttribute", "Python"), &registry)
            .unwrap_err();

        assert!(matches!(err, EvalError::UnknownAttribute(name) if name == "nonExistentAttribute"));
    }

    #[test]
    fn test_unknown_attribute_nested() {
        let (index, registry) = fixture();
        let predicate = Predicate::or([
            Predicate::equal("language", "Java"),
            Predicate::equal("editor", "vim"),
        ]);

        assert!(index.evaluate(&predicate, &registry).is_err());
    }

    // =========================================================================
    // Boolean composition
    // =========================================================================

    #[test]
    fn test_nested_and_or() {
        let (index, registry) = fixture();
        let predicate = Predicate::and([
            Predicate::or([
                Predicate::equal("language", "Kotlin"),
                Predicate::equal("language", "Java"),
            ]),
            Predicate::equal("framework", "SpringBoot"),
        ]);

        let ids = index.evaluate(&predicate, &registry).unwrap();
        assert_eq!(names(&index, &ids), vec!["Sai", "Joe", "Jane"]);
    }

    #[test]
    fn test_or_keeps_insertion_order() {
        let (index, registry) = fixture();
        let predicate = Predicate::or([
            Predicate::equal("name", "Sanga"),
            Predicate::equal("name", "Sai"),
        ]);

        let ids = index.evaluate(&predicate, &registry).unwrap();
        assert_eq!(names(&index, &ids), vec!["Sai", "Sanga"]);
    }

    #[test]
    fn test_empty_and_matches_all() {
        let (index, registry) = fixture();
        let ids = index.evaluate(&Predicate::And(Vec::new()), &registry).unwrap();
        assert_eq!(ids.len(), 5);

        let ids = index.evaluate(&Predicate::Or(Vec::new()), &registry).unwrap();
        assert!(ids.is_empty());
    }

    // =========================================================================
    // Record storage and mixed types
    // =========================================================================

    #[test]
    fn test_insert_deduplicates() {
        let mut index = RecordIndex::new();
        let a = index.insert(developer("Sai", "Kotlin", "SpringBoot", 31));
        let b = index.insert(developer("Sai", "Kotlin", "SpringBoot", 31));
        let c = index.insert(developer("Joe", "Kotlin", "SpringBoot", 28));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(index.len(), 2);
    }

    fn mixed_records() -> (Vec<Record>, AttributeRegistry) {
        let mut text = Record::new();
        text.insert("code", "n/a");
        let mut number = Record::new();
        number.insert("code", 7i64);
        let records = vec![text, number];
        // numeric classification comes from the last record
        let registry = AttributeRegistry::from_records(&records);
        (records, registry)
    }

    #[test]
    fn test_mixed_types_fall_back_to_text() {
        let (records, registry) = mixed_records();
        let index = RecordIndex::build(records, &registry, MixedTypePolicy::TextFallback).unwrap();

        let text = index
            .evaluate(&Predicate::equal("code", "n/a"), &registry)
            .unwrap();
        let number = index
            .evaluate(&Predicate::equal("code", "7"), &registry)
            .unwrap();

        assert_eq!(text, vec![RecordId::new(0)]);
        assert_eq!(number, vec![RecordId::new(1)]);
    }

    #[test]
    fn test_mixed_types_rejected() {
        let (records, registry) = mixed_records();
        let err = RecordIndex::build(records, &registry, MixedTypePolicy::Reject).unwrap_err();

        assert!(matches!(err, EvalError::MixedType { field, value } if field == "code" && value == "n/a"));
    }

    #[test]
    fn test_missing_field_is_null_text() {
        let mut with = Record::new();
        with.insert("mentor", "Kris");
        let without = Record::new();
        let records = vec![with, without];
        let registry = AttributeRegistry::from_records(&records);
        let index = RecordIndex::build(records, &registry, MixedTypePolicy::Reject).unwrap();

        let ids = index
            .evaluate(&Predicate::equal("mentor", "null"), &registry)
            .unwrap();
        assert_eq!(ids, vec![RecordId::new(1)]);
    }

    #[test]
    fn test_merge_helpers() {
        let ids = |v: &[usize]| v.iter().copied().map(RecordId::new).collect::<Vec<_>>();

        assert_eq!(intersect(&ids(&[0, 2, 4]), &ids(&[1, 2, 4, 5])), ids(&[2, 4]));
        assert_eq!(union(&ids(&[0, 4]), &ids(&[1, 4, 5])), ids(&[0, 1, 4, 5]));
    }

    #[test]
    fn test_negative_zero_shares_key() {
        assert_eq!(IndexKey::number(-0.0), IndexKey::number(0.0));
    }
}
