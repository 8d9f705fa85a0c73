//! Attribute classification and the per-call attribute registry.
//!
//! Each field seen in a batch of records becomes an [`Attribute`]: its name,
//! whether it is compared numerically or textually, and how to read its
//! value out of a [`Record`].

use crate::record::{FieldValue, Record};
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

/// How a field's values are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    Numeric,
    Text,
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric => f.write_str("numeric"),
            Self::Text => f.write_str("text"),
        }
    }
}

/// Typed value read from a record by an attribute accessor
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Number(f64),
    Text(String),
}

/// A registered field and its accessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribute {
    Numeric { name: String },
    Text { name: String },
}

impl Attribute {
    /// Classify a field from one observed value: numbers are numeric,
    /// everything else (including null) is text.
    pub fn classify(name: impl Into<String>, value: &FieldValue) -> Self {
        let name = name.into();
        if value.is_number() {
            Self::Numeric { name }
        } else {
            Self::Text { name }
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Numeric { name } | Self::Text { name } => name,
        }
    }

    pub fn kind(&self) -> AttributeKind {
        match self {
            Self::Numeric { .. } => AttributeKind::Numeric,
            Self::Text { .. } => AttributeKind::Text,
        }
    }

    /// Read this attribute from a record.
    ///
    /// Numeric attributes return `None` when the field is absent or does not
    /// parse as a finite number. Text attributes always produce a value;
    /// absence renders as `null`.
    pub fn extract(&self, record: &Record) -> Option<AttributeValue> {
        match self {
            Self::Numeric { name } => match record.get(name)? {
                FieldValue::Number(n) => n.as_f64().map(AttributeValue::Number),
                FieldValue::Text(s) => parse_number(s).map(AttributeValue::Number),
                FieldValue::Null => None,
            },
            Self::Text { .. } => Some(AttributeValue::Text(self.text_of(record))),
        }
    }

    /// Stringified value of this field in `record`, `null` when absent.
    pub fn text_of(&self, record: &Record) -> String {
        record
            .get(self.name())
            .map_or_else(|| FieldValue::Null.to_text(), FieldValue::to_text)
    }
}

/// Parse a textual number, rejecting NaN and infinities.
pub(crate) fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Field name → attribute, built fresh for every query call.
#[derive(Debug, Clone, Default)]
pub struct AttributeRegistry {
    attributes: BTreeMap<String, Attribute>,
}

impl AttributeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify every field of every record.
    ///
    /// A field whose natural type differs between records takes the
    /// classification of the last record that carries it.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a Record>) -> Self {
        let mut registry = Self::new();
        for record in records {
            for (field, value) in record.iter() {
                registry.register(Attribute::classify(field, value));
            }
        }
        registry
    }

    /// Insert or overwrite an attribute; returns the one it replaced.
    pub fn register(&mut self, attribute: Attribute) -> Option<Attribute> {
        self.attributes
            .insert(attribute.name().to_string(), attribute)
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Registered field names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Values<'_, String, Attribute> {
        self.attributes.values()
    }
}
