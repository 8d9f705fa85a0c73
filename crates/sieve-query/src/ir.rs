//! Dialect-independent predicate tree.
//!
//! Every query syntax parses into a [`Predicate`]; the record index walks
//! this tree without knowing which dialect produced it.

use serde::{Deserialize, Serialize};

/// Boolean predicate over record fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// `field = 'value'`
    Equal { field: String, value: String },
    /// All children must match
    And(Vec<Predicate>),
    /// At least one child must match
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn equal(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Equal {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn and(children: impl IntoIterator<Item = Predicate>) -> Self {
        Self::And(children.into_iter().collect())
    }

    pub fn or(children: impl IntoIterator<Item = Predicate>) -> Self {
        Self::Or(children.into_iter().collect())
    }

    /// Field names referenced anywhere in the tree, in first-seen order.
    pub fn fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Equal { field, .. } => {
                if !out.contains(&field.as_str()) {
                    out.push(field);
                }
            }
            Self::And(children) | Self::Or(children) => {
                for child in children {
                    child.collect_fields(out);
                }
            }
        }
    }
}
