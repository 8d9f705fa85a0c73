//! Common fixtures for query engine tests.

#![allow(dead_code)]

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Developer {
    pub name: String,
    pub language: String,
    pub framework: String,
    pub years: u32,
}

impl Developer {
    pub fn new(name: &str, language: &str, framework: &str, years: u32) -> Self {
        Self {
            name: name.to_string(),
            language: language.to_string(),
            framework: framework.to_string(),
            years,
        }
    }
}

/// The five developers most tests run against.
pub fn developers() -> Vec<Developer> {
    vec![
        Developer::new("Sai", "Kotlin", "SpringBoot", 6),
        Developer::new("Kris", "Kotlin", "JavaEE", 12),
        Developer::new("Joe", "Kotlin", "SpringBoot", 3),
        Developer::new("Jane", "Java", "SpringBoot", 6),
        Developer::new("Sanga", "Scala", "Play", 9),
    ]
}

/// Names of the matched developers, in result order.
pub fn names(found: &[&Developer]) -> Vec<String> {
    found.iter().map(|d| d.name.clone()).collect()
}

/// Names sorted, for comparisons that ignore evaluator order.
pub fn sorted_names(found: &[&Developer]) -> Vec<String> {
    let mut names = names(found);
    names.sort();
    names
}
