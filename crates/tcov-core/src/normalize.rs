//! Text normalization shared by the matcher and the gap analyzer.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::record::{Attribute, TestCaseRecord};

/// Lowercase `text`, collapse whitespace runs to one space and trim the edges.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn normalize_opt(text: Option<&str>) -> String {
    text.map(normalize).unwrap_or_default()
}

/// Strings normalize as usual; every other JSON value reads as `""`.
pub fn normalize_value(value: &Value) -> String {
    match value {
        Value::String(text) => normalize(text),
        _ => String::new(),
    }
}

/// Every attribute of a test case, normalized once up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    fields: BTreeMap<Attribute, String>,
}

impl NormalizedRecord {
    pub fn from_test_case(record: &TestCaseRecord) -> Self {
        let fields = Attribute::ALL
            .into_iter()
            .map(|attribute| (attribute, normalize(record.attribute(attribute))))
            .collect();
        Self { fields }
    }

    pub fn get(&self, attribute: Attribute) -> &str {
        self.fields
            .get(&attribute)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.values().all(String::is_empty)
    }
}
