use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    Json,
    JsonLines,
    Toml,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(SourceFormat::Json),
            "jsonl" | "ndjson" => Some(SourceFormat::JsonLines),
            "toml" => Some(SourceFormat::Toml),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionKind {
    TestCases,
    Requirements,
}

impl CollectionKind {
    /// Key holding the records when a source wraps them in an object.
    pub fn key(self) -> &'static str {
        match self {
            CollectionKind::TestCases => "test_cases",
            CollectionKind::Requirements => "requirements",
        }
    }
}

/// Records from a lenient load, plus the failure that emptied them, if any.
///
/// An empty `records` with no `load_error` means the source held no data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedCollection<T> {
    pub records: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_error: Option<String>,
}

impl<T> LoadedCollection<T> {
    pub fn is_load_failure(&self) -> bool {
        self.load_error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_is_detected_from_extension() {
        assert_eq!(
            SourceFormat::from_path(Path::new("cases.json")),
            Some(SourceFormat::Json)
        );
        assert_eq!(
            SourceFormat::from_path(Path::new("cases.JSONL")),
            Some(SourceFormat::JsonLines)
        );
        assert_eq!(
            SourceFormat::from_path(Path::new("reqs.toml")),
            Some(SourceFormat::Toml)
        );
        assert_eq!(SourceFormat::from_path(Path::new("reqs.docx")), None);
        assert_eq!(SourceFormat::from_path(Path::new("README")), None);
    }
}
