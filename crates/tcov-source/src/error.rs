use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read record source at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("record source at {path} is not valid JSON: {source}")]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("record source at {path} has invalid JSON on line {line}: {source}")]
    ParseJsonLine {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("record source at {path} is not valid TOML: {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("unsupported record source format at {path} (expected .json, .jsonl or .toml)")]
    UnsupportedFormat { path: PathBuf },
    #[error("record source at {path} has no `{key}` array")]
    MissingCollection { path: PathBuf, key: &'static str },
}
