use serde_json::Value;
use std::fs;
use std::path::Path;
use tcov_core::{RequirementRecord, TestCaseRecord, Validate, ValidationIssue};
use tracing::{debug, error, warn};

use crate::error::SourceError;
use crate::types::{CollectionKind, LoadedCollection, SourceFormat};

pub fn load_test_cases(path: &Path) -> Result<Vec<TestCaseRecord>, SourceError> {
    load_records(path, CollectionKind::TestCases)
}

pub fn load_requirements(path: &Path) -> Result<Vec<RequirementRecord>, SourceError> {
    load_records(path, CollectionKind::Requirements)
}

/// Loads test cases, logging and substituting an empty set on failure.
pub fn load_test_cases_or_empty(path: &Path) -> LoadedCollection<TestCaseRecord> {
    load_records_or_empty(path, CollectionKind::TestCases)
}

/// Loads requirements, logging and substituting an empty set on failure.
pub fn load_requirements_or_empty(path: &Path) -> LoadedCollection<RequirementRecord> {
    load_records_or_empty(path, CollectionKind::Requirements)
}

pub fn load_records<T>(path: &Path, kind: CollectionKind) -> Result<Vec<T>, SourceError>
where
    T: From<Value> + Validate,
{
    let format = SourceFormat::from_path(path).ok_or_else(|| SourceError::UnsupportedFormat {
        path: path.to_path_buf(),
    })?;
    let contents = fs::read_to_string(path).map_err(|source| SourceError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let values = parse_values(path, &contents, format, kind)?;
    debug!(
        path = %path.display(),
        kind = kind.key(),
        count = values.len(),
        "loaded record source"
    );
    let records = values.into_iter().map(T::from).collect::<Vec<_>>();
    for (index, issue) in record_issues(&records) {
        warn!(
            path = %path.display(),
            index,
            code = issue.code,
            "{}",
            issue.message
        );
    }
    Ok(records)
}

/// Validation issues of each record, keyed by its position in the source.
pub fn record_issues<T: Validate>(records: &[T]) -> Vec<(usize, ValidationIssue)> {
    records
        .iter()
        .enumerate()
        .flat_map(|(index, record)| {
            record
                .validate()
                .into_iter()
                .map(move |issue| (index, issue))
        })
        .collect()
}

pub fn load_records_or_empty<T>(path: &Path, kind: CollectionKind) -> LoadedCollection<T>
where
    T: From<Value> + Validate,
{
    match load_records(path, kind) {
        Ok(records) => LoadedCollection {
            records,
            load_error: None,
        },
        Err(err) => {
            error!(
                path = %path.display(),
                kind = kind.key(),
                error = %err,
                "failed to load records"
            );
            LoadedCollection {
                records: Vec::new(),
                load_error: Some(err.to_string()),
            }
        }
    }
}

fn parse_values(
    path: &Path,
    contents: &str,
    format: SourceFormat,
    kind: CollectionKind,
) -> Result<Vec<Value>, SourceError> {
    match format {
        SourceFormat::Json => {
            let value: Value =
                serde_json::from_str(contents).map_err(|source| SourceError::ParseJson {
                    path: path.to_path_buf(),
                    source,
                })?;
            unwrap_collection(path, value, kind)
        }
        SourceFormat::JsonLines => parse_json_lines(path, contents),
        SourceFormat::Toml => {
            let table: toml::Table =
                toml::from_str(contents).map_err(|source| SourceError::ParseToml {
                    path: path.to_path_buf(),
                    source,
                })?;
            // TOML tables always convert; Null only surfaces as MissingCollection.
            let value = serde_json::to_value(table).unwrap_or(Value::Null);
            unwrap_collection(path, value, kind)
        }
    }
}

fn parse_json_lines(path: &Path, contents: &str) -> Result<Vec<Value>, SourceError> {
    let mut values = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let value = serde_json::from_str(line).map_err(|source| SourceError::ParseJsonLine {
            path: path.to_path_buf(),
            line: index + 1,
            source,
        })?;
        values.push(value);
    }
    Ok(values)
}

fn unwrap_collection(
    path: &Path,
    value: Value,
    kind: CollectionKind,
) -> Result<Vec<Value>, SourceError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove(kind.key()) {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(SourceError::MissingCollection {
                path: path.to_path_buf(),
                key: kind.key(),
            }),
        },
        _ => Err(SourceError::MissingCollection {
            path: path.to_path_buf(),
            key: kind.key(),
        }),
    }
}
