//! Test case and requirement records as they cross the engine boundary.
//!
//! Records arrive as loosely typed JSON mappings. Deserialization is total:
//! any JSON value becomes a record, absent or non-string attributes read as
//! the empty string, and entries that are not mappings at all become
//! all-empty records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The attributes a test case is compared on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    Name,
    Description,
    Inputs,
    Outputs,
    RequirementMapping,
}

impl Attribute {
    pub const ALL: [Attribute; 5] = [
        Attribute::Name,
        Attribute::Description,
        Attribute::Inputs,
        Attribute::Outputs,
        Attribute::RequirementMapping,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Attribute::Name => "name",
            Attribute::Description => "description",
            Attribute::Inputs => "inputs",
            Attribute::Outputs => "outputs",
            Attribute::RequirementMapping => "requirement_mapping",
        }
    }
}

impl std::str::FromStr for Attribute {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "name" => Ok(Attribute::Name),
            "description" => Ok(Attribute::Description),
            "inputs" => Ok(Attribute::Inputs),
            "outputs" => Ok(Attribute::Outputs),
            "requirement_mapping" => Ok(Attribute::RequirementMapping),
            other => Err(format!(
                "invalid attribute '{other}'. valid values: name, description, inputs, outputs, requirement_mapping"
            )),
        }
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A test case supplied by a caller. Never mutated by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct TestCaseRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inputs: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirement_mapping: Option<String>,
}

impl TestCaseRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_inputs(mut self, inputs: impl Into<String>) -> Self {
        self.inputs = Some(inputs.into());
        self
    }

    pub fn with_outputs(mut self, outputs: impl Into<String>) -> Self {
        self.outputs = Some(outputs.into());
        self
    }

    pub fn with_requirement_mapping(mut self, mapping: impl Into<String>) -> Self {
        self.requirement_mapping = Some(mapping.into());
        self
    }

    /// Raw text of an attribute; absent attributes read as `""`.
    pub fn attribute(&self, attribute: Attribute) -> &str {
        match attribute {
            Attribute::Name => &self.name,
            Attribute::Description => self.description.as_deref().unwrap_or_default(),
            Attribute::Inputs => self.inputs.as_deref().unwrap_or_default(),
            Attribute::Outputs => self.outputs.as_deref().unwrap_or_default(),
            Attribute::RequirementMapping => {
                self.requirement_mapping.as_deref().unwrap_or_default()
            }
        }
    }
}

impl From<Value> for TestCaseRecord {
    fn from(value: Value) -> Self {
        let Some(map) = record_map(&value, "test case") else {
            return Self::default();
        };
        Self {
            id: id_field(map.get("id")),
            name: text_field(map.get("name")).unwrap_or_default(),
            description: text_field(map.get("description")),
            inputs: text_field(map.get("inputs")),
            outputs: text_field(map.get("outputs")),
            requirement_mapping: text_field(map.get("requirement_mapping")),
        }
    }
}

/// A functional requirement supplied by a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct RequirementRecord {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl RequirementRecord {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
        }
    }
}

impl From<Value> for RequirementRecord {
    fn from(value: Value) -> Self {
        let Some(map) = record_map(&value, "requirement") else {
            return Self::default();
        };
        Self {
            id: id_field(map.get("id")).unwrap_or_default(),
            name: text_field(map.get("name")).unwrap_or_default(),
            description: text_field(map.get("description")).unwrap_or_default(),
        }
    }
}

fn record_map<'a>(value: &'a Value, kind: &'static str) -> Option<&'a Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        other => {
            tracing::warn!(
                record_kind = kind,
                value_kind = json_kind(other),
                "entry is not a record; treating every attribute as empty"
            );
            None
        }
    }
}

fn text_field(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(text)) => Some(text.clone()),
        _ => None,
    }
}

fn id_field(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(text)) => Some(text.clone()),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
