//! CloudFormation template model
//!
//! A minimal typed view of a template: resources and outputs keyed by
//! logical id, kept in ordered maps so serialization is stable.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

pub const FORMAT_VERSION: &str = "2010-09-09";

/// Metadata key holding the construct path of a resource.
pub const PATH_METADATA_KEY: &str = "rds-stack:path";

/// Pseudo parameters
pub const AWS_PARTITION: &str = "AWS::Partition";
pub const AWS_STACK_NAME: &str = "AWS::StackName";

const MAX_HUMAN_LEN: usize = 240;

/// `{"Ref": id}`
pub fn reference(logical_id: &str) -> Value {
    json!({ "Ref": logical_id })
}

/// `{"Fn::GetAtt": [id, attribute]}`
pub fn get_att(logical_id: &str, attribute: &str) -> Value {
    json!({ "Fn::GetAtt": [logical_id, attribute] })
}

/// `{"Fn::Join": [delimiter, parts]}`
pub fn join(delimiter: &str, parts: Vec<Value>) -> Value {
    json!({ "Fn::Join": [delimiter, parts] })
}

/// Derive a logical id from a construct path (stack name excluded).
///
/// Single-component paths are used verbatim. Longer paths become the
/// alphanumeric concatenation of their components (dropping the `Resource`
/// and `Default` leaf names) followed by the first 8 hex digits of the
/// SHA-256 of the full path, so sibling names cannot collide.
pub fn logical_id(path: &[&str]) -> String {
    if let [single] = path {
        return single.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    }

    let mut human: String = path
        .iter()
        .filter(|c| !matches!(**c, "Resource" | "Default"))
        .flat_map(|c| c.chars().filter(|ch| ch.is_ascii_alphanumeric()))
        .collect();
    human.truncate(MAX_HUMAN_LEN);

    let digest = Sha256::digest(path.join("/").as_bytes());
    format!("{}{}", human, hex::encode_upper(&digest[..4]))
}

/// Serialization format of a template file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateFormat {
    Json,
    Yaml,
}

impl TemplateFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

impl FromStr for TemplateFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => anyhow::bail!("Unknown template format: {} (expected json or yaml)", other),
        }
    }
}

impl fmt::Display for TemplateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Resource {
    #[serde(rename = "Type")]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_replace_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,
}

impl Resource {
    pub fn new(resource_type: &str, path: &str) -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert(PATH_METADATA_KEY.to_string(), json!(path));
        Self {
            resource_type: resource_type.to_string(),
            properties: BTreeMap::new(),
            deletion_policy: None,
            update_replace_policy: None,
            depends_on: Vec::new(),
            metadata,
        }
    }

    pub fn property(mut self, key: &str, value: Value) -> Self {
        self.properties.insert(key.to_string(), value);
        self
    }

    /// Construct path recorded at declaration time.
    pub fn path(&self) -> Option<&str> {
        self.metadata.get(PATH_METADATA_KEY).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Export {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Output {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub value: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export: Option<Export>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub format_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub resources: BTreeMap<String, Resource>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, Output>,
}

impl Template {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            format_version: FORMAT_VERSION.to_string(),
            description: Some(description.into()),
            resources: BTreeMap::new(),
            outputs: BTreeMap::new(),
        }
    }

    pub fn add_resource(&mut self, logical_id: &str, resource: Resource) {
        self.resources.insert(logical_id.to_string(), resource);
    }

    pub fn add_output(&mut self, logical_id: &str, output: Output) {
        self.outputs.insert(logical_id.to_string(), output);
    }

    /// Resources declared at or below `scope` (a construct path prefix).
    pub fn resources_in_scope_mut<'a>(
        &'a mut self,
        scope: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a mut Resource)> + 'a {
        self.resources.iter_mut().filter(move |(_, r)| {
            r.path()
                .map(|p| p == scope || p.starts_with(&format!("{}/", scope)))
                .unwrap_or(false)
        })
    }

    pub fn render(&self, format: TemplateFormat) -> Result<String> {
        match format {
            TemplateFormat::Json => {
                let mut out =
                    serde_json::to_string_pretty(self).context("Failed to render template")?;
                out.push('\n');
                Ok(out)
            }
            TemplateFormat::Yaml => {
                serde_yaml::to_string(self).context("Failed to render template")
            }
        }
    }

    pub fn parse(content: &str, format: TemplateFormat) -> Result<Self> {
        match format {
            TemplateFormat::Json => {
                serde_json::from_str(content).context("Failed to parse JSON template")
            }
            TemplateFormat::Yaml => {
                serde_yaml::from_str(content).context("Failed to parse YAML template")
            }
        }
    }
}
