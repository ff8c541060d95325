//! Descriptive tags
//!
//! Tags are applied after resources are declared, to every taggable
//! resource under a construct scope.

use crate::template::Template;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// Resource types that accept a `Tags` property
const TAGGABLE_TYPES: &[&str] = &[
    "AWS::RDS::DBInstance",
    "AWS::RDS::DBSubnetGroup",
    "AWS::RDS::DBParameterGroup",
    "AWS::EC2::SecurityGroup",
    "AWS::IAM::Role",
    "AWS::SecretsManager::Secret",
];

pub const MANAGED_BY: &str = "CDK";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags {
    entries: BTreeMap<String, String>,
}

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inventory tags for the database instance
    pub fn database_defaults() -> Self {
        Self::new()
            .add("Name", "MySQL-RDS-Instance")
            .add("Environment", "Development")
            .add("Project", "RDS-Exercise")
            .add("ManagedBy", MANAGED_BY)
    }

    /// Add a tag; an existing key is overwritten.
    pub fn add(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `[{Key, Value}]`, sorted by key
    pub fn to_value(&self) -> Value {
        Value::Array(
            self.entries
                .iter()
                .map(|(k, v)| json!({ "Key": k, "Value": v }))
                .collect(),
        )
    }

    /// Tag every taggable resource declared under `scope`.
    ///
    /// Tags already present on a resource are kept unless overridden here.
    /// Returns the logical ids that were tagged.
    pub fn apply(&self, template: &mut Template, scope: &str) -> Vec<String> {
        let mut tagged = Vec::new();
        for (logical_id, resource) in template.resources_in_scope_mut(scope) {
            if !TAGGABLE_TYPES.contains(&resource.resource_type.as_str()) {
                continue;
            }

            let mut merged = resource
                .properties
                .get("Tags")
                .map(Self::from_value)
                .unwrap_or_default();
            merged.entries.extend(self.entries.clone());
            resource
                .properties
                .insert("Tags".to_string(), merged.to_value());

            debug!(logical_id = %logical_id, tags = self.len(), "Applied tags");
            tagged.push(logical_id.clone());
        }
        tagged
    }

    fn from_value(value: &Value) -> Self {
        let entries = value
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| {
                        Some((
                            item.get("Key")?.as_str()?.to_string(),
                            item.get("Value")?.as_str()?.to_string(),
                        ))
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::Resource;

    #[test]
    fn test_default_tags() {
        let tags = Tags::database_defaults();
        let keys: Vec<&str> = tags.keys().collect();
        assert_eq!(keys, vec!["Environment", "ManagedBy", "Name", "Project"]);
        assert_eq!(tags.get("Name"), Some("MySQL-RDS-Instance"));
        assert_eq!(tags.get("Environment"), Some("Development"));
        assert_eq!(tags.get("Project"), Some("RDS-Exercise"));
        assert_eq!(tags.get("ManagedBy"), Some("CDK"));
    }

    #[test]
    fn test_add_overwrites_instead_of_duplicating() {
        let tags = Tags::database_defaults().add("Environment", "Staging");
        assert_eq!(tags.len(), 4);
        assert_eq!(tags.get("Environment"), Some("Staging"));
    }

    #[test]
    fn test_apply_only_to_taggable_resources_in_scope() {
        let mut template = Template::new("test");
        template.add_resource("Db", Resource::new("AWS::RDS::DBInstance", "S/Db/Resource"));
        template.add_resource(
            "Attachment",
            Resource::new(
                "AWS::SecretsManager::SecretTargetAttachment",
                "S/Db/Secret/Attachment/Resource",
            ),
        );
        template.add_resource(
            "Other",
            Resource::new("AWS::RDS::DBSubnetGroup", "S/Group/Default"),
        );

        let tagged = Tags::database_defaults().apply(&mut template, "S/Db");
        assert_eq!(tagged, vec!["Db"]);
        assert_eq!(
            template.resources["Db"].properties["Tags"]
                .as_array()
                .unwrap()
                .len(),
            4
        );
        assert!(!template.resources["Attachment"].properties.contains_key("Tags"));
        assert!(!template.resources["Other"].properties.contains_key("Tags"));
    }

    #[test]
    fn test_apply_merges_existing_tags() {
        let mut template = Template::new("test");
        template.add_resource(
            "Db",
            Resource::new("AWS::RDS::DBInstance", "S/Db/Resource")
                .property("Tags", json!([{"Key": "Owner", "Value": "dba"}])),
        );
        Tags::new().add("Name", "db").apply(&mut template, "S/Db");
        assert_eq!(
            template.resources["Db"].properties["Tags"],
            json!([{"Key": "Name", "Value": "db"}, {"Key": "Owner", "Value": "dba"}])
        );
    }
}
