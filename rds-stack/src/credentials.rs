//! Generated master credentials
//!
//! Credentials are always generated by the secrets backend and stored in a
//! secret. No constructor takes a password.

use crate::error::{StackError, StackResult};
use crate::template::{join, reference, Resource, AWS_STACK_NAME};
use serde_json::{json, Value};
use std::collections::BTreeSet;

pub const SECRET_RESOURCE_TYPE: &str = "AWS::SecretsManager::Secret";
pub const ATTACHMENT_RESOURCE_TYPE: &str = "AWS::SecretsManager::SecretTargetAttachment";

const PASSWORD_KEY: &str = "password";
const PASSWORD_LENGTH: u32 = 30;
/// Characters RDS rejects in master passwords, plus shell-hostile ones
const EXCLUDE_CHARACTERS: &str = " %+~`#$&*()|[]{}:;<>?!'/@\"\\";
const MAX_SECRET_NAME_LEN: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub secret_name: Option<String>,
}

impl Credentials {
    pub fn from_generated_secret(username: &str, secret_name: &str) -> Self {
        Self {
            username: username.to_string(),
            secret_name: Some(secret_name.to_string()),
        }
    }

    /// Generated secret with a backend-assigned name
    pub fn from_username(username: &str) -> Self {
        Self {
            username: username.to_string(),
            secret_name: None,
        }
    }

    /// Check the secret name shape and that it is not already taken.
    pub fn validate(&self, existing_secrets: &BTreeSet<String>) -> StackResult<()> {
        let Some(name) = &self.secret_name else {
            return Ok(());
        };

        let invalid = |reason: &str| StackError::InvalidSecretName {
            name: name.clone(),
            reason: reason.to_string(),
        };

        if name.is_empty() || name.len() > MAX_SECRET_NAME_LEN {
            return Err(invalid("must be 1 to 512 characters"));
        }
        if let Some(c) = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || "/_+=.@-".contains(*c)))
        {
            return Err(invalid(&format!("character {:?} is not allowed", c)));
        }
        if existing_secrets.contains(name) {
            return Err(StackError::SecretNameConflict { name: name.clone() });
        }

        Ok(())
    }

    pub fn to_secret_resource(&self, path: &str) -> Resource {
        let template = json!({ "username": self.username }).to_string();
        let mut resource = Resource::new(SECRET_RESOURCE_TYPE, path)
            .property(
                "Description",
                join(
                    "",
                    vec![json!("Generated database credentials for stack: "), reference(AWS_STACK_NAME)],
                ),
            )
            .property(
                "GenerateSecretString",
                json!({
                    "ExcludeCharacters": EXCLUDE_CHARACTERS,
                    "GenerateStringKey": PASSWORD_KEY,
                    "PasswordLength": PASSWORD_LENGTH,
                    "SecretStringTemplate": template,
                }),
            );
        if let Some(name) = &self.secret_name {
            resource = resource.property("Name", json!(name));
        }
        resource
    }
}

/// Resource binding a secret to the instance it describes.
pub fn attachment_resource(path: &str, secret_id: &str, instance_id: &str) -> Resource {
    Resource::new(ATTACHMENT_RESOURCE_TYPE, path)
        .property("SecretId", reference(secret_id))
        .property("TargetId", reference(instance_id))
        .property("TargetType", json!("AWS::RDS::DBInstance"))
}

/// Dynamic reference resolving one field of the secret at deploy time.
pub fn resolve_field(secret_id: &str, field: &str) -> Value {
    join(
        "",
        vec![
            json!("{{resolve:secretsmanager:"),
            reference(secret_id),
            json!(format!(":SecretString:{}::}}}}", field)),
        ],
    )
}
