//! Exported stack outputs
//!
//! The four exports are derived purely from the instance reference.

use crate::template::{get_att, reference, Export, Output, Template};
use serde_json::{json, Value};

/// Literal exported when the instance has no generated secret
pub const NO_SECRET: &str = "N/A";

pub const ENDPOINT_EXPORT: &str = "RDS-MySQL-Endpoint";
pub const PORT_EXPORT: &str = "RDS-MySQL-Port";
pub const SECRET_ARN_EXPORT: &str = "RDS-MySQL-Secret-ARN";
pub const IDENTIFIER_EXPORT: &str = "RDS-MySQL-Identifier";

/// Handle to a declared database instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseInstanceRef {
    pub logical_id: String,
    /// Logical id whose `Ref` yields the secret ARN
    pub secret_id: Option<String>,
}

impl DatabaseInstanceRef {
    pub fn endpoint_address(&self) -> Value {
        get_att(&self.logical_id, "Endpoint.Address")
    }

    /// Already a string in CloudFormation
    pub fn endpoint_port(&self) -> Value {
        get_att(&self.logical_id, "Endpoint.Port")
    }

    pub fn instance_identifier(&self) -> Value {
        reference(&self.logical_id)
    }

    pub fn secret_arn(&self) -> Option<Value> {
        self.secret_id.as_deref().map(reference)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StackOutput {
    pub logical_id: &'static str,
    pub export_name: &'static str,
    pub description: &'static str,
    pub value: Value,
}

impl StackOutput {
    fn to_output(&self) -> Output {
        Output {
            description: Some(self.description.to_string()),
            value: self.value.clone(),
            export: Some(Export {
                name: self.export_name.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutputSet {
    outputs: Vec<StackOutput>,
}

impl OutputSet {
    pub fn derive(instance: &DatabaseInstanceRef) -> Self {
        let outputs = vec![
            StackOutput {
                logical_id: "DatabaseEndpoint",
                export_name: ENDPOINT_EXPORT,
                description: "RDS MySQL instance endpoint hostname",
                value: instance.endpoint_address(),
            },
            StackOutput {
                logical_id: "DatabasePort",
                export_name: PORT_EXPORT,
                description: "RDS MySQL instance port",
                value: instance.endpoint_port(),
            },
            StackOutput {
                logical_id: "DatabaseSecretArn",
                export_name: SECRET_ARN_EXPORT,
                description: "ARN of the secret containing database credentials",
                value: instance.secret_arn().unwrap_or_else(|| json!(NO_SECRET)),
            },
            StackOutput {
                logical_id: "DatabaseIdentifier",
                export_name: IDENTIFIER_EXPORT,
                description: "RDS instance identifier",
                value: instance.instance_identifier(),
            },
        ];
        Self { outputs }
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StackOutput> {
        self.outputs.iter()
    }

    pub fn by_export(&self, export_name: &str) -> Option<&StackOutput> {
        self.outputs.iter().find(|o| o.export_name == export_name)
    }

    pub fn add_to(&self, template: &mut Template) {
        for output in &self.outputs {
            template.add_output(output.logical_id, output.to_output());
        }
    }
}
