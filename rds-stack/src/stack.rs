//! Database provisioning descriptor
//!
//! Composes the subnet group, parameter group, credentials, instance, tags
//! and outputs into one template.

use crate::credentials::attachment_resource;
use crate::error::StackResult;
use crate::instance::{
    monitoring_role_resource, security_group_resource, DatabaseInstanceProps, InstanceBindings,
};
use crate::network::{NetworkContext, DATABASE_PARTITION};
use crate::outputs::{DatabaseInstanceRef, OutputSet};
use crate::parameter_group::ParameterGroup;
use crate::subnet_group::SubnetGroup;
use crate::tags::Tags;
use crate::template::{logical_id, Resource, Template};
use common::SynthEvent;
use std::collections::BTreeSet;
use tracing::{info, instrument};

pub const DEFAULT_STACK_NAME: &str = "RDSStack";

const SUBNET_GROUP: &str = "DatabaseSubnetGroup";
const PARAMETER_GROUP: &str = "DatabaseParameterGroup";
const INSTANCE: &str = "MySQLDatabase";

const DESCRIPTION: &str = "RDS MySQL database placed in the Database subnets of an existing VPC";

/// Result of materializing the descriptor
#[derive(Debug, Clone)]
pub struct Materialized {
    pub instance: DatabaseInstanceRef,
    pub outputs: OutputSet,
    pub template: Template,
}

#[derive(Debug, Clone)]
pub struct RdsStack {
    pub name: String,
    pub subnet_partition: String,
    pub instance: DatabaseInstanceProps,
    pub tags: Tags,
    existing_secrets: BTreeSet<String>,
}

impl Default for RdsStack {
    fn default() -> Self {
        Self::new(DEFAULT_STACK_NAME)
    }
}

impl RdsStack {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            subnet_partition: DATABASE_PARTITION.to_string(),
            instance: DatabaseInstanceProps::default(),
            tags: Tags::database_defaults(),
            existing_secrets: BTreeSet::new(),
        }
    }

    /// Secret names already taken in the target account.
    pub fn with_existing_secrets(mut self, names: BTreeSet<String>) -> Self {
        self.existing_secrets = names;
        self
    }

    fn path(&self, components: &[&str]) -> String {
        format!("{}/{}", self.name, components.join("/"))
    }

    fn declare(&self, template: &mut Template, components: &[&str], resource: Resource) -> String {
        let id = logical_id(components);
        SynthEvent::ResourceDeclared {
            logical_id: id.clone(),
            resource_type: resource.resource_type.clone(),
        }
        .emit();
        template.add_resource(&id, resource);
        id
    }

    /// Turn the descriptor into a template for `network`.
    ///
    /// Validation runs first; on error nothing is declared. The result is
    /// deterministic, so repeated calls with the same inputs are identical.
    #[instrument(skip_all, fields(stack = %self.name, vpc = %network.vpc_id))]
    pub fn materialize(&self, network: &NetworkContext) -> StackResult<Materialized> {
        let partition = network.select_database_subnets(&self.subnet_partition)?;
        self.instance.validate(&self.existing_secrets)?;

        let mut template = Template::new(DESCRIPTION);

        let subnet_group_path = [SUBNET_GROUP, "Default"];
        let subnet_group_id = self.declare(
            &mut template,
            &subnet_group_path,
            SubnetGroup::from_partition(partition).to_resource(&self.path(&subnet_group_path)),
        );

        let parameter_group_path = [PARAMETER_GROUP, "Resource"];
        let parameter_group_id = self.declare(
            &mut template,
            &parameter_group_path,
            ParameterGroup::tuned_for(self.instance.engine)
                .to_resource(&self.path(&parameter_group_path)),
        );

        let security_group_path = [INSTANCE, "SecurityGroup", "Resource"];
        let security_group_id = self.declare(
            &mut template,
            &security_group_path,
            security_group_resource(&self.path(&security_group_path), &network.vpc_id, INSTANCE),
        );

        let monitoring_role_id = if self.instance.has_enhanced_monitoring() {
            let role_path = [INSTANCE, "MonitoringRole", "Resource"];
            Some(self.declare(
                &mut template,
                &role_path,
                monitoring_role_resource(&self.path(&role_path)),
            ))
        } else {
            None
        };

        let secret_path = [INSTANCE, "Secret", "Resource"];
        let mut secret = self
            .instance
            .credentials
            .to_secret_resource(&self.path(&secret_path));
        self.instance.removal_policy.for_secret().apply(&mut secret);
        let secret_id = self.declare(&mut template, &secret_path, secret);

        let instance_path = [INSTANCE, "Resource"];
        let instance_id = self.declare(
            &mut template,
            &instance_path,
            self.instance.to_resource(
                &self.path(&instance_path),
                &InstanceBindings {
                    subnet_group_id: &subnet_group_id,
                    parameter_group_id: &parameter_group_id,
                    security_group_id: &security_group_id,
                    monitoring_role_id: monitoring_role_id.as_deref(),
                    secret_id: &secret_id,
                },
            ),
        );

        let attachment_path = [INSTANCE, "Secret", "Attachment", "Resource"];
        let attachment_id = self.declare(
            &mut template,
            &attachment_path,
            attachment_resource(&self.path(&attachment_path), &secret_id, &instance_id),
        );

        let tagged = self.tags.apply(&mut template, &self.path(&[INSTANCE]));
        info!(resources = tagged.len(), tags = self.tags.len(), "Tagged instance resources");

        let instance = DatabaseInstanceRef {
            logical_id: instance_id,
            secret_id: Some(attachment_id),
        };
        let outputs = OutputSet::derive(&instance);
        outputs.add_to(&mut template);

        info!(
            resources = template.resources.len(),
            outputs = outputs.len(),
            "Materialized stack"
        );

        Ok(Materialized {
            instance,
            outputs,
            template,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StackError;
    use crate::network::{Subnet, SubnetKind, SubnetPartition};

    fn network() -> NetworkContext {
        NetworkContext {
            vpc_id: "vpc-0a1b2c3d".to_string(),
            subnet_groups: vec![SubnetPartition {
                name: "Database".to_string(),
                kind: SubnetKind::Isolated,
                subnets: vec![
                    Subnet {
                        subnet_id: "subnet-db-a".to_string(),
                        availability_zone: "us-east-1a".to_string(),
                        cidr_block: None,
                    },
                    Subnet {
                        subnet_id: "subnet-db-b".to_string(),
                        availability_zone: "us-east-1b".to_string(),
                        cidr_block: None,
                    },
                ],
            }],
        }
    }

    #[test]
    fn test_materialize_declares_expected_resources() {
        let materialized = RdsStack::default().materialize(&network()).unwrap();
        let mut types: Vec<&str> = materialized
            .template
            .resources
            .values()
            .map(|r| r.resource_type.as_str())
            .collect();
        types.sort();
        assert_eq!(
            types,
            vec![
                "AWS::EC2::SecurityGroup",
                "AWS::IAM::Role",
                "AWS::RDS::DBInstance",
                "AWS::RDS::DBParameterGroup",
                "AWS::RDS::DBSubnetGroup",
                "AWS::SecretsManager::Secret",
                "AWS::SecretsManager::SecretTargetAttachment",
            ]
        );
        assert_eq!(materialized.outputs.len(), 4);
    }

    #[test]
    fn test_instance_wires_declared_ids() {
        let materialized = RdsStack::default().materialize(&network()).unwrap();
        let template = &materialized.template;
        let instance = &template.resources[&materialized.instance.logical_id];
        let subnet_group_ref = instance.properties["DBSubnetGroupName"]["Ref"]
            .as_str()
            .unwrap();
        assert_eq!(
            template.resources[subnet_group_ref].resource_type,
            "AWS::RDS::DBSubnetGroup"
        );
        let sg = &template.resources
            [instance.properties["VPCSecurityGroups"][0]["Fn::GetAtt"][0].as_str().unwrap()];
        assert_eq!(sg.properties["VpcId"], "vpc-0a1b2c3d");
    }

    #[test]
    fn test_missing_partition_fails_before_declaring() {
        let mut network = network();
        network.subnet_groups[0].name = "Private".to_string();
        let err = RdsStack::default().materialize(&network).unwrap_err();
        assert_eq!(
            err,
            StackError::MissingSubnetPartition {
                name: "Database".to_string()
            }
        );
    }

    #[test]
    fn test_secret_conflict_fails() {
        let stack = RdsStack::default()
            .with_existing_secrets(["rds-mysql-credentials".to_string()].into());
        assert!(matches!(
            stack.materialize(&network()),
            Err(StackError::SecretNameConflict { .. })
        ));
    }

    #[test]
    fn test_secret_follows_removal_policy() {
        let materialized = RdsStack::default().materialize(&network()).unwrap();
        let secret = materialized
            .template
            .resources
            .values()
            .find(|r| r.resource_type == "AWS::SecretsManager::Secret")
            .unwrap();
        assert_eq!(secret.deletion_policy.as_deref(), Some("Delete"));
    }

    #[test]
    fn test_stack_name_prefixes_paths() {
        let materialized = RdsStack::new("Prod").materialize(&network()).unwrap();
        assert!(materialized
            .template
            .resources
            .values()
            .all(|r| r.path().unwrap().starts_with("Prod/")));
    }
}
