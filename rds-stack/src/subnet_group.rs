//! Subnet grouping for the database instance

use crate::network::SubnetPartition;
use crate::template::Resource;
use serde_json::json;

pub const RESOURCE_TYPE: &str = "AWS::RDS::DBSubnetGroup";

/// Subnets the instance may be placed in, drawn from one partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetGroup {
    description: String,
    subnet_ids: Vec<String>,
}

impl SubnetGroup {
    pub fn from_partition(partition: &SubnetPartition) -> Self {
        Self {
            description: format!(
                "Subnet group for RDS database - uses {} subnets from existing VPC",
                partition.name
            ),
            subnet_ids: partition.subnet_ids(),
        }
    }

    pub fn subnet_ids(&self) -> &[String] {
        &self.subnet_ids
    }

    pub fn to_resource(&self, path: &str) -> Resource {
        Resource::new(RESOURCE_TYPE, path)
            .property("DBSubnetGroupDescription", json!(self.description))
            .property("SubnetIds", json!(self.subnet_ids))
    }
}
