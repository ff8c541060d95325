//! Network context the database is placed into
//!
//! The VPC is owned elsewhere. This module only describes what the stack
//! needs from it: the VPC id and its labeled subnet partitions.

use crate::error::{StackError, StackResult};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Partition name the database subnets are taken from.
pub const DATABASE_PARTITION: &str = "Database";

/// Traffic tier of a subnet partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubnetKind {
    Public,
    Private,
    Isolated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subnet {
    pub subnet_id: String,
    pub availability_zone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cidr_block: Option<String>,
}

/// A labeled group of subnets within the VPC
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetPartition {
    pub name: String,
    pub kind: SubnetKind,
    #[serde(default)]
    pub subnets: Vec<Subnet>,
}

impl SubnetPartition {
    pub fn subnet_ids(&self) -> Vec<String> {
        self.subnets.iter().map(|s| s.subnet_id.clone()).collect()
    }

    /// Distinct availability zones covered by this partition.
    pub fn availability_zones(&self) -> BTreeSet<&str> {
        self.subnets
            .iter()
            .map(|s| s.availability_zone.as_str())
            .collect()
    }
}

/// Reference to an existing VPC and its partitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkContext {
    pub vpc_id: String,
    #[serde(default)]
    pub subnet_groups: Vec<SubnetPartition>,
}

impl NetworkContext {
    /// Find a partition by its literal name.
    pub fn partition(&self, name: &str) -> Option<&SubnetPartition> {
        self.subnet_groups.iter().find(|g| g.name == name)
    }

    /// Resolve a partition usable for database placement.
    ///
    /// The partition must exist, hold at least one subnet and not be public.
    pub fn select_database_subnets(&self, name: &str) -> StackResult<&SubnetPartition> {
        let partition = self
            .partition(name)
            .ok_or_else(|| StackError::MissingSubnetPartition {
                name: name.to_string(),
            })?;

        if partition.subnets.is_empty() {
            return Err(StackError::EmptySubnetPartition {
                name: name.to_string(),
            });
        }

        if partition.kind == SubnetKind::Public {
            return Err(StackError::PublicSubnetPartition {
                name: name.to_string(),
            });
        }

        let zones = partition.availability_zones();
        if zones.len() < 2 {
            warn!(
                partition = %name,
                zones = ?zones,
                "Database partition spans a single availability zone"
            );
        }

        debug!(partition = %name, subnets = partition.subnets.len(), "Selected database subnets");
        Ok(partition)
    }
}

/// Everything read from the context file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextFile {
    pub network: NetworkContext,
    /// Secret names already present in the target account
    #[serde(default)]
    pub existing_secrets: Vec<String>,
}

impl ContextFile {
    /// Parse a context document. YAML is a superset of JSON, so both work.
    pub fn parse(content: &str) -> Result<Self> {
        let context: ContextFile =
            serde_yaml::from_str(content).context("Failed to parse network context")?;

        let mut seen = HashSet::new();
        for group in &context.network.subnet_groups {
            if !seen.insert(group.name.as_str()) {
                anyhow::bail!("Duplicate subnet partition name: {}", group.name);
            }
        }

        Ok(context)
    }

    /// Read and parse a context file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read context file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid context file {}", path.display()))
    }

    pub fn existing_secret_names(&self) -> BTreeSet<String> {
        self.existing_secrets.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTEXT: &str = r#"
network:
  vpc_id: vpc-0a1b2c3d
  subnet_groups:
    - name: Public
      kind: public
      subnets:
        - subnet_id: subnet-pub-a
          availability_zone: us-east-1a
    - name: Database
      kind: isolated
      subnets:
        - subnet_id: subnet-db-a
          availability_zone: us-east-1a
          cidr_block: 10.0.4.0/24
        - subnet_id: subnet-db-b
          availability_zone: us-east-1b
existing_secrets:
  - other-app-credentials
"#;

    #[test]
    fn test_parse_yaml_context() {
        let context = ContextFile::parse(CONTEXT).unwrap();
        assert_eq!(context.network.vpc_id, "vpc-0a1b2c3d");
        assert_eq!(context.network.subnet_groups.len(), 2);
        assert!(context
            .existing_secret_names()
            .contains("other-app-credentials"));
    }

    #[test]
    fn test_parse_json_context() {
        let json = r#"{"network": {"vpc_id": "vpc-1", "subnet_groups": [
            {"name": "Database", "kind": "private",
             "subnets": [{"subnet_id": "subnet-1", "availability_zone": "eu-west-1a"}]}
        ]}}"#;
        let context = ContextFile::parse(json).unwrap();
        assert!(context.existing_secrets.is_empty());
        assert_eq!(
            context.network.partition("Database").unwrap().kind,
            SubnetKind::Private
        );
    }

    #[test]
    fn test_duplicate_partition_names_rejected() {
        let yaml = r#"
network:
  vpc_id: vpc-1
  subnet_groups:
    - name: Database
      kind: isolated
    - name: Database
      kind: private
"#;
        assert!(ContextFile::parse(yaml).is_err());
    }

    #[test]
    fn test_select_database_subnets() {
        let context = ContextFile::parse(CONTEXT).unwrap();
        let partition = context
            .network
            .select_database_subnets(DATABASE_PARTITION)
            .unwrap();
        assert_eq!(partition.subnet_ids(), vec!["subnet-db-a", "subnet-db-b"]);
        assert_eq!(partition.availability_zones().len(), 2);
    }

    #[test]
    fn test_select_missing_partition() {
        let context = ContextFile::parse(CONTEXT).unwrap();
        let err = context.network.select_database_subnets("Data").unwrap_err();
        assert_eq!(
            err,
            StackError::MissingSubnetPartition {
                name: "Data".to_string()
            }
        );
    }

    #[test]
    fn test_select_public_partition_rejected() {
        let mut context = ContextFile::parse(CONTEXT).unwrap();
        context.network.subnet_groups[0].name = "Database".to_string();
        context.network.subnet_groups.remove(1);
        assert!(matches!(
            context.network.select_database_subnets(DATABASE_PARTITION),
            Err(StackError::PublicSubnetPartition { .. })
        ));
    }

    #[test]
    fn test_select_empty_partition_rejected() {
        let network = NetworkContext {
            vpc_id: "vpc-1".to_string(),
            subnet_groups: vec![SubnetPartition {
                name: DATABASE_PARTITION.to_string(),
                kind: SubnetKind::Isolated,
                subnets: vec![],
            }],
        };
        assert!(matches!(
            network.select_database_subnets(DATABASE_PARTITION),
            Err(StackError::EmptySubnetPartition { .. })
        ));
    }
}
