//! Database instance descriptor
//!
//! Holds every attribute of the instance, validates them, and renders the
//! instance plus the resources it owns (security group, monitoring role).

use crate::credentials::{resolve_field, Credentials};
use crate::engine::{DatabaseEngine, InstanceClass, InstanceSize, InstanceType, MysqlEngineVersion};
use crate::error::{StackError, StackResult};
use crate::template::{get_att, join, reference, Resource, AWS_PARTITION};
use chrono::Duration;
use serde_json::json;
use std::collections::BTreeSet;

pub const RESOURCE_TYPE: &str = "AWS::RDS::DBInstance";
pub const SECURITY_GROUP_RESOURCE_TYPE: &str = "AWS::EC2::SecurityGroup";
pub const ROLE_RESOURCE_TYPE: &str = "AWS::IAM::Role";

pub const DEFAULT_SECRET_NAME: &str = "rds-mysql-credentials";
pub const DEFAULT_USERNAME: &str = "admin";

const MAX_BACKUP_RETENTION_DAYS: i64 = 35;
const MONITORING_INTERVALS: &[i64] = &[0, 1, 5, 10, 15, 30, 60];
const ENHANCED_MONITORING_POLICY: &str =
    ":iam::aws:policy/service-role/AmazonRDSEnhancedMonitoringRole";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    Standard,
    Gp2,
    Gp3,
    Io1,
}

impl StorageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Gp2 => "gp2",
            Self::Gp3 => "gp3",
            Self::Io1 => "io1",
        }
    }

    /// Smallest allocation the backend accepts, in GiB
    pub fn min_allocated_storage(&self) -> u32 {
        match self {
            Self::Standard => 5,
            Self::Gp2 | Self::Gp3 => 20,
            Self::Io1 => 100,
        }
    }
}

/// What happens to the underlying data when the descriptor is removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalPolicy {
    Destroy,
    Retain,
    Snapshot,
}

impl RemovalPolicy {
    pub fn deletion_policy(&self) -> &'static str {
        match self {
            Self::Destroy => "Delete",
            Self::Retain => "Retain",
            Self::Snapshot => "Snapshot",
        }
    }

    /// Secrets cannot be snapshotted; keep them instead.
    pub fn for_secret(&self) -> Self {
        match self {
            Self::Snapshot => Self::Retain,
            other => *other,
        }
    }

    pub fn apply(&self, resource: &mut Resource) {
        resource.deletion_policy = Some(self.deletion_policy().to_string());
        resource.update_replace_policy = Some(self.deletion_policy().to_string());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceInsightRetention {
    /// Free tier, 7 days
    Default,
    Months(u32),
    /// 2 years
    LongTerm,
}

impl PerformanceInsightRetention {
    pub fn days(&self) -> u32 {
        match self {
            Self::Default => 7,
            Self::Months(n) => n.saturating_mul(31),
            Self::LongTerm => 731,
        }
    }

    fn validate(&self) -> StackResult<()> {
        match self {
            Self::Months(n) if !(1..=23).contains(n) => {
                Err(StackError::InvalidPerformanceInsightsRetention { days: self.days() })
            }
            _ => Ok(()),
        }
    }
}

/// Every attribute of the database instance.
///
/// `Default` is the fixed descriptor this stack deploys.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseInstanceProps {
    pub engine: DatabaseEngine,
    pub instance_type: InstanceType,
    /// GiB
    pub allocated_storage: u32,
    /// Autoscaling ceiling in GiB; `None` disables storage autoscaling
    pub max_allocated_storage: Option<u32>,
    pub storage_type: StorageType,
    pub storage_encrypted: bool,
    pub credentials: Credentials,
    pub backup_retention: Duration,
    pub delete_automated_backups: bool,
    pub multi_az: bool,
    /// Zero disables enhanced monitoring
    pub monitoring_interval: Duration,
    pub enable_performance_insights: bool,
    pub performance_insight_retention: PerformanceInsightRetention,
    pub auto_minor_version_upgrade: bool,
    pub deletion_protection: bool,
    pub publicly_accessible: bool,
    pub copy_tags_to_snapshot: bool,
    pub removal_policy: RemovalPolicy,
}

impl Default for DatabaseInstanceProps {
    fn default() -> Self {
        Self {
            engine: DatabaseEngine::mysql(MysqlEngineVersion::VER_8_0_35),
            instance_type: InstanceType::of(InstanceClass::T3, InstanceSize::Micro),
            allocated_storage: 20,
            max_allocated_storage: Some(30),
            storage_type: StorageType::Gp2,
            storage_encrypted: true,
            credentials: Credentials::from_generated_secret(DEFAULT_USERNAME, DEFAULT_SECRET_NAME),
            backup_retention: Duration::days(7),
            delete_automated_backups: true,
            multi_az: false,
            monitoring_interval: Duration::seconds(60),
            enable_performance_insights: true,
            performance_insight_retention: PerformanceInsightRetention::Default,
            auto_minor_version_upgrade: true,
            deletion_protection: false,
            publicly_accessible: false,
            copy_tags_to_snapshot: true,
            removal_policy: RemovalPolicy::Destroy,
        }
    }
}

/// Logical ids of the resources the instance refers to
pub struct InstanceBindings<'a> {
    pub subnet_group_id: &'a str,
    pub parameter_group_id: &'a str,
    pub security_group_id: &'a str,
    pub monitoring_role_id: Option<&'a str>,
    pub secret_id: &'a str,
}

impl DatabaseInstanceProps {
    pub fn has_enhanced_monitoring(&self) -> bool {
        self.monitoring_interval.num_seconds() > 0
    }

    /// Check every attribute against what the backend accepts.
    pub fn validate(&self, existing_secrets: &BTreeSet<String>) -> StackResult<()> {
        self.engine.validate()?;

        let min = self.storage_type.min_allocated_storage();
        if self.allocated_storage < min {
            return Err(StackError::StorageTooSmall {
                allocated: self.allocated_storage,
                min,
                storage_type: self.storage_type.as_str().to_string(),
            });
        }
        if let Some(max) = self.max_allocated_storage {
            if max < self.allocated_storage {
                return Err(StackError::StorageCeilingBelowInitial {
                    allocated: self.allocated_storage,
                    max,
                });
            }
        }

        let days = self.backup_retention.num_days();
        if !(0..=MAX_BACKUP_RETENTION_DAYS).contains(&days) {
            return Err(StackError::InvalidBackupRetention { days });
        }

        let seconds = self.monitoring_interval.num_seconds();
        if !MONITORING_INTERVALS.contains(&seconds) {
            return Err(StackError::InvalidMonitoringInterval { seconds });
        }

        if self.enable_performance_insights {
            self.performance_insight_retention.validate()?;
        }

        self.credentials.validate(existing_secrets)
    }

    pub fn to_resource(&self, path: &str, bindings: &InstanceBindings<'_>) -> Resource {
        let mut resource = Resource::new(RESOURCE_TYPE, path)
            .property("Engine", json!(self.engine.name()))
            .property("EngineVersion", json!(self.engine.full_version()))
            .property("DBInstanceClass", json!(self.instance_type.to_string()))
            .property("DBSubnetGroupName", reference(bindings.subnet_group_id))
            .property("DBParameterGroupName", reference(bindings.parameter_group_id))
            .property(
                "VPCSecurityGroups",
                json!([get_att(bindings.security_group_id, "GroupId")]),
            )
            // CloudFormation types AllocatedStorage as a string
            .property("AllocatedStorage", json!(self.allocated_storage.to_string()))
            .property("StorageType", json!(self.storage_type.as_str()))
            .property("StorageEncrypted", json!(self.storage_encrypted))
            .property(
                "MasterUsername",
                resolve_field(bindings.secret_id, "username"),
            )
            .property(
                "MasterUserPassword",
                resolve_field(bindings.secret_id, "password"),
            )
            .property(
                "BackupRetentionPeriod",
                json!(self.backup_retention.num_days()),
            )
            .property("DeleteAutomatedBackups", json!(self.delete_automated_backups))
            .property("MultiAZ", json!(self.multi_az))
            .property(
                "EnablePerformanceInsights",
                json!(self.enable_performance_insights),
            )
            .property(
                "AutoMinorVersionUpgrade",
                json!(self.auto_minor_version_upgrade),
            )
            .property("DeletionProtection", json!(self.deletion_protection))
            .property("PubliclyAccessible", json!(self.publicly_accessible))
            .property("CopyTagsToSnapshot", json!(self.copy_tags_to_snapshot));

        if let Some(max) = self.max_allocated_storage {
            resource = resource.property("MaxAllocatedStorage", json!(max));
        }

        if self.enable_performance_insights {
            resource = resource.property(
                "PerformanceInsightsRetentionPeriod",
                json!(self.performance_insight_retention.days()),
            );
        }

        if let (true, Some(role_id)) = (self.has_enhanced_monitoring(), bindings.monitoring_role_id)
        {
            resource = resource
                .property(
                    "MonitoringInterval",
                    json!(self.monitoring_interval.num_seconds()),
                )
                .property("MonitoringRoleArn", get_att(role_id, "Arn"));
        }

        self.removal_policy.apply(&mut resource);
        resource
    }
}

/// Security group for the instance; egress open, no ingress until granted.
pub fn security_group_resource(path: &str, vpc_id: &str, construct_id: &str) -> Resource {
    Resource::new(SECURITY_GROUP_RESOURCE_TYPE, path)
        .property(
            "GroupDescription",
            json!(format!("Security group for {} database", construct_id)),
        )
        .property(
            "SecurityGroupEgress",
            json!([{
                "CidrIp": "0.0.0.0/0",
                "Description": "Allow all outbound traffic by default",
                "IpProtocol": "-1",
            }]),
        )
        .property("VpcId", json!(vpc_id))
}

/// Role assumed by RDS to publish enhanced monitoring metrics
pub fn monitoring_role_resource(path: &str) -> Resource {
    Resource::new(ROLE_RESOURCE_TYPE, path)
        .property(
            "AssumeRolePolicyDocument",
            json!({
                "Statement": [{
                    "Action": "sts:AssumeRole",
                    "Effect": "Allow",
                    "Principal": { "Service": "monitoring.rds.amazonaws.com" },
                }],
                "Version": "2012-10-17",
            }),
        )
        .property(
            "ManagedPolicyArns",
            json!([join(
                "",
                vec![json!("arn:"), reference(AWS_PARTITION), json!(ENHANCED_MONITORING_POLICY)],
            )]),
        )
}
