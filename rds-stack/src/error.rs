//! Validation errors raised while materializing a stack

use thiserror::Error;

/// Everything that can stop a stack from being materialized.
///
/// All of these are raised before any resource is declared.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StackError {
    #[error("network context has no subnet partition named {name:?}")]
    MissingSubnetPartition { name: String },

    #[error("subnet partition {name:?} contains no subnets")]
    EmptySubnetPartition { name: String },

    #[error("subnet partition {name:?} is public; database subnets must be private or isolated")]
    PublicSubnetPartition { name: String },

    #[error("engine {engine} does not support version {version}")]
    UnsupportedEngineVersion { engine: String, version: String },

    #[error("a secret named {name:?} already exists")]
    SecretNameConflict { name: String },

    #[error("invalid secret name {name:?}: {reason}")]
    InvalidSecretName { name: String, reason: String },

    #[error("max allocated storage ({max} GiB) is below allocated storage ({allocated} GiB)")]
    StorageCeilingBelowInitial { allocated: u32, max: u32 },

    #[error("allocated storage {allocated} GiB is below the {min} GiB minimum for {storage_type}")]
    StorageTooSmall {
        allocated: u32,
        min: u32,
        storage_type: String,
    },

    #[error("backup retention of {days} days is outside 0..=35")]
    InvalidBackupRetention { days: i64 },

    #[error("monitoring interval of {seconds}s is not one of 0, 1, 5, 10, 15, 30, 60")]
    InvalidMonitoringInterval { seconds: i64 },

    #[error("performance insights retention of {days} days must be 7, 731 or a multiple of 31 up to 713")]
    InvalidPerformanceInsightsRetention { days: u32 },
}

pub type StackResult<T> = Result<T, StackError>;
