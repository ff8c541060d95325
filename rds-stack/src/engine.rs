//! Database engine and instance sizing

use crate::error::{StackError, StackResult};
use std::fmt;

/// MySQL versions the provisioning backend accepts.
const SUPPORTED_MYSQL_VERSIONS: &[&str] = &[
    "8.0.32", "8.0.33", "8.0.34", "8.0.35", "8.0.36", "8.0.37", "8.0.39", "8.0.40",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MysqlEngineVersion {
    pub full: &'static str,
    pub major: &'static str,
}

impl MysqlEngineVersion {
    pub const VER_8_0_35: Self = Self::of("8.0.35", "8.0");

    /// Any version string; support is checked by `DatabaseEngine::validate`.
    pub const fn of(full: &'static str, major: &'static str) -> Self {
        Self { full, major }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseEngine {
    Mysql(MysqlEngineVersion),
}

impl DatabaseEngine {
    pub fn mysql(version: MysqlEngineVersion) -> Self {
        Self::Mysql(version)
    }

    /// Engine name as the backend knows it
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mysql(_) => "mysql",
        }
    }

    /// Engine name as shown to people, e.g. `MySQL`
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Mysql(_) => "MySQL",
        }
    }

    pub fn major_version(&self) -> &'static str {
        match self {
            Self::Mysql(v) => v.major,
        }
    }

    pub fn full_version(&self) -> &'static str {
        match self {
            Self::Mysql(v) => v.full,
        }
    }

    /// Parameter group family, e.g. `mysql8.0`
    pub fn parameter_group_family(&self) -> String {
        match self {
            Self::Mysql(v) => format!("mysql{}", v.major),
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            Self::Mysql(_) => 3306,
        }
    }

    pub fn validate(&self) -> StackResult<()> {
        let supported = match self {
            Self::Mysql(v) => {
                SUPPORTED_MYSQL_VERSIONS.contains(&v.full) && v.full.starts_with(v.major)
            }
        };

        if supported {
            Ok(())
        } else {
            Err(StackError::UnsupportedEngineVersion {
                engine: self.name().to_string(),
                version: self.full_version().to_string(),
            })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceClass {
    T3,
    T4g,
    M5,
    M6g,
    R5,
    R6g,
}

impl InstanceClass {
    fn as_str(&self) -> &'static str {
        match self {
            Self::T3 => "t3",
            Self::T4g => "t4g",
            Self::M5 => "m5",
            Self::M6g => "m6g",
            Self::R5 => "r5",
            Self::R6g => "r6g",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceSize {
    Micro,
    Small,
    Medium,
    Large,
    Xlarge,
}

impl InstanceSize {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Micro => "micro",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::Xlarge => "xlarge",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceType {
    pub class: InstanceClass,
    pub size: InstanceSize,
}

impl InstanceType {
    pub fn of(class: InstanceClass, size: InstanceSize) -> Self {
        Self { class, size }
    }

    /// Burstable (T-family) instances
    pub fn is_burstable(&self) -> bool {
        matches!(self.class, InstanceClass::T3 | InstanceClass::T4g)
    }
}

impl fmt::Display for InstanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "db.{}.{}", self.class.as_str(), self.size.as_str())
    }
}
