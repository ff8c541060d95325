//! Engine parameter set

use crate::engine::DatabaseEngine;
use crate::template::Resource;
use serde_json::json;
use std::collections::BTreeMap;

pub const RESOURCE_TYPE: &str = "AWS::RDS::DBParameterGroup";

/// Expression sizing a parameter relative to instance memory,
/// e.g. `{DBInstanceClassMemory*3/4}`.
pub fn instance_memory_fraction(numerator: u32, denominator: u32) -> String {
    format!("{{DBInstanceClassMemory*{}/{}}}", numerator, denominator)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterGroup {
    pub engine: DatabaseEngine,
    pub description: String,
    pub parameters: BTreeMap<String, String>,
}

impl ParameterGroup {
    pub fn new(engine: DatabaseEngine, description: impl Into<String>) -> Self {
        Self {
            engine,
            description: description.into(),
            parameters: BTreeMap::new(),
        }
    }

    /// Buffer pool sized to three quarters of instance memory.
    pub fn tuned_for(engine: DatabaseEngine) -> Self {
        Self::new(
            engine,
            format!(
                "Parameter group for {} {} database",
                engine.display_name(),
                engine.major_version()
            ),
        )
        .with_parameter("innodb_buffer_pool_size", instance_memory_fraction(3, 4))
    }

    pub fn with_parameter(mut self, name: &str, value: impl Into<String>) -> Self {
        self.parameters.insert(name.to_string(), value.into());
        self
    }

    pub fn to_resource(&self, path: &str) -> Resource {
        Resource::new(RESOURCE_TYPE, path)
            .property("Description", json!(self.description))
            .property("Family", json!(self.engine.parameter_group_family()))
            .property("Parameters", json!(self.parameters))
    }
}
