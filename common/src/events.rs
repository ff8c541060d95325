//! Synthesis lifecycle events
//!
//! Structured events emitted while a stack is synthesized. Each event is
//! logged with its type, a short message and its serialized fields.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// All events the synthesizer reports.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum SynthEvent {
    /// Synthesis of a stack started
    SynthStarted {
        stack: String,
        vpc_id: String,
        target: String,
    },

    /// A resource was declared in the template
    ResourceDeclared {
        logical_id: String,
        resource_type: String,
    },

    /// Descriptor or context failed validation
    ValidationFailed { stack: String, error: String },

    /// Synthesized template matches the previous one
    TemplateUnchanged { stack: String, path: String },

    /// Synthesized template differs from the previous one
    TemplateChanged {
        stack: String,
        changes: Vec<String>,
    },

    /// Template file written to disk
    TemplateWritten {
        path: String,
        resources: usize,
        outputs: usize,
    },
}

impl SynthEvent {
    /// Get the event type name for logging.
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SynthStarted { .. } => "SYNTH_STARTED",
            Self::ResourceDeclared { .. } => "RESOURCE_DECLARED",
            Self::ValidationFailed { .. } => "VALIDATION_FAILED",
            Self::TemplateUnchanged { .. } => "TEMPLATE_UNCHANGED",
            Self::TemplateChanged { .. } => "TEMPLATE_CHANGED",
            Self::TemplateWritten { .. } => "TEMPLATE_WRITTEN",
        }
    }

    /// Convert event to a human-readable message.
    pub fn message(&self) -> String {
        match self {
            Self::SynthStarted {
                stack,
                vpc_id,
                target,
            } => {
                format!("Synthesizing {} into {} ({})", stack, vpc_id, target)
            }
            Self::ResourceDeclared {
                logical_id,
                resource_type,
            } => {
                format!("Declared {} ({})", logical_id, resource_type)
            }
            Self::ValidationFailed { stack, error } => {
                format!("{} failed validation: {}", stack, error)
            }
            Self::TemplateUnchanged { stack, path } => {
                format!("{} unchanged at {}", stack, path)
            }
            Self::TemplateChanged { stack, changes } => {
                format!("{} has {} change(s)", stack, changes.len())
            }
            Self::TemplateWritten {
                path,
                resources,
                outputs,
            } => {
                format!(
                    "Wrote {} ({} resources, {} outputs)",
                    path, resources, outputs
                )
            }
        }
    }

    fn is_failure(&self) -> bool {
        matches!(self, Self::ValidationFailed { .. })
    }

    /// Log the event with its metadata.
    pub fn emit(&self) {
        let event_type = self.event_type();
        let message = self.message();
        let metadata = serde_json::to_string(self).unwrap_or_default();

        if self.is_failure() {
            warn!(event = %event_type, metadata = %metadata, "{}", message);
        } else {
            info!(event = %event_type, metadata = %metadata, "{}", message);
        }
    }
}
