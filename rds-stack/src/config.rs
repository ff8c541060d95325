//! Synthesizer configuration from environment variables

use crate::stack::DEFAULT_STACK_NAME;
use crate::template::TemplateFormat;
use anyhow::{Context, Result};
use common::ConfigExt;
use std::path::PathBuf;

/// Configuration for the `rds-synth` binary
#[derive(Debug, Clone)]
pub struct SynthConfig {
    pub stack_name: String,
    pub context_file: PathBuf,
    pub output_dir: PathBuf,
    pub format: TemplateFormat,
    /// Compare against the existing template without writing it
    pub check_only: bool,
}

impl SynthConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let context_file = String::env_required("RDS_CONTEXT_FILE").context(
            "RDS_CONTEXT_FILE is required.\n\
             It points at a YAML or JSON file describing the VPC, e.g.\n\
             network:\n  vpc_id: vpc-0a1b2c3d\n  subnet_groups:\n    - name: Database\n      kind: isolated\n      subnets: [...]",
        )?;

        let format = String::env_or("RDS_TEMPLATE_FORMAT", "json")
            .parse()
            .context("Invalid RDS_TEMPLATE_FORMAT")?;

        Ok(Self {
            stack_name: String::env_or("RDS_STACK_NAME", DEFAULT_STACK_NAME),
            context_file: PathBuf::from(context_file),
            output_dir: PathBuf::from(String::env_or("RDS_OUTPUT_DIR", "cdk.out")),
            format,
            check_only: bool::env_bool("RDS_CHECK_ONLY", false),
        })
    }

    /// Path of the synthesized template, e.g. `cdk.out/RDSStack.template.json`
    pub fn template_path(&self) -> PathBuf {
        self.output_dir.join(format!(
            "{}.template.{}",
            self.stack_name,
            self.format.extension()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_path() {
        let config = SynthConfig {
            stack_name: "RDSStack".to_string(),
            context_file: PathBuf::from("context.yaml"),
            output_dir: PathBuf::from("out"),
            format: TemplateFormat::Yaml,
            check_only: false,
        };
        assert_eq!(
            config.template_path(),
            PathBuf::from("out/RDSStack.template.yaml")
        );
    }
}
