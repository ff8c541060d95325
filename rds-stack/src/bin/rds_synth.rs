//! rds-synth - Synthesize the RDS MySQL stack template
//!
//! Reads the network context named by RDS_CONTEXT_FILE and writes the
//! CloudFormation template into RDS_OUTPUT_DIR. With RDS_CHECK_ONLY=true the
//! template is only compared, and drift exits non-zero.

use anyhow::Result;
use common::{init_logging, AwsEnv};
use rds_stack::config::SynthConfig;
use rds_stack::synth::{synthesize, SynthOutcome};
use tracing::{error, info};

fn main() -> Result<()> {
    let _guard = init_logging("rds-synth");

    let config = SynthConfig::from_env()?;

    info!(
        stack = %config.stack_name,
        context = %config.context_file.display(),
        format = %config.format,
        target = %AwsEnv::describe(),
        "=== RDS Stack Synth ==="
    );

    match synthesize(&config)? {
        SynthOutcome::Unchanged => {
            info!("No differences");
        }
        SynthOutcome::Written { changes } => {
            info!(
                changes = changes.len(),
                path = %config.template_path().display(),
                "Template synthesized"
            );
        }
        SynthOutcome::Drifted { changes } => {
            error!(changes = changes.len(), "Template drift detected");
            std::process::exit(1);
        }
    }

    Ok(())
}
