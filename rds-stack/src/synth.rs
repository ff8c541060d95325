//! Synthesis driver: context file in, template file out

use crate::config::SynthConfig;
use crate::diff::{diff, Change};
use crate::network::ContextFile;
use crate::stack::RdsStack;
use crate::template::Template;
use anyhow::{Context, Result};
use common::{AwsEnv, SynthEvent};
use std::fs;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum SynthOutcome {
    /// Existing template already matches
    Unchanged,
    /// Template written (first synthesis or after changes)
    Written { changes: Vec<Change> },
    /// Check-only run found differences; nothing written
    Drifted { changes: Vec<Change> },
}

/// Load the context, materialize the stack and reconcile with the
/// template already on disk.
pub fn synthesize(config: &SynthConfig) -> Result<SynthOutcome> {
    let context = ContextFile::load(&config.context_file)?;

    SynthEvent::SynthStarted {
        stack: config.stack_name.clone(),
        vpc_id: context.network.vpc_id.clone(),
        target: AwsEnv::describe(),
    }
    .emit();

    let stack =
        RdsStack::new(&config.stack_name).with_existing_secrets(context.existing_secret_names());

    let materialized = match stack.materialize(&context.network) {
        Ok(m) => m,
        Err(e) => {
            SynthEvent::ValidationFailed {
                stack: config.stack_name.clone(),
                error: e.to_string(),
            }
            .emit();
            return Err(e).context(format!("Failed to materialize {}", config.stack_name));
        }
    };

    let template_path = config.template_path();
    let rendered = materialized.template.render(config.format)?;

    let previous_text = if template_path.exists() {
        Some(
            fs::read_to_string(&template_path)
                .with_context(|| format!("Failed to read {}", template_path.display()))?,
        )
    } else {
        None
    };

    if previous_text.as_deref() == Some(rendered.as_str()) {
        SynthEvent::TemplateUnchanged {
            stack: config.stack_name.clone(),
            path: template_path.display().to_string(),
        }
        .emit();
        return Ok(SynthOutcome::Unchanged);
    }

    let previous = match &previous_text {
        Some(text) => Template::parse(text, config.format).unwrap_or_else(|e| {
            warn!(error = %e, "Existing template is unreadable, treating as empty");
            empty_like(&materialized.template)
        }),
        None => empty_like(&materialized.template),
    };
    let changes = diff(&previous, &materialized.template);

    if changes.is_empty() {
        // Same template, different formatting
        if !config.check_only {
            fs::write(&template_path, &rendered)
                .with_context(|| format!("Failed to write {}", template_path.display()))?;
        }
        SynthEvent::TemplateUnchanged {
            stack: config.stack_name.clone(),
            path: template_path.display().to_string(),
        }
        .emit();
        return Ok(SynthOutcome::Unchanged);
    }

    SynthEvent::TemplateChanged {
        stack: config.stack_name.clone(),
        changes: changes.iter().map(ToString::to_string).collect(),
    }
    .emit();
    for change in &changes {
        info!("  {}", change);
    }

    if config.check_only {
        return Ok(SynthOutcome::Drifted { changes });
    }

    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create {}", config.output_dir.display()))?;
    fs::write(&template_path, &rendered)
        .with_context(|| format!("Failed to write {}", template_path.display()))?;

    SynthEvent::TemplateWritten {
        path: template_path.display().to_string(),
        resources: materialized.template.resources.len(),
        outputs: materialized.outputs.len(),
    }
    .emit();

    Ok(SynthOutcome::Written { changes })
}

fn empty_like(template: &Template) -> Template {
    Template {
        resources: Default::default(),
        outputs: Default::default(),
        ..template.clone()
    }
}
