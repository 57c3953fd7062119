//! Run a build pass.
//!
//! ```bash
//! # Full pass (or snapshot restore in read mode)
//! stylegraph build
//!
//! # Rebuild only some files
//! stylegraph build --files about.vue _includes/card.vue
//!
//! # Machine-readable summary
//! stylegraph build --json
//! ```

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::common::{CommandContext, CommandExecutor};
use crate::pipeline::BuildReport;
use crate::utils::progress::Spinner;

/// Arguments of `stylegraph build`.
#[derive(Args, Debug)]
pub struct BuildCommand {
    /// Build only these files instead of searching the project
    #[arg(long, num_args = 1..)]
    files: Vec<PathBuf>,

    /// Print the pass summary as JSON
    #[arg(long)]
    json: bool,
}

impl CommandExecutor for BuildCommand {
    async fn execute(self, context: CommandContext) -> Result<()> {
        let report = if self.files.is_empty() {
            context.ready_pipeline().await?.1
        } else {
            let files: Vec<PathBuf> = self.files.iter().map(|f| context.component_path(f)).collect();
            let mut pipeline = context.pipeline()?;
            let spinner = Spinner::new(format!("Building {} files", files.len()), context.show_progress);
            let report = pipeline.build(Some(files)).await;
            spinner.finish_and_clear();
            report?
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_summary(&context, &report);
        }
        Ok(())
    }
}

fn print_summary(context: &CommandContext, report: &BuildReport) {
    if report.is_noop() {
        context.info("No component files found, nothing to build");
        return;
    }

    let verb = if report.restored { "Restored" } else { "Built" };
    context.success(format!(
        "{verb} {} components ({} relationships)",
        report.components, report.relationships
    ));
    if report.removed > 0 {
        context.info(format!("  removed {} deleted components", report.removed));
    }
    if report.partial {
        context.info("  partial pass, snapshot left unchanged");
    }
    if report.snapshot_written {
        context.info("  snapshot written");
    }
}
