//! Show the import tree and dependants of a component.
//!
//! ```text
//! $ stylegraph graph index.vue
//! index.json
//! ├── aside.json
//! └── card.json
//!     └── icon.json
//!
//! Dependants: none
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

use super::common::{CommandContext, CommandExecutor};
use crate::core::{ArtifactId, ComponentId, StylegraphError};

/// Arguments of `stylegraph graph`.
#[derive(Args, Debug)]
pub struct GraphCommand {
    /// Component to inspect
    component: PathBuf,

    /// Print JSON instead of a tree
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct GraphOutput {
    component: ComponentId,
    artifact: ArtifactId,
    imports: Vec<ArtifactId>,
    dependants: Vec<ComponentId>,
}

impl CommandExecutor for GraphCommand {
    async fn execute(self, context: CommandContext) -> Result<()> {
        let (pipeline, _) = context.ready_pipeline().await?;
        let path = context.component_path(&self.component);

        let tree = pipeline.import_tree(&path)?;
        let dependants = pipeline.dependants_of(&path)?;

        if self.json {
            let component = pipeline.component_id(&path);
            let artifact = pipeline.registry().artifact_for(&component).cloned().ok_or_else(|| {
                StylegraphError::UnknownComponent {
                    id: component.to_string(),
                }
            })?;
            let output = GraphOutput {
                imports: pipeline.graph().direct_imports(&artifact),
                component,
                artifact,
                dependants,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        print!("{tree}");
        println!();
        if dependants.is_empty() {
            println!("{} none", "Dependants:".bold());
        } else {
            println!("{}", "Dependants:".bold());
            for dependant in dependants {
                println!("  {dependant}");
            }
        }
        Ok(())
    }
}
