//! Print the aggregated CSS of a URL.
//!
//! Registers each component as directly used on the URL, in argument order,
//! without rendering anything.
//!
//! ```bash
//! stylegraph css index.vue sidebar.vue --url /
//! ```

use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

use super::common::{CommandContext, CommandExecutor};

/// Arguments of `stylegraph css`.
#[derive(Args, Debug)]
pub struct CssCommand {
    /// Components used directly on the page, in first-use order
    #[arg(required = true, num_args = 1..)]
    components: Vec<PathBuf>,

    /// Output URL of the page
    #[arg(long)]
    url: String,
}

impl CommandExecutor for CssCommand {
    async fn execute(self, context: CommandContext) -> Result<()> {
        let (mut pipeline, _) = context.ready_pipeline().await?;

        for component in &self.components {
            pipeline.use_component(context.component_path(component), Some(&self.url))?;
        }

        let css = pipeline.css_for_url(&self.url);
        if css.is_empty() {
            context.info(format!("No CSS for {}", self.url));
        } else {
            println!("{css}");
        }
        Ok(())
    }
}
