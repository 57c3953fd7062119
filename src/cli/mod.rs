//! Command-line interface for stylegraph.
//!
//! The CLI drives a [`SfcPipeline`](crate::pipeline::SfcPipeline) over one
//! project directory. Each command lives in its own module with its own
//! argument struct.
//!
//! # Available Commands
//!
//! - `build` - Run a build pass and print a summary
//! - `render` - Render one page component and print its markup and CSS
//! - `css` - Register components on a URL and print the aggregated CSS
//! - `graph` - Print the import tree and dependants of a component
//!
//! # Global Options
//!
//! - `--verbose` - Enable debug output
//! - `--quiet` - Suppress everything except command output and errors
//! - `--no-progress` - Disable spinners
//! - `--config` - Path to a `stylegraph.toml` (defaults to the project directory)
//! - `--dir` - Project directory (defaults to the current directory)
//!
//! # Example
//!
//! ```bash
//! stylegraph build
//! stylegraph render index.vue --url /
//! stylegraph css index.vue about.vue --url /
//! stylegraph graph _includes/card.vue
//! ```

mod build;
pub mod common;
mod css;
mod graph;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use common::{CommandContext, CommandExecutor};

/// Settings shared by every command, derived from the global flags.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter for the tracing subscriber; `None` disables logging
    pub log_level: Option<String>,
    /// Disable spinners
    pub no_progress: bool,
    /// Suppress informational output
    pub quiet: bool,
    /// Explicit configuration file
    pub config_path: Option<PathBuf>,
    /// Project directory
    pub project_dir: Option<PathBuf>,
}

/// Top-level argument parser.
#[derive(Parser, Debug)]
#[command(
    name = "stylegraph",
    about = "Compile single-file components and aggregate their CSS per page",
    version,
    long_about = "stylegraph compiles single-file components into cached artifacts, tracks the \
                  imports between them and answers which stylesheets every rendered page needs."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress informational output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to a stylegraph.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Project directory
    #[arg(short = 'C', long, global = true)]
    dir: Option<PathBuf>,

    /// Disable spinners
    #[arg(long, global = true)]
    no_progress: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a build pass over the project
    Build(build::BuildCommand),

    /// Render a page component
    Render(render::RenderCommand),

    /// Print the aggregated CSS of a URL
    Css(css::CssCommand),

    /// Show the import tree and dependants of a component
    Graph(graph::GraphCommand),
}

impl Cli {
    /// Execute the parsed command.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Translate the global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("info".to_string())
        };

        CliConfig {
            log_level,
            no_progress: self.no_progress || self.quiet,
            quiet: self.quiet,
            config_path: self.config.clone(),
            project_dir: self.dir.clone(),
        }
    }

    /// Execute with an explicit configuration.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        let context = CommandContext::load(&config).await?;

        match self.command {
            Commands::Build(cmd) => cmd.execute(context).await,
            Commands::Render(cmd) => cmd.execute(context).await,
            Commands::Css(cmd) => cmd.execute(context).await,
            Commands::Graph(cmd) => cmd.execute(context).await,
        }
    }
}
