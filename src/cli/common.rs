//! Common utilities and traits for CLI commands

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

use super::CliConfig;
use crate::config::PluginOptions;
use crate::pipeline::{BuildReport, SfcPipeline};
use crate::utils::progress::Spinner;

/// A command that runs against a loaded [`CommandContext`].
pub trait CommandExecutor: Sized {
    /// Run the command.
    fn execute(self, context: CommandContext) -> impl std::future::Future<Output = Result<()>>;
}

/// Project directory, options and output settings for one invocation.
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Absolute project directory
    pub project_dir: PathBuf,
    /// Loaded plugin options
    pub options: PluginOptions,
    /// Draw spinners
    pub show_progress: bool,
    /// Suppress informational output
    pub quiet: bool,
}

impl CommandContext {
    /// Resolve the project directory and load its options.
    ///
    /// An explicit `--config` must exist; otherwise `stylegraph.toml` in the
    /// project directory is used when present.
    pub async fn load(config: &CliConfig) -> Result<Self> {
        let cwd = std::env::current_dir().context("Cannot determine the current directory")?;
        let project_dir = match &config.project_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => cwd.join(dir),
            None => cwd.clone(),
        };
        if !project_dir.is_dir() {
            return Err(anyhow::anyhow!(
                "Project directory {} does not exist",
                project_dir.display()
            ));
        }

        let options = match &config.config_path {
            Some(path) => {
                let path = if path.is_absolute() {
                    path.clone()
                } else {
                    cwd.join(path)
                };
                PluginOptions::load_from(&path).await?
            }
            None => PluginOptions::load_or_default(&project_dir).await?,
        };

        Ok(Self {
            project_dir,
            options,
            show_progress: !config.no_progress,
            quiet: config.quiet,
        })
    }

    /// Create a pipeline without building it.
    pub fn pipeline(&self) -> Result<SfcPipeline> {
        SfcPipeline::with_options(self.options.clone(), &self.project_dir)
            .context("Failed to set up the build pipeline")
    }

    /// Create a pipeline and bring it up to date, behind a spinner.
    pub async fn ready_pipeline(&self) -> Result<(SfcPipeline, BuildReport)> {
        let mut pipeline = self.pipeline()?;
        let spinner = Spinner::new("Building components", self.show_progress);
        let report = pipeline.init().await;
        spinner.finish_and_clear();
        Ok((pipeline, report?))
    }

    /// Resolve a component argument against the project directory.
    pub fn component_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_dir.join(path)
        }
    }

    /// Print an informational line unless `--quiet` is set.
    pub fn info(&self, message: impl AsRef<str>) {
        if !self.quiet {
            println!("{}", message.as_ref());
        }
    }

    /// Print a success line unless `--quiet` is set.
    pub fn success(&self, message: impl AsRef<str>) {
        if !self.quiet {
            println!("{} {}", "✓".green(), message.as_ref());
        }
    }
}
