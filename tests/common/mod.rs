//! Common test utilities for stylegraph integration tests
//!
//! A [`TestSite`] is a throwaway project directory with helpers to write
//! single-file components into it, build a pipeline over it and run the
//! `stylegraph` binary against it.

// Not every test module uses every helper
#![allow(dead_code)]

use anyhow::{Context, Result};
use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use stylegraph::config::PluginOptions;
use stylegraph::pipeline::SfcPipeline;
use tempfile::TempDir;

/// Temporary project with component helpers
pub struct TestSite {
    _temp_dir: TempDir, // Keep alive for RAII cleanup
    root: PathBuf,
}

impl TestSite {
    /// Create an empty project directory
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().join("site");
        fs::create_dir_all(&root)?;
        Ok(Self {
            _temp_dir: temp_dir,
            root,
        })
    }

    /// Project root
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Absolute path of `rel` inside the project
    pub fn join(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    /// Write a raw file below the project root
    pub fn write(&self, rel: &str, content: &str) -> Result<PathBuf> {
        let path = self.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Write a component built from a template, `(name, specifier)` imports
    /// and style blocks
    pub fn component(
        &self,
        rel: &str,
        template: &str,
        imports: &[(&str, &str)],
        styles: &[&str],
    ) -> Result<PathBuf> {
        self.write(rel, &component_source(template, imports, styles))
    }

    /// Write `stylegraph.toml`
    pub fn config(&self, content: &str) -> Result<PathBuf> {
        self.write("stylegraph.toml", content)
    }

    /// Pipeline over this project with the bundled toolchain
    pub fn pipeline(&self, options: PluginOptions) -> Result<SfcPipeline> {
        SfcPipeline::with_options(options, &self.root)
    }

    /// The `stylegraph` binary pointed at this project, without spinners
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("stylegraph").unwrap();
        cmd.arg("--no-progress")
            .arg("-C")
            .arg(&self.root)
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1");
        cmd
    }

    /// The scenario-B chain: `data` imports `child`, which imports `grandchild`
    pub fn write_chain(&self) -> Result<()> {
        self.component(
            "data.vue",
            "<main>{{ page.url }}<Child /></main>",
            &[("Child", "./_includes/child.vue")],
            &["body{color:blue}"],
        )?;
        self.component(
            "_includes/child.vue",
            "<section><Grandchild /></section>",
            &[("Grandchild", "./grandchild.vue")],
            &["section{margin:0}"],
        )?;
        self.component("_includes/grandchild.vue", "<em>leaf</em>", &[], &["em{color:red}"])?;
        Ok(())
    }
}

/// Source text of a single-file component
pub fn component_source(template: &str, imports: &[(&str, &str)], styles: &[&str]) -> String {
    let mut source = format!("<template>\n{template}\n</template>\n");
    if !imports.is_empty() {
        source.push_str("<script>\n");
        for (name, specifier) in imports {
            source.push_str(&format!("import {name} from \"{specifier}\";\n"));
        }
        source.push_str("export default {};\n</script>\n");
    }
    for css in styles {
        source.push_str(&format!("<style>\n{css}\n</style>\n"));
    }
    source
}

/// Page data carrying only an output URL
pub fn page(url: &str) -> serde_json::Value {
    serde_json::json!({ "page": { "url": url } })
}
