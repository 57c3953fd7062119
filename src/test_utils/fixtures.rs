//! Test fixtures for creating sample components

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Test fixture for a single-file component
#[derive(Clone, Debug, Default)]
pub struct ComponentFixture {
    pub path: String,
    pub template: String,
    pub imports: Vec<(String, String)>,
    pub data: Option<String>,
    pub styles: Vec<String>,
}

impl ComponentFixture {
    /// Component at `path` (relative to the project root) with a template
    pub fn new(path: &str, template: &str) -> Self {
        Self {
            path: path.to_string(),
            template: template.to_string(),
            ..Self::default()
        }
    }

    /// Import another component under `name`
    pub fn import(mut self, name: &str, specifier: &str) -> Self {
        self.imports.push((name.to_string(), specifier.to_string()));
        self
    }

    /// Set the `export default` data object (JSON text)
    pub fn data(mut self, data: &str) -> Self {
        self.data = Some(data.to_string());
        self
    }

    /// Add a `<style>` block
    pub fn style(mut self, css: &str) -> Self {
        self.styles.push(css.to_string());
        self
    }

    /// Render the component source
    pub fn source(&self) -> String {
        let mut out = format!("<template>\n{}\n</template>\n", self.template);

        if !self.imports.is_empty() || self.data.is_some() {
            out.push_str("<script>\n");
            for (name, specifier) in &self.imports {
                out.push_str(&format!("import {name} from \"{specifier}\";\n"));
            }
            if let Some(data) = &self.data {
                out.push_str(&format!("export default {data};\n"));
            }
            out.push_str("</script>\n");
        }

        for css in &self.styles {
            out.push_str(&format!("<style>\n{css}\n</style>\n"));
        }
        out
    }

    /// Write the component below `root`
    pub fn write_to(&self, root: &Path) -> Result<PathBuf> {
        let path = root.join(&self.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, self.source())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_layout() {
        let source = ComponentFixture::new("data.vue", "<div/>")
            .import("Child", "./child.vue")
            .data(r#"{ "title": "t" }"#)
            .style("a{}")
            .source();

        assert!(source.starts_with("<template>\n<div/>\n</template>\n<script>\n"));
        assert!(source.contains("import Child from \"./child.vue\";\n"));
        assert!(source.contains("export default { \"title\": \"t\" };\n"));
        assert!(source.ends_with("<style>\na{}\n</style>\n"));
    }
}
