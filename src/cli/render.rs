//! Render one page component.
//!
//! The markup goes to stdout, followed by the aggregated CSS of the page URL in
//! a `<style>` element when there is any.
//!
//! ```bash
//! stylegraph render index.vue --url / --data '{"title": "Home"}'
//! ```

use anyhow::{Context, Result};
use clap::Args;
use serde_json::{Map, Value};
use std::path::PathBuf;

use super::common::{CommandContext, CommandExecutor};

/// Arguments of `stylegraph render`.
#[derive(Args, Debug)]
pub struct RenderCommand {
    /// Page component to render
    component: PathBuf,

    /// Output URL of the page
    #[arg(long)]
    url: Option<String>,

    /// Data cascade as a JSON object
    #[arg(long)]
    data: Option<String>,

    /// Do not print the page CSS
    #[arg(long)]
    no_css: bool,
}

impl RenderCommand {
    /// Build the host data object, with `--url` written to `page.url`.
    fn data(&self) -> Result<Value> {
        let mut data = match &self.data {
            Some(raw) => serde_json::from_str::<Value>(raw).context("--data must be valid JSON")?,
            None => Value::Object(Map::new()),
        };
        let Value::Object(object) = &mut data else {
            return Err(anyhow::anyhow!("--data must be a JSON object"));
        };

        if let Some(url) = &self.url {
            let page = object.entry("page").or_insert_with(|| Value::Object(Map::new()));
            let Value::Object(page) = page else {
                return Err(anyhow::anyhow!("'page' in --data must be a JSON object"));
            };
            page.insert("url".to_string(), Value::String(url.clone()));
        }
        Ok(data)
    }
}

impl CommandExecutor for RenderCommand {
    async fn execute(self, context: CommandContext) -> Result<()> {
        let data = self.data()?;
        let url = data.pointer("/page/url").and_then(Value::as_str).map(str::to_string);
        let (mut pipeline, _) = context.ready_pipeline().await?;

        let path = context.component_path(&self.component);
        let markup = pipeline.render_page(&path, data).await?;
        println!("{markup}");

        if !self.no_css
            && let Some(url) = url
        {
            let css = pipeline.css_for_url(&url);
            if !css.is_empty() {
                println!("<style>\n{css}\n</style>");
            }
        }
        Ok(())
    }
}
