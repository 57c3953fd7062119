//! Server-side rendering of compiled components with Tera.
//!
//! Each render builds a fresh `Tera` instance, so no state survives between
//! renders and rendering the same component with the same context twice is
//! byte-identical. Children are rendered first and handed to their parent as
//! `components.<Name>`. Every component sees `page`; only the root sees the
//! host data cascade. A component's own data defaults apply to that component
//! alone and are overridden by the cascade on the root.
//!
//! Output is not autoescaped; templates apply the `escape` filter where needed.

use serde_json::{Map, Value};
use tera::{Context as TeraContext, Tera};
use tracing::trace;

use super::compiler::tera_error_message;
use super::helpers::HelperRegistry;
use super::loader::CompiledComponent;
use crate::bundler::{ComponentRenderer, RenderContext};
use crate::core::StylegraphError;

/// The bundled [`ComponentRenderer`].
#[derive(Debug, Clone, Default)]
pub struct TeraRenderer {
    helpers: HelperRegistry,
}

impl TeraRenderer {
    /// Create a renderer exposing `helpers` to every template.
    pub fn new(helpers: HelperRegistry) -> Self {
        Self {
            helpers,
        }
    }

    /// The helpers registered on every render.
    pub fn helpers(&self) -> &HelperRegistry {
        &self.helpers
    }

    /// Render synchronously.
    pub fn render_component(
        &self,
        component: &CompiledComponent,
        context: &RenderContext,
    ) -> Result<String, StylegraphError> {
        let page = context.page_value();
        self.render_tree(component, &page, Some(&context.data))
    }

    fn render_tree(
        &self,
        component: &CompiledComponent,
        page: &Value,
        cascade: Option<&Map<String, Value>>,
    ) -> Result<String, StylegraphError> {
        let mut rendered_children = Map::new();
        for (name, child) in &component.children {
            let markup = self.render_tree(child, page, None)?;
            rendered_children.insert(name.clone(), Value::String(markup));
        }

        let mut context = TeraContext::new();
        for (key, value) in &component.data {
            context.insert(key.as_str(), value);
        }
        if let Some(cascade) = cascade {
            for (key, value) in cascade {
                context.insert(key.as_str(), value);
            }
        }
        context.insert("page", page);
        context.insert("components", &rendered_children);

        let template_name = component.name.as_str();
        let mut tera = Tera::default();
        self.helpers.register(&mut tera);

        let render_failure = |e: tera::Error| StylegraphError::RenderFailure {
            component: component.name.clone(),
            reason: tera_error_message(&e),
        };
        tera.add_raw_template(template_name, &component.template).map_err(render_failure)?;
        let markup = tera.render(template_name, &context).map_err(render_failure)?;

        trace!("Rendered {} ({} bytes)", component.name, markup.len());
        Ok(markup)
    }
}

impl ComponentRenderer for TeraRenderer {
    type Artifact = CompiledComponent;

    async fn render(
        &self,
        artifact: &CompiledComponent,
        context: &RenderContext,
    ) -> Result<String, StylegraphError> {
        self.render_component(artifact, context)
    }
}
