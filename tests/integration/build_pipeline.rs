//! Full build passes, rendering and empty passes

use crate::common::{TestSite, page};
use anyhow::Result;
use stylegraph::config::PluginOptions;
use stylegraph::core::{ArtifactId, ComponentId, StylegraphError};

#[tokio::test]
async fn test_multiple_style_blocks_are_joined() -> Result<()> {
    let site = TestSite::new()?;
    site.component("data.vue", "<p>x</p>", &[], &["body{color:blue}", "body{color:pink}"])?;

    let mut pipeline = site.pipeline(PluginOptions::default())?;
    let report = pipeline.init().await?;

    assert_eq!(report.components, 1);
    assert_eq!(report.relationships, 0);
    assert_eq!(
        pipeline.css_store().fragments(&ComponentId::new("./data.vue")),
        "body{color:blue}\nbody{color:pink}"
    );
    Ok(())
}

#[tokio::test]
async fn test_import_chain_renders_and_records_relationships() -> Result<()> {
    let site = TestSite::new()?;
    site.write_chain()?;

    let mut pipeline = site.pipeline(PluginOptions::default())?;
    let report = pipeline.init().await?;
    assert_eq!(report.files, 3);
    assert_eq!(report.components, 3);

    let relationships: Vec<String> = pipeline.relationships().map(ToString::to_string).collect();
    assert_eq!(relationships, vec!["data.json -> child.json", "child.json -> grandchild.json"]);

    let html = pipeline.render_page("data.vue", page("/data/")).await?;
    assert_eq!(html, "<main>/data/<section><em>leaf</em></section></main>");

    let expected = "/* data.json Component */\nbody{color:blue}\n\
                    /* child.json Component */\nsection{margin:0}\n\
                    /* grandchild.json Component */\nem{color:red}";
    assert_eq!(pipeline.css_for_url("/data/"), expected);
    assert_eq!(pipeline.css_for_url("/data/"), expected);
    Ok(())
}

#[tokio::test]
async fn test_repeated_renders_are_identical() -> Result<()> {
    let site = TestSite::new()?;
    site.write_chain()?;

    let mut pipeline = site.pipeline(PluginOptions::default())?;
    pipeline.init().await?;

    let first = pipeline.render_page("./data.vue", page("/data/")).await?;
    let second = pipeline.render_page("./data.vue", page("/data/")).await?;
    assert_eq!(first, second);

    let (hits, _) = pipeline.registry().cache_stats();
    assert!(hits >= 1, "second render should reuse the loaded artifact");
    Ok(())
}

#[tokio::test]
async fn test_empty_override_keeps_state() -> Result<()> {
    let site = TestSite::new()?;
    site.write_chain()?;

    let mut pipeline = site.pipeline(PluginOptions::default())?;
    pipeline.init().await?;
    let before = pipeline.snapshot();

    let report = pipeline.build(Some(Vec::new())).await?;
    assert!(report.is_noop());
    assert_eq!(pipeline.snapshot(), before);
    assert!(pipeline.graph().has_edge(&ArtifactId::new("data.json"), &ArtifactId::new("child.json")));
    Ok(())
}

#[tokio::test]
async fn test_empty_project_is_noop() -> Result<()> {
    let site = TestSite::new()?;
    site.write("README.md", "# not a component")?;

    let mut pipeline = site.pipeline(PluginOptions::default())?;
    let report = pipeline.init().await?;

    assert!(report.is_noop());
    assert!(pipeline.registry().is_empty());
    assert!(pipeline.graph().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_ignored_pages_are_not_built() -> Result<()> {
    let site = TestSite::new()?;
    site.component("index.vue", "<p>home</p>", &[], &[])?;
    site.component("drafts/wip.vue", "<p>wip</p>", &[], &[])?;
    site.component("_includes/drafts/card.vue", "<p>card</p>", &[], &[])?;

    let options = PluginOptions {
        ignores: vec!["**/drafts/**".to_string()],
        ..PluginOptions::default()
    };
    let mut pipeline = site.pipeline(options)?;
    pipeline.init().await?;

    let components: Vec<&str> = pipeline.registry().mappings().keys().map(|c| c.as_str()).collect();
    assert_eq!(components, vec!["./_includes/drafts/card.vue", "./index.vue"]);
    Ok(())
}

#[tokio::test]
async fn test_compile_error_reports_location() -> Result<()> {
    let site = TestSite::new()?;
    site.write("broken.vue", "<template>\n<p>{{ page.url </p>\n</template>\n")?;

    let mut pipeline = site.pipeline(PluginOptions::default())?;
    let err = pipeline.init().await.unwrap_err();

    let compile = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<StylegraphError>())
        .expect("compile failure in error chain");
    assert!(matches!(compile, StylegraphError::CompileFailure { .. }), "got {compile:?}");
    assert!(compile.to_string().contains("broken.vue"));
    Ok(())
}

#[tokio::test]
async fn test_render_unknown_component() -> Result<()> {
    let site = TestSite::new()?;
    site.component("index.vue", "<p>home</p>", &[], &[])?;

    let mut pipeline = site.pipeline(PluginOptions::default())?;
    pipeline.init().await?;

    let err = pipeline.render_page("missing.vue", page("/")).await.unwrap_err();
    assert_eq!(err.to_string(), "\"./missing.vue\" is not a valid component");
    assert_eq!(pipeline.css_for_url("/"), "");
    Ok(())
}
