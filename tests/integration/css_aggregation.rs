//! Per-page CSS ordering and deduplication

use crate::common::{TestSite, page};
use anyhow::Result;
use stylegraph::config::PluginOptions;
use stylegraph::core::ArtifactId;

fn ids(names: &[&str]) -> Vec<ArtifactId> {
    names.iter().map(|n| ArtifactId::new(*n)).collect()
}

#[tokio::test]
async fn test_direct_usages_precede_imports() -> Result<()> {
    let site = TestSite::new()?;
    site.component("p.vue", "<R />", &[("R", "./_includes/r.vue")], &[".p{}"])?;
    site.component("q.vue", "<p>q</p>", &[], &[".q{}"])?;
    site.component("_includes/r.vue", "<p>r</p>", &[], &[".r{}"])?;

    let mut pipeline = site.pipeline(PluginOptions::default())?;
    pipeline.init().await?;

    pipeline.use_component("p.vue", Some("/x/"))?;
    pipeline.use_component("q.vue", Some("/x/"))?;
    pipeline.use_component("p.vue", Some("/x/"))?;

    assert_eq!(pipeline.aggregator().resolve_contributors("/x/"), ids(&["p.json", "q.json", "r.json"]));
    assert_eq!(
        pipeline.css_for_url("/x/"),
        "/* p.json Component */\n.p{}\n/* q.json Component */\n.q{}\n/* r.json Component */\n.r{}"
    );
    Ok(())
}

#[tokio::test]
async fn test_shared_import_contributes_once() -> Result<()> {
    let site = TestSite::new()?;
    site.component("a.vue", "<Card />", &[("Card", "./_includes/card.vue")], &[".a{}"])?;
    site.component("b.vue", "<Card />", &[("Card", "./_includes/card.vue")], &[".b{}"])?;
    site.component("_includes/card.vue", "<div>card</div>", &[], &[".card{}"])?;

    let mut pipeline = site.pipeline(PluginOptions::default())?;
    pipeline.init().await?;

    pipeline.render_page("a.vue", page("/both/")).await?;
    pipeline.render_page("b.vue", page("/both/")).await?;

    let css = pipeline.css_for_url("/both/");
    assert_eq!(css.matches(".card{}").count(), 1);
    assert_eq!(pipeline.aggregator().resolve_contributors("/both/"), ids(&["a.json", "b.json", "card.json"]));
    Ok(())
}

#[tokio::test]
async fn test_pages_do_not_share_usage() -> Result<()> {
    let site = TestSite::new()?;
    site.component("a.vue", "<p>a</p>", &[], &[".a{}"])?;
    site.component("b.vue", "<p>b</p>", &[], &[".b{}"])?;

    let mut pipeline = site.pipeline(PluginOptions::default())?;
    pipeline.init().await?;

    pipeline.render_page("a.vue", page("/a/")).await?;
    pipeline.render_page("b.vue", page("/b/")).await?;

    assert_eq!(pipeline.css_for_url("/a/"), "/* a.json Component */\n.a{}");
    assert_eq!(pipeline.css_for_url("/b/"), "/* b.json Component */\n.b{}");
    assert_eq!(pipeline.aggregator().urls(), vec!["/a/", "/b/"]);
    Ok(())
}

#[tokio::test]
async fn test_render_without_url_records_nothing() -> Result<()> {
    let site = TestSite::new()?;
    site.component("a.vue", "<p>a</p>", &[], &[".a{}"])?;

    let mut pipeline = site.pipeline(PluginOptions::default())?;
    pipeline.init().await?;

    let html = pipeline.render_page("a.vue", serde_json::json!({})).await?;
    assert_eq!(html, "<p>a</p>");
    assert!(pipeline.aggregator().urls().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_one_level_expansion() -> Result<()> {
    let site = TestSite::new()?;
    site.write_chain()?;

    let options = PluginOptions {
        transitive_css: false,
        ..PluginOptions::default()
    };
    let mut pipeline = site.pipeline(options)?;
    pipeline.init().await?;
    pipeline.use_component("data.vue", Some("/data/"))?;

    assert_eq!(pipeline.aggregator().resolve_contributors("/data/"), ids(&["data.json", "child.json"]));
    assert!(!pipeline.css_for_url("/data/").contains("em{color:red}"));
    Ok(())
}

#[tokio::test]
async fn test_components_without_css_emit_no_block() -> Result<()> {
    let site = TestSite::new()?;
    site.component("page.vue", "<Plain />", &[("Plain", "./_includes/plain.vue")], &[".page{}"])?;
    site.component("_includes/plain.vue", "<p>plain</p>", &[], &[])?;

    let mut pipeline = site.pipeline(PluginOptions::default())?;
    pipeline.init().await?;
    pipeline.render_page("page.vue", page("/")).await?;

    assert_eq!(pipeline.css_for_url("/"), "/* page.json Component */\n.page{}");
    Ok(())
}
