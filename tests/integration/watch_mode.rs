//! Change notifications and partial build passes

use crate::common::{TestSite, page};
use anyhow::Result;
use std::fs;
use stylegraph::config::{PluginOptions, SnapshotMode};
use stylegraph::core::{ArtifactId, ComponentId};

#[tokio::test]
async fn test_changed_style_is_refreshed() -> Result<()> {
    let site = TestSite::new()?;
    site.write_chain()?;

    let mut pipeline = site.pipeline(PluginOptions::default())?;
    pipeline.init().await?;
    pipeline.render_page("data.vue", page("/data/")).await?;

    site.component("_includes/grandchild.vue", "<em>leaf</em>", &[], &["em{color:green}"])?;
    let kept = pipeline.files_changed(&[site.join("_includes/grandchild.vue")]);
    assert_eq!(kept.len(), 1);
    assert_eq!(pipeline.pending_changes().len(), 1);

    let report = pipeline.build(None).await?;
    assert!(report.partial);
    assert_eq!(report.files, 1);
    assert!(pipeline.pending_changes().is_empty());

    let css = pipeline.css_for_url("/data/");
    assert!(css.contains("body{color:blue}"), "unaffected CSS must survive: {css}");
    assert!(css.contains("section{margin:0}"));
    assert!(css.contains("em{color:green}"));
    assert!(!css.contains("em{color:red}"));
    Ok(())
}

#[tokio::test]
async fn test_removed_import_updates_relationships_and_markup() -> Result<()> {
    let site = TestSite::new()?;
    site.write_chain()?;

    let mut pipeline = site.pipeline(PluginOptions::default())?;
    pipeline.init().await?;
    let before = pipeline.render_page("data.vue", page("/data/")).await?;
    assert_eq!(before, "<main>/data/<section><em>leaf</em></section></main>");

    site.component("_includes/child.vue", "<section>plain</section>", &[], &["section{margin:1px}"])?;
    pipeline.files_changed(&[site.join("_includes/child.vue")]);
    pipeline.build(None).await?;

    let relationships: Vec<String> = pipeline.relationships().map(ToString::to_string).collect();
    assert_eq!(relationships, vec!["data.json -> child.json"]);
    assert!(!pipeline.graph().has_edge(&ArtifactId::new("child.json"), &ArtifactId::new("grandchild.json")));

    let after = pipeline.render_page("data.vue", page("/data/")).await?;
    assert_eq!(after, "<main>/data/<section>plain</section></main>");

    let css = pipeline.css_for_url("/data/");
    assert!(css.contains("section{margin:1px}"));
    assert!(!css.contains("em{color:red}"));
    Ok(())
}

#[tokio::test]
async fn test_affected_components_walk_importers() -> Result<()> {
    let site = TestSite::new()?;
    site.write_chain()?;
    site.component("other.vue", "<p>other</p>", &[], &[])?;

    let mut pipeline = site.pipeline(PluginOptions::default())?;
    pipeline.init().await?;

    let affected = pipeline.affected_components(&[site.join("_includes/grandchild.vue")]);
    assert_eq!(
        affected,
        vec![
            ComponentId::new("./_includes/child.vue"),
            ComponentId::new("./_includes/grandchild.vue"),
            ComponentId::new("./data.vue"),
        ]
    );

    let dependants = pipeline.dependants_of("_includes/grandchild.vue")?;
    assert_eq!(dependants, vec![ComponentId::new("./_includes/child.vue"), ComponentId::new("./data.vue")]);
    assert!(pipeline.dependants_of("data.vue")?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_non_component_change_is_noop() -> Result<()> {
    let site = TestSite::new()?;
    site.write_chain()?;

    let mut pipeline = site.pipeline(PluginOptions::default())?;
    pipeline.init().await?;
    let before = pipeline.snapshot();

    site.write("notes.md", "# notes")?;
    let kept = pipeline.files_changed(&[site.join("notes.md")]);
    assert!(kept.is_empty());

    let report = pipeline.build(None).await?;
    assert!(report.is_noop());
    assert_eq!(pipeline.snapshot(), before);
    Ok(())
}

#[tokio::test]
async fn test_notifications_accumulate_until_built() -> Result<()> {
    let site = TestSite::new()?;
    site.component("a.vue", "<p>a</p>", &[], &[".a{}"])?;
    site.component("b.vue", "<p>b</p>", &[], &[".b{}"])?;

    let mut pipeline = site.pipeline(PluginOptions::default())?;
    pipeline.init().await?;

    site.component("a.vue", "<p>a2</p>", &[], &[".a2{}"])?;
    site.component("b.vue", "<p>b2</p>", &[], &[".b2{}"])?;
    pipeline.files_changed(&[site.join("a.vue")]);
    pipeline.files_changed(&[site.join("b.vue"), site.join("a.vue")]);
    assert_eq!(pipeline.pending_changes().len(), 2);

    let report = pipeline.build(None).await?;
    assert_eq!(report.files, 2);
    assert_eq!(pipeline.css_store().fragments(&ComponentId::new("./a.vue")), ".a2{}");
    assert_eq!(pipeline.css_store().fragments(&ComponentId::new("./b.vue")), ".b2{}");
    Ok(())
}

#[tokio::test]
async fn test_partial_pass_leaves_snapshot_alone() -> Result<()> {
    let site = TestSite::new()?;
    site.write_chain()?;

    let options = PluginOptions {
        snapshot: SnapshotMode::Write,
        ..PluginOptions::default()
    };
    let mut pipeline = site.pipeline(options)?;
    assert!(pipeline.init().await?.snapshot_written);
    let persisted = pipeline.snapshots().load().await?.expect("snapshot written");

    site.component("_includes/grandchild.vue", "<em>leaf</em>", &[], &["em{color:green}"])?;
    pipeline.files_changed(&[site.join("_includes/grandchild.vue")]);
    let report = pipeline.build(None).await?;

    assert!(report.partial);
    assert!(!report.snapshot_written);
    assert_eq!(pipeline.snapshots().load().await?, Some(persisted));
    Ok(())
}

#[tokio::test]
async fn test_same_stem_components_keep_names_across_partial_passes() -> Result<()> {
    let site = TestSite::new()?;
    site.component(
        "index.vue",
        "<main><CardA /><CardB /></main>",
        &[("CardA", "./a/card.vue"), ("CardB", "./b/card.vue")],
        &[],
    )?;
    site.component("a/card.vue", "<p>a</p>", &[], &[".a{color:red}"])?;
    site.component("b/card.vue", "<p>b</p>", &[], &[".b{color:red}"])?;

    let mut pipeline = site.pipeline(PluginOptions::default())?;
    pipeline.init().await?;
    pipeline.render_page("index.vue", page("/")).await?;

    let a = ComponentId::new("./a/card.vue");
    let b = ComponentId::new("./b/card.vue");
    let a_name = pipeline.registry().artifact_for(&a).cloned().expect("a registered");
    let b_name = pipeline.registry().artifact_for(&b).cloned().expect("b registered");
    assert_ne!(a_name, b_name);
    assert!(a_name.as_str().starts_with("card-"));
    assert!(b_name.as_str().starts_with("card-"));

    site.component("a/card.vue", "<p>a2</p>", &[], &[".a{color:green}"])?;
    pipeline.files_changed(&[site.join("a/card.vue")]);
    pipeline.build(None).await?;
    assert_eq!(pipeline.registry().artifact_for(&a), Some(&a_name));
    assert_eq!(pipeline.registry().artifact_for(&b), Some(&b_name));

    site.component("b/card.vue", "<p>b2</p>", &[], &[".b{color:green}"])?;
    pipeline.files_changed(&[site.join("b/card.vue")]);
    pipeline.build(None).await?;
    assert_eq!(pipeline.registry().artifact_for(&a), Some(&a_name));
    assert_eq!(pipeline.registry().artifact_for(&b), Some(&b_name));
    assert!(!site.join(".cache/vue/card.json").exists());

    let html = pipeline.render_page("index.vue", page("/")).await?;
    assert_eq!(html, "<main><p>a2</p><p>b2</p></main>");

    let css = pipeline.css_for_url("/");
    assert!(css.contains(&format!("/* {a_name} Component */\n.a{{color:green}}")), "{css}");
    assert!(css.contains(&format!("/* {b_name} Component */\n.b{{color:green}}")), "{css}");
    assert!(!css.contains("color:red"));

    let mut relationships: Vec<String> = pipeline.relationships().map(ToString::to_string).collect();
    relationships.sort();
    let mut expected = vec![format!("index.json -> {a_name}"), format!("index.json -> {b_name}")];
    expected.sort();
    assert_eq!(relationships, expected);
    Ok(())
}

#[tokio::test]
async fn test_deleted_component_is_dropped() -> Result<()> {
    let site = TestSite::new()?;
    site.component("index.vue", "<p>home</p>", &[], &[".home{}"])?;
    site.component("old.vue", "<p>old</p>", &[], &[".old{}"])?;

    let mut pipeline = site.pipeline(PluginOptions::default())?;
    pipeline.init().await?;
    pipeline.render_page("old.vue", page("/old/")).await?;
    assert!(pipeline.css_for_url("/old/").contains(".old{}"));
    assert!(site.join(".cache/vue/old.json").exists());

    fs::remove_file(site.join("old.vue"))?;
    let kept = pipeline.files_changed(&[site.join("old.vue")]);
    assert_eq!(kept.len(), 1);

    let report = pipeline.build(None).await?;
    assert!(report.partial);
    assert_eq!(report.files, 0);
    assert_eq!(report.removed, 1);
    assert!(!report.is_noop());

    let old = ComponentId::new("./old.vue");
    assert!(pipeline.registry().artifact_for(&old).is_none());
    assert!(!pipeline.css_store().contains(&old));
    assert_eq!(pipeline.css_for_url("/old/"), "");
    assert!(!site.join(".cache/vue/old.json").exists());
    assert!(pipeline.render_page("old.vue", page("/old/")).await.is_err());

    let html = pipeline.render_page("index.vue", page("/")).await?;
    assert_eq!(html, "<p>home</p>");
    assert!(pipeline.css_for_url("/").contains(".home{}"));
    Ok(())
}

#[tokio::test]
async fn test_deletion_and_edit_in_one_pass() -> Result<()> {
    let site = TestSite::new()?;
    site.component("index.vue", "<p>home</p>", &[], &[".home{}"])?;
    site.component("old.vue", "<p>old</p>", &[], &[".old{}"])?;

    let mut pipeline = site.pipeline(PluginOptions::default())?;
    pipeline.init().await?;

    fs::remove_file(site.join("old.vue"))?;
    site.component("index.vue", "<p>home2</p>", &[], &[".home2{}"])?;
    pipeline.files_changed(&[site.join("old.vue"), site.join("index.vue")]);

    let report = pipeline.build(None).await?;
    assert_eq!(report.files, 1);
    assert_eq!(report.removed, 1);
    assert_eq!(pipeline.registry().len(), 1);
    assert_eq!(pipeline.css_store().fragments(&ComponentId::new("./index.vue")), ".home2{}");

    pipeline.files_changed(&[site.join("never.vue")]);
    assert!(pipeline.build(None).await?.is_noop());
    Ok(())
}
