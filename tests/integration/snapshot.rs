//! Snapshot persistence, restore and corruption fallback

use crate::common::{TestSite, page};
use anyhow::Result;
use std::fs;
use stylegraph::config::{PluginOptions, SnapshotMode};

fn read_mode() -> PluginOptions {
    PluginOptions {
        snapshot: SnapshotMode::Read,
        ..PluginOptions::default()
    }
}

#[tokio::test]
async fn test_restore_matches_live_build() -> Result<()> {
    let site = TestSite::new()?;
    site.write_chain()?;

    let mut live = site.pipeline(read_mode())?;
    let report = live.init().await?;
    assert!(!report.restored);
    assert!(report.snapshot_written);
    assert!(live.snapshots().exists());

    let mut restored = site.pipeline(read_mode())?;
    let report = restored.init().await?;
    assert!(report.restored);
    assert_eq!(report.components, 3);
    assert_eq!(report.relationships, 2);
    assert_eq!(restored.snapshot(), live.snapshot());

    let live_html = live.render_page("data.vue", page("/data/")).await?;
    let restored_html = restored.render_page("data.vue", page("/data/")).await?;
    assert_eq!(restored_html, live_html);
    assert_eq!(restored.css_for_url("/data/"), live.css_for_url("/data/"));
    assert_eq!(
        restored.dependants_of("_includes/grandchild.vue")?,
        live.dependants_of("_includes/grandchild.vue")?
    );
    Ok(())
}

#[tokio::test]
async fn test_corrupt_snapshot_falls_back_to_build() -> Result<()> {
    let site = TestSite::new()?;
    site.write_chain()?;

    let mut first = site.pipeline(read_mode())?;
    first.init().await?;
    let snapshot_path = first.snapshots().snapshot_path();
    fs::write(&snapshot_path, "{ not json")?;

    let mut second = site.pipeline(read_mode())?;
    let report = second.init().await?;
    assert!(!report.restored);
    assert_eq!(report.files, 3);
    assert!(report.snapshot_written);
    assert_eq!(second.snapshot(), first.snapshot());

    let mut third = site.pipeline(read_mode())?;
    assert!(third.init().await?.restored);
    Ok(())
}

#[tokio::test]
async fn test_snapshot_with_missing_artifact_is_rebuilt() -> Result<()> {
    let site = TestSite::new()?;
    site.write_chain()?;

    let mut first = site.pipeline(read_mode())?;
    first.init().await?;
    fs::remove_file(first.dirs().cache_dir.join("child.json"))?;

    let mut second = site.pipeline(read_mode())?;
    let report = second.init().await?;
    assert!(!report.restored);
    assert!(second.dirs().cache_dir.join("child.json").exists());
    Ok(())
}

#[tokio::test]
async fn test_write_mode_always_compiles() -> Result<()> {
    let site = TestSite::new()?;
    site.write_chain()?;
    let options = PluginOptions {
        snapshot: SnapshotMode::Write,
        ..PluginOptions::default()
    };

    site.pipeline(options.clone())?.init().await?;
    let report = site.pipeline(options)?.init().await?;
    assert!(!report.restored);
    assert!(report.snapshot_written);
    Ok(())
}

#[tokio::test]
async fn test_disabled_mode_writes_nothing() -> Result<()> {
    let site = TestSite::new()?;
    site.write_chain()?;

    let mut pipeline = site.pipeline(PluginOptions::default())?;
    let report = pipeline.init().await?;
    assert!(!report.snapshot_written);
    assert!(!pipeline.snapshots().exists());
    Ok(())
}
