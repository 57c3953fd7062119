//! The `stylegraph` command-line interface

use crate::common::TestSite;
use anyhow::Result;
use predicates::prelude::*;
use predicates::str::contains;

#[test]
fn test_build_prints_summary() -> Result<()> {
    let site = TestSite::new()?;
    site.write_chain()?;

    site.cmd()
        .arg("build")
        .assert()
        .success()
        .stdout(contains("Built 3 components (2 relationships)"))
        .stdout(contains("snapshot written").not());
    assert!(site.join(".cache/vue/data.json").exists());
    Ok(())
}

#[test]
fn test_build_json_report() -> Result<()> {
    let site = TestSite::new()?;
    site.write_chain()?;

    let output = site.cmd().args(["build", "--json"]).output()?;
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(report["components"], 3);
    assert_eq!(report["relationships"], 2);
    assert_eq!(report["partial"], false);
    Ok(())
}

#[test]
fn test_build_empty_project() -> Result<()> {
    let site = TestSite::new()?;

    site.cmd()
        .arg("build")
        .assert()
        .success()
        .stdout(contains("No component files found, nothing to build"));
    Ok(())
}

#[test]
fn test_build_with_files_is_partial() -> Result<()> {
    let site = TestSite::new()?;
    site.write_chain()?;

    site.cmd()
        .args(["build", "--files", "_includes/grandchild.vue"])
        .assert()
        .success()
        .stdout(contains("Built 1 components (0 relationships)"))
        .stdout(contains("partial pass, snapshot left unchanged"));
    Ok(())
}

#[test]
fn test_build_restores_snapshot_in_read_mode() -> Result<()> {
    let site = TestSite::new()?;
    site.write_chain()?;
    site.config("snapshot = \"read\"\n")?;

    site.cmd().arg("build").assert().success().stdout(contains("snapshot written"));
    site.cmd()
        .arg("build")
        .assert()
        .success()
        .stdout(contains("Restored 3 components (2 relationships)"));
    Ok(())
}

#[test]
fn test_render_prints_markup_and_css() -> Result<()> {
    let site = TestSite::new()?;
    site.write_chain()?;

    site.cmd()
        .args(["render", "data.vue", "--url", "/data/"])
        .assert()
        .success()
        .stdout(contains("<main>/data/<section><em>leaf</em></section></main>"))
        .stdout(contains("<style>\n/* data.json Component */\nbody{color:blue}"))
        .stdout(contains("/* grandchild.json Component */\nem{color:red}\n</style>"));
    Ok(())
}

#[test]
fn test_render_with_data_cascade() -> Result<()> {
    let site = TestSite::new()?;
    site.component("index.vue", "<h1>{{ title }}</h1>", &[], &[])?;

    site.cmd()
        .args(["render", "index.vue", "--no-css", "--data", r#"{"title": "Home"}"#])
        .assert()
        .success()
        .stdout(contains("<h1>Home</h1>"))
        .stdout(contains("<style>").not());
    Ok(())
}

#[test]
fn test_render_unknown_component_fails() -> Result<()> {
    let site = TestSite::new()?;
    site.write_chain()?;

    site.cmd()
        .args(["render", "missing.vue", "--url", "/"])
        .assert()
        .failure()
        .stderr(contains("\"./missing.vue\" is not a valid component"));
    Ok(())
}

#[test]
fn test_css_for_components() -> Result<()> {
    let site = TestSite::new()?;
    site.write_chain()?;

    site.cmd()
        .args(["css", "_includes/grandchild.vue", "--url", "/leaf/"])
        .assert()
        .success()
        .stdout(contains("/* grandchild.json Component */\nem{color:red}"))
        .stdout(contains("body{color:blue}").not());
    Ok(())
}

#[test]
fn test_graph_tree_and_dependants() -> Result<()> {
    let site = TestSite::new()?;
    site.write_chain()?;

    site.cmd()
        .args(["graph", "data.vue"])
        .assert()
        .success()
        .stdout(contains("data.json\n└── child.json\n    └── grandchild.json"))
        .stdout(contains("none"));

    site.cmd()
        .args(["graph", "_includes/grandchild.vue"])
        .assert()
        .success()
        .stdout(contains("./_includes/child.vue"))
        .stdout(contains("./data.vue"));
    Ok(())
}

#[test]
fn test_graph_json() -> Result<()> {
    let site = TestSite::new()?;
    site.write_chain()?;

    let output = site.cmd().args(["graph", "_includes/child.vue", "--json"]).output()?;
    assert!(output.status.success());

    let graph: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(graph["component"], "./_includes/child.vue");
    assert_eq!(graph["artifact"], "child.json");
    assert_eq!(graph["imports"], serde_json::json!(["grandchild.json"]));
    assert_eq!(graph["dependants"], serde_json::json!(["./data.vue"]));
    Ok(())
}

#[test]
fn test_invalid_config_fails() -> Result<()> {
    let site = TestSite::new()?;
    site.config("extension = \"\"\n")?;

    site.cmd().arg("build").assert().failure().stderr(contains("extension must not be empty"));
    Ok(())
}

#[test]
fn test_missing_project_dir_fails() {
    let site = TestSite::new().unwrap();
    let mut cmd = assert_cmd::Command::cargo_bin("stylegraph").unwrap();
    cmd.args(["--no-progress", "-C"])
        .arg(site.join("nope"))
        .arg("build")
        .assert()
        .failure();
}
