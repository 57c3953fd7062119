//! Integration test suite for stylegraph
//!
//! End-to-end tests that build real component projects in temporary
//! directories, drive the pipeline through its public API and run the
//! `stylegraph` binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! RUST_LOG=stylegraph=debug cargo test --test integration -- --nocapture
//! ```
//!
//! # Test Organization
//!
//! - **build_pipeline**: Full passes, rendering and empty passes
//! - **css_aggregation**: Per-page CSS ordering and deduplication
//! - **watch_mode**: Change notifications and partial passes
//! - **snapshot**: Snapshot persistence, restore and corruption fallback
//! - **cli**: The `stylegraph` command-line interface

#[path = "../common/mod.rs"]
mod common;

mod build_pipeline;
mod cli;
mod css_aggregation;
mod snapshot;
mod watch_mode;
