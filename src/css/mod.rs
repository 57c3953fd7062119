//! Style bookkeeping.
//!
//! [`CssStore`] keeps the raw fragments the compiler emits, keyed by source
//! component. [`CssAggregator`] keeps the per-artifact copy used at render time
//! together with page usage and import relationships, and produces the CSS for
//! one output URL.

mod aggregator;
mod store;

pub use aggregator::CssAggregator;
pub use store::CssStore;
