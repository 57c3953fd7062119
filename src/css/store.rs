//! Per-component style fragment storage.

use std::collections::{BTreeMap, HashMap};

use crate::core::ComponentId;

/// Ordered style fragments keyed by component.
///
/// Fragments keep the order the compiler emitted them in. Each fragment is
/// trimmed on insert and whitespace-only fragments are never stored, so a
/// component with no real CSS has no entry at all.
#[derive(Debug, Default, Clone)]
pub struct CssStore {
    fragments: HashMap<ComponentId, Vec<String>>,
}

impl CssStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a trimmed fragment for `id`. Empty fragments are dropped.
    pub fn add_fragment(&mut self, id: &ComponentId, text: &str) {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return;
        }
        self.fragments.entry(id.clone()).or_default().push(trimmed.to_string());
    }

    /// All fragments for `id` joined with `\n`, or `""` when none were recorded.
    pub fn fragments(&self, id: &ComponentId) -> String {
        self.fragments.get(id).map(|list| list.join("\n")).unwrap_or_default()
    }

    /// The stored fragment list for `id`.
    pub fn raw(&self, id: &ComponentId) -> &[String] {
        self.fragments.get(id).map_or(&[], Vec::as_slice)
    }

    /// Whether any fragment is stored for `id`.
    pub fn contains(&self, id: &ComponentId) -> bool {
        self.fragments.contains_key(id)
    }

    /// Clear every component's fragments.
    pub fn reset_all(&mut self) {
        self.fragments.clear();
    }

    /// Clear one component's fragments, leaving all others untouched.
    pub fn reset_one(&mut self, id: &ComponentId) {
        self.fragments.remove(id);
    }

    /// Replace the fragments of `id` in one step.
    ///
    /// This is the unit readers observe: the previous list is dropped and the
    /// new one installed without an intermediate partially filled state.
    pub fn replace<I, S>(&mut self, id: &ComponentId, fragments: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let list: Vec<String> = fragments
            .into_iter()
            .map(|text| text.as_ref().trim().to_string())
            .filter(|text| !text.is_empty())
            .collect();

        if list.is_empty() {
            self.fragments.remove(id);
        } else {
            self.fragments.insert(id.clone(), list);
        }
    }

    /// Number of components with stored fragments.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Whether the store holds no fragments.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Sorted copy of the store for persistence.
    pub fn snapshot(&self) -> BTreeMap<ComponentId, Vec<String>> {
        self.fragments.iter().map(|(id, list)| (id.clone(), list.clone())).collect()
    }

    /// Rebuild the store from a persisted snapshot, discarding current contents.
    pub fn restore(&mut self, snapshot: BTreeMap<ComponentId, Vec<String>>) {
        self.fragments.clear();
        for (id, list) in snapshot {
            self.replace(&id, list);
        }
    }
}
