//! Per-path scroll restoration for client-side navigation.
//!
//! Leaving a path records its vertical offset; entering a path seen before
//! restores that offset, and a new path starts at the top.

#[cfg(test)]
#[path = "scroll_test.rs"]
mod scroll_test;

use std::collections::HashMap;

use leptos::prelude::*;

use crate::state::Store;

/// Remembered scroll offsets keyed by path.
#[derive(Clone, Debug, Default)]
pub struct ScrollMemory {
    offsets: HashMap<String, f64>,
}

impl ScrollMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the offset of the path being left.
    pub fn leave(&mut self, path: &str, offset: f64) {
        self.offsets.insert(path.to_owned(), offset.max(0.0));
    }

    /// Offset to scroll to when entering `path`.
    pub fn enter(&self, path: &str) -> f64 {
        self.offsets.get(path).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

#[cfg(feature = "hydrate")]
fn current_offset() -> f64 {
    web_sys::window().and_then(|w| w.scroll_y().ok()).unwrap_or(0.0)
}

#[cfg(not(feature = "hydrate"))]
fn current_offset() -> f64 {
    0.0
}

#[cfg(feature = "hydrate")]
fn scroll_to(offset: f64) {
    if let Some(window) = web_sys::window() {
        window.scroll_to_with_x_and_y(0.0, offset);
    }
}

#[cfg(not(feature = "hydrate"))]
fn scroll_to(_offset: f64) {}

#[component]
pub fn ScrollRestoration() -> impl IntoView {
    let store = expect_context::<Store>();
    let history = store.history_signal();
    let memory = StoredValue::new(ScrollMemory::new());

    Effect::new(move |prev: Option<String>| {
        let path = history.with(|h| h.location.clone());
        if let Some(prev) = prev.filter(|p| *p != path) {
            let offset = current_offset();
            memory.update_value(|m| m.leave(&prev, offset));
            scroll_to(memory.with_value(|m| m.enter(&path)));
        }
        path
    });
}
