//! Rules for seeding the store from injected, persisted, and connectivity
//! state.
//!
//! DESIGN
//! ======
//! Offline sessions start from what was persisted, corrected by whatever the
//! server injected. Online sessions trust the server only; persisted slices
//! could be stale and are dropped entirely.

#[cfg(test)]
#[path = "merge_test.rs"]
mod merge_test;

use serde_json::Value;

use super::tree::{ONLINE_KEY, StateTree};

/// Build the tree handed to `create_store`.
///
/// `stored` is expected to be whitelisted already (see `persist`).
pub fn merge_initial_state(online: bool, stored: StateTree, injected: Option<&StateTree>) -> StateTree {
    let mut merged = if online { StateTree::new() } else { stored };
    if let Some(injected) = injected {
        merged.overlay(injected);
    }
    merged.set_slice(ONLINE_KEY, Value::Bool(online));
    merged
}
