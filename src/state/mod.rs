//! Application state: the state tree, its merge rules, persistence, and the
//! store that owns it.
//!
//! SYSTEM CONTEXT
//! ==============
//! `merge` decides what seeds the store, `persist` moves whitelisted slices
//! between the store and browser storage, and `history` keeps the router and
//! the store's location slice in step.

pub mod history;
pub mod merge;
pub mod persist;
pub mod store;
pub mod tree;

pub use store::{Action, Store, StoreId, create_store};
pub use tree::StateTree;
