//! Reusable UI component modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! These components form the boundaries the hydrated tree is wrapped in:
//! context provider, router/store bridge, scroll restoration, the route
//! outlet, and the dev-tools panel.

pub mod devtools;
pub mod history_bridge;
pub mod provider;
pub mod route_outlet;
pub mod scroll;
