//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Pages read the store and `Helpers` from context; the route table in
//! `routes` decides which one renders.

pub mod chat;
pub mod home;
pub mod login;
pub mod not_found;
pub mod route_error;
