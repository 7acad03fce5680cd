//! Build-time configuration for the bootstrap.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every flag is read with `option_env!` when the WASM bundle is compiled,
//! so a given bundle always behaves the same way. Unset flags fall back to
//! defaults derived from the cargo profile.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::time::Duration;

/// Slices of the state tree that survive between sessions.
pub const PERSISTED_SLICES: [&str; 3] = ["auth", "info", "chat"];

/// Whether this bundle was built for development or production.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildMode {
    Development,
    Production,
}

impl BuildMode {
    /// Parse an `APP_ENV` value. Unknown values yield `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Some(Self::Production),
            "development" | "dev" => Some(Self::Development),
            _ => None,
        }
    }

    /// Mode implied by the cargo profile.
    pub fn from_profile() -> Self {
        if cfg!(debug_assertions) { Self::Development } else { Self::Production }
    }

    pub fn is_production(self) -> bool {
        self == Self::Production
    }

    pub fn is_development(self) -> bool {
        self == Self::Development
    }
}

/// Parse a boolean build flag (`1/true/yes/on`, `0/false/no/off`).
pub fn parse_flag(raw: Option<&str>) -> Option<bool> {
    match raw?.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Which state slices are persisted and under which key prefix.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersistConfig {
    pub key_prefix: String,
    pub whitelist: Vec<String>,
}

impl PersistConfig {
    /// Storage key for a slice.
    pub fn key_for(&self, slice: &str) -> String {
        format!("{}{slice}", self.key_prefix)
    }

    pub fn allows(&self, slice: &str) -> bool {
        self.whitelist.iter().any(|s| s == slice)
    }
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self {
            key_prefix: "persist:".to_owned(),
            whitelist: PERSISTED_SLICES.iter().map(|s| (*s).to_owned()).collect(),
        }
    }
}

/// All constants the bootstrap consumes.
#[derive(Clone, Debug)]
pub struct BootConfig {
    pub mode: BuildMode,
    /// Mount the in-page dev tools tree (development only).
    pub devtools: bool,
    /// Element id holding the server-rendered markup.
    pub mount_id: String,
    /// Attribute the server puts on the root element it rendered.
    pub ssr_marker: String,
    pub service_worker_path: String,
    pub service_worker_scope: String,
    /// Websocket path for the realtime channel.
    pub socket_path: String,
    /// Base of the primary service client, also used for authentication.
    pub api_base: String,
    /// Base of the plain-HTTP `rest_app` client.
    pub rest_api_base: String,
    /// Fetched by the connectivity probe.
    pub probe_url: String,
    pub probe_timeout: Duration,
    pub auth_timeout: Duration,
    /// Port of the cargo-leptos live-reload websocket.
    pub reload_port: u16,
    /// Storage key of the access token used by `authenticate`.
    pub token_key: String,
    pub persist: PersistConfig,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            mode: BuildMode::from_profile(),
            devtools: false,
            mount_id: "content".to_owned(),
            ssr_marker: "data-ssr-root".to_owned(),
            service_worker_path: "/dist/service-worker.js".to_owned(),
            service_worker_scope: "/".to_owned(),
            socket_path: "/ws".to_owned(),
            api_base: "/api".to_owned(),
            rest_api_base: "/api/rest".to_owned(),
            probe_url: "/favicon.ico".to_owned(),
            probe_timeout: Duration::from_secs(3),
            auth_timeout: Duration::from_secs(10),
            reload_port: 3001,
            token_key: "auth-token".to_owned(),
            persist: PersistConfig::default(),
        }
    }
}

impl BootConfig {
    /// Build the config from compile-time flags.
    pub fn from_build_env() -> Self {
        Self::from_flags(option_env!("APP_ENV"), option_env!("APP_DEVTOOLS"), option_env!("APP_RELOAD_PORT"))
    }

    fn from_flags(env: Option<&str>, devtools: Option<&str>, reload_port: Option<&str>) -> Self {
        let defaults = Self::default();
        Self {
            mode: env.and_then(BuildMode::parse).unwrap_or(defaults.mode),
            devtools: parse_flag(devtools).unwrap_or(false),
            reload_port: reload_port
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(defaults.reload_port),
            ..defaults
        }
    }

    /// Dev tools are only ever mounted outside production.
    pub fn devtools_enabled(&self) -> bool {
        self.devtools && !self.mode.is_production()
    }
}
