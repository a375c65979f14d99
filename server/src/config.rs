//! Server configuration parsed from environment variables.
//!
//! Every knob has a default, so an empty environment yields a working
//! server. Unparseable values fall back to the default with a warning.

use std::time::Duration;

use stencil::form::AutoPolicy;
use tracing::warn;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_MAX_SVG_BYTES: usize = 5 * 1024 * 1024;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 1800;
pub const DEFAULT_REAPER_INTERVAL_SECS: u64 = 60;
pub const DEFAULT_MAX_SESSIONS: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    pub bind_addr: String,
    /// Largest SVG document accepted by any endpoint.
    pub max_svg_bytes: usize,
    /// Editor sessions idle longer than this are evicted.
    pub session_ttl: Duration,
    pub reaper_interval: Duration,
    /// Default policy for `AUTO:` rules when a request does not name one.
    pub auto_policy: AutoPolicy,
    pub max_sessions: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind_addr: DEFAULT_BIND_ADDR.to_owned(),
            max_svg_bytes: DEFAULT_MAX_SVG_BYTES,
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            reaper_interval: Duration::from_secs(DEFAULT_REAPER_INTERVAL_SECS),
            auto_policy: AutoPolicy::default(),
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

impl Config {
    /// Build config from the process environment.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `BIND_ADDR`: default `0.0.0.0`
    /// - `STENCIL_MAX_SVG_BYTES`: default 5 MiB
    /// - `STENCIL_SESSION_TTL_SECS`: default 1800
    /// - `STENCIL_REAPER_INTERVAL_SECS`: default 60
    /// - `STENCIL_AUTO_POLICY`: `on_dependency_change` (default) or `on_load`
    /// - `STENCIL_MAX_SESSIONS`: default 256
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from any key lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let ttl_secs = env_parse(&lookup, "STENCIL_SESSION_TTL_SECS", DEFAULT_SESSION_TTL_SECS);
        let reaper_secs = env_parse(&lookup, "STENCIL_REAPER_INTERVAL_SECS", DEFAULT_REAPER_INTERVAL_SECS);

        Self {
            port: env_parse(&lookup, "PORT", DEFAULT_PORT),
            bind_addr: lookup("BIND_ADDR")
                .filter(|addr| !addr.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned()),
            max_svg_bytes: env_parse(&lookup, "STENCIL_MAX_SVG_BYTES", DEFAULT_MAX_SVG_BYTES),
            session_ttl: Duration::from_secs(ttl_secs),
            // A zero interval would spin the reaper.
            reaper_interval: Duration::from_secs(reaper_secs.max(1)),
            auto_policy: env_parse(&lookup, "STENCIL_AUTO_POLICY", AutoPolicy::default()),
            max_sessions: env_parse(&lookup, "STENCIL_MAX_SESSIONS", DEFAULT_MAX_SESSIONS),
        }
    }
}

fn env_parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => value,
        Err(_) => {
            warn!(key, value = %raw, "unparseable config value, using default");
            default
        }
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
