//! Deployment configuration (spec.md §6 "Configuration"): the socket to
//! bind plus the subset of [`EngineConfig`] an operator can override from
//! a config file, following the teacher's `RcpServerConfig` shape — a
//! plain `serde`-deserializable struct loaded once at startup via the
//! `config` crate.

use std::net::SocketAddr;
use std::time::Duration;

use ldp_engine::config::EngineConfig;

/// Top-level deployment configuration.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct ServerConfig {
    /// Socket address to bind.
    pub addr: SocketAddr,
    /// External base URL advertised in responses, without a trailing
    /// slash (spec.md §3).
    pub base_url: String,
    /// WebSub hub URL advertised via `Link rel="hub"`, if configured.
    #[serde(default)]
    pub websub_hub_url: Option<String>,
    /// `Cache-Control` max-age, in seconds, applied to successful reads.
    #[serde(default = "default_cache_max_age_secs")]
    pub cache_max_age_secs: u64,
    /// Whether DELETE purges binary content immediately.
    #[serde(default)]
    pub purge_binary_on_delete: bool,
    /// Whether PATCH against a missing resource creates it rather than
    /// returning 404 (SPEC_FULL.md §9 Open Question decision).
    #[serde(default)]
    pub patch_creates_missing: bool,
}

fn default_cache_max_age_secs() -> u64 {
    60
}

impl ServerConfig {
    /// Build the [`EngineConfig`] this deployment config describes,
    /// layered over [`EngineConfig::with_defaults`] for everything this
    /// struct doesn't expose (CORS policy, auth challenges, extension
    /// mapping...).
    pub fn engine_config(&self) -> EngineConfig {
        let mut engine = EngineConfig::with_defaults(self.base_url.clone());
        engine.websub_hub_url = self.websub_hub_url.clone();
        engine.cache_max_age = Duration::from_secs(self.cache_max_age_secs);
        engine.purge_binary_on_delete = self.purge_binary_on_delete;
        engine.patch_creates_missing = self.patch_creates_missing;
        engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_config_carries_overrides() {
        let config = ServerConfig {
            addr: "127.0.0.1:8080".parse().unwrap(),
            base_url: "https://pod.example/storage".to_owned(),
            websub_hub_url: Some("https://hub.example/".to_owned()),
            cache_max_age_secs: 30,
            purge_binary_on_delete: true,
            patch_creates_missing: true,
        };
        let engine = config.engine_config();
        assert_eq!(engine.base_url, "https://pod.example/storage");
        assert_eq!(engine.cache_max_age, Duration::from_secs(30));
        assert!(engine.purge_binary_on_delete);
        assert!(engine.patch_creates_missing);
    }
}
