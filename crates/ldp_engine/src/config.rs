//! Process-wide engine configuration (spec.md §6 "Configuration"), loaded
//! once at startup and read-only thereafter (spec.md §5: "Configuration
//! is process-wide, loaded at startup, read-only thereafter").

use std::collections::BTreeMap;
use std::time::Duration;

/// A single `WWW-Authenticate` challenge scheme, offered on anonymous
/// denial (spec.md §4.4).
#[derive(Debug, Clone)]
pub struct AuthChallenge {
    /// Challenge scheme, e.g. `Bearer`.
    pub scheme: String,
    /// Realm parameter applied to every challenge (spec.md §4.4: "each
    /// challenge includes a realm parameter").
    pub realm: String,
}

/// CORS policy (spec.md §4.5).
#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Allowed origins; `["*"]` permits any origin.
    pub allowed_origins: Vec<String>,
    /// Allowed request methods.
    pub allowed_methods: Vec<String>,
    /// Allowed request headers (matched case-insensitively).
    pub allowed_headers: Vec<String>,
    /// Headers exposed to the client on simple responses.
    pub exposed_headers: Vec<String>,
    /// Whether `Access-Control-Allow-Credentials: true` is sent.
    pub allow_credentials: bool,
    /// `Access-Control-Max-Age`, in seconds.
    pub max_age: Duration,
}

/// Process-wide configuration for the protocol engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// External base URL, without a trailing slash.
    pub base_url: String,
    /// CORS policy.
    pub cors: CorsConfig,
    /// Challenges offered on anonymous-agent denial.
    pub auth_challenges: Vec<AuthChallenge>,
    /// `Cache-Control` max-age applied to successful reads.
    pub cache_max_age: Duration,
    /// WebSub hub URL advertised via `Link rel="hub"`, if configured.
    pub websub_hub_url: Option<String>,
    /// `ext` query parameter to named-graph mapping (spec.md §6 default:
    /// `acl` → access-control graph).
    pub extension_graph_map: BTreeMap<String, String>,
    /// Whether PUT may create a resource outside its parent's existing
    /// containment (spec.md §4.8's "PUT-UNCONTAINED mode").
    pub put_uncontained: bool,
    /// Whether DELETE purges binary content immediately rather than
    /// leaving it for later reclamation.
    pub purge_binary_on_delete: bool,
    /// JSON-LD profile used when a request names none explicitly.
    pub default_json_ld_profile: ldp_http::conneg::JsonLdProfile,
    /// Whether PATCH against a missing resource creates it (Open
    /// Question decision, SPEC_FULL.md §9) rather than returning 404.
    pub patch_creates_missing: bool,
}

impl EngineConfig {
    /// A configuration with the spec's documented defaults.
    pub fn with_defaults(base_url: impl Into<String>) -> Self {
        let mut extension_graph_map = BTreeMap::new();
        extension_graph_map.insert("acl".to_owned(), "PreferAccessControl".to_owned());

        Self {
            base_url: base_url.into(),
            cors: CorsConfig {
                allowed_origins: vec!["*".to_owned()],
                allowed_methods: vec![
                    "GET".to_owned(),
                    "HEAD".to_owned(),
                    "OPTIONS".to_owned(),
                    "POST".to_owned(),
                    "PUT".to_owned(),
                    "PATCH".to_owned(),
                    "DELETE".to_owned(),
                ],
                allowed_headers: vec![
                    "content-type".to_owned(),
                    "authorization".to_owned(),
                    "link".to_owned(),
                    "slug".to_owned(),
                    "prefer".to_owned(),
                    "if-match".to_owned(),
                    "if-none-match".to_owned(),
                ],
                exposed_headers: vec!["etag".to_owned(), "location".to_owned()],
                allow_credentials: false,
                max_age: Duration::from_secs(86400),
            },
            auth_challenges: vec![AuthChallenge {
                scheme: "Bearer".to_owned(),
                realm: base_url_realm(),
            }],
            cache_max_age: Duration::from_secs(60),
            websub_hub_url: None,
            extension_graph_map,
            put_uncontained: false,
            purge_binary_on_delete: false,
            default_json_ld_profile: ldp_http::conneg::JsonLdProfile::Compacted,
            patch_creates_missing: false,
        }
    }
}

fn base_url_realm() -> String {
    "ldp".to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_map_acl_extension_to_access_control_graph() {
        let config = EngineConfig::with_defaults("https://pod.example/storage");
        assert_eq!(
            config.extension_graph_map.get("acl").map(String::as_str),
            Some("PreferAccessControl")
        );
    }
}
