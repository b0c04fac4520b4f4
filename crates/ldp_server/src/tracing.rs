//! Tracing setup, adapted from the teacher's `manas_server::tracing`
//! minus its `tracing_log::LogTracer` bridge (this workspace has no
//! dependents still logging through the `log` facade, so nothing needs
//! bridging into `tracing`).

use tracing::{subscriber::set_global_default, Subscriber};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

/// Build a subscriber honoring `RUST_LOG` if set, falling back to
/// `default_level` otherwise.
pub fn get_subscriber(default_level: impl Into<String>) -> impl Subscriber + Send + Sync {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level.into()));
    let formatting_layer = fmt::Layer::default().pretty();
    Registry::default().with(env_filter).with(formatting_layer)
}

/// Register `subscriber` as the process-wide default. Call exactly once.
pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) {
    set_global_default(subscriber).expect("failed to set tracing subscriber");
}
