//! # Source-Mode Configuration
//!
//! Runtime parameters for the mode controller: the backend endpoints the
//! probes target, the polling cadences, the probe timeout, and the shape of
//! the animated transition. Both base URLs are parsed and joined eagerly so
//! the monitors never have to handle URL errors on the hot path.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::persist::mode_file::ModeFile;

/// Configuration for a [`crate::SourceModeManager`] instance.
///
/// Construct with [`SourceModeConfig::new`] and adjust the public fields
/// before handing it to the manager. Defaults match the production dashboard:
/// 15s health polling with a 5s probe timeout, 60s authorization polling, and
/// a ten-step transition at 50ms per step.
#[derive(Debug, Clone)]
pub struct SourceModeConfig {
    /// Liveness probe endpoint (`<health-base>/health/`). 2xx means healthy.
    pub health_url: Url,
    /// Aggregate source-health endpoint (`<health-base>/health/sources`),
    /// the first authorization fallback.
    pub sources_health_url: Url,
    /// Dedicated Live-authorization endpoint (`<api-base>/live-mode/status`).
    pub live_status_url: Url,
    /// Best-effort post-switch populate endpoint (`<api-base>/live-mode/populate`).
    pub populate_url: Url,
    /// Optional bearer token attached to probe requests.
    pub auth_token: Option<String>,
    /// Upper bound on any single probe request.
    pub probe_timeout: Duration,
    /// Cadence of the connection health poll while in Live mode.
    pub health_interval: Duration,
    /// Cadence of the Live authorization poll, regardless of mode.
    pub auth_interval: Duration,
    /// Number of equal progress increments in an animated transition.
    pub transition_steps: u32,
    /// Fixed delay between progress increments.
    pub transition_step_delay: Duration,
    /// Location of the persisted mode file.
    pub persist_path: PathBuf,
    /// Capacity of the broadcast channel behind [`crate::EventBus`].
    pub bus_capacity: usize,
}

impl SourceModeConfig {
    /// Builds a configuration from the two backend base URLs.
    ///
    /// Both bases must be absolute and should end with a trailing slash so
    /// that endpoint paths join underneath them rather than replacing the
    /// final path segment.
    ///
    /// # Errors
    /// Returns an error if either base fails to parse as an absolute URL or
    /// an endpoint path cannot be joined onto it.
    pub fn new(health_base: &str, api_base: &str) -> anyhow::Result<Self> {
        let health = Url::parse(health_base)?;
        let api = Url::parse(api_base)?;

        Ok(Self {
            health_url: health.join("health/")?,
            sources_health_url: health.join("health/sources")?,
            live_status_url: api.join("live-mode/status")?,
            populate_url: api.join("live-mode/populate")?,
            auth_token: None,
            probe_timeout: Duration::from_secs(5),
            health_interval: Duration::from_secs(15),
            auth_interval: Duration::from_secs(60),
            transition_steps: 10,
            transition_step_delay: Duration::from_millis(50),
            persist_path: ModeFile::default_location(),
            bus_capacity: 32,
        })
    }
}
