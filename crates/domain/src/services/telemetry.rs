//! Process-wide tracing subscriber and Prometheus recorder.
//!
//! Both are global, so [`init_telemetry`] installs them once and hands every
//! later caller the same [`TelemetryGuard`].

use std::{env, sync::Arc};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{hydrate_env_file, ConfigError};

static TELEMETRY: OnceCell<TelemetryGuard> = OnceCell::new();

/// Filter used when `<PREFIX>_LOG_FILTER` is unset or blank.
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    log_filter: String,
}

impl TelemetryConfig {
    pub fn new(log_filter: impl Into<String>) -> Self {
        Self {
            log_filter: log_filter.into(),
        }
    }

    /// Reads `<PREFIX>_LOG_FILTER` (e.g. `API_LOG_FILTER`).
    pub fn from_env(prefix: &str) -> Result<Self, TelemetryError> {
        hydrate_env_file()?;
        let key = format!("{}_LOG_FILTER", prefix.trim().to_ascii_uppercase());
        let filter = env::var(key)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());
        Ok(Self::new(filter))
    }

    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    fn env_filter(&self) -> Result<EnvFilter, TelemetryError> {
        EnvFilter::try_new(&self.log_filter)
            .map_err(|err| TelemetryError::InvalidLogFilter(err.to_string()))
    }
}

/// Handle on the installed recorder; cheap to clone into app state.
#[derive(Clone)]
pub struct TelemetryGuard {
    metrics: Arc<PrometheusHandle>,
}

impl TelemetryGuard {
    pub fn render_metrics(&self) -> String {
        self.metrics.render()
    }
}

/// Installs the subscriber and recorder on first call. Later calls return
/// the existing guard and ignore `config`.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    TELEMETRY
        .get_or_try_init(|| {
            tracing_subscriber::registry()
                .with(config.env_filter()?)
                .with(tracing_subscriber::fmt::layer().with_target(true))
                .try_init()
                .map_err(|err| TelemetryError::Tracing(err.to_string()))?;

            let handle = PrometheusBuilder::new()
                .install_recorder()
                .map_err(|err| TelemetryError::Metrics(err.to_string()))?;
            debug!(filter = config.log_filter(), "telemetry initialized");

            Ok(TelemetryGuard {
                metrics: Arc::new(handle),
            })
        })
        .cloned()
}

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid log filter: {0}")]
    InvalidLogFilter(String),
    #[error("failed to install tracing subscriber: {0}")]
    Tracing(String),
    #[error("failed to install metrics recorder: {0}")]
    Metrics(String),
}
