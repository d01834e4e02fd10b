use axum::{extract::State, http::StatusCode, response::IntoResponse};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;

use crate::AppState;

const LATENCY_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

pub struct MetricsState {
    pub handle: PrometheusHandle,
}

impl MetricsState {
    /// A handle that is not installed as the global recorder (tests, embedding)
    pub fn detached() -> Self {
        let recorder = PrometheusBuilder::new().build_recorder();
        MetricsState {
            handle: recorder.handle(),
        }
    }
}

fn builder() -> Result<PrometheusBuilder, String> {
    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            LATENCY_BUCKETS,
        )
        .map_err(|e| format!("failed to set histogram buckets: {}", e))
}

/// Set up the Prometheus metrics recorder
pub fn setup_metrics_recorder() -> Result<MetricsState, String> {
    let handle = builder()?
        .install_recorder()
        .map_err(|e| format!("failed to install Prometheus recorder: {}", e))?;

    Ok(MetricsState { handle })
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let metrics = state.metrics.handle.render();
    (StatusCode::OK, metrics)
}
