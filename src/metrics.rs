//! Pipeline metrics.
//!
//! Emitted through the `metrics` facade. `init_metrics` installs a Prometheus
//! recorder for the process; without it the calls below are no-ops.

use ::metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::{Once, OnceLock};
use tracing::warn;

static INIT: Once = Once::new();
static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the global Prometheus recorder. Safe to call more than once.
pub fn init_metrics() {
    INIT.call_once(|| match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            let _ = HANDLE.set(handle);
        }
        Err(e) => warn!("Failed to install metrics recorder: {}", e),
    });
}

/// Prometheus text snapshot of everything recorded so far, if a recorder was installed.
pub fn render() -> Option<String> {
    HANDLE.get().map(|handle| handle.render())
}

/// Rows copied from a source file into its staging table.
pub fn staging_rows_loaded(table: &str, rows: usize) {
    counter!("mlb_staging_rows_loaded_total", "table" => table.to_string()).increment(rows as u64);
}

/// Rows newly inserted into a normalized table (ignored duplicates excluded).
pub fn rows_inserted(table: &str, rows: usize) {
    counter!("mlb_rows_inserted_total", "table" => table.to_string()).increment(rows as u64);
}

pub fn step_duration(step: &str, secs: f64) {
    histogram!("mlb_step_duration_seconds", "step" => step.to_string()).record(secs);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_reach_a_local_recorder() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        ::metrics::with_local_recorder(&recorder, || {
            rows_inserted("park", 2);
            rows_inserted("park", 1);
            staging_rows_loaded("game_log", 4);
        });

        let rendered = handle.render();
        assert!(rendered.contains(r#"mlb_rows_inserted_total{table="park"} 3"#), "{rendered}");
        assert!(rendered.contains(r#"mlb_staging_rows_loaded_total{table="game_log"} 4"#), "{rendered}");
    }

    #[test]
    fn render_is_empty_before_init() {
        // Unit tests never call init_metrics.
        assert!(render().is_none());
    }
}
