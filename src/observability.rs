use std::net::SocketAddr;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: slot availability queries served. Labels: outcome.
pub const SLOT_QUERIES_TOTAL: &str = "maitred_slot_queries_total";

/// Histogram: slot availability query latency in seconds.
pub const SLOT_QUERY_DURATION_SECONDS: &str = "maitred_slot_query_duration_seconds";

/// Counter: reservations created.
pub const RESERVATIONS_CREATED_TOTAL: &str = "maitred_reservations_created_total";

/// Counter: reservations cancelled.
pub const RESERVATIONS_CANCELLED_TOTAL: &str = "maitred_reservations_cancelled_total";

/// Counter: create/update attempts rejected because the slot or table
/// was taken. Labels: reason.
pub const RESERVATION_REJECTIONS_TOTAL: &str = "maitred_reservation_rejections_total";

// ── USE metrics (resource utilization) ──────────────────────────

/// Counter: collaborator calls that timed out or failed.
pub const STORE_FAULTS_TOTAL: &str = "maitred_store_faults_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}
