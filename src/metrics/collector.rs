// src/metrics/collector.rs
use crate::check::{AlertKind, HealthState};
use anyhow::Result;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts,
    Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub struct MetricsRegistry {
    registry: Registry,
    collector: Arc<MetricsCollector>,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let collector = Arc::new(MetricsCollector::new(&registry)?);

        Ok(Self {
            registry,
            collector,
        })
    }

    pub fn collector(&self) -> Arc<MetricsCollector> {
        self.collector.clone()
    }

    pub fn gather(&self) -> Vec<u8> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            tracing::error!("Failed to encode metrics: {}", e);
        }
        buffer
    }
}

pub struct MetricsCollector {
    // Run metrics
    pub check_runs_total: IntCounterVec,
    pub check_run_duration_seconds: HistogramVec,
    pub check_runs_skipped_total: IntCounterVec,
    pub check_state: IntGaugeVec,

    // Notification metrics
    pub notifications_total: IntCounterVec,
    pub notification_failures_total: IntCounter,

    // System metrics
    pub runs_in_flight: IntGauge,
    pub checks_configured: IntGauge,
}

impl MetricsCollector {
    pub fn new(registry: &Registry) -> Result<Self> {
        let check_runs_total = IntCounterVec::new(
            Opts::new("scrutzone_check_runs_total", "Total number of check runs"),
            &["check", "state"],
        )?;
        registry.register(Box::new(check_runs_total.clone()))?;

        let check_run_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "scrutzone_check_run_duration_seconds",
                "Check run duration in seconds",
            ),
            &["check"],
        )?;
        registry.register(Box::new(check_run_duration_seconds.clone()))?;

        let check_runs_skipped_total = IntCounterVec::new(
            Opts::new(
                "scrutzone_check_runs_skipped_total",
                "Runs skipped because the previous run was still in progress",
            ),
            &["check"],
        )?;
        registry.register(Box::new(check_runs_skipped_total.clone()))?;

        let check_state = IntGaugeVec::new(
            Opts::new(
                "scrutzone_check_state",
                "Last check result (1=ok, 0=failed)",
            ),
            &["check"],
        )?;
        registry.register(Box::new(check_state.clone()))?;

        let notifications_total = IntCounterVec::new(
            Opts::new("scrutzone_notifications_total", "Alerts handed to the gateway"),
            &["check", "kind"],
        )?;
        registry.register(Box::new(notifications_total.clone()))?;

        let notification_failures_total = IntCounter::new(
            "scrutzone_notification_failures_total",
            "Alerts the gateway failed to deliver",
        )?;
        registry.register(Box::new(notification_failures_total.clone()))?;

        let runs_in_flight =
            IntGauge::new("scrutzone_runs_in_flight", "Check runs currently executing")?;
        registry.register(Box::new(runs_in_flight.clone()))?;

        let checks_configured =
            IntGauge::new("scrutzone_checks_configured", "Number of scheduled checks")?;
        registry.register(Box::new(checks_configured.clone()))?;

        Ok(Self {
            check_runs_total,
            check_run_duration_seconds,
            check_runs_skipped_total,
            check_state,
            notifications_total,
            notification_failures_total,
            runs_in_flight,
            checks_configured,
        })
    }

    pub fn record_run(&self, check: &str, state: HealthState, duration: Duration) {
        self.check_runs_total
            .with_label_values(&[check, &state.to_string()])
            .inc();

        self.check_run_duration_seconds
            .with_label_values(&[check])
            .observe(duration.as_secs_f64());

        self.check_state
            .with_label_values(&[check])
            .set(if state.is_ok() { 1 } else { 0 });
    }

    pub fn record_skipped(&self, check: &str) {
        self.check_runs_skipped_total
            .with_label_values(&[check])
            .inc();
    }

    pub fn record_notification(&self, check: &str, kind: AlertKind) {
        self.notifications_total
            .with_label_values(&[check, kind.as_str()])
            .inc();
    }

    pub fn record_notification_failure(&self) {
        self.notification_failures_total.inc();
    }

    pub fn run_started(&self) {
        self.runs_in_flight.inc();
    }

    pub fn run_finished(&self) {
        self.runs_in_flight.dec();
    }

    pub fn set_checks_configured(&self, count: usize) {
        self.checks_configured.set(count as i64);
    }
}

// Helper for timing operations
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_run_updates_state_gauge() {
        let registry = MetricsRegistry::new().unwrap();
        let metrics = registry.collector();

        metrics.record_run("api", HealthState::Failed, Duration::from_millis(20));
        assert_eq!(metrics.check_state.with_label_values(&["api"]).get(), 0);

        metrics.record_run("api", HealthState::Ok, Duration::from_millis(20));
        assert_eq!(metrics.check_state.with_label_values(&["api"]).get(), 1);
        assert_eq!(
            metrics
                .check_runs_total
                .with_label_values(&["api", "failed"])
                .get(),
            1
        );
    }

    #[test]
    fn test_gather_renders_text_format() {
        let registry = MetricsRegistry::new().unwrap();
        let metrics = registry.collector();
        metrics.record_notification("db", AlertKind::Recovery);

        let text = String::from_utf8(registry.gather()).unwrap();
        assert!(text.contains("scrutzone_notifications_total{check=\"db\",kind=\"recovery\"} 1"));
    }
}
