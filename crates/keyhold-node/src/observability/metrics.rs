//! Prometheus metrics collection.
//!
//! Covers HTTP request counts and latency plus credential outcomes:
//! login attempts by outcome, enrollments, and enrollment failures by
//! error kind. Rendered in the Prometheus text format at `GET /metrics`.

use parking_lot::RwLock;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::{exponential_buckets, Histogram};
use prometheus_client::registry::Registry;
use std::fmt;
use std::sync::Arc;

/// HTTP request labels.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct HttpLabels {
    /// HTTP method (GET, POST, etc.)
    pub method: String,
    /// Matched route pattern, or `unmatched`
    pub path: String,
    /// Response status code
    pub status: u16,
}

/// Login attempt labels.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct AuthLabels {
    /// Internal outcome, e.g. `secret_mismatch`
    pub outcome: String,
}

/// Enrollment failure labels.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct EnrollFailureLabels {
    /// Error kind, e.g. `empty_secret`
    pub kind: String,
}

/// Metrics state container.
///
/// Cheap to clone; every clone shares the same registry and metrics.
#[derive(Clone)]
pub struct MetricsState {
    /// Prometheus registry.
    pub registry: Arc<RwLock<Registry>>,
    /// HTTP request counter.
    pub http_requests_total: Family<HttpLabels, Counter>,
    /// HTTP request duration histogram (seconds).
    pub http_request_duration_seconds: Family<HttpLabels, Histogram>,
    /// Login attempts by outcome.
    pub auth_attempts_total: Family<AuthLabels, Counter>,
    /// Successful enrollments.
    pub enrollments_total: Counter,
    /// Failed enrollments by error kind.
    pub enroll_failures_total: Family<EnrollFailureLabels, Counter>,
}

impl Default for MetricsState {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsState {
    /// Create a new metrics state with all metrics registered.
    pub fn new() -> Self {
        let mut registry = Registry::default();

        // HTTP metrics
        let http_requests_total = Family::<HttpLabels, Counter>::default();
        registry.register(
            "keyhold_http_requests",
            "Total HTTP requests",
            http_requests_total.clone(),
        );

        let http_request_duration_seconds =
            Family::<HttpLabels, Histogram>::new_with_constructor(|| {
                Histogram::new(exponential_buckets(0.001, 2.0, 16))
            });
        registry.register(
            "keyhold_http_request_duration_seconds",
            "HTTP request duration in seconds",
            http_request_duration_seconds.clone(),
        );

        // Credential metrics
        let auth_attempts_total = Family::<AuthLabels, Counter>::default();
        registry.register(
            "keyhold_auth_attempts",
            "Login attempts by outcome",
            auth_attempts_total.clone(),
        );

        let enrollments_total = Counter::default();
        registry.register(
            "keyhold_enrollments",
            "Successful enrollments",
            enrollments_total.clone(),
        );

        let enroll_failures_total = Family::<EnrollFailureLabels, Counter>::default();
        registry.register(
            "keyhold_enroll_failures",
            "Failed enrollments by error kind",
            enroll_failures_total.clone(),
        );

        Self {
            registry: Arc::new(RwLock::new(registry)),
            http_requests_total,
            http_request_duration_seconds,
            auth_attempts_total,
            enrollments_total,
            enroll_failures_total,
        }
    }

    /// Record an HTTP request.
    pub fn record_http_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let labels = HttpLabels {
            method: method.to_string(),
            path: path.to_string(),
            status,
        };

        self.http_requests_total.get_or_create(&labels).inc();
        self.http_request_duration_seconds
            .get_or_create(&labels)
            .observe(duration_secs);
    }

    /// Record a login attempt.
    pub fn record_auth(&self, outcome: &str) {
        self.auth_attempts_total
            .get_or_create(&AuthLabels {
                outcome: outcome.to_string(),
            })
            .inc();
    }

    /// Record a successful enrollment.
    pub fn record_enrollment(&self) {
        self.enrollments_total.inc();
    }

    /// Record a failed enrollment.
    pub fn record_enroll_failure(&self, kind: &str) {
        self.enroll_failures_total
            .get_or_create(&EnrollFailureLabels {
                kind: kind.to_string(),
            })
            .inc();
    }

    /// Encode metrics for Prometheus scraping.
    pub fn encode(&self) -> Result<String, fmt::Error> {
        let mut buffer = String::new();
        let registry = self.registry.read();
        prometheus_client::encoding::text::encode(&mut buffer, &registry)?;
        Ok(buffer)
    }
}
