//! Process-wide request counters and their Prometheus text rendering.

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing request traffic.
///
/// Every handler bumps its counters on entry, before any validation or I/O, so the values count
/// attempts rather than successes.
#[derive(Debug, Default)]
pub struct RequestMetrics {
    requests: AtomicU64,
    healthcheck_requests: AtomicU64,
    main_requests: AtomicU64,
    student_create_requests: AtomicU64,
}

impl RequestMetrics {
    /// Create an empty metrics registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a request that has no dedicated counter.
    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a call to the health endpoint.
    pub fn record_health(&self) {
        self.record_request();
        self.healthcheck_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a call to the root endpoint.
    pub fn record_main(&self) {
        self.record_request();
        self.main_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Count a call to the create-student endpoint.
    pub fn record_student_create(&self) {
        self.record_request();
        self.student_create_requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            healthcheck_requests: self.healthcheck_requests.load(Ordering::Relaxed),
            main_requests: self.main_requests.load(Ordering::Relaxed),
            student_create_requests: self.student_create_requests.load(Ordering::Relaxed),
        }
    }

    /// Render the counters in the Prometheus text exposition format.
    pub fn render_prometheus(&self) -> String {
        let snapshot = self.snapshot();
        let mut output = String::with_capacity(512);

        for def in COUNTERS {
            let _ = writeln!(output, "# HELP {} {}", def.name, def.help);
            let _ = writeln!(output, "# TYPE {} counter", def.name);
            let _ = writeln!(output, "{} {}", def.name, (def.value)(&snapshot));
        }

        output
    }
}

/// Immutable view of request counters used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Requests served since startup, across all endpoints.
    pub requests: u64,
    /// Calls to `GET /health`.
    pub healthcheck_requests: u64,
    /// Calls to `GET /`.
    pub main_requests: u64,
    /// Calls to `POST /api/student`, successful or not.
    pub student_create_requests: u64,
}

struct CounterDef {
    name: &'static str,
    help: &'static str,
    value: fn(&MetricsSnapshot) -> u64,
}

const COUNTERS: &[CounterDef] = &[
    CounterDef {
        name: "server_requests_total",
        help: "Total number of requests to this webserver",
        value: |snapshot| snapshot.requests,
    },
    CounterDef {
        name: "healthcheck_requests_total",
        help: "Total number of requests to healthcheck",
        value: |snapshot| snapshot.healthcheck_requests,
    },
    CounterDef {
        name: "main_requests_total",
        help: "Total number of requests to main endpoint",
        value: |snapshot| snapshot.main_requests,
    },
    CounterDef {
        name: "students_create_total",
        help: "Total number of requests to the endpoint for create a student",
        value: |snapshot| snapshot.student_create_requests,
    },
];
