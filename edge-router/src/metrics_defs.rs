use shared::metrics_defs::{MetricDef, MetricType};

pub const REQUESTS_ROUTED: MetricDef = MetricDef {
    name: "requests.routed",
    metric_type: MetricType::Counter,
    description: "Requests matched to a routing intent. Tagged with intent.",
};

pub const REQUESTS_PASSED_THROUGH: MetricDef = MetricDef {
    name: "requests.passed_through",
    metric_type: MetricType::Counter,
    description: "Requests that matched no routing intent and were forwarded unmodified",
};

pub const SESSIONS_REJECTED: MetricDef = MetricDef {
    name: "sessions.rejected",
    metric_type: MetricType::Counter,
    description: "Gated tenant requests refused for lack of a verified session",
};

pub const REQUEST_DURATION: MetricDef = MetricDef {
    name: "request.duration",
    metric_type: MetricType::Histogram,
    description: "Routed request duration in seconds, upstream round trip included",
};

pub const ALL_METRICS: &[MetricDef] = &[
    REQUESTS_ROUTED,
    REQUESTS_PASSED_THROUGH,
    SESSIONS_REJECTED,
    REQUEST_DURATION,
];
