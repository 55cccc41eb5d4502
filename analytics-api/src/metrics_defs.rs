use shared::metrics_defs::{MetricDef, MetricType};

pub const REQUEST_DURATION: MetricDef = MetricDef {
    name: "request.duration",
    metric_type: MetricType::Histogram,
    description: "Request duration in seconds. Tagged with route, status.",
};

pub const REQUESTS_INFLIGHT: MetricDef = MetricDef {
    name: "requests.inflight",
    metric_type: MetricType::Gauge,
    description: "Number of requests currently being processed",
};

pub const STORE_READ_FAILURES: MetricDef = MetricDef {
    name: "store.read.failures",
    metric_type: MetricType::Counter,
    description: "Store reads that failed and were answered with an empty result. Tagged with store, operation.",
};

pub const COUNTRY_LOOKUP_FAILURES: MetricDef = MetricDef {
    name: "country.lookup.failures",
    metric_type: MetricType::Counter,
    description: "Requests whose country could not be resolved and were recorded as unknown",
};

pub const ALL_METRICS: &[MetricDef] = &[
    REQUEST_DURATION,
    REQUESTS_INFLIGHT,
    STORE_READ_FAILURES,
    COUNTRY_LOOKUP_FAILURES,
];
