//! Metrics definitions for the request store.

use shared::metrics_defs::{MetricDef, MetricType};

pub const RECORDS_APPENDED: MetricDef = MetricDef {
    name: "records.appended",
    metric_type: MetricType::Counter,
    description: "Number of records persisted. Tagged with store.",
};

pub const BLOB_DECODE_FAILURES: MetricDef = MetricDef {
    name: "blob.decode.failures",
    metric_type: MetricType::Counter,
    description: "Number of times the stored blob could not be decoded and was treated as empty",
};

pub const BLOB_SIZE: MetricDef = MetricDef {
    name: "blob.size",
    metric_type: MetricType::Histogram,
    description: "Size in bytes of the blob written on append",
};

pub const ALL_METRICS: &[MetricDef] = &[RECORDS_APPENDED, BLOB_DECODE_FAILURES, BLOB_SIZE];
