use std::sync::LazyLock;
use std::time::Duration;

use prometheus::*;

use crate::similarity::ReindexReport;

static METRIC_MESSAGE_COUNT: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "imdedup_message_count",
        "count of the index requests taken from the queue",
        &["outcome"]
    )
    .unwrap()
});

static METRIC_INDEX_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    register_histogram_vec!(
        "imdedup_index_duration",
        "duration of the per-picture index in seconds",
        &["stage"]
    )
    .unwrap()
});

static METRIC_COMPARISONS: LazyLock<IntCounter> = LazyLock::new(|| {
    register_int_counter!(
        "imdedup_comparisons",
        "count of the fingerprint comparisons made while reindexing"
    )
    .unwrap()
});

static METRIC_EDGES_INSERTED: LazyLock<IntCounter> = LazyLock::new(|| {
    register_int_counter!("imdedup_edges_inserted", "count of the directed edges inserted")
        .unwrap()
});

/// 记录一条消息的处理结果，`outcome` 为 `ok` 或错误分类名
pub fn inc_message(outcome: &str) {
    METRIC_MESSAGE_COUNT.with_label_values(&[outcome]).inc();
}

/// 记录某个阶段的耗时：`fetch`、`hash`、`reindex`
pub fn observe_stage(stage: &str, duration: Duration) {
    METRIC_INDEX_DURATION.with_label_values(&[stage]).observe(duration.as_secs_f64());
}

pub fn inc_reindex(report: &ReindexReport) {
    METRIC_COMPARISONS.inc_by(report.compared);
    METRIC_EDGES_INSERTED.inc_by(report.inserted);
}

/// 以文本格式导出所有已注册的指标
pub fn gather_text() -> String {
    let encoder = TextEncoder::new();
    encoder.encode_to_string(&gather()).unwrap_or_default()
}
