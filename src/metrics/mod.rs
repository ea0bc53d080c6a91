//! Prometheus metrics for the forum content service.
//!
//! Exposes mutation-pipeline collectors and an HTTP handler for the
//! `/metrics` endpoint.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{
    register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec,
    TextEncoder,
};

use crate::media::{MediaClass, MediaError};

lazy_static! {
    /// Posts created, segmented by approval outcome at insert.
    pub static ref POSTS_CREATED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "posts_created_total",
        "Posts created segmented by approval outcome",
        &["approved"]
    )
    .expect("failed to register posts_created_total");

    /// Post edits applied.
    pub static ref POST_EDITS_TOTAL: IntCounter = register_int_counter!(
        "post_edits_total",
        "Post edits applied"
    )
    .expect("failed to register post_edits_total");

    /// Comment edits applied.
    pub static ref COMMENT_EDITS_TOTAL: IntCounter = register_int_counter!(
        "comment_edits_total",
        "Comment edits applied"
    )
    .expect("failed to register comment_edits_total");

    /// Media uploads rejected during intake, segmented by class and reason.
    pub static ref MEDIA_REJECTED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "media_rejected_total",
        "Media uploads rejected during intake segmented by class and reason",
        &["class", "reason"]
    )
    .expect("failed to register media_rejected_total");

    /// Orphaned media files removed by the sweep job.
    pub static ref ORPHANS_REMOVED_TOTAL: IntCounter = register_int_counter!(
        "orphans_removed_total",
        "Orphaned media files removed by the sweep job"
    )
    .expect("failed to register orphans_removed_total");

    /// Sweep cycles, segmented by outcome.
    pub static ref ORPHAN_SWEEP_RUNS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "orphan_sweep_runs_total",
        "Orphan sweep cycles segmented by outcome",
        &["outcome"]
    )
    .expect("failed to register orphan_sweep_runs_total");
}

pub fn record_post_created(approved: bool) {
    POSTS_CREATED_TOTAL
        .with_label_values(&[if approved { "true" } else { "false" }])
        .inc();
}

pub fn record_post_edited() {
    POST_EDITS_TOTAL.inc();
}

pub fn record_comment_edited() {
    COMMENT_EDITS_TOTAL.inc();
}

pub fn record_media_rejected(class: MediaClass, err: &MediaError) {
    let reason = match err {
        MediaError::Oversized { .. } => "oversized",
        MediaError::UnsupportedFormat { .. } => "unsupported_format",
        MediaError::WriteFailed { .. } => "write_failed",
    };
    MEDIA_REJECTED_TOTAL
        .with_label_values(&[&class.to_string(), reason])
        .inc();
}

pub fn record_orphans_removed(count: u64) {
    ORPHANS_REMOVED_TOTAL.inc_by(count);
}

pub fn record_sweep_run(outcome: &str) {
    ORPHAN_SWEEP_RUNS_TOTAL.with_label_values(&[outcome]).inc();
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
