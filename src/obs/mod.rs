//! Module: obs
//! Responsibility: ambient observability surface — span-based tracing plus the scan counter module.
//! Does not own: subscriber installation — that is the caller's/service-layer's job.
//! Boundary: `tracing::instrument` is applied at call sites in `plan::*`; counters live in `obs::metrics`.

pub mod metrics;
