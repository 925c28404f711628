//! Core business logic.
//!
//! Pure computation (aggregation, scoring, dashboard composition, donor
//! insight) lives alongside the record-management functions that keep the
//! derived projections consistent. Nothing here knows about HTTP.

/// Time-bucketed sums and per-entity totals over donation records
pub mod aggregation;
/// Campaign creation and lookup
pub mod campaign;
/// Dashboard payload composition
pub mod dashboard;
/// Donation writes with projection maintenance
pub mod donation;
/// Donor creation, lookup and removal
pub mod donor;
/// Event creation and attendance tracking
pub mod event;
/// Read interface the dashboard and insight computations depend on
pub mod gateway;
/// Per-donor insight and its text renderings
pub mod insight;
/// Derived-field projections and the full rebuild
pub mod projection;
/// Lapse-risk and giving-frequency scoring
pub mod scoring;
