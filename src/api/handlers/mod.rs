//! Request handlers, one module per resource.

/// Campaign writes
pub mod campaigns;
/// Dashboard payload
pub mod dashboard;
/// Donation writes
pub mod donations;
/// Donor records and insight
pub mod donors;
/// Event writes and attendance
pub mod events;
/// Projection maintenance
pub mod projections;

/// `GET /health`
pub async fn health() -> &'static str {
    "OK"
}
