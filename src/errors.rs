//! Unified error type for the donor CRM core.
//!
//! Every fallible operation in `core`, `config` and `entities` returns
//! [`Result`]. The HTTP layer maps these variants onto status codes in
//! [`crate::api::error`].

use thiserror::Error;

/// Errors produced by the donor CRM core.
#[derive(Debug, Error)]
pub enum Error {
    /// The underlying store rejected or failed a query.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Configuration could not be read or parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// No donor exists with the given id.
    #[error("Donor not found: {id}")]
    DonorNotFound {
        /// Requested donor id
        id: i64,
    },

    /// No campaign exists with the given id.
    #[error("Campaign not found: {id}")]
    CampaignNotFound {
        /// Requested campaign id
        id: i64,
    },

    /// No event exists with the given id.
    #[error("Event not found: {id}")]
    EventNotFound {
        /// Requested event id
        id: i64,
    },

    /// No donation exists with the given id.
    #[error("Donation not found: {id}")]
    DonationNotFound {
        /// Requested donation id
        id: i64,
    },

    /// A donation amount was negative, NaN or infinite.
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// A stored record is missing a required field or violates a shape invariant.
    #[error("Invalid record {id}: missing or inconsistent `{field}`")]
    InvalidRecord {
        /// Id of the offending record
        id: i64,
        /// Field that is missing or inconsistent
        field: &'static str,
    },

    /// Caller input failed validation.
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A count or limit did not fit the target integer type.
    #[error("Integer conversion error: {0}")]
    IntConversion(#[from] std::num::TryFromIntError),
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
