//! Error types for fleet-loadplan

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while validating input or running the planning engine.
///
/// Planning failures (a single order being infeasible under the current policy) are
/// *not* represented here — they are data, recorded on the order ledger as a
/// [`crate::placers::FailureReason`]. Only fail-fast validation errors and fatal
/// invariant violations raise an `Error`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A configuration or instance field is out of range or malformed.
    #[error("invalid input at {field}: {message}")]
    InvalidInput {
        /// Dotted field path, e.g. "orders.earliest_due"
        field: String,
        /// Human-readable explanation
        message: String,
    },

    /// An order references an item id absent from the catalogue.
    #[error("order {order_id}: unknown item id '{item_id}'")]
    UnknownItem {
        /// Order identifier
        order_id: String,
        /// The offending item id
        item_id: String,
    },

    /// An order line has a non-positive quantity.
    #[error("order {order_id}: item '{item_id}' has invalid quantity {qty}")]
    InvalidQuantity {
        /// Order identifier
        order_id: String,
        /// The offending item id
        item_id: String,
        /// The invalid quantity
        qty: i64,
    },

    /// A time-of-day field is not in `HH:MM` form.
    #[error("field {field}: '{value}' is not a valid HH:MM time")]
    MalformedTime {
        /// Dotted field path
        field: String,
        /// The offending raw value
        value: String,
    },

    /// A fatal internal invariant was violated — a bug, never a planning failure.
    #[error("invariant violation ({what}): {detail}")]
    InvariantViolation {
        /// Which invariant was violated
        what: String,
        /// Details of the offending state
        detail: String,
    },
}

impl Error {
    /// Create an invalid-input error at a given field path.
    pub fn invalid_input(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an unknown-item error.
    pub fn unknown_item(order_id: impl Into<String>, item_id: impl Into<String>) -> Self {
        Self::UnknownItem {
            order_id: order_id.into(),
            item_id: item_id.into(),
        }
    }

    /// Create an invalid-quantity error.
    pub fn invalid_quantity(
        order_id: impl Into<String>,
        item_id: impl Into<String>,
        qty: i64,
    ) -> Self {
        Self::InvalidQuantity {
            order_id: order_id.into(),
            item_id: item_id.into(),
            qty,
        }
    }

    /// Create a malformed-time error.
    pub fn malformed_time(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::MalformedTime {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create an invariant-violation error.
    pub fn invariant(what: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::InvariantViolation {
            what: what.into(),
            detail: detail.into(),
        }
    }

    /// Exit code this error should map to at the process boundary.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvariantViolation { .. } => 3,
            _ => 2,
        }
    }
}
