//! Customer.

use serde::{Deserialize, Serialize};

/// A customer placing orders. Immutable during a planning day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    /// Customer identifier.
    pub customer_id: String,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// VIP flag — affects order ranking and the VIP-miss KPI.
    pub vip: bool,
    /// Delivery address.
    pub address: String,
}
