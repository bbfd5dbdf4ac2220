//! Typed report rows for the five daily CSV exports, in their exact documented
//! column order.
//!
//! Writing these rows to disk is an external-I/O concern left to a caller: this
//! module only guarantees the row shape and field order a `csv::Writer` (or any
//! other serde-driven writer) would need to serialize deterministically. Every row
//! type already derives `serde::Serialize`, so a caller gets CSV/JSON/etc for free.

use serde::{Deserialize, Serialize};

pub use crate::ranking::{ItemRankRow, OrderRankRow};
pub use crate::tracker::{AssignmentRow, FleetSummary, PerTruckRow};

use crate::tracker::{DayTracker, OrderLedger};

/// One row of `order_status.csv`: whether an order was ultimately placed, and why
/// not if it wasn't.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStatusRow {
    /// Order identifier.
    pub order_id: String,
    /// Whether the order was placed on some truck.
    pub placed: bool,
    /// Number of trucks the order ended up assigned to (should be 1 if placed).
    pub assigned_truck_count: u32,
    /// Failure reason code, if not placed.
    pub reason: Option<String>,
    /// VIP flag of the ordering customer.
    pub is_vip: bool,
    /// Whether the order met its due time; `None` if not evaluated.
    pub due_met: Option<bool>,
    /// Lateness in minutes, if missed and known.
    pub delay_min: Option<f64>,
}

impl OrderStatusRow {
    fn from_ledger(order_id: &str, ledger: &OrderLedger) -> Self {
        Self {
            order_id: order_id.to_string(),
            placed: ledger.placed,
            assigned_truck_count: ledger.assigned_truck_count,
            reason: ledger.reason.clone(),
            is_vip: ledger.is_vip,
            due_met: ledger.due_met,
            delay_min: ledger.delay_min,
        }
    }
}

/// Build every `order_status.csv` row from a day tracker's order ledger, in the
/// order orders were first registered (insertion order, for reproducible output).
pub fn order_status_rows(tracker: &DayTracker) -> Vec<OrderStatusRow> {
    tracker
        .order_status_rows()
        .into_iter()
        .map(|(order_id, ledger)| OrderStatusRow::from_ledger(order_id, ledger))
        .collect()
}
