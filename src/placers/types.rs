//! Shared placement types: loading plans, slots, and assignment outcomes.

use serde::{Deserialize, Serialize};

/// Cargo zone a line is placed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    /// Refrigerated zone (reefer hold, or a dry truck's portable cooler).
    Cold,
    /// Ambient, non-refrigerated zone.
    Ambient,
    /// Hazardous-materials zone.
    Haz,
}

/// Left/right lane within a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lane {
    /// Left lane.
    Left,
    /// Right lane.
    Right,
}

/// Where one line lands inside the truck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    /// Cargo zone.
    pub zone: Zone,
    /// Lane within the zone.
    pub lane: Lane,
    /// Stacking layer, 1-based.
    pub layer: u32,
    /// Position: the line's index in the ranked item sequence.
    pub pos: u32,
}

/// One placed line within a [`LoadingPlan`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Item identifier.
    pub item_id: String,
    /// Quantity placed.
    pub qty: i64,
    /// Slot assigned to this line.
    pub slot: Slot,
}

/// The packing policy's output for one `(order, truck)` pair: every line placed, or
/// nothing if the policy refuses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadingPlan {
    /// Truck this plan targets.
    pub truck_id: String,
    /// Placed lines, in ranked-item order.
    pub placements: Vec<Placement>,
}

/// Why a placer could not place an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    /// Cold-mandatory bucket.
    A,
    /// Flexible/mixed bucket.
    B,
    /// Dry-only bucket.
    C,
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let c = match self {
            Bucket::A => 'A',
            Bucket::B => 'B',
            Bucket::C => 'C',
        };
        write!(f, "{c}")
    }
}

/// Failure reason attached to an order that could not be placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    /// No truck in the order's bucket could take it, and no new truck could be opened.
    InfeasibleInBucket(Bucket),
    /// The packing policy refused to place the order even though capacity fit.
    PackingRefused,
}

impl FailureReason {
    /// Render the machine-readable reason string used by `order_status.csv`.
    pub fn as_code(&self) -> String {
        match self {
            FailureReason::InfeasibleInBucket(b) => format!("infeasible_in_bucket_{b}"),
            FailureReason::PackingRefused => "packing_refused".to_string(),
        }
    }
}

/// A successful placement decision, carrying the rationale the day tracker and the
/// `assignments.csv`/`order_status.csv` reports need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignedOrder {
    /// Order placed.
    pub order_id: String,
    /// Truck it was placed on.
    pub truck_id: String,
    /// Whether placement required opening a previously-unopened truck.
    pub opened_new_truck: bool,
    /// Name of the leftover-key scheme used to choose the truck.
    pub scheme_used: String,
    /// Order demand triple at decision time: `(v_i_eff, w_i, q_i_cold)`.
    pub demand: (f64, f64, f64),
    /// Truck residuals immediately before this assignment: `(R_vol, R_w, R_cold_or_cooler)`.
    pub residuals_before: (f64, f64, f64),
    /// Whether the cold volume was routed into a dry truck's portable cooler.
    pub cold_on_dry: bool,
    /// The packing policy's output for this placement.
    pub plan: LoadingPlan,
}

/// The outcome of routing one order through a placer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AssignOutcome {
    /// The order was placed.
    Assigned(Box<AssignedOrder>),
    /// The order could not be placed.
    Failed(FailureReason),
}
