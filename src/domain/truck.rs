//! Truck: static spec plus the mutable runtime ledger accrued over a planning day
//!.

use serde::{Deserialize, Serialize};

use crate::config::{TruckSpec, TruckType};
use crate::{Error, Result};

/// Capacity-boundary tolerance shared with the feasibility layer.
pub const EPS: f64 = 1e-9;

/// A truck's static spec plus the ledger of what has been loaded onto it so far today.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Truck {
    /// Static specification as received from the instance.
    pub spec: TruckSpec,
    /// Portable cooler capacity actually in force: `spec.cooler_capacity_m3` if set,
    /// else the configured per-truck default. Zero for reefer trucks.
    pub effective_cooler_m3: f64,
    /// Effective (padded) volume committed so far.
    pub used_v_eff: f64,
    /// Geometric (unpadded) volume committed so far, for the fleet-wide `E_pack` KPI.
    pub used_q: f64,
    /// Cold geometric volume committed so far (reefer cargo hold, or portable cooler).
    pub used_q_cold: f64,
    /// Weight committed so far.
    pub used_w: f64,
    /// Portable cooler volume committed so far (dry trucks only).
    pub used_cooler_m3: f64,
    /// Order ids assigned to this truck, in assignment order.
    pub assigned_order_ids: Vec<String>,
    /// Whether this truck has been opened (first assignment accepted) today.
    pub opened: bool,
    /// Whether this truck has departed.
    pub departed: bool,
    /// Departure timestamp, set when `departed` becomes true under the `time` strategy.
    pub departure_time: Option<String>,
}

impl Truck {
    /// Build a fresh, unopened truck ledger from its spec.
    ///
    /// `default_cooler_m3` is the configured fallback used when `spec.cooler_capacity_m3`
    /// is `None`; it only applies to DRY trucks, since reefer trucks carry cold cargo
    /// directly rather than through a portable cooler.
    pub fn new(spec: TruckSpec, default_cooler_m3: f64) -> Self {
        let effective_cooler_m3 = match spec.truck_type {
            TruckType::Dry => spec.cooler_capacity_m3.unwrap_or(default_cooler_m3),
            TruckType::Reefer => 0.0,
        };
        Self {
            spec,
            effective_cooler_m3,
            used_v_eff: 0.0,
            used_q: 0.0,
            used_q_cold: 0.0,
            used_w: 0.0,
            used_cooler_m3: 0.0,
            assigned_order_ids: Vec::new(),
            opened: false,
            departed: false,
            departure_time: None,
        }
    }

    /// Usable volume capacity after the reserve fraction is set aside.
    pub fn usable_capacity_m3(&self) -> f64 {
        self.spec.total_capacity_m3 * (1.0 - self.spec.reserve_fraction)
    }

    /// Remaining effective volume.
    pub fn r_vol(&self) -> f64 {
        self.usable_capacity_m3() - self.used_v_eff
    }

    /// Remaining cold cargo-hold volume (reefer trucks; zero capacity on dry trucks).
    pub fn r_cold(&self) -> f64 {
        self.spec.cold_capacity_m3 - self.used_q_cold
    }

    /// Remaining weight capacity.
    pub fn r_w(&self) -> f64 {
        self.spec.weight_limit_kg - self.used_w
    }

    /// Remaining portable cooler volume (dry trucks only; zero on reefer trucks).
    pub fn r_cooler(&self) -> f64 {
        self.effective_cooler_m3 - self.used_cooler_m3
    }

    /// Volume utilisation `U_vol = used_v_eff / total_capacity_m3` (0 if capacity is 0).
    pub fn utilization(&self) -> f64 {
        let cap = self.spec.total_capacity_m3;
        if cap <= 0.0 {
            0.0
        } else {
            self.used_v_eff / cap
        }
    }

    /// Whether this truck meets its own minimum-utilisation threshold.
    pub fn meets_min_utilization(&self) -> bool {
        self.utilization() + EPS >= self.spec.min_utilization
    }

    /// Commit an order's demand onto this truck's ledger.
    ///
    /// `cold_vol` is the cold volume routed into the cargo hold (reefer trucks only);
    /// `cooler_vol` is cold volume routed into the portable cooler (dry trucks only).
    /// Exactly one of the two is expected to be nonzero for any given placement.
    pub fn apply_assignment(
        &mut self,
        order_id: impl Into<String>,
        q: f64,
        v_eff: f64,
        weight: f64,
        cold_vol: f64,
        cooler_vol: f64,
    ) {
        self.opened = true;
        self.used_v_eff += v_eff;
        self.used_q += q;
        self.used_w += weight;
        self.used_q_cold += cold_vol;
        self.used_cooler_m3 += cooler_vol;
        self.assigned_order_ids.push(order_id.into());
    }

    /// Check the ledger has not overrun any of its own capacities, within tolerance.
    pub fn check_invariants(&self) -> Result<()> {
        if self.used_v_eff > self.usable_capacity_m3() + EPS {
            return Err(Error::invariant(
                "truck.used_v_eff",
                format!("truck {} over volume capacity", self.spec.id),
            ));
        }
        if self.used_w > self.spec.weight_limit_kg + EPS {
            return Err(Error::invariant(
                "truck.used_w",
                format!("truck {} over weight limit", self.spec.id),
            ));
        }
        if self.used_q_cold > self.spec.cold_capacity_m3 + EPS {
            return Err(Error::invariant(
                "truck.used_q_cold",
                format!("truck {} over cold capacity", self.spec.id),
            ));
        }
        if self.used_cooler_m3 > self.effective_cooler_m3 + EPS {
            return Err(Error::invariant(
                "truck.used_cooler_m3",
                format!("truck {} over cooler capacity", self.spec.id),
            ));
        }
        Ok(())
    }
}
