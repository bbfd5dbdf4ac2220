//! Stateless, pure feasibility predicates.

use crate::config::TruckType;
use crate::domain::{CustomerOrder, Truck};

/// Capacity-boundary tolerance for the `q_i_cold <= R_cooler` comparison.
pub const EPS: f64 = 1e-9;

/// True iff `order` fits onto `truck` without exceeding any residual, within [`EPS`]
/// slack on the cooler check.
///
/// `allow_cold_in_dry` gates whether a DRY truck may ever accept cold volume at all;
/// it is irrelevant for REEFER trucks, whose cargo hold handles cold directly.
pub fn fits(order: &CustomerOrder, truck: &Truck, allow_cold_in_dry: bool) -> bool {
    if order.v_i_eff > truck.r_vol() {
        return false;
    }
    if order.w_i > truck.r_w() {
        return false;
    }
    if order.q_i_cold > 0.0 {
        let cold_ok = match truck.spec.truck_type {
            TruckType::Reefer => order.q_i_cold <= truck.r_cold(),
            TruckType::Dry => cooler_feasible(order, truck, allow_cold_in_dry),
        };
        if !cold_ok {
            return false;
        }
    }
    true
}

/// True iff `order`'s cold volume can be routed into `truck`'s portable cooler.
///
/// `allow_cold_in_dry` is the policy flag gating this path at all; without it, no
/// DRY truck may ever carry cold volume regardless of residual cooler space.
pub fn cooler_feasible(order: &CustomerOrder, truck: &Truck, allow_cold_in_dry: bool) -> bool {
    allow_cold_in_dry
        && truck.spec.truck_type == TruckType::Dry
        && order.q_i_cold > 0.0
        && order.q_i_cold <= truck.r_cooler() + EPS
}
