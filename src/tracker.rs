//! Incremental day tracker: per-truck/per-order ledgers and the end-of-day KPI
//! snapshot.

use std::collections::HashSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::kpi;
use crate::placers::types::{Placement, Zone};
use crate::ranking::{ItemRankRow, OrderRankRow};
use crate::{Error, Result};

/// Static spec plus runtime loads for one opened truck, as seen by the tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruckLedger {
    /// Whether this truck is refrigerated.
    pub is_reefer: bool,
    /// Total volume capacity (m3).
    pub q: f64,
    /// Cold capacity (m3); 0 for dry trucks.
    pub q_cold: f64,
    /// Weight limit (kg).
    pub w: f64,
    /// Fixed daily deployment cost.
    pub fixed_cost: f64,
    /// Minimum utilization threshold.
    pub tau_min: f64,
    /// Effective volume committed so far.
    pub used_v_eff: f64,
    /// Geometric volume committed so far.
    pub used_q: f64,
    /// Cold volume committed so far.
    pub used_q_cold: f64,
    /// Weight committed so far.
    pub used_w: f64,
    /// Portable cooler volume committed so far.
    pub cooler_used_m3: f64,
    /// Whether departed.
    pub departed: bool,
    /// Departure timestamp, if departed under the `time` strategy.
    pub departure_time: Option<String>,
}

impl TruckLedger {
    fn matches_spec(&self, is_reefer: bool, q: f64, q_cold: f64, w: f64, fixed_cost: f64, tau_min: f64) -> bool {
        self.is_reefer == is_reefer
            && (self.q - q).abs() < 1e-9
            && (self.q_cold - q_cold).abs() < 1e-9
            && (self.w - w).abs() < 1e-9
            && (self.fixed_cost - fixed_cost).abs() < 1e-9
            && (self.tau_min - tau_min).abs() < 1e-9
    }
}

/// Per-order bookkeeping: demand snapshot plus placement/failure outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLedger {
    /// Geometric volume.
    pub q: f64,
    /// Cold volume.
    pub q_cold: f64,
    /// Weight.
    pub w: f64,
    /// Effective volume.
    pub v_eff: f64,
    /// VIP flag (unioned across re-registrations on failure, never downgraded).
    pub is_vip: bool,
    /// Number of trucks this order was assigned to (should be exactly 1 if placed).
    pub assigned_truck_count: u32,
    /// Whether the order met its due time; `None` if not evaluated.
    pub due_met: Option<bool>,
    /// Lateness in minutes, if missed and known.
    pub delay_min: Option<f64>,
    /// Whether the order was ultimately placed.
    pub placed: bool,
    /// Failure reason code, if not placed.
    pub reason: Option<String>,
}

/// Flat row describing where one `(item_id, qty)` line landed, for `assignments.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRow {
    /// Timestamp stamp, `HH:MM` or caller-supplied format.
    pub time: String,
    /// Order id.
    pub order_id: String,
    /// Truck id.
    pub truck_id: String,
    /// Item id.
    pub item_id: String,
    /// Quantity placed.
    pub qty: i64,
    /// Cargo zone.
    pub zone: Zone,
    /// Lane within the zone, rendered as `left`/`right`.
    pub lane: String,
    /// Stacking layer.
    pub layer: u32,
    /// Position in the ranked item sequence.
    pub pos: u32,
}

/// One opened truck's KPI row, for `per_truck.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerTruckRow {
    /// Truck id.
    pub truck_id: String,
    /// Whether refrigerated.
    pub is_reefer: bool,
    /// Total volume capacity.
    pub q: f64,
    /// Cold capacity.
    pub q_cold: f64,
    /// Weight limit.
    pub w: f64,
    /// Effective volume used.
    pub used_v_eff: f64,
    /// Geometric volume used.
    pub used_q: f64,
    /// Cold volume used.
    pub used_q_cold: f64,
    /// Weight used.
    pub used_w: f64,
    /// Volume utilization.
    pub u_vol: f64,
    /// Weight utilization.
    pub u_w: f64,
    /// Cold utilization.
    pub u_cold: f64,
    /// Bottleneck efficiency.
    pub u_bn: f64,
    /// Whether below its own minimum utilization.
    pub under_min: bool,
    /// Whether any capacity was exceeded.
    pub cap_violation: bool,
    /// Fixed daily cost.
    pub fixed_cost: f64,
    /// Whether departed.
    pub departed: bool,
    /// Departure timestamp, if any.
    pub departure_time: Option<String>,
}

/// The day-level KPI row, for `fleet.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetSummary {
    /// Trucks opened today.
    pub n_trucks: usize,
    /// Total fixed deployment cost.
    pub c_total: f64,
    /// Fixed cost per unit geometric volume.
    pub c_per_vol: f64,
    /// Fixed cost per unit weight.
    pub c_per_w: f64,
    /// Fleet packing efficiency.
    pub e_pack: f64,
    /// CV of volume utilization across opened trucks.
    pub cv_uvol: f64,
    /// CV of weight utilization across opened trucks.
    pub cv_u_w: f64,
    /// CV of bottleneck efficiency across opened trucks.
    pub cv_u_bn: f64,
    /// Average volume utilization.
    pub avg_u_vol: f64,
    /// Average weight utilization.
    pub avg_u_w: f64,
    /// Average cold utilization (reefers only).
    pub avg_u_cold: f64,
    /// Average bottleneck efficiency.
    pub avg_u_bn: f64,
    /// VIP orders missed.
    pub miss_vip: usize,
    /// Any order missed.
    pub miss_due: usize,
    /// Mean lateness among missed orders.
    pub avg_delay: f64,
    /// Share of VIP orders delivered on time.
    pub vip_ontime: f64,
    /// Count of cold-on-dry placements.
    pub cold_on_dry: usize,
    /// Count of trucks under their own minimum utilization.
    pub under_min: usize,
    /// Count of trucks with a capacity violation.
    pub cap_viols: usize,
    /// Count of orders not assigned to exactly one truck.
    pub splits: usize,
    /// Sum of geometric volume loaded.
    pub sum_q: f64,
    /// Sum of effective volume loaded.
    pub sum_v_eff: f64,
    /// Sum of weight loaded.
    pub sum_w: f64,
}

/// Full end-of-day snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    /// One row per opened truck.
    pub per_truck: Vec<PerTruckRow>,
    /// The single day-level KPI row.
    pub fleet: FleetSummary,
}

/// Incremental KPI accumulator for a single planning day.
#[derive(Debug, Default)]
pub struct DayTracker {
    trucks: IndexMap<String, TruckLedger>,
    orders: IndexMap<String, OrderLedger>,
    cold_on_dry_pairs: HashSet<(String, String)>,
    sum_q: f64,
    sum_v_eff: f64,
    sum_w: f64,
    c_total: f64,
    n_missed_vip: usize,
    n_missed_due: usize,
    assignment_rows: Vec<AssignmentRow>,
    order_queue_log: Vec<OrderRankRow>,
    item_queue_log: IndexMap<String, Vec<ItemRankRow>>,
}

impl DayTracker {
    /// Build an empty tracker for a fresh planning day.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a truck as opened for the day, initializing its ledger and adding its
    /// fixed cost to the day's total.
    ///
    /// Idempotent: re-registering the same `truck_id` with an identical spec is a
    /// no-op. Re-registering with a *different* spec is an invariant violation —
    /// a truck's static spec cannot change mid-day.
    pub fn open_truck(
        &mut self,
        truck_id: impl Into<String>,
        is_reefer: bool,
        q: f64,
        q_cold: f64,
        w: f64,
        fixed_cost: f64,
        tau_min: f64,
    ) -> Result<()> {
        let truck_id = truck_id.into();
        if let Some(existing) = self.trucks.get(&truck_id) {
            if existing.matches_spec(is_reefer, q, q_cold, w, fixed_cost, tau_min) {
                return Ok(());
            }
            return Err(Error::invariant(
                "tracker.open_truck",
                format!("truck {truck_id} re-registered with a different spec"),
            ));
        }

        self.trucks.insert(
            truck_id,
            TruckLedger {
                is_reefer,
                q,
                q_cold,
                w,
                fixed_cost,
                tau_min,
                used_v_eff: 0.0,
                used_q: 0.0,
                used_q_cold: 0.0,
                used_w: 0.0,
                cooler_used_m3: 0.0,
                departed: false,
                departure_time: None,
            },
        );
        self.c_total += fixed_cost;
        Ok(())
    }

    /// Record that an order was loaded onto a truck, updating truck loads, the
    /// order ledger, and day totals.
    #[allow(clippy::too_many_arguments)]
    pub fn on_assign(
        &mut self,
        order_id: impl Into<String>,
        truck_id: impl Into<String>,
        q: f64,
        q_cold: f64,
        w: f64,
        v_eff: f64,
        is_vip: bool,
        due_met: Option<bool>,
        delay_min: Option<f64>,
        cold_on_dry: bool,
    ) -> Result<()> {
        let order_id = order_id.into();
        let truck_id = truck_id.into();

        let truck = self
            .trucks
            .get_mut(&truck_id)
            .ok_or_else(|| Error::invariant("tracker.on_assign", format!("truck {truck_id} not registered")))?;
        truck.used_q += q;
        truck.used_q_cold += q_cold;
        truck.used_w += w;
        truck.used_v_eff += v_eff;

        let rec = self.orders.entry(order_id.clone()).or_insert_with(|| OrderLedger {
            q,
            q_cold,
            w,
            v_eff,
            is_vip,
            assigned_truck_count: 0,
            due_met,
            delay_min,
            placed: true,
            reason: None,
        });
        rec.assigned_truck_count += 1;

        self.sum_q += q;
        self.sum_v_eff += v_eff;
        self.sum_w += w;

        if is_vip && due_met == Some(false) {
            self.n_missed_vip += 1;
        }
        if due_met == Some(false) {
            self.n_missed_due += 1;
        }
        if cold_on_dry {
            self.cold_on_dry_pairs.insert((order_id, truck_id));
        }
        Ok(())
    }

    /// Register that an order could not be placed. Creates the order's ledger entry
    /// if absent; if it already exists (e.g. from a prior failed attempt), unions
    /// `is_vip` rather than overwriting it, per the VIP-union rule.
    pub fn on_failure(
        &mut self,
        order_id: impl Into<String>,
        is_vip: bool,
        due_missed: bool,
        delay_min: Option<f64>,
        reason: impl Into<String>,
    ) {
        let order_id = order_id.into();
        let reason = reason.into();

        let rec = self.orders.entry(order_id).or_insert_with(|| OrderLedger {
            q: 0.0,
            q_cold: 0.0,
            w: 0.0,
            v_eff: 0.0,
            is_vip,
            assigned_truck_count: 0,
            due_met: None,
            delay_min: None,
            placed: false,
            reason: Some(reason.clone()),
        });
        rec.placed = false;
        rec.reason = Some(reason);
        rec.is_vip = is_vip || rec.is_vip;

        if due_missed {
            rec.due_met = Some(false);
            rec.delay_min = delay_min;
            self.n_missed_due += 1;
            if is_vip {
                self.n_missed_vip += 1;
            }
        }
    }

    /// Mark a truck as departed, snapshotting nothing further than the `departed`
    /// flag and timestamp — KPIs are always computed fresh in [`Self::summarize_day`].
    /// Idempotent: departing an already-departed truck is a no-op.
    pub fn on_departure(&mut self, truck_id: &str, when: Option<String>) -> Result<()> {
        let truck = self
            .trucks
            .get_mut(truck_id)
            .ok_or_else(|| Error::invariant("tracker.on_departure", format!("truck {truck_id} not registered")))?;
        if truck.departed {
            return Ok(());
        }
        truck.departed = true;
        truck.departure_time = when;
        Ok(())
    }

    /// Whether `truck_id` has already been registered via [`Self::open_truck`].
    pub fn has_truck(&self, truck_id: &str) -> bool {
        self.trucks.contains_key(truck_id)
    }

    /// Append flat rows describing where each placed line landed.
    pub fn record_placement(&mut self, order_id: &str, truck_id: &str, when: &str, placements: &[Placement]) {
        for p in placements {
            self.assignment_rows.push(AssignmentRow {
                time: when.to_string(),
                order_id: order_id.to_string(),
                truck_id: truck_id.to_string(),
                item_id: p.item_id.clone(),
                qty: p.qty,
                zone: p.slot.zone,
                lane: match p.slot.lane {
                    crate::placers::types::Lane::Left => "left".to_string(),
                    crate::placers::types::Lane::Right => "right".to_string(),
                },
                layer: p.slot.layer,
                pos: p.slot.pos,
            });
        }
    }

    /// Append the ranked order queue for audit/CSV export, replacing any prior log.
    pub fn record_order_queue(&mut self, rows: Vec<OrderRankRow>) {
        self.order_queue_log = rows;
    }

    /// Append the ranked item sequence for one order.
    pub fn record_item_queue(&mut self, order_id: &str, rows: Vec<ItemRankRow>) {
        self.item_queue_log.insert(order_id.to_string(), rows);
    }

    /// The logged order queue rows, in ranked order.
    pub fn order_queue(&self) -> &[OrderRankRow] {
        &self.order_queue_log
    }

    /// The logged item ranking rows, flattened across every order in queue order.
    pub fn item_rankings(&self) -> Vec<&ItemRankRow> {
        self.item_queue_log.values().flat_map(|rows| rows.iter()).collect()
    }

    /// The logged assignment rows, in placement order.
    pub fn assignment_rows(&self) -> &[AssignmentRow] {
        &self.assignment_rows
    }

    /// Per-order status rows, for `order_status.csv`.
    pub fn order_status_rows(&self) -> Vec<(&str, &OrderLedger)> {
        self.orders.iter().map(|(id, rec)| (id.as_str(), rec)).collect()
    }

    /// Build the end-of-day KPI snapshot: one row per opened truck plus the fleet
    /// aggregate row.
    pub fn summarize_day(&self) -> DaySummary {
        let mut per_truck = Vec::with_capacity(self.trucks.len());
        let mut uvol_list = Vec::with_capacity(self.trucks.len());
        let mut uw_list = Vec::with_capacity(self.trucks.len());
        let mut ucold_list = Vec::new();
        let mut ubn_list = Vec::with_capacity(self.trucks.len());
        let mut tau_list = Vec::with_capacity(self.trucks.len());
        let mut cap_tuples = Vec::with_capacity(self.trucks.len());
        let mut fixed_costs = Vec::with_capacity(self.trucks.len());
        let mut opened_flags = Vec::with_capacity(self.trucks.len());

        for (truck_id, t) in &self.trucks {
            let uvol = kpi::u_vol_k(t.used_v_eff, t.q);
            let uw = kpi::u_w_k(t.used_w, t.w);
            let ucold = kpi::u_cold_k(t.used_q_cold, t.q_cold);
            let ubn = kpi::u_bn_k(uvol, uw);
            let under_min = kpi::under_min_flag(uvol, t.tau_min);
            let cap_bad = kpi::cap_violation_flag(t.used_v_eff, t.q, t.used_w, t.w, t.used_q_cold, t.q_cold);

            per_truck.push(PerTruckRow {
                truck_id: truck_id.clone(),
                is_reefer: t.is_reefer,
                q: t.q,
                q_cold: t.q_cold,
                w: t.w,
                used_v_eff: t.used_v_eff,
                used_q: t.used_q,
                used_q_cold: t.used_q_cold,
                used_w: t.used_w,
                u_vol: uvol,
                u_w: uw,
                u_cold: ucold,
                u_bn: ubn,
                under_min,
                cap_violation: cap_bad,
                fixed_cost: t.fixed_cost,
                departed: t.departed,
                departure_time: t.departure_time.clone(),
            });

            uvol_list.push(uvol);
            uw_list.push(uw);
            if t.is_reefer {
                ucold_list.push(ucold);
            }
            ubn_list.push(ubn);
            tau_list.push(t.tau_min);
            cap_tuples.push((t.used_v_eff, t.q, t.used_w, t.w, t.used_q_cold, t.q_cold));
            fixed_costs.push(t.fixed_cost);
            opened_flags.push(true);
        }

        let mut delays = Vec::new();
        let mut n_vip_total = 0usize;
        let mut n_vip_missed = 0usize;
        let mut assignments_per_order = Vec::with_capacity(self.orders.len());
        for rec in self.orders.values() {
            assignments_per_order.push(rec.assigned_truck_count as usize);
            if rec.is_vip {
                n_vip_total += 1;
                if rec.due_met == Some(false) {
                    n_vip_missed += 1;
                }
            }
            if rec.due_met == Some(false) {
                if let Some(d) = rec.delay_min {
                    delays.push(d);
                }
            }
        }

        let n_trucks = kpi::n_trucks_opened(&opened_flags);
        let total_cost = kpi::c_total(&fixed_costs);
        let fleet = FleetSummary {
            n_trucks,
            c_total: total_cost,
            c_per_vol: kpi::c_per_vol(total_cost, self.sum_q),
            c_per_w: kpi::c_per_w(total_cost, self.sum_w),
            e_pack: kpi::e_pack(self.sum_q, self.sum_v_eff),
            cv_uvol: kpi::cv_uvol(&uvol_list),
            cv_u_w: kpi::cv_u_w(&uw_list),
            cv_u_bn: kpi::cv_u_bn(&ubn_list),
            avg_u_vol: kpi::avg_u_vol(&uvol_list),
            avg_u_w: kpi::avg_u_w(&uw_list),
            avg_u_cold: kpi::avg_u_cold(&ucold_list),
            avg_u_bn: kpi::avg_u_bn(&ubn_list),
            miss_vip: kpi::miss_vip(self.n_missed_vip),
            miss_due: kpi::miss_due(self.n_missed_due),
            avg_delay: kpi::avg_delay(&delays),
            vip_ontime: kpi::vip_ontime(n_vip_total, n_vip_missed),
            cold_on_dry: kpi::cold_on_dry(self.cold_on_dry_pairs.len()),
            under_min: kpi::under_min_count(&uvol_list, &tau_list),
            cap_viols: kpi::cap_violations_count(&cap_tuples),
            splits: kpi::splits_count(&assignments_per_order),
            sum_q: self.sum_q,
            sum_v_eff: self.sum_v_eff,
            sum_w: self.sum_w,
        };

        DaySummary { per_truck, fleet }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_truck_is_idempotent_for_identical_spec() {
        let mut t = DayTracker::new();
        t.open_truck("D1", false, 20.0, 0.0, 9000.0, 400.0, 0.6).unwrap();
        t.open_truck("D1", false, 20.0, 0.0, 9000.0, 400.0, 0.6).unwrap();
        assert_eq!(t.summarize_day().fleet.c_total, 400.0);
    }

    #[test]
    fn open_truck_rejects_distinct_respec() {
        let mut t = DayTracker::new();
        t.open_truck("D1", false, 20.0, 0.0, 9000.0, 400.0, 0.6).unwrap();
        assert!(t.open_truck("D1", false, 25.0, 0.0, 9000.0, 400.0, 0.6).is_err());
    }

    #[test]
    fn on_assign_requires_open_truck() {
        let mut t = DayTracker::new();
        assert!(t
            .on_assign("O1", "D1", 1.0, 0.0, 10.0, 1.0, false, None, None, false)
            .is_err());
    }

    #[test]
    fn on_failure_unions_vip_without_downgrading() {
        let mut t = DayTracker::new();
        t.on_failure("O1", true, false, None, "infeasible_in_bucket_A");
        t.on_failure("O1", false, false, None, "infeasible_in_bucket_A");
        let (_, rec) = t.order_status_rows().into_iter().find(|(id, _)| *id == "O1").unwrap();
        assert!(rec.is_vip);
    }

    #[test]
    fn summarize_day_reports_cost_and_utilization() {
        let mut t = DayTracker::new();
        t.open_truck("D1", false, 20.0, 0.0, 9000.0, 400.0, 0.6).unwrap();
        t.on_assign("O1", "D1", 10.0, 0.0, 100.0, 12.0, false, Some(true), None, false)
            .unwrap();
        let snap = t.summarize_day();
        assert_eq!(snap.per_truck.len(), 1);
        assert!((snap.per_truck[0].u_vol - (12.0 / 20.0)).abs() < 1e-12);
        assert_eq!(snap.fleet.n_trucks, 1);
        assert!((snap.fleet.c_total - 400.0).abs() < 1e-12);
    }

    #[test]
    fn on_departure_is_idempotent() {
        let mut t = DayTracker::new();
        t.open_truck("D1", false, 20.0, 0.0, 9000.0, 400.0, 0.6).unwrap();
        t.on_departure("D1", Some("18:00".to_string())).unwrap();
        t.on_departure("D1", Some("19:00".to_string())).unwrap();
        assert_eq!(
            t.summarize_day().per_truck[0].departure_time,
            Some("18:00".to_string())
        );
    }
}
