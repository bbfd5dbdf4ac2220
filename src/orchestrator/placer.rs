//! Phase-2 placer orchestrator: routes each order to A/B/C and commits the decision
//!.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::config::{DepartureStrategy, PlanningConfig, TruckType};
use crate::domain::{Customer, CustomerOrder, Depot, Item};
use crate::feasibility::EPS;
use crate::placers::dry::{place_bucket_b, place_bucket_c};
use crate::placers::packing::PackingPolicy;
use crate::placers::reefer::place_bucket_a;
use crate::placers::types::{AssignOutcome, AssignedOrder, Bucket};
use crate::ranking::ItemRankRow;
use crate::state::SimpleStateView;
use crate::tracker::DayTracker;
use crate::{Error, Result};

/// The cold-fraction bucket gate. `epsilon = 1e-12`.
pub fn determine_bucket(alpha_i: f64, alpha_threshold: f64) -> Bucket {
    const EPSILON: f64 = 1e-12;
    if alpha_i <= EPSILON {
        Bucket::C
    } else if alpha_i >= alpha_threshold {
        Bucket::A
    } else {
        Bucket::B
    }
}

/// Drives per-order placement for Phase 2, holding the config and packing policy an
/// entire planning day shares. Stateless apart from those injected references — the
/// depot and tracker it mutates are passed in explicitly per call.
pub struct PlacerOrchestrator<'a> {
    config: &'a PlanningConfig,
    packing: &'a dyn PackingPolicy,
}

impl<'a> PlacerOrchestrator<'a> {
    /// Build a placer orchestrator against `config`'s bucket policy flags and
    /// leftover-key schemes, using `packing` to produce every accepted loading plan.
    pub fn new(config: &'a PlanningConfig, packing: &'a dyn PackingPolicy) -> Self {
        Self { config, packing }
    }

    /// Route one order to its bucket's placer and commit the outcome to `depot` and
    /// `tracker`. Returns the accepted [`AssignedOrder`], or `None` if the order could
    /// not be placed under the current policy (recorded as a tracker failure, not an
    /// `Err`).
    #[allow(clippy::too_many_arguments)]
    pub fn run_one(
        &self,
        depot: &mut Depot,
        catalogue: &HashMap<String, Item>,
        orders: &HashMap<String, CustomerOrder>,
        ranked_items: &HashMap<String, Vec<ItemRankRow>>,
        customers: &HashMap<String, Customer>,
        order_id: &str,
        tracker: &mut DayTracker,
        when: &str,
    ) -> Result<Option<AssignedOrder>> {
        let order = orders
            .get(order_id)
            .ok_or_else(|| Error::invariant("orchestrator.run_one", format!("unknown order {order_id}")))?;
        let is_vip = customers.get(&order.customer_id).map(|c| c.vip).unwrap_or(false);
        let bucket = determine_bucket(order.alpha_i, self.config.alpha_threshold);

        let outcome = {
            let view = SimpleStateView::new(depot, catalogue, orders, ranked_items);
            match bucket {
                Bucket::A => place_bucket_a(
                    &view,
                    order,
                    &self.config.reefer_scheme_a,
                    self.config.allow_open_new_reefer_a,
                    self.packing,
                ),
                Bucket::B => place_bucket_b(
                    &view,
                    order,
                    &self.config.reefer_scheme_b,
                    &self.config.dry_scheme_b,
                    self.config.allow_cold_in_dry_b,
                    self.config.allow_open_new_dry_c,
                    self.packing,
                ),
                Bucket::C => place_bucket_c(
                    &view,
                    order,
                    &self.config.dry_scheme_c,
                    self.config.allow_open_new_dry_c,
                    self.packing,
                ),
            }
        };

        match outcome {
            AssignOutcome::Assigned(assigned) => {
                debug!(order_id, truck_id = %assigned.truck_id, bucket = %bucket, "order placed");
                self.apply_decision(depot, tracker, order, &assigned, is_vip, when)?;
                Ok(Some(*assigned))
            }
            AssignOutcome::Failed(reason) => {
                warn!(order_id, bucket = %bucket, reason = %reason.as_code(), "order not placed");
                tracker.on_failure(order_id, is_vip, false, None, reason.as_code());
                Ok(None)
            }
        }
    }

    /// Route every order in `order_ids`, in sequence, returning each order's outcome
    /// in the same order.
    #[allow(clippy::too_many_arguments)]
    pub fn run_many(
        &self,
        depot: &mut Depot,
        catalogue: &HashMap<String, Item>,
        orders: &HashMap<String, CustomerOrder>,
        ranked_items: &HashMap<String, Vec<ItemRankRow>>,
        customers: &HashMap<String, Customer>,
        order_ids: &[String],
        tracker: &mut DayTracker,
        when: &str,
    ) -> Result<Vec<Option<AssignedOrder>>> {
        order_ids
            .iter()
            .map(|order_id| self.run_one(depot, catalogue, orders, ranked_items, customers, order_id, tracker, when))
            .collect()
    }

    /// Commit an accepted decision: open the truck in the tracker if needed, mutate
    /// the truck's runtime ledger, update the tracker's order ledger, and persist the
    /// packing placements.
    fn apply_decision(
        &self,
        depot: &mut Depot,
        tracker: &mut DayTracker,
        order: &CustomerOrder,
        assigned: &AssignedOrder,
        is_vip: bool,
        when: &str,
    ) -> Result<()> {
        let truck = depot.truck_mut(&assigned.truck_id).ok_or_else(|| {
            Error::invariant("orchestrator.apply_decision", format!("unknown truck {}", assigned.truck_id))
        })?;

        if !tracker.has_truck(&assigned.truck_id) {
            tracker.open_truck(
                assigned.truck_id.clone(),
                truck.spec.truck_type == TruckType::Reefer,
                truck.spec.total_capacity_m3,
                truck.spec.cold_capacity_m3,
                truck.spec.weight_limit_kg,
                truck.spec.fixed_cost,
                truck.spec.min_utilization,
            )?;
        }

        let is_dry = truck.spec.truck_type == TruckType::Dry;
        let (cold_vol, cooler_vol) = if is_dry { (0.0, order.q_i_cold) } else { (order.q_i_cold, 0.0) };
        truck.apply_assignment(order.order_id.clone(), order.q_i, order.v_i_eff, order.w_i, cold_vol, cooler_vol);
        truck.check_invariants()?;

        let cold_on_dry = is_dry && order.q_i_cold > 0.0;
        tracker.on_assign(
            order.order_id.clone(),
            assigned.truck_id.clone(),
            order.q_i,
            order.q_i_cold,
            order.w_i,
            order.v_i_eff,
            is_vip,
            None,
            None,
            cold_on_dry,
        )?;

        tracker.record_placement(&order.order_id, &assigned.truck_id, when, &assigned.plan.placements);
        Ok(())
    }

    /// Apply the configured end-of-run departure policy, returning the truck ids that
    /// were just marked departed.
    pub fn maybe_depart_trucks(&self, depot: &mut Depot, tracker: &mut DayTracker) -> Result<Vec<String>> {
        let mut departed = Vec::new();
        if self.config.departure_strategy == DepartureStrategy::None {
            return Ok(departed);
        }

        let open_ids: Vec<String> = depot.open_trucks().map(|t| t.spec.id.clone()).collect();
        for id in open_ids {
            let truck = depot.truck_mut(&id).expect("id came from depot.open_trucks()");
            if truck.departed {
                continue;
            }
            match self.config.departure_strategy {
                DepartureStrategy::None => unreachable!(),
                DepartureStrategy::MinUtil => {
                    let threshold = truck.spec.min_utilization + self.config.min_util_slack;
                    if truck.utilization() + EPS >= threshold {
                        truck.departed = true;
                        truck.departure_time = None;
                        tracker.on_departure(&id, None)?;
                        debug!(truck_id = %id, "truck departed under min_util strategy");
                        departed.push(id);
                    }
                }
                DepartureStrategy::Time => {
                    truck.departed = true;
                    truck.departure_time = self.config.depart_time.clone();
                    tracker.on_departure(&id, self.config.depart_time.clone())?;
                    debug!(truck_id = %id, "truck departed under time strategy");
                    departed.push(id);
                }
            }
        }
        Ok(departed)
    }

    /// Freeze and return the day's full KPI snapshot.
    pub fn finalize_day(&self, tracker: &DayTracker) -> crate::tracker::DaySummary {
        tracker.summarize_day()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ReeferDim, TruckSpec};
    use crate::domain::item::{Fragility, SeparationTag};
    use crate::domain::Truck as DomainTruck;
    use crate::placers::packing::ReferencePackingPolicy;
    use indexmap::IndexMap;

    fn catalogue() -> HashMap<String, Item> {
        let mut m = HashMap::new();
        m.insert(
            "MILK".to_string(),
            Item {
                item_id: "MILK".into(),
                name: "Milk".into(),
                w_unit: 1.0,
                v_unit: 1.0,
                padding_factor: 0.0,
                category_cold: true,
                is_liquid: true,
                upright_only: false,
                max_stack_load_kg: 10.0,
                fragility: Fragility::Regular,
                separation_tag: SeparationTag::Food,
            },
        );
        m
    }

    fn reefer_spec(id: &str) -> TruckSpec {
        TruckSpec {
            id: id.to_string(),
            truck_type: TruckType::Reefer,
            total_capacity_m3: 10.0,
            cold_capacity_m3: 10.0,
            weight_limit_kg: 1000.0,
            fixed_cost: 500.0,
            min_utilization: 0.1,
            reserve_fraction: 0.0,
            cooler_capacity_m3: None,
        }
    }

    fn order(qty: i64) -> CustomerOrder {
        let cat = catalogue();
        let mut items = IndexMap::new();
        items.insert("MILK".to_string(), qty);
        CustomerOrder::new("O1", "C1", items, "10:00", &cat, None).unwrap()
    }

    #[test]
    fn determine_bucket_splits_on_alpha() {
        assert_eq!(determine_bucket(0.0, 0.5), Bucket::C);
        assert_eq!(determine_bucket(0.6, 0.5), Bucket::A);
        assert_eq!(determine_bucket(0.2, 0.5), Bucket::B);
    }

    #[test]
    fn run_one_assigns_and_commits_to_depot_and_tracker() {
        let config = PlanningConfig {
            reefer_scheme_a: vec![ReeferDim::Volume],
            ..PlanningConfig::default()
        };
        let packing = ReferencePackingPolicy;
        let orchestrator = PlacerOrchestrator::new(&config, &packing);

        let mut depot = Depot::new("D", vec![DomainTruck::new(reefer_spec("R1"), 0.0)]);
        let catalogue = catalogue();
        let order = order(2);
        let orders = HashMap::from([(order.order_id.clone(), order.clone())]);
        let ranked_rows = crate::ranking::rank_items(&order, &catalogue, &config.item_scheme).unwrap();
        let ranked_items = HashMap::from([("O1".to_string(), ranked_rows)]);
        let customers = HashMap::new();
        let mut tracker = DayTracker::new();

        let outcome = orchestrator
            .run_one(&mut depot, &catalogue, &orders, &ranked_items, &customers, "O1", &mut tracker, "10:00")
            .unwrap();
        assert!(outcome.is_some());
        assert_eq!(depot.truck("R1").unwrap().assigned_order_ids, vec!["O1".to_string()]);
        assert_eq!(tracker.summarize_day().per_truck.len(), 1);
    }

    #[test]
    fn run_one_records_failure_without_erroring() {
        let config = PlanningConfig::default();
        let packing = ReferencePackingPolicy;
        let orchestrator = PlacerOrchestrator::new(&config, &packing);

        let depot = Depot::new("D", vec![]);
        let mut depot = depot;
        let catalogue = catalogue();
        let order = order(2);
        let orders = HashMap::from([(order.order_id.clone(), order.clone())]);
        let ranked_items = HashMap::new();
        let customers = HashMap::new();
        let mut tracker = DayTracker::new();

        let outcome = orchestrator
            .run_one(&mut depot, &catalogue, &orders, &ranked_items, &customers, "O1", &mut tracker, "10:00")
            .unwrap();
        assert!(outcome.is_none());
        let (_, rec) = tracker.order_status_rows().into_iter().find(|(id, _)| *id == "O1").unwrap();
        assert!(!rec.placed);
    }

    #[test]
    fn maybe_depart_trucks_none_strategy_departs_nothing() {
        let config = PlanningConfig::default();
        let packing = ReferencePackingPolicy;
        let orchestrator = PlacerOrchestrator::new(&config, &packing);
        let mut depot = Depot::new("D", vec![DomainTruck::new(reefer_spec("R1"), 0.0)]);
        let mut tracker = DayTracker::new();
        let departed = orchestrator.maybe_depart_trucks(&mut depot, &mut tracker).unwrap();
        assert!(departed.is_empty());
    }
}
