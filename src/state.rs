//! Read-only state projection consumed by the feasibility checker and placers
//!: a capability trait plus a straightforward in-memory impl.

use std::collections::HashMap;

use crate::domain::{CustomerOrder, Depot, Item, Truck};
use crate::ranking::ItemRankRow;

/// Read-only view over the planning state a placer needs: pending orders, the
/// catalogue, and the depot's trucks. Deliberately narrower than the full domain
/// model — no component reachable only through `StateView` may mutate anything.
pub trait StateView {
    /// Look up a pending order by id.
    fn order(&self, order_id: &str) -> Option<&CustomerOrder>;

    /// Look up a catalogue item by id.
    fn item(&self, item_id: &str) -> Option<&Item>;

    /// Pre-ranked item lines for `order_id`, as produced by the item ranker.
    fn ranked_items(&self, order_id: &str) -> Option<&[ItemRankRow]>;

    /// Open, not-yet-departed reefer trucks, in ascending id order.
    fn open_reefers(&self) -> Vec<&Truck>;

    /// Open, not-yet-departed dry trucks, in ascending id order.
    fn open_dry_trucks(&self) -> Vec<&Truck>;

    /// Available-but-unopened reefer trucks, in ascending id order.
    fn unopened_reefers(&self) -> Vec<&Truck>;

    /// Available-but-unopened dry trucks, in ascending id order.
    fn unopened_dry_trucks(&self) -> Vec<&Truck>;

    /// Look up any truck (open, unopened, or departed) by id.
    fn truck(&self, truck_id: &str) -> Option<&Truck>;
}

/// The straightforward [`StateView`] implementation: one depot's fleet plus the
/// pending-order and ranked-item maps built by the selection orchestrator.
pub struct SimpleStateView<'a> {
    depot: &'a Depot,
    catalogue: &'a HashMap<String, Item>,
    orders: &'a HashMap<String, CustomerOrder>,
    ranked_items: &'a HashMap<String, Vec<ItemRankRow>>,
}

impl<'a> SimpleStateView<'a> {
    /// Build a view over `depot`'s current fleet and the given catalogue, order map,
    /// and per-order ranked-item map (as produced by Phase 1).
    pub fn new(
        depot: &'a Depot,
        catalogue: &'a HashMap<String, Item>,
        orders: &'a HashMap<String, CustomerOrder>,
        ranked_items: &'a HashMap<String, Vec<ItemRankRow>>,
    ) -> Self {
        Self {
            depot,
            catalogue,
            orders,
            ranked_items,
        }
    }
}

impl<'a> StateView for SimpleStateView<'a> {
    fn order(&self, order_id: &str) -> Option<&CustomerOrder> {
        self.orders.get(order_id)
    }

    fn item(&self, item_id: &str) -> Option<&Item> {
        self.catalogue.get(item_id)
    }

    fn ranked_items(&self, order_id: &str) -> Option<&[ItemRankRow]> {
        self.ranked_items.get(order_id).map(Vec::as_slice)
    }

    fn open_reefers(&self) -> Vec<&Truck> {
        self.depot
            .open_trucks()
            .filter(|t| t.spec.truck_type == crate::config::TruckType::Reefer)
            .collect()
    }

    fn open_dry_trucks(&self) -> Vec<&Truck> {
        self.depot
            .open_trucks()
            .filter(|t| t.spec.truck_type == crate::config::TruckType::Dry)
            .collect()
    }

    fn unopened_reefers(&self) -> Vec<&Truck> {
        self.depot
            .unopened_trucks()
            .filter(|t| t.spec.truck_type == crate::config::TruckType::Reefer)
            .collect()
    }

    fn unopened_dry_trucks(&self) -> Vec<&Truck> {
        self.depot
            .unopened_trucks()
            .filter(|t| t.spec.truck_type == crate::config::TruckType::Dry)
            .collect()
    }

    fn truck(&self, truck_id: &str) -> Option<&Truck> {
        self.depot.truck(truck_id)
    }
}
