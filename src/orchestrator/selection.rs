//! Phase-1 selection orchestrator: builds and logs the priority queues.

use std::collections::HashMap;

use tracing::debug;

use crate::config::PlanningConfig;
use crate::domain::{Customer, CustomerOrder, Item};
use crate::ranking::{rank_items, rank_orders, ItemRankRow};
use crate::tracker::DayTracker;
use crate::Result;

/// Builds the global order queue and, for each order in rank order, its within-order
/// item ranking, logging both into the day tracker for audit/export.
pub struct SelectionOrchestrator<'a> {
    config: &'a PlanningConfig,
}

impl<'a> SelectionOrchestrator<'a> {
    /// Build a selection orchestrator against `config`'s ranking schemes.
    pub fn new(config: &'a PlanningConfig) -> Self {
        Self { config }
    }

    /// Run Phase 1: rank every order, then rank items within each, in ranked-order
    /// sequence. Returns the ordered order-id queue and a per-order ranked-item map
    /// ready for Phase 2.
    pub fn run(
        &self,
        orders: &[CustomerOrder],
        customers: &HashMap<String, Customer>,
        catalogue: &HashMap<String, Item>,
        tracker: &mut DayTracker,
        run_id: &str,
    ) -> Result<(Vec<String>, HashMap<String, Vec<ItemRankRow>>)> {
        let (ids, order_rows) = rank_orders(orders, customers, &self.config.order_scheme, run_id);
        debug!(run_id, n_orders = ids.len(), "ranked order queue");
        tracker.record_order_queue(order_rows);

        let by_id: HashMap<&str, &CustomerOrder> =
            orders.iter().map(|o| (o.order_id.as_str(), o)).collect();

        let mut ranked_items_by_order = HashMap::with_capacity(ids.len());
        for order_id in &ids {
            let order = by_id
                .get(order_id.as_str())
                .expect("order id ranked from the given orders slice");
            let rows = rank_items(order, catalogue, &self.config.item_scheme)?;
            debug!(order_id, n_lines = rows.len(), "ranked item sequence");
            tracker.record_item_queue(order_id, rows.clone());
            ranked_items_by_order.insert(order_id.clone(), rows);
        }

        Ok((ids, ranked_items_by_order))
    }
}
