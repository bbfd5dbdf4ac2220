//! Global order ranker.

use std::collections::HashMap;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::config::OrderDim;
use crate::domain::{Customer, CustomerOrder};
use crate::ranking::{render_sort_key, KeyComponent, SortKey};

/// One audit row produced by the order ranker, matching `order_queue.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRankRow {
    /// Tag identifying the ranking run that produced this row.
    pub run_id: String,
    /// Zero-based rank within this run.
    pub rank: usize,
    /// Order identifier.
    pub order_id: String,
    /// VIP flag of the ordering customer.
    pub vip: bool,
    /// Due time, `HH:MM`.
    pub due: String,
    /// Cold fraction.
    pub alpha: f64,
    /// Effective volume.
    pub v_eff: f64,
    /// Weight.
    pub weight: f64,
    /// The literal lexicographic key, rendered for audit/CSV output.
    pub sort_key: String,
}

fn key_component(dim: OrderDim, order: &CustomerOrder, vip: bool) -> KeyComponent {
    match dim {
        OrderDim::Vip => KeyComponent::Num(OrderedFloat(if vip { 0.0 } else { 1.0 })),
        OrderDim::Due => KeyComponent::Num(OrderedFloat(order.due_minutes as f64)),
        OrderDim::Alpha => KeyComponent::Num(OrderedFloat(-order.alpha_i)),
        OrderDim::VEff => KeyComponent::Num(OrderedFloat(-order.v_i_eff)),
        OrderDim::Weight => KeyComponent::Num(OrderedFloat(-order.w_i)),
        OrderDim::OrderId => KeyComponent::Str(order.order_id.clone()),
    }
}

fn build_key(scheme: &[OrderDim], order: &CustomerOrder, vip: bool) -> SortKey {
    let mut key: SortKey = scheme.iter().map(|&d| key_component(d, order, vip)).collect();
    if !scheme.contains(&OrderDim::OrderId) {
        key.push(KeyComponent::Str(order.order_id.clone()));
    }
    key
}

/// Rank `orders` under `scheme`, returning the ordered id list and the full audit rows.
///
/// `customers` must contain every order's `customer_id`; a missing customer is treated
/// as non-VIP, since VIP-ness is the only feature the ranker reads off the customer.
pub fn rank_orders(
    orders: &[CustomerOrder],
    customers: &HashMap<String, Customer>,
    scheme: &[OrderDim],
    run_id: &str,
) -> (Vec<String>, Vec<OrderRankRow>) {
    let mut keyed: Vec<(SortKey, &CustomerOrder, bool)> = orders
        .iter()
        .map(|o| {
            let vip = customers.get(&o.customer_id).map(|c| c.vip).unwrap_or(false);
            (build_key(scheme, o, vip), o, vip)
        })
        .collect();

    keyed.sort_by(|a, b| a.0.cmp(&b.0));

    let mut ids = Vec::with_capacity(keyed.len());
    let mut rows = Vec::with_capacity(keyed.len());
    for (rank, (key, order, vip)) in keyed.into_iter().enumerate() {
        ids.push(order.order_id.clone());
        rows.push(OrderRankRow {
            run_id: run_id.to_string(),
            rank,
            order_id: order.order_id.clone(),
            vip,
            due: order.due_time_str.clone(),
            alpha: order.alpha_i,
            v_eff: order.v_i_eff,
            weight: order.w_i,
            sort_key: render_sort_key(&key),
        });
    }
    (ids, rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::item::Item;
    use indexmap::IndexMap;
    use std::collections::HashMap as Map;

    fn catalogue() -> Map<String, Item> {
        use crate::domain::item::{Fragility, SeparationTag};
        let mut m = Map::new();
        m.insert(
            "X".to_string(),
            Item {
                item_id: "X".into(),
                name: "X".into(),
                w_unit: 1.0,
                v_unit: 1.0,
                padding_factor: 0.0,
                category_cold: false,
                is_liquid: false,
                upright_only: false,
                max_stack_load_kg: 10.0,
                fragility: Fragility::Regular,
                separation_tag: SeparationTag::Food,
            },
        );
        m
    }

    fn order(id: &str, customer_id: &str, due: &str, qty: i64) -> CustomerOrder {
        let cat = catalogue();
        let mut items = IndexMap::new();
        items.insert("X".to_string(), qty);
        CustomerOrder::new(id, customer_id, items, due, &cat, None).unwrap()
    }

    #[test]
    fn vip_orders_come_first() {
        let mut customers = HashMap::new();
        customers.insert(
            "C1".to_string(),
            Customer {
                customer_id: "C1".into(),
                name: "A".into(),
                email: "a@x.com".into(),
                vip: false,
                address: "addr".into(),
            },
        );
        customers.insert(
            "C2".to_string(),
            Customer {
                customer_id: "C2".into(),
                name: "B".into(),
                email: "b@x.com".into(),
                vip: true,
                address: "addr".into(),
            },
        );
        let orders = vec![order("O1", "C1", "10:00", 1), order("O2", "C2", "12:00", 1)];
        let scheme = vec![OrderDim::Vip, OrderDim::OrderId];
        let (ids, rows) = rank_orders(&orders, &customers, &scheme, "run1");
        assert_eq!(ids, vec!["O2".to_string(), "O1".to_string()]);
        assert!(rows[0].vip);
    }

    #[test]
    fn due_ascending_breaks_ties_on_order_id() {
        let customers = HashMap::new();
        let orders = vec![
            order("O2", "C1", "09:00", 1),
            order("O1", "C1", "09:00", 1),
        ];
        let scheme = vec![OrderDim::Due];
        let (ids, _) = rank_orders(&orders, &customers, &scheme, "run1");
        assert_eq!(ids, vec!["O1".to_string(), "O2".to_string()]);
    }

    #[test]
    fn rank_is_contiguous_from_zero() {
        let customers = HashMap::new();
        let orders = vec![order("O1", "C1", "09:00", 1), order("O2", "C1", "09:00", 2)];
        let scheme = vec![OrderDim::OrderId];
        let (_, rows) = rank_orders(&orders, &customers, &scheme, "run1");
        assert_eq!(rows[0].rank, 0);
        assert_eq!(rows[1].rank, 1);
    }
}
