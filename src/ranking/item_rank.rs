//! Within-order item ranker.

use std::collections::HashMap;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::config::ItemDim;
use crate::domain::{CustomerOrder, Item};
use crate::ranking::{render_sort_key, KeyComponent, SortKey};
use crate::{Error, Result};

/// One audit row produced by the item ranker, matching `item_rankings.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRankRow {
    /// Owning order identifier.
    pub order_id: String,
    /// Zero-based rank within the order.
    pub rank: usize,
    /// Item identifier.
    pub item_id: String,
    /// Quantity ordered.
    pub qty: i64,
    /// 1 if the item requires refrigeration, else 0.
    pub cold01: u8,
    /// Per-line weight, `qty * w_unit`.
    pub w_ij: f64,
    /// Per-line effective volume, `qty * v_eff_unit`.
    pub v_ij_eff: f64,
    /// 1 if the item is a liquid, else 0.
    pub liquid01: u8,
    /// Maximum stackable load atop one unit.
    pub stack_limit: f64,
    /// Fragility score (0=REGULAR, 1=DELICATE, 2=FRAGILE).
    pub fragile_score: u8,
    /// 1 if the item must be stored upright, else 0.
    pub upright01: u8,
    /// The literal lexicographic key, rendered for audit/CSV output.
    pub sort_key: String,
}

struct LineFeatures<'a> {
    item: &'a Item,
    w_ij: f64,
    v_ij_eff: f64,
}

fn key_component(dim: ItemDim, f: &LineFeatures) -> KeyComponent {
    match dim {
        ItemDim::Cold => KeyComponent::Num(OrderedFloat(if f.item.category_cold { -1.0 } else { 0.0 })),
        ItemDim::Weight => KeyComponent::Num(OrderedFloat(-f.w_ij)),
        ItemDim::VEff => KeyComponent::Num(OrderedFloat(-f.v_ij_eff)),
        ItemDim::Liquid => KeyComponent::Num(OrderedFloat(if f.item.is_liquid { -1.0 } else { 0.0 })),
        ItemDim::StackLimit => KeyComponent::Num(OrderedFloat(-f.item.max_stack_load_kg)),
        ItemDim::Fragile => KeyComponent::Num(OrderedFloat(f.item.fragility.score() as f64)),
        ItemDim::Upright => KeyComponent::Num(OrderedFloat(if f.item.upright_only { 1.0 } else { 0.0 })),
        ItemDim::ItemId => KeyComponent::Str(f.item.item_id.clone()),
    }
}

fn build_key(scheme: &[ItemDim], f: &LineFeatures) -> SortKey {
    let mut key: SortKey = scheme.iter().map(|&d| key_component(d, f)).collect();
    if !scheme.contains(&ItemDim::ItemId) {
        key.push(KeyComponent::Str(f.item.item_id.clone()));
    }
    key
}

/// Rank one order's item lines under `scheme`, producing the audit rows in loading
/// order. Fails if a line references an item absent from `catalogue` —
/// this should not happen for an order already built via [`CustomerOrder::new`], but
/// the ranker does not assume the caller validated it twice.
pub fn rank_items(
    order: &CustomerOrder,
    catalogue: &HashMap<String, Item>,
    scheme: &[ItemDim],
) -> Result<Vec<ItemRankRow>> {
    let mut keyed = Vec::with_capacity(order.item_list.len());
    for (item_id, &qty) in &order.item_list {
        let item = catalogue
            .get(item_id)
            .ok_or_else(|| Error::unknown_item(&order.order_id, item_id.clone()))?;
        let qty_f = qty as f64;
        let f = LineFeatures {
            item,
            w_ij: qty_f * item.w_unit,
            v_ij_eff: qty_f * item.v_eff_unit(),
        };
        let key = build_key(scheme, &f);
        keyed.push((key, item, qty, f.w_ij, f.v_ij_eff));
    }

    keyed.sort_by(|a, b| a.0.cmp(&b.0));

    Ok(keyed
        .into_iter()
        .enumerate()
        .map(|(rank, (key, item, qty, w_ij, v_ij_eff))| ItemRankRow {
            order_id: order.order_id.clone(),
            rank,
            item_id: item.item_id.clone(),
            qty,
            cold01: item.category_cold as u8,
            w_ij,
            v_ij_eff,
            liquid01: item.is_liquid as u8,
            stack_limit: item.max_stack_load_kg,
            fragile_score: item.fragility.score(),
            upright01: item.upright_only as u8,
            sort_key: render_sort_key(&key),
        })
        .collect())
}
