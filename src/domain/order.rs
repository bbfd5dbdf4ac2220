//! Customer order and its derived aggregates.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::parse_hhmm;
use crate::domain::item::Item;
use crate::{Error, Result};

/// One resolved `(item_id, qty)` line within an order, used by the item ranker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Item identifier.
    pub item_id: String,
    /// Quantity ordered (>= 1).
    pub qty: i64,
}

/// Default due time when neither `due_time_str` nor its alias `due` is present.
pub const DEFAULT_DUE_TIME_STR: &str = "23:59";

/// A customer order with its aggregates computed once at load and held invariant
/// for the planning day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerOrder {
    /// Order identifier.
    pub order_id: String,
    /// Ordering customer.
    pub customer_id: String,
    /// Item id -> quantity, unique keys, each qty >= 1.
    pub item_list: IndexMap<String, i64>,
    /// Requested delivery deadline, `HH:MM`.
    pub due_time_str: String,
    /// Geometric total volume `q_i = sum(qty * v_unit)`.
    pub q_i: f64,
    /// Cold geometric volume `q_i_cold = sum over cold items(qty * v_unit)`.
    pub q_i_cold: f64,
    /// Total weight `w_i = sum(qty * w_unit)`.
    pub w_i: f64,
    /// Total effective (padded) volume `v_i_eff = sum(qty * v_eff_unit)`.
    pub v_i_eff: f64,
    /// Cold fraction `alpha_i = q_i_cold / q_i` (0 if q_i == 0), possibly clamped.
    pub alpha_i: f64,
    /// Due time expressed as minutes since midnight, for ascending comparison.
    pub due_minutes: u32,
}

/// Resolve the `item_list`/`items` alias pair: `item_list` wins when present,
/// confirmed against the source's `from_json`.
pub fn resolve_item_list(
    item_list: Option<IndexMap<String, i64>>,
    items: Option<IndexMap<String, i64>>,
) -> IndexMap<String, i64> {
    item_list.or(items).unwrap_or_default()
}

/// Resolve the `due_time_str`/`due` alias pair, defaulting to `"23:59"` when neither
/// is present.
pub fn resolve_due_time_str(due_time_str: Option<String>, due: Option<String>) -> String {
    due_time_str
        .or(due)
        .unwrap_or_else(|| DEFAULT_DUE_TIME_STR.to_string())
}

impl CustomerOrder {
    /// Build an order and compute its aggregates once against the catalogue.
    ///
    /// `alpha_max`, when given, clamps `alpha_i` down: if `alpha_i > alpha_max`, both
    /// `q_i_cold` and `alpha_i` are recomputed so the identity `alpha_i = q_i_cold / q_i`
    /// still holds post-clamp (Open Question 2's implementer-preferred resolution).
    pub fn new(
        order_id: impl Into<String>,
        customer_id: impl Into<String>,
        item_list: IndexMap<String, i64>,
        due_time_str: impl Into<String>,
        catalogue: &HashMap<String, Item>,
        alpha_max: Option<f64>,
    ) -> Result<Self> {
        let order_id = order_id.into();
        let customer_id = customer_id.into();
        let due_time_str = due_time_str.into();

        let (h, m) = parse_hhmm(&format!("orders.{order_id}.due_time_str"), &due_time_str)?;
        let due_minutes = h * 60 + m;

        let mut q_i = 0.0;
        let mut q_i_cold = 0.0;
        let mut w_i = 0.0;
        let mut v_i_eff = 0.0;

        for (item_id, &qty) in &item_list {
            if qty < 1 {
                return Err(Error::invalid_quantity(&order_id, item_id.clone(), qty));
            }
            let item = catalogue
                .get(item_id)
                .ok_or_else(|| Error::unknown_item(&order_id, item_id.clone()))?;
            let qty_f = qty as f64;
            q_i += qty_f * item.v_unit;
            w_i += qty_f * item.w_unit;
            v_i_eff += qty_f * item.v_eff_unit();
            if item.category_cold {
                q_i_cold += qty_f * item.v_unit;
            }
        }

        let mut alpha_i = if q_i <= 0.0 { 0.0 } else { q_i_cold / q_i };

        if let Some(alpha_max) = alpha_max {
            if alpha_i > alpha_max {
                q_i_cold = alpha_max * q_i;
                alpha_i = alpha_max;
            }
        }

        Ok(Self {
            order_id,
            customer_id,
            item_list,
            due_time_str,
            q_i,
            q_i_cold,
            w_i,
            v_i_eff,
            alpha_i,
            due_minutes,
        })
    }

    /// Resolved, ranking-ready view of this order's lines.
    pub fn lines(&self) -> Vec<OrderLine> {
        self.item_list
            .iter()
            .map(|(item_id, &qty)| OrderLine {
                item_id: item_id.clone(),
                qty,
            })
            .collect()
    }
}
