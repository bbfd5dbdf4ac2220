//! Lexicographic order and item ranking.

mod item_rank;
mod order_rank;

pub use item_rank::{rank_items, ItemRankRow};
pub use order_rank::{rank_orders, OrderRankRow};

use ordered_float::OrderedFloat;
use smallvec::SmallVec;

/// One component of a lexicographic sort key: either a signed scalar or a string
/// tie-break. All rows ranked against the same scheme carry the same shape of key,
/// so positions never compare across variants.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum KeyComponent {
    /// A directed numeric feature (sign already encodes ascending vs descending).
    Num(OrderedFloat<f64>),
    /// A string tie-break, always ascending.
    Str(String),
}

/// A full sort key: an ordered sequence of [`KeyComponent`]s compared lexicographically.
///
/// Inline-capacity 8 covers every scheme in [`crate::config::PlanningConfig`]'s default
/// order/item dimension sets without spilling to the heap.
pub type SortKey = SmallVec<[KeyComponent; 8]>;

/// Render a sort key as the flat string the CSV reports expect in their `sort_key`
/// column: components joined with `|`, numbers at full precision.
pub fn render_sort_key(key: &SortKey) -> String {
    key.iter()
        .map(|c| match c {
            KeyComponent::Num(n) => format!("{:.12}", n.into_inner()),
            KeyComponent::Str(s) => s.clone(),
        })
        .collect::<Vec<_>>()
        .join("|")
}
