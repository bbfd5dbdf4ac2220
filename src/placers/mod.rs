//! Placement: packing policy, and the bucket A/B/C best-fit placers.

pub mod dry;
pub mod packing;
pub mod reefer;
pub mod types;

use std::collections::HashMap;

use crate::domain::Item;
use crate::ranking::ItemRankRow;
use crate::state::StateView;

/// Build the thin per-order catalogue slice a packing policy needs, by resolving each
/// ranked line's item id through the state view.
pub(crate) fn catalogue_from_ranked(
    state: &dyn StateView,
    ranked: &[ItemRankRow],
) -> HashMap<String, Item> {
    ranked
        .iter()
        .filter_map(|row| state.item(&row.item_id).map(|item| (row.item_id.clone(), item.clone())))
        .collect()
}
