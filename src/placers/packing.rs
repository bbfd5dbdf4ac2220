//! Packing policy contract and reference implementation.

use std::collections::HashMap;

use crate::domain::item::SeparationTag;
use crate::domain::Item;
use crate::placers::types::{Lane, LoadingPlan, Placement, Slot, Zone};
use crate::ranking::ItemRankRow;

/// Given a truck id and the pre-ranked item sequence for an order, produce a
/// [`LoadingPlan`], or refuse. Implementations must be deterministic in their inputs.
pub trait PackingPolicy {
    /// Attempt to pack `ranked` onto `truck_id`. `catalogue` resolves each line's item
    /// for its zone/fragility/upright features.
    fn pack(
        &self,
        truck_id: &str,
        ranked: &[ItemRankRow],
        catalogue: &HashMap<String, Item>,
    ) -> Option<LoadingPlan>;
}

fn zone_for(row: &ItemRankRow, item: &Item) -> Zone {
    if item.separation_tag == SeparationTag::Hazardous {
        Zone::Haz
    } else if row.cold01 > 0 {
        Zone::Cold
    } else {
        Zone::Ambient
    }
}

/// The reference packing policy: zone by hazard/cold, lane by current weight
/// balance, layer 1 for ordinary lines with fragile/upright lines stacked on an
/// incrementing top layer per zone. Never refuses.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReferencePackingPolicy;

impl PackingPolicy for ReferencePackingPolicy {
    fn pack(
        &self,
        truck_id: &str,
        ranked: &[ItemRankRow],
        catalogue: &HashMap<String, Item>,
    ) -> Option<LoadingPlan> {
        let mut lane_weight: HashMap<Zone, (f64, f64)> = HashMap::new();
        let mut top_layer: HashMap<Zone, u32> = HashMap::new();
        let mut placements = Vec::with_capacity(ranked.len());

        for row in ranked {
            let item = catalogue.get(&row.item_id)?;
            let zone = zone_for(row, item);

            let (left, right) = lane_weight.entry(zone).or_insert((0.0, 0.0));
            let lane = if *right < *left { Lane::Right } else { Lane::Left };
            match lane {
                Lane::Left => *left += row.w_ij,
                Lane::Right => *right += row.w_ij,
            }

            let stacked = item.fragility.score() >= 1 || item.upright_only;
            let layer = if stacked {
                let top = top_layer.entry(zone).or_insert(2);
                let assigned = *top;
                *top += 1;
                assigned
            } else {
                1
            };

            placements.push(Placement {
                item_id: row.item_id.clone(),
                qty: row.qty,
                slot: Slot {
                    zone,
                    lane,
                    layer,
                    pos: row.rank as u32,
                },
            });
        }

        Some(LoadingPlan {
            truck_id: truck_id.to_string(),
            placements,
        })
    }
}
