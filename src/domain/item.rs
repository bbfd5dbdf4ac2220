//! Catalogue item.

use serde::{Deserialize, Serialize};

/// Handling fragility, ordered least to most fragile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Fragility {
    /// No special handling.
    Regular,
    /// Handle with care.
    Delicate,
    /// Must not be crushed or inverted.
    Fragile,
}

impl Fragility {
    /// Numeric score used in the item-ranking key: REGULAR=0, DELICATE=1, FRAGILE=2.
    pub fn score(self) -> u8 {
        match self {
            Fragility::Regular => 0,
            Fragility::Delicate => 1,
            Fragility::Fragile => 2,
        }
    }
}

/// Separation classes affecting co-loading policy (not used by the packing reference
/// policy directly, but carried through as catalogue data for reporting).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SeparationTag {
    /// Ordinary food item.
    Food,
    /// Non-food item.
    NonFood,
    /// Allergen-sensitive item.
    Allergen,
    /// Hazardous material.
    Hazardous,
}

/// A catalogue entry. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Catalogue identifier.
    pub item_id: String,
    /// Display name.
    pub name: String,
    /// Mass of one unit (kg).
    pub w_unit: f64,
    /// Nominal (unpadded) volume of one unit (m3).
    pub v_unit: f64,
    /// Padding factor in [0,1] inflating `v_unit` into `v_eff`.
    pub padding_factor: f64,
    /// Whether this item requires refrigeration.
    pub category_cold: bool,
    /// Whether this item is a liquid.
    pub is_liquid: bool,
    /// Whether this item must be stored upright.
    pub upright_only: bool,
    /// Maximum load (kg) that may be stacked atop one unit.
    pub max_stack_load_kg: f64,
    /// Fragility class.
    pub fragility: Fragility,
    /// Separation class.
    pub separation_tag: SeparationTag,
}

impl Item {
    /// Effective per-unit volume: `v_unit * (1 + padding_factor)`.
    pub fn v_eff_unit(&self) -> f64 {
        self.v_unit * (1.0 + self.padding_factor)
    }
}
