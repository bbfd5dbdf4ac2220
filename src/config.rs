//! Planning configuration: schemes, policy flags, and the validated truck spec.
//!
//! Field ranges mirror the rules enforced upstream by the instance-generation config
//! (`OrderGenConfig`/`TruckSpec` in the source this was distilled from) — ported as
//! *rules*, since generation itself is out of scope here.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Dimensions usable in an order-ranking scheme (§4.1). Direction is fixed per dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderDim {
    /// VIP descending (true before false)
    Vip,
    /// Due time ascending
    Due,
    /// Cold fraction descending
    Alpha,
    /// Effective volume descending
    VEff,
    /// Weight descending
    Weight,
    /// Order id ascending (stable terminal tie-break)
    OrderId,
}

/// Dimensions usable in an item-ranking scheme (§4.2). Direction is fixed per dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemDim {
    /// Cold descending (cold items first)
    Cold,
    /// Per-line weight descending
    Weight,
    /// Per-line effective volume descending
    VEff,
    /// Liquid descending
    Liquid,
    /// Stack limit descending
    StackLimit,
    /// Fragility score ascending (less fragile first)
    Fragile,
    /// Upright-only ascending (non-upright first)
    Upright,
    /// Item id ascending
    ItemId,
}

/// Dimensions usable in a reefer leftover-key scheme (§4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReeferDim {
    /// Cold residual minus cold demand
    Cold,
    /// Volume residual minus volume demand
    Volume,
    /// Weight residual minus weight demand
    Weight,
}

/// Dimensions usable in a dry leftover-key scheme (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DryDim {
    /// Volume residual minus volume demand
    Volume,
    /// Weight residual minus weight demand
    Weight,
}

/// End-of-run truck departure policy (§4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepartureStrategy {
    /// No truck ever departs during the run.
    #[default]
    None,
    /// Depart every opened truck whose `U_vol_k >= tau_min + min_util_slack`.
    MinUtil,
    /// Depart every still-open truck, stamping `depart_time`.
    Time,
}

/// Every planning knob a day's run is configured with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanningConfig {
    /// Cold-fraction threshold splitting bucket A from bucket B.
    pub alpha_threshold: f64,
    /// Whether bucket A may open a new reefer when none open fits.
    pub allow_open_new_reefer_a: bool,
    /// Whether bucket B may place cold volume into a dry truck's cooler.
    pub allow_cold_in_dry_b: bool,
    /// Whether bucket C may open a new dry truck when none open fits.
    pub allow_open_new_dry_c: bool,
    /// Default cooler capacity (m3) for a dry truck whose record omits one.
    pub per_truck_cooler_m3: f64,
    /// Leftover-key scheme for bucket A.
    pub reefer_scheme_a: Vec<ReeferDim>,
    /// Leftover-key scheme for bucket B's reefer fallback.
    pub reefer_scheme_b: Vec<ReeferDim>,
    /// Leftover-key scheme for bucket B's dry fallback.
    pub dry_scheme_b: Vec<DryDim>,
    /// Leftover-key scheme for bucket C.
    pub dry_scheme_c: Vec<DryDim>,
    /// Global order-ranking scheme.
    pub order_scheme: Vec<OrderDim>,
    /// Within-order item-ranking scheme.
    pub item_scheme: Vec<ItemDim>,
    /// End-of-run departure policy.
    pub departure_strategy: DepartureStrategy,
    /// Extra slack added to tau_min for the `min_util` departure strategy.
    pub min_util_slack: f64,
    /// `HH:MM` stamp used by the `time` departure strategy.
    pub depart_time: Option<String>,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            alpha_threshold: 0.1,
            allow_open_new_reefer_a: true,
            allow_cold_in_dry_b: true,
            allow_open_new_dry_c: true,
            per_truck_cooler_m3: 0.0,
            reefer_scheme_a: vec![ReeferDim::Cold, ReeferDim::Volume, ReeferDim::Weight],
            reefer_scheme_b: vec![ReeferDim::Cold, ReeferDim::Volume, ReeferDim::Weight],
            dry_scheme_b: vec![DryDim::Volume, DryDim::Weight],
            dry_scheme_c: vec![DryDim::Volume, DryDim::Weight],
            order_scheme: vec![
                OrderDim::Vip,
                OrderDim::Due,
                OrderDim::Alpha,
                OrderDim::VEff,
                OrderDim::Weight,
                OrderDim::OrderId,
            ],
            item_scheme: vec![
                ItemDim::Cold,
                ItemDim::Weight,
                ItemDim::VEff,
                ItemDim::Liquid,
                ItemDim::StackLimit,
                ItemDim::Fragile,
                ItemDim::Upright,
                ItemDim::ItemId,
            ],
            departure_strategy: DepartureStrategy::None,
            min_util_slack: 0.0,
            depart_time: None,
        }
    }
}

/// Parse a `HH:MM` string, returning a `(hour, minute)` pair.
pub fn parse_hhmm(field: &str, value: &str) -> Result<(u32, u32)> {
    let (h, m) = value
        .split_once(':')
        .ok_or_else(|| Error::malformed_time(field, value))?;
    let h: u32 = h.parse().map_err(|_| Error::malformed_time(field, value))?;
    let m: u32 = m.parse().map_err(|_| Error::malformed_time(field, value))?;
    if h > 23 || m > 59 {
        return Err(Error::malformed_time(field, value));
    }
    Ok((h, m))
}

fn no_dup_dims<T: PartialEq>(field: &str, dims: &[T]) -> Result<()> {
    for (i, a) in dims.iter().enumerate() {
        for b in &dims[i + 1..] {
            if a == b {
                return Err(Error::invalid_input(field, "scheme has a duplicate dimension"));
            }
        }
    }
    Ok(())
}

impl PlanningConfig {
    /// Validate every knob, field-path-style, mirroring the source generator's config
    /// validation. Fails on the first violation found.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.alpha_threshold) {
            return Err(Error::invalid_input(
                "config.alpha_threshold",
                "must be in [0,1]",
            ));
        }
        if self.per_truck_cooler_m3 < 0.0 {
            return Err(Error::invalid_input(
                "config.per_truck_cooler_m3",
                "must be >= 0",
            ));
        }
        if self.min_util_slack < 0.0 {
            return Err(Error::invalid_input(
                "config.min_util_slack",
                "must be >= 0",
            ));
        }
        if self.reefer_scheme_a.is_empty() {
            return Err(Error::invalid_input("config.reefer_scheme_a", "scheme must be non-empty"));
        }
        if self.reefer_scheme_b.is_empty() {
            return Err(Error::invalid_input("config.reefer_scheme_b", "scheme must be non-empty"));
        }
        if self.dry_scheme_b.is_empty() {
            return Err(Error::invalid_input("config.dry_scheme_b", "scheme must be non-empty"));
        }
        if self.dry_scheme_c.is_empty() {
            return Err(Error::invalid_input("config.dry_scheme_c", "scheme must be non-empty"));
        }
        if self.order_scheme.is_empty() {
            return Err(Error::invalid_input("config.order_scheme", "scheme must be non-empty"));
        }
        if self.item_scheme.is_empty() {
            return Err(Error::invalid_input("config.item_scheme", "scheme must be non-empty"));
        }
        no_dup_dims("config.reefer_scheme_a", &self.reefer_scheme_a)?;
        no_dup_dims("config.reefer_scheme_b", &self.reefer_scheme_b)?;
        no_dup_dims("config.dry_scheme_b", &self.dry_scheme_b)?;
        no_dup_dims("config.dry_scheme_c", &self.dry_scheme_c)?;
        no_dup_dims("config.order_scheme", &self.order_scheme)?;
        no_dup_dims("config.item_scheme", &self.item_scheme)?;

        if self.departure_strategy == DepartureStrategy::Time {
            match &self.depart_time {
                Some(t) => {
                    parse_hhmm("config.depart_time", t)?;
                }
                None => {
                    return Err(Error::invalid_input(
                        "config.depart_time",
                        "required when departure_strategy = time",
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Truck type: refrigerated or ambient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum TruckType {
    /// Refrigerated truck.
    Reefer,
    /// Ambient (non-refrigerated) truck.
    Dry,
}

/// A single truck's static specification, as it arrives from the instance (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TruckSpec {
    /// Truck identifier.
    pub id: String,
    /// Truck type.
    pub truck_type: TruckType,
    /// Total volume capacity (m3).
    pub total_capacity_m3: f64,
    /// Cold capacity (m3); must be 0 for DRY trucks.
    pub cold_capacity_m3: f64,
    /// Weight limit (kg).
    pub weight_limit_kg: f64,
    /// Fixed per-day deployment cost.
    pub fixed_cost: f64,
    /// Minimum volume utilisation threshold.
    pub min_utilization: f64,
    /// Fraction of volume held in reserve, never consumed.
    pub reserve_fraction: f64,
    /// Portable cooler capacity (m3) for a DRY truck; `None` uses the config default.
    pub cooler_capacity_m3: Option<f64>,
}

impl TruckSpec {
    /// Validate field ranges, mirroring the source `TruckSpec.validate()`.
    pub fn validate(&self) -> Result<()> {
        if self.truck_type == TruckType::Dry && self.cold_capacity_m3 != 0.0 {
            return Err(Error::invalid_input(
                format!("trucks.{}.cold_capacity_m3", self.id),
                "DRY trucks must have cold_capacity_m3 = 0",
            ));
        }
        if !(0.0..1.0).contains(&self.reserve_fraction) {
            return Err(Error::invalid_input(
                format!("trucks.{}.reserve_fraction", self.id),
                "must be in [0,1)",
            ));
        }
        if !(0.0..=1.0).contains(&self.min_utilization) {
            return Err(Error::invalid_input(
                format!("trucks.{}.min_utilization", self.id),
                "must be in [0,1]",
            ));
        }
        if self.total_capacity_m3 <= 0.0 || self.weight_limit_kg <= 0.0 {
            return Err(Error::invalid_input(
                format!("trucks.{}", self.id),
                "capacities and weight must be > 0",
            ));
        }
        if let Some(c) = self.cooler_capacity_m3 {
            if c < 0.0 {
                return Err(Error::invalid_input(
                    format!("trucks.{}.cooler_capacity_m3", self.id),
                    "must be >= 0",
                ));
            }
        }
        Ok(())
    }
}
