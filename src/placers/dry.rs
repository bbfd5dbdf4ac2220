//! Best-fit dry placer, buckets B and C.

use ordered_float::OrderedFloat;

use crate::config::DryDim;
use crate::domain::{CustomerOrder, Truck};
use crate::feasibility::fits;
use crate::placers::packing::PackingPolicy;
use crate::placers::reefer::choose_reefer;
use crate::placers::types::{AssignOutcome, AssignedOrder, Bucket, FailureReason};
use crate::state::StateView;

fn leftover_key(scheme: &[DryDim], truck: &Truck, order: &CustomerOrder) -> Vec<OrderedFloat<f64>> {
    scheme
        .iter()
        .map(|&dim| {
            OrderedFloat(match dim {
                DryDim::Volume => truck.r_vol() - order.v_i_eff,
                DryDim::Weight => truck.r_w() - order.w_i,
            })
        })
        .collect()
}

/// Pick the best-fitting open dry truck for `order`, or open a new one if `allow_open_new`
/// permits and no open dry truck fits.
///
/// Returns `(truck_id, opened_new_truck)`, or `None` if no dry truck, open or new, fits.
pub fn choose_dry(
    state: &dyn StateView,
    order: &CustomerOrder,
    scheme: &[DryDim],
    allow_open_new: bool,
    allow_cold_in_dry: bool,
) -> Option<(String, bool)> {
    let mut candidates: Vec<&Truck> = state
        .open_dry_trucks()
        .into_iter()
        .filter(|t| fits(order, t, allow_cold_in_dry))
        .collect();
    candidates.sort_by(|a, b| {
        leftover_key(scheme, a, order)
            .cmp(&leftover_key(scheme, b, order))
            .then_with(|| a.spec.id.cmp(&b.spec.id))
    });

    if let Some(best) = candidates.first() {
        return Some((best.spec.id.clone(), false));
    }

    if allow_open_new {
        for truck in state.unopened_dry_trucks() {
            if fits(order, truck, allow_cold_in_dry) {
                return Some((truck.spec.id.clone(), true));
            }
        }
    }
    None
}

fn build_outcome(
    state: &dyn StateView,
    order: &CustomerOrder,
    truck_id: String,
    opened_new_truck: bool,
    scheme_used: &str,
    packing: &dyn PackingPolicy,
) -> AssignOutcome {
    let truck = state.truck(&truck_id).expect("just selected a known truck");
    let cold_on_dry = order.q_i_cold > 0.0;
    let residuals_before = if cold_on_dry {
        (truck.r_vol(), truck.r_w(), truck.r_cooler())
    } else {
        (truck.r_vol(), truck.r_w(), 0.0)
    };

    let Some(ranked) = state.ranked_items(&order.order_id) else {
        return AssignOutcome::Failed(FailureReason::PackingRefused);
    };
    let catalogue = crate::placers::catalogue_from_ranked(state, ranked);
    let Some(plan) = packing.pack(&truck_id, ranked, &catalogue) else {
        return AssignOutcome::Failed(FailureReason::PackingRefused);
    };

    AssignOutcome::Assigned(Box::new(AssignedOrder {
        order_id: order.order_id.clone(),
        truck_id,
        opened_new_truck,
        scheme_used: scheme_used.to_string(),
        demand: (order.v_i_eff, order.w_i, order.q_i_cold),
        residuals_before,
        cold_on_dry,
        plan,
    }))
}

/// Place `order` in bucket B: an existing reefer first, then open dry, then a newly
/// opened dry truck if `allow_open_new_dry_c` permits.
///
/// Step order: (1) existing reefer, never opening a new one; (2) open dry, cooler-gated
/// by `allow_cold_in_dry_b` when the order carries cold volume; (3) a newly opened dry
/// truck, gated by the same `allow_open_new_dry_c` flag bucket C's own step 2 uses.
/// Both buckets share one "open a new dry truck" flag.
pub fn place_bucket_b(
    state: &dyn StateView,
    order: &CustomerOrder,
    reefer_scheme: &[crate::config::ReeferDim],
    dry_scheme: &[DryDim],
    allow_cold_in_dry_b: bool,
    allow_open_new_dry_c: bool,
    packing: &dyn PackingPolicy,
) -> AssignOutcome {
    if let Some((truck_id, opened_new_truck)) = choose_reefer(state, order, reefer_scheme, false) {
        return build_outcome(state, order, truck_id, opened_new_truck, "reefer_b", packing);
    }

    if let Some((truck_id, opened_new_truck)) =
        choose_dry(state, order, dry_scheme, allow_open_new_dry_c, allow_cold_in_dry_b)
    {
        return build_outcome(state, order, truck_id, opened_new_truck, "dry_b", packing);
    }

    AssignOutcome::Failed(FailureReason::InfeasibleInBucket(Bucket::B))
}

/// Place `order` in bucket C: open dry trucks, then a newly opened dry truck if
/// `allow_open_new_dry_c` permits.
pub fn place_bucket_c(
    state: &dyn StateView,
    order: &CustomerOrder,
    dry_scheme: &[DryDim],
    allow_open_new_dry_c: bool,
    packing: &dyn PackingPolicy,
) -> AssignOutcome {
    let Some((truck_id, opened_new_truck)) =
        choose_dry(state, order, dry_scheme, allow_open_new_dry_c, false)
    else {
        return AssignOutcome::Failed(FailureReason::InfeasibleInBucket(Bucket::C));
    };

    build_outcome(state, order, truck_id, opened_new_truck, "dry_c", packing)
}
