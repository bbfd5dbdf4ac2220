//! Best-fit reefer placer, bucket A.

use ordered_float::OrderedFloat;

use crate::config::ReeferDim;
use crate::domain::{CustomerOrder, Truck};
use crate::feasibility::fits;
use crate::placers::packing::PackingPolicy;
use crate::placers::types::{AssignOutcome, AssignedOrder, Bucket, FailureReason};
use crate::state::StateView;

fn leftover_key(scheme: &[ReeferDim], truck: &Truck, order: &CustomerOrder) -> Vec<OrderedFloat<f64>> {
    scheme
        .iter()
        .map(|&dim| {
            OrderedFloat(match dim {
                ReeferDim::Cold => truck.r_cold() - order.q_i_cold,
                ReeferDim::Volume => truck.r_vol() - order.v_i_eff,
                ReeferDim::Weight => truck.r_w() - order.w_i,
            })
        })
        .collect()
}

/// Pick the best-fitting open reefer for `order`, or open a new one if `allow_open_new`
/// permits and no open reefer fits.
///
/// Returns `(truck_id, opened_new_truck)`, or `None` if no reefer, open or new, fits.
pub fn choose_reefer(
    state: &dyn StateView,
    order: &CustomerOrder,
    scheme: &[ReeferDim],
    allow_open_new: bool,
) -> Option<(String, bool)> {
    let mut candidates: Vec<&Truck> = state
        .open_reefers()
        .into_iter()
        .filter(|t| fits(order, t, false))
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
        for truck in state.unopened_reefers() {
            if fits(order, truck, false) {
                return Some((truck.spec.id.clone(), true));
            }
        }
    }
    None
}

/// Place `order` in bucket A: an existing or newly opened reefer.
pub fn place_bucket_a(
    state: &dyn StateView,
    order: &CustomerOrder,
    scheme: &[ReeferDim],
    allow_open_new: bool,
    packing: &dyn PackingPolicy,
) -> AssignOutcome {
    let Some((truck_id, opened_new_truck)) = choose_reefer(state, order, scheme, allow_open_new)
    else {
        return AssignOutcome::Failed(FailureReason::InfeasibleInBucket(Bucket::A));
    };

    let truck = state.truck(&truck_id).expect("just selected a known truck");
    let residuals_before = (truck.r_vol(), truck.r_w(), truck.r_cold());

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
        scheme_used: "reefer_a".to_string(),
        demand: (order.v_i_eff, order.w_i, order.q_i_cold),
        residuals_before,
        cold_on_dry: false,
        plan,
    }))
}
