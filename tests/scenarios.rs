//! End-to-end bucket-routing and KPI scenarios, exercised against the public API.

use std::collections::HashMap;

use indexmap::IndexMap;

use fleet_loadplan::config::{DryDim, PlanningConfig, ReeferDim, TruckSpec, TruckType};
use fleet_loadplan::domain::{Customer, CustomerOrder, Depot, Fragility, Item, SeparationTag, Truck};
use fleet_loadplan::orchestrator::PlacerOrchestrator;
use fleet_loadplan::placers::dry::{choose_dry, place_bucket_b};
use fleet_loadplan::placers::packing::ReferencePackingPolicy;
use fleet_loadplan::placers::reefer::choose_reefer;
use fleet_loadplan::ranking::rank_items;
use fleet_loadplan::state::SimpleStateView;
use fleet_loadplan::tracker::DayTracker;

fn milk() -> Item {
    Item {
        item_id: "MILK".into(),
        name: "Milk".into(),
        w_unit: 1.05,
        v_unit: 0.0021,
        padding_factor: 0.05,
        category_cold: true,
        is_liquid: true,
        upright_only: false,
        max_stack_load_kg: 5.0,
        fragility: Fragility::Regular,
        separation_tag: SeparationTag::Food,
    }
}

fn water() -> Item {
    Item {
        item_id: "WATER".into(),
        name: "Water".into(),
        w_unit: 1.0,
        v_unit: 0.002,
        padding_factor: 0.0,
        category_cold: false,
        is_liquid: true,
        upright_only: false,
        max_stack_load_kg: 8.0,
        fragility: Fragility::Regular,
        separation_tag: SeparationTag::Food,
    }
}

fn catalogue(items: Vec<Item>) -> HashMap<String, Item> {
    items.into_iter().map(|i| (i.item_id.clone(), i)).collect()
}

fn reefer_spec(id: &str, total: f64, cold: f64, weight: f64, reserve: f64) -> TruckSpec {
    TruckSpec {
        id: id.to_string(),
        truck_type: TruckType::Reefer,
        total_capacity_m3: total,
        cold_capacity_m3: cold,
        weight_limit_kg: weight,
        fixed_cost: 500.0,
        min_utilization: 0.6,
        reserve_fraction: reserve,
        cooler_capacity_m3: None,
    }
}

fn dry_spec(id: &str, total: f64, weight: f64, cooler: f64) -> TruckSpec {
    TruckSpec {
        id: id.to_string(),
        truck_type: TruckType::Dry,
        total_capacity_m3: total,
        cold_capacity_m3: 0.0,
        weight_limit_kg: weight,
        fixed_cost: 400.0,
        min_utilization: 0.6,
        reserve_fraction: 0.0,
        cooler_capacity_m3: Some(cooler),
    }
}

fn order_of(cat: &HashMap<String, Item>, lines: &[(&str, i64)], due: &str) -> CustomerOrder {
    let mut item_list = IndexMap::new();
    for (id, qty) in lines {
        item_list.insert((*id).to_string(), *qty);
    }
    CustomerOrder::new("O_TEST", "C1", item_list, due, cat, None).unwrap()
}

/// S1: best-fit among open reefers (default scheme): R1 wins on the tightest cold
/// leftover even though R2 has more absolute cold headroom.
#[test]
fn s1_best_fit_among_open_reefers_default_scheme() {
    let cat = catalogue(vec![milk()]);
    let order = order_of(&cat, &[("MILK", 100)], "10:00");

    let mut depot = Depot::new(
        "D",
        vec![
            Truck::new(reefer_spec("R1", 24.0, 12.0, 9500.0, 0.06), 0.0),
            Truck::new(reefer_spec("R2", 28.0, 14.0, 10500.0, 0.06), 0.0),
        ],
    );
    depot.truck_mut("R1").unwrap().apply_assignment("seed", 0.0, 2.0, 1000.0, 11.7, 0.0);
    depot.truck_mut("R2").unwrap().apply_assignment("seed", 0.0, 23.9, 1000.0, 11.5, 0.0);

    let orders = HashMap::from([(order.order_id.clone(), order.clone())]);
    let ranked = HashMap::new();
    let view = SimpleStateView::new(&depot, &cat, &orders, &ranked);

    let scheme = [ReeferDim::Cold, ReeferDim::Volume, ReeferDim::Weight];
    let (truck_id, opened_new) = choose_reefer(&view, &order, &scheme, false).expect("fits somewhere");
    assert_eq!(truck_id, "R1");
    assert!(!opened_new);
}

/// S2: scheme override: recompute both leftover-key tuples explicitly and check the
/// placer picks whichever is lexicographically smallest, rather than assuming a fixed
/// winner.
#[test]
fn s2_scheme_override_follows_recomputed_leftover_key() {
    let cat = catalogue(vec![milk()]);
    let order = order_of(&cat, &[("MILK", 100)], "10:00");

    let mut depot = Depot::new(
        "D",
        vec![
            Truck::new(reefer_spec("R1", 24.0, 12.0, 9500.0, 0.06), 0.0),
            Truck::new(reefer_spec("R2", 28.0, 14.0, 10500.0, 0.06), 0.0),
        ],
    );
    depot.truck_mut("R1").unwrap().apply_assignment("seed", 0.0, 2.0, 1000.0, 11.7, 0.0);
    depot.truck_mut("R2").unwrap().apply_assignment("seed", 0.0, 23.9, 1000.0, 11.5, 0.0);

    let orders = HashMap::from([(order.order_id.clone(), order.clone())]);
    let ranked = HashMap::new();
    let view = SimpleStateView::new(&depot, &cat, &orders, &ranked);

    let r1 = depot.truck("R1").unwrap();
    let r2 = depot.truck("R2").unwrap();
    let key = |t: &Truck| (t.r_vol() - order.v_i_eff, t.r_cold() - order.q_i_cold, t.r_w() - order.w_i);
    let (k1, k2) = (key(r1), key(r2));
    let expected_winner = if k1 <= k2 { "R1" } else { "R2" };

    let scheme = [ReeferDim::Volume, ReeferDim::Cold, ReeferDim::Weight];
    let (truck_id, _) = choose_reefer(&view, &order, &scheme, false).expect("fits somewhere");
    assert_eq!(truck_id, expected_winner);
}

/// S3: open a new reefer when none open fits; refuses to open one when the policy
/// flag disallows it, leaving the order infeasible.
#[test]
fn s3_opens_new_reefer_only_when_allowed() {
    let cat = catalogue(vec![milk(), water()]);
    let order = order_of(&cat, &[("MILK", 50), ("WATER", 5)], "10:00");

    let mut depot = Depot::new(
        "D",
        vec![
            Truck::new(reefer_spec("R1", 24.0, 12.0, 9500.0, 0.0), 0.0),
            Truck::new(reefer_spec("R2", 24.0, 12.0, 9500.0, 0.0), 0.0),
        ],
    );
    // R1 open with no cold residual left.
    depot.truck_mut("R1").unwrap().apply_assignment("seed", 0.0, 0.0, 0.0, 12.0, 0.0);

    let orders = HashMap::from([(order.order_id.clone(), order.clone())]);
    let ranked = HashMap::new();
    let view = SimpleStateView::new(&depot, &cat, &orders, &ranked);
    let scheme = [ReeferDim::Cold, ReeferDim::Volume, ReeferDim::Weight];

    let allowed = choose_reefer(&view, &order, &scheme, true);
    assert_eq!(allowed, Some(("R2".to_string(), true)));

    let disallowed = choose_reefer(&view, &order, &scheme, false);
    assert_eq!(disallowed, None);
}

/// S4: bucket B routes a small cold fraction into a dry truck's portable cooler.
#[test]
fn s4_bucket_b_cold_in_dry() {
    let mut milk_small = milk();
    milk_small.v_unit = 0.0005;
    milk_small.padding_factor = 0.0;
    let mut water_big = water();
    water_big.v_unit = 0.1;
    let cat = catalogue(vec![milk_small, water_big]);
    let order = order_of(&cat, &[("MILK", 40), ("WATER", 3)], "10:00");
    assert!(order.alpha_i < 0.1, "fixture must land in bucket B: alpha={}", order.alpha_i);

    let mut depot = Depot::new(
        "D",
        vec![
            Truck::new(reefer_spec("R1", 24.0, 12.0, 9500.0, 0.0), 0.0),
            Truck::new(dry_spec("D1", 20.0, 9000.0, 0.40), 0.0),
        ],
    );
    // R1 fully saturated on cold.
    depot.truck_mut("R1").unwrap().apply_assignment("seed", 0.0, 0.0, 0.0, 12.0, 0.0);
    depot.truck_mut("D1").unwrap().apply_assignment("seed", 0.0, 0.0, 0.0, 0.0, 0.0);

    let orders = HashMap::from([(order.order_id.clone(), order.clone())]);
    let ranked_rows = rank_items(&order, &cat, &PlanningConfig::default().item_scheme).unwrap();
    let ranked = HashMap::from([("O_TEST".to_string(), ranked_rows)]);
    let view = SimpleStateView::new(&depot, &cat, &orders, &ranked);

    let outcome = place_bucket_b(
        &view,
        &order,
        &[ReeferDim::Cold, ReeferDim::Volume, ReeferDim::Weight],
        &[DryDim::Volume, DryDim::Weight],
        true,
        false,
        &ReferencePackingPolicy,
    );
    match outcome {
        fleet_loadplan::placers::types::AssignOutcome::Assigned(a) => {
            assert_eq!(a.truck_id, "D1");
            assert!(a.cold_on_dry);
        }
        fleet_loadplan::placers::types::AssignOutcome::Failed(r) => panic!("expected assignment, got {r:?}"),
    }

    // Commit through the full orchestrator path and check the ledger increments
    // `used_cooler_m3` by exactly the order's cold volume.
    let config = PlanningConfig::default();
    let packing = ReferencePackingPolicy;
    let orchestrator = PlacerOrchestrator::new(&config, &packing);
    let mut depot2 = Depot::new(
        "D",
        vec![
            Truck::new(reefer_spec("R1", 24.0, 12.0, 9500.0, 0.0), 0.0),
            Truck::new(dry_spec("D1", 20.0, 9000.0, 0.40), 0.0),
        ],
    );
    depot2.truck_mut("R1").unwrap().apply_assignment("seed", 0.0, 0.0, 0.0, 12.0, 0.0);
    depot2.truck_mut("D1").unwrap().apply_assignment("seed", 0.0, 0.0, 0.0, 0.0, 0.0);
    let customers = HashMap::from([(
        "C1".to_string(),
        Customer {
            customer_id: "C1".into(),
            name: "A".into(),
            email: "a@x.com".into(),
            vip: false,
            address: "addr".into(),
        },
    )]);
    let mut tracker = DayTracker::new();
    orchestrator
        .run_one(&mut depot2, &cat, &orders, &ranked, &customers, "O_TEST", &mut tracker, "10:00")
        .unwrap();

    let d1 = depot2.truck("D1").unwrap();
    assert!((d1.used_cooler_m3 - order.q_i_cold).abs() < 1e-9);
}

/// S5: bucket B opens a new dry truck when allowed, and fails outright when the policy disallows it.
#[test]
fn s5_bucket_b_opens_new_dry_when_allowed() {
    let mut milk_small = milk();
    milk_small.v_unit = 0.0005;
    milk_small.padding_factor = 0.0;
    let mut water_big = water();
    water_big.v_unit = 0.1;
    let cat = catalogue(vec![milk_small, water_big]);
    let order = order_of(&cat, &[("MILK", 40), ("WATER", 3)], "10:00");

    let mut depot = Depot::new(
        "D",
        vec![
            Truck::new(reefer_spec("R1", 24.0, 12.0, 9500.0, 0.0), 0.0),
            Truck::new(dry_spec("D1", 20.0, 9000.0, 0.40), 0.0),
            Truck::new(dry_spec("D2", 20.0, 9000.0, 0.40), 0.0),
        ],
    );
    depot.truck_mut("R1").unwrap().apply_assignment("seed", 0.0, 0.0, 0.0, 12.0, 0.0);
    // D1 full on volume.
    depot.truck_mut("D1").unwrap().apply_assignment("seed", 0.0, 20.0, 0.0, 0.0, 0.0);

    let orders = HashMap::from([(order.order_id.clone(), order.clone())]);
    let ranked_rows = rank_items(&order, &cat, &PlanningConfig::default().item_scheme).unwrap();
    let ranked = HashMap::from([("O_TEST".to_string(), ranked_rows)]);
    let view = SimpleStateView::new(&depot, &cat, &orders, &ranked);

    let allowed = place_bucket_b(
        &view,
        &order,
        &[ReeferDim::Cold, ReeferDim::Volume, ReeferDim::Weight],
        &[DryDim::Volume, DryDim::Weight],
        true,
        true,
        &ReferencePackingPolicy,
    );
    match allowed {
        fleet_loadplan::placers::types::AssignOutcome::Assigned(a) => {
            assert_eq!(a.truck_id, "D2");
            assert!(a.opened_new_truck);
        }
        fleet_loadplan::placers::types::AssignOutcome::Failed(r) => panic!("expected assignment, got {r:?}"),
    }

    let disallowed = place_bucket_b(
        &view,
        &order,
        &[ReeferDim::Cold, ReeferDim::Volume, ReeferDim::Weight],
        &[DryDim::Volume, DryDim::Weight],
        true,
        false,
        &ReferencePackingPolicy,
    );
    assert!(matches!(
        disallowed,
        fleet_loadplan::placers::types::AssignOutcome::Failed(
            fleet_loadplan::placers::types::FailureReason::InfeasibleInBucket(fleet_loadplan::placers::types::Bucket::B)
        )
    ));
}

/// Bucket C counterpart of S5: dry-only orders also gate new-truck opening on
/// `allow_open_new_dry_c`.
#[test]
fn bucket_c_open_new_dry_uses_same_flag_as_bucket_b() {
    let mut water_big = water();
    water_big.v_unit = 0.5;
    let cat = catalogue(vec![water_big]);
    let order = order_of(&cat, &[("WATER", 4)], "10:00");
    assert!((order.alpha_i).abs() < 1e-12);

    let depot = Depot::new("D", vec![Truck::new(dry_spec("D1", 20.0, 9000.0, 0.0), 0.0)]);
    let orders = HashMap::from([(order.order_id.clone(), order.clone())]);
    let ranked = HashMap::new();
    let view = SimpleStateView::new(&depot, &cat, &orders, &ranked);

    let allowed = choose_dry(&view, &order, &[DryDim::Volume], true, false);
    assert_eq!(allowed, Some(("D1".to_string(), true)));
    let disallowed = choose_dry(&view, &order, &[DryDim::Volume], false, false);
    assert_eq!(disallowed, None);
}

/// S6: KPI roundtrip on a single reefer and a single order.
#[test]
fn s6_kpi_roundtrip() {
    let mut tracker = DayTracker::new();
    tracker.open_truck("R1", true, 10.0, 5.0, 1000.0, 500.0, 0.6).unwrap();
    tracker
        .on_assign("O1", "R1", 5.5, 3.0, 400.0, 6.0, false, None, None, false)
        .unwrap();

    let snap = tracker.summarize_day();
    let row = &snap.per_truck[0];
    assert!((row.u_vol - 0.6).abs() < 1e-9);
    assert!((row.u_w - 0.4).abs() < 1e-9);
    assert!((row.u_cold - 0.6).abs() < 1e-9);
    assert!((row.u_bn - 0.4).abs() < 1e-9);
    assert!(!row.under_min);
    assert!(!row.cap_violation);

    assert!((snap.fleet.e_pack - (5.5 / 6.0)).abs() < 1e-9);
    assert!((snap.fleet.c_total - 500.0).abs() < 1e-9);
    assert!((snap.fleet.c_per_vol - (500.0 / 5.5)).abs() < 1e-9);
    assert_eq!(snap.fleet.n_trucks, 1);
    assert_eq!(snap.fleet.splits, 0);
}
