//! Pure KPI formulas over per-truck loads and day totals.
//!
//! Every function here is a stateless arithmetic transform; [`crate::tracker`] is the
//! only caller responsible for feeding it live ledger state.

/// Denominator/ratio guard tolerance shared by every ratio-style KPI below.
pub const EPS: f64 = 1e-12;

/// Truck volume utilization `U_k^vol = used_v_eff / Q_k`, clamped to `[0, 1]`.
pub fn u_vol_k(used_v_eff: f64, q_k: f64) -> f64 {
    if q_k <= EPS {
        0.0
    } else {
        (used_v_eff / q_k).clamp(0.0, 1.0)
    }
}

/// Truck weight utilization `U_k^w = used_w / W_k`.
pub fn u_w_k(used_w: f64, w_k: f64) -> f64 {
    if w_k <= EPS {
        0.0
    } else {
        (used_w / w_k).max(0.0)
    }
}

/// Reefer cold-compartment utilization `U_k^cold = used_q_cold / Q_k_cold`, clamped to `[0, 1]`.
pub fn u_cold_k(used_q_cold: f64, q_k_cold: f64) -> f64 {
    if q_k_cold <= EPS {
        0.0
    } else {
        (used_q_cold / q_k_cold).clamp(0.0, 1.0)
    }
}

/// Bottleneck efficiency `U_k^bn = min(U_k^vol, U_k^w)`.
pub fn u_bn_k(u_vol: f64, u_w: f64) -> f64 {
    u_vol.min(u_w)
}

/// `1` iff a deployed truck's volume utilization falls below its own `tau_min`.
pub fn under_min_flag(u_vol: f64, tau_min: f64) -> bool {
    u_vol + EPS < tau_min
}

/// `1` iff any of a truck's three capacities is exceeded, within [`EPS`] slack.
pub fn cap_violation_flag(
    used_v_eff: f64,
    q_k: f64,
    used_w: f64,
    w_k: f64,
    used_q_cold: f64,
    q_k_cold: f64,
) -> bool {
    let v_bad = q_k > EPS && used_v_eff - q_k > EPS;
    let w_bad = w_k > EPS && used_w - w_k > EPS;
    let c_bad = q_k_cold > EPS && used_q_cold - q_k_cold > EPS;
    v_bad || w_bad || c_bad
}

/// Fleet packing efficiency `E_pack = sum(q_i) / sum(v_i_eff)`.
pub fn e_pack(total_q_geom: f64, total_v_eff: f64) -> f64 {
    if total_v_eff <= EPS {
        0.0
    } else {
        (total_q_geom / total_v_eff).max(0.0)
    }
}

/// Number of trucks opened today.
pub fn n_trucks_opened(opened: &[bool]) -> usize {
    opened.iter().filter(|&&b| b).count()
}

/// Total fixed deployment cost across every opened truck.
pub fn c_total(fixed_costs: &[f64]) -> f64 {
    fixed_costs.iter().sum()
}

/// Fixed cost per unit of loaded geometric volume.
pub fn c_per_vol(c_total_value: f64, sum_q: f64) -> f64 {
    if sum_q <= EPS {
        0.0
    } else {
        c_total_value / sum_q
    }
}

/// Fixed cost per unit of loaded weight.
pub fn c_per_w(c_total_value: f64, sum_w: f64) -> f64 {
    if sum_w <= EPS {
        0.0
    } else {
        c_total_value / sum_w
    }
}

/// Population coefficient of variation `sigma(x) / mu(x)`; `0` if empty or `mu <= EPS`.
pub fn cv(values: &[f64]) -> f64 {
    let n = values.len();
    if n == 0 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    if mean <= EPS {
        return 0.0;
    }
    let var = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
    var.sqrt() / mean
}

/// `CV(U_vol)` across opened trucks.
pub fn cv_uvol(uvol_list: &[f64]) -> f64 {
    cv(uvol_list)
}

/// `CV(U_w)` across opened trucks.
pub fn cv_u_w(uw_list: &[f64]) -> f64 {
    cv(uw_list)
}

/// `CV(U_bn)` across opened trucks.
pub fn cv_u_bn(ubn_list: &[f64]) -> f64 {
    cv(ubn_list)
}

/// Count of VIP orders that missed their due time.
pub fn miss_vip(n_missed_vip: usize) -> usize {
    n_missed_vip
}

/// Count of any order that missed its due time.
pub fn miss_due(n_missed_due: usize) -> usize {
    n_missed_due
}

/// Mean lateness in minutes among orders that missed due, `0` if none did.
pub fn avg_delay(delays_minutes: &[f64]) -> f64 {
    if delays_minutes.is_empty() {
        0.0
    } else {
        delays_minutes.iter().sum::<f64>() / delays_minutes.len() as f64
    }
}

/// Share of VIP orders delivered on time; `1.0` by convention if there were no VIP orders.
pub fn vip_ontime(n_vip_total: usize, n_vip_missed: usize) -> f64 {
    if n_vip_total == 0 {
        1.0
    } else {
        let ontime = n_vip_total.saturating_sub(n_vip_missed);
        ontime as f64 / n_vip_total as f64
    }
}

/// Count of `(order, truck)` pairs where a cold order landed on a dry truck.
pub fn cold_on_dry(pairs: usize) -> usize {
    pairs
}

/// Count of deployed trucks whose volume utilization fell below their own `tau_min`.
pub fn under_min_count(uvol_list: &[f64], tau_min_list: &[f64]) -> usize {
    uvol_list
        .iter()
        .zip(tau_min_list)
        .filter(|(&u, &t)| u + EPS < t)
        .count()
}

/// Count of deployed trucks with at least one capacity exceeded.
pub fn cap_violations_count(measures: &[(f64, f64, f64, f64, f64, f64)]) -> usize {
    measures
        .iter()
        .filter(|&&(v, q, w, wk, qc, qck)| cap_violation_flag(v, q, w, wk, qc, qck))
        .count()
}

/// Count of orders whose total truck-assignment count is not exactly one (unassigned
/// or, were splitting ever allowed, split across more than one truck).
pub fn splits_count(assignments_per_order: &[usize]) -> usize {
    assignments_per_order.iter().filter(|&&cnt| cnt != 1).count()
}

/// Mean volume utilization across all opened trucks.
pub fn avg_u_vol(uvol_list: &[f64]) -> f64 {
    mean(uvol_list)
}

/// Mean weight utilization across all opened trucks.
pub fn avg_u_w(uw_list: &[f64]) -> f64 {
    mean(uw_list)
}

/// Mean cold utilization across reefer trucks only.
pub fn avg_u_cold(ucold_list: &[f64]) -> f64 {
    mean(ucold_list)
}

/// Mean bottleneck efficiency across all opened trucks.
pub fn avg_u_bn(ubn_list: &[f64]) -> f64 {
    mean(ubn_list)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
