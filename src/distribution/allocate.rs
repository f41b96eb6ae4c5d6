//! Exact proportional allocation (largest remainder)

use rust_decimal::prelude::*;

/// Largest supported number of decimal places
pub const MAX_DECIMALS: u32 = 10;

/// Split `total` across `weights` so the parts sum to `total` exactly.
///
/// `total` is first rounded to `decimals` places; it is then divided into whole
/// units of 10^-decimals, each slot takes the floor of its proportional share and
/// the leftover units go to the slots with the largest fractional remainders
/// (earlier slots win ties). Negative or non-finite weights count as zero; if no
/// weight is positive the split is uniform. A total too large to carry
/// `decimals` places is split at the finest scale it can hold.
pub fn allocate_exact(total: Decimal, weights: &[f64], decimals: u32) -> Vec<Decimal> {
    if weights.is_empty() {
        return Vec::new();
    }

    let mut rounded = round_total(total, decimals);
    rounded.rescale(decimals.min(MAX_DECIMALS));
    // rescale stops early when the mantissa would overflow
    let scale = rounded.scale();
    let negative = rounded.is_sign_negative();
    let units = rounded.mantissa().abs();

    let shares = normalized_shares(weights);
    let exact: Vec<f64> = shares.iter().map(|share| units as f64 * share).collect();
    let mut parts: Vec<i128> = exact.iter().map(|e| e.floor() as i128).collect();
    let leftover = units - parts.iter().sum::<i128>();

    let mut order: Vec<usize> = (0..parts.len()).collect();
    let remainder = |i: usize| exact[i] - exact[i].floor();
    if leftover >= 0 {
        order.sort_by(|a, b| remainder(*b).total_cmp(&remainder(*a)).then(a.cmp(b)));
        // Only eligible slots take units so zero-weight slots stay zero
        let mut eligible: Vec<usize> = order.iter().copied().filter(|i| shares[*i] > 0.0).collect();
        if eligible.is_empty() {
            eligible = order;
        }
        let count = eligible.len() as i128;
        let (each, extra) = (leftover / count, leftover % count);
        for (rank, i) in eligible.into_iter().enumerate() {
            parts[i] += each + i128::from((rank as i128) < extra);
        }
    } else {
        // Float floors overshot the total: take back from the smallest remainders
        order.sort_by(|a, b| remainder(*a).total_cmp(&remainder(*b)).then(a.cmp(b)));
        take_back(&mut parts, &order, -leftover);
    }

    parts
        .into_iter()
        .map(|part| Decimal::from_i128_with_scale(if negative { -part } else { part }, scale))
        .collect()
}

/// Weights as fractions of their sum. Scaled by the largest weight first so the
/// sum stays finite.
fn normalized_shares(weights: &[f64]) -> Vec<f64> {
    let cleaned: Vec<f64> = weights
        .iter()
        .map(|w| if w.is_finite() && *w > 0.0 { *w } else { 0.0 })
        .collect();
    let largest = cleaned.iter().copied().fold(0.0, f64::max);
    if largest <= 0.0 {
        return vec![1.0 / cleaned.len() as f64; cleaned.len()];
    }

    let scaled: Vec<f64> = cleaned.iter().map(|w| w / largest).collect();
    let sum: f64 = scaled.iter().sum();
    scaled.iter().map(|w| w / sum).collect()
}

/// Remove `owed` units, spread over the slots in `order` that still hold any
fn take_back(parts: &mut [i128], order: &[usize], mut owed: i128) {
    while owed > 0 {
        let holders: Vec<usize> = order.iter().copied().filter(|i| parts[*i] > 0).collect();
        if holders.is_empty() {
            break;
        }
        let each = owed / holders.len() as i128;
        if each == 0 {
            for i in holders.into_iter().take(owed as usize) {
                parts[i] -= 1;
                owed -= 1;
            }
        } else {
            for i in holders {
                let taken = each.min(parts[i]);
                parts[i] -= taken;
                owed -= taken;
            }
        }
    }
}

/// Rounded `total` as [`allocate_exact`] distributes it
pub fn round_total(total: Decimal, decimals: u32) -> Decimal {
    total.round_dp_with_strategy(decimals.min(MAX_DECIMALS), RoundingStrategy::MidpointAwayFromZero)
}
