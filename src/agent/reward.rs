//! Reward from the realized next-period price move.

/// Cubed percentage change between the current and next-period price.
/// Cubing keeps the sign of the move and amplifies large moves while
/// compressing small ones. A zero price on either side is the upstream
/// missing-data sentinel and yields no reward.
pub fn reward(price: f64, next_period_price: f64) -> f64 {
    if price == 0.0 || next_period_price == 0.0 {
        return 0.0;
    }
    let pct_change = (next_period_price - price) / price;
    pct_change.powi(3)
}
