//! Electricity cost model.
//!
//! Holds the mutable price-per-kWh and derives energy and running cost
//! from the meter's cumulative energy counter.  Derived values are never
//! cached: every query recomputes from the latest sample so they always
//! reflect current state.

use crate::config::WS_PER_KWH;

/// Price holder plus derived-cost queries.
#[derive(Debug, Clone, Copy)]
pub struct CostModel {
    price_per_kwh: f32,
}

impl CostModel {
    pub fn new(price_per_kwh: f32) -> Self {
        Self { price_per_kwh }
    }

    /// Overwrite the price unconditionally.  Zero and negative values are
    /// accepted; callers are expected to have rejected non-finite input at
    /// the parse boundary.
    pub fn set_price(&mut self, price_per_kwh: f32) {
        self.price_per_kwh = price_per_kwh;
    }

    pub fn price_per_kwh(&self) -> f32 {
        self.price_per_kwh
    }

    /// Cumulative energy in kWh, derived from the meter's watt-second
    /// accumulator.
    pub fn energy_kwh(&self, energy_ws: f64) -> f64 {
        energy_ws / WS_PER_KWH
    }

    /// Running cost since boot of the meter counter.
    pub fn cost_to_date(&self, energy_ws: f64) -> f64 {
        self.energy_kwh(energy_ws) * f64::from(self.price_per_kwh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_conversion() {
        let cost = CostModel::new(0.25);
        // One kWh in watt-seconds.
        assert!((cost.energy_kwh(3_600_000.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cost_tracks_price() {
        let mut cost = CostModel::new(0.25);
        let two_kwh_ws = 7_200_000.0;
        assert!((cost.cost_to_date(two_kwh_ws) - 0.50).abs() < 1e-6);

        cost.set_price(0.20);
        assert!((cost.cost_to_date(two_kwh_ws) - 0.40).abs() < 1e-6);
    }

    #[test]
    fn zero_and_negative_prices_accepted() {
        let mut cost = CostModel::new(0.25);
        cost.set_price(0.0);
        assert_eq!(cost.price_per_kwh(), 0.0);
        assert_eq!(cost.cost_to_date(3_600_000.0), 0.0);

        cost.set_price(-0.10);
        assert!(cost.cost_to_date(3_600_000.0) < 0.0);
    }
}
