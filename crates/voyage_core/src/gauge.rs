//! Bounded gauges. Every mutation clamps into `[0, max]`.

use crate::{Gauge, GaugeKind, ShipState};

impl Gauge {
    pub fn full(max: f64) -> Self {
        Self { current: max, max }
    }

    pub fn empty(max: f64) -> Self {
        Self { current: 0.0, max }
    }

    /// Applies `delta` and clamps. Returns the change actually applied.
    pub fn apply(&mut self, delta: f64) -> f64 {
        let before = self.current;
        self.current = (self.current + delta).clamp(0.0, self.max.max(0.0));
        self.current - before
    }

    pub fn set(&mut self, value: f64) {
        self.current = value.clamp(0.0, self.max.max(0.0));
    }

    /// `current / max`, or 0 for a zero-capacity gauge.
    pub fn fraction(&self) -> f64 {
        if self.max > 0.0 {
            self.current / self.max
        } else {
            0.0
        }
    }

    pub fn percent(&self) -> f64 {
        self.fraction() * 100.0
    }

    pub fn is_empty(&self) -> bool {
        self.current <= 0.0
    }
}

impl ShipState {
    pub fn new(constants: &crate::Constants) -> Self {
        Self {
            distance: Gauge::full(constants.journey_length),
            hull_damage: Gauge::empty(constants.hull_max),
            oxygen: Gauge::full(constants.oxygen_max),
            fuel: Gauge::full(constants.fuel_max),
            battery: Gauge::full(constants.battery_max),
            on_break: false,
            last_power_restored: constants.power_regen_base,
        }
    }

    pub fn gauge(&self, kind: GaugeKind) -> &Gauge {
        match kind {
            GaugeKind::Distance => &self.distance,
            GaugeKind::Hull => &self.hull_damage,
            GaugeKind::Oxygen => &self.oxygen,
            GaugeKind::Fuel => &self.fuel,
            GaugeKind::Battery => &self.battery,
        }
    }

    pub fn gauge_mut(&mut self, kind: GaugeKind) -> &mut Gauge {
        match kind {
            GaugeKind::Distance => &mut self.distance,
            GaugeKind::Hull => &mut self.hull_damage,
            GaugeKind::Oxygen => &mut self.oxygen,
            GaugeKind::Fuel => &mut self.fuel,
            GaugeKind::Battery => &mut self.battery,
        }
    }

    pub fn distance_traveled(&self) -> f64 {
        self.distance.max - self.distance.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_large_negative_delta_clamps_to_zero() {
        let mut fuel = Gauge {
            current: 10.0,
            max: 100.0,
        };
        let applied = fuel.apply(-500.0);
        assert!(fuel.current.abs() < 1e-9);
        assert!((applied + 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_positive_delta_clamps_to_max() {
        let mut battery = Gauge {
            current: 97.0,
            max: 100.0,
        };
        battery.apply(5.0);
        assert!((battery.current - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_set_clamps_both_ends() {
        let mut hull = Gauge::empty(100.0);
        hull.set(140.0);
        assert!((hull.current - 100.0).abs() < 1e-9);
        hull.set(-3.0);
        assert!(hull.current.abs() < 1e-9);
    }

    #[test]
    fn test_fraction_of_zero_capacity_gauge() {
        let gauge = Gauge::empty(0.0);
        assert!(gauge.fraction().abs() < 1e-9);
    }

    #[test]
    fn test_bounds_hold_across_mixed_deltas() {
        let mut oxygen = Gauge::full(100.0);
        for delta in [-30.0, 75.0, -250.0, 12.5, 1e6, -1e6, 0.25] {
            oxygen.apply(delta);
            assert!(oxygen.current >= 0.0 && oxygen.current <= oxygen.max);
        }
    }
}
