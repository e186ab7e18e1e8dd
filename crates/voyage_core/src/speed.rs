use crate::{Constants, Gauge};

/// Distance covered per tick.
///
/// `max(0, base - nav_penalty - low_fuel_penalty) / thrust_penalty`, rounded to
/// one decimal. An empty tank always yields 0.
pub fn compute_speed(fuel: &Gauge, nav_errors: u32, thrust_penalty: f64, constants: &Constants) -> f64 {
    if fuel.is_empty() {
        return 0.0;
    }
    let nav_penalty = match nav_errors {
        0 => 0.0,
        1 => 1.0,
        _ => 2.0,
    };
    let low_fuel_penalty = if fuel.fraction() < constants.low_fuel_fraction {
        1.0
    } else {
        0.0
    };
    let divisor = if thrust_penalty > 0.0 {
        thrust_penalty
    } else {
        1.0
    };
    let speed = (constants.base_speed - nav_penalty - low_fuel_penalty).max(0.0) / divisor;
    (speed * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::base_content;

    fn fuel(current: f64) -> Gauge {
        Gauge {
            current,
            max: 100.0,
        }
    }

    #[test]
    fn test_empty_tank_forces_zero_speed() {
        let content = base_content();
        let speed = compute_speed(&fuel(0.0), 0, 0.75, &content.constants);
        assert!(speed.abs() < 1e-9);
    }

    #[test]
    fn test_nominal_speed_divides_by_thrust_penalty() {
        let content = base_content();
        assert!((compute_speed(&fuel(100.0), 0, 1.0, &content.constants) - 2.0).abs() < 1e-9);
        // 2 / 0.75 = 2.666.. rounds to 2.7
        assert!((compute_speed(&fuel(100.0), 0, 0.75, &content.constants) - 2.7).abs() < 1e-9);
    }

    #[test]
    fn test_two_nav_errors_remove_two_from_base() {
        let content = base_content();
        let speed = compute_speed(&fuel(80.0), 2, 1.0, &content.constants);
        assert!(speed.abs() < 1e-9);
        let three = compute_speed(&fuel(80.0), 3, 1.0, &content.constants);
        assert!(three.abs() < 1e-9);
    }

    #[test]
    fn test_single_nav_error_and_low_fuel_stack() {
        let content = base_content();
        let one_error = compute_speed(&fuel(80.0), 1, 1.25, &content.constants);
        assert!((one_error - 0.8).abs() < 1e-9);
        let low_fuel = compute_speed(&fuel(20.0), 0, 1.0, &content.constants);
        assert!((low_fuel - 1.0).abs() < 1e-9);
        let both = compute_speed(&fuel(20.0), 1, 1.0, &content.constants);
        assert!(both.abs() < 1e-9);
    }

    #[test]
    fn test_low_fuel_threshold_is_strict() {
        let content = base_content();
        let at_quarter = compute_speed(&fuel(25.0), 0, 1.0, &content.constants);
        assert!((at_quarter - 2.0).abs() < 1e-9);
    }
}
