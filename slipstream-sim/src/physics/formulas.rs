//! Pure, stateless formulas shared by the axle controller and the
//! dynamics pipeline. Everything here is a plain function of its scalar
//! inputs so the numbers are reproducible in isolation.

use super::constants::{AIR_DENSITY, GRAVITY};

// Equations for rolling resistance and aerodynamic drag come from
// https://asawicki.info/Mirror/Car%20Physics%20for%20Games/Car%20Physics%20for%20Games.html

pub fn rolling_resistance_force(crr: f64, mass: f64) -> f64 {
    crr * mass * GRAVITY
}

// proportional to the square of velocity
pub fn aerodynamic_drag_force(cd: f64, frontal_area: f64, speed: f64) -> f64 {
    0.5 * AIR_DENSITY * cd * frontal_area * speed * speed
}

pub fn coast_down_deceleration(
    speed: f64,
    mass: f64,
    crr: f64,
    cd: f64,
    frontal_area: f64,
) -> f64 {
    (rolling_resistance_force(crr, mass) + aerodynamic_drag_force(cd, frontal_area, speed)) / mass
}

// solid cylinder spinning about its center: I = m * r^2 / 2, with the
// vehicle's half-length standing in for the radius
pub fn moment_of_inertia(mass: f64, length: f64) -> f64 {
    0.5 * mass * (length / 2.0) * (length / 2.0)
}

pub fn angular_damping(angular_velocity: f64, coefficient: f64) -> f64 {
    -coefficient * angular_velocity
}

// load shifted between the axles by accelerating or braking
pub fn longitudinal_weight_transfer(
    mass: f64,
    longitudinal_accel: f64,
    cg_height: f64,
    wheelbase: f64,
) -> f64 {
    mass * longitudinal_accel * cg_height / wheelbase
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coast_down_combines_rolling_and_aero_terms() {
        let mass = 1000.0;
        let expected =
            (rolling_resistance_force(0.015, mass) + aerodynamic_drag_force(0.35, 2.2, 20.0))
                / mass;
        assert!((coast_down_deceleration(20.0, mass, 0.015, 0.35, 2.2) - expected).abs() < 1e-12);
    }

    #[test]
    fn aero_drag_is_quadratic_in_speed() {
        let at_10 = aerodynamic_drag_force(0.35, 2.2, 10.0);
        let at_20 = aerodynamic_drag_force(0.35, 2.2, 20.0);
        assert!((at_20 / at_10 - 4.0).abs() < 1e-12);
    }

    #[test]
    fn moment_of_inertia_uses_half_length() {
        // 0.5 * 1000 * (4 / 2)^2
        assert_eq!(moment_of_inertia(1000.0, 4.0), 2000.0);
    }

    #[test]
    fn weight_transfer_is_signed_with_acceleration() {
        assert!(longitudinal_weight_transfer(1200.0, 3.0, 0.5, 2.6) > 0.0);
        assert!(longitudinal_weight_transfer(1200.0, -3.0, 0.5, 2.6) < 0.0);
    }
}
