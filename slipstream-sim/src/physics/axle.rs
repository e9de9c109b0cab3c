use glam::DVec3;

use slipstream_core::entity_location::EntityLocation;
use slipstream_core::vehicle_config::VehicleConfig;

use super::constants::{
    ANGULAR_DAMPING_COEFFICIENT, ANGULAR_INERTIA_CUTOFF, COAST_DOWN_MIN_SPEED, GRAVITY,
    MAX_ANGULAR_VELOCITY, STEERING_DEADZONE, STEERING_RETURN_STRENGTH, STEERING_SNAP_INPUT,
    STEERING_SNAP_RATE, STEERING_TORQUE_SCALE, WEIGHT_TRANSFER_INFLUENCE,
};
use super::formulas;

/// Owns the rotational half of a vehicle's state: the yaw rate, the
/// moment of inertia it integrates against, and how the vehicle's weight
/// is currently split across the axles.
#[derive(Clone, Debug)]
pub struct AxleController {
    angular_velocity: f64, // rad/s, positive turns the nose toward unit_right
    moment_of_inertia: f64,
    front_axle_load: f64,
    rear_axle_load: f64,
}

impl AxleController {
    pub fn new(mass: f64, length: f64) -> AxleController {
        AxleController {
            angular_velocity: 0.0,
            moment_of_inertia: formulas::moment_of_inertia(mass, length),
            front_axle_load: 0.5,
            rear_axle_load: 0.5,
        }
    }

    pub fn angular_velocity(&self) -> f64 {
        self.angular_velocity
    }

    pub fn axle_loads(&self) -> (f64, f64) {
        (self.front_axle_load, self.rear_axle_load)
    }

    // zero the motion state but keep the moment of inertia; the loads
    // return to an even split
    pub fn reset(&mut self) {
        self.angular_velocity = 0.0;
        self.front_axle_load = 0.5;
        self.rear_axle_load = 0.5;
    }

    /// Integrate steering torque into the yaw rate. Inside the input
    /// deadzone a centering torque pulls the rate back to zero, and a
    /// damping term resists whatever rate is left.
    pub fn update_angular_velocity(&mut self, steering_input: f64, steering_speed: f64, dt: f64) {
        let mut torque = steering_input * steering_speed * STEERING_TORQUE_SCALE;
        if steering_input.abs() < STEERING_DEADZONE {
            torque += -self.angular_velocity * STEERING_RETURN_STRENGTH;
        }

        let angular_acceleration = torque / self.moment_of_inertia;
        let damping = formulas::angular_damping(self.angular_velocity, ANGULAR_DAMPING_COEFFICIENT);
        self.angular_velocity += (angular_acceleration + damping) * dt;
        self.angular_velocity = self
            .angular_velocity
            .clamp(-MAX_ANGULAR_VELOCITY, MAX_ANGULAR_VELOCITY);

        // kill residual micro-yaw so a parked vehicle reads exactly zero
        if steering_input.abs() < STEERING_SNAP_INPUT
            && self.angular_velocity.abs() < STEERING_SNAP_RATE
        {
            self.angular_velocity = 0.0;
        }
    }

    /// Rotate the heading by the yaw accumulated this tick, in the
    /// vehicle's own frame. Rates below the cutoff are treated as zero.
    pub fn apply_angular_inertia(&self, location: &mut EntityLocation, dt: f64) {
        if self.angular_velocity.abs() < ANGULAR_INERTIA_CUTOFF {
            return;
        }
        location.rotate_yaw(self.angular_velocity * dt);
    }

    /// Physically derived free-rolling deceleration: rolling resistance
    /// plus aerodynamic drag, applied to the forward component only. The
    /// lateral component is grip's problem, not drag's.
    pub fn apply_coast_down(
        &self,
        velocity: DVec3,
        forward: DVec3,
        config: &VehicleConfig,
        dt: f64,
    ) -> DVec3 {
        let forward_speed = velocity.dot(forward);
        if forward_speed < COAST_DOWN_MIN_SPEED {
            return velocity;
        }
        let lateral = velocity - forward * forward_speed;
        let deceleration = formulas::coast_down_deceleration(
            forward_speed,
            config.mass,
            config.rolling_resistance_coefficient,
            config.drag_coefficient,
            config.frontal_area,
        );
        let slowed = (forward_speed - deceleration * dt).max(0.0);
        lateral + forward * slowed
    }

    /// Shift the front/rear load split from this tick's longitudinal
    /// acceleration. The result always sums to 1 with both halves in
    /// [0, 1].
    pub fn update_weight_transfer(&mut self, longitudinal_accel: f64, config: &VehicleConfig) {
        let transfer = formulas::longitudinal_weight_transfer(
            config.mass,
            longitudinal_accel,
            config.center_of_gravity_height,
            config.wheelbase,
        );
        let transfer_ratio = transfer / (config.mass * GRAVITY) * WEIGHT_TRANSFER_INFLUENCE;
        let front = (0.5 - transfer_ratio).clamp(0.0, 1.0);
        let rear = (0.5 + transfer_ratio).clamp(0.0, 1.0);
        let total = front + rear;
        if total > f64::EPSILON {
            self.front_axle_load = front / total;
            self.rear_axle_load = rear / total;
        } else {
            self.front_axle_load = 0.5;
            self.rear_axle_load = 0.5;
        }
    }

    // acceleration squats the vehicle onto its rear axle, where the drive
    // wheels are; braking does the opposite
    pub fn grip_multiplier(&self) -> f64 {
        formulas::lerp(0.7, 1.3, self.rear_axle_load)
    }
}

#[cfg(test)]
mod tests {
    use super::AxleController;
    use slipstream_core::vehicle_config::VehicleKind;

    #[test]
    fn yaw_rate_is_clamped() {
        let mut axle = AxleController::new(100.0, 2.0);
        for _ in 0..500 {
            axle.update_angular_velocity(1.0, 5000.0, 0.02);
        }
        assert!(axle.angular_velocity() <= 5.0);
    }

    #[test]
    fn yaw_rate_centers_after_release() {
        let mut axle = AxleController::new(1200.0, 4.2);
        for _ in 0..50 {
            axle.update_angular_velocity(1.0, 1100.0, 0.02);
        }
        assert!(axle.angular_velocity() > 0.1);

        for _ in 0..200 {
            axle.update_angular_velocity(0.0, 1100.0, 0.02);
        }
        assert_eq!(axle.angular_velocity(), 0.0);
    }

    #[test]
    fn weight_transfer_keeps_loads_normalized() {
        let config = VehicleKind::Street.config();
        let mut axle = AxleController::new(config.mass, config.length);

        axle.update_weight_transfer(6.0, &config);
        let (front, rear) = axle.axle_loads();
        assert!((front + rear - 1.0).abs() < 1e-12);
        assert!(rear > front); // accelerating loads the rear

        axle.update_weight_transfer(-6.0, &config);
        let (front, rear) = axle.axle_loads();
        assert!((front + rear - 1.0).abs() < 1e-12);
        assert!(front > rear); // braking loads the front
    }

    #[test]
    fn grip_multiplier_tracks_rear_load() {
        let config = VehicleKind::Street.config();
        let mut axle = AxleController::new(config.mass, config.length);
        assert!((axle.grip_multiplier() - 1.0).abs() < 1e-12);

        axle.update_weight_transfer(6.0, &config);
        assert!(axle.grip_multiplier() > 1.0);
    }
}
