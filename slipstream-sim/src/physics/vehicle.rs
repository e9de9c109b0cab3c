use glam::DVec3;

use slipstream_core::entity_location::EntityLocation;
use slipstream_core::player_inputs::InputSnapshot;
use slipstream_core::vehicle_config::VehicleConfig;
use slipstream_core::GLOBAL_CONFIG;

use super::axle::AxleController;
use super::collisions::{self, BodySnapshot};
use super::constants::{
    DOWNFORCE_MIN_SPEED, GRAVITY, GRIP_LATERAL_FACTOR, MAX_ANGULAR_VELOCITY, MS_TO_KMH,
    STEERING_DEADZONE, TURNING_SPEED_DRAG, WALL_PUSH_EPSILON,
};
use super::environment::{Environment, LAYER_GROUND};
use super::formulas;

/// One simulated vehicle: its immutable (sanitized) tuning, its mutable
/// kinematic state, and the axle controller that owns the rotational
/// half of that state. Mutated exactly once per fixed tick by
/// [`Vehicle::do_physics_step`].
pub struct Vehicle {
    config: VehicleConfig,
    inputs: InputSnapshot,
    pub entity_location: EntityLocation,
    velocity: DVec3,
    speed: f64, // cached |velocity|, refreshed at the end of each tick
    grounded: bool,
    ground_normal: DVec3,
    steering_angle: f64, // degrees, cosmetic readout only
    axle: AxleController,
}

impl Vehicle {
    pub fn new(config: VehicleConfig, entity_location: EntityLocation) -> Vehicle {
        let config = config.sanitized();
        let axle = AxleController::new(config.mass, config.length);
        Vehicle {
            config,
            inputs: InputSnapshot::default(),
            entity_location,
            velocity: DVec3::ZERO,
            speed: 0.0,
            grounded: false,
            ground_normal: DVec3::Y,
            steering_angle: 0.0,
            axle,
        }
    }

    // ---- commands ----

    pub fn set_inputs(&mut self, inputs: InputSnapshot) {
        self.inputs = inputs;
    }

    /// Full overwrite: nothing of the in-flight motion survives into the
    /// next tick.
    pub fn reset(&mut self, position: DVec3, forward: DVec3) {
        self.entity_location = EntityLocation::new(position, forward);
        self.velocity = DVec3::ZERO;
        self.speed = 0.0;
        self.steering_angle = 0.0;
        self.grounded = false;
        self.ground_normal = DVec3::Y;
        self.axle.reset();
    }

    // same overwrite semantics as reset today; a separate command so race
    // logic can distinguish a respawn penalty from an admin move
    pub fn teleport(&mut self, position: DVec3, forward: DVec3) {
        self.reset(position, forward);
    }

    // ---- outputs ----

    pub fn config(&self) -> &VehicleConfig {
        &self.config
    }

    pub fn inputs(&self) -> InputSnapshot {
        self.inputs
    }

    pub fn position(&self) -> DVec3 {
        self.entity_location.position
    }

    pub fn forward(&self) -> DVec3 {
        self.entity_location.unit_forward_direction
    }

    pub fn velocity(&self) -> DVec3 {
        self.velocity
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn speed_kmh(&self) -> f64 {
        self.speed * MS_TO_KMH
    }

    pub fn speed_fraction(&self) -> f64 {
        (self.speed / self.config.max_speed).clamp(0.0, 1.0)
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn ground_normal(&self) -> DVec3 {
        self.ground_normal
    }

    pub fn is_drifting(&self) -> bool {
        self.inputs.drift
            && self.config.drift_allowed
            && self.grounded
            && self.speed > self.config.min_drift_speed
    }

    pub fn steering_angle(&self) -> f64 {
        self.steering_angle
    }

    pub fn angular_velocity(&self) -> f64 {
        self.axle.angular_velocity()
    }

    // diagnostic readout
    pub fn axle_loads(&self) -> (f64, f64) {
        self.axle.axle_loads()
    }

    // scenario tests need to start from mid-race states without
    // replaying the inputs that would produce them
    #[cfg(test)]
    pub(crate) fn set_velocity_for_test(&mut self, velocity: DVec3) {
        self.velocity = velocity;
        self.speed = velocity.length();
    }

    pub fn body_snapshot(&self) -> BodySnapshot {
        BodySnapshot {
            position: self.entity_location.position,
            velocity: self.velocity,
            mass: self.config.mass,
            radius: self.config.length / 2.0,
            bounce: self.config.vehicle_collision_bounce,
        }
    }

    // ---- per-tick pipeline ----

    /// Advance this vehicle by one fixed step. Stages run in a strict
    /// order; `snapshots` holds every vehicle's pre-tick state (self
    /// included, at `self_index`) so pairwise collision outcomes are
    /// identical no matter which vehicle steps first.
    pub fn do_physics_step(
        &mut self,
        dt: f64,
        environment: &dyn Environment,
        snapshots: &[BodySnapshot],
        self_index: usize,
    ) {
        if dt <= 0.0 {
            return;
        }

        let velocity_at_tick_start = self.velocity;

        self.check_grounded(environment);
        self.apply_gravity(dt);
        self.apply_acceleration(dt);
        self.apply_steering(dt);
        self.apply_braking(dt);
        self.apply_drag(dt);

        // load shift feeds the grip multiplier consumed by the *next*
        // tick's acceleration
        let longitudinal_accel =
            (self.velocity - velocity_at_tick_start).dot(self.forward()) / dt;
        self.axle.update_weight_transfer(longitudinal_accel, &self.config);

        self.apply_movement(dt, environment);
        self.resolve_vehicle_contacts(snapshots, self_index);

        self.speed = self.velocity.length();
    }

    /// Grounded iff at least one down-ray from the configured sample
    /// points hits track within range; the ground normal is the
    /// normalized average of all hit normals.
    fn check_grounded(&mut self, environment: &dyn Environment) {
        let up = self.entity_location.unit_upward_direction;
        let right = self.entity_location.unit_right_direction();
        let forward = self.forward();
        let position = self.entity_location.position;

        let mut normal_sum = DVec3::ZERO;
        let mut hits = 0;

        let mut sample = |origin: DVec3| {
            if let Some(hit) = environment.raycast(
                origin,
                -up,
                self.config.ground_check_distance,
                LAYER_GROUND,
            ) {
                normal_sum += hit.normal;
                hits += 1;
            }
        };

        if self.config.ground_sample_offsets.is_empty() {
            sample(position);
        } else {
            for offset in &self.config.ground_sample_offsets {
                sample(position + right * offset.x + up * offset.y + forward * offset.z);
            }
        }

        self.grounded = hits > 0;
        self.ground_normal = if hits > 0 {
            let averaged = normal_sum.normalize_or_zero();
            // opposing normals can cancel out on degenerate geometry
            if averaged == DVec3::ZERO {
                up
            } else {
                averaged
            }
        } else {
            up
        };
    }

    fn apply_gravity(&mut self, dt: f64) {
        if !self.grounded {
            self.velocity += DVec3::new(0.0, -GRAVITY, 0.0) * dt;
            return;
        }
        // keep the velocity in the ground plane, and above a speed
        // threshold press the vehicle onto the track. This is an arcade
        // "stick to track" heuristic, not a suspension model.
        self.velocity -= self.ground_normal * self.velocity.dot(self.ground_normal);
        if self.speed > DOWNFORCE_MIN_SPEED {
            self.velocity += -self.ground_normal * (self.config.downforce / self.config.mass) * dt;
        }
    }

    fn apply_acceleration(&mut self, dt: f64) {
        if self.inputs.throttle <= 0.0 || !self.grounded {
            return;
        }
        let forward = self.forward();
        let speed_ratio = self.speed_fraction();
        let torque_multiplier = self.config.torque_curve.sample(speed_ratio);
        // pulling away from (near) standstill costs extra: stiction
        let static_resistance = if speed_ratio < self.config.static_friction_threshold {
            self.config.static_friction_multiplier
        } else {
            1.0
        };

        let force = self.config.acceleration_force
            * self.inputs.throttle
            * torque_multiplier
            * static_resistance
            * self.axle.grip_multiplier();
        self.velocity += forward * (force / self.config.mass) * dt;

        // cap the forward component only; lateral slip is not the
        // engine's to clamp
        let forward_speed = self.velocity.dot(forward);
        if forward_speed > self.config.max_speed {
            self.velocity += forward * (self.config.max_speed - forward_speed);
        }
    }

    fn apply_steering(&mut self, dt: f64) {
        if !self.grounded {
            return;
        }
        let steering = self.inputs.steering;
        let speed_ratio = self.speed_fraction();

        // steering authority falls off as speed rises
        let steering_modifier = formulas::lerp(
            self.config.steering_low_speed_multiplier,
            self.config.steering_high_speed_multiplier,
            speed_ratio,
        );
        self.axle
            .update_angular_velocity(steering, self.config.steering_speed * steering_modifier, dt);
        self.axle.apply_angular_inertia(&mut self.entity_location, dt);
        // cosmetic readout for wheel meshes / HUD
        self.steering_angle =
            self.axle.angular_velocity() / MAX_ANGULAR_VELOCITY * self.config.max_steering_angle;

        // the heading just rotated, so part of the old forward velocity is
        // now lateral slip; grip (or drift) decides how much of it survives
        let forward = self.forward();
        let right = self.entity_location.unit_right_direction();
        let forward_speed = self.velocity.dot(forward);
        let mut lateral = self.velocity - forward * forward_speed;

        if self.is_drifting() {
            lateral *= self.config.drift_grip_reduction;
            lateral += right * steering * (self.config.drift_lateral_force / self.config.mass) * dt;
        } else {
            lateral *= 1.0 - (self.config.grip_strength * GRIP_LATERAL_FACTOR).clamp(0.0, 1.0);
        }

        // tire scrub: holding a turn bleeds a little forward speed
        let mut scrubbed_speed = forward_speed;
        if steering.abs() >= STEERING_DEADZONE && forward_speed > 0.0 {
            let loss = steering.abs()
                * speed_ratio
                * TURNING_SPEED_DRAG
                * self.config.turning_speed_loss
                * dt;
            scrubbed_speed = (forward_speed - loss).max(0.0);
        }

        self.velocity = forward * scrubbed_speed + lateral;
    }

    fn apply_braking(&mut self, dt: f64) {
        if self.inputs.brake <= 0.0 || !self.grounded {
            return;
        }
        let forward = self.forward();
        let forward_speed = self.velocity.dot(forward);
        let lateral = self.velocity - forward * forward_speed;

        // brakes fade with speed: full efficiency at or below the low
        // threshold, tapering linearly to the high-speed value
        let kmh = self.speed * MS_TO_KMH;
        let efficiency = if kmh <= self.config.brake_low_speed_kmh {
            self.config.brake_efficiency_low_speed
        } else if kmh >= self.config.brake_high_speed_kmh {
            self.config.brake_efficiency_high_speed
        } else {
            let t = (kmh - self.config.brake_low_speed_kmh)
                / (self.config.brake_high_speed_kmh - self.config.brake_low_speed_kmh);
            formulas::lerp(
                self.config.brake_efficiency_low_speed,
                self.config.brake_efficiency_high_speed,
                t,
            )
        };

        let deceleration =
            self.config.brake_force * self.inputs.brake * efficiency / self.config.mass;
        let magnitude = (forward_speed.abs() - deceleration * dt).max(0.0);
        // direction is preserved, and a fully stopped vehicle may still
        // carry lateral velocity
        self.velocity = forward * (magnitude * forward_speed.signum()) + lateral;
    }

    fn apply_drag(&mut self, dt: f64) {
        if !self.grounded {
            // simple exponential decay while airborne
            self.velocity *= (-self.config.air_drag * dt).exp();
            return;
        }
        if self.inputs.throttle <= 0.0 && self.inputs.brake <= 0.0 {
            self.velocity =
                self.axle
                    .apply_coast_down(self.velocity, self.forward(), &self.config, dt);
        } else {
            // under power the physically derived coast-down is replaced by
            // a tuned, speed-scaled decay. The two regimes disagree in
            // magnitude and switch the instant input is released; that
            // step in deceleration is the shipped feel and is kept as-is
            // pending a tuning pass.
            self.velocity *= (-self.config.ground_drag * self.speed_fraction() * dt).exp();
        }
    }

    /// Integrate position, sweeping a probe sphere along the movement
    /// first so walls are hit before they are crossed.
    fn apply_movement(&mut self, dt: f64, environment: &dyn Environment) {
        let mut movement = self.velocity * dt;
        if self.grounded {
            // downforce presses the velocity into the track for feel;
            // integrating that component would sink the vehicle a little
            // further below ride height every tick until the ground rays
            // stop reaching it
            let sink = movement.dot(self.ground_normal);
            if sink < 0.0 {
                movement -= self.ground_normal * sink;
            }
        }
        let distance = movement.length();
        if distance < f64::EPSILON {
            return;
        }
        let direction = movement / distance;
        match environment.sphere_cast(
            self.entity_location.position,
            GLOBAL_CONFIG.collision_probe_radius,
            direction,
            distance + GLOBAL_CONFIG.collision_margin,
        ) {
            // zero distance means the sweep started overlapping the wall:
            // shed the into-wall velocity and step straight out, instead of
            // reflecting anew every tick while barely inside
            Some(hit) if hit.distance <= 0.0 => {
                let into_wall = self.velocity.dot(hit.normal);
                self.velocity -= hit.normal * into_wall.min(0.0);
                self.entity_location.position = hit.point + hit.normal * WALL_PUSH_EPSILON;
            }
            Some(hit) => {
                self.velocity =
                    collisions::reflect_off_wall(self.velocity, hit.normal, self.config.wall_bounce);
                // snap to the contact point so we never end up on the far
                // side of the wall
                self.entity_location.position = hit.point + hit.normal * WALL_PUSH_EPSILON;
            }
            None => self.entity_location.position += movement,
        }
    }

    /// Vehicle-vehicle contacts, resolved symmetrically: both members of
    /// a pair read the same pre-tick snapshots, compute their own side of
    /// the elastic exchange, and push themselves half the overlap apart.
    fn resolve_vehicle_contacts(&mut self, snapshots: &[BodySnapshot], self_index: usize) {
        let me = match snapshots.get(self_index) {
            Some(snapshot) => *snapshot,
            None => return, // stepped outside a Simulation; no peers to hit
        };
        for (index, other) in snapshots.iter().enumerate() {
            if index == self_index {
                continue;
            }
            let contact_distance = me.radius + other.radius;
            if me.position.distance(other.position) >= contact_distance {
                continue;
            }
            if collisions::is_approaching(&me, other) {
                let resolved = collisions::elastic_collision_velocity(&me, other);
                self.velocity += resolved - me.velocity;
            }
            self.entity_location.position += collisions::separation_push(&me, other);
        }
    }
}
