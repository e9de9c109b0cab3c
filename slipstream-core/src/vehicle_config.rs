use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Fallbacks used when a config fails validation; deliberately tame so a
// repaired vehicle drives badly rather than explosively
const FALLBACK_MASS: f64 = 1.0; // kg
const FALLBACK_MAX_SPEED: f64 = 40.0; // m/s
const FALLBACK_LENGTH: f64 = 4.0; // m
const FALLBACK_WHEELBASE: f64 = 2.5; // m

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("vehicle mass must be positive and finite (got {0})")]
    InvalidMass(f64),

    #[error("torque curve is empty")]
    EmptyTorqueCurve,

    #[error("torque curve is malformed: {0}")]
    MalformedTorqueCurve(String),
}

/// Piecewise-linear engine-output multiplier over speed ratio
/// (current speed / max speed). Keys must be strictly ascending and span
/// the full [0, 1] range; sampling extrapolates flat past the ends.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TorqueCurve {
    keys: Vec<(f64, f64)>, // (speed ratio, torque multiplier)
}

impl TorqueCurve {
    // a curve that multiplies by 1.0 everywhere; the substitute for
    // missing or malformed curves
    pub fn flat() -> TorqueCurve {
        TorqueCurve {
            keys: vec![(0.0, 1.0), (1.0, 1.0)],
        }
    }

    pub fn from_keys(keys: Vec<(f64, f64)>) -> Result<TorqueCurve, ConfigError> {
        let curve = TorqueCurve { keys };
        curve.validate()?;
        Ok(curve)
    }

    pub fn keys(&self) -> &[(f64, f64)] {
        &self.keys
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.keys.is_empty() {
            return Err(ConfigError::EmptyTorqueCurve);
        }
        for window in self.keys.windows(2) {
            if window[1].0 <= window[0].0 {
                return Err(ConfigError::MalformedTorqueCurve(format!(
                    "speed ratios must be strictly ascending ({} then {})",
                    window[0].0, window[1].0
                )));
            }
        }
        for &(ratio, multiplier) in &self.keys {
            if !(0.0..=1.0).contains(&ratio) || !multiplier.is_finite() {
                return Err(ConfigError::MalformedTorqueCurve(format!(
                    "key ({}, {}) outside valid range",
                    ratio, multiplier
                )));
            }
        }
        let first = self.keys[0].0;
        let last = self.keys[self.keys.len() - 1].0;
        if first != 0.0 || last != 1.0 {
            return Err(ConfigError::MalformedTorqueCurve(format!(
                "keys span [{}, {}], must span [0, 1]",
                first, last
            )));
        }
        Ok(())
    }

    pub fn sample(&self, speed_ratio: f64) -> f64 {
        let first = self.keys[0];
        let last = self.keys[self.keys.len() - 1];
        if speed_ratio <= first.0 {
            return first.1;
        }
        if speed_ratio >= last.0 {
            return last.1;
        }
        for window in self.keys.windows(2) {
            let (r0, m0) = window[0];
            let (r1, m1) = window[1];
            if speed_ratio <= r1 {
                let t = (speed_ratio - r0) / (r1 - r0);
                return m0 + (m1 - m0) * t;
            }
        }
        last.1
    }
}

/// Read-only tuning for one vehicle. Instances are sanitized once at
/// spawn (see [`VehicleConfig::sanitized`]); the simulation assumes every
/// field it divides by is positive afterwards.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    pub mass: f64,               // kg
    pub max_speed: f64,          // m/s
    pub acceleration_force: f64, // N
    pub brake_force: f64,        // N
    pub torque_curve: TorqueCurve,

    // below this speed ratio the drive force is reduced, standing in for
    // startup stiction
    pub static_friction_threshold: f64,
    pub static_friction_multiplier: f64,

    pub steering_speed: f64,
    pub steering_low_speed_multiplier: f64,
    pub steering_high_speed_multiplier: f64,
    pub max_steering_angle: f64, // degrees, scales the cosmetic readout

    pub grip_strength: f64,
    pub drift_allowed: bool,
    pub drift_grip_reduction: f64, // fraction of lateral velocity kept while drifting
    pub drift_lateral_force: f64,  // N
    pub min_drift_speed: f64,      // m/s

    // brakes are more efficient at low speed in this model; efficiency is
    // interpolated between these two km/h thresholds
    pub brake_low_speed_kmh: f64,
    pub brake_high_speed_kmh: f64,
    pub brake_efficiency_low_speed: f64,
    pub brake_efficiency_high_speed: f64,

    pub drag_coefficient: f64,              // Cd
    pub rolling_resistance_coefficient: f64, // Crr
    pub frontal_area: f64,                  // m^2
    pub air_drag: f64,    // airborne exponential decay rate, 1/s
    pub ground_drag: f64, // grounded decay rate while throttle/brake held, 1/s
    pub turning_speed_loss: f64,

    pub ground_check_distance: f64, // m
    // local-frame ray origins (x = right, y = up, z = forward); empty
    // means a single ray from the vehicle origin
    pub ground_sample_offsets: Vec<DVec3>,
    pub downforce: f64, // N, applied above the downforce speed threshold

    pub wall_bounce: f64,
    pub vehicle_collision_bounce: f64,

    pub length: f64,                   // m
    pub center_of_gravity_height: f64, // m
    pub wheelbase: f64,                // m
}

impl Default for VehicleConfig {
    fn default() -> Self {
        VehicleKind::Street.config()
    }
}

impl VehicleConfig {
    pub fn from_yaml(source: &str) -> Result<VehicleConfig, serde_yaml::Error> {
        serde_yaml::from_str(source)
    }

    /// Repair anything that would make the simulation divide by zero or
    /// propagate NaNs. Every substitution is logged; a broken config
    /// degrades the one vehicle it belongs to and nothing else.
    pub fn sanitized(mut self) -> VehicleConfig {
        if !self.mass.is_finite() || self.mass <= 0.0 {
            log::warn!(
                "vehicle mass {} is invalid, substituting {} kg",
                self.mass,
                FALLBACK_MASS
            );
            self.mass = FALLBACK_MASS;
        }
        if !self.max_speed.is_finite() || self.max_speed <= 0.0 {
            log::warn!(
                "vehicle max speed {} is invalid, substituting {} m/s",
                self.max_speed,
                FALLBACK_MAX_SPEED
            );
            self.max_speed = FALLBACK_MAX_SPEED;
        }
        if !self.length.is_finite() || self.length <= 0.0 {
            log::warn!(
                "vehicle length {} is invalid, substituting {} m",
                self.length,
                FALLBACK_LENGTH
            );
            self.length = FALLBACK_LENGTH;
        }
        if !self.wheelbase.is_finite() || self.wheelbase <= 0.0 {
            log::warn!(
                "wheelbase {} is invalid, substituting {} m",
                self.wheelbase,
                FALLBACK_WHEELBASE
            );
            self.wheelbase = FALLBACK_WHEELBASE;
        }
        if let Err(error) = self.torque_curve.validate() {
            log::warn!("{}, substituting a flat curve", error);
            self.torque_curve = TorqueCurve::flat();
        }
        if self.brake_high_speed_kmh <= self.brake_low_speed_kmh {
            log::warn!(
                "brake efficiency thresholds out of order ({} >= {}), swapping",
                self.brake_low_speed_kmh,
                self.brake_high_speed_kmh
            );
            std::mem::swap(
                &mut self.brake_low_speed_kmh,
                &mut self.brake_high_speed_kmh,
            );
        }
        if !(0.0..=1.0).contains(&self.drift_grip_reduction) {
            log::warn!(
                "drift grip reduction {} outside [0, 1], clamping",
                self.drift_grip_reduction
            );
            self.drift_grip_reduction = self.drift_grip_reduction.clamp(0.0, 1.0);
        }
        self
    }
}

/// The selectable vehicle roster. Stats could live in yaml files, but
/// it's probably just fine to hard-code them in here.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleKind {
    Street,
    Sport,
    Drifter,
    Hauler,
}

impl VehicleKind {
    pub fn from_name(name: &str) -> Option<VehicleKind> {
        match name {
            "street" => Some(VehicleKind::Street),
            "sport" => Some(VehicleKind::Sport),
            "drifter" => Some(VehicleKind::Drifter),
            "hauler" => Some(VehicleKind::Hauler),
            _ => None,
        }
    }

    pub fn config(&self) -> VehicleConfig {
        let base = VehicleConfig {
            mass: 1200.0,
            max_speed: 45.0,
            acceleration_force: 9000.0,
            brake_force: 14000.0,
            // gentle pull-away, peak in the midrange, tapering at the top
            torque_curve: TorqueCurve::from_keys(vec![
                (0.0, 0.8),
                (0.3, 1.0),
                (0.7, 1.0),
                (1.0, 0.6),
            ])
            .unwrap(),
            static_friction_threshold: 0.05,
            static_friction_multiplier: 0.7,
            steering_speed: 1100.0,
            steering_low_speed_multiplier: 1.0,
            steering_high_speed_multiplier: 0.45,
            max_steering_angle: 35.0,
            grip_strength: 4.0,
            drift_allowed: true,
            drift_grip_reduction: 0.9,
            drift_lateral_force: 4500.0,
            min_drift_speed: 8.0,
            brake_low_speed_kmh: 30.0,
            brake_high_speed_kmh: 120.0,
            brake_efficiency_low_speed: 1.0,
            brake_efficiency_high_speed: 0.6,
            drag_coefficient: 0.35,
            rolling_resistance_coefficient: 0.015,
            frontal_area: 2.2,
            air_drag: 0.1,
            ground_drag: 0.6,
            turning_speed_loss: 1.5,
            ground_check_distance: 0.6,
            ground_sample_offsets: vec![
                DVec3::new(-0.8, 0.1, 1.2),
                DVec3::new(0.8, 0.1, 1.2),
                DVec3::new(-0.8, 0.1, -1.2),
                DVec3::new(0.8, 0.1, -1.2),
            ],
            downforce: 2400.0,
            wall_bounce: 0.45,
            vehicle_collision_bounce: 0.8,
            length: 4.2,
            center_of_gravity_height: 0.55,
            wheelbase: 2.6,
        };

        match self {
            VehicleKind::Street => base,
            VehicleKind::Sport => VehicleConfig {
                mass: 1050.0,
                max_speed: 58.0,
                acceleration_force: 12500.0,
                steering_high_speed_multiplier: 0.35,
                grip_strength: 5.0,
                drift_grip_reduction: 0.93,
                min_drift_speed: 12.0,
                downforce: 4200.0,
                length: 4.4,
                center_of_gravity_height: 0.42,
                ..base
            },
            VehicleKind::Drifter => VehicleConfig {
                mass: 1150.0,
                max_speed: 48.0,
                grip_strength: 2.5,
                drift_grip_reduction: 0.97,
                drift_lateral_force: 7000.0,
                min_drift_speed: 6.0,
                turning_speed_loss: 0.8,
                ..base
            },
            VehicleKind::Hauler => VehicleConfig {
                mass: 2600.0,
                max_speed: 36.0,
                acceleration_force: 16000.0,
                brake_force: 24000.0,
                steering_speed: 800.0,
                drift_allowed: false,
                frontal_area: 4.5,
                wall_bounce: 0.25,
                vehicle_collision_bounce: 0.9,
                length: 5.6,
                center_of_gravity_height: 0.95,
                wheelbase: 3.4,
                ..base
            },
        }
    }
}
