pub mod axle;
pub mod collisions;
pub mod constants;
pub mod environment;
pub mod formulas;
pub mod vehicle;

#[cfg(test)]
mod tests;

use slipstream_core::{VehicleID, GLOBAL_CONFIG};

use self::collisions::BodySnapshot;
use self::environment::Environment;
use self::vehicle::Vehicle;

/// Owns every vehicle in the session and steps them at a fixed rate.
/// Before a tick, every vehicle's state is frozen into a snapshot; each
/// vehicle then steps against those snapshots, so pairwise collision
/// outcomes never depend on iteration order and one vehicle's tick never
/// observes another's partial state.
pub struct Simulation {
    vehicles: Vec<Vehicle>,
}

impl Simulation {
    pub fn new() -> Simulation {
        Simulation {
            vehicles: Vec::new(),
        }
    }

    pub fn add_vehicle(&mut self, vehicle: Vehicle) -> VehicleID {
        self.vehicles.push(vehicle);
        self.vehicles.len() - 1
    }

    pub fn vehicle(&self, id: VehicleID) -> Option<&Vehicle> {
        self.vehicles.get(id)
    }

    pub fn vehicle_mut(&mut self, id: VehicleID) -> Option<&mut Vehicle> {
        self.vehicles.get_mut(id)
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// The fixed step length the external scheduler is expected to call
    /// [`Simulation::step`] with.
    pub fn fixed_dt() -> f64 {
        GLOBAL_CONFIG.tick_seconds()
    }

    pub fn step(&mut self, environment: &dyn Environment, dt: f64) {
        if dt <= 0.0 {
            return;
        }
        let snapshots: Vec<BodySnapshot> =
            self.vehicles.iter().map(Vehicle::body_snapshot).collect();
        for (index, vehicle) in self.vehicles.iter_mut().enumerate() {
            vehicle.do_physics_step(dt, environment, &snapshots, index);
        }
    }

    pub fn step_fixed(&mut self, environment: &dyn Environment) {
        self.step(environment, Self::fixed_dt());
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Simulation::new()
    }
}
