use glam::DVec3;

use slipstream_core::entity_location::EntityLocation;
use slipstream_core::vehicle_config::VehicleKind;
use slipstream_core::{VehicleID, GLOBAL_CONFIG};

use crate::physics::vehicle::Vehicle;

// Grid positions could come from the map; a staggered two-column grid is
// fine for now
fn starting_position(slot: VehicleID) -> DVec3 {
    let column = (slot % 2) as f64;
    let row = (slot / 2) as f64;
    DVec3::new(column * 3.0 - 1.5, 0.5, -(row * 6.0) - column * 2.0)
}

/// Build a vehicle of the given kind parked on its starting-grid slot,
/// facing down the track (+Z).
pub fn spawn_vehicle(kind: VehicleKind, slot: VehicleID) -> Vehicle {
    Vehicle::new(
        kind.config(),
        EntityLocation::new(starting_position(slot), DVec3::Z),
    )
}

/// As [`spawn_vehicle`], with the kind taken from the global settings;
/// an unknown name falls back to the street vehicle.
pub fn spawn_default_vehicle(slot: VehicleID) -> Vehicle {
    let kind = VehicleKind::from_name(&GLOBAL_CONFIG.default_vehicle).unwrap_or_else(|| {
        log::warn!(
            "unknown default vehicle '{}', spawning a street vehicle",
            GLOBAL_CONFIG.default_vehicle
        );
        VehicleKind::Street
    });
    spawn_vehicle(kind, slot)
}
