pub mod entity_location;
pub mod player_inputs;
pub mod vehicle_config;
mod settings;

pub use settings::GLOBAL_CONFIG;

pub type VehicleID = usize;
