use config::{Config, ConfigError, File};
use lazy_static::lazy_static;
use serde::Deserialize;

// Engine-level knobs only; anything that tunes the feel of a single
// vehicle belongs in VehicleConfig instead
#[derive(Deserialize)]
pub struct Settings {
    pub tick_ms: u64,
    pub default_vehicle: String,
    pub collision_probe_radius: f64,
    pub collision_margin: f64,
}

impl Settings {
    fn new() -> Result<Settings, ConfigError> {
        let config = Config::builder()
            .set_default("tick_ms", 20)?
            .set_default("default_vehicle", "street")?
            .set_default("collision_probe_radius", 0.5)?
            .set_default("collision_margin", 0.05)?
            .add_source(File::with_name("config.yaml").required(false))
            .build()?;

        config.try_deserialize()
    }

    pub fn tick_seconds(&self) -> f64 {
        self.tick_ms as f64 / 1000.0
    }
}

lazy_static! {
    pub static ref GLOBAL_CONFIG: Settings = Settings::new().expect("failed to read config file");
}
