use serde::{Deserialize, Serialize};

// InputSnapshot is what the input layer hands the simulation every tick.
// Axes arrive already normalized and deadzone-filtered upstream; the
// simulation does no smoothing of its own.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputSnapshot {
    pub throttle: f64, // [0, 1]
    pub brake: f64,    // [0, 1]
    pub steering: f64, // [-1, 1], positive steers right
    pub drift: bool,
}

impl InputSnapshot {
    pub fn new(throttle: f64, brake: f64, steering: f64, drift: bool) -> InputSnapshot {
        InputSnapshot {
            throttle: throttle.clamp(0.0, 1.0),
            brake: brake.clamp(0.0, 1.0),
            steering: steering.clamp(-1.0, 1.0),
            drift,
        }
    }

    pub fn coasting() -> InputSnapshot {
        InputSnapshot {
            throttle: 0.0,
            brake: 0.0,
            steering: 0.0,
            drift: false,
        }
    }
}

impl Default for InputSnapshot {
    fn default() -> Self {
        InputSnapshot::coasting()
    }
}

#[cfg(test)]
mod tests {
    use super::InputSnapshot;

    #[test]
    fn new_clamps_out_of_range_axes() {
        let inputs = InputSnapshot::new(1.5, -0.2, -3.0, true);
        assert_eq!(inputs.throttle, 1.0);
        assert_eq!(inputs.brake, 0.0);
        assert_eq!(inputs.steering, -1.0);
        assert!(inputs.drift);
    }
}
