pub const GRAVITY: f64 = 9.81; // m/s^2
pub const AIR_DENSITY: f64 = 1.225; // kg/m^3, sea level
pub const MS_TO_KMH: f64 = 3.6;

// Steering is an angular-inertia integrator, not a direct heading change;
// the constants below bound and settle it. The hard clamp keeps spin-outs
// readable, and tiny residual rates get snapped to zero so a parked
// vehicle doesn't yaw forever on numeric dust.
pub const MAX_ANGULAR_VELOCITY: f64 = 5.0; // rad/s
pub const STEERING_TORQUE_SCALE: f64 = 10.0;
pub const STEERING_DEADZONE: f64 = 0.05;
pub const STEERING_SNAP_INPUT: f64 = 0.01;
pub const STEERING_SNAP_RATE: f64 = 0.02; // rad/s
pub const STEERING_RETURN_STRENGTH: f64 = 4000.0; // N*m per rad/s of centering torque
pub const ANGULAR_DAMPING_COEFFICIENT: f64 = 2.0; // 1/s
pub const ANGULAR_INERTIA_CUTOFF: f64 = 0.01; // rad/s, below this the heading holds still

// Coast-down only resists the forward component, and gives up entirely
// below walking pace so parked vehicles don't creep backwards
pub const COAST_DOWN_MIN_SPEED: f64 = 0.1; // m/s

// "stick to track" heuristic: above this speed the configured downforce
// presses the vehicle along the negative ground normal
pub const DOWNFORCE_MIN_SPEED: f64 = 5.0; // m/s

// How strongly longitudinal load shift moves the front/rear split; 1.0
// would let a hard launch put the entire weight on the rear axle
pub const WEIGHT_TRANSFER_INFLUENCE: f64 = 0.3;

pub const GRIP_LATERAL_FACTOR: f64 = 0.15;
pub const TURNING_SPEED_DRAG: f64 = 1.0;

// after a wall bounce the vehicle is snapped to the contact point plus
// this much along the normal, which keeps it off the penetrating side
pub const WALL_PUSH_EPSILON: f64 = 0.01; // m
