use approx::assert_relative_eq;
use glam::DVec3;

use slipstream_core::entity_location::EntityLocation;
use slipstream_core::player_inputs::InputSnapshot;
use slipstream_core::vehicle_config::{TorqueCurve, VehicleConfig, VehicleKind};

use crate::physics::environment::{PlaneEnvironment, Wall};
use crate::physics::vehicle::Vehicle;
use crate::physics::Simulation;

const TICK: f64 = 0.02; // 50 Hz

// A deliberately inert tuning: flat torque, no stiction, no drag, no
// weight transfer (cg on the ground). Scenarios switch on exactly the
// effect they want to measure.
fn inert_config() -> VehicleConfig {
    VehicleConfig {
        mass: 1000.0,
        max_speed: 100.0,
        acceleration_force: 2000.0,
        brake_force: 10000.0,
        torque_curve: TorqueCurve::flat(),
        static_friction_threshold: 0.0,
        static_friction_multiplier: 1.0,
        grip_strength: 0.0,
        drift_allowed: false,
        drag_coefficient: 0.0,
        rolling_resistance_coefficient: 0.0,
        air_drag: 0.0,
        ground_drag: 0.0,
        turning_speed_loss: 0.0,
        downforce: 0.0,
        center_of_gravity_height: 0.0,
        ground_sample_offsets: vec![],
        wall_bounce: 0.5,
        vehicle_collision_bounce: 1.0,
        ..VehicleKind::Street.config()
    }
}

// parked just above flat ground, well within ground-check range
fn grounded_vehicle(config: VehicleConfig) -> Vehicle {
    Vehicle::new(
        config,
        EntityLocation::new(DVec3::new(0.0, 0.2, 0.0), DVec3::Z),
    )
}

fn step(vehicle: &mut Vehicle, environment: &PlaneEnvironment) {
    vehicle.do_physics_step(TICK, environment, &[], 0);
}

#[test]
fn full_throttle_for_one_second_reaches_force_over_mass() {
    // 2000 N on 1000 kg with nothing in the way: after one simulated
    // second the forward speed is F/m * t = 2 m/s
    let environment = PlaneEnvironment::flat(0.0);
    let mut vehicle = grounded_vehicle(inert_config());
    vehicle.set_inputs(InputSnapshot::new(1.0, 0.0, 0.0, false));

    for _ in 0..50 {
        step(&mut vehicle, &environment);
    }

    assert!(vehicle.is_grounded());
    assert_relative_eq!(vehicle.speed(), 2.0, epsilon = 1e-9);
    assert!(vehicle.velocity().dot(DVec3::Z) > 0.0);
}

#[test]
fn forward_speed_is_capped_at_max_speed() {
    let environment = PlaneEnvironment::flat(0.0);
    let mut vehicle = grounded_vehicle(VehicleConfig {
        max_speed: 10.0,
        acceleration_force: 50_000.0,
        ..inert_config()
    });
    vehicle.set_inputs(InputSnapshot::new(1.0, 0.0, 0.0, false));

    for _ in 0..200 {
        step(&mut vehicle, &environment);
        assert!(vehicle.velocity().dot(DVec3::Z) <= 10.0 + 1e-9);
    }
    assert_relative_eq!(vehicle.speed(), 10.0, epsilon = 1e-6);
}

#[test]
fn coast_down_decays_monotonically_and_never_reverses() {
    let environment = PlaneEnvironment::flat(0.0);
    let mut vehicle = grounded_vehicle(VehicleConfig {
        drag_coefficient: 0.35,
        rolling_resistance_coefficient: 0.015,
        ..inert_config()
    });
    vehicle.set_velocity_for_test(DVec3::Z * 20.0);

    let mut previous = 20.0;
    for _ in 0..10_000 {
        step(&mut vehicle, &environment);
        let forward_speed = vehicle.velocity().dot(DVec3::Z);
        assert!(forward_speed <= previous + 1e-12);
        assert!(forward_speed >= 0.0);
        previous = forward_speed;
    }
    // rolling resistance alone sheds ~0.15 m/s per second; 200 simulated
    // seconds is enough to ride the decay all the way down to the
    // low-speed cutoff, where coast-down stops touching the velocity
    assert!(previous < 0.11);
}

#[test]
fn braking_stops_forward_motion_but_keeps_lateral() {
    let environment = PlaneEnvironment::flat(0.0);
    let mut vehicle = grounded_vehicle(inert_config());
    vehicle.set_velocity_for_test(DVec3::new(3.0, 0.0, 15.0));
    vehicle.set_inputs(InputSnapshot::new(0.0, 1.0, 0.0, false));

    for _ in 0..200 {
        step(&mut vehicle, &environment);
    }

    let forward_speed = vehicle.velocity().dot(DVec3::Z);
    assert_relative_eq!(forward_speed, 0.0, epsilon = 1e-9);
    // a fully stopped vehicle may still carry lateral velocity
    assert!(vehicle.velocity().dot(DVec3::X) > 0.0);
}

#[test]
fn lateral_velocity_decays_under_normal_grip() {
    let environment = PlaneEnvironment::flat(0.0);
    let mut vehicle = grounded_vehicle(VehicleConfig {
        grip_strength: 4.0,
        ..inert_config()
    });
    vehicle.set_velocity_for_test(DVec3::new(5.0, 0.0, 10.0));

    for _ in 0..100 {
        step(&mut vehicle, &environment);
    }

    let lateral = vehicle.velocity().dot(DVec3::X).abs();
    assert!(lateral < 1e-6, "lateral speed still {}", lateral);
}

#[test]
fn released_steering_settles_the_yaw_rate_to_exactly_zero() {
    let environment = PlaneEnvironment::flat(0.0);
    let mut vehicle = grounded_vehicle(inert_config());
    vehicle.set_inputs(InputSnapshot::new(0.5, 0.0, 1.0, false));

    for _ in 0..100 {
        step(&mut vehicle, &environment);
    }
    assert!(vehicle.angular_velocity() > 0.0);
    assert!(vehicle.steering_angle() > 0.0);

    vehicle.set_inputs(InputSnapshot::new(0.0, 0.0, 0.0, false));
    for _ in 0..500 {
        step(&mut vehicle, &environment);
    }
    assert_eq!(vehicle.angular_velocity(), 0.0);
    assert_eq!(vehicle.steering_angle(), 0.0);
}

#[test]
fn steering_right_turns_the_nose_right() {
    let environment = PlaneEnvironment::flat(0.0);
    let mut vehicle = grounded_vehicle(inert_config());
    vehicle.set_inputs(InputSnapshot::new(0.5, 0.0, 1.0, false));

    for _ in 0..100 {
        step(&mut vehicle, &environment);
    }

    // started along +Z; right of +Z under a Y-up basis is +X
    assert!(vehicle.forward().dot(DVec3::X) > 0.0);
}

#[test]
fn airborne_vehicle_falls_and_ignores_throttle() {
    let environment = PlaneEnvironment::flat(0.0);
    let mut vehicle = Vehicle::new(
        inert_config(),
        EntityLocation::new(DVec3::new(0.0, 50.0, 0.0), DVec3::Z),
    );
    vehicle.set_inputs(InputSnapshot::new(1.0, 0.0, 0.0, false));

    for _ in 0..25 {
        step(&mut vehicle, &environment);
    }

    assert!(!vehicle.is_grounded());
    assert!(vehicle.velocity().y < -4.0); // ~half a second of gravity
    assert_relative_eq!(vehicle.velocity().dot(DVec3::Z), 0.0, epsilon = 1e-12);
}

#[test]
fn wall_bounce_never_ends_up_behind_the_wall() {
    let wall = Wall {
        point: DVec3::new(0.0, 0.0, 10.0),
        normal: -DVec3::Z,
    };
    let environment = PlaneEnvironment::with_walls(0.0, vec![wall]);
    let mut vehicle = grounded_vehicle(inert_config());
    vehicle.set_velocity_for_test(DVec3::Z * 30.0);

    let mut bounced = false;
    for _ in 0..100 {
        step(&mut vehicle, &environment);
        // always on the drivable side of the wall plane
        assert!((vehicle.position() - wall.point).dot(wall.normal) > 0.0);
        if vehicle.velocity().dot(DVec3::Z) < 0.0 {
            bounced = true;
        }
    }
    assert!(bounced);
}

#[test]
fn wall_bounce_scales_speed_by_the_bounce_multiplier() {
    let environment = PlaneEnvironment::with_walls(
        0.0,
        vec![Wall {
            point: DVec3::new(0.0, 0.0, 10.0),
            normal: -DVec3::Z,
        }],
    );
    let mut vehicle = grounded_vehicle(inert_config()); // wall_bounce 0.5
    vehicle.set_velocity_for_test(DVec3::Z * 30.0);

    for _ in 0..100 {
        step(&mut vehicle, &environment);
        if vehicle.velocity().dot(DVec3::Z) < 0.0 {
            break;
        }
    }
    assert_relative_eq!(vehicle.speed(), 15.0, epsilon = 1e-6);
}

#[test]
fn downforce_cruise_holds_ride_height() {
    // above 5 m/s the chassis is pressed onto the track; that press must
    // not ratchet the position below ride height tick after tick until
    // the ground checks stop reaching the track
    let environment = PlaneEnvironment::flat(0.0);
    let mut vehicle = grounded_vehicle(VehicleConfig {
        downforce: 2400.0,
        ..inert_config()
    });
    vehicle.set_velocity_for_test(DVec3::Z * 20.0);

    // ten simulated seconds of fast cruise
    for _ in 0..500 {
        step(&mut vehicle, &environment);
        assert!(vehicle.is_grounded());
    }
    assert!(vehicle.speed() > 5.0);
    assert_relative_eq!(vehicle.position().y, 0.2, epsilon = 1e-9);
}

#[test]
fn vehicle_overlapping_a_wall_steps_out_cleanly() {
    // a vehicle that starts the tick inside a wall is pushed back to the
    // surface in one move with the into-wall velocity shed, not bounced
    // back and forth while creeping out
    let wall = Wall {
        point: DVec3::new(0.0, 0.0, 10.0),
        normal: -DVec3::Z,
    };
    let environment = PlaneEnvironment::with_walls(0.0, vec![wall]);
    let mut vehicle = Vehicle::new(
        inert_config(),
        EntityLocation::new(DVec3::new(0.0, 0.2, 9.8), DVec3::Z),
    );
    vehicle.set_velocity_for_test(DVec3::Z * 10.0);

    for _ in 0..5 {
        step(&mut vehicle, &environment);
        assert!(vehicle.velocity().dot(DVec3::Z) >= 0.0);
    }
    // clear of the wall by the probe radius, at rest against it
    assert!((vehicle.position() - wall.point).dot(wall.normal) > 0.49);
    assert_relative_eq!(vehicle.velocity().dot(DVec3::Z), 0.0, epsilon = 1e-12);
}

#[test]
fn vehicle_collision_conserves_momentum() {
    let environment = PlaneEnvironment::flat(0.0);
    let mut simulation = Simulation::new();

    let light = simulation.add_vehicle(grounded_vehicle(VehicleConfig {
        mass: 1200.0,
        ..inert_config()
    }));
    let heavy = simulation.add_vehicle(Vehicle::new(
        VehicleConfig {
            mass: 2600.0,
            ..inert_config()
        },
        EntityLocation::new(DVec3::new(3.5, 0.2, 0.0), DVec3::Z),
    ));

    simulation
        .vehicle_mut(light)
        .unwrap()
        .set_velocity_for_test(DVec3::X * 8.0);
    simulation
        .vehicle_mut(heavy)
        .unwrap()
        .set_velocity_for_test(DVec3::X * -2.0);

    let momentum_before = 1200.0 * 8.0 + 2600.0 * -2.0;
    simulation.step(&environment, TICK);

    let v1 = simulation.vehicle(light).unwrap().velocity().x;
    let v2 = simulation.vehicle(heavy).unwrap().velocity().x;
    assert_relative_eq!(1200.0 * v1 + 2600.0 * v2, momentum_before, epsilon = 1e-6);
    // the light vehicle rebounds, the heavy one is shoved forward
    assert!(v1 < 8.0);
    assert!(v2 > -2.0);
}

#[test]
fn mismatched_bounce_presets_conserve_momentum() {
    // partners with different collision bounce values must resolve with
    // one shared factor, or the exchanged impulses stop cancelling
    let environment = PlaneEnvironment::flat(0.0);
    let mut simulation = Simulation::new();

    let soft = simulation.add_vehicle(grounded_vehicle(VehicleConfig {
        mass: 1200.0,
        vehicle_collision_bounce: 0.8,
        ..inert_config()
    }));
    let hard = simulation.add_vehicle(Vehicle::new(
        VehicleConfig {
            mass: 2600.0,
            vehicle_collision_bounce: 0.9,
            ..inert_config()
        },
        EntityLocation::new(DVec3::new(3.5, 0.2, 0.0), DVec3::Z),
    ));

    simulation
        .vehicle_mut(soft)
        .unwrap()
        .set_velocity_for_test(DVec3::X * 8.0);
    simulation
        .vehicle_mut(hard)
        .unwrap()
        .set_velocity_for_test(DVec3::X * -2.0);

    let momentum_before = 1200.0 * 8.0 + 2600.0 * -2.0;
    simulation.step(&environment, TICK);

    let v1 = simulation.vehicle(soft).unwrap().velocity().x;
    let v2 = simulation.vehicle(hard).unwrap().velocity().x;
    assert_relative_eq!(1200.0 * v1 + 2600.0 * v2, momentum_before, epsilon = 1e-6);
}

#[test]
fn overlapping_vehicles_get_pushed_apart() {
    let environment = PlaneEnvironment::flat(0.0);
    let mut simulation = Simulation::new();
    let a = simulation.add_vehicle(grounded_vehicle(inert_config()));
    let b = simulation.add_vehicle(Vehicle::new(
        inert_config(),
        EntityLocation::new(DVec3::new(2.0, 0.2, 0.0), DVec3::Z),
    ));

    simulation.step(&environment, TICK);

    let gap = simulation
        .vehicle(a)
        .unwrap()
        .position()
        .distance(simulation.vehicle(b).unwrap().position());
    assert!(gap > 2.0);
}

#[test]
fn drift_holds_more_lateral_speed_than_grip() {
    let environment = PlaneEnvironment::flat(0.0);
    let drift_config = VehicleConfig {
        grip_strength: 4.0,
        drift_allowed: true,
        drift_grip_reduction: 0.95,
        min_drift_speed: 5.0,
        drift_lateral_force: 0.0, // isolate the grip-reduction path
        ..inert_config()
    };

    let mut gripping = grounded_vehicle(drift_config.clone());
    gripping.set_velocity_for_test(DVec3::new(5.0, 0.0, 15.0));
    gripping.set_inputs(InputSnapshot::new(0.0, 0.0, 0.0, false));

    let mut drifting = grounded_vehicle(drift_config);
    drifting.set_velocity_for_test(DVec3::new(5.0, 0.0, 15.0));
    drifting.set_inputs(InputSnapshot::new(0.0, 0.0, 0.0, true));

    for _ in 0..10 {
        step(&mut gripping, &environment);
        step(&mut drifting, &environment);
    }

    assert!(drifting.is_drifting());
    assert!(!gripping.is_drifting());
    assert!(
        drifting.velocity().dot(DVec3::X).abs() > gripping.velocity().dot(DVec3::X).abs()
    );
}

#[test]
fn reset_zeroes_all_motion_state() {
    let environment = PlaneEnvironment::flat(0.0);
    let mut vehicle = grounded_vehicle(inert_config());
    vehicle.set_inputs(InputSnapshot::new(1.0, 0.0, 0.8, false));
    for _ in 0..100 {
        step(&mut vehicle, &environment);
    }
    assert!(vehicle.speed() > 0.0);
    assert!(vehicle.angular_velocity() != 0.0);

    let spawn = DVec3::new(7.0, 0.2, -3.0);
    vehicle.reset(spawn, DVec3::X);

    assert_eq!(vehicle.speed(), 0.0);
    assert_eq!(vehicle.velocity(), DVec3::ZERO);
    assert_eq!(vehicle.angular_velocity(), 0.0);
    assert_eq!(vehicle.steering_angle(), 0.0);
    assert_eq!(vehicle.position(), spawn);
    assert_eq!(vehicle.forward(), DVec3::X);
    assert_eq!(vehicle.axle_loads(), (0.5, 0.5));
}

#[test]
fn broken_config_still_simulates() {
    // an invalid config is repaired at spawn and the vehicle keeps
    // ticking; nothing panics and nothing goes NaN. Run with RUST_LOG=warn
    // to see the repair log lines.
    let _ = env_logger::builder().is_test(true).try_init();
    let environment = PlaneEnvironment::flat(0.0);
    let mut vehicle = grounded_vehicle(VehicleConfig {
        mass: -10.0,
        max_speed: 0.0,
        wheelbase: 0.0,
        ..inert_config()
    });
    vehicle.set_inputs(InputSnapshot::new(1.0, 0.0, 0.4, false));

    for _ in 0..100 {
        step(&mut vehicle, &environment);
    }

    assert!(vehicle.speed().is_finite());
    assert!(vehicle.position().is_finite());
    assert!(vehicle.speed() > 0.0);
}

#[test]
fn weight_transfer_feeds_next_ticks_grip() {
    let environment = PlaneEnvironment::flat(0.0);
    let mut vehicle = grounded_vehicle(VehicleConfig {
        center_of_gravity_height: 0.55,
        wheelbase: 2.6,
        ..inert_config()
    });
    vehicle.set_inputs(InputSnapshot::new(1.0, 0.0, 0.0, false));

    step(&mut vehicle, &environment);
    let (front, rear) = vehicle.axle_loads();
    assert!((front + rear - 1.0).abs() < 1e-12);
    assert!(rear > 0.5); // launch squats the rear axle

    // with the rear loaded, the second tick accelerates harder than the
    // first did
    let speed_after_one = vehicle.speed();
    step(&mut vehicle, &environment);
    assert!(vehicle.speed() - speed_after_one > speed_after_one);
}
