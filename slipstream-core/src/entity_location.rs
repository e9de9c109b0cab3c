use glam::{DQuat, DVec3};

// EntityLocation is the renderable pose of a vehicle: where it is, and a
// forward/up basis == which way to draw it
#[derive(Copy, Clone, Debug)]
pub struct EntityLocation {
    pub position: DVec3,
    pub unit_forward_direction: DVec3, // should be a normalized vector
    pub unit_upward_direction: DVec3,  // likewise
}

impl EntityLocation {
    pub fn new(position: DVec3, forward: DVec3) -> EntityLocation {
        let unit_forward = forward.normalize_or_zero();
        EntityLocation {
            position,
            unit_forward_direction: if unit_forward == DVec3::ZERO {
                DVec3::Z
            } else {
                unit_forward
            },
            unit_upward_direction: DVec3::Y,
        }
    }

    // right-handed basis: up cross forward. Falls back to X when the
    // basis is degenerate (forward pointing straight up) so we never hand
    // out NaNs
    pub fn unit_right_direction(&self) -> DVec3 {
        let right = self
            .unit_upward_direction
            .cross(self.unit_forward_direction);
        if right.length_squared() < 1e-12 {
            DVec3::X
        } else {
            right.normalize()
        }
    }

    // rotate the heading by `radians` of yaw around the vehicle's own up
    // axis; positive yaw turns the nose toward unit_right_direction
    pub fn rotate_yaw(&mut self, radians: f64) {
        let rotation = DQuat::from_axis_angle(self.unit_upward_direction, radians);
        self.unit_forward_direction = (rotation * self.unit_forward_direction).normalize();
    }
}
