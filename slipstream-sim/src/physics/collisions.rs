use glam::DVec3;

/// Pre-tick view of one vehicle, shared with every other vehicle being
/// stepped this tick. Collision outcomes are computed from these frozen
/// values so they cannot depend on the order vehicles are stepped in.
#[derive(Copy, Clone, Debug)]
pub struct BodySnapshot {
    pub position: DVec3,
    pub velocity: DVec3,
    pub mass: f64,
    pub radius: f64,
    pub bounce: f64,
}

// mirror the velocity about the surface normal, keeping `bounce` of it
pub fn reflect_off_wall(velocity: DVec3, normal: DVec3, bounce: f64) -> DVec3 {
    (velocity - 2.0 * velocity.dot(normal) * normal) * bounce
}

/// New velocity for `this` after a 1-D elastic exchange with `other`
/// along the axis between their centers, per
/// https://en.wikipedia.org/wiki/Elastic_collision. The formula is
/// symmetric, so each member of a colliding pair calls this once with
/// pre-tick snapshots and both see a consistent, momentum-conserving
/// exchange without either having to mutate the other.
///
/// The exchanged deltas are scaled by the softer member's bounce; both
/// sides of the pair must use the same factor or the impulses stop
/// being equal and opposite and momentum leaks.
pub fn elastic_collision_velocity(this: &BodySnapshot, other: &BodySnapshot) -> DVec3 {
    let axis = (this.position - other.position).normalize_or_zero();
    if axis == DVec3::ZERO {
        // perfectly coincident centers leave no axis to exchange along
        return this.velocity;
    }
    let bounce = this.bounce.min(other.bounce);
    let v1 = this.velocity.dot(axis);
    let v2 = other.velocity.dot(axis);
    let (m1, m2) = (this.mass, other.mass);
    let v1_after = ((m1 - m2) * v1 + 2.0 * m2 * v2) / (m1 + m2);
    this.velocity + axis * ((v1_after - v1) * bounce)
}

/// A pair that has already exchanged velocity is drifting apart; only an
/// approaching pair should be resolved, otherwise resting contact gets
/// re-resolved every tick and the pair glues together.
pub fn is_approaching(this: &BodySnapshot, other: &BodySnapshot) -> bool {
    (this.velocity - other.velocity).dot(this.position - other.position) < 0.0
}

/// Half of the overlap along the center axis. Each member applies its own
/// half so the pair separates symmetrically.
pub fn separation_push(this: &BodySnapshot, other: &BodySnapshot) -> DVec3 {
    let contact_distance = this.radius + other.radius;
    let offset = this.position - other.position;
    let distance = offset.length();
    if distance >= contact_distance || distance < 1e-9 {
        return DVec3::ZERO;
    }
    (offset / distance) * ((contact_distance - distance) * 0.5)
}
