use glam::DVec3;

pub const LAYER_GROUND: u32 = 1 << 0;
pub const LAYER_WALL: u32 = 1 << 1;
pub const LAYER_ALL: u32 = u32::MAX;

#[derive(Copy, Clone, Debug)]
pub struct RaycastHit {
    pub point: DVec3,
    pub normal: DVec3,
    pub distance: f64,
}

/// The simulation never talks to a physics or rendering engine directly;
/// anything that can answer these two point-in-time queries (a real
/// scene, or a couple of planes in a test) can host it.
pub trait Environment {
    fn raycast(
        &self,
        origin: DVec3,
        direction: DVec3,
        max_distance: f64,
        layer_mask: u32,
    ) -> Option<RaycastHit>;

    fn sphere_cast(
        &self,
        origin: DVec3,
        radius: f64,
        direction: DVec3,
        max_distance: f64,
    ) -> Option<RaycastHit>;
}

/// An infinite plane through `point` facing `normal`; the drivable side
/// is the one the normal points toward.
#[derive(Copy, Clone, Debug)]
pub struct Wall {
    pub point: DVec3,
    pub normal: DVec3,
}

/// Flat ground at a fixed height plus vertical wall planes. Enough track
/// for headless runs and the physics tests; a game wraps its own scene
/// queries in [`Environment`] instead.
pub struct PlaneEnvironment {
    pub ground_height: f64,
    pub walls: Vec<Wall>,
}

impl PlaneEnvironment {
    pub fn flat(ground_height: f64) -> PlaneEnvironment {
        PlaneEnvironment {
            ground_height,
            walls: Vec::new(),
        }
    }

    pub fn with_walls(ground_height: f64, walls: Vec<Wall>) -> PlaneEnvironment {
        PlaneEnvironment {
            ground_height,
            walls,
        }
    }

    fn ground_hit(&self, origin: DVec3, direction: DVec3, max_distance: f64) -> Option<RaycastHit> {
        if direction.y.abs() < 1e-9 {
            return None;
        }
        let t = (self.ground_height - origin.y) / direction.y;
        if t < 0.0 || t > max_distance {
            return None;
        }
        Some(RaycastHit {
            point: origin + direction * t,
            normal: DVec3::Y,
            distance: t,
        })
    }

    // nearest wall plane the swept sphere touches; a sphere of radius 0
    // degenerates to a plain ray
    fn wall_hit(
        &self,
        origin: DVec3,
        radius: f64,
        direction: DVec3,
        max_distance: f64,
    ) -> Option<RaycastHit> {
        let mut nearest: Option<RaycastHit> = None;
        for wall in &self.walls {
            let closing = direction.dot(wall.normal);
            if closing >= -1e-9 {
                continue; // moving along or away from the wall
            }
            let separation = (origin - wall.point).dot(wall.normal) - radius;
            let candidate = if separation < 0.0 {
                // already overlapping: a zero-distance contact, with the
                // point placed where the center would touch the surface so
                // callers can depenetrate in one move
                RaycastHit {
                    point: origin - wall.normal * separation,
                    normal: wall.normal,
                    distance: 0.0,
                }
            } else {
                let t = separation / -closing;
                if t > max_distance {
                    continue;
                }
                RaycastHit {
                    point: origin + direction * t,
                    normal: wall.normal,
                    distance: t,
                }
            };
            if nearest.map_or(true, |hit| candidate.distance < hit.distance) {
                nearest = Some(candidate);
            }
        }
        nearest
    }
}

impl Environment for PlaneEnvironment {
    fn raycast(
        &self,
        origin: DVec3,
        direction: DVec3,
        max_distance: f64,
        layer_mask: u32,
    ) -> Option<RaycastHit> {
        let ground = if layer_mask & LAYER_GROUND != 0 {
            self.ground_hit(origin, direction, max_distance)
        } else {
            None
        };
        let wall = if layer_mask & LAYER_WALL != 0 {
            self.wall_hit(origin, 0.0, direction, max_distance)
        } else {
            None
        };
        match (ground, wall) {
            (Some(g), Some(w)) => Some(if g.distance <= w.distance { g } else { w }),
            (hit, None) | (None, hit) => hit,
        }
    }

    fn sphere_cast(
        &self,
        origin: DVec3,
        radius: f64,
        direction: DVec3,
        max_distance: f64,
    ) -> Option<RaycastHit> {
        self.wall_hit(origin, radius, direction, max_distance)
    }
}
