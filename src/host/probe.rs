//! Forward ray against pickups lying in the world

use uuid::Uuid;

use crate::game::camera::ViewAngles;
use crate::game::pickup::WorldWeapons;
use crate::math::Vec3;
use crate::ports::{HitTag, PickupProbe, RayHit};

/// Radius of the sphere each pickup is tested as
pub const PICKUP_RADIUS: f32 = 0.5;

/// Ray hits captured before the controller tick so the world can be
/// borrowed mutably during it
#[derive(Debug, Clone, Default)]
pub struct SceneProbe {
    hits: Vec<(Uuid, f32)>,
}

impl SceneProbe {
    /// Cast from `origin` along the view direction
    pub fn capture(world: &WorldWeapons, origin: Vec3, view: ViewAngles) -> Self {
        let direction = view_direction(view);
        let mut hits: Vec<(Uuid, f32)> = world
            .iter()
            .filter_map(|pickup| {
                ray_sphere(origin, direction, pickup.position, PICKUP_RADIUS)
                    .map(|distance| (pickup.id, distance))
            })
            .collect();
        hits.sort_by(|a, b| a.1.total_cmp(&b.1));
        Self { hits }
    }

    /// Nothing in view
    pub fn empty() -> Self {
        Self::default()
    }
}

impl PickupProbe for SceneProbe {
    fn cast_forward(&self, max_distance: f32) -> Option<RayHit> {
        self.hits
            .first()
            .filter(|(_, distance)| *distance <= max_distance)
            .map(|(id, distance)| RayHit {
                distance: *distance,
                tag: HitTag::Pickup(*id),
            })
    }
}

/// Unit view vector; positive pitch looks down
pub fn view_direction(view: ViewAngles) -> Vec3 {
    let pitch = view.pitch.to_radians();
    let flat = Vec3::forward_from_yaw(view.yaw);
    Vec3::new(flat.x * pitch.cos(), -pitch.sin(), flat.z * pitch.cos())
}

/// Distance along a unit ray to the first sphere intersection
fn ray_sphere(origin: Vec3, direction: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let to_center = center.sub(origin);
    let along = to_center.dot(direction);
    let miss_sq = to_center.dot(to_center) - along * along;
    let radius_sq = radius * radius;
    if miss_sq > radius_sq {
        return None;
    }

    let half_chord = (radius_sq - miss_sq).sqrt();
    let near = along - half_chord;
    let far = along + half_chord;
    if far < 0.0 {
        None
    } else {
        Some(near.max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::weapon::{WeaponInstance, WeaponStats};

    #[test]
    fn nearest_pickup_in_front_is_hit() {
        let mut world = WorldWeapons::new(1);
        let far = world.place(WeaponInstance::new(WeaponStats::rifle()), Vec3::new(0.0, 1.0, 6.0), 0.0);
        let near = world.place(WeaponInstance::new(WeaponStats::pistol()), Vec3::new(0.0, 1.0, 2.0), 0.0);
        world.place(WeaponInstance::new(WeaponStats::knife()), Vec3::new(0.0, 1.0, -2.0), 0.0);

        let probe = SceneProbe::capture(&world, Vec3::new(0.0, 1.0, 0.0), ViewAngles::default());
        let hit = probe.cast_forward(3.0).unwrap();
        assert_eq!(hit.tag, HitTag::Pickup(near));
        assert!((hit.distance - 1.5).abs() < 1e-4);

        // The far one is only reachable with a longer ray once the near one is gone
        world.take(near);
        let probe = SceneProbe::capture(&world, Vec3::new(0.0, 1.0, 0.0), ViewAngles::default());
        assert!(probe.cast_forward(3.0).is_none());
        assert_eq!(probe.cast_forward(10.0).unwrap().tag, HitTag::Pickup(far));
    }

    #[test]
    fn looking_down_shifts_the_ray() {
        let dir = view_direction(ViewAngles {
            pitch: 90.0,
            yaw: 0.0,
        });
        assert!((dir.y + 1.0).abs() < 1e-5);
        assert!(SceneProbe::empty().cast_forward(100.0).is_none());
    }
}
