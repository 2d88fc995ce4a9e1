//! Ray queries против collider shapes
//!
//! Без RapierPhysicsPlugin: collider'ы статичны (или двигаются нами напрямую),
//! поэтому достаточно `Collider::cast_ray` по позе из Transform.
//! Scale из Transform НЕ применяется — collider задаётся в мировом размере.

use bevy::prelude::*;
use bevy_rapier3d::prelude::Collider;

/// Ближайшее пересечение луча
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub entity: Entity,
    pub point: Vec3,
    pub distance: f32,
}

/// Луч против набора collider'ов, возвращает первое (ближайшее) пересечение.
///
/// `direction` нормализуется; нулевое направление → `None`.
pub fn cast_ray<'a>(
    colliders: impl IntoIterator<Item = (Entity, &'a Collider, &'a Transform)>,
    origin: Vec3,
    direction: Vec3,
    max_distance: f32,
) -> Option<RayHit> {
    let direction = direction.try_normalize()?;

    colliders
        .into_iter()
        .filter_map(|(entity, collider, transform)| {
            collider
                .cast_ray(
                    transform.translation,
                    transform.rotation,
                    origin,
                    direction,
                    max_distance,
                    true,
                )
                .map(|distance| RayHit {
                    entity,
                    point: origin + direction * distance,
                    distance,
                })
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}
