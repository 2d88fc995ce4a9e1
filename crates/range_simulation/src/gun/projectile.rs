//! Projectiles: spawn по FireRequested, линейный полёт, попадание в мишень
//!
//! # Lifecycle
//! 1. `spawn_projectiles` — FireRequested → entity + запись в ProjectileRegistry
//! 2. `advance_projectiles` — position += dir × speed × dt, active_time += dt
//! 3. active_time > arming_time → `resolve_collision` (луч вдоль направления)
//! 4. Попадание → ProjectileHit, despawn, unregister (больше никогда не проверяется)
//!
//! Без попадания пуля живёт вечно, если `max_flight_time` не задан.

use std::collections::HashMap;

use bevy::prelude::*;
use bevy_rapier3d::prelude::Collider;

use super::{FireRequested, Gun, Target};
use crate::config::RangeConfig;
use crate::logger;
use crate::raycast::{cast_ray, RayHit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Reflect)]
pub struct ProjectileId(pub u64);

/// Пуля в полёте (Transform = позиция)
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Projectile {
    pub id: ProjectileId,
    /// Unit vector
    pub direction: Vec3,
    /// Секунды с момента выстрела
    pub active_time: f32,
}

impl Projectile {
    pub fn new(id: ProjectileId, direction: Vec3) -> Self {
        Self {
            id,
            direction: direction.normalize_or_zero(),
            active_time: 0.0,
        }
    }

    /// Один кадр полёта
    pub fn advance(&mut self, transform: &mut Transform, speed: f32, delta: f32) {
        transform.translation += self.direction * speed * delta;
        self.active_time += delta;
    }

    /// Пора ли проверять попадание
    pub fn is_armed(&self, arming_time: f32) -> bool {
        self.active_time > arming_time
    }
}

/// Registry живых пуль: ProjectileId → Entity
///
/// Единственный способ узнать "это пуля" — запись здесь (и компонент Projectile),
/// никакой инспекции геометрии.
#[derive(Resource, Debug, Default)]
pub struct ProjectileRegistry {
    live: HashMap<ProjectileId, Entity>,
    next_id: u64,
}

impl ProjectileRegistry {
    pub fn allocate_id(&mut self) -> ProjectileId {
        let id = ProjectileId(self.next_id);
        self.next_id += 1;
        id
    }

    pub fn register(&mut self, id: ProjectileId, entity: Entity) {
        self.live.insert(id, entity);
        logger::log(&format!("📋 Registered projectile {:?} → {:?}", id, entity));
    }

    pub fn unregister(&mut self, id: ProjectileId) -> Option<Entity> {
        let removed = self.live.remove(&id);
        if removed.is_some() {
            logger::log(&format!("🗑️ Unregistered projectile {:?}", id));
        }
        removed
    }

    pub fn get(&self, id: ProjectileId) -> Option<Entity> {
        self.live.get(&id).copied()
    }

    pub fn contains(&self, id: ProjectileId) -> bool {
        self.live.contains_key(&id)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Сколько пуль выпущено за сессию
    pub fn fired_total(&self) -> u64 {
        self.next_id
    }
}

/// Event: пуля выпущена
#[derive(Event, Debug, Clone, Copy)]
pub struct ProjectileSpawned {
    pub id: ProjectileId,
    pub entity: Entity,
    pub origin: Vec3,
    pub direction: Vec3,
}

/// Event: пуля попала в мишень (пуля уже удалена)
#[derive(Event, Debug, Clone, Copy)]
pub struct ProjectileHit {
    pub id: ProjectileId,
    pub target: Entity,
    pub point: Vec3,
}

/// Event: пуля удалена по `max_flight_time`
#[derive(Event, Debug, Clone, Copy)]
pub struct ProjectileExpired {
    pub id: ProjectileId,
}

/// System: FireRequested → пуля из ствола
///
/// Пистолет ещё не загружен → выстрел теряется (warning).
pub fn spawn_projectiles(
    mut commands: Commands,
    mut fire_requests: EventReader<FireRequested>,
    config: Res<RangeConfig>,
    guns: Query<&Transform, With<Gun>>,
    mut registry: ResMut<ProjectileRegistry>,
    mut spawned_events: EventWriter<ProjectileSpawned>,
) {
    for _ in fire_requests.read() {
        let Ok(gun_transform) = guns.single() else {
            logger::log_warning("⚠️ Fire requested but gun is not loaded, shot dropped");
            continue;
        };

        let (origin, direction) = Gun::muzzle_ray(gun_transform, &config);
        let id = registry.allocate_id();
        let entity = commands
            .spawn((
                Projectile::new(id, direction),
                Transform::from_translation(origin),
            ))
            .id();
        registry.register(id, entity);

        spawned_events.write(ProjectileSpawned {
            id,
            entity,
            origin,
            direction,
        });

        logger::log(&format!(
            "🔫 Fired projectile {:?} from {:?} dir={:?}",
            id, origin, direction
        ));
    }
}

/// Collision check одной пули против мишеней
///
/// `None` если пуля ещё не взведена (active_time ≤ min_arming_time),
/// мишени нет, или луч мимо.
pub fn resolve_collision<'a>(
    projectile: &Projectile,
    position: Vec3,
    config: &RangeConfig,
    targets: impl IntoIterator<Item = (Entity, &'a Collider, &'a Transform)>,
) -> Option<RayHit> {
    if projectile.active_time <= config.min_arming_time {
        return None;
    }

    cast_ray(targets, position, projectile.direction, config.hit_ray_length)
}

/// System: полёт + попадания + (опционально) истечение времени жизни
pub fn advance_projectiles(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<RangeConfig>,
    mut registry: ResMut<ProjectileRegistry>,
    mut projectiles: Query<(Entity, &mut Projectile, &mut Transform)>,
    targets: Query<(Entity, &Collider, &Transform), (With<Target>, Without<Projectile>)>,
    mut hit_events: EventWriter<ProjectileHit>,
    mut expired_events: EventWriter<ProjectileExpired>,
) {
    let delta = time.delta_secs();

    for (entity, mut projectile, mut transform) in projectiles.iter_mut() {
        projectile.advance(&mut transform, config.bullet_speed, delta);

        if projectile.is_armed(config.arming_time) {
            if let Some(hit) =
                resolve_collision(&projectile, transform.translation, &config, targets.iter())
            {
                registry.unregister(projectile.id);
                commands.entity(entity).despawn();

                hit_events.write(ProjectileHit {
                    id: projectile.id,
                    target: hit.entity,
                    point: hit.point,
                });

                logger::log_info(&format!(
                    "🎯 Projectile {:?} hit target at {:?}",
                    projectile.id, hit.point
                ));
                continue;
            }
        }

        if let Some(max_flight_time) = config.max_flight_time {
            if projectile.active_time > max_flight_time {
                registry.unregister(projectile.id);
                commands.entity(entity).despawn();
                expired_events.write(ProjectileExpired { id: projectile.id });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target_board() -> (Entity, Collider, Transform) {
        (
            Entity::from_raw(10),
            Collider::cuboid(0.05, 0.8, 0.6),
            Transform::from_xyz(0.0, 1.5, -5.0)
                .with_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)),
        )
    }

    #[test]
    fn test_advance_moves_along_direction() {
        let mut projectile = Projectile::new(ProjectileId(0), Vec3::NEG_Z * 4.0);
        let mut transform = Transform::IDENTITY;

        projectile.advance(&mut transform, 6.0, 0.5);

        assert_eq!(transform.translation, Vec3::new(0.0, 0.0, -3.0));
        assert_eq!(projectile.active_time, 0.5);
    }

    #[test]
    fn test_arming_is_strict() {
        let mut projectile = Projectile::new(ProjectileId(0), Vec3::X);
        projectile.active_time = 0.5;
        assert!(!projectile.is_armed(0.5));

        projectile.active_time = 0.625;
        assert!(projectile.is_armed(0.5));
    }

    #[test]
    fn test_unarmed_projectile_never_collides() {
        let config = RangeConfig::default();
        let (entity, collider, transform) = target_board();

        let mut projectile = Projectile::new(ProjectileId(0), Vec3::NEG_Z);
        projectile.active_time = 0.1;

        let hit = resolve_collision(
            &projectile,
            Vec3::new(0.0, 1.5, 0.0),
            &config,
            [(entity, &collider, &transform)],
        );
        assert!(hit.is_none());
    }

    #[test]
    fn test_armed_projectile_hits_board() {
        let config = RangeConfig::default();
        let (entity, collider, transform) = target_board();

        let mut projectile = Projectile::new(ProjectileId(0), Vec3::NEG_Z);
        projectile.active_time = 0.75;

        let hit = resolve_collision(
            &projectile,
            Vec3::new(0.0, 1.5, -3.0),
            &config,
            [(entity, &collider, &transform)],
        )
        .expect("armed projectile aimed at the board must hit");

        assert_eq!(hit.entity, entity);
        assert!((hit.point.z + 4.95).abs() < 1e-3, "point = {:?}", hit.point);
    }

    #[test]
    fn test_no_target_no_hit() {
        let config = RangeConfig::default();
        let mut projectile = Projectile::new(ProjectileId(0), Vec3::NEG_Z);
        projectile.active_time = 1.0;

        let no_targets: Vec<(Entity, &Collider, &Transform)> = Vec::new();
        let hit = resolve_collision(&projectile, Vec3::ZERO, &config, no_targets);
        assert!(hit.is_none());
    }

    #[test]
    fn test_registry_tracks_live_projectiles() {
        let mut registry = ProjectileRegistry::default();
        let a = registry.allocate_id();
        let b = registry.allocate_id();
        assert_ne!(a, b);

        registry.register(a, Entity::from_raw(1));
        registry.register(b, Entity::from_raw(2));
        assert_eq!(registry.live_count(), 2);

        assert_eq!(registry.unregister(a), Some(Entity::from_raw(1)));
        assert_eq!(registry.unregister(a), None);
        assert!(!registry.contains(a));
        assert_eq!(registry.get(b), Some(Entity::from_raw(2)));
        assert_eq!(registry.fired_total(), 2);
    }
}
