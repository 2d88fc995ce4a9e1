//! Aim lines — teleport pointer (левая рука) и gun-sight pointer (правая)
//!
//! Каждый pointer — entity с `AimLine` (линия + маркер) и role-маркером.
//! Концы пересчитываются каждый кадр из поз controller'ов / пистолета,
//! клиент только рисует.

use bevy::prelude::*;
use bevy_rapier3d::prelude::Collider;

use crate::assets::Raycastable;
use crate::config::RangeConfig;
use crate::gun::{follow_controller, Gun, GunState};
use crate::raycast::cast_ray;
use crate::session::VrSession;
use crate::xr::{Controller, Handedness};
use crate::RangeSet;

/// Цвет линии (клиент маппит в Color)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum PointerTint {
    /// Синий teleport луч
    Teleport,
    /// Зелёный — ни во что не целимся
    Idle,
    /// Красный — луч упёрся в пистолет, можно хватать
    Interactable,
}

/// Линия от руки/ствола + маркер в точке прицеливания
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct AimLine {
    pub start: Vec3,
    pub end: Vec3,
    pub tint: PointerTint,
    pub line_visible: bool,
    pub marker: Vec3,
    pub marker_visible: bool,
    /// Во что упирается луч (только pointer до захвата)
    pub pointed: Option<Entity>,
}

impl AimLine {
    pub fn new(tint: PointerTint) -> Self {
        Self {
            start: Vec3::ZERO,
            end: Vec3::new(0.0, 0.0, -5.0),
            tint,
            line_visible: true,
            marker: Vec3::ZERO,
            marker_visible: false,
            pointed: None,
        }
    }

    /// Луч во что-то попал: линия до точки, маркер в точке
    pub fn point_at(&mut self, start: Vec3, hit_point: Vec3, entity: Entity) {
        self.start = start;
        self.end = hit_point;
        self.marker = hit_point;
        self.marker_visible = true;
        self.pointed = Some(entity);
    }

    /// Промах: линия фиксированной длины, маркер скрыт
    pub fn point_into_void(&mut self, start: Vec3, direction: Vec3, length: f32) {
        self.start = start;
        self.end = start + direction.normalize_or_zero() * length;
        self.marker_visible = false;
        self.pointed = None;
    }
}

/// Role: teleport pointer левой руки
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct TeleportPointer;

/// Role: pointer правой руки (до захвата) / прицел (после)
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct GunSightPointer;

pub struct AimPlugin;

impl Plugin for AimPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_pointers)
            .add_systems(Update, update_teleport_pointer.in_set(RangeSet::Locomotion))
            .add_systems(
                Update,
                update_gun_sight_pointer
                    .after(follow_controller)
                    .in_set(RangeSet::Gun),
            );
    }
}

/// Startup system
pub fn spawn_pointers(mut commands: Commands) {
    commands.spawn((AimLine::new(PointerTint::Teleport), TeleportPointer));
    commands.spawn((AimLine::new(PointerTint::Idle), GunSightPointer));
}

/// System: teleport луч левой руки против геометрии комнаты
///
/// Только в VR. Маркер видим ⇔ луч нашёл точку телепорта в этом кадре.
pub fn update_teleport_pointer(
    session: Res<VrSession>,
    config: Res<RangeConfig>,
    controllers: Query<(&Controller, &Transform)>,
    room: Query<(Entity, &Collider, &Transform), With<Raycastable>>,
    mut pointers: Query<&mut AimLine, With<TeleportPointer>>,
) {
    if !session.in_vr {
        return;
    }

    let Ok(mut line) = pointers.single_mut() else {
        return;
    };

    let Some((_, controller_transform)) = controllers
        .iter()
        .find(|(controller, _)| controller.hand == Handedness::Left)
    else {
        return;
    };

    let (origin, direction) = Controller::aim_ray(controller_transform);

    match cast_ray(room.iter(), origin, direction, config.hit_ray_length) {
        Some(hit) => line.point_at(origin, hit.point, hit.entity),
        None => line.point_into_void(origin, direction, config.pointer_length),
    }
}

/// System: pointer правой руки
///
/// - До захвата (только в VR): луч controller'а против пистолета.
///   Попали → красная линия + маркер; мимо → зелёная линия длины pointer_length.
/// - После захвата: прицел из ствола, маркер всегда на sight_length
///   (без проверки мишени — это прицельная метка, не preview попадания).
pub fn update_gun_sight_pointer(
    state: Res<GunState>,
    session: Res<VrSession>,
    config: Res<RangeConfig>,
    controllers: Query<(&Controller, &Transform)>,
    guns: Query<(Entity, &Collider, &Transform), With<Gun>>,
    mut pointers: Query<&mut AimLine, With<GunSightPointer>>,
) {
    let Ok(mut line) = pointers.single_mut() else {
        return;
    };

    if state.is_grabbed() {
        let Ok((_, _, gun_transform)) = guns.single() else {
            return;
        };

        let (origin, direction) = Gun::muzzle_ray(gun_transform, &config);
        let sight = origin + direction * config.sight_length;

        line.start = origin;
        line.end = sight;
        line.marker = sight;
        line.marker_visible = true;
        line.pointed = None;
        return;
    }

    if !session.in_vr {
        return;
    }

    let Some((_, controller_transform)) = controllers
        .iter()
        .find(|(controller, _)| controller.hand == Handedness::Right)
    else {
        return;
    };

    let (origin, direction) = Controller::aim_ray(controller_transform);

    match cast_ray(guns.iter(), origin, direction, config.hit_ray_length) {
        Some(hit) => {
            line.point_at(origin, hit.point, hit.entity);
            line.tint = PointerTint::Interactable;
        }
        None => {
            line.point_into_void(origin, direction, config.pointer_length);
            line.tint = PointerTint::Idle;
        }
    }
    line.line_visible = true;
}
