//! Controllers + select events dispatcher
//!
//! Каждый controller — entity с `Controller { hand }` и Transform позой
//! (пишется XR runtime / эмуляцией). Нажатия приходят как `SelectEvent`
//! с тегом руки; подписчики (teleport — левая, gun — правая) сами фильтруют
//! по `hand`. Controller ничего не знает о своих подписчиках.

use std::f32::consts::PI;

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum Handedness {
    Left,
    Right,
}

/// Tracked controller (поза в Transform)
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Controller {
    pub hand: Handedness,
}

impl Controller {
    /// Луч "вперёд" из controller'а: (origin, unit direction)
    pub fn aim_ray(transform: &Transform) -> (Vec3, Vec3) {
        (transform.translation, transform.forward().as_vec3())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum SelectPhase {
    Start,
    End,
}

/// Event: primary action controller'а (trigger)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectEvent {
    pub hand: Handedness,
    pub phase: SelectPhase,
}

impl SelectEvent {
    pub fn start(hand: Handedness) -> Self {
        Self {
            hand,
            phase: SelectPhase::Start,
        }
    }

    pub fn end(hand: Handedness) -> Self {
        Self {
            hand,
            phase: SelectPhase::End,
        }
    }
}

/// Визуальная перчатка на controller'е
///
/// Transform — локальный относительно controller'а (клиент делает её child).
/// `visible = false` после захвата пистолета правой рукой.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct HandModel {
    pub controller: Entity,
    pub hand: Handedness,
    pub visible: bool,
}

impl HandModel {
    /// Локальная поза перчатки: повёрнута на π вокруг Y, левая зеркалится по X
    pub fn local_transform(hand: Handedness, scale: f32) -> Transform {
        let mut scale = Vec3::splat(scale);
        if hand == Handedness::Left {
            scale.x *= -1.0;
        }

        Transform {
            translation: Vec3::ZERO,
            rotation: Quat::from_rotation_y(PI),
            scale,
        }
    }
}

/// Startup system: по одному controller'у на руку
pub fn spawn_controllers(mut commands: Commands) {
    for hand in [Handedness::Left, Handedness::Right] {
        commands.spawn((Controller { hand }, Transform::default()));
    }
}
