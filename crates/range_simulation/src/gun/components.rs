//! Gun / Target компоненты и grab→fire state machine

use bevy::prelude::*;

use crate::config::RangeConfig;

/// Состояние пистолета (одно на сессию)
///
/// Переход только `Ungrabbed → Grabbed`; отпустить пистолет нельзя.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Resource)]
pub enum GunState {
    #[default]
    Ungrabbed,
    Grabbed,
}

/// Что сделал trigger правой руки
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GunAction {
    Grab,
    Fire,
}

impl GunState {
    pub fn is_grabbed(&self) -> bool {
        matches!(self, GunState::Grabbed)
    }

    /// Один и тот же trigger: первый раз хватает, дальше стреляет
    pub fn on_select_start(&mut self) -> GunAction {
        match self {
            GunState::Ungrabbed => {
                *self = GunState::Grabbed;
                GunAction::Grab
            }
            GunState::Grabbed => GunAction::Fire,
        }
    }
}

/// Модель пистолета (Transform = мировая поза)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Gun;

impl Gun {
    /// Поза пистолета в руке: позиция controller'а, поворот controller × grip
    pub fn grip_pose(controller: &Transform, config: &RangeConfig) -> (Vec3, Quat) {
        (
            controller.translation,
            controller.rotation * config.grip_rotation(),
        )
    }

    /// Луч ствола: (позиция пистолета, ось muzzle повёрнутая позой пистолета)
    pub fn muzzle_ray(transform: &Transform, config: &RangeConfig) -> (Vec3, Vec3) {
        (
            transform.translation,
            (transform.rotation * config.muzzle_axis()).normalize(),
        )
    }
}

/// Мишень — только поверхность для ray test
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Target;

/// Event: gun state machine просит выстрел (потребитель — spawn_projectiles)
#[derive(Event, Debug, Clone, Copy, Default)]
pub struct FireRequested;
