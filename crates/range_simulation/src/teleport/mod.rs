//! Teleport locomotion — camera rig + плавный переезд
//!
//! Левый trigger: Start показывает teleport луч, End прячет его и, если маркер
//! видим (точка найдена в последнем кадре), запускает RigTween к маркеру.
//! Easing: quadratic out.

use bevy::prelude::*;

use crate::aim::{AimLine, TeleportPointer};
use crate::config::RangeConfig;
use crate::logger;
use crate::xr::{Handedness, SelectEvent, SelectPhase};
use crate::RangeSet;

/// Camera group: Transform = позиция rig'а, голова смещена на head_offset
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct CameraRig {
    pub head_offset: Vec3,
}

impl CameraRig {
    /// Мировая позиция зрителя (куда разворачиваются decals)
    pub fn viewer_position(&self, rig_transform: &Transform) -> Vec3 {
        rig_transform.translation + self.head_offset
    }
}

/// Активный переезд rig'а; компонент снимается по завершении
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct RigTween {
    pub from: Vec3,
    pub to: Vec3,
    pub elapsed: f32,
    pub duration: f32,
}

impl RigTween {
    pub fn new(from: Vec3, to: Vec3, duration: f32) -> Self {
        Self {
            from,
            to,
            elapsed: 0.0,
            duration,
        }
    }

    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    /// Продвинуть на delta, вернуть новую позицию
    pub fn advance(&mut self, delta: f32) -> Vec3 {
        self.elapsed += delta;
        self.from.lerp(self.to, ease_out_quad(self.progress()))
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }
}

/// Quadratic ease-out: t × (2 − t)
pub fn ease_out_quad(t: f32) -> f32 {
    t * (2.0 - t)
}

pub struct TeleportPlugin;

impl Plugin for TeleportPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera_rig)
            .add_systems(Update, handle_left_select.in_set(RangeSet::Input))
            .add_systems(Update, advance_rig_tween.in_set(RangeSet::Locomotion));
    }
}

/// Startup system
pub fn spawn_camera_rig(mut commands: Commands, config: Res<RangeConfig>) {
    commands.spawn((
        CameraRig {
            head_offset: config.head_offset(),
        },
        Transform::from_translation(Vec3::from_array(config.rig_start)),
    ));
}

/// System: select левой руки → показать/спрятать луч, teleport на отпускании
pub fn handle_left_select(
    mut commands: Commands,
    mut select_events: EventReader<SelectEvent>,
    config: Res<RangeConfig>,
    mut pointers: Query<&mut AimLine, With<TeleportPointer>>,
    rigs: Query<(Entity, &Transform), With<CameraRig>>,
) {
    for event in select_events.read() {
        if event.hand != Handedness::Left {
            continue;
        }

        let Ok(mut line) = pointers.single_mut() else {
            logger::log_error("Teleport pointer is missing, left select ignored");
            continue;
        };

        match event.phase {
            SelectPhase::Start => line.line_visible = true,
            SelectPhase::End => {
                line.line_visible = false;

                if !line.marker_visible {
                    continue;
                }

                let Ok((rig, rig_transform)) = rigs.single() else {
                    continue;
                };

                // Новый teleport заменяет незавершённый
                commands.entity(rig).insert(RigTween::new(
                    rig_transform.translation,
                    line.marker,
                    config.teleport_duration,
                ));

                logger::log_info(&format!("🌀 Teleport → {:?}", line.marker));
            }
        }
    }
}

/// System: двигаем rig по tween
pub fn advance_rig_tween(
    mut commands: Commands,
    time: Res<Time>,
    mut rigs: Query<(Entity, &mut Transform, &mut RigTween)>,
) {
    for (entity, mut transform, mut tween) in rigs.iter_mut() {
        transform.translation = tween.advance(time.delta_secs());

        if tween.is_finished() {
            commands.entity(entity).remove::<RigTween>();
        }
    }
}
