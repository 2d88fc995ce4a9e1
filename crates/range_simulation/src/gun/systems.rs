//! Gun systems: trigger правой руки, поза пистолета в руке

use bevy::prelude::*;

use super::{FireRequested, Gun, GunAction, GunState};
use crate::config::RangeConfig;
use crate::logger;
use crate::xr::{Controller, HandModel, Handedness, SelectEvent, SelectPhase};

/// System: select правой руки → grab или fire
///
/// - Ungrabbed: переход в Grabbed, перчатка правой руки прячется, пули нет
/// - Grabbed: ровно один FireRequested на нажатие
/// - SelectPhase::End правой руки ничего не делает
pub fn handle_right_select(
    mut select_events: EventReader<SelectEvent>,
    mut state: ResMut<GunState>,
    mut hand_models: Query<&mut HandModel>,
    mut fire_requests: EventWriter<FireRequested>,
) {
    for event in select_events.read() {
        if event.hand != Handedness::Right || event.phase != SelectPhase::Start {
            continue;
        }

        match state.on_select_start() {
            GunAction::Grab => {
                for mut model in hand_models.iter_mut() {
                    if model.hand == Handedness::Right {
                        model.visible = false;
                    }
                }
                logger::log_info("✋ Gun grabbed by right controller");
            }
            GunAction::Fire => {
                fire_requests.write(FireRequested);
            }
        }
    }
}

/// System: пистолет в руке повторяет позу правого controller'а (+ grip offset)
///
/// Пистолет может быть ещё не загружен даже после захвата — тогда пропуск.
pub fn follow_controller(
    state: Res<GunState>,
    config: Res<RangeConfig>,
    controllers: Query<(&Controller, &Transform)>,
    mut guns: Query<&mut Transform, (With<Gun>, Without<Controller>)>,
) {
    if !state.is_grabbed() {
        return;
    }

    let Ok(mut gun_transform) = guns.single_mut() else {
        return;
    };

    let Some((_, controller_transform)) = controllers
        .iter()
        .find(|(controller, _)| controller.hand == Handedness::Right)
    else {
        return;
    };

    let (position, rotation) = Gun::grip_pose(controller_transform, &config);
    gun_transform.translation = position;
    gun_transform.rotation = rotation;
}
