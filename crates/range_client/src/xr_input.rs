//! Desktop эмуляция XR input
//!
//! - V / кнопка "Enter VR" → SessionEvent (toggle)
//! - ЛКМ = trigger правого controller'а, ПКМ = trigger левого
//! - Оба controller'а висят перед камерой и смотрят туда же, куда она
//! - H в VR → hand tracking: раскрытые ладони на позах controllers

use bevy::prelude::*;
use range_simulation::{
    rest_pose, Controller, Handedness, RangeSet, SelectEvent, SessionEvent, TrackedHand, VrSession,
};

use crate::camera::FlyCamera;

/// Смещение controller'а от камеры (для правой руки; левая зеркалится по X)
const CONTROLLER_OFFSET: Vec3 = Vec3::new(0.25, -0.3, -0.45);

pub struct DesktopXrPlugin;

impl Plugin for DesktopXrPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EmulatedHandTracking>()
            .add_systems(Startup, spawn_enter_vr_button)
            .add_systems(
                Update,
                (
                    toggle_session,
                    update_enter_vr_label,
                    emulate_controller_poses,
                    emulate_select,
                    toggle_hand_tracking,
                    emulate_tracked_hands,
                )
                    .chain()
                    .before(RangeSet::Session),
            );
        app.add_systems(Update, attach_controller_visibility);
    }
}

/// Руки вместо controllers (H)
#[derive(Resource, Debug, Default)]
pub struct EmulatedHandTracking {
    pub active: bool,
}

/// UI кнопка входа/выхода из VR
#[derive(Component)]
pub struct EnterVrButton;

#[derive(Component)]
pub struct EnterVrLabel;

fn spawn_enter_vr_button(mut commands: Commands) {
    commands
        .spawn((
            Button,
            EnterVrButton,
            Node {
                position_type: PositionType::Absolute,
                bottom: Val::Px(20.0),
                left: Val::Percent(50.0),
                padding: UiRect::axes(Val::Px(16.0), Val::Px(8.0)),
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.6)),
        ))
        .with_child((
            EnterVrLabel,
            Text::new("ENTER VR (V)"),
            TextFont {
                font_size: 18.0,
                ..default()
            },
            TextColor(Color::WHITE),
        ));
}

/// System: V или клик по кнопке → Started/Ended
fn toggle_session(
    keys: Res<ButtonInput<KeyCode>>,
    buttons: Query<&Interaction, (Changed<Interaction>, With<EnterVrButton>)>,
    session: Res<VrSession>,
    mut session_events: EventWriter<SessionEvent>,
) {
    let clicked = buttons
        .iter()
        .any(|interaction| *interaction == Interaction::Pressed);

    if !keys.just_pressed(KeyCode::KeyV) && !clicked {
        return;
    }

    session_events.write(if session.in_vr {
        SessionEvent::Ended
    } else {
        SessionEvent::Started
    });
}

fn update_enter_vr_label(
    session: Res<VrSession>,
    mut labels: Query<&mut Text, With<EnterVrLabel>>,
) {
    if !session.is_changed() {
        return;
    }

    for mut text in labels.iter_mut() {
        text.0 = if session.in_vr {
            "EXIT VR (V)".to_string()
        } else {
            "ENTER VR (V)".to_string()
        };
    }
}

/// System: позы controllers от камеры
fn emulate_controller_poses(
    cameras: Query<&GlobalTransform, With<FlyCamera>>,
    mut controllers: Query<(&Controller, &mut Transform)>,
) {
    let Ok(camera) = cameras.single() else {
        return;
    };

    let camera = camera.compute_transform();

    for (controller, mut transform) in controllers.iter_mut() {
        let mut offset = CONTROLLER_OFFSET;
        if controller.hand == Handedness::Left {
            offset.x = -offset.x;
        }

        transform.translation = camera.translation + camera.rotation * offset;
        transform.rotation = camera.rotation;
    }
}

/// System: кнопки мыши → SelectEvent (кроме кликов по UI)
fn emulate_select(
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    interactions: Query<&Interaction>,
    mut select_events: EventWriter<SelectEvent>,
) {
    let over_ui = interactions
        .iter()
        .any(|interaction| *interaction != Interaction::None);

    for (button, hand) in [
        (MouseButton::Left, Handedness::Right),
        (MouseButton::Right, Handedness::Left),
    ] {
        if mouse_buttons.just_pressed(button) && !over_ui {
            select_events.write(SelectEvent::start(hand));
        }
        if mouse_buttons.just_released(button) {
            select_events.write(SelectEvent::end(hand));
        }
    }
}

fn toggle_hand_tracking(
    keys: Res<ButtonInput<KeyCode>>,
    mut emulation: ResMut<EmulatedHandTracking>,
) {
    if keys.just_pressed(KeyCode::KeyH) {
        emulation.active = !emulation.active;
        range_simulation::log_info(&format!(
            "✋ Hand tracking emulation {}",
            if emulation.active { "on" } else { "off" }
        ));
    }
}

/// System: TrackedHand из поз controllers (только в VR и пока эмуляция включена)
fn emulate_tracked_hands(
    emulation: Res<EmulatedHandTracking>,
    session: Res<VrSession>,
    controllers: Query<(&Controller, &Transform)>,
    mut hands: Query<&mut TrackedHand>,
) {
    let active = emulation.active && session.in_vr;

    for mut hand in hands.iter_mut() {
        let wrist = controllers
            .iter()
            .find(|(controller, _)| controller.hand == hand.hand)
            .map(|(_, transform)| *transform);

        match wrist {
            Some(wrist) if active => {
                let joints = rest_pose(hand.hand, &wrist);
                hand.track(joints);
            }
            _ if hand.tracked => hand.lose_tracking(),
            _ => {}
        }
    }
}

/// Перчатки — children controller'ов, им нужна Visibility для propagation
fn attach_controller_visibility(
    mut commands: Commands,
    controllers: Query<Entity, Added<Controller>>,
) {
    for entity in controllers.iter() {
        commands.entity(entity).insert(Visibility::default());
    }
}
