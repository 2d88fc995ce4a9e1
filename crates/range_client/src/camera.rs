use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;
use range_simulation::{CameraRig, RangeSet};

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                attach_camera_to_rig,
                fly_camera_controls,
                update_camera_transform,
                sync_head_offset,
            )
                .chain()
                .before(RangeSet::Session),
        );
    }
}

/// Голова зрителя внутри CameraRig (teleport двигает rig, камера едет с ним)
#[derive(Component)]
pub struct FlyCamera {
    pub yaw: f32,   // Horizontal rotation (radians)
    pub pitch: f32, // Vertical rotation (radians)
    pub sensitivity: f32,
    pub move_speed: f32,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self {
            yaw: 0.0,
            pitch: 0.0,
            sensitivity: 0.005,
            move_speed: 2.0,
        }
    }
}

/// Камера spawn'ится child'ом rig'а, локальная позиция = head_offset
fn attach_camera_to_rig(
    mut commands: Commands,
    rigs: Query<(Entity, &CameraRig), Added<CameraRig>>,
) {
    for (rig_entity, rig) in rigs.iter() {
        let camera = commands
            .spawn((
                Camera3d::default(),
                Transform::from_translation(rig.head_offset),
                FlyCamera::default(),
            ))
            .id();

        commands
            .entity(rig_entity)
            .insert(Visibility::default())
            .add_child(camera);
    }
}

/// Handle input: средняя кнопка мыши — обзор, WASD — шаг головы внутри rig'а
fn fly_camera_controls(
    time: Res<Time>,
    keys: Res<ButtonInput<KeyCode>>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut query: Query<(&mut FlyCamera, &mut Transform)>,
) {
    let Ok((mut camera, mut transform)) = query.single_mut() else {
        return;
    };

    if mouse_buttons.pressed(MouseButton::Middle) {
        for motion in mouse_motion.read() {
            camera.yaw -= motion.delta.x * camera.sensitivity;
            camera.pitch -= motion.delta.y * camera.sensitivity;

            // Clamp pitch to avoid gimbal lock
            camera.pitch = camera.pitch.clamp(
                -std::f32::consts::FRAC_PI_2 + 0.1,
                std::f32::consts::FRAC_PI_2 - 0.1,
            );
        }
    } else {
        // Consume motion events even when not looking around
        mouse_motion.clear();
    }

    let mut direction = Vec3::ZERO;
    if keys.pressed(KeyCode::KeyW) {
        direction.z -= 1.0;
    }
    if keys.pressed(KeyCode::KeyS) {
        direction.z += 1.0;
    }
    if keys.pressed(KeyCode::KeyA) {
        direction.x -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) {
        direction.x += 1.0;
    }

    if direction != Vec3::ZERO {
        // Только по горизонтали, высота головы не меняется
        let heading = Quat::from_rotation_y(camera.yaw);
        transform.translation +=
            heading * direction.normalize() * camera.move_speed * time.delta_secs();
    }
}

/// Update camera rotation from yaw/pitch
fn update_camera_transform(mut query: Query<(&FlyCamera, &mut Transform), Changed<FlyCamera>>) {
    for (camera, mut transform) in query.iter_mut() {
        transform.rotation = Quat::from_euler(EulerRot::YXZ, camera.yaw, camera.pitch, 0.0);
    }
}

/// Decals разворачиваются к голове: rig должен знать её смещение
fn sync_head_offset(
    cameras: Query<(&Transform, &ChildOf), (With<FlyCamera>, Changed<Transform>)>,
    mut rigs: Query<&mut CameraRig>,
) {
    for (transform, child_of) in cameras.iter() {
        if let Ok(mut rig) = rigs.get_mut(child_of.parent()) {
            rig.head_offset = transform.translation;
        }
    }
}
