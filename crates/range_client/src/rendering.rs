use bevy::prelude::*;
use range_simulation::{
    AimLine, BulletHole, Controller, Gun, HandModel, JointMarker, PointerTint, ProjectileSpawned,
    RangeSet, RoomModel, ScoreBoard, Target, TrackedHand,
};

use crate::loading::RangeHandles;

pub struct RenderingSyncPlugin;

impl Plugin for RenderingSyncPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (setup_shared_visuals, spawn_score_text))
            .add_systems(
                Update,
                (
                    attach_static_scenes,
                    attach_hand_models,
                    sync_hand_visibility,
                    spawn_projectile_visuals,
                    spawn_bullet_hole_visuals,
                    draw_aim_lines,
                    draw_hand_joints,
                    update_score_text,
                )
                    .chain()
                    .after(RangeSet::Scoring),
            );
    }
}

/// Общие mesh/material для пуль и decals
#[derive(Resource)]
pub struct SharedVisuals {
    pub projectile_mesh: Handle<Mesh>,
    pub projectile_material: Handle<StandardMaterial>,
    pub bullet_hole_material: Handle<StandardMaterial>,
}

/// UI текст табло
#[derive(Component)]
pub struct ScoreText;

fn setup_shared_visuals(
    mut commands: Commands,
    handles: Res<RangeHandles>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.insert_resource(SharedVisuals {
        projectile_mesh: meshes.add(Sphere::new(0.05)),
        projectile_material: materials.add(Color::srgb(1.0, 0.0, 0.0)),
        bullet_hole_material: materials.add(StandardMaterial {
            base_color_texture: Some(handles.bullet_hole.clone()),
            alpha_mode: AlphaMode::Blend,
            unlit: true,
            // Чуть ближе к зрителю, чтобы не мерцать на поверхности мишени
            depth_bias: 1.0,
            ..default()
        }),
    });
}

/// Сцены gltf на логические entities симуляции
fn attach_static_scenes(
    mut commands: Commands,
    handles: Res<RangeHandles>,
    guns: Query<Entity, Added<Gun>>,
    targets: Query<Entity, Added<Target>>,
    rooms: Query<Entity, Added<RoomModel>>,
) {
    for entity in guns.iter() {
        commands
            .entity(entity)
            .insert((SceneRoot(handles.gun.clone()), Visibility::default()));
    }
    for entity in targets.iter() {
        commands
            .entity(entity)
            .insert((SceneRoot(handles.target.clone()), Visibility::default()));
    }
    for entity in rooms.iter() {
        commands
            .entity(entity)
            .insert((SceneRoot(handles.room.clone()), Visibility::default()));
    }
}

/// Перчатка = child controller'а (локальный Transform уже в HandModel)
fn attach_hand_models(
    mut commands: Commands,
    handles: Res<RangeHandles>,
    models: Query<(Entity, &HandModel), Added<HandModel>>,
    controllers: Query<(), With<Controller>>,
) {
    for (entity, model) in models.iter() {
        if controllers.get(model.controller).is_err() {
            continue;
        }

        commands
            .entity(entity)
            .insert((SceneRoot(handles.hand_model.clone()), hand_visibility(model)));
        commands.entity(model.controller).add_child(entity);
    }
}

fn hand_visibility(model: &HandModel) -> Visibility {
    if model.visible {
        Visibility::Inherited
    } else {
        Visibility::Hidden
    }
}

fn sync_hand_visibility(mut models: Query<(&HandModel, &mut Visibility), Changed<HandModel>>) {
    for (model, mut visibility) in models.iter_mut() {
        *visibility = hand_visibility(model);
    }
}

/// Сфера на каждую выпущенную пулю (entity из события)
fn spawn_projectile_visuals(
    mut commands: Commands,
    shared: Res<SharedVisuals>,
    mut spawned_events: EventReader<ProjectileSpawned>,
) {
    for event in spawned_events.read() {
        commands.entity(event.entity).try_insert((
            Mesh3d(shared.projectile_mesh.clone()),
            MeshMaterial3d(shared.projectile_material.clone()),
        ));
    }
}

/// Decal: квадрат decal_size × decal_size, +Z к зрителю (Rectangle смотрит в +Z)
fn spawn_bullet_hole_visuals(
    mut commands: Commands,
    shared: Res<SharedVisuals>,
    mut meshes: ResMut<Assets<Mesh>>,
    holes: Query<(Entity, &BulletHole), Added<BulletHole>>,
) {
    for (entity, hole) in holes.iter() {
        commands.entity(entity).insert((
            Mesh3d(meshes.add(Rectangle::new(hole.size, hole.size))),
            MeshMaterial3d(shared.bullet_hole_material.clone()),
        ));
    }
}

fn tint_color(tint: PointerTint) -> Color {
    match tint {
        PointerTint::Teleport => Color::srgb(0.0, 0.0, 1.0),
        PointerTint::Idle => Color::srgb(0.0, 1.0, 0.0),
        PointerTint::Interactable => Color::srgb(1.0, 0.0, 0.0),
    }
}

/// Aim lines + маркеры (gizmos, пересчитываются симуляцией каждый кадр)
fn draw_aim_lines(lines: Query<&AimLine>, mut gizmos: Gizmos) {
    for line in lines.iter() {
        let color = tint_color(line.tint);

        if line.line_visible {
            gizmos.line(line.start, line.end, color);
        }
        if line.marker_visible {
            gizmos.sphere(Isometry3d::from_translation(line.marker), 0.05, color);
        }
    }
}

fn draw_hand_joints(
    hands: Query<&TrackedHand>,
    markers: Query<(&JointMarker, &Transform)>,
    mut gizmos: Gizmos,
) {
    for (marker, transform) in markers.iter() {
        let Ok(hand) = hands.get(marker.hand_entity) else {
            continue;
        };
        if !hand.tracked {
            continue;
        }

        gizmos.sphere(
            Isometry3d::from_translation(transform.translation),
            0.01,
            Color::srgb(1.0, 0.0, 0.0),
        );
    }
}

fn spawn_score_text(mut commands: Commands) {
    commands.spawn((
        ScoreText,
        Text::new(""),
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            ..default()
        },
        Visibility::Hidden,
    ));
}

/// Табло: текст и размер из ScoreLabel, позиция = проекция label.position
fn update_score_text(
    board: Res<ScoreBoard>,
    handles: Res<RangeHandles>,
    cameras: Query<(&Camera, &GlobalTransform)>,
    mut texts: Query<(&mut Text, &mut TextFont, &mut Node, &mut Visibility), With<ScoreText>>,
) {
    let Ok((mut text, mut font, mut node, mut visibility)) = texts.single_mut() else {
        return;
    };

    let Some(label) = board.label() else {
        *visibility = Visibility::Hidden;
        return;
    };

    let anchor = label.position;
    let Some(screen) = cameras
        .iter()
        .find_map(|(camera, transform)| camera.world_to_viewport(transform, anchor).ok())
    else {
        *visibility = Visibility::Hidden;
        return;
    };

    if text.0 != label.text {
        text.0 = label.text.clone();
    }
    if font.font != handles.score_font {
        font.font = handles.score_font.clone();
    }
    let font_size = 96.0 * label.size;
    if font.font_size != font_size {
        font.font_size = font_size;
    }
    node.left = Val::Px(screen.x);
    node.top = Val::Px(screen.y);
    *visibility = Visibility::Inherited;
}
