//! Shooting range integration tests
//!
//! Полный RangePlugin headless, шаг кадра 0.125s:
//! - grab → fire → hit → score / decals / табло
//! - assets, которые ещё не загрузились или упали
//! - arming, промахи, max_flight_time
//! - teleport и pointer'ы
//! - замена config коллайдеров геометрией сцены

mod common;

use bevy::prelude::*;
use bevy_rapier3d::prelude::Collider;
use common::*;
use range_simulation::*;

/// Выстрел + достаточно кадров, чтобы пуля долетела до мишени (5 m при 6 m/s)
fn fire_and_wait(app: &mut App) {
    click(app, Handedness::Right);
    run_frames(app, 8);
}

fn ready_range(config: RangeConfig) -> App {
    let mut app = create_range_app(config);
    load_all_assets(&mut app);
    aim_gun_at_target(&mut app);
    grab_gun(&mut app);
    app
}

fn gun_sight(app: &mut App) -> AimLine {
    let world = app.world_mut();
    world
        .query_filtered::<&AimLine, With<GunSightPointer>>()
        .single(world)
        .unwrap()
        .clone()
}

fn teleport_line(app: &mut App) -> AimLine {
    let world = app.world_mut();
    world
        .query_filtered::<&AimLine, With<TeleportPointer>>()
        .single(world)
        .unwrap()
        .clone()
}

fn rig_position(app: &mut App) -> Vec3 {
    let world = app.world_mut();
    world
        .query_filtered::<&Transform, With<CameraRig>>()
        .single(world)
        .unwrap()
        .translation
}

#[test]
fn test_three_hits_score_three() {
    let mut app = ready_range(RangeConfig::default());

    assert!(app.world().resource::<GunState>().is_grabbed());
    assert_eq!(live_projectiles(&app), 0, "grab must not fire");

    for _ in 0..3 {
        fire_and_wait(&mut app);
    }

    assert_eq!(score(&app), 3);
    assert_eq!(live_projectiles(&app), 0);
    assert_eq!(app.world().resource::<ProjectileRegistry>().fired_total(), 3);
    assert_eq!(count::<Projectile>(&mut app), 0);
    assert_eq!(count::<BulletHole>(&mut app), 3);

    let log = projectile_log(&app);
    let ids: Vec<_> = log.spawned.iter().map(|event| event.id).collect();
    assert_eq!(ids, vec![ProjectileId(0), ProjectileId(1), ProjectileId(2)]);
    assert!(log.expired.is_empty());

    let board = app.world().resource::<ScoreBoard>();
    assert_eq!(board.text(), Some("Score: 3"));
    assert_eq!(board.released_geometries(), 3);
}

#[test]
fn test_trigger_before_gun_loaded_does_not_crash() {
    let mut app = create_range_app(RangeConfig::default());

    grab_gun(&mut app);
    assert!(app.world().resource::<GunState>().is_grabbed());

    // Выстрел без модели пистолета теряется
    click(&mut app, Handedness::Right);
    run_frames(&mut app, 3);
    assert_eq!(live_projectiles(&app), 0);
    assert_eq!(count::<Projectile>(&mut app), 0);

    // Пистолет догрузился → сразу в руке
    load_all_assets(&mut app);
    aim_gun_at_target(&mut app);
    app.update();

    let world = app.world_mut();
    let gun = world
        .query_filtered::<&Transform, With<Gun>>()
        .single(world)
        .unwrap();
    assert_eq!(gun.translation, Vec3::new(0.0, 1.5, 0.0));

    fire_and_wait(&mut app);
    assert_eq!(score(&app), 1);
}

#[test]
fn test_score_label_waits_for_font() {
    let mut app = create_range_app(RangeConfig::default());
    for asset in SceneAsset::ALL {
        if asset != SceneAsset::ScoreFont {
            app.world_mut().send_event(AssetLoaded(asset));
        }
    }
    app.update();
    aim_gun_at_target(&mut app);
    grab_gun(&mut app);

    fire_and_wait(&mut app);
    fire_and_wait(&mut app);

    assert_eq!(score(&app), 2);
    assert_eq!(app.world().resource::<ScoreBoard>().text(), None);

    app.world_mut().send_event(AssetLoaded(SceneAsset::ScoreFont));
    app.update();

    let board = app.world().resource::<ScoreBoard>();
    assert_eq!(board.text(), Some("Score: 2"));
    assert_eq!(board.released_geometries(), 0);
    assert_eq!(board.label().unwrap().size, 0.3);

    fire_and_wait(&mut app);

    let board = app.world().resource::<ScoreBoard>();
    assert_eq!(board.text(), Some("Score: 3"));
    assert_eq!(board.label().unwrap().size, 0.5);
}

#[test]
fn test_decal_sits_on_hit_point_facing_viewer() {
    let mut app = ready_range(RangeConfig::default());
    fire_and_wait(&mut app);

    let viewer = {
        let world = app.world_mut();
        let (rig, transform) = world
            .query::<(&CameraRig, &Transform)>()
            .single(world)
            .unwrap();
        rig.viewer_position(transform)
    };

    let world = app.world_mut();
    let (hole, transform) = world
        .query::<(&BulletHole, &Transform)>()
        .single(world)
        .unwrap();

    assert!(
        (hole.point - Vec3::new(0.0, 1.5, -4.95)).length() < 1e-3,
        "point = {:?}",
        hole.point
    );
    assert_eq!(transform.translation, hole.point);
    assert_eq!(hole.size, 0.2);

    let to_viewer = (viewer - hole.point).normalize();
    assert!(transform.back().as_vec3().dot(to_viewer) > 0.999);
}

#[test]
fn test_projectile_ignores_target_until_minimum_arming() {
    let config = RangeConfig {
        arming_time: 0.0,
        min_arming_time: 0.2,
        ..default()
    };
    let mut app = ready_range(config);

    click(&mut app, Handedness::Right);

    let mut oldest_seen = 0.0_f32;
    for _ in 0..8 {
        app.update();
        let world = app.world_mut();
        for projectile in world.query::<&Projectile>().iter(world) {
            oldest_seen = oldest_seen.max(projectile.active_time);
        }
    }

    // Пуля пережила кадр с active_time = 0.125 и попала на следующем
    assert_eq!(oldest_seen, TICK);
    assert_eq!(score(&app), 1);
}

#[test]
fn test_missed_projectile_flies_forever() {
    let mut app = create_range_app(RangeConfig::default());
    load_all_assets(&mut app);
    aim_gun_along(&mut app, Vec3::new(0.0, 1.5, 0.0), Vec3::Z);
    grab_gun(&mut app);

    click(&mut app, Handedness::Right);
    run_frames(&mut app, 200);

    assert_eq!(score(&app), 0);
    assert_eq!(live_projectiles(&app), 1);

    let world = app.world_mut();
    let (projectile, transform) = world
        .query::<(&Projectile, &Transform)>()
        .single(world)
        .unwrap();
    assert!(projectile.active_time > 20.0);
    assert!(transform.translation.z > 100.0);
}

#[test]
fn test_max_flight_time_expires_missed_projectile() {
    let config = RangeConfig {
        max_flight_time: Some(1.0),
        ..default()
    };
    let mut app = create_range_app(config);
    load_all_assets(&mut app);
    aim_gun_along(&mut app, Vec3::new(0.0, 1.5, 0.0), Vec3::Z);
    grab_gun(&mut app);

    click(&mut app, Handedness::Right);
    run_frames(&mut app, 20);

    assert_eq!(live_projectiles(&app), 0);
    assert_eq!(count::<Projectile>(&mut app), 0);
    assert_eq!(score(&app), 0);

    let log = projectile_log(&app);
    assert_eq!(log.spawned.len(), 1);
    assert_eq!(log.expired, vec![log.spawned[0].id]);
}

#[test]
fn test_teleport_to_floor_marker() {
    let mut app = create_range_app(RangeConfig::default());
    enter_vr(&mut app);
    load_all_assets(&mut app);

    set_controller_pose(
        &mut app,
        Handedness::Left,
        Transform::from_xyz(0.0, 1.5, 0.0).looking_to(Vec3::new(0.0, -1.0, -1.0), Vec3::Y),
    );
    app.update();

    let line = teleport_line(&mut app);
    assert!(line.marker_visible);
    assert!((line.marker - Vec3::new(0.0, 0.0, -1.5)).length() < 1e-3);

    click(&mut app, Handedness::Left);
    run_frames(&mut app, 8);

    let rig = rig_position(&mut app);
    assert!((rig - line.marker).length() < 1e-3, "rig = {:?}", rig);
    assert!(!teleport_line(&mut app).line_visible);
    assert_eq!(count::<RigTween>(&mut app), 0);
}

#[test]
fn test_teleport_into_void_keeps_rig() {
    let mut app = create_range_app(RangeConfig::default());
    enter_vr(&mut app);
    load_all_assets(&mut app);

    set_controller_pose(
        &mut app,
        Handedness::Left,
        Transform::from_xyz(0.0, 1.5, 0.0).looking_to(Vec3::Y, Vec3::Z),
    );
    app.update();
    assert!(!teleport_line(&mut app).marker_visible);

    click(&mut app, Handedness::Left);
    run_frames(&mut app, 8);

    assert_eq!(rig_position(&mut app), Vec3::new(0.0, 0.5, 0.0));
}

#[test]
fn test_teleport_pointer_inert_outside_vr() {
    let mut app = create_range_app(RangeConfig::default());
    load_all_assets(&mut app);

    set_controller_pose(
        &mut app,
        Handedness::Left,
        Transform::from_xyz(0.0, 1.5, 0.0).looking_to(Vec3::new(0.0, -1.0, -1.0), Vec3::Y),
    );
    run_frames(&mut app, 2);

    let line = teleport_line(&mut app);
    assert!(!line.marker_visible);
    assert_eq!(line.pointed, None);
}

#[test]
fn test_failed_asset_spawns_nothing() {
    let mut app = create_range_app(RangeConfig::default());

    app.world_mut().send_event(AssetLoadFailed {
        asset: SceneAsset::Gun,
        reason: "404 Not Found".to_string(),
    });
    app.update();

    // Поздний успех того же asset игнорируется
    app.world_mut().send_event(AssetLoaded(SceneAsset::Gun));
    app.update();

    assert_eq!(count::<Gun>(&mut app), 0);
    assert_eq!(
        app.world().resource::<AssetRegistry>().state(SceneAsset::Gun),
        &LoadState::Failed("404 Not Found".to_string())
    );
}

#[test]
fn test_gun_pointer_turns_red_on_gun() {
    let mut app = create_range_app(RangeConfig::default());
    enter_vr(&mut app);
    load_all_assets(&mut app);

    let gun_position = Vec3::from_array(app.world().resource::<RangeConfig>().gun.translation);
    set_controller_pose(
        &mut app,
        Handedness::Right,
        Transform::from_translation(gun_position + Vec3::new(0.0, 0.0, 1.75)),
    );
    app.update();

    let gun_entity = {
        let world = app.world_mut();
        world
            .query_filtered::<Entity, With<Gun>>()
            .single(world)
            .unwrap()
    };

    let line = gun_sight(&mut app);
    assert_eq!(line.tint, PointerTint::Interactable);
    assert_eq!(line.pointed, Some(gun_entity));
    assert!(line.marker_visible);

    set_controller_pose(
        &mut app,
        Handedness::Right,
        Transform::from_translation(gun_position + Vec3::new(0.0, 0.0, 1.75))
            .looking_to(Vec3::Y, Vec3::Z),
    );
    app.update();

    let line = gun_sight(&mut app);
    assert_eq!(line.tint, PointerTint::Idle);
    assert!(!line.marker_visible);
    assert!(((line.end - line.start).length() - 5.0).abs() < 1e-4);
}

#[test]
fn test_gun_sight_after_grab() {
    let mut app = ready_range(RangeConfig::default());
    app.update();

    let line = gun_sight(&mut app);
    assert!(line.marker_visible);
    assert_eq!(line.start, Vec3::new(0.0, 1.5, 0.0));
    assert!((line.marker - Vec3::new(0.0, 1.5, -10.0)).length() < 1e-3);
}

#[test]
fn test_hand_models_follow_grab_state() {
    let mut app = create_range_app(RangeConfig::default());
    load_all_assets(&mut app);
    assert_eq!(count::<HandModel>(&mut app), 2);

    grab_gun(&mut app);

    let world = app.world_mut();
    for model in world.query::<&HandModel>().iter(world) {
        assert_eq!(model.visible, model.hand == Handedness::Left);
    }
}

#[test]
fn test_hand_model_loaded_after_grab_starts_hidden() {
    let mut app = create_range_app(RangeConfig::default());
    grab_gun(&mut app);

    app.world_mut().send_event(AssetLoaded(SceneAsset::HandModel));
    app.update();

    let world = app.world_mut();
    let right = world
        .query::<&HandModel>()
        .iter(world)
        .find(|model| model.hand == Handedness::Right)
        .copied()
        .unwrap();
    assert!(!right.visible);
}

/// Trimesh из прямоугольников (по 4 угла, два треугольника на каждый)
fn quads_collider(quads: &[[Vec3; 4]]) -> Collider {
    let vertices: Vec<Vec3> = quads.iter().flatten().copied().collect();
    let indices: Vec<[u32; 3]> = (0..quads.len() as u32)
        .flat_map(|quad| {
            let base = quad * 4;
            [[base, base + 1, base + 2], [base, base + 2, base + 3]]
        })
        .collect();
    Collider::trimesh(vertices, indices).unwrap()
}

/// Пол 20×20 на y = 0 + задняя стена на z = -8
fn room_shell() -> Collider {
    quads_collider(&[
        [
            Vec3::new(-10.0, 0.0, -10.0),
            Vec3::new(10.0, 0.0, -10.0),
            Vec3::new(10.0, 0.0, 10.0),
            Vec3::new(-10.0, 0.0, 10.0),
        ],
        [
            Vec3::new(-10.0, 0.0, -8.0),
            Vec3::new(10.0, 0.0, -8.0),
            Vec3::new(10.0, 4.0, -8.0),
            Vec3::new(-10.0, 4.0, -8.0),
        ],
    ])
}

#[test]
fn test_room_geometry_replaces_fallback_colliders() {
    let mut app = create_range_app(RangeConfig::default());
    enter_vr(&mut app);
    load_all_assets(&mut app);

    set_controller_pose(
        &mut app,
        Handedness::Left,
        Transform::from_xyz(0.0, 1.5, 0.0).looking_to(Vec3::NEG_Z, Vec3::Y),
    );
    app.update();

    // Только пол из config: горизонтальный луч уходит в пустоту
    assert!(!teleport_line(&mut app).marker_visible);
    assert_eq!(count::<FallbackCollider>(&mut app), 1);

    app.world_mut().send_event(SceneGeometryReady {
        asset: SceneAsset::Room,
        collider: room_shell(),
    });
    app.update();

    assert_eq!(count::<FallbackCollider>(&mut app), 0);
    assert_eq!(count::<Raycastable>(&mut app), 1);

    let room = {
        let world = app.world_mut();
        world
            .query_filtered::<Entity, (With<RoomModel>, With<Raycastable>)>()
            .single(world)
            .unwrap()
    };

    let line = teleport_line(&mut app);
    assert!(line.marker_visible);
    assert_eq!(line.pointed, Some(room));
    assert!((line.marker - Vec3::new(0.0, 1.5, -8.0)).length() < 1e-3);
}

#[test]
fn test_teleport_to_floor_of_room_geometry() {
    let mut app = create_range_app(RangeConfig::default());
    enter_vr(&mut app);
    load_all_assets(&mut app);

    app.world_mut().send_event(SceneGeometryReady {
        asset: SceneAsset::Room,
        collider: room_shell(),
    });
    set_controller_pose(
        &mut app,
        Handedness::Left,
        Transform::from_xyz(0.0, 1.5, 0.0).looking_to(Vec3::new(0.0, -1.0, -1.0), Vec3::Y),
    );
    app.update();

    let line = teleport_line(&mut app);
    assert!((line.marker - Vec3::new(0.0, 0.0, -1.5)).length() < 1e-3);

    click(&mut app, Handedness::Left);
    run_frames(&mut app, 8);

    assert!((rig_position(&mut app) - line.marker).length() < 1e-3);
}

/// Прямоугольник в плоскости YZ мишени: 4 m по горизонтали вместо 1.2 m бокса
fn wide_target() -> Collider {
    quads_collider(&[[
        Vec3::new(0.0, -0.8, -2.0),
        Vec3::new(0.0, -0.8, 2.0),
        Vec3::new(0.0, 0.8, 2.0),
        Vec3::new(0.0, 0.8, -2.0),
    ]])
}

fn shoot_beside_target_box(app: &mut App) {
    load_all_assets(app);
    aim_gun_along(app, Vec3::new(0.0, 1.5, 0.0), Vec3::new(1.5, 0.0, -5.0));
    grab_gun(app);
    fire_and_wait(app);
}

#[test]
fn test_target_geometry_decides_hits() {
    let mut boxed = create_range_app(RangeConfig::default());
    shoot_beside_target_box(&mut boxed);
    assert_eq!(score(&boxed), 0);

    let mut meshed = create_range_app(RangeConfig::default());
    meshed.world_mut().send_event(AssetLoaded(SceneAsset::Target));
    meshed.update();
    meshed.world_mut().send_event(SceneGeometryReady {
        asset: SceneAsset::Target,
        collider: wide_target(),
    });
    shoot_beside_target_box(&mut meshed);

    assert_eq!(score(&meshed), 1);

    let world = meshed.world_mut();
    let collider = world
        .query_filtered::<&Collider, With<Target>>()
        .single(world)
        .unwrap();
    assert!(collider.as_trimesh().is_some());
}

#[test]
fn test_geometry_before_entity_is_dropped() {
    let mut app = create_range_app(RangeConfig::default());

    app.world_mut().send_event(SceneGeometryReady {
        asset: SceneAsset::Gun,
        collider: Collider::ball(0.1),
    });
    app.update();
    assert_eq!(count::<Gun>(&mut app), 0);

    app.world_mut().send_event(AssetLoaded(SceneAsset::Gun));
    app.update();

    let world = app.world_mut();
    let collider = world
        .query_filtered::<&Collider, With<Gun>>()
        .single(world)
        .unwrap();
    assert!(collider.as_cuboid().is_some());
}
