//! Общие helpers для integration тестов тира

#![allow(dead_code)]

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use range_simulation::*;

/// Фиксированный шаг кадра (точно представим в f32)
pub const TICK: f32 = 0.125;

/// Сколько projectile событий прошло за прогон
#[derive(Resource, Debug, Default)]
pub struct ProjectileLog {
    pub spawned: Vec<ProjectileSpawned>,
    pub expired: Vec<ProjectileId>,
}

fn record_projectile_events(
    mut spawned: EventReader<ProjectileSpawned>,
    mut expired: EventReader<ProjectileExpired>,
    mut log: ResMut<ProjectileLog>,
) {
    log.spawned.extend(spawned.read().copied());
    log.expired.extend(expired.read().map(|event| event.id));
}

/// Полный App тира: headless + RangePlugin + ручное время
///
/// Первый `update()` уже выполнен (Startup: controllers, rig, pointers).
pub fn create_range_app(config: RangeConfig) -> App {
    let mut app = create_headless_app(config.seed);
    app.insert_resource(config)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(
            TICK,
        )))
        .init_resource::<ProjectileLog>()
        .add_plugins(RangePlugin)
        .add_systems(Update, record_projectile_events.after(RangeSet::Scoring));

    app.update();
    app
}

/// Все assets "загрузились"
pub fn load_all_assets(app: &mut App) {
    for asset in SceneAsset::ALL {
        app.world_mut().send_event(AssetLoaded(asset));
    }
    app.update();
}

pub fn enter_vr(app: &mut App) {
    app.world_mut().send_event(SessionEvent::Started);
    app.update();
}

/// Нажать и отпустить trigger (без update)
pub fn click(app: &mut App, hand: Handedness) {
    app.world_mut().send_event(SelectEvent::start(hand));
    app.world_mut().send_event(SelectEvent::end(hand));
}

pub fn set_controller_pose(app: &mut App, hand: Handedness, pose: Transform) {
    let world = app.world_mut();
    let mut controllers = world.query::<(&Controller, &mut Transform)>();
    for (controller, mut transform) in controllers.iter_mut(world) {
        if controller.hand == hand {
            *transform = pose;
        }
    }
}

/// Поза правого controller'а, при которой ствол схваченного пистолета смотрит вдоль `direction`
pub fn aim_gun_along(app: &mut App, origin: Vec3, direction: Vec3) {
    let config = app.world().resource::<RangeConfig>().clone();
    let barrel = Quat::from_rotation_arc(config.muzzle_axis(), direction.normalize());
    let rotation = barrel * config.grip_rotation().inverse();

    set_controller_pose(
        app,
        Handedness::Right,
        Transform::from_translation(origin).with_rotation(rotation),
    );
}

/// Правая рука в (0, 1.5, 0), ствол на мишень (-Z)
pub fn aim_gun_at_target(app: &mut App) {
    aim_gun_along(app, Vec3::new(0.0, 1.5, 0.0), Vec3::NEG_Z);
}

/// Захват: первый trigger правой руки
pub fn grab_gun(app: &mut App) {
    click(app, Handedness::Right);
    app.update();
}

pub fn run_frames(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

pub fn score(app: &App) -> u32 {
    app.world().resource::<Score>().hits
}

pub fn live_projectiles(app: &App) -> usize {
    app.world().resource::<ProjectileRegistry>().live_count()
}

pub fn projectile_log(app: &App) -> &ProjectileLog {
    app.world().resource::<ProjectileLog>()
}

pub fn count<T: Component>(app: &mut App) -> usize {
    let world = app.world_mut();
    world.query::<&T>().iter(world).count()
}
