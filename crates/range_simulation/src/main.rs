//! Headless прогон стрельбища
//!
//! Без рендера и XR: assets "загружаются" сразу, правая рука хватает
//! пистолет и делает несколько выстрелов по мишени.

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use range_simulation::{
    create_headless_app, AssetLoaded, Controller, Handedness, ProjectileRegistry, RangeConfig,
    RangePlugin, SceneAsset, ScoreBoard, SelectEvent, SessionEvent,
};

const SHOTS: usize = 3;
const FRAMES_BETWEEN_SHOTS: usize = 30;

fn main() {
    let seed = 42;
    println!("Starting shooting range headless session (seed: {})", seed);

    let mut app = create_headless_app(seed);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(
        1.0 / 60.0,
    )))
    .add_plugins(RangePlugin);

    // Startup: controllers, rig, pointers
    app.update();

    app.world_mut().send_event(SessionEvent::Started);
    for asset in SceneAsset::ALL {
        app.world_mut().send_event(AssetLoaded(asset));
    }
    aim_right_controller_at_target(&mut app);
    app.update();

    app.world_mut().send_event(SelectEvent::start(Handedness::Right));
    app.world_mut().send_event(SelectEvent::end(Handedness::Right));
    app.update();

    for shot in 0..SHOTS {
        app.world_mut().send_event(SelectEvent::start(Handedness::Right));
        app.world_mut().send_event(SelectEvent::end(Handedness::Right));

        for _ in 0..FRAMES_BETWEEN_SHOTS {
            app.update();
        }

        let live = app.world().resource::<ProjectileRegistry>().live_count();
        println!("Shot {}: {} projectiles in flight", shot + 1, live);
    }

    let label = app
        .world()
        .resource::<ScoreBoard>()
        .text()
        .unwrap_or("<no label>")
        .to_string();
    println!("Session complete! {}", label);
}

/// Повернуть правый controller так, чтобы ствол смотрел на мишень
fn aim_right_controller_at_target(app: &mut App) {
    let config = app.world().resource::<RangeConfig>().clone();
    let origin = Vec3::new(0.0, 1.5, 0.0);
    let target = Vec3::from_array(config.target.translation);
    let barrel = Quat::from_rotation_arc(config.muzzle_axis(), (target - origin).normalize());
    let rotation = barrel * config.grip_rotation().inverse();

    let world = app.world_mut();
    let mut controllers = world.query::<(&Controller, &mut Transform)>();
    for (controller, mut transform) in controllers.iter_mut(world) {
        if controller.hand == Handedness::Right {
            *transform = Transform::from_translation(origin).with_rotation(rotation);
        }
    }
}
