use std::path::PathBuf;

use bevy::prelude::*;
use range_simulation::{logger, RangeConfig, RangePlugin};

mod camera;
mod colliders;
mod loading;
mod logger_bridge;
mod rendering;
mod xr_input;

use camera::CameraPlugin;
use colliders::SceneCollidersPlugin;
use loading::LoadingPlugin;
use rendering::RenderingSyncPlugin;
use xr_input::DesktopXrPlugin;

/// Конфиг тира рядом с assets (необязательный)
const CONFIG_PATH: &str = "assets/range.json";

fn main() {
    logger::set_logger(Box::new(logger_bridge::BevyLogger));

    App::new()
        // Bevy defaults (rendering, input, time, assets, etc.)
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "VR Shooting Range".to_string(),
                resolution: (1280., 720.).into(),
                ..default()
            }),
            ..default()
        }))
        // Config до RangePlugin, иначе defaults
        .insert_resource(RangeConfig::load_or_default(config_path()))
        // Simulation (headless ECS logic)
        .add_plugins(RangePlugin)
        // AssetServer → AssetLoaded / AssetLoadFailed
        .add_plugins(LoadingPlugin)
        // Mesh'и загруженных сцен → trimesh коллайдеры
        .add_plugins(SceneCollidersPlugin)
        // Desktop эмуляция controllers + enter VR
        .add_plugins(DesktopXrPlugin)
        // Rendering sync (simulation → visuals)
        .add_plugins(RenderingSyncPlugin)
        // Camera controls
        .add_plugins(CameraPlugin)
        .add_systems(Startup, setup_lighting)
        .run();
}

/// Ambient белый на полную + directional из (1, 1, 1)
fn setup_lighting(mut commands: Commands) {
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 1000.0,
        affects_lightmapped_meshes: false,
    });

    commands.spawn((
        DirectionalLight {
            illuminance: 10000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(1.0, 1.0, 1.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

/// Как и AssetServer: от CARGO_MANIFEST_DIR при `cargo run`, иначе от cwd
fn config_path() -> PathBuf {
    std::env::var("CARGO_MANIFEST_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(CONFIG_PATH)
}
