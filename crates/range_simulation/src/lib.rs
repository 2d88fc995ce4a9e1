//! Shooting Range Simulation Core
//!
//! Headless ECS на Bevy 0.16: вся логика VR тира без рендера и XR runtime.
//!
//! - Клиент (range_client) = загрузка assets, рендер, эмуляция/XR input
//! - Симуляция = session, asset readiness, controllers, teleport,
//!   grab→fire state machine, projectiles, попадания, счёт
//!
//! Один кадр = один проход `Update`, системы идут в порядке `RangeSet`.

use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub mod aim;
pub mod assets;
pub mod config;
pub mod gun;
pub mod logger;
pub mod raycast;
pub mod score;
pub mod session;
pub mod teleport;
pub mod xr;

// Re-export основных типов
pub use aim::{AimLine, AimPlugin, GunSightPointer, PointerTint, TeleportPointer};
pub use assets::{
    AssetLoadFailed, AssetLoaded, AssetRegistry, AssetsPlugin, FallbackCollider, LoadState,
    Raycastable, RoomModel, SceneAsset, SceneGeometryReady,
};
pub use config::{ConfigError, RangeConfig};
pub use gun::{
    FireRequested, Gun, GunPlugin, GunState, Projectile, ProjectileExpired, ProjectileHit,
    ProjectileId, ProjectileRegistry, ProjectileSpawned, Target,
};
pub use logger::{init_logger, log, log_error, log_info, log_warning, LogLevel, LogPrinter};
pub use score::{BulletHole, Score, ScoreBoard, ScoreChanged, ScorePlugin};
pub use session::{SessionEvent, SessionPlugin, VrSession};
pub use teleport::{CameraRig, RigTween, TeleportPlugin};
pub use xr::{
    rest_pose, Controller, HandModel, Handedness, JointMarker, JointPose, SelectEvent,
    SelectPhase, TrackedHand, XrPlugin, HAND_JOINT_COUNT,
};

/// Порядок фаз кадра (chain)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeSet {
    /// Session + asset события
    Session,
    /// Select события controller'ов
    Input,
    /// Teleport tween + teleport pointer
    Locomotion,
    /// Hand tracking
    Tracking,
    /// Поза пистолета, прицел, spawn пуль
    Gun,
    /// Полёт + попадания
    Projectiles,
    /// Decals, счёт, табло
    Scoring,
}

/// Главный plugin симуляции (объединяет все подсистемы)
///
/// `RangeConfig` можно вставить до plugin'а, иначе берутся defaults.
pub struct RangePlugin;

impl Plugin for RangePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RangeConfig>();

        if !app.world().contains_resource::<DeterministicRng>() {
            let seed = app.world().resource::<RangeConfig>().seed;
            app.insert_resource(DeterministicRng::new(seed));
        }

        app.configure_sets(
            Update,
            (
                RangeSet::Session,
                RangeSet::Input,
                RangeSet::Locomotion,
                RangeSet::Tracking,
                RangeSet::Gun,
                RangeSet::Projectiles,
                RangeSet::Scoring,
            )
                .chain(),
        );

        app.add_plugins((
            SessionPlugin,
            AssetsPlugin,
            XrPlugin,
            AimPlugin,
            TeleportPlugin,
            GunPlugin,
            ScorePlugin,
        ));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(RangeConfig {
            seed,
            ..default()
        })
        .insert_resource(DeterministicRng::new(seed));

    app
}

/// Snapshot компонентов для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
