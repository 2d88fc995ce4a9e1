//! Asset readiness — какие внешние ресурсы уже загружены
//!
//! Загрузку делает клиент (AssetServer), симуляция получает только
//! `AssetLoaded` / `AssetLoadFailed` и держит явный `LoadState` на каждый
//! asset. Per-frame системы спрашивают registry вместо callback'ов.
//!
//! Ready → симуляция спавнит логическую entity (пистолет, мишень, коллайдеры
//! комнаты, перчатки) или резолвит шрифт табло. Failed → error в лог,
//! фича остаётся inert до конца сессии.
//!
//! Коллайдеры из config — грубые боксы. Когда клиент соберёт trimesh из mesh'ей
//! загруженной сцены, он шлёт `SceneGeometryReady`, и боксы заменяются
//! (у комнаты fallback entities удаляются). Headless прогон живёт на боксах.

use std::collections::HashMap;

use bevy::prelude::*;
use bevy_rapier3d::prelude::Collider;

use crate::config::RangeConfig;
use crate::gun::{Gun, GunState, Target};
use crate::logger;
use crate::score::{Score, ScoreBoard};
use crate::xr::{Controller, HandModel, Handedness};
use crate::RangeSet;

/// Внешние ресурсы сцены
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum SceneAsset {
    Room,
    Gun,
    Target,
    HandModel,
    BulletHoleTexture,
    ScoreFont,
}

impl SceneAsset {
    pub const ALL: [SceneAsset; 6] = [
        SceneAsset::Room,
        SceneAsset::Gun,
        SceneAsset::Target,
        SceneAsset::HandModel,
        SceneAsset::BulletHoleTexture,
        SceneAsset::ScoreFont,
    ];

    /// Путь относительно assets/
    pub fn path(&self) -> &'static str {
        match self {
            SceneAsset::Room => "models/vr_presentation_room/scene.gltf",
            SceneAsset::Gun => "models/low_poly_gun/scene.gltf",
            SceneAsset::Target => "models/shooting_range_target/scene.gltf",
            SceneAsset::HandModel => "models/vr_hand_glove/scene.gltf",
            SceneAsset::BulletHoleTexture => "textures/bullethole.png",
            SceneAsset::ScoreFont => "fonts/helvetiker_bold.ttf",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SceneAsset::Room => "VR room model",
            SceneAsset::Gun => "gun model",
            SceneAsset::Target => "target model",
            SceneAsset::HandModel => "controller hand model",
            SceneAsset::BulletHoleTexture => "bullet hole texture",
            SceneAsset::ScoreFont => "score font",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Pending,
    Ready,
    Failed(String),
}

/// LoadState каждого SceneAsset. Pending → Ready | Failed, дальше не меняется.
#[derive(Resource, Debug, Clone)]
pub struct AssetRegistry {
    slots: HashMap<SceneAsset, LoadState>,
}

impl Default for AssetRegistry {
    fn default() -> Self {
        Self {
            slots: SceneAsset::ALL
                .into_iter()
                .map(|asset| (asset, LoadState::Pending))
                .collect(),
        }
    }
}

impl AssetRegistry {
    pub fn state(&self, asset: SceneAsset) -> &LoadState {
        self.slots.get(&asset).unwrap_or(&LoadState::Pending)
    }

    pub fn is_ready(&self, asset: SceneAsset) -> bool {
        matches!(self.state(asset), LoadState::Ready)
    }

    pub fn is_pending(&self, asset: SceneAsset) -> bool {
        matches!(self.state(asset), LoadState::Pending)
    }

    /// `true` если slot реально перешёл в Ready
    pub fn mark_ready(&mut self, asset: SceneAsset) -> bool {
        self.settle(asset, LoadState::Ready)
    }

    /// `true` если slot реально перешёл в Failed
    pub fn mark_failed(&mut self, asset: SceneAsset, reason: impl Into<String>) -> bool {
        self.settle(asset, LoadState::Failed(reason.into()))
    }

    fn settle(&mut self, asset: SceneAsset, state: LoadState) -> bool {
        let slot = self.slots.entry(asset).or_insert(LoadState::Pending);
        if *slot != LoadState::Pending {
            return false;
        }
        *slot = state;
        true
    }

    pub fn pending(&self) -> impl Iterator<Item = SceneAsset> + '_ {
        SceneAsset::ALL
            .into_iter()
            .filter(move |asset| self.is_pending(*asset))
    }
}

/// Event: asset загружен (клиент → симуляция)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetLoaded(pub SceneAsset);

/// Event: asset не загрузился
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct AssetLoadFailed {
    pub asset: SceneAsset,
    pub reason: String,
}

/// Marker: геометрия, по которой работает teleport raycast
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Raycastable;

/// Marker: логическая entity модели комнаты (к ней клиент цепляет scene)
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct RoomModel;

/// Marker: коллайдер комнаты из config, живёт до прихода геометрии сцены
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct FallbackCollider;

/// Event: collider, собранный из mesh'ей загруженной сцены (клиент → симуляция)
///
/// Shape задан в осях логической entity (её translation + rotation) с уже
/// применённым scale: `cast_ray` scale из Transform не учитывает.
#[derive(Event, Debug, Clone)]
pub struct SceneGeometryReady {
    pub asset: SceneAsset,
    pub collider: Collider,
}

pub struct AssetsPlugin;

impl Plugin for AssetsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AssetRegistry>()
            .add_event::<AssetLoaded>()
            .add_event::<AssetLoadFailed>()
            .add_event::<SceneGeometryReady>()
            .add_systems(
                Update,
                (apply_asset_events, apply_scene_geometry)
                    .chain()
                    .in_set(RangeSet::Session),
            );
    }
}

/// System: AssetLoaded / AssetLoadFailed → registry + spawn
///
/// Повторные отчёты об одном asset игнорируются (slot уже settled).
pub fn apply_asset_events(
    mut commands: Commands,
    mut loaded_events: EventReader<AssetLoaded>,
    mut failed_events: EventReader<AssetLoadFailed>,
    mut registry: ResMut<AssetRegistry>,
    config: Res<RangeConfig>,
    gun_state: Res<GunState>,
    score: Res<Score>,
    mut board: ResMut<ScoreBoard>,
    controllers: Query<(Entity, &Controller)>,
) {
    for failed in failed_events.read() {
        if registry.mark_failed(failed.asset, failed.reason.clone()) {
            logger::log_error(&format!(
                "Error loading {} ({}): {}",
                failed.asset.label(),
                failed.asset.path(),
                failed.reason
            ));
        }
    }

    for AssetLoaded(asset) in loaded_events.read() {
        if !registry.mark_ready(*asset) {
            continue;
        }

        logger::log_info(&format!("📦 Loaded {}", asset.label()));

        match asset {
            SceneAsset::Room => spawn_room(&mut commands, &config),
            SceneAsset::Gun => {
                commands.spawn((Gun, config.gun.transform(), config.gun_collider.to_collider()));
            }
            SceneAsset::Target => {
                commands.spawn((
                    Target,
                    config.target.transform(),
                    config.target_collider.to_collider(),
                ));
            }
            SceneAsset::HandModel => {
                for (controller_entity, controller) in controllers.iter() {
                    // Пистолет уже в правой руке → перчатка сразу скрыта
                    let visible =
                        !(controller.hand == Handedness::Right && gun_state.is_grabbed());

                    commands.spawn((
                        HandModel {
                            controller: controller_entity,
                            hand: controller.hand,
                            visible,
                        },
                        HandModel::local_transform(controller.hand, config.hand_model_scale),
                    ));
                }
            }
            SceneAsset::ScoreFont => board.resolve_font(score.hits, &config.score_label),
            // Decal ставится и без текстуры, клиент подхватит её когда будет готова
            SceneAsset::BulletHoleTexture => {}
        }
    }
}

/// System: SceneGeometryReady → collider логической entity
///
/// Gun / Target: collider заменяется. Room: trimesh вешается на `RoomModel`
/// (становится Raycastable), боксы из config удаляются.
pub fn apply_scene_geometry(
    mut commands: Commands,
    mut geometry_events: EventReader<SceneGeometryReady>,
    guns: Query<Entity, With<Gun>>,
    targets: Query<Entity, With<Target>>,
    rooms: Query<Entity, With<RoomModel>>,
    fallbacks: Query<Entity, With<FallbackCollider>>,
) {
    for event in geometry_events.read() {
        let entity = match event.asset {
            SceneAsset::Gun => guns.single().ok(),
            SceneAsset::Target => targets.single().ok(),
            SceneAsset::Room => rooms.single().ok(),
            other => {
                logger::log_warning(&format!("No collider geometry for {}", other.label()));
                continue;
            }
        };

        let Some(entity) = entity else {
            logger::log_warning(&format!(
                "Geometry for {} arrived before its entity, keeping config collider",
                event.asset.label()
            ));
            continue;
        };

        commands.entity(entity).insert(event.collider.clone());

        if event.asset == SceneAsset::Room {
            commands.entity(entity).insert(Raycastable);
            for fallback in fallbacks.iter() {
                commands.entity(fallback).despawn();
            }
        }

        logger::log_info(&format!("🧱 Mesh collider for {}", event.asset.label()));
    }
}

fn spawn_room(commands: &mut Commands, config: &RangeConfig) {
    commands.spawn((RoomModel, Transform::IDENTITY));

    for room_collider in &config.room_colliders {
        commands.spawn((
            Raycastable,
            FallbackCollider,
            room_collider.placement.transform(),
            room_collider.collider.to_collider(),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_starts_pending() {
        let registry = AssetRegistry::default();
        assert_eq!(registry.pending().count(), SceneAsset::ALL.len());
        assert!(!registry.is_ready(SceneAsset::Gun));
    }

    #[test]
    fn test_slot_is_write_once() {
        let mut registry = AssetRegistry::default();

        assert!(registry.mark_ready(SceneAsset::Target));
        assert!(!registry.mark_failed(SceneAsset::Target, "late failure"));
        assert!(!registry.mark_ready(SceneAsset::Target));
        assert!(registry.is_ready(SceneAsset::Target));

        assert!(registry.mark_failed(SceneAsset::ScoreFont, "404"));
        assert!(!registry.mark_ready(SceneAsset::ScoreFont));
        assert_eq!(
            registry.state(SceneAsset::ScoreFont),
            &LoadState::Failed("404".to_string())
        );
    }

    #[test]
    fn test_asset_paths_are_distinct() {
        let mut paths: Vec<_> = SceneAsset::ALL.iter().map(|asset| asset.path()).collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), SceneAsset::ALL.len());
    }
}
