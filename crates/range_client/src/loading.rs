//! AssetServer загрузки → AssetLoaded / AssetLoadFailed для симуляции
//!
//! Каждый SceneAsset грузится один раз на Startup. Пока handle не в
//! terminal состоянии, `report_asset_states` опрашивает AssetServer каждый кадр.

use std::collections::HashSet;

use bevy::asset::{LoadState as BevyLoadState, UntypedAssetId};
use bevy::prelude::*;
use range_simulation::{AssetLoadFailed, AssetLoaded, RangeSet, SceneAsset};

pub struct LoadingPlugin;

impl Plugin for LoadingPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PreStartup, start_loading).add_systems(
            Update,
            report_asset_states.before(RangeSet::Session),
        );
    }
}

/// Handles всех assets тира
#[derive(Resource)]
pub struct RangeHandles {
    pub room: Handle<Scene>,
    pub gun: Handle<Scene>,
    pub target: Handle<Scene>,
    pub hand_model: Handle<Scene>,
    pub bullet_hole: Handle<Image>,
    pub score_font: Handle<Font>,
    reported: HashSet<SceneAsset>,
}

impl RangeHandles {
    fn id(&self, asset: SceneAsset) -> UntypedAssetId {
        match asset {
            SceneAsset::Room => self.room.id().untyped(),
            SceneAsset::Gun => self.gun.id().untyped(),
            SceneAsset::Target => self.target.id().untyped(),
            SceneAsset::HandModel => self.hand_model.id().untyped(),
            SceneAsset::BulletHoleTexture => self.bullet_hole.id().untyped(),
            SceneAsset::ScoreFont => self.score_font.id().untyped(),
        }
    }
}

fn load_scene(asset_server: &AssetServer, asset: SceneAsset) -> Handle<Scene> {
    asset_server.load(GltfAssetLabel::Scene(0).from_asset(asset.path()))
}

fn start_loading(mut commands: Commands, asset_server: Res<AssetServer>) {
    commands.insert_resource(RangeHandles {
        room: load_scene(&asset_server, SceneAsset::Room),
        gun: load_scene(&asset_server, SceneAsset::Gun),
        target: load_scene(&asset_server, SceneAsset::Target),
        hand_model: load_scene(&asset_server, SceneAsset::HandModel),
        bullet_hole: asset_server.load(SceneAsset::BulletHoleTexture.path()),
        score_font: asset_server.load(SceneAsset::ScoreFont.path()),
        reported: HashSet::new(),
    });
}

/// System: первый terminal LoadState каждого asset'а → event симуляции
fn report_asset_states(
    asset_server: Res<AssetServer>,
    mut handles: ResMut<RangeHandles>,
    mut loaded_events: EventWriter<AssetLoaded>,
    mut failed_events: EventWriter<AssetLoadFailed>,
) {
    if handles.reported.len() == SceneAsset::ALL.len() {
        return;
    }

    for asset in SceneAsset::ALL {
        if handles.reported.contains(&asset) {
            continue;
        }

        match asset_server.get_load_state(handles.id(asset)) {
            Some(BevyLoadState::Loaded) => {
                loaded_events.write(AssetLoaded(asset));
            }
            Some(BevyLoadState::Failed(err)) => {
                failed_events.write(AssetLoadFailed {
                    asset,
                    reason: err.to_string(),
                });
            }
            _ => continue,
        }

        handles.reported.insert(asset);
    }
}
