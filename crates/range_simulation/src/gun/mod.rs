//! Gun domain — grab→fire state machine, projectiles, попадания
//!
//! Поток событий:
//! 1. SelectEvent(Right, Start) → `handle_right_select` → GunState / FireRequested
//! 2. `follow_controller` — пистолет в руке (если схвачен)
//! 3. FireRequested → `spawn_projectiles` → Projectile + ProjectileRegistry
//! 4. `advance_projectiles` → ProjectileHit (score/decals подписаны в score domain)

use bevy::prelude::*;

use crate::RangeSet;

pub mod components;
pub mod projectile;
pub mod systems;


pub use components::*;
pub use projectile::*;
pub use systems::*;

pub struct GunPlugin;

impl Plugin for GunPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GunState>()
            .init_resource::<ProjectileRegistry>()
            .add_event::<FireRequested>()
            .add_event::<ProjectileSpawned>()
            .add_event::<ProjectileHit>()
            .add_event::<ProjectileExpired>();

        app.add_systems(Update, handle_right_select.in_set(RangeSet::Input))
            .add_systems(
                Update,
                (follow_controller, spawn_projectiles)
                    .chain()
                    .in_set(RangeSet::Gun),
            )
            .add_systems(Update, advance_projectiles.in_set(RangeSet::Projectiles));
    }
}
