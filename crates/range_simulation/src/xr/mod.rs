//! XR input domain — controllers, select events, hand tracking
//!
//! Содержит:
//! - Controller / Handedness / SelectEvent (dispatcher нажатий)
//! - HandModel (перчатка на controller'е)
//! - TrackedHand / JointMarker (hand tracking)

use bevy::prelude::*;

use crate::RangeSet;

pub mod controller;
pub mod hands;

pub use controller::*;
pub use hands::{rest_pose, JointMarker, JointPose, TrackedHand, HAND_JOINT_COUNT};

pub struct XrPlugin;

impl Plugin for XrPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SelectEvent>()
            .add_systems(Startup, (spawn_controllers, hands::spawn_tracked_hands))
            .add_systems(Update, hands::mirror_hand_joints.in_set(RangeSet::Tracking));
    }
}
