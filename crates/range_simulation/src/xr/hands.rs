//! Hand tracking: XR joint poses → joint marker entities
//!
//! Источник поз (XR runtime или desktop эмуляция) зовёт `TrackedHand::track`,
//! каждый кадр `mirror_hand_joints` копирует позы в Transform маркеров
//! (клиент рисует сферы). `rest_pose` — раскрытая ладонь от позы запястья.

use bevy::prelude::*;

use super::Handedness;

/// WebXR hand: 25 суставов (wrist + 4×5 пальцевых + tips)
pub const HAND_JOINT_COUNT: usize = 25;

/// Пальцы правой руки: смещение по X от запястья и число суставов (thumb первым)
const FINGERS: [(f32, usize); 5] = [(-0.035, 4), (-0.015, 5), (0.0, 5), (0.015, 5), (0.03, 5)];

/// Шаг между суставами пальца вдоль -Z запястья
const JOINT_SPACING: f32 = 0.025;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointPose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for JointPose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

/// Рука с позами суставов (tracked = false пока runtime не отдаёт данные)
#[derive(Component, Debug, Clone)]
pub struct TrackedHand {
    pub hand: Handedness,
    pub tracked: bool,
    pub joints: [JointPose; HAND_JOINT_COUNT],
}

impl TrackedHand {
    pub fn new(hand: Handedness) -> Self {
        Self {
            hand,
            tracked: false,
            joints: [JointPose::default(); HAND_JOINT_COUNT],
        }
    }

    /// Новый кадр данных от runtime
    pub fn track(&mut self, joints: [JointPose; HAND_JOINT_COUNT]) {
        self.tracked = true;
        self.joints = joints;
    }

    /// Runtime перестал отдавать руку: маркеры замирают, клиент их не рисует
    pub fn lose_tracking(&mut self) {
        self.tracked = false;
    }
}

/// Раскрытая ладонь: пальцы вдоль -Z запястья, у левой руки X зеркальный
pub fn rest_pose(hand: Handedness, wrist: &Transform) -> [JointPose; HAND_JOINT_COUNT] {
    let mirror = match hand {
        Handedness::Left => -1.0,
        Handedness::Right => 1.0,
    };

    let wrist_pose = JointPose {
        position: wrist.translation,
        rotation: wrist.rotation,
    };
    let mut joints = [wrist_pose; HAND_JOINT_COUNT];

    let finger_offsets = FINGERS.iter().flat_map(|&(x, count)| {
        (1..=count).map(move |step| Vec3::new(x * mirror, 0.0, -(step as f32) * JOINT_SPACING))
    });

    for (joint, offset) in joints[1..].iter_mut().zip(finger_offsets) {
        joint.position = wrist.translation + wrist.rotation * offset;
    }

    joints
}

/// Маркер сустава `index` руки `hand_entity`
#[derive(Component, Debug, Clone, Copy)]
pub struct JointMarker {
    pub hand_entity: Entity,
    pub index: usize,
}

/// Startup system: две руки + по маркеру на каждый сустав
pub fn spawn_tracked_hands(mut commands: Commands) {
    for hand in [Handedness::Left, Handedness::Right] {
        let hand_entity = commands.spawn(TrackedHand::new(hand)).id();

        for index in 0..HAND_JOINT_COUNT {
            commands.spawn((JointMarker { hand_entity, index }, Transform::default()));
        }
    }
}

/// System: скопировать позы суставов в маркеры (только для tracked рук)
pub fn mirror_hand_joints(
    hands: Query<&TrackedHand>,
    mut markers: Query<(&JointMarker, &mut Transform)>,
) {
    for (marker, mut transform) in markers.iter_mut() {
        let Ok(hand) = hands.get(marker.hand_entity) else {
            continue;
        };

        if !hand.tracked {
            continue;
        }

        let Some(pose) = hand.joints.get(marker.index) else {
            continue;
        };

        transform.translation = pose.position;
        transform.rotation = pose.rotation;
    }
}
