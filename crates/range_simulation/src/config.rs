//! RangeConfig — все числа стрельбища в одном resource
//!
//! Значения по умолчанию повторяют исходную сцену (позиции моделей, скорость
//! пули, пороги arming). Клиент может переопределить их через `range.json`
//! (`serde_json`, отсутствующие поля берутся из `Default`).

use std::f32::consts::PI;
use std::path::Path;

use bevy::prelude::*;
use bevy_rapier3d::prelude::Collider;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logger;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Форма collider'а для ray queries (мировой размер, scale модели не применяется)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ColliderShape {
    Cuboid { half_extents: [f32; 3] },
    Ball { radius: f32 },
}

impl ColliderShape {
    pub fn to_collider(&self) -> Collider {
        match *self {
            ColliderShape::Cuboid { half_extents: [x, y, z] } => Collider::cuboid(x, y, z),
            ColliderShape::Ball { radius } => Collider::ball(radius),
        }
    }
}

/// Начальная поза модели: translation, Euler XYZ (радианы), scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub translation: [f32; 3],
    #[serde(default)]
    pub rotation: [f32; 3],
    #[serde(default = "unit_scale")]
    pub scale: [f32; 3],
}

fn unit_scale() -> [f32; 3] {
    [1.0; 3]
}

impl Placement {
    pub fn at(translation: [f32; 3]) -> Self {
        Self {
            translation,
            rotation: [0.0; 3],
            scale: unit_scale(),
        }
    }

    pub fn transform(&self) -> Transform {
        let [rx, ry, rz] = self.rotation;
        Transform {
            translation: Vec3::from_array(self.translation),
            rotation: Quat::from_euler(EulerRot::XYZ, rx, ry, rz),
            scale: Vec3::from_array(self.scale),
        }
    }
}

/// Один collider геометрии комнаты (участвует в teleport raycast)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoomCollider {
    pub placement: Placement,
    pub collider: ColliderShape,
}

/// Табло: первая геометрия (при загрузке шрифта) мельче пересобранных
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreLabelLayout {
    pub position: [f32; 3],
    pub initial_size: f32,
    pub size: f32,
}

impl Default for ScoreLabelLayout {
    fn default() -> Self {
        Self {
            position: [-1.0, 6.0, -5.0],
            initial_size: 0.3,
            size: 0.5,
        }
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeConfig {
    /// Seed для DeterministicRng
    pub seed: u64,

    /// Скорость пули (units/s)
    pub bullet_speed: f32,
    /// После этого active_time пуля начинает проверять попадание
    pub arming_time: f32,
    /// Нижняя граница arming внутри collision check (защита от self-hit)
    pub min_arming_time: f32,
    /// Длина луча попадания (f32::MAX = без ограничения)
    pub hit_ray_length: f32,
    /// None = пуля живёт пока не попадёт
    pub max_flight_time: Option<f32>,

    /// Длина pointer line при промахе (teleport + pointer до захвата)
    pub pointer_length: f32,
    /// Дистанция прицельной метки после захвата
    pub sight_length: f32,
    /// Длительность teleport tween (секунды)
    pub teleport_duration: f32,

    /// Хват: rotate Y(yaw), затем rotate Z(roll) относительно controller
    pub grip_yaw: f32,
    pub grip_roll: f32,
    /// Ось ствола в локальных координатах модели пистолета
    pub muzzle_forward: [f32; 3],

    pub gun: Placement,
    pub gun_collider: ColliderShape,
    pub target: Placement,
    pub target_collider: ColliderShape,
    pub room_colliders: Vec<RoomCollider>,

    pub hand_model_scale: f32,
    pub decal_size: f32,
    pub score_label: ScoreLabelLayout,

    /// Позиция camera rig при старте
    pub rig_start: [f32; 3],
    /// Смещение головы внутри rig (non-VR камера)
    pub head_offset: [f32; 3],
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            bullet_speed: 6.0,
            arming_time: 0.5,
            min_arming_time: 0.1,
            hit_ray_length: f32::MAX,
            max_flight_time: None,
            pointer_length: 5.0,
            sight_length: 10.0,
            teleport_duration: 0.5,
            grip_yaw: PI / 2.0,
            grip_roll: -PI / 20.0,
            muzzle_forward: [1.0, 0.0, 0.0],
            gun: Placement {
                translation: [1.7, 1.0, -2.75],
                rotation: [-PI / 2.0, PI / 20.5, PI / 6.0],
                scale: [0.5; 3],
            },
            gun_collider: ColliderShape::Cuboid {
                half_extents: [0.15, 0.1, 0.04],
            },
            target: Placement {
                translation: [0.0, 1.5, -5.0],
                rotation: [0.0, PI / 2.0, 0.0],
                scale: unit_scale(),
            },
            // Щит мишени лежит в локальной YZ плоскости (после Y(π/2) смотрит на +Z)
            target_collider: ColliderShape::Cuboid {
                half_extents: [0.05, 0.8, 0.6],
            },
            room_colliders: vec![RoomCollider {
                placement: Placement::at([0.0, -0.05, 0.0]),
                collider: ColliderShape::Cuboid {
                    half_extents: [10.0, 0.05, 10.0],
                },
            }],
            hand_model_scale: 2.0,
            decal_size: 0.2,
            score_label: ScoreLabelLayout::default(),
            rig_start: [0.0, 0.5, 0.0],
            head_offset: [0.0, 1.6, 5.0],
        }
    }
}

impl RangeConfig {
    pub fn from_json_str(json: &str, origin: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json, &path.display().to_string())
    }

    /// Нет файла → defaults молча; битый файл → defaults + warning
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            logger::log_info(&format!(
                "No range config at {}, using defaults",
                path.display()
            ));
            return Self::default();
        }

        match Self::load(path) {
            Ok(config) => {
                logger::log_info(&format!("Loaded range config from {}", path.display()));
                config
            }
            Err(err) => {
                logger::log_warning(&format!("⚠️ {err}; falling back to defaults"));
                Self::default()
            }
        }
    }

    /// Поворот хвата относительно controller
    pub fn grip_rotation(&self) -> Quat {
        Quat::from_rotation_y(self.grip_yaw) * Quat::from_rotation_z(self.grip_roll)
    }

    pub fn muzzle_axis(&self) -> Vec3 {
        Vec3::from_array(self.muzzle_forward)
            .try_normalize()
            .unwrap_or(Vec3::X)
    }

    pub fn head_offset(&self) -> Vec3 {
        Vec3::from_array(self.head_offset)
    }
}
