//! Score domain — счёт, табло, следы от пуль
//!
//! Подписан на ProjectileHit:
//! - `spawn_bullet_holes` — ровно один decal на попадание, лицом к зрителю
//! - `apply_hits_to_score` — score += 1, ScoreChanged
//! - `refresh_score_label` — пересборка текста "Score: <n>" (если шрифт готов)

use bevy::prelude::*;
use rand::Rng;

use crate::config::{RangeConfig, ScoreLabelLayout};
use crate::gun::{ProjectileHit, ProjectileId};
use crate::logger;
use crate::teleport::CameraRig;
use crate::{DeterministicRng, RangeSet};

/// Счёт попаданий (только растёт)
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq, Reflect)]
#[reflect(Resource)]
pub struct Score {
    pub hits: u32,
}

/// Event: запрос обновить табло
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreChanged {
    pub score: u32,
}

/// Текст табло; `generation` растёт при каждой пересборке геометрии
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreLabel {
    pub text: String,
    pub generation: u32,
    pub position: Vec3,
    /// Высота букв (initial_size до первой пересборки, дальше size)
    pub size: f32,
}

/// Табло счёта
///
/// Создаётся только когда шрифт загружен. До этого запросы обновления
/// молча теряются (без очереди): при резолве шрифта табло всё равно
/// строится из текущего счёта.
#[derive(Resource, Debug, Clone, Default)]
pub struct ScoreBoard {
    font_ready: bool,
    label: Option<ScoreLabel>,
    released_geometries: u32,
}

pub fn format_score(score: u32) -> String {
    format!("Score: {score}")
}

impl ScoreBoard {
    pub fn font_ready(&self) -> bool {
        self.font_ready
    }

    pub fn label(&self) -> Option<&ScoreLabel> {
        self.label.as_ref()
    }

    pub fn text(&self) -> Option<&str> {
        self.label.as_ref().map(|label| label.text.as_str())
    }

    /// Сколько старых геометрий текста освобождено
    pub fn released_geometries(&self) -> u32 {
        self.released_geometries
    }

    /// Шрифт загрузился → первая геометрия табло
    pub fn resolve_font(&mut self, score: u32, layout: &ScoreLabelLayout) {
        if self.font_ready {
            return;
        }
        self.font_ready = true;
        self.label = Some(ScoreLabel {
            text: format_score(score),
            generation: 0,
            position: Vec3::from_array(layout.position),
            size: layout.initial_size,
        });
    }

    /// Пересобрать текст. `false` — шрифта ещё нет, запрос потерян.
    pub fn rebuild(&mut self, score: u32, layout: &ScoreLabelLayout) -> bool {
        let Some(label) = self.label.as_mut() else {
            return false;
        };

        self.released_geometries += 1;
        label.text = format_score(score);
        label.generation += 1;
        label.size = layout.size;
        true
    }
}

/// Decal "bullet hole" в точке попадания
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct BulletHole {
    pub projectile: ProjectileId,
    pub point: Vec3,
    /// Сторона квадрата decal'а
    pub size: f32,
}

pub struct ScorePlugin;

impl Plugin for ScorePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Score>()
            .init_resource::<ScoreBoard>()
            .add_event::<ScoreChanged>()
            .add_systems(
                Update,
                (spawn_bullet_holes, apply_hits_to_score, refresh_score_label)
                    .chain()
                    .in_set(RangeSet::Scoring),
            );
    }
}

/// Поза decal'а: +Z смотрит на зрителя, `roll` — поворот вокруг этой оси
pub fn bullet_hole_transform(point: Vec3, viewer: Vec3, roll: f32) -> Transform {
    let mut transform = Transform::from_translation(point).looking_to(point - viewer, Vec3::Y);
    transform.rotate_local_z(roll);
    transform
}

/// System: decal на каждое попадание
pub fn spawn_bullet_holes(
    mut commands: Commands,
    mut hit_events: EventReader<ProjectileHit>,
    config: Res<RangeConfig>,
    mut rng: ResMut<DeterministicRng>,
    rigs: Query<(&CameraRig, &Transform)>,
) {
    for hit in hit_events.read() {
        // Без rig'а decal смотрит вдоль +Z
        let viewer = rigs
            .single()
            .map(|(rig, transform)| rig.viewer_position(transform))
            .unwrap_or(hit.point + Vec3::Z);

        let roll = rng.rng.gen_range(0.0..std::f32::consts::TAU);

        commands.spawn((
            BulletHole {
                projectile: hit.id,
                point: hit.point,
                size: config.decal_size,
            },
            bullet_hole_transform(hit.point, viewer, roll),
        ));
    }
}

/// System: +1 за каждое попадание
pub fn apply_hits_to_score(
    mut hit_events: EventReader<ProjectileHit>,
    mut score: ResMut<Score>,
    mut changed_events: EventWriter<ScoreChanged>,
) {
    for _ in hit_events.read() {
        score.hits += 1;
        changed_events.write(ScoreChanged { score: score.hits });
        logger::log_info(&format!("💥 Score: {}", score.hits));
    }
}

/// System: ScoreChanged → пересборка табло
pub fn refresh_score_label(
    mut changed_events: EventReader<ScoreChanged>,
    mut board: ResMut<ScoreBoard>,
    config: Res<RangeConfig>,
) {
    for changed in changed_events.read() {
        if !board.rebuild(changed.score, &config.score_label) {
            logger::log(&format!(
                "Score label update to {} skipped, font not loaded",
                changed.score
            ));
        }
    }
}
