//! Trimesh коллайдеры из загруженных gltf сцен
//!
//! Симуляция стартует с боксами из config. Когда `SceneRoot` пистолета,
//! мишени или комнаты заспавнен, все `Mesh3d` потомки сливаются в один
//! trimesh (в осях логической entity, scale уже внутри вершин) и уходят
//! в симуляцию как `SceneGeometryReady`.

use bevy::math::Affine3A;
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology, VertexAttributeValues};
use bevy::scene::SceneInstanceReady;
use bevy_rapier3d::prelude::Collider;
use range_simulation::{logger, Gun, RangeSet, RoomModel, SceneAsset, SceneGeometryReady, Target};

pub struct SceneCollidersPlugin;

impl Plugin for SceneCollidersPlugin {
    fn build(&self, app: &mut App) {
        app.add_observer(mark_scene_ready).add_systems(
            Update,
            build_scene_colliders.before(RangeSet::Session),
        );
    }
}

/// Сцена заспавнена, ждём mesh assets
#[derive(Component, Debug, Clone, Copy)]
pub struct PendingSceneGeometry(pub SceneAsset);

fn mark_scene_ready(
    trigger: Trigger<SceneInstanceReady>,
    mut commands: Commands,
    roots: Query<(Has<Gun>, Has<Target>, Has<RoomModel>)>,
) {
    let root = trigger.target();
    let Ok(kind) = roots.get(root) else {
        return;
    };

    let asset = match kind {
        (true, _, _) => SceneAsset::Gun,
        (_, true, _) => SceneAsset::Target,
        (_, _, true) => SceneAsset::Room,
        // Перчатки не участвуют в ray queries
        _ => return,
    };

    commands.entity(root).insert(PendingSceneGeometry(asset));
}

/// System: все mesh'и сцены в Assets<Mesh> → один trimesh → SceneGeometryReady
fn build_scene_colliders(
    mut commands: Commands,
    meshes: Res<Assets<Mesh>>,
    roots: Query<(Entity, &PendingSceneGeometry, &GlobalTransform)>,
    children: Query<&Children>,
    parts: Query<(&Mesh3d, &GlobalTransform)>,
    mut geometry_events: EventWriter<SceneGeometryReady>,
) {
    for (root, pending, root_transform) in roots.iter() {
        let mut scene_meshes = Vec::new();
        let mut waiting = false;

        for (mesh, transform) in parts.iter_many(children.iter_descendants(root)) {
            match meshes.get(&mesh.0) {
                Some(mesh) => scene_meshes.push((transform, mesh)),
                None => waiting = true,
            }
        }

        if waiting {
            continue;
        }

        commands.entity(root).remove::<PendingSceneGeometry>();

        match merged_trimesh(root_transform, scene_meshes) {
            Some(collider) => {
                geometry_events.write(SceneGeometryReady {
                    asset: pending.0,
                    collider,
                });
            }
            None => logger::log_warning(&format!(
                "{} has no triangle meshes, keeping config collider",
                pending.0.label()
            )),
        }
    }
}

/// Треугольники всех mesh'ей в осях root (translation + rotation), со scale
///
/// Mesh'и не TriangleList или без позиций пропускаются. Пусто → `None`.
pub fn merged_trimesh<'a>(
    root: &GlobalTransform,
    parts: impl IntoIterator<Item = (&'a GlobalTransform, &'a Mesh)>,
) -> Option<Collider> {
    let (_, rotation, translation) = root.to_scale_rotation_translation();
    let world_to_root = Affine3A::from_rotation_translation(rotation, translation).inverse();

    let mut vertices: Vec<Vec3> = Vec::new();
    let mut indices: Vec<[u32; 3]> = Vec::new();

    for (transform, mesh) in parts {
        if mesh.primitive_topology() != PrimitiveTopology::TriangleList {
            continue;
        }
        let Some(VertexAttributeValues::Float32x3(positions)) =
            mesh.attribute(Mesh::ATTRIBUTE_POSITION)
        else {
            continue;
        };

        let mesh_to_root = world_to_root * transform.affine();
        let base = vertices.len() as u32;
        vertices.extend(
            positions
                .iter()
                .map(|position| mesh_to_root.transform_point3(Vec3::from_array(*position))),
        );

        let corners: Vec<u32> = match mesh.indices() {
            Some(Indices::U16(list)) => list.iter().map(|index| u32::from(*index)).collect(),
            Some(Indices::U32(list)) => list.clone(),
            None => (0..positions.len() as u32).collect(),
        };
        indices.extend(
            corners
                .chunks_exact(3)
                .map(|triangle| [base + triangle[0], base + triangle[1], base + triangle[2]]),
        );
    }

    if indices.is_empty() {
        return None;
    }

    match Collider::trimesh(vertices, indices) {
        Ok(collider) => Some(collider),
        Err(error) => {
            logger::log_warning(&format!("Scene trimesh rejected: {:?}", error));
            None
        }
    }
}
