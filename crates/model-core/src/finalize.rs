//! Model finalization: the pipeline turning raw imported data into a
//! consistent, renderable, exportable model.
//!
//! Steps run in a fixed order: normal synthesis, default material
//! assignment, empty mesh pruning, empty node pruning. Inputs are
//! validated up front, so malformed indices fail before any mutation.

use hashbrown::HashMap;
use nalgebra::Vector3;
use tracing::{debug, info};

use crate::error::{ModelError, ModelResult};
use crate::geometry::{is_equal_vector3, is_zero, triangle_normal};
use crate::material::Material;
use crate::mesh::Mesh;
use crate::model::Model;
use crate::node::Node;

/// Finalizes a freshly imported model in place.
///
/// `default_material_factory` is invoked at most once, when at least one
/// triangle carries no material index; importers close it over their
/// settings (default color and shading model).
pub fn finalize_model<F>(model: &mut Model, default_material_factory: F) -> ModelResult<()>
where
    F: FnOnce() -> Material,
{
    validate(model)?;

    for index in 0..model.mesh_count() {
        synthesize_normals(model.mesh_mut(index));
    }

    assign_default_material(model, default_material_factory);

    let empty_meshes: Vec<usize> = (0..model.mesh_count())
        .filter(|&index| model.mesh(index).is_empty())
        .collect();
    for &index in empty_meshes.iter().rev() {
        model.remove_mesh(index);
    }
    if !empty_meshes.is_empty() {
        debug!("pruned {} empty meshes", empty_meshes.len());
    }

    prune_empty_nodes(model.root_node_mut());

    info!(
        "finalized model: {} meshes, {} materials, {} mesh instances",
        model.mesh_count(),
        model.material_count(),
        model.mesh_instance_count()
    );
    Ok(())
}

fn validate(model: &Model) -> ModelResult<()> {
    let material_count = model.material_count();
    for mesh in model.meshes() {
        mesh.validate_indices(material_count)?;
    }
    validate_node(model.root_node(), model.mesh_count())
}

fn validate_node(node: &Node, mesh_count: usize) -> ModelResult<()> {
    for &index in node.mesh_indices() {
        if index >= mesh_count {
            return Err(ModelError::MeshIndexOutOfRange {
                index,
                count: mesh_count,
            });
        }
    }
    for child in node.children() {
        validate_node(child, mesh_count)?;
    }
    Ok(())
}

/// Computes normals for every triangle that lacks them.
///
/// Flat triangles get one shared normal entry per face. Triangles in a
/// curve group get three fresh entries whose values are the averaged
/// distinct face normals around each (curve group, vertex) pair, so
/// coplanar neighbors contribute one direction no matter how finely they
/// are tessellated.
fn synthesize_normals(mesh: &mut Mesh) {
    let mut group_normals: HashMap<(u32, u32), Vec<Vector3<f64>>> = HashMap::new();
    for triangle in mesh.triangles() {
        if triangle.curve == 0 || triangle.has_normals() {
            continue;
        }
        let [v0, v1, v2] = mesh.triangle_vertices(triangle);
        let face_normal = triangle_normal(v0, v1, v2);
        for &vertex in &triangle.vertices {
            let contributions = group_normals.entry((triangle.curve, vertex)).or_default();
            if !contributions
                .iter()
                .any(|existing| is_equal_vector3(existing, &face_normal))
            {
                contributions.push(face_normal);
            }
        }
    }

    let averaged: HashMap<(u32, u32), Vector3<f64>> = group_normals
        .into_iter()
        .map(|(key, contributions)| {
            let sum: Vector3<f64> = contributions.iter().sum();
            (key, normalize_or_zero(&sum))
        })
        .collect();

    for index in 0..mesh.triangle_count() {
        let triangle = mesh.triangle(index).clone();
        if triangle.has_normals() {
            continue;
        }

        if triangle.curve == 0 {
            let [v0, v1, v2] = mesh.triangle_vertices(&triangle);
            let face_normal = triangle_normal(v0, v1, v2);
            let normal_index = mesh.add_normal(face_normal) as u32;
            mesh.triangle_mut(index).normals = Some([normal_index; 3]);
        } else {
            let mut normal_indices = [0u32; 3];
            for (corner, &vertex) in triangle.vertices.iter().enumerate() {
                let normal = averaged[&(triangle.curve, vertex)];
                normal_indices[corner] = mesh.add_normal(normal) as u32;
            }
            mesh.triangle_mut(index).normals = Some(normal_indices);
        }
    }
}

fn normalize_or_zero(vector: &Vector3<f64>) -> Vector3<f64> {
    let len_sq = vector.norm_squared();
    if is_zero(len_sq) {
        Vector3::zeros()
    } else {
        vector / len_sq.sqrt()
    }
}

/// Assigns the single shared default material to every triangle with an
/// unset material index. The material is created once for the whole model
/// and flagged as synthesized.
fn assign_default_material<F>(model: &mut Model, default_material_factory: F)
where
    F: FnOnce() -> Material,
{
    let needs_default = model
        .meshes()
        .iter()
        .any(|mesh| mesh.triangles().iter().any(|t| t.material.is_none()));
    if !needs_default {
        return;
    }

    let mut material = default_material_factory();
    material.is_default = true;
    let material_index = model.add_material(material) as u32;
    debug!("created shared default material at index {}", material_index);

    for mesh_index in 0..model.mesh_count() {
        let mesh = model.mesh_mut(mesh_index);
        for triangle_index in 0..mesh.triangle_count() {
            let triangle = mesh.triangle_mut(triangle_index);
            if triangle.material.is_none() {
                triangle.material = Some(material_index);
            }
        }
    }
}

/// Removes child nodes whose subtrees reference no mesh. The root node
/// itself is never removed.
fn prune_empty_nodes(node: &mut Node) {
    node.children_mut().retain_mut(|child| {
        prune_empty_nodes(child);
        !(child.mesh_indices().is_empty() && child.children().is_empty())
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::generate_cuboid;
    use crate::material::Color;
    use crate::mesh::Triangle;
    use crate::transform::Transformation;
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Unit, UnitQuaternion};
    use std::f64::consts::PI;

    fn phong_factory() -> Material {
        Material::phong()
    }

    #[test]
    fn test_calculate_flat_normal() {
        let mut mesh = Mesh::new();
        let v0 = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0)) as u32;
        let v1 = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0)) as u32;
        let v2 = mesh.add_vertex(Point3::new(1.0, 1.0, 0.0)) as u32;
        let triangle_index = mesh.add_triangle(Triangle::new(v0, v1, v2));

        let mut model = Model::new();
        let mesh_index = model.add_mesh(mesh);
        assert_eq!(model.material_count(), 0);

        finalize_model(&mut model, phong_factory).unwrap();
        assert_eq!(model.material_count(), 1);
        assert!(model.material(0).is_default);

        let mesh = model.mesh(mesh_index);
        assert_eq!(mesh.normal_count(), 1);
        let triangle = mesh.triangle(triangle_index);
        assert_eq!(triangle.normals, Some([0, 0, 0]));
        assert_eq!(triangle.material, Some(0));
    }

    #[test]
    fn test_calculate_curved_normal() {
        let mut mesh = Mesh::new();
        let v0 = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0)) as u32;
        let v1 = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0)) as u32;
        let v2 = mesh.add_vertex(Point3::new(1.0, 1.0, 0.0)) as u32;
        let v3 = mesh.add_vertex(Point3::new(0.0, 0.0, -1.0)) as u32;

        mesh.add_triangle(Triangle::new(v0, v1, v2).with_curve(1));
        mesh.add_triangle(Triangle::new(v0, v3, v1).with_curve(1));

        let mut model = Model::new();
        let mesh_index = model.add_mesh(mesh);
        finalize_model(&mut model, phong_factory).unwrap();

        let mesh = model.mesh(mesh_index);
        assert_eq!(mesh.normal_count(), 6);

        let normal = mesh.normal(0);
        assert_relative_eq!(normal.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(normal.y, -0.7071067811865475, epsilon = 1e-12);
        assert_relative_eq!(normal.z, 0.7071067811865475, epsilon = 1e-12);
    }

    #[test]
    fn test_calculate_curved_normal_skips_duplicate_directions() {
        let mut mesh = Mesh::new();
        let v0 = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0)) as u32;
        let v1 = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0)) as u32;
        let v2 = mesh.add_vertex(Point3::new(1.0, 1.0, 0.0)) as u32;
        let v3 = mesh.add_vertex(Point3::new(0.0, 0.0, -1.0)) as u32;
        let v4 = mesh.add_vertex(Point3::new(0.0, 1.0, 0.0)) as u32;

        // Two coplanar triangles and one at a right angle, all around v0.
        mesh.add_triangle(Triangle::new(v0, v1, v2).with_curve(1));
        mesh.add_triangle(Triangle::new(v0, v2, v4).with_curve(1));
        mesh.add_triangle(Triangle::new(v0, v3, v1).with_curve(1));

        let mut model = Model::new();
        let mesh_index = model.add_mesh(mesh);
        finalize_model(&mut model, phong_factory).unwrap();

        let mesh = model.mesh(mesh_index);
        assert_eq!(mesh.normal_count(), 9);

        let normal = mesh.normal(0);
        assert_relative_eq!(normal.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(normal.y, -0.7071067811865475, epsilon = 1e-12);
        assert_relative_eq!(normal.z, 0.7071067811865475, epsilon = 1e-12);
    }

    #[test]
    fn test_remove_empty_meshes_and_nodes() {
        let mut mesh = Mesh::new();
        let v0 = mesh.add_vertex(Point3::new(0.0, 0.0, 0.0)) as u32;
        let v1 = mesh.add_vertex(Point3::new(1.0, 0.0, 0.0)) as u32;
        let v2 = mesh.add_vertex(Point3::new(1.0, 1.0, 0.0)) as u32;
        mesh.add_triangle(Triangle::new(v0, v1, v2));

        let mut model = Model::new();
        let mesh_index = model.add_mesh(mesh);
        let empty_mesh_index = model.add_mesh(Mesh::new());

        let mut node1 = Node::new();
        node1.add_mesh_index(mesh_index);
        node1.add_mesh_index(empty_mesh_index);

        let node2 = Node::new();

        let mut node3 = Node::new();
        node3.add_mesh_index(mesh_index);
        node3.add_mesh_index(empty_mesh_index);

        model.root_node_mut().add_child_node(node1);
        model.root_node_mut().add_child_node(node2);
        model.root_node_mut().add_child_node(node3);

        finalize_model(&mut model, phong_factory).unwrap();
        assert_eq!(model.mesh_count(), 1);
        assert_eq!(model.mesh_instance_count(), 2);

        let mut node_count = 0;
        model.root_node().enumerate(&mut |_| node_count += 1);
        assert_eq!(node_count, 3);
    }

    #[test]
    fn test_remove_empty_nodes_recursively() {
        // Nested nodes referencing only empty meshes; everything prunes
        // away except the root.
        let mut model = Model::new();
        for name in ["Mesh 1", "Mesh 2", "Mesh 3"] {
            let mut mesh = Mesh::new();
            mesh.set_name(name);
            model.add_mesh(mesh);
        }

        let mut inner = Node::new();
        inner.add_mesh_index(0);
        inner.add_mesh_index(1);

        let mut middle = Node::new();
        middle.add_child_node(inner);
        middle.add_mesh_index(2);

        let mut outer = Node::new();
        outer.add_child_node(middle);
        model.root_node_mut().add_child_node(outer);
        model.root_node_mut().add_child_node(Node::new());

        finalize_model(&mut model, phong_factory).unwrap();
        assert_eq!(model.mesh_count(), 0);
        assert_eq!(model.mesh_instance_count(), 0);
        assert!(model.root_node().is_empty());
        assert!(model.root_node().children().is_empty());
    }

    #[test]
    fn test_default_material_created_once() {
        let mut model = Model::new();
        for z in 0..3 {
            let mut mesh = Mesh::new();
            let v0 = mesh.add_vertex(Point3::new(0.0, 0.0, z as f64)) as u32;
            let v1 = mesh.add_vertex(Point3::new(1.0, 0.0, z as f64)) as u32;
            let v2 = mesh.add_vertex(Point3::new(1.0, 1.0, z as f64)) as u32;
            mesh.add_triangle(Triangle::new(v0, v1, v2));
            model.add_mesh_to_root_node(mesh);
        }

        let mut factory_calls = 0;
        finalize_model(&mut model, || {
            factory_calls += 1;
            let mut material = Material::phong();
            material.color = Color::new(200, 200, 200);
            material
        })
        .unwrap();

        assert_eq!(factory_calls, 1);
        assert_eq!(model.material_count(), 1);
        assert_eq!(model.material(0).color, Color::new(200, 200, 200));
        for mesh in model.meshes() {
            assert!(mesh.triangles().iter().all(|t| t.material == Some(0)));
        }
    }

    #[test]
    fn test_finalization_is_idempotent() {
        let mut model = Model::new();
        model.add_mesh_to_root_node(generate_cuboid(1.0, 1.0, 1.0));
        finalize_model(&mut model, phong_factory).unwrap();

        let mesh_count = model.mesh_count();
        let material_count = model.material_count();
        let normal_count = model.normal_count();

        finalize_model(&mut model, || {
            panic!("factory must not run on a finalized model")
        })
        .unwrap();

        assert_eq!(model.mesh_count(), mesh_count);
        assert_eq!(model.material_count(), material_count);
        assert_eq!(model.normal_count(), normal_count);
    }

    #[test]
    fn test_instance_counters_after_finalization() {
        let mut model = Model::new();
        let mut cube = generate_cuboid(1.0, 1.0, 1.0);
        cube.set_name("Cube");
        model.add_mesh(cube);
        model.root_node_mut().add_mesh_index(0);

        let mut translated = Node::new();
        translated.set_transformation(Transformation::from_translation(2.0, 0.0, 0.0));
        translated.add_mesh_index(0);
        model.root_node_mut().add_child_node(translated);

        let mut rotated = Node::new();
        rotated.set_transformation(Transformation::from_rotation(
            &UnitQuaternion::from_axis_angle(
                &Unit::new_normalize(nalgebra::Vector3::z()),
                PI / 2.0,
            ),
        ));
        let mut translated_rotated = Node::new();
        translated_rotated.set_transformation(Transformation::from_translation(2.0, 0.0, 0.0));
        translated_rotated.add_mesh_index(0);
        rotated.add_child_node(translated_rotated);
        model.root_node_mut().add_child_node(rotated);

        finalize_model(&mut model, phong_factory).unwrap();
        assert_eq!(model.mesh_count(), 1);
        assert_eq!(model.mesh_instance_count(), 3);
        assert_eq!(model.vertex_count(), 8 * 3);
        assert_eq!(model.normal_count(), 12 * 3);
        assert_eq!(model.uv_count(), 0);
        assert_eq!(model.triangle_count(), 12 * 3);
    }

    #[test]
    fn test_malformed_vertex_index_fails_fast() {
        let mut mesh = Mesh::new();
        mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        mesh.add_triangle(Triangle::new(0, 1, 2));

        let mut model = Model::new();
        model.add_mesh_to_root_node(mesh);

        let result = finalize_model(&mut model, phong_factory);
        assert!(matches!(
            result,
            Err(ModelError::VertexIndexOutOfRange { index: 1, count: 1 })
        ));
        // Nothing was synthesized before the failure.
        assert_eq!(model.mesh(0).normal_count(), 0);
        assert_eq!(model.material_count(), 0);
    }

    #[test]
    fn test_malformed_node_mesh_index_fails_fast() {
        let mut model = Model::new();
        model.root_node_mut().add_mesh_index(5);

        let result = finalize_model(&mut model, phong_factory);
        assert!(matches!(
            result,
            Err(ModelError::MeshIndexOutOfRange { index: 5, count: 0 })
        ));
    }
}
