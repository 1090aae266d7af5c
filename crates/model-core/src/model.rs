//! The model: global mesh and material arrays plus the node tree.

use nalgebra::Point3;

use crate::material::{Color, Material, ShadingModel};
use crate::mesh::{transform_mesh, Mesh};
use crate::node::Node;
use crate::object3d::Object3D;
use crate::property::PropertyGroup;
use crate::transform::Transformation;

/// A placed occurrence of a mesh: the mesh paired with the resolved world
/// transformation of the node referencing it.
///
/// Instances are transient views produced during enumeration; they never
/// materialize a transformed vertex array.
pub struct MeshInstance<'a> {
    transformation: Transformation,
    mesh: &'a Mesh,
}

impl<'a> MeshInstance<'a> {
    pub fn new(transformation: Transformation, mesh: &'a Mesh) -> Self {
        Self {
            transformation,
            mesh,
        }
    }

    pub fn transformation(&self) -> &Transformation {
        &self.transformation
    }

    pub fn mesh(&self) -> &'a Mesh {
        self.mesh
    }

    pub fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }

    pub fn normal_count(&self) -> usize {
        self.mesh.normal_count()
    }

    pub fn uv_count(&self) -> usize {
        self.mesh.uv_count()
    }

    pub fn triangle_count(&self) -> usize {
        self.mesh.triangle_count()
    }

    /// Bakes the instance into a standalone mesh with transformed
    /// vertices and normals.
    pub fn to_mesh(&self) -> Mesh {
        let mut mesh = self.mesh.clone();
        transform_mesh(&mut mesh, &self.transformation);
        mesh
    }
}

/// A complete model: meshes, materials, property groups and a node tree
/// referencing meshes by index.
#[derive(Debug, Clone, Default)]
pub struct Model {
    name: String,
    root: Node,
    meshes: Vec<Mesh>,
    materials: Vec<Material>,
    property_groups: Vec<PropertyGroup>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn root_node(&self) -> &Node {
        &self.root
    }

    pub fn root_node_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    /// Appends a mesh to the global mesh array and returns its index. The
    /// mesh is not referenced by any node yet.
    pub fn add_mesh(&mut self, mesh: Mesh) -> usize {
        self.meshes.push(mesh);
        self.meshes.len() - 1
    }

    /// Appends a mesh and references it from the root node.
    pub fn add_mesh_to_root_node(&mut self, mesh: Mesh) -> usize {
        let index = self.add_mesh(mesh);
        self.root.add_mesh_index(index);
        index
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn mesh(&self, index: usize) -> &Mesh {
        &self.meshes[index]
    }

    pub fn mesh_mut(&mut self, index: usize) -> &mut Mesh {
        &mut self.meshes[index]
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    /// Removes a mesh from the global array. Node references to the mesh
    /// are dropped and references to later meshes are re-indexed so they
    /// stay contiguous and valid.
    pub fn remove_mesh(&mut self, index: usize) {
        self.meshes.remove(index);
        remove_mesh_references(&mut self.root, index);
    }

    pub fn add_material(&mut self, material: Material) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn material(&self, index: usize) -> &Material {
        &self.materials[index]
    }

    pub fn material_mut(&mut self, index: usize) -> &mut Material {
        &mut self.materials[index]
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn add_property_group(&mut self, group: PropertyGroup) -> usize {
        self.property_groups.push(group);
        self.property_groups.len() - 1
    }

    pub fn property_groups(&self) -> &[PropertyGroup] {
        &self.property_groups
    }

    /// Visits every mesh instance: each (node, mesh index) pair with the
    /// node's resolved world transformation. Root meshes come first, then
    /// each child subtree in order.
    pub fn enumerate_mesh_instances(&self, visitor: &mut dyn FnMut(&MeshInstance<'_>)) {
        self.root.enumerate_with_transform(
            &Transformation::identity(),
            &mut |node, world| {
                for &mesh_index in node.mesh_indices() {
                    let instance = MeshInstance::new(world.clone(), &self.meshes[mesh_index]);
                    visitor(&instance);
                }
            },
        );
    }

    /// Visits a baked, transformed copy of every mesh instance.
    pub fn enumerate_transformed_meshes(&self, visitor: &mut dyn FnMut(Mesh)) {
        self.enumerate_mesh_instances(&mut |instance| visitor(instance.to_mesh()));
    }

    /// Number of mesh instances (node × mesh pairs), by enumeration.
    pub fn mesh_instance_count(&self) -> usize {
        let mut count = 0;
        self.root.enumerate(&mut |node| count += node.mesh_indices().len());
        count
    }

    /// Total vertex count across all mesh instances.
    pub fn vertex_count(&self) -> usize {
        let mut count = 0;
        self.enumerate_mesh_instances(&mut |instance| count += instance.vertex_count());
        count
    }

    /// Total normal count across all mesh instances.
    pub fn normal_count(&self) -> usize {
        let mut count = 0;
        self.enumerate_mesh_instances(&mut |instance| count += instance.normal_count());
        count
    }

    /// Total texture UV count across all mesh instances.
    pub fn uv_count(&self) -> usize {
        let mut count = 0;
        self.enumerate_mesh_instances(&mut |instance| count += instance.uv_count());
        count
    }

    /// Total triangle count across all mesh instances.
    pub fn triangle_count(&self) -> usize {
        let mut count = 0;
        self.enumerate_mesh_instances(&mut |instance| count += instance.triangle_count());
        count
    }
}

fn remove_mesh_references(node: &mut Node, removed: usize) {
    node.mesh_indices_mut().retain(|&index| index != removed);
    for index in node.mesh_indices_mut() {
        if *index > removed {
            *index -= 1;
        }
    }
    for child in node.children_mut() {
        remove_mesh_references(child, removed);
    }
}

/// Whether no mesh instance carries any triangle.
pub fn is_model_empty(model: &Model) -> bool {
    let mut empty = true;
    model.enumerate_mesh_instances(&mut |instance| {
        if instance.triangle_count() > 0 {
            empty = false;
        }
    });
    empty
}

/// Whether the model contains a material synthesized by finalization.
pub fn has_default_material(model: &Model) -> bool {
    model.materials().iter().any(|material| material.is_default)
}

/// Recolors every synthesized default material.
pub fn replace_default_material_color(model: &mut Model, color: Color) {
    for index in 0..model.material_count() {
        if model.material(index).is_default {
            model.material_mut(index).color = color;
        }
    }
}

/// The most common shading model among the model's materials; Phong when
/// the model has none.
pub fn representative_shading_model(model: &Model) -> ShadingModel {
    let mut phong = 0usize;
    let mut physical = 0usize;
    for material in model.materials() {
        match material.shading_model() {
            ShadingModel::Phong => phong += 1,
            ShadingModel::Physical => physical += 1,
        }
    }
    if physical > phong {
        ShadingModel::Physical
    } else {
        ShadingModel::Phong
    }
}

impl Object3D for Mesh {
    fn enumerate_vertices(&self, visitor: &mut dyn FnMut(&Point3<f64>)) {
        for vertex in self.vertices() {
            visitor(vertex);
        }
    }

    fn enumerate_triangle_vertices(
        &self,
        visitor: &mut dyn FnMut(&Point3<f64>, &Point3<f64>, &Point3<f64>),
    ) {
        for triangle in self.triangles() {
            let [v0, v1, v2] = self.triangle_vertices(triangle);
            visitor(v0, v1, v2);
        }
    }
}

impl Object3D for MeshInstance<'_> {
    fn enumerate_vertices(&self, visitor: &mut dyn FnMut(&Point3<f64>)) {
        if self.transformation.is_identity() {
            self.mesh.enumerate_vertices(visitor);
            return;
        }
        for vertex in self.mesh.vertices() {
            visitor(&self.transformation.transform_point(vertex));
        }
    }

    fn enumerate_triangle_vertices(
        &self,
        visitor: &mut dyn FnMut(&Point3<f64>, &Point3<f64>, &Point3<f64>),
    ) {
        if self.transformation.is_identity() {
            self.mesh.enumerate_triangle_vertices(visitor);
            return;
        }
        for triangle in self.mesh.triangles() {
            let [v0, v1, v2] = self.mesh.triangle_vertices(triangle);
            visitor(
                &self.transformation.transform_point(v0),
                &self.transformation.transform_point(v1),
                &self.transformation.transform_point(v2),
            );
        }
    }
}

impl Object3D for Model {
    fn enumerate_vertices(&self, visitor: &mut dyn FnMut(&Point3<f64>)) {
        self.enumerate_mesh_instances(&mut |instance| {
            instance.enumerate_vertices(&mut *visitor)
        });
    }

    fn enumerate_triangle_vertices(
        &self,
        visitor: &mut dyn FnMut(&Point3<f64>, &Point3<f64>, &Point3<f64>),
    ) {
        self.enumerate_mesh_instances(&mut |instance| {
            instance.enumerate_triangle_vertices(&mut *visitor)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::generate_cuboid;
    use crate::geometry::is_equal_point3;
    use crate::material::Color;
    use crate::mesh::Triangle;
    use crate::object3d::bounding_box;
    use nalgebra::{Point2, Unit, UnitQuaternion, Vector3};
    use std::f64::consts::PI;

    fn triangle_mesh(z: f64) -> Mesh {
        let mut mesh = Mesh::new();
        mesh.add_vertex(Point3::new(0.0, 0.0, z));
        mesh.add_vertex(Point3::new(1.0, 0.0, z));
        mesh.add_vertex(Point3::new(1.0, 1.0, z));
        mesh.add_triangle(Triangle::new(0, 1, 2));
        mesh
    }

    #[test]
    fn test_default_initialization() {
        let model = Model::new();
        assert_eq!(model.material_count(), 0);
        assert_eq!(model.mesh_count(), 0);
        assert_eq!(model.mesh_instance_count(), 0);
    }

    #[test]
    fn test_add_material() {
        let mut model = Model::new();
        let mut material = Material::phong();
        material.name = "example".to_string();
        let index = model.add_material(material);
        assert_eq!(model.material_count(), 1);
        assert_eq!(model.material(index).name, "example");
    }

    #[test]
    fn test_add_mesh() {
        let mut model = Model::new();
        let mut mesh = Mesh::new();
        mesh.set_name("example");
        let index = model.add_mesh(mesh);
        assert_eq!(model.mesh_count(), 1);
        assert_eq!(model.mesh(index).name(), "example");
    }

    #[test]
    fn test_counters() {
        let mut model = Model::new();
        let mut mesh = Mesh::new();
        mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        mesh.add_normal(Vector3::new(0.0, 0.0, 1.0));
        mesh.add_normal(Vector3::new(0.0, 0.0, 1.0));
        mesh.add_uv(Point2::new(0.0, 0.0));
        for _ in 0..4 {
            mesh.add_triangle(Triangle::new(0, 1, 2));
        }
        model.add_mesh_to_root_node(mesh);

        assert_eq!(model.vertex_count(), 3);
        assert_eq!(model.normal_count(), 2);
        assert_eq!(model.uv_count(), 1);
        assert_eq!(model.triangle_count(), 4);
    }

    #[test]
    fn test_remove_mesh() {
        let mut model = Model::new();
        model.add_mesh_to_root_node(triangle_mesh(0.0));
        model.add_mesh_to_root_node(triangle_mesh(1.0));

        assert_eq!(model.mesh_count(), 2);
        assert_eq!(model.vertex_count(), 6);
        assert_eq!(model.triangle_count(), 2);

        model.remove_mesh(0);
        assert_eq!(model.mesh_count(), 1);
        assert_eq!(model.vertex_count(), 3);
        assert_eq!(model.triangle_count(), 1);
        assert_eq!(model.root_node().mesh_indices(), &[0]);

        model.remove_mesh(0);
        assert_eq!(model.mesh_count(), 0);
        assert_eq!(model.vertex_count(), 0);
        assert_eq!(model.triangle_count(), 0);
    }

    #[test]
    fn test_remove_mesh_reindexes_deep_nodes() {
        let mut model = Model::new();
        for index in 0..3 {
            let mut mesh = triangle_mesh(index as f64);
            mesh.set_name(format!("Mesh {}", index + 1));
            model.add_mesh(mesh);
        }

        let mut child = Node::new();
        child.add_mesh_index(0);
        child.add_mesh_index(2);
        model.root_node_mut().add_child_node(child);
        model.root_node_mut().add_mesh_index(1);

        model.remove_mesh(1);
        assert_eq!(model.root_node().mesh_indices(), &[] as &[usize]);
        assert_eq!(model.root_node().children()[0].mesh_indices(), &[0, 1]);
        assert_eq!(model.mesh(1).name(), "Mesh 3");
    }

    #[test]
    fn test_enumerate_mesh_instances() {
        let mut model = Model::new();

        let mut cube = generate_cuboid(1.0, 1.0, 1.0);
        cube.set_name("Cube");
        model.add_mesh(cube);
        model.root_node_mut().add_mesh_index(0);

        let mut translated = Node::new();
        translated.set_name("Translated");
        translated.set_transformation(Transformation::from_translation(2.0, 0.0, 0.0));
        translated.add_mesh_index(0);

        let mut rotated = Node::new();
        rotated.set_name("Rotated");
        rotated.set_transformation(Transformation::from_rotation(
            &UnitQuaternion::from_axis_angle(&Unit::new_normalize(Vector3::z()), PI / 2.0),
        ));

        let mut translated_rotated = Node::new();
        translated_rotated.set_name("Translated and Rotated");
        translated_rotated.set_transformation(Transformation::from_translation(2.0, 0.0, 0.0));
        translated_rotated.add_mesh_index(0);
        rotated.add_child_node(translated_rotated);

        model.root_node_mut().add_child_node(translated);
        model.root_node_mut().add_child_node(rotated);

        let mut boxes = Vec::new();
        model.enumerate_mesh_instances(&mut |instance| {
            boxes.push(bounding_box(instance).expect("cube is not empty"));
        });

        assert_eq!(boxes.len(), 3);
        assert_eq!(model.mesh_instance_count(), 3);

        assert!(is_equal_point3(&boxes[0].min, &Point3::new(0.0, 0.0, 0.0)));
        assert!(is_equal_point3(&boxes[0].max, &Point3::new(1.0, 1.0, 1.0)));

        assert!(is_equal_point3(&boxes[1].min, &Point3::new(2.0, 0.0, 0.0)));
        assert!(is_equal_point3(&boxes[1].max, &Point3::new(3.0, 1.0, 1.0)));

        assert!(is_equal_point3(&boxes[2].min, &Point3::new(-1.0, 2.0, 0.0)));
        assert!(is_equal_point3(&boxes[2].max, &Point3::new(0.0, 3.0, 1.0)));
    }

    #[test]
    fn test_enumerate_transformed_meshes() {
        let mut model = Model::new();
        model.add_mesh_to_root_node(generate_cuboid(1.0, 1.0, 1.0));

        let mut translated = Node::new();
        translated.set_transformation(Transformation::from_translation(2.0, 0.0, 0.0));
        translated.add_mesh_index(0);
        model.root_node_mut().add_child_node(translated);

        let mut boxes = Vec::new();
        model.enumerate_transformed_meshes(&mut |mesh| {
            boxes.push(bounding_box(&mesh).expect("cube is not empty"));
        });

        assert_eq!(boxes.len(), 2);
        assert!(is_equal_point3(&boxes[1].min, &Point3::new(2.0, 0.0, 0.0)));
        assert!(is_equal_point3(&boxes[1].max, &Point3::new(3.0, 1.0, 1.0)));
    }

    #[test]
    fn test_is_model_empty() {
        let mut model = Model::new();
        assert!(is_model_empty(&model));

        model.add_mesh_to_root_node(Mesh::new());
        assert!(is_model_empty(&model));

        model.add_mesh_to_root_node(triangle_mesh(0.0));
        assert!(!is_model_empty(&model));
    }

    #[test]
    fn test_default_material_helpers() {
        let mut model = Model::new();
        model.add_material(Material::phong());
        assert!(!has_default_material(&model));

        let mut synthesized = Material::phong();
        synthesized.is_default = true;
        model.add_material(synthesized);
        assert!(has_default_material(&model));

        replace_default_material_color(&mut model, Color::new(10, 20, 30));
        assert_eq!(model.material(1).color, Color::new(10, 20, 30));
        assert_eq!(model.material(0).color, Color::BLACK);
    }

    #[test]
    fn test_representative_shading_model() {
        let mut model = Model::new();
        assert_eq!(representative_shading_model(&model), ShadingModel::Phong);

        model.add_material(Material::physical());
        model.add_material(Material::physical());
        model.add_material(Material::phong());
        assert_eq!(representative_shading_model(&model), ShadingModel::Physical);
    }
}
