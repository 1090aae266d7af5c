//! Core of the 3D model interchange toolkit.
//!
//! Importers populate a [`Model`] with raw meshes, run it through
//! [`finalize_model`] to synthesize missing normals, attach a default
//! material and prune empty data, and exporters and UIs then consume the
//! model through read-only enumeration. Geometric queries work on
//! anything implementing [`Object3D`]:
//!
//! ```
//! use model_core::{calculate_volume, finalize_model, generate_cuboid, Material, Model};
//!
//! let mut model = Model::new();
//! model.add_mesh_to_root_node(generate_cuboid(1.0, 1.0, 1.0));
//! finalize_model(&mut model, Material::phong).unwrap();
//!
//! let volume = calculate_volume(&model).unwrap();
//! assert!((volume - 1.0).abs() < 1e-8);
//! ```

mod error;

pub mod finalize;
pub mod generator;
pub mod geometry;
pub mod material;
pub mod mesh;
pub mod model;
pub mod node;
pub mod object3d;
pub mod octree;
pub mod property;
pub mod quantities;
pub mod topology;
pub mod transform;

pub use error::{ModelError, ModelResult};

pub use finalize::finalize_model;
pub use generator::{
    generate_cuboid, generate_cylinder, generate_dodecahedron, generate_icosahedron,
    generate_octahedron, generate_sphere, generate_tetrahedron,
};
pub use geometry::{BoundingBox, Direction, EPS};
pub use material::{
    color_to_hex_string, hex_string_to_color, Color, Material, MaterialKind, ShadingModel,
    TextureMap,
};
pub use mesh::{flip_triangle_orientation, transform_mesh, Mesh, Triangle};
pub use model::{
    has_default_material, is_model_empty, replace_default_material_color,
    representative_shading_model, MeshInstance, Model,
};
pub use node::Node;
pub use object3d::{bounding_box, Object3D};
pub use octree::Octree;
pub use property::{Property, PropertyGroup, PropertyValue};
pub use quantities::{calculate_surface_area, calculate_volume, is_solid};
pub use topology::Topology;
pub use transform::Transformation;
