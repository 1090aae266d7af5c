//! Triangle mesh with indexed vertices, normals and texture UVs.

use nalgebra::{Point2, Point3, Vector3};

use crate::error::{ModelError, ModelResult};
use crate::transform::Transformation;

/// A triangle referencing mesh attribute arrays by index.
///
/// Vertex indices are always present. Normal and UV indices are
/// all-or-nothing per triangle, so a triangle can never carry a partial
/// set of normals.
#[derive(Debug, Clone)]
pub struct Triangle {
    /// Vertex indices with counter-clockwise winding.
    pub vertices: [u32; 3],

    /// Per-corner normal indices, unset until synthesized or imported.
    pub normals: Option<[u32; 3]>,

    /// Per-corner texture UV indices.
    pub uvs: Option<[u32; 3]>,

    /// Material index into the model's material array.
    pub material: Option<u32>,

    /// Curve group tag. Triangles sharing a non-zero tag within one mesh
    /// receive averaged (smooth) normals during finalization; zero means
    /// flat shading.
    pub curve: u32,
}

impl Triangle {
    pub fn new(v0: u32, v1: u32, v2: u32) -> Self {
        Self {
            vertices: [v0, v1, v2],
            normals: None,
            uvs: None,
            material: None,
            curve: 0,
        }
    }

    pub fn with_normals(mut self, n0: u32, n1: u32, n2: u32) -> Self {
        self.normals = Some([n0, n1, n2]);
        self
    }

    pub fn with_uvs(mut self, u0: u32, u1: u32, u2: u32) -> Self {
        self.uvs = Some([u0, u1, u2]);
        self
    }

    pub fn with_material(mut self, material: u32) -> Self {
        self.material = Some(material);
        self
    }

    pub fn with_curve(mut self, curve: u32) -> Self {
        self.curve = curve;
        self
    }

    #[inline]
    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    #[inline]
    pub fn has_uvs(&self) -> bool {
        self.uvs.is_some()
    }
}

/// A named triangle mesh owning parallel attribute arrays.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    name: String,
    vertices: Vec<Point3<f64>>,
    normals: Vec<Vector3<f64>>,
    uvs: Vec<Point2<f64>>,
    triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            name: String::new(),
            vertices: Vec::with_capacity(vertex_count),
            normals: Vec::new(),
            uvs: Vec::new(),
            triangles: Vec::with_capacity(triangle_count),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Appends a vertex and returns its index.
    pub fn add_vertex(&mut self, vertex: Point3<f64>) -> usize {
        self.vertices.push(vertex);
        self.vertices.len() - 1
    }

    /// Appends a normal and returns its index.
    pub fn add_normal(&mut self, normal: Vector3<f64>) -> usize {
        self.normals.push(normal);
        self.normals.len() - 1
    }

    /// Appends a texture UV and returns its index.
    pub fn add_uv(&mut self, uv: Point2<f64>) -> usize {
        self.uvs.push(uv);
        self.uvs.len() - 1
    }

    /// Appends a triangle and returns its index.
    pub fn add_triangle(&mut self, triangle: Triangle) -> usize {
        self.triangles.push(triangle);
        self.triangles.len() - 1
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn normal_count(&self) -> usize {
        self.normals.len()
    }

    #[inline]
    pub fn uv_count(&self) -> usize {
        self.uvs.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn vertex(&self, index: usize) -> &Point3<f64> {
        &self.vertices[index]
    }

    pub fn vertex_mut(&mut self, index: usize) -> &mut Point3<f64> {
        &mut self.vertices[index]
    }

    pub fn normal(&self, index: usize) -> &Vector3<f64> {
        &self.normals[index]
    }

    pub fn uv(&self, index: usize) -> &Point2<f64> {
        &self.uvs[index]
    }

    pub fn triangle(&self, index: usize) -> &Triangle {
        &self.triangles[index]
    }

    pub fn triangle_mut(&mut self, index: usize) -> &mut Triangle {
        &mut self.triangles[index]
    }

    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    pub fn normals(&self) -> &[Vector3<f64>] {
        &self.normals
    }

    pub fn uvs(&self) -> &[Point2<f64>] {
        &self.uvs
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// The three corner positions of a triangle.
    pub fn triangle_vertices(&self, triangle: &Triangle) -> [&Point3<f64>; 3] {
        [
            &self.vertices[triangle.vertices[0] as usize],
            &self.vertices[triangle.vertices[1] as usize],
            &self.vertices[triangle.vertices[2] as usize],
        ]
    }

    /// Whether the mesh carries no triangles. Vertex-only meshes count as
    /// empty; finalization prunes them.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Checks every index a triangle carries against the owning arrays.
    ///
    /// `material_count` is the model-level material array size. Fails on
    /// the first unresolvable index; the mesh is not modified.
    pub fn validate_indices(&self, material_count: usize) -> ModelResult<()> {
        for triangle in &self.triangles {
            for &vertex in &triangle.vertices {
                if vertex as usize >= self.vertices.len() {
                    return Err(ModelError::VertexIndexOutOfRange {
                        index: vertex,
                        count: self.vertices.len(),
                    });
                }
            }
            if let Some(normals) = triangle.normals {
                for &normal in &normals {
                    if normal as usize >= self.normals.len() {
                        return Err(ModelError::NormalIndexOutOfRange {
                            index: normal,
                            count: self.normals.len(),
                        });
                    }
                }
            }
            if let Some(uvs) = triangle.uvs {
                for &uv in &uvs {
                    if uv as usize >= self.uvs.len() {
                        return Err(ModelError::UvIndexOutOfRange {
                            index: uv,
                            count: self.uvs.len(),
                        });
                    }
                }
            }
            if let Some(material) = triangle.material {
                if material as usize >= material_count {
                    return Err(ModelError::MaterialIndexOutOfRange {
                        index: material,
                        count: material_count,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Transforms a mesh in place. Vertices use the full matrix, normals the
/// rotation-only part. Identity transforms are skipped.
///
/// Explicit utility for fixtures and generator baking; the rest of the
/// crate never transforms meshes in place.
pub fn transform_mesh(mesh: &mut Mesh, transformation: &Transformation) {
    if transformation.is_identity() {
        return;
    }

    for vertex in &mut mesh.vertices {
        *vertex = transformation.transform_point(vertex);
    }

    if !mesh.normals.is_empty() {
        let rotation = transformation.rotation_only();
        for normal in &mut mesh.normals {
            *normal = rotation.transform_vector(normal);
        }
    }
}

/// Reverses the winding of every triangle by swapping two vertex indices.
pub fn flip_triangle_orientation(mesh: &mut Mesh) {
    for triangle in &mut mesh.triangles {
        triangle.vertices.swap(1, 2);
    }
}
