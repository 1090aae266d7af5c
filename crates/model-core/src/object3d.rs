//! Capability-based polymorphism over renderable geometry.
//!
//! Anything that can enumerate its vertices and triangle corners
//! (a mesh, a placed mesh instance, a whole model) qualifies as an
//! [`Object3D`], and the topology and quantity engines accept all of
//! them through the same functions.

use nalgebra::{Point3, Vector3};

use crate::geometry::{self, BoundingBox, BoundingBoxCalculator};

/// Read-only enumeration contract for triangle geometry.
pub trait Object3D {
    /// Visits every vertex position.
    fn enumerate_vertices(&self, visitor: &mut dyn FnMut(&Point3<f64>));

    /// Visits every triangle as three corner positions, already in the
    /// object's resolved coordinate space.
    fn enumerate_triangle_vertices(
        &self,
        visitor: &mut dyn FnMut(&Point3<f64>, &Point3<f64>, &Point3<f64>),
    );
}

/// Bounding box of any object, or `None` when it has no vertices.
pub fn bounding_box<T: Object3D + ?Sized>(object: &T) -> Option<BoundingBox> {
    let mut calculator = BoundingBoxCalculator::new();
    object.enumerate_vertices(&mut |vertex| calculator.add_point(vertex));
    calculator.bounding_box()
}

/// Visits every triangle together with its computed face normal.
pub fn enumerate_triangles_with_normals<T: Object3D + ?Sized>(
    object: &T,
    visitor: &mut dyn FnMut(&Point3<f64>, &Point3<f64>, &Point3<f64>, &Vector3<f64>),
) {
    object.enumerate_triangle_vertices(&mut |v0, v1, v2| {
        let normal = geometry::triangle_normal(v0, v1, v2);
        visitor(v0, v1, v2, &normal);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::is_equal_point3;
    use crate::mesh::{Mesh, Triangle};

    fn single_triangle_mesh() -> Mesh {
        let mut mesh = Mesh::new();
        mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        mesh.add_vertex(Point3::new(1.0, 1.0, 0.0));
        mesh.add_triangle(Triangle::new(0, 1, 2));
        mesh
    }

    #[test]
    fn test_bounding_box() {
        let mesh = single_triangle_mesh();
        let bounds = bounding_box(&mesh).expect("non-empty mesh");
        assert!(is_equal_point3(&bounds.min, &Point3::new(0.0, 0.0, 0.0)));
        assert!(is_equal_point3(&bounds.max, &Point3::new(1.0, 1.0, 0.0)));
    }

    #[test]
    fn test_empty_bounding_box() {
        let mesh = Mesh::new();
        assert!(bounding_box(&mesh).is_none());
    }

    #[test]
    fn test_triangles_with_normals() {
        let mesh = single_triangle_mesh();
        let mut normals = Vec::new();
        enumerate_triangles_with_normals(&mesh, &mut |_, _, _, normal| {
            normals.push(*normal);
        });
        assert_eq!(normals.len(), 1);
        assert!(crate::geometry::is_equal_vector3(
            &normals[0],
            &Vector3::new(0.0, 0.0, 1.0)
        ));
    }
}
