//! Solidity test and derived quantities (volume, surface area).

use crate::geometry::triangle_area;
use crate::object3d::Object3D;
use crate::topology::Topology;

/// Whether the object is a closed, consistently oriented 2-manifold.
///
/// Every topology edge must be used by an even, non-zero number of
/// triangles, and the traversal directions across the edge must cancel
/// out exactly: each edge is walked once in each direction overall.
pub fn is_solid<T: Object3D + ?Sized>(object: &T) -> bool {
    let topology = Topology::build(object);
    is_solid_topology(&topology)
}

fn is_solid_topology(topology: &Topology) -> bool {
    for (edge_index, edge) in topology.edges.iter().enumerate() {
        let triangle_count = edge.triangles.len();
        if triangle_count == 0 || triangle_count % 2 != 0 {
            return false;
        }

        let mut direction_sum = 0i64;
        for &triangle_index in &edge.triangles {
            match topology.edge_orientation_in_triangle(triangle_index, edge_index) {
                Some(true) => direction_sum += 1,
                Some(false) => direction_sum -= 1,
                None => return false,
            }
        }
        if direction_sum != 0 {
            return false;
        }
    }
    true
}

/// Volume enclosed by the object, or `None` when the object is not solid
/// (the quantity is ill-defined for open or inconsistently oriented
/// surfaces).
///
/// Sums the signed volume of the tetrahedron each triangle forms with the
/// origin; for a closed surface the result is origin-independent.
pub fn calculate_volume<T: Object3D + ?Sized>(object: &T) -> Option<f64> {
    if !is_solid(object) {
        return None;
    }

    let mut volume = 0.0;
    object.enumerate_triangle_vertices(&mut |v0, v1, v2| {
        volume += v0.coords.dot(&v1.coords.cross(&v2.coords)) / 6.0;
    });
    Some(volume)
}

/// Total triangle area of the object. Defined for open and non-manifold
/// meshes as well.
pub fn calculate_surface_area<T: Object3D + ?Sized>(object: &T) -> f64 {
    let mut area = 0.0;
    object.enumerate_triangle_vertices(&mut |v0, v1, v2| {
        area += triangle_area(v0, v1, v2);
    });
    area
}
