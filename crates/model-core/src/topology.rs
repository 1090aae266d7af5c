//! Vertex/edge/triangle adjacency graph derived from triangle soup.
//!
//! The topology is rebuilt on demand from any [`Object3D`] and never
//! persisted on a mesh. Coincident corner positions are merged through
//! the octree, so instanced meshes that touch are stitched together.

use hashbrown::HashMap;
use nalgebra::Point3;
use tracing::debug;

use crate::object3d::{bounding_box, Object3D};
use crate::octree::Octree;

/// A deduplicated topology vertex with incidence lists.
#[derive(Debug, Clone, Default)]
pub struct TopologyVertex {
    /// Indices of edges meeting at this vertex.
    pub edges: Vec<usize>,
    /// Indices of triangles touching this vertex.
    pub triangles: Vec<usize>,
}

/// An undirected edge keyed by its canonically ordered endpoints.
#[derive(Debug, Clone)]
pub struct TopologyEdge {
    /// Smaller endpoint vertex index.
    pub vertex1: usize,
    /// Larger endpoint vertex index.
    pub vertex2: usize,
    /// Indices of triangles using this edge.
    pub triangles: Vec<usize>,
}

/// One traversal of an edge by a triangle.
#[derive(Debug, Clone, Copy)]
pub struct TopologyTriangleEdge {
    pub edge: usize,
    /// Whether the triangle walks the edge against its canonical
    /// (smaller to larger vertex index) direction.
    pub reversed: bool,
}

/// A triangle with links to its three edge traversals.
#[derive(Debug, Clone)]
pub struct TopologyTriangle {
    pub vertices: [usize; 3],
    pub triangle_edges: [usize; 3],
}

/// Adjacency graph over deduplicated vertices.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    pub vertices: Vec<TopologyVertex>,
    pub edges: Vec<TopologyEdge>,
    pub triangle_edges: Vec<TopologyTriangleEdge>,
    pub triangles: Vec<TopologyTriangle>,
    edge_lookup: HashMap<(usize, usize), usize>,
}

impl Topology {
    /// Builds the topology of any object by merging epsilon-coincident
    /// triangle corners and recording edge adjacency.
    pub fn build<T: Object3D + ?Sized>(object: &T) -> Topology {
        let mut topology = Topology::default();

        let Some(bounds) = bounding_box(object) else {
            return topology;
        };
        let mut octree: Octree<usize> = Octree::new(bounds);

        object.enumerate_triangle_vertices(&mut |v0, v1, v2| {
            let i0 = vertex_index(&mut topology, &mut octree, v0);
            let i1 = vertex_index(&mut topology, &mut octree, v1);
            let i2 = vertex_index(&mut topology, &mut octree, v2);
            topology.add_triangle(i0, i1, i2);
        });

        debug!(
            "built topology: {} vertices, {} edges, {} triangles",
            topology.vertices.len(),
            topology.edges.len(),
            topology.triangles.len()
        );
        topology
    }

    fn add_vertex(&mut self) -> usize {
        self.vertices.push(TopologyVertex::default());
        self.vertices.len() - 1
    }

    fn add_triangle(&mut self, v0: usize, v1: usize, v2: usize) {
        let triangle_index = self.triangles.len();

        let triangle_edges = [
            self.add_triangle_edge(v0, v1, triangle_index),
            self.add_triangle_edge(v1, v2, triangle_index),
            self.add_triangle_edge(v2, v0, triangle_index),
        ];

        for &vertex in &[v0, v1, v2] {
            self.vertices[vertex].triangles.push(triangle_index);
        }

        self.triangles.push(TopologyTriangle {
            vertices: [v0, v1, v2],
            triangle_edges,
        });
    }

    fn add_triangle_edge(&mut self, from: usize, to: usize, triangle_index: usize) -> usize {
        let key = (from.min(to), from.max(to));
        let reversed = from > to;

        let edge_index = match self.edge_lookup.get(&key) {
            Some(&existing) => existing,
            None => {
                let edge_index = self.edges.len();
                self.edges.push(TopologyEdge {
                    vertex1: key.0,
                    vertex2: key.1,
                    triangles: Vec::new(),
                });
                self.vertices[key.0].edges.push(edge_index);
                if key.1 != key.0 {
                    self.vertices[key.1].edges.push(edge_index);
                }
                self.edge_lookup.insert(key, edge_index);
                edge_index
            }
        };

        self.edges[edge_index].triangles.push(triangle_index);

        let triangle_edge_index = self.triangle_edges.len();
        self.triangle_edges.push(TopologyTriangleEdge {
            edge: edge_index,
            reversed,
        });
        triangle_edge_index
    }

    /// How a triangle traverses an edge, or `None` if it does not use it.
    pub fn edge_orientation_in_triangle(
        &self,
        triangle_index: usize,
        edge_index: usize,
    ) -> Option<bool> {
        let triangle = &self.triangles[triangle_index];
        triangle
            .triangle_edges
            .iter()
            .map(|&te| self.triangle_edges[te])
            .find(|te| te.edge == edge_index)
            .map(|te| te.reversed)
    }
}

fn vertex_index(
    topology: &mut Topology,
    octree: &mut Octree<usize>,
    position: &Point3<f64>,
) -> usize {
    if let Some(&existing) = octree.find_point(position) {
        return existing;
    }
    let index = topology.add_vertex();
    octree.add_point(position, index);
    index
}
