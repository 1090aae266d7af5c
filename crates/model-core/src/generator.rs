//! Parametric mesh generators for fixtures, demos and smoke tests.
//!
//! All generators produce consistently oriented (counter-clockwise,
//! outward facing) closed surfaces, so the results are solid and carry a
//! positive volume.

use nalgebra::{Point3, Vector3};
use std::f64::consts::PI;

use crate::mesh::{Mesh, Triangle};

fn add_quad(mesh: &mut Mesh, a: u32, b: u32, c: u32, d: u32) {
    mesh.add_triangle(Triangle::new(a, b, c));
    mesh.add_triangle(Triangle::new(a, c, d));
}

/// Axis-aligned box with one corner at the origin.
pub fn generate_cuboid(size_x: f64, size_y: f64, size_z: f64) -> Mesh {
    let mut mesh = Mesh::with_capacity(8, 12);

    mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
    mesh.add_vertex(Point3::new(size_x, 0.0, 0.0));
    mesh.add_vertex(Point3::new(size_x, size_y, 0.0));
    mesh.add_vertex(Point3::new(0.0, size_y, 0.0));
    mesh.add_vertex(Point3::new(0.0, 0.0, size_z));
    mesh.add_vertex(Point3::new(size_x, 0.0, size_z));
    mesh.add_vertex(Point3::new(size_x, size_y, size_z));
    mesh.add_vertex(Point3::new(0.0, size_y, size_z));

    add_quad(&mut mesh, 0, 3, 2, 1);
    add_quad(&mut mesh, 0, 1, 5, 4);
    add_quad(&mut mesh, 1, 2, 6, 5);
    add_quad(&mut mesh, 2, 3, 7, 6);
    add_quad(&mut mesh, 3, 0, 4, 7);
    add_quad(&mut mesh, 4, 5, 6, 7);

    mesh
}

/// Regular tetrahedron with the given circumradius, centered on the origin.
pub fn generate_tetrahedron(radius: f64) -> Mesh {
    let a = radius / 3.0_f64.sqrt();
    let mut mesh = Mesh::with_capacity(4, 4);

    mesh.add_vertex(Point3::new(a, a, a));
    mesh.add_vertex(Point3::new(-a, -a, a));
    mesh.add_vertex(Point3::new(-a, a, -a));
    mesh.add_vertex(Point3::new(a, -a, -a));

    mesh.add_triangle(Triangle::new(0, 1, 3));
    mesh.add_triangle(Triangle::new(0, 2, 1));
    mesh.add_triangle(Triangle::new(0, 3, 2));
    mesh.add_triangle(Triangle::new(1, 2, 3));

    mesh
}

/// Regular octahedron with the given circumradius, centered on the origin.
pub fn generate_octahedron(radius: f64) -> Mesh {
    let r = radius;
    let mut mesh = Mesh::with_capacity(6, 8);

    mesh.add_vertex(Point3::new(r, 0.0, 0.0));
    mesh.add_vertex(Point3::new(-r, 0.0, 0.0));
    mesh.add_vertex(Point3::new(0.0, r, 0.0));
    mesh.add_vertex(Point3::new(0.0, -r, 0.0));
    mesh.add_vertex(Point3::new(0.0, 0.0, r));
    mesh.add_vertex(Point3::new(0.0, 0.0, -r));

    for &[a, b, c] in &[
        [0, 2, 4],
        [2, 1, 4],
        [1, 3, 4],
        [3, 0, 4],
        [2, 0, 5],
        [1, 2, 5],
        [3, 1, 5],
        [0, 3, 5],
    ] {
        mesh.add_triangle(Triangle::new(a, b, c));
    }

    mesh
}

/// Regular icosahedron with the given circumradius, centered on the origin.
pub fn generate_icosahedron(radius: f64) -> Mesh {
    let t = (1.0 + 5.0_f64.sqrt()) / 2.0;
    let scale = radius / (1.0 + t * t).sqrt();

    let vertices = [
        (-1.0, t, 0.0),
        (1.0, t, 0.0),
        (-1.0, -t, 0.0),
        (1.0, -t, 0.0),
        (0.0, -1.0, t),
        (0.0, 1.0, t),
        (0.0, -1.0, -t),
        (0.0, 1.0, -t),
        (t, 0.0, -1.0),
        (t, 0.0, 1.0),
        (-t, 0.0, -1.0),
        (-t, 0.0, 1.0),
    ];
    let faces = [
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];

    let mut mesh = Mesh::with_capacity(vertices.len(), faces.len());
    for &(x, y, z) in &vertices {
        mesh.add_vertex(Point3::new(x * scale, y * scale, z * scale));
    }
    for &[a, b, c] in &faces {
        mesh.add_triangle(Triangle::new(a, b, c));
    }
    mesh
}

/// Regular dodecahedron with the given circumradius, centered on the origin.
///
/// Faces are derived from the twelve face-plane directions: the five
/// extreme vertices along each direction form a pentagon, ordered around
/// the face normal and fan triangulated.
pub fn generate_dodecahedron(radius: f64) -> Mesh {
    let phi = (1.0 + 5.0_f64.sqrt()) / 2.0;
    let inv = 1.0 / phi;
    let scale = radius / 3.0_f64.sqrt();

    let mut base: Vec<Vector3<f64>> = Vec::with_capacity(20);
    for &x in &[-1.0, 1.0] {
        for &y in &[-1.0, 1.0] {
            for &z in &[-1.0, 1.0] {
                base.push(Vector3::new(x, y, z));
            }
        }
    }
    for &(a, b) in &[(-inv, -phi), (-inv, phi), (inv, -phi), (inv, phi)] {
        base.push(Vector3::new(0.0, a, b));
        base.push(Vector3::new(a, b, 0.0));
        base.push(Vector3::new(b, 0.0, a));
    }

    let mut face_normals: Vec<Vector3<f64>> = Vec::with_capacity(12);
    for &(a, b) in &[(-phi, -1.0), (-phi, 1.0), (phi, -1.0), (phi, 1.0)] {
        face_normals.push(Vector3::new(0.0, a, b));
        face_normals.push(Vector3::new(a, b, 0.0));
        face_normals.push(Vector3::new(b, 0.0, a));
    }

    let mut mesh = Mesh::with_capacity(base.len(), 36);
    for position in &base {
        mesh.add_vertex(Point3::from(position * scale));
    }

    for normal in &face_normals {
        // The five extreme vertices along the face direction; the next
        // tier is separated by a margin of 2, so the cut is safe.
        let max_dot = base
            .iter()
            .map(|v| v.dot(normal))
            .fold(f64::NEG_INFINITY, f64::max);
        let mut face: Vec<usize> = (0..base.len())
            .filter(|&i| base[i].dot(normal) > max_dot - 1e-6)
            .collect();

        // Order the pentagon counter-clockwise viewed from outside.
        let n = normal.normalize();
        let axis = if normal.x == 0.0 {
            Vector3::x()
        } else if normal.y == 0.0 {
            Vector3::y()
        } else {
            Vector3::z()
        };
        let u = axis;
        let w = n.cross(&u);
        face.sort_by(|&i, &j| {
            let angle = |index: usize| {
                let v = &base[index];
                v.dot(&w).atan2(v.dot(&u))
            };
            angle(i)
                .partial_cmp(&angle(j))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        for k in 1..face.len() - 1 {
            mesh.add_triangle(Triangle::new(
                face[0] as u32,
                face[k] as u32,
                face[k + 1] as u32,
            ));
        }
    }

    mesh
}

/// Latitude/longitude sphere approximation with smooth shading tags.
///
/// `segments` is the number of latitudinal stacks; twice as many
/// meridians are used. All triangles share curve group 1, so finalization
/// produces averaged per-vertex normals.
pub fn generate_sphere(radius: f64, segments: usize) -> Mesh {
    assert!(segments >= 3, "sphere needs at least 3 segments");
    let stacks = segments;
    let slices = segments * 2;

    let mut mesh = Mesh::with_capacity(2 + (stacks - 1) * slices, 2 * slices * (stacks - 1));

    let top = mesh.add_vertex(Point3::new(0.0, 0.0, radius)) as u32;
    for i in 1..stacks {
        let theta = PI * i as f64 / stacks as f64;
        for j in 0..slices {
            let phi = 2.0 * PI * j as f64 / slices as f64;
            mesh.add_vertex(Point3::new(
                radius * theta.sin() * phi.cos(),
                radius * theta.sin() * phi.sin(),
                radius * theta.cos(),
            ));
        }
    }
    let bottom = mesh.add_vertex(Point3::new(0.0, 0.0, -radius)) as u32;

    let ring = |i: usize, j: usize| -> u32 { (1 + (i - 1) * slices + (j % slices)) as u32 };

    for j in 0..slices {
        mesh.add_triangle(Triangle::new(top, ring(1, j), ring(1, j + 1)).with_curve(1));
    }
    for i in 1..stacks - 1 {
        for j in 0..slices {
            let a = ring(i, j);
            let b = ring(i + 1, j);
            let c = ring(i + 1, j + 1);
            let d = ring(i, j + 1);
            mesh.add_triangle(Triangle::new(a, b, c).with_curve(1));
            mesh.add_triangle(Triangle::new(a, c, d).with_curve(1));
        }
    }
    for j in 0..slices {
        mesh.add_triangle(
            Triangle::new(bottom, ring(stacks - 1, j + 1), ring(stacks - 1, j)).with_curve(1),
        );
    }

    mesh
}

/// Closed cylinder along the Z axis with its base on the XY plane.
///
/// Side triangles share curve group 1 when `smooth` is set; the caps stay
/// flat shaded either way.
pub fn generate_cylinder(radius: f64, height: f64, segments: usize, smooth: bool) -> Mesh {
    assert!(segments >= 3, "cylinder needs at least 3 segments");

    let mut mesh = Mesh::with_capacity(2 * segments, 2 * segments + 2 * (segments - 2));
    for &z in &[0.0, height] {
        for j in 0..segments {
            let phi = 2.0 * PI * j as f64 / segments as f64;
            mesh.add_vertex(Point3::new(radius * phi.cos(), radius * phi.sin(), z));
        }
    }

    let bottom = |j: usize| -> u32 { (j % segments) as u32 };
    let top = |j: usize| -> u32 { (segments + j % segments) as u32 };
    let curve = if smooth { 1 } else { 0 };

    for j in 0..segments {
        let a = bottom(j);
        let b = bottom(j + 1);
        let c = top(j + 1);
        let d = top(j);
        mesh.add_triangle(Triangle::new(a, b, c).with_curve(curve));
        mesh.add_triangle(Triangle::new(a, c, d).with_curve(curve));
    }
    for k in 1..segments - 1 {
        mesh.add_triangle(Triangle::new(top(0), top(k), top(k + 1)));
        mesh.add_triangle(Triangle::new(bottom(0), bottom(k + 1), bottom(k)));
    }

    mesh
}
