//! STL import and export, binary and ASCII reads via `stl_io`.
//!
//! STL carries a flat triangle soup, so a file imports as a single mesh
//! and exporting flattens every mesh instance into one solid.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use tracing::{debug, info};

use model_core::geometry::triangle_normal;
use model_core::{Direction, Mesh, Model, Object3D, Triangle};

use crate::error::{FormatError, FormatResult};
use crate::registry::{ExportFormat, ImportFormat};

pub struct StlFormat;

impl ImportFormat for StlFormat {
    fn can_handle(&self, extension: &str) -> bool {
        extension == "stl"
    }

    fn up_direction(&self) -> Direction {
        Direction::Z
    }

    fn import(&self, path: &Path) -> FormatResult<Model> {
        let file = File::open(path).map_err(|e| FormatError::IoRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut reader = BufReader::new(file);

        let stl = stl_io::read_stl(&mut reader).map_err(|e| FormatError::Parse {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;

        debug!(
            "STL contains {} vertices, {} triangles",
            stl.vertices.len(),
            stl.faces.len()
        );

        let mut mesh = Mesh::with_capacity(stl.vertices.len(), stl.faces.len());
        for vertex in &stl.vertices {
            mesh.add_vertex(nalgebra::Point3::new(
                vertex.0[0] as f64,
                vertex.0[1] as f64,
                vertex.0[2] as f64,
            ));
        }
        for face in &stl.faces {
            let [i0, i1, i2] = [
                face.vertices[0] as u32,
                face.vertices[1] as u32,
                face.vertices[2] as u32,
            ];
            // Degenerate faces are dropped at the door.
            if i0 != i1 && i1 != i2 && i0 != i2 {
                mesh.add_triangle(Triangle::new(i0, i1, i2));
            }
        }

        info!(
            "STL loaded: {} vertices, {} triangles from {:?}",
            mesh.vertex_count(),
            mesh.triangle_count(),
            path
        );

        let mut model = Model::new();
        model.add_mesh_to_root_node(mesh);
        Ok(model)
    }
}

impl ExportFormat for StlFormat {
    fn can_handle(&self, extension: &str) -> bool {
        extension == "stl"
    }

    fn export(&self, model: &Model, path: &Path) -> FormatResult<()> {
        let mut triangles: Vec<stl_io::Triangle> = Vec::new();
        model.enumerate_triangle_vertices(&mut |v0, v1, v2| {
            let normal = triangle_normal(v0, v1, v2);
            triangles.push(stl_io::Triangle {
                normal: stl_io::Normal::new([normal.x as f32, normal.y as f32, normal.z as f32]),
                vertices: [
                    stl_io::Vertex::new([v0.x as f32, v0.y as f32, v0.z as f32]),
                    stl_io::Vertex::new([v1.x as f32, v1.y as f32, v1.z as f32]),
                    stl_io::Vertex::new([v2.x as f32, v2.y as f32, v2.z as f32]),
                ],
            });
        });

        let file = File::create(path).map_err(|e| FormatError::IoWrite {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut writer = BufWriter::new(file);

        stl_io::write_stl(&mut writer, triangles.iter()).map_err(|e| FormatError::IoWrite {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
        })?;
        writer.flush().map_err(|e| FormatError::IoWrite {
            path: path.to_path_buf(),
            source: e,
        })?;

        info!("STL saved: {} triangles to {:?}", triangles.len(), path);
        Ok(())
    }
}
