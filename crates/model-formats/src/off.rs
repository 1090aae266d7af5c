//! Object File Format (OFF) import and export.
//!
//! OFF stores one indexed vertex list and polygonal faces, so a file
//! imports as a single mesh and exporting flattens every mesh instance
//! with globally offset vertex indices.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use nalgebra::Point3;
use tracing::info;

use model_core::{Direction, Mesh, Model, Triangle};

use crate::error::{FormatError, FormatResult};
use crate::registry::{ExportFormat, ImportFormat};

pub struct OffFormat;

impl ImportFormat for OffFormat {
    fn can_handle(&self, extension: &str) -> bool {
        extension == "off"
    }

    fn up_direction(&self) -> Direction {
        Direction::Y
    }

    fn import(&self, path: &Path) -> FormatResult<Model> {
        let file = File::open(path).map_err(|e| FormatError::IoRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let reader = BufReader::new(file);

        let mut lines = Vec::new();
        for line in reader.lines() {
            let line = line.map_err(|e| FormatError::IoRead {
                path: path.to_path_buf(),
                source: e,
            })?;
            let trimmed = line.trim().to_string();
            if !trimmed.is_empty() && !trimmed.starts_with('#') {
                lines.push(trimmed);
            }
        }

        let mesh = parse_off(&lines).map_err(|details| FormatError::Parse {
            path: path.to_path_buf(),
            details,
        })?;

        info!(
            "OFF loaded: {} vertices, {} triangles from {:?}",
            mesh.vertex_count(),
            mesh.triangle_count(),
            path
        );

        let mut model = Model::new();
        model.add_mesh_to_root_node(mesh);
        Ok(model)
    }
}

impl ExportFormat for OffFormat {
    fn can_handle(&self, extension: &str) -> bool {
        extension == "off"
    }

    fn export(&self, model: &Model, path: &Path) -> FormatResult<()> {
        let file = File::create(path).map_err(|e| FormatError::IoWrite {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut writer = BufWriter::new(file);

        write_off(model, &mut writer).map_err(|e| FormatError::IoWrite {
            path: path.to_path_buf(),
            source: e,
        })?;

        info!(
            "OFF saved: {} mesh instances to {:?}",
            model.mesh_instance_count(),
            path
        );
        Ok(())
    }
}

fn parse_off(lines: &[String]) -> Result<Mesh, String> {
    let mut remaining = lines.iter();

    let header = remaining.next().ok_or("empty file")?;
    // Counts may follow the magic word on the same line.
    let counts_tokens: Vec<&str> = if let Some(rest) = header.strip_prefix("OFF") {
        if rest.trim().is_empty() {
            remaining
                .next()
                .ok_or("missing counts line")?
                .split_whitespace()
                .collect()
        } else {
            rest.split_whitespace().collect()
        }
    } else {
        return Err(format!("missing OFF header, found {:?}", header));
    };

    if counts_tokens.len() < 2 {
        return Err("counts line needs vertex and face counts".to_string());
    }
    let vertex_count: usize = counts_tokens[0]
        .parse()
        .map_err(|_| format!("invalid vertex count {:?}", counts_tokens[0]))?;
    let face_count: usize = counts_tokens[1]
        .parse()
        .map_err(|_| format!("invalid face count {:?}", counts_tokens[1]))?;

    let mut mesh = Mesh::with_capacity(vertex_count, face_count);

    for index in 0..vertex_count {
        let line = remaining
            .next()
            .ok_or_else(|| format!("missing vertex {}", index))?;
        let components: Vec<f64> = line
            .split_whitespace()
            .take(3)
            .map(|token| token.parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|_| format!("invalid vertex line {:?}", line))?;
        if components.len() != 3 {
            return Err(format!("invalid vertex line {:?}", line));
        }
        mesh.add_vertex(Point3::new(components[0], components[1], components[2]));
    }

    for index in 0..face_count {
        let line = remaining
            .next()
            .ok_or_else(|| format!("missing face {}", index))?;
        let tokens: Vec<usize> = line
            .split_whitespace()
            .map(|token| token.parse::<usize>())
            .collect::<Result<_, _>>()
            .map_err(|_| format!("invalid face line {:?}", line))?;

        let corner_count = *tokens.first().ok_or_else(|| format!("empty face {}", index))?;
        if tokens.len() < corner_count + 1 || corner_count < 3 {
            return Err(format!("invalid face line {:?}", line));
        }
        let corners = &tokens[1..corner_count + 1];
        for &corner in corners {
            if corner >= vertex_count {
                return Err(format!("face index {} out of range", corner));
            }
        }

        for k in 1..corner_count - 1 {
            mesh.add_triangle(Triangle::new(
                corners[0] as u32,
                corners[k] as u32,
                corners[k + 1] as u32,
            ));
        }
    }

    Ok(mesh)
}

fn write_off<W: Write>(model: &Model, writer: &mut W) -> std::io::Result<()> {
    writeln!(writer, "OFF")?;
    writeln!(
        writer,
        "{} {} 0",
        model.vertex_count(),
        model.triangle_count()
    )?;

    let mut result = Ok(());
    model.enumerate_transformed_meshes(&mut |mesh| {
        if result.is_err() {
            return;
        }
        for vertex in mesh.vertices() {
            result = writeln!(writer, "{:.6} {:.6} {:.6}", vertex.x, vertex.y, vertex.z);
            if result.is_err() {
                return;
            }
        }
    });
    result?;

    let mut vertex_offset = 0usize;
    let mut result = Ok(());
    model.enumerate_transformed_meshes(&mut |mesh| {
        if result.is_err() {
            return;
        }
        for triangle in mesh.triangles() {
            result = writeln!(
                writer,
                "3 {} {} {}",
                triangle.vertices[0] as usize + vertex_offset,
                triangle.vertices[1] as usize + vertex_offset,
                triangle.vertices[2] as usize + vertex_offset
            );
            if result.is_err() {
                return;
            }
        }
        vertex_offset += mesh.vertex_count();
    });
    result?;

    writer.flush()
}
