//! Wavefront OBJ import and export.
//!
//! The importer keeps per-object mesh splits and `usemtl` material slots;
//! the exporter writes one `o` block per mesh instance with positions
//! already transformed to model space. Material libraries (`mtllib`) are
//! not resolved; materials referenced by name become named slots.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use hashbrown::HashMap;
use nalgebra::{Point2, Point3, Vector3};
use tracing::{debug, info};

use model_core::{Direction, Material, Mesh, Model, Triangle};

use crate::error::{FormatError, FormatResult};
use crate::registry::{ExportFormat, ImportFormat};

pub struct ObjFormat;

impl ImportFormat for ObjFormat {
    fn can_handle(&self, extension: &str) -> bool {
        extension == "obj"
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

        let mut parser = ObjParser::default();
        for (line_number, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| FormatError::IoRead {
                path: path.to_path_buf(),
                source: e,
            })?;
            parser.parse_line(line.trim()).map_err(|details| {
                FormatError::Parse {
                    path: path.to_path_buf(),
                    details: format!("line {}: {}", line_number + 1, details),
                }
            })?;
        }

        let model = parser.into_model();
        info!(
            "OBJ loaded: {} meshes, {} materials from {:?}",
            model.mesh_count(),
            model.material_count(),
            path
        );
        Ok(model)
    }
}

impl ExportFormat for ObjFormat {
    fn can_handle(&self, extension: &str) -> bool {
        extension == "obj"
    }

    fn export(&self, model: &Model, path: &Path) -> FormatResult<()> {
        let file = File::create(path).map_err(|e| FormatError::IoWrite {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut writer = BufWriter::new(file);

        write_obj(model, &mut writer).map_err(|e| FormatError::IoWrite {
            path: path.to_path_buf(),
            source: e,
        })?;

        info!(
            "OBJ saved: {} mesh instances to {:?}",
            model.mesh_instance_count(),
            path
        );
        Ok(())
    }
}

/// One face corner reference: global position index plus optional UV and
/// normal indices.
struct FaceCorner {
    vertex: usize,
    uv: Option<usize>,
    normal: Option<usize>,
}

/// A mesh under construction, remapping global OBJ indices to local ones.
#[derive(Default)]
struct MeshBuilder {
    mesh: Mesh,
    vertex_remap: HashMap<usize, u32>,
    normal_remap: HashMap<usize, u32>,
    uv_remap: HashMap<usize, u32>,
}

#[derive(Default)]
struct ObjParser {
    positions: Vec<Point3<f64>>,
    normals: Vec<Vector3<f64>>,
    uvs: Vec<Point2<f64>>,
    materials: Vec<Material>,
    material_lookup: HashMap<String, u32>,
    current_material: Option<u32>,
    current: Option<MeshBuilder>,
    finished: Vec<Mesh>,
}

impl ObjParser {
    fn parse_line(&mut self, line: &str) -> Result<(), String> {
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }

        let mut tokens = line.split_whitespace();
        let Some(keyword) = tokens.next() else {
            return Ok(());
        };
        let rest: Vec<&str> = tokens.collect();

        match keyword {
            "v" => self.positions.push(Point3::new(
                parse_float(&rest, 0)?,
                parse_float(&rest, 1)?,
                parse_float(&rest, 2)?,
            )),
            "vn" => self.normals.push(Vector3::new(
                parse_float(&rest, 0)?,
                parse_float(&rest, 1)?,
                parse_float(&rest, 2)?,
            )),
            "vt" => self
                .uvs
                .push(Point2::new(parse_float(&rest, 0)?, parse_float(&rest, 1)?)),
            "o" | "g" => self.begin_mesh(rest.first().copied().unwrap_or("")),
            "usemtl" => {
                let name = rest.first().copied().unwrap_or("");
                self.current_material = Some(self.material_index(name));
            }
            "mtllib" => debug!("ignoring material library reference: {:?}", rest),
            "f" => self.add_face(&rest)?,
            _ => debug!("ignoring OBJ keyword {:?}", keyword),
        }
        Ok(())
    }

    fn begin_mesh(&mut self, name: &str) {
        self.finish_mesh();
        let mut builder = MeshBuilder::default();
        builder.mesh.set_name(name);
        self.current = Some(builder);
    }

    fn finish_mesh(&mut self) {
        if let Some(builder) = self.current.take() {
            self.finished.push(builder.mesh);
        }
    }

    fn material_index(&mut self, name: &str) -> u32 {
        if let Some(&index) = self.material_lookup.get(name) {
            return index;
        }
        let mut material = Material::phong();
        material.name = name.to_string();
        let index = self.materials.len() as u32;
        self.materials.push(material);
        self.material_lookup.insert(name.to_string(), index);
        index
    }

    fn add_face(&mut self, tokens: &[&str]) -> Result<(), String> {
        if tokens.len() < 3 {
            return Err(format!("face with {} corners", tokens.len()));
        }

        let mut corners = Vec::with_capacity(tokens.len());
        for token in tokens {
            corners.push(self.parse_corner(token)?);
        }

        if self.current.is_none() {
            self.begin_mesh("");
        }
        let material = self.current_material;
        let Some(builder) = self.current.as_mut() else {
            return Ok(());
        };

        // Fan triangulation of polygonal faces.
        for k in 1..corners.len() - 1 {
            let triple = [&corners[0], &corners[k], &corners[k + 1]];

            let v = triple.map(|c| builder.local_vertex(c.vertex, &self.positions));
            let mut triangle = Triangle::new(v[0], v[1], v[2]);

            if let [Some(n0), Some(n1), Some(n2)] = triple.map(|c| c.normal) {
                let n = [n0, n1, n2].map(|global| builder.local_normal(global, &self.normals));
                triangle = triangle.with_normals(n[0], n[1], n[2]);
            }
            if let [Some(u0), Some(u1), Some(u2)] = triple.map(|c| c.uv) {
                let u = [u0, u1, u2].map(|global| builder.local_uv(global, &self.uvs));
                triangle = triangle.with_uvs(u[0], u[1], u[2]);
            }
            if let Some(material) = material {
                triangle = triangle.with_material(material);
            }
            builder.mesh.add_triangle(triangle);
        }
        Ok(())
    }

    fn parse_corner(&self, token: &str) -> Result<FaceCorner, String> {
        let mut parts = token.split('/');

        let vertex = resolve_index(parts.next().unwrap_or(""), self.positions.len())?
            .ok_or_else(|| format!("face corner {:?} has no vertex index", token))?;
        let uv = match parts.next() {
            Some(part) => resolve_index(part, self.uvs.len())?,
            None => None,
        };
        let normal = match parts.next() {
            Some(part) => resolve_index(part, self.normals.len())?,
            None => None,
        };

        Ok(FaceCorner { vertex, uv, normal })
    }

    fn into_model(mut self) -> Model {
        self.finish_mesh();

        let mut model = Model::new();
        for material in self.materials {
            model.add_material(material);
        }
        for mesh in self.finished {
            model.add_mesh_to_root_node(mesh);
        }
        model
    }
}

impl MeshBuilder {
    fn local_vertex(&mut self, global: usize, positions: &[Point3<f64>]) -> u32 {
        *self
            .vertex_remap
            .entry(global)
            .or_insert_with(|| self.mesh.add_vertex(positions[global]) as u32)
    }

    fn local_normal(&mut self, global: usize, normals: &[Vector3<f64>]) -> u32 {
        *self
            .normal_remap
            .entry(global)
            .or_insert_with(|| self.mesh.add_normal(normals[global]) as u32)
    }

    fn local_uv(&mut self, global: usize, uvs: &[Point2<f64>]) -> u32 {
        *self
            .uv_remap
            .entry(global)
            .or_insert_with(|| self.mesh.add_uv(uvs[global]) as u32)
    }
}

fn parse_float(tokens: &[&str], index: usize) -> Result<f64, String> {
    let token = tokens
        .get(index)
        .ok_or_else(|| format!("missing component {}", index))?;
    token
        .parse::<f64>()
        .map_err(|_| format!("invalid number {:?}", token))
}

/// Resolves a 1-based (or negative, end-relative) OBJ index. Empty parts
/// resolve to `None`.
fn resolve_index(part: &str, count: usize) -> Result<Option<usize>, String> {
    if part.is_empty() {
        return Ok(None);
    }
    let raw: i64 = part
        .parse()
        .map_err(|_| format!("invalid index {:?}", part))?;
    let resolved = if raw > 0 {
        raw - 1
    } else if raw < 0 {
        count as i64 + raw
    } else {
        return Err("index 0 is not valid in OBJ".to_string());
    };
    if resolved < 0 || resolved as usize >= count {
        return Err(format!("index {} out of range (count {})", raw, count));
    }
    Ok(Some(resolved as usize))
}

fn write_obj<W: Write>(model: &Model, writer: &mut W) -> std::io::Result<()> {
    writeln!(writer, "# Wavefront OBJ")?;

    let mut vertex_offset = 0usize;
    let mut normal_offset = 0usize;
    let mut uv_offset = 0usize;
    let mut mesh_number = 0usize;
    let mut result = Ok(());

    model.enumerate_transformed_meshes(&mut |mesh| {
        if result.is_err() {
            return;
        }
        mesh_number += 1;
        result = write_obj_mesh(
            model,
            &mesh,
            mesh_number,
            (vertex_offset, uv_offset, normal_offset),
            &mut *writer,
        );
        vertex_offset += mesh.vertex_count();
        normal_offset += mesh.normal_count();
        uv_offset += mesh.uv_count();
    });
    result?;
    writer.flush()
}

fn write_obj_mesh<W: Write>(
    model: &Model,
    mesh: &Mesh,
    mesh_number: usize,
    (vertex_offset, uv_offset, normal_offset): (usize, usize, usize),
    writer: &mut W,
) -> std::io::Result<()> {
    if mesh.name().is_empty() {
        writeln!(writer, "o mesh_{}", mesh_number)?;
    } else {
        writeln!(writer, "o {}", mesh.name())?;
    }

    for vertex in mesh.vertices() {
        writeln!(writer, "v {:.6} {:.6} {:.6}", vertex.x, vertex.y, vertex.z)?;
    }
    for uv in mesh.uvs() {
        writeln!(writer, "vt {:.6} {:.6}", uv.x, uv.y)?;
    }
    for normal in mesh.normals() {
        writeln!(writer, "vn {:.6} {:.6} {:.6}", normal.x, normal.y, normal.z)?;
    }

    let mut active_material: Option<u32> = None;
    for triangle in mesh.triangles() {
        if triangle.material != active_material {
            if let Some(index) = triangle.material {
                writeln!(writer, "usemtl {}", material_name(model, index))?;
            }
            active_material = triangle.material;
        }

        let corner = |k: usize| -> String {
            let vertex = triangle.vertices[k] as usize + vertex_offset + 1;
            match (triangle.uvs, triangle.normals) {
                (Some(uvs), Some(normals)) => format!(
                    "{}/{}/{}",
                    vertex,
                    uvs[k] as usize + uv_offset + 1,
                    normals[k] as usize + normal_offset + 1
                ),
                (None, Some(normals)) => {
                    format!("{}//{}", vertex, normals[k] as usize + normal_offset + 1)
                }
                (Some(uvs), None) => format!("{}/{}", vertex, uvs[k] as usize + uv_offset + 1),
                (None, None) => format!("{}", vertex),
            }
        };
        writeln!(writer, "f {} {} {}", corner(0), corner(1), corner(2))?;
    }
    Ok(())
}

fn material_name(model: &Model, index: u32) -> String {
    let material = model.material(index as usize);
    if material.name.is_empty() {
        format!("material_{}", index)
    } else {
        material.name.clone()
    }
}
