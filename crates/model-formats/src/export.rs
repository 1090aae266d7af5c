//! Export orchestration: format detection and dispatch.

use std::path::Path;

use model_core::Model;

use crate::error::{FormatError, FormatResult};
use crate::registry::{extension_of, FormatRegistry};

/// Exports a finalized model with the built-in format registry. The
/// target format is chosen by file extension, first match wins.
pub fn export_model(model: &Model, path: &Path) -> FormatResult<()> {
    let registry = FormatRegistry::with_builtin_formats();
    export_model_with_registry(&registry, model, path)
}

/// Exports a finalized model through an explicit registry.
pub fn export_model_with_registry(
    registry: &FormatRegistry,
    model: &Model,
    path: &Path,
) -> FormatResult<()> {
    let extension = extension_of(path).ok_or(FormatError::UnsupportedFormat { extension: None })?;
    let exporter =
        registry
            .find_exporter(&extension)
            .ok_or(FormatError::UnsupportedFormat {
                extension: Some(extension.clone()),
            })?;
    exporter.export(model, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::{import_model, ImportSettings};
    use model_core::geometry::is_equal_point3;
    use model_core::{bounding_box, finalize_model, generate_cuboid, Material, Model};
    use tempfile::NamedTempFile;

    fn cube_model() -> Model {
        let mut model = Model::new();
        let mut cube = generate_cuboid(1.0, 1.0, 1.0);
        cube.set_name("Cube");
        model.add_mesh_to_root_node(cube);
        finalize_model(&mut model, Material::phong).unwrap();
        model
    }

    #[test]
    fn test_export_unknown_extension() {
        let model = cube_model();
        assert!(matches!(
            export_model(&model, Path::new("model.gltf")),
            Err(FormatError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_round_trip_every_builtin_format() {
        let model = cube_model();
        let original_bounds = bounding_box(&model).unwrap();

        for extension in ["obj", "stl", "off"] {
            let file = NamedTempFile::with_suffix(format!(".{}", extension)).unwrap();
            export_model(&model, file.path()).expect("should export");

            let imported = import_model(file.path(), &ImportSettings::default())
                .expect("should re-import");
            assert_eq!(
                imported.model.mesh_instance_count(),
                1,
                "{} instance count",
                extension
            );

            let bounds = bounding_box(&imported.model).unwrap();
            assert!(is_equal_point3(&bounds.min, &original_bounds.min));
            assert!(is_equal_point3(&bounds.max, &original_bounds.max));
        }
    }
}
