//! Import orchestration: format detection, parsing and finalization.

use std::path::Path;

use tracing::info;

use model_core::{finalize_model, Color, Direction, Material, Model, ShadingModel};

use crate::error::{FormatError, FormatResult};
use crate::registry::{extension_of, FormatRegistry};

/// Settings an import closes over, most importantly the appearance of the
/// default material synthesized for geometry without one.
#[derive(Debug, Clone)]
pub struct ImportSettings {
    pub default_color: Color,
    pub default_shading: ShadingModel,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            default_color: Color::new(200, 200, 200),
            default_shading: ShadingModel::Phong,
        }
    }
}

/// A finalized imported model together with the source format's up axis.
pub struct ImportResult {
    pub model: Model,
    pub up_direction: Direction,
}

/// Imports a model file with the built-in format registry.
pub fn import_model(path: &Path, settings: &ImportSettings) -> FormatResult<ImportResult> {
    let registry = FormatRegistry::with_builtin_formats();
    import_model_with_registry(&registry, path, settings)
}

/// Imports a model file: picks the first importer handling the extension,
/// parses, then finalizes with a default material built from `settings`.
/// The returned model is consumable by exporters and queries.
pub fn import_model_with_registry(
    registry: &FormatRegistry,
    path: &Path,
    settings: &ImportSettings,
) -> FormatResult<ImportResult> {
    let extension = extension_of(path).ok_or(FormatError::UnsupportedFormat { extension: None })?;
    let importer =
        registry
            .find_importer(&extension)
            .ok_or(FormatError::UnsupportedFormat {
                extension: Some(extension.clone()),
            })?;

    let mut model = importer.import(path)?;
    if model.name().is_empty() {
        if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
            model.set_name(stem);
        }
    }

    let default_color = settings.default_color;
    let default_shading = settings.default_shading;
    finalize_model(&mut model, move || {
        let mut material = match default_shading {
            ShadingModel::Phong => Material::phong(),
            ShadingModel::Physical => Material::physical(),
        };
        material.color = default_color;
        material
    })?;

    info!(
        "imported {:?}: {} mesh instances, {} materials",
        path,
        model.mesh_instance_count(),
        model.material_count()
    );
    Ok(ImportResult {
        model,
        up_direction: importer.up_direction(),
    })
}
