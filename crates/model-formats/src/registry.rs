//! Format registry: capability-based dispatch over import/export adapters.
//!
//! Each adapter answers `can_handle` for a file extension; adapters are
//! collected in an ordered list and the first match wins. New formats
//! register without touching the dispatch code.

use std::path::Path;

use model_core::{Direction, Model};

use crate::error::FormatResult;
use crate::obj::ObjFormat;
use crate::off::OffFormat;
use crate::stl::StlFormat;

/// A format that can populate a model from a file.
pub trait ImportFormat {
    /// Whether this adapter handles the (lowercase) file extension.
    fn can_handle(&self, extension: &str) -> bool;

    /// The up axis of the format's coordinate convention.
    fn up_direction(&self) -> Direction;

    /// Parses the file into a raw, not yet finalized model.
    fn import(&self, path: &Path) -> FormatResult<Model>;
}

/// A format that can write a finalized model to a file.
pub trait ExportFormat {
    /// Whether this adapter handles the (lowercase) file extension.
    fn can_handle(&self, extension: &str) -> bool;

    /// Writes the model. Only enumeration contracts are used, so the
    /// adapter never depends on mesh count or ordering.
    fn export(&self, model: &Model, path: &Path) -> FormatResult<()>;
}

/// Ordered collections of import and export adapters.
#[derive(Default)]
pub struct FormatRegistry {
    importers: Vec<Box<dyn ImportFormat>>,
    exporters: Vec<Box<dyn ExportFormat>>,
}

impl FormatRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with all built-in formats registered.
    pub fn with_builtin_formats() -> Self {
        let mut registry = Self::new();
        registry.register_importer(Box::new(ObjFormat));
        registry.register_importer(Box::new(StlFormat));
        registry.register_importer(Box::new(OffFormat));
        registry.register_exporter(Box::new(ObjFormat));
        registry.register_exporter(Box::new(StlFormat));
        registry.register_exporter(Box::new(OffFormat));
        registry
    }

    pub fn register_importer(&mut self, importer: Box<dyn ImportFormat>) {
        self.importers.push(importer);
    }

    pub fn register_exporter(&mut self, exporter: Box<dyn ExportFormat>) {
        self.exporters.push(exporter);
    }

    /// The first importer handling the extension.
    pub fn find_importer(&self, extension: &str) -> Option<&dyn ImportFormat> {
        self.importers
            .iter()
            .find(|importer| importer.can_handle(extension))
            .map(Box::as_ref)
    }

    /// The first exporter handling the extension.
    pub fn find_exporter(&self, extension: &str) -> Option<&dyn ExportFormat> {
        self.exporters
            .iter()
            .find(|exporter| exporter.can_handle(extension))
            .map(Box::as_ref)
    }
}

/// Lowercase extension of a path, if any.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|extension| extension.to_str())
        .map(|extension| extension.to_lowercase())
}
