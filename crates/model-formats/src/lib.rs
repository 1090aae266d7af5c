//! Format adapters for the model interchange toolkit.
//!
//! Thin, per-format import/export code around `model-core`. Formats are
//! looked up through an ordered registry keyed by file extension:
//!
//! ```no_run
//! use model_formats::{import_model, export_model, ImportSettings};
//!
//! let imported = import_model("bunny.obj".as_ref(), &ImportSettings::default())?;
//! export_model(&imported.model, "bunny.stl".as_ref())?;
//! # Ok::<(), model_formats::FormatError>(())
//! ```
//!
//! Importers populate a raw model and report the format's up axis; the
//! orchestration in [`import_model`] finalizes the model before handing
//! it out, so consumers always see synthesized normals and a default
//! material.

mod error;

pub mod export;
pub mod import;
pub mod obj;
pub mod off;
pub mod registry;
pub mod stl;

pub use error::{FormatError, FormatResult};
pub use export::{export_model, export_model_with_registry};
pub use import::{import_model, import_model_with_registry, ImportResult, ImportSettings};
pub use registry::{ExportFormat, FormatRegistry, ImportFormat};
