//! Error types for model operations.

use thiserror::Error;

/// Result type alias for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors that can occur while building or finalizing a model.
///
/// All variants describe precondition violations: an importer handed the
/// core indices that do not resolve. They are surfaced immediately and
/// never silently recovered.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A triangle references a vertex that does not exist.
    #[error("vertex index {index} out of range for mesh with {count} vertices")]
    VertexIndexOutOfRange { index: u32, count: usize },

    /// A triangle references a normal that does not exist.
    #[error("normal index {index} out of range for mesh with {count} normals")]
    NormalIndexOutOfRange { index: u32, count: usize },

    /// A triangle references a texture UV that does not exist.
    #[error("texture uv index {index} out of range for mesh with {count} uvs")]
    UvIndexOutOfRange { index: u32, count: usize },

    /// A triangle references a material that does not exist.
    #[error("material index {index} out of range for model with {count} materials")]
    MaterialIndexOutOfRange { index: u32, count: usize },

    /// A node references a mesh that does not exist.
    #[error("mesh index {index} out of range for model with {count} meshes")]
    MeshIndexOutOfRange { index: usize, count: usize },
}
