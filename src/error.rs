//! Error types for the annotation engine.

use thiserror::Error;

/// Errors raised by the annotation engine and its components.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Natural image size is not strictly positive
    #[error("Invalid image dimensions {width}x{height}")]
    InvalidDimensions {
        /// Natural width that was rejected
        width: f32,
        /// Natural height that was rejected
        height: f32,
    },

    /// Label selection named a class the project does not define
    #[error("Unknown class label '{0}'")]
    UnknownClassLabel(String),

    /// Allocator produced an id that already exists for the image
    #[error("Identifier '{id}' already exists on image '{image_id}'")]
    DuplicateIdentifier {
        /// The colliding identifier
        id: String,
        /// Image the collision happened on
        image_id: String,
    },

    /// Two class definitions share a name
    #[error("Class '{0}' is defined more than once")]
    DuplicateClass(String),

    /// Operation referenced an image that is not known
    #[error("Unknown image '{0}'")]
    UnknownImage(String),

    /// Operation referenced an annotation id that does not exist
    #[error("Annotation '{annotation_id}' not found on image '{image_id}'")]
    UnknownAnnotation {
        /// Image that was searched
        image_id: String,
        /// The missing annotation id
        annotation_id: String,
    },

    /// No valid image is currently loaded
    #[error("No image loaded")]
    NoImageLoaded,

    /// A label event arrived while no draft was waiting for one
    #[error("No draft is waiting for a label")]
    NotAwaitingLabel,
}

impl EngineError {
    /// Create an unknown-annotation error.
    pub fn unknown_annotation(
        image_id: impl Into<String>,
        annotation_id: impl Into<String>,
    ) -> Self {
        Self::UnknownAnnotation {
            image_id: image_id.into(),
            annotation_id: annotation_id.into(),
        }
    }

    /// Create a duplicate-identifier error.
    pub fn duplicate_identifier(id: impl Into<String>, image_id: impl Into<String>) -> Self {
        Self::DuplicateIdentifier {
            id: id.into(),
            image_id: image_id.into(),
        }
    }
}
