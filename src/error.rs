//! Error taxonomy for editor operations.
//!
//! Every failure is transient: intents report it to the control panel and the
//! session keeps running.

use thiserror::Error;

use crate::canvas::layer::LayerId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    /// A snapshot or surface allocation could not be satisfied.
    #[error("not enough memory for a {bytes} byte buffer")]
    ResourceExhaustion { bytes: usize },

    /// The host has no clipboard access primitives.
    #[error("{0} is not supported on this system")]
    UnsupportedCapability(&'static str),

    /// The host refused clipboard access.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// A selection or shape collapsed to zero or negative size.
    #[error("geometry collapsed to an empty area")]
    InvalidGeometry,

    /// Deleting the last layer, merging fewer than two layers, and similar.
    #[error("{0}")]
    StructuralConstraintViolation(&'static str),

    #[error("layer {0} does not exist")]
    UnknownLayer(LayerId),

    #[error("layer {0} is not a raster layer")]
    NotRaster(LayerId),

    #[error("could not decode image: {0}")]
    Decode(String),

    #[error("export failed: {0}")]
    Export(String),
}

impl EditorError {
    /// Failures that are dropped without telling the user.
    pub fn is_silent(&self) -> bool {
        matches!(
            self,
            EditorError::InvalidGeometry | EditorError::ResourceExhaustion { .. }
        )
    }
}

/// Result type alias for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;

impl From<image::ImageError> for EditorError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::Decoding(e) => EditorError::Decode(e.to_string()),
            other => EditorError::Export(other.to_string()),
        }
    }
}
