//! Render errors

use crate::sidecar::SidecarError;
use thiserror::Error;

/// Failure of an adapter to produce a chart
#[derive(Debug, Error)]
pub enum RenderError {
    /// Container handle is empty or unknown to the host
    #[error("invalid container handle: {0:?}")]
    InvalidContainer(String),

    /// The charting library raised an exception
    #[error("{library} script call {method} failed: {message}")]
    Bridge {
        /// Library that raised
        library: String,
        /// Method being called
        method: String,
        /// Exception message
        message: String,
    },

    /// Native drawing or encoding failed
    #[error("drawing failed: {0}")]
    Draw(String),

    /// Option document could not be built
    #[error("chart option serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// External renderer failed
    #[error(transparent)]
    Sidecar(#[from] SidecarError),
}

impl From<image::ImageError> for RenderError {
    fn from(e: image::ImageError) -> Self {
        RenderError::Draw(e.to_string())
    }
}
