//! Orchestrator errors

use thiserror::Error;
use yieldbench_core::{DataContractError, PayloadError, TransportError};
use yieldbench_render::RenderError;
use yieldbench_report::AggregationError;

/// Why a trial or batch did not produce results
#[derive(Debug, Error)]
pub enum RunError {
    /// Requested shape or received dataset is invalid
    #[error("data contract violated: {0}")]
    DataContract(#[from] DataContractError),

    /// Fetching or decoding the payload failed
    #[error("transport failed: {0}")]
    Transport(#[from] TransportError),

    /// The adapter failed to render
    #[error("render failed: {0}")]
    Render(#[from] RenderError),

    /// Server and client halves could not be merged
    #[error("aggregation failed: {0}")]
    Aggregation(#[from] AggregationError),

    /// One iteration of a batch failed
    #[error("{library} iteration {iteration}/{total} failed: {source}")]
    Iteration {
        /// Library of the batch
        library: String,
        /// Failed iteration, starting at 1
        iteration: usize,
        /// Iterations requested
        total: usize,
        /// Failure of that iteration
        #[source]
        source: Box<RunError>,
    },

    /// A batch of zero iterations was requested
    #[error("iteration count must be at least 1")]
    NoIterations,
}

impl From<PayloadError> for RunError {
    fn from(e: PayloadError) -> Self {
        match e {
            PayloadError::Transport(e) => RunError::Transport(e),
            PayloadError::Contract(e) => RunError::DataContract(e),
        }
    }
}

impl RunError {
    /// The underlying trial error, unwrapping iteration context
    pub fn root(&self) -> &RunError {
        match self {
            RunError::Iteration { source, .. } => source.root(),
            other => other,
        }
    }
}
