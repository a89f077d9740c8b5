//! Error types for dataset construction and data transport

use thiserror::Error;

/// The dataset handed to a renderer violates its structural contract.
///
/// These are never papered over with defaults: a lot without wafers or a
/// yield outside 0..=100 fails the whole request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataContractError {
    /// A lot was registered without any wafers
    #[error("lot {lot_id} in week {week_no} has no wafers")]
    EmptyLot {
        /// Week the lot belongs to
        week_no: u32,
        /// Offending lot
        lot_id: String,
    },

    /// A yield is NaN, infinite or outside 0..=100
    #[error("wafer {wafer_id} of lot {lot_id} has yield {value}, expected a finite value in 0..=100")]
    YieldOutOfRange {
        /// Lot containing the wafer
        lot_id: String,
        /// Offending wafer
        wafer_id: String,
        /// Rejected yield
        value: f64,
    },

    /// No weeks or lots at all
    #[error("dataset contains no lots")]
    EmptyDataset,

    /// A flat record belongs to another year than the dataset
    #[error("record for lot {lot_id} belongs to year {found}, dataset year is {expected}")]
    YearMismatch {
        /// Lot of the record
        lot_id: String,
        /// Dataset year
        expected: u32,
        /// Year on the record
        found: u32,
    },

    /// Declared metadata disagrees with the decoded structure
    #[error("metadata declares {field} = {declared}, structure has {actual}")]
    MetadataMismatch {
        /// Metadata field name
        field: &'static str,
        /// Value in the payload
        declared: usize,
        /// Value derived from the structure
        actual: usize,
    },

    /// A shape count is zero
    #[error("invalid dataset shape: {0}")]
    InvalidShape(String),

    /// Generator parameters cannot produce a distribution
    #[error("invalid yield distribution: {0}")]
    InvalidDistribution(String),
}

/// Failure while fetching or decoding a payload from a data provider
#[derive(Debug, Error)]
pub enum TransportError {
    /// The provider reported a failure of its own
    #[error("data provider {provider} failed: {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Provider's description of the failure
        message: String,
    },

    /// The fetch did not complete within the configured limit
    #[error("fetch took {elapsed_ms:.2} ms, limit is {limit_ms:.2} ms")]
    Timeout {
        /// Time waited before giving up
        elapsed_ms: f64,
        /// Configured limit
        limit_ms: f64,
    },

    /// The body is not a valid response envelope
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Reading the body or starting the fetch failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Decoding a response can fail at the transport layer or on the dataset contract
#[derive(Debug, Error)]
pub enum PayloadError {
    /// Envelope could not be read
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Envelope was read but the dataset is invalid
    #[error(transparent)]
    Contract(#[from] DataContractError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_lot_message() {
        let err = DataContractError::EmptyLot {
            week_no: 7,
            lot_id: "L0042".to_string(),
        };
        assert_eq!(err.to_string(), "lot L0042 in week 7 has no wafers");
    }

    #[test]
    fn test_payload_error_wraps_transport() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: PayloadError = TransportError::from(json_err).into();
        assert!(err.to_string().starts_with("malformed payload"));
    }
}
