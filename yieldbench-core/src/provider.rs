//! Data Provider
//!
//! The orchestrator obtains every dataset through a [`DataProvider`]. A
//! provider returns the raw response body; decoding and validation happen
//! separately in [`decode_response`] so fetch and parse costs can be timed
//! apart.
//!
//! Response envelope:
//!
//! ```text
//! { "data": <Dataset>, "timing": { "server": <ServerTiming> } }
//! ```

use crate::dataset::{Dataset, DatasetWire};
use crate::error::{PayloadError, TransportError};
use crate::generator::{SyntheticGenerator, YieldDistribution};
use crate::measure::Timer;
use crate::shape::DatasetShape;
use crate::timing::ServerTiming;
use serde::{Deserialize, Serialize};

/// Raw response from a provider
#[derive(Debug, Clone)]
pub struct FetchedPayload {
    /// Encoded response envelope
    pub body: Vec<u8>,
}

impl FetchedPayload {
    /// Body size in bytes
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// True when the provider returned no bytes
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// Source of box-plot datasets
pub trait DataProvider {
    /// Name used in logs
    fn name(&self) -> &str;

    /// Fetch the encoded response for `shape`
    fn fetch(&mut self, shape: &DatasetShape) -> Result<FetchedPayload, TransportError>;
}

/// Server-side timing block of a response
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResponseTiming {
    /// Generation cost reported by the server
    pub server: ServerTiming,
}

/// Decoded response: the dataset plus what it cost to produce
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxPlotResponse {
    /// Validated dataset
    pub data: Dataset,
    /// Server timing block
    pub timing: ResponseTiming,
}

#[derive(Deserialize)]
struct BoxPlotResponseWire {
    data: DatasetWire,
    timing: ResponseTiming,
}

/// Decode and validate a response body.
///
/// Syntax errors surface as [`TransportError::Malformed`]; structurally valid
/// JSON describing an invalid dataset surfaces as a data-contract error.
pub fn decode_response(body: &[u8]) -> Result<BoxPlotResponse, PayloadError> {
    let wire: BoxPlotResponseWire =
        serde_json::from_slice(body).map_err(TransportError::Malformed)?;
    let data = Dataset::try_from(wire.data)?;
    Ok(BoxPlotResponse {
        data,
        timing: wire.timing,
    })
}

/// In-process provider backed by [`SyntheticGenerator`]
#[derive(Debug, Clone, Default)]
pub struct SyntheticProvider {
    distribution: YieldDistribution,
    seed: Option<u64>,
    requests: u64,
}

impl SyntheticProvider {
    /// Provider with the default yield distribution
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed request `n` with `seed + n`, so runs repeat exactly but
    /// successive requests still differ
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replace the yield distribution
    pub fn with_distribution(mut self, distribution: YieldDistribution) -> Self {
        self.distribution = distribution;
        self
    }

    /// Number of requests served
    pub fn requests(&self) -> u64 {
        self.requests
    }
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(&mut self, shape: &DatasetShape) -> Result<FetchedPayload, TransportError> {
        let endpoint = Timer::start();
        let mut generator = SyntheticGenerator::new(*shape).with_distribution(self.distribution);
        if let Some(seed) = self.seed {
            generator = generator.with_seed(seed.wrapping_add(self.requests));
        }
        self.requests += 1;

        let (data, mut server) = generator.generate_boxplot().map_err(|e| TransportError::Provider {
            provider: self.name().to_string(),
            message: e.to_string(),
        })?;
        server.endpoint_total_ms = endpoint.elapsed_ms();

        let response = BoxPlotResponse {
            data,
            timing: ResponseTiming { server },
        };
        let body = serde_json::to_vec(&response)?;
        tracing::debug!(
            provider = self.name(),
            bytes = body.len(),
            endpoint_ms = server.endpoint_total_ms,
            "served box plot payload"
        );
        Ok(FetchedPayload { body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataContractError;

    #[test]
    fn test_fetch_and_decode() {
        let mut provider = SyntheticProvider::new().with_seed(1);
        let shape = DatasetShape::new(2, 3, 4);
        let payload = provider.fetch(&shape).unwrap();
        assert!(!payload.is_empty());

        let response = decode_response(&payload.body).unwrap();
        assert_eq!(response.data.total_points(), 24);
        assert_eq!(response.timing.server.total_data_points, 24);
        assert!(response.timing.server.endpoint_total_ms > 0.0);
        assert_eq!(provider.requests(), 1);
    }

    #[test]
    fn test_seeded_requests_differ() {
        let mut provider = SyntheticProvider::new().with_seed(9);
        let shape = DatasetShape::new(1, 1, 25);
        let a = decode_response(&provider.fetch(&shape).unwrap().body).unwrap();
        let b = decode_response(&provider.fetch(&shape).unwrap().body).unwrap();
        assert_ne!(a.data, b.data);
    }

    #[test]
    fn test_invalid_shape_is_provider_error() {
        let mut provider = SyntheticProvider::new();
        let err = provider.fetch(&DatasetShape::new(1, 1, 0)).unwrap_err();
        assert!(matches!(err, TransportError::Provider { .. }));
    }

    #[test]
    fn test_decode_malformed() {
        let err = decode_response(b"{\"data\": ").unwrap_err();
        assert!(matches!(err, PayloadError::Transport(TransportError::Malformed(_))));
    }

    #[test]
    fn test_decode_contract_violation() {
        let body = br#"{
            "data": {
                "metadata": {"year": 2025, "total_weeks": 1, "total_lots": 1,
                             "wafers_per_lot": 0, "total_points": 0},
                "weeks": [{"week_no": 1, "lots": [{"lot_id": "L0001", "wafers": []}]}]
            },
            "timing": {"server": {"array_generation_ms": 0.1, "yield_generation_ms": 0.1,
                                  "dataframe_creation_ms": 0.1, "total_data_points": 0}}
        }"#;
        let err = decode_response(body).unwrap_err();
        assert!(matches!(
            err,
            PayloadError::Contract(DataContractError::EmptyLot { week_no: 1, .. })
        ));
    }
}
