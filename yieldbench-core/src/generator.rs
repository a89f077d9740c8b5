//! Synthetic Yield Generator
//!
//! Produces mock semiconductor yield data:
//! - Lot ids `L0001…` numbered across the whole year
//! - Wafer ids `W01…` restarting in every lot
//! - Yields drawn from a normal distribution, clipped and rounded to 0.01
//!
//! Each phase is timed the way the data endpoint reports it, so the resulting
//! [`ServerTiming`] is comparable with a remote provider's.

use crate::dataset::Dataset;
use crate::error::DataContractError;
use crate::hierarchy::YieldRecord;
use crate::measure::{Timer, timed};
use crate::shape::DatasetShape;
use crate::timing::ServerTiming;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use thiserror::Error;

/// Errors from the synthetic generator
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Shape or distribution is invalid
    #[error(transparent)]
    Contract(#[from] DataContractError),

    /// Writing a CSV row failed
    #[error("CSV serialization failed: {0}")]
    Csv(#[from] csv::Error),

    /// Writer produced bytes that are not text
    #[error("CSV output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Parameters of the clipped normal yield distribution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YieldDistribution {
    /// Centre of the normal distribution
    pub mean: f64,
    /// Spread of the normal distribution
    pub std_dev: f64,
    /// Lower clip bound
    pub min: f64,
    /// Upper clip bound
    pub max: f64,
}

impl Default for YieldDistribution {
    fn default() -> Self {
        Self {
            mean: 92.0,
            std_dev: 4.0,
            min: 70.0,
            max: 99.5,
        }
    }
}

impl YieldDistribution {
    fn sampler(&self) -> Result<Normal<f64>, DataContractError> {
        if !(0.0..=100.0).contains(&self.min) || !(0.0..=100.0).contains(&self.max) || self.min > self.max {
            return Err(DataContractError::InvalidDistribution(format!(
                "clip range {}..={} must lie within 0..=100",
                self.min, self.max
            )));
        }
        Normal::new(self.mean, self.std_dev)
            .map_err(|e| DataContractError::InvalidDistribution(e.to_string()))
    }
}

/// Raw CSV table with its generation cost
#[derive(Debug, Clone)]
pub struct CsvExport {
    /// Encoded table, header included
    pub body: String,
    /// Cost of generating the rows
    pub timing: ServerTiming,
    /// Cost of encoding the rows
    pub serialization_ms: f64,
}

impl CsvExport {
    /// Size of the encoded table in bytes
    pub fn size_bytes(&self) -> usize {
        self.body.len()
    }
}

/// Mock data source for a given [`DatasetShape`]
#[derive(Debug, Clone)]
pub struct SyntheticGenerator {
    shape: DatasetShape,
    distribution: YieldDistribution,
    seed: Option<u64>,
}

impl SyntheticGenerator {
    /// Generator with the default distribution and an entropy-seeded RNG
    pub fn new(shape: DatasetShape) -> Self {
        Self {
            shape,
            distribution: YieldDistribution::default(),
            seed: None,
        }
    }

    /// Replace the yield distribution
    pub fn with_distribution(mut self, distribution: YieldDistribution) -> Self {
        self.distribution = distribution;
        self
    }

    /// Make the output reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Shape this generator produces
    pub fn shape(&self) -> &DatasetShape {
        &self.shape
    }

    /// Generate the flat table, timing id, yield and table assembly separately
    pub fn generate_records(&self) -> Result<(Vec<YieldRecord>, ServerTiming), DataContractError> {
        self.shape.validate()?;
        let sampler = self.distribution.sampler()?;
        let shape = self.shape;
        let total_points = shape.data_points();

        tracing::info!(
            points = total_points,
            lots = shape.total_lots(),
            "generating synthetic yield data"
        );

        let (ids, array_generation_ms) = timed("array_generation", || {
            let mut ids = Vec::with_capacity(total_points as usize);
            let mut lot_counter = 1u32;
            for week in 1..=shape.weeks {
                for _ in 0..shape.lots_per_week {
                    let lot_id = format!("L{lot_counter:04}");
                    for wafer in 1..=shape.wafers_per_lot {
                        ids.push((week, lot_id.clone(), format!("W{wafer:02}")));
                    }
                    lot_counter += 1;
                }
            }
            ids
        });

        let (values, yield_generation_ms) = timed("yield_generation", || {
            let mut rng = match self.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let (min, max) = (self.distribution.min, self.distribution.max);
            (0..ids.len())
                .map(|_| {
                    let raw = sampler.sample(&mut rng).clamp(min, max);
                    (raw * 100.0).round() / 100.0
                })
                .collect::<Vec<f64>>()
        });

        let (records, dataframe_creation_ms) = timed("dataframe_creation", || {
            ids.into_iter()
                .zip(values)
                .map(|((week_no, lot_id, wafer_id), value)| YieldRecord {
                    lot_id,
                    wafer_id,
                    year: shape.year,
                    week_no,
                    value,
                })
                .collect::<Vec<_>>()
        });

        let timing = ServerTiming {
            array_generation_ms,
            yield_generation_ms,
            dataframe_creation_ms,
            boxplot_transformation_ms: 0.0,
            endpoint_total_ms: 0.0,
            total_data_points: records.len() as u64,
        };
        Ok((records, timing))
    }

    /// Generate the hierarchical box-plot dataset
    ///
    /// `endpoint_total_ms` covers generation plus transformation.
    pub fn generate_boxplot(&self) -> Result<(Dataset, ServerTiming), DataContractError> {
        let endpoint = Timer::start();
        let (records, mut timing) = self.generate_records()?;

        let (dataset, boxplot_transformation_ms) =
            timed("boxplot_transformation", || Dataset::from_records(self.shape.year, records));
        let dataset = dataset?;

        timing.boxplot_transformation_ms = boxplot_transformation_ms;
        timing.endpoint_total_ms = endpoint.elapsed_ms();
        Ok((dataset, timing))
    }

    /// Generate the flat table as CSV (`Lot_id,Wafer_id,Year,Week_no,Yield`)
    pub fn generate_csv(&self) -> Result<CsvExport, GenerateError> {
        let endpoint = Timer::start();
        let (records, mut timing) = self.generate_records()?;

        let serialize = Timer::start();
        let mut writer = csv::Writer::from_writer(Vec::new());
        for record in &records {
            writer.serialize(record)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))?;
        let body = String::from_utf8(bytes)?;
        let serialization_ms = serialize.elapsed_ms();

        timing.endpoint_total_ms = endpoint.elapsed_ms();
        tracing::debug!(
            points = timing.total_data_points,
            size_bytes = body.len(),
            "csv export complete"
        );
        Ok(CsvExport {
            body,
            timing,
            serialization_ms,
        })
    }
}
