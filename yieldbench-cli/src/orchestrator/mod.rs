//! Test Orchestrator
//!
//! Drives adapters through repeated trials and logs the merged results.
//!
//! ## Pipeline Overview
//!
//! ```text
//! DatasetShape
//!       │
//!       ▼
//! ┌─────────────┐
//! │  Fetching   │  DataProvider::fetch, bounded by fetch_timeout
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │  Parsing    │  decode_response → Dataset + ServerTiming
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │  Rendering  │  ChartAdapter::render_box_plot → RenderMetrics
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │   Logged    │  PendingResult::finalize → PerformanceLogger
//! └─────────────┘
//! ```
//!
//! Any failure moves the run to [`RunState::Failed`] and propagates; nothing
//! is logged for a failed trial.

mod error;
mod execution;
mod state;

pub use error::RunError;
pub use execution::{Orchestrator, OrchestratorConfig};
pub use state::RunState;
