//! Performance Logger
//!
//! Ordered, append-only log of one session's results. Two single-key
//! indexes (library, render mode) point into the log; the log itself is
//! never partitioned.
//!
//! Test ids are unique within a log. The next id is always past the highest
//! numeric id present, so ids kept from an import never collide with later
//! appends.

use crate::aggregate::{RenderMode, TestResult};
use crate::error::ExportError;
use crate::export::{export_csv, export_json, import_json};
use crate::summary::{LibrarySummary, summarize};
use fxhash::FxHashMap;
use parking_lot::Mutex;
use std::sync::Arc;

/// Session log of completed trials
#[derive(Debug, Default)]
pub struct PerformanceLogger {
    results: Vec<TestResult>,
    by_library: FxHashMap<String, Vec<usize>>,
    by_mode: FxHashMap<RenderMode, Vec<usize>>,
    by_id: FxHashMap<String, usize>,
    next_id: u64,
}

/// Numeric part of a `T000042`-style id
fn id_number(test_id: &str) -> Option<u64> {
    test_id.strip_prefix('T')?.parse().ok()
}

impl PerformanceLogger {
    /// Empty log
    pub fn new() -> Self {
        Self::default()
    }

    fn assign_id(&mut self) -> String {
        self.next_id = self.next_id.max(1);
        let id = format!("T{:06}", self.next_id);
        self.next_id += 1;
        id
    }

    fn index(&mut self, result: TestResult) -> &TestResult {
        let position = self.results.len();
        if let Some(n) = id_number(&result.test_id) {
            self.next_id = self.next_id.max(n.saturating_add(1));
        }
        self.by_id.insert(result.test_id.clone(), position);
        self.by_library
            .entry(result.chart_library.clone())
            .or_default()
            .push(position);
        self.by_mode.entry(result.render_mode).or_default().push(position);
        self.results.push(result);
        &self.results[position]
    }

    /// Append a result, assigning the next test id (`T000001`, ...)
    pub fn log(&mut self, mut result: TestResult) -> &TestResult {
        result.test_id = self.assign_id();
        tracing::info!(
            test_id = %result.test_id,
            library = %result.chart_library,
            mode = %result.render_mode,
            data_points = result.data_points(),
            end_to_end_ms = result.total_end_to_end_ms(),
            "test logged"
        );
        self.index(result)
    }

    /// All results in log order
    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    /// Number of logged results
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether nothing has been logged
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Result with the given test id
    pub fn get(&self, test_id: &str) -> Option<&TestResult> {
        self.by_id.get(test_id).map(|&i| &self.results[i])
    }

    /// Results of one chart library, in log order
    pub fn by_library(&self, library: &str) -> Vec<&TestResult> {
        self.by_library
            .get(library)
            .map(|positions| positions.iter().map(|&i| &self.results[i]).collect())
            .unwrap_or_default()
    }

    /// Results of one render mode, in log order
    pub fn by_mode(&self, mode: RenderMode) -> Vec<&TestResult> {
        self.by_mode
            .get(&mode)
            .map(|positions| positions.iter().map(|&i| &self.results[i]).collect())
            .unwrap_or_default()
    }

    /// Libraries present in the log, sorted
    pub fn libraries(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_library.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Drop every result; ids restart at `T000001`
    pub fn clear(&mut self) {
        self.results.clear();
        self.by_library.clear();
        self.by_mode.clear();
        self.by_id.clear();
        self.next_id = 1;
    }

    /// Pretty JSON array of the log
    pub fn export_json(&self) -> Result<String, ExportError> {
        export_json(&self.results)
    }

    /// CSV table of the log
    pub fn export_csv(&self) -> Result<String, ExportError> {
        export_csv(&self.results)
    }

    /// Append results from a JSON export, keeping their ids.
    ///
    /// A result whose id is missing or already in the log is renumbered.
    /// Nothing is appended if the document fails to parse.
    pub fn import_json(&mut self, json: &str) -> Result<usize, ExportError> {
        let imported = import_json(json)?;
        let count = imported.len();
        for mut result in imported {
            if result.test_id.is_empty() || self.by_id.contains_key(&result.test_id) {
                result.test_id = self.assign_id();
            }
            self.index(result);
        }
        Ok(count)
    }

    /// Per-library timing summaries
    pub fn summarize(&self) -> Vec<LibrarySummary> {
        summarize(&self.results)
    }
}

/// Logger shared between sessions behind one lock
#[derive(Debug, Clone, Default)]
pub struct SharedLogger {
    inner: Arc<Mutex<PerformanceLogger>>,
}

impl SharedLogger {
    /// Empty shared log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a result and return its test id
    pub fn log(&self, result: TestResult) -> String {
        self.inner.lock().log(result).test_id.clone()
    }

    /// Number of logged results
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether nothing has been logged
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Drop every result
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// Copy of the log in order
    pub fn snapshot(&self) -> Vec<TestResult> {
        self.inner.lock().results().to_vec()
    }

    /// Pretty JSON array of the log
    pub fn export_json(&self) -> Result<String, ExportError> {
        self.inner.lock().export_json()
    }

    /// CSV table of the log
    pub fn export_csv(&self) -> Result<String, ExportError> {
        self.inner.lock().export_csv()
    }

    /// Run `f` with exclusive access to the log
    pub fn with<R>(&self, f: impl FnOnce(&mut PerformanceLogger) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::tests::sample;
    use std::thread;

    fn populated() -> PerformanceLogger {
        let mut logger = PerformanceLogger::new();
        logger.log(sample("echarts", RenderMode::Server));
        logger.log(sample("deckgl", RenderMode::WebAssembly));
        logger.log(sample("echarts", RenderMode::WebAssembly));
        logger
    }

    #[test]
    fn test_ids_follow_log_order() {
        let logger = populated();
        let ids: Vec<&str> = logger.results().iter().map(|r| r.test_id.as_str()).collect();
        assert_eq!(ids, vec!["T000001", "T000002", "T000003"]);
    }

    #[test]
    fn test_indexes() {
        let logger = populated();
        let echarts: Vec<&str> = logger.by_library("echarts").iter().map(|r| r.test_id.as_str()).collect();
        assert_eq!(echarts, vec!["T000001", "T000003"]);
        assert_eq!(logger.by_mode(RenderMode::WebAssembly).len(), 2);
        assert_eq!(logger.by_mode(RenderMode::Server)[0].chart_library, "echarts");
        assert!(logger.by_library("raster").is_empty());
        assert_eq!(logger.libraries(), vec!["deckgl", "echarts"]);
    }

    #[test]
    fn test_clear_restarts_ids() {
        let mut logger = populated();
        logger.clear();
        assert!(logger.is_empty());
        assert!(logger.by_library("echarts").is_empty());
        let first = logger.log(sample("raster", RenderMode::Server));
        assert_eq!(first.test_id, "T000001");
    }

    #[test]
    fn test_import_appends_and_indexes() {
        let source = populated();
        let json = source.export_json().unwrap();

        let mut logger = PerformanceLogger::new();
        assert_eq!(logger.import_json(&json).unwrap(), 3);
        assert_eq!(logger.results(), source.results());
        assert_eq!(logger.by_library("deckgl")[0].test_id, "T000002");
        assert!(logger.import_json("{").is_err());
        assert_eq!(logger.len(), 3);
    }

    #[test]
    fn test_log_after_import_with_gap_keeps_ids_unique() {
        let mut source = populated();
        source.log(sample("raster", RenderMode::Server));
        let mut results = source.results().to_vec();
        results.remove(1);
        let json = crate::export::export_json(&results).unwrap();

        let mut logger = PerformanceLogger::new();
        logger.import_json(&json).unwrap();
        let appended = logger.log(sample("gpu", RenderMode::Server)).test_id.clone();
        assert_eq!(appended, "T000005");

        let mut ids: Vec<&str> = logger.results().iter().map(|r| r.test_id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), logger.len());
        assert_eq!(logger.get("T000005").unwrap().chart_library, "gpu");
    }

    #[test]
    fn test_reimport_renumbers_colliding_ids() {
        let mut logger = populated();
        let json = logger.export_json().unwrap();
        assert_eq!(logger.import_json(&json).unwrap(), 3);

        let ids: Vec<&str> = logger.results().iter().map(|r| r.test_id.as_str()).collect();
        assert_eq!(ids, vec!["T000001", "T000002", "T000003", "T000004", "T000005", "T000006"]);
        assert_eq!(logger.get("T000005").unwrap().chart_library, "deckgl");
        assert_eq!(logger.log(sample("raster", RenderMode::Server)).test_id, "T000007");
    }

    #[test]
    fn test_shared_logger_serialises_appends() {
        let shared = SharedLogger::new();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for _ in 0..25 {
                        shared.log(sample("echarts", RenderMode::Server));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        let results = shared.snapshot();
        assert_eq!(results.len(), 100);
        assert_eq!(results[99].test_id, "T000100");
        assert_eq!(shared.with(|l| l.by_library("echarts").len()), 100);
    }
}
