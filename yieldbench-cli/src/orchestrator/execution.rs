//! Trial Execution
//!
//! Trials run strictly one after another: an adapter keeps one mutable chart
//! per container, so adapters never leave the calling thread. Only the fetch
//! runs on a worker thread, so that `fetch_timeout` bounds how long the
//! caller waits even when the provider never returns.

use super::error::RunError;
use super::state::RunState;
use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::{Mutex, MutexGuard};
use std::collections::BTreeMap;
use std::sync::{Arc, mpsc};
use std::time::Duration;
use yieldbench_core::{
    DataProvider, DatasetShape, FetchedPayload, Timer, TransportError, decode_response, timed,
};
use yieldbench_render::{ChartAdapter, ContainerId};
use yieldbench_report::{PendingResult, PerformanceLogger, RenderMode, TestIdentity, TestResult};

/// Settings applied to every trial
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Mode recorded with each result
    pub render_mode: RenderMode,
    /// Longest wait for a fetch; slower fetches fail with [`TransportError::Timeout`]
    pub fetch_timeout: Duration,
    /// Pause between iterations of one batch
    pub settle_delay: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            render_mode: RenderMode::Server,
            fetch_timeout: Duration::from_secs(300),
            settle_delay: Duration::ZERO,
        }
    }
}

/// Runs trials against a data provider and owns the session log
pub struct Orchestrator<P: DataProvider + Send + 'static> {
    provider: Arc<Mutex<P>>,
    config: OrchestratorConfig,
    logger: PerformanceLogger,
    state: RunState,
    progress: ProgressBar,
}

impl<P: DataProvider + Send + 'static> Orchestrator<P> {
    /// Orchestrator with an empty log and no progress output
    pub fn new(provider: P, config: OrchestratorConfig) -> Self {
        Self {
            provider: Arc::new(Mutex::new(provider)),
            config,
            logger: PerformanceLogger::new(),
            state: RunState::Idle,
            progress: ProgressBar::hidden(),
        }
    }

    /// Show a progress bar over trials on stderr
    pub fn with_progress(mut self) -> Self {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        self.progress = pb;
        self
    }

    /// State of the current or last trial
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Session log
    pub fn logger(&self) -> &PerformanceLogger {
        &self.logger
    }

    /// Session log, for clearing or importing
    pub fn logger_mut(&mut self) -> &mut PerformanceLogger {
        &mut self.logger
    }

    /// Consume the orchestrator, keeping the log
    pub fn into_logger(self) -> PerformanceLogger {
        self.progress.finish_and_clear();
        self.logger
    }

    /// Data provider.
    ///
    /// Blocks while a fetch that already timed out is still running.
    pub fn provider(&self) -> MutexGuard<'_, P> {
        self.provider.lock()
    }

    /// Trial settings
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// One end-to-end trial: fetch, parse, render, merge, log.
    ///
    /// On failure the state is [`RunState::Failed`] and the log is unchanged.
    pub fn run_test(
        &mut self,
        adapter: &mut dyn ChartAdapter,
        container: &ContainerId,
        shape: &DatasetShape,
    ) -> Result<TestResult, RunError> {
        let span = tracing::info_span!("run_test", library = adapter.library(), %shape);
        let _enter = span.enter();

        match self.execute(adapter, container, shape) {
            Ok(result) => {
                self.state = RunState::Logged;
                Ok(result)
            }
            Err(e) => {
                tracing::error!(state = %self.state, error = %e, "test failed");
                self.state = RunState::Failed;
                Err(e)
            }
        }
    }

    fn execute(
        &mut self,
        adapter: &mut dyn ChartAdapter,
        container: &ContainerId,
        shape: &DatasetShape,
    ) -> Result<TestResult, RunError> {
        self.state = RunState::Fetching;
        shape.validate()?;
        let mut pending = PendingResult::new(TestIdentity::new(
            adapter.library(),
            self.config.render_mode,
            *shape,
        ));

        let (payload, fetch_time_ms) = self.fetch(shape)?;
        tracing::debug!(bytes = payload.len(), fetch_time_ms, "payload fetched");

        self.state = RunState::Parsing;
        let (response, parse_time_ms) = timed("parse", || decode_response(&payload.body));
        let response = response?;
        pending.record_server(response.timing.server, fetch_time_ms, parse_time_ms);

        self.state = RunState::Rendering;
        let metrics = adapter.render_box_plot(container, &response.data)?;
        if !metrics.is_consistent() {
            tracing::warn!(
                total_ms = metrics.total_ms,
                phase_sum = metrics.phase_sum(),
                "render total is shorter than its phases"
            );
        }
        pending.record_render(metrics);

        let result = pending.finalize()?;
        Ok(self.logger.log(result).clone())
    }

    /// Fetch on a worker thread, waiting at most `fetch_timeout`.
    ///
    /// A provider that overruns is left to finish in the background; its
    /// late result is discarded.
    fn fetch(&self, shape: &DatasetShape) -> Result<(FetchedPayload, f64), TransportError> {
        let limit = self.config.fetch_timeout;
        let limit_ms = limit.as_secs_f64() * 1000.0;
        let provider = Arc::clone(&self.provider);
        let shape = *shape;
        let (tx, rx) = mpsc::channel();

        let fetch = Timer::start();
        std::thread::Builder::new()
            .name("yieldbench-fetch".to_string())
            .spawn(move || {
                let result = provider.lock().fetch(&shape);
                // The receiver is gone once the caller has given up.
                let _ = tx.send(result);
            })?;

        let payload = match rx.recv_timeout(limit) {
            Ok(result) => result?,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                return Err(TransportError::Timeout {
                    elapsed_ms: fetch.elapsed_ms(),
                    limit_ms,
                });
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                return Err(TransportError::Provider {
                    provider: "worker".to_string(),
                    message: "fetch thread exited without a result".to_string(),
                });
            }
        };
        let fetch_time_ms = fetch.elapsed_ms();
        if fetch_time_ms > limit_ms {
            return Err(TransportError::Timeout {
                elapsed_ms: fetch_time_ms,
                limit_ms,
            });
        }
        Ok((payload, fetch_time_ms))
    }

    /// `n` sequential trials, destroying the adapter's charts between them.
    ///
    /// The chart of the last trial stays alive. Stops at the first failure,
    /// destroying what the failed trial left behind; results of earlier
    /// iterations stay in the log but no partial batch is returned.
    pub fn run_test_iterations(
        &mut self,
        adapter: &mut dyn ChartAdapter,
        container: &ContainerId,
        n: usize,
        shape: &DatasetShape,
    ) -> Result<Vec<TestResult>, RunError> {
        if n == 0 {
            return Err(RunError::NoIterations);
        }
        let library = adapter.library().to_string();
        self.progress.inc_length(n as u64);
        self.progress.set_message(library.clone());

        let mut results = Vec::with_capacity(n);
        for iteration in 1..=n {
            if iteration > 1 {
                adapter.destroy();
                if !self.config.settle_delay.is_zero() {
                    std::thread::sleep(self.config.settle_delay);
                }
            }

            match self.run_test(adapter, container, shape) {
                Ok(result) => {
                    results.push(result);
                    self.progress.inc(1);
                }
                Err(source) => {
                    adapter.destroy();
                    return Err(RunError::Iteration {
                        library,
                        iteration,
                        total: n,
                        source: Box::new(source),
                    });
                }
            }
        }
        tracing::info!(library = %library, iterations = n, "batch complete");
        Ok(results)
    }

    /// Run every adapter's batch to completion before starting the next.
    ///
    /// Each adapter is destroyed after its batch. Adapters sharing a library
    /// name share one entry.
    pub fn compare_adapters(
        &mut self,
        adapters: &mut [Box<dyn ChartAdapter>],
        container: &ContainerId,
        n: usize,
        shape: &DatasetShape,
    ) -> Result<BTreeMap<String, Vec<TestResult>>, RunError> {
        let mut comparison: BTreeMap<String, Vec<TestResult>> = BTreeMap::new();
        for adapter in adapters.iter_mut() {
            let results = self.run_test_iterations(adapter.as_mut(), container, n, shape)?;
            adapter.destroy();
            comparison
                .entry(adapter.library().to_string())
                .or_default()
                .extend(results);
        }
        Ok(comparison)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use yieldbench_core::{Dataset, FetchedPayload, RenderMetrics, SyntheticProvider};
    use yieldbench_render::{RenderError, SelectionHandler};

    type CallLog = Rc<RefCell<Vec<String>>>;

    struct RecordingAdapter {
        name: &'static str,
        calls: CallLog,
        fail_on_render: Option<usize>,
        renders: usize,
    }

    impl RecordingAdapter {
        fn new(name: &'static str, calls: CallLog) -> Self {
            Self {
                name,
                calls,
                fail_on_render: None,
                renders: 0,
            }
        }
    }

    impl ChartAdapter for RecordingAdapter {
        fn library(&self) -> &str {
            self.name
        }

        fn supports_selection(&self) -> bool {
            false
        }

        fn render_box_plot(
            &mut self,
            container: &ContainerId,
            dataset: &Dataset,
        ) -> Result<RenderMetrics, RenderError> {
            self.renders += 1;
            self.calls.borrow_mut().push(format!("{}:render", self.name));
            if self.fail_on_render == Some(self.renders) {
                return Err(RenderError::InvalidContainer(container.to_string()));
            }
            Ok(RenderMetrics::new(self.name, dataset.total_points(), 1.0, 2.0, 3.0, 6.5))
        }

        fn enable_rectangular_selection(&mut self, _handler: SelectionHandler) {}

        fn clear_selection(&mut self) {}

        fn resize(&mut self) {}

        fn destroy(&mut self) {
            self.calls.borrow_mut().push(format!("{}:destroy", self.name));
        }
    }

    struct BrokenProvider;

    impl DataProvider for BrokenProvider {
        fn name(&self) -> &str {
            "broken"
        }

        fn fetch(&mut self, _shape: &DatasetShape) -> Result<FetchedPayload, TransportError> {
            Ok(FetchedPayload {
                body: b"{\"data\": 1".to_vec(),
            })
        }
    }

    /// Provider that takes `delay` before serving synthetic data
    struct SlowProvider {
        delay: Duration,
        inner: SyntheticProvider,
    }

    impl DataProvider for SlowProvider {
        fn name(&self) -> &str {
            "slow"
        }

        fn fetch(&mut self, shape: &DatasetShape) -> Result<FetchedPayload, TransportError> {
            std::thread::sleep(self.delay);
            self.inner.fetch(shape)
        }
    }

    fn orchestrator() -> Orchestrator<SyntheticProvider> {
        Orchestrator::new(SyntheticProvider::new().with_seed(11), OrchestratorConfig::default())
    }

    fn container() -> ContainerId {
        ContainerId::new("chart")
    }

    #[test]
    fn test_single_run_reaches_logged() {
        let mut orch = orchestrator();
        assert_eq!(orch.state(), RunState::Idle);
        let calls = CallLog::default();
        let mut adapter = RecordingAdapter::new("mock", calls);

        let result = orch
            .run_test(&mut adapter, &container(), &DatasetShape::new(2, 3, 4))
            .unwrap();
        assert_eq!(orch.state(), RunState::Logged);
        assert_eq!(result.test_id, "T000001");
        assert_eq!(result.data_points(), 24);
        assert_eq!(result.render.data_points, 24);
        assert!(result.fetch_time_ms >= 0.0);
        assert_eq!(orch.logger().len(), 1);
    }

    #[test]
    fn test_iterations_destroy_between_runs() {
        let mut orch = orchestrator();
        let calls = CallLog::default();
        let mut adapter = RecordingAdapter::new("mock", calls.clone());

        let results = orch
            .run_test_iterations(&mut adapter, &container(), 3, &DatasetShape::new(1, 2, 2))
            .unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(
            *calls.borrow(),
            vec!["mock:render", "mock:destroy", "mock:render", "mock:destroy", "mock:render"]
        );
    }

    #[test]
    fn test_failed_render_is_not_logged() {
        let mut orch = orchestrator();
        let calls = CallLog::default();
        let mut adapter = RecordingAdapter::new("mock", calls);
        adapter.fail_on_render = Some(1);

        let err = orch
            .run_test(&mut adapter, &container(), &DatasetShape::new(1, 1, 1))
            .unwrap_err();
        assert!(matches!(err, RunError::Render(_)));
        assert_eq!(orch.state(), RunState::Failed);
        assert!(orch.logger().is_empty());
    }

    #[test]
    fn test_batch_stops_at_failed_iteration() {
        let mut orch = orchestrator();
        let calls = CallLog::default();
        let mut adapter = RecordingAdapter::new("mock", calls.clone());
        adapter.fail_on_render = Some(2);

        let err = orch
            .run_test_iterations(&mut adapter, &container(), 4, &DatasetShape::new(1, 1, 2))
            .unwrap_err();
        match &err {
            RunError::Iteration {
                library,
                iteration,
                total,
                ..
            } => {
                assert_eq!(library, "mock");
                assert_eq!(*iteration, 2);
                assert_eq!(*total, 4);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(err.root(), RunError::Render(_)));
        assert_eq!(
            *calls.borrow(),
            vec!["mock:render", "mock:destroy", "mock:render", "mock:destroy"]
        );
        assert_eq!(orch.logger().len(), 1);
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let mut orch = orchestrator();
        let mut adapter = RecordingAdapter::new("mock", CallLog::default());
        assert!(matches!(
            orch.run_test_iterations(&mut adapter, &container(), 0, &DatasetShape::new(1, 1, 1)),
            Err(RunError::NoIterations)
        ));
    }

    #[test]
    fn test_invalid_shape_fails_before_fetch() {
        let mut orch = orchestrator();
        let mut adapter = RecordingAdapter::new("mock", CallLog::default());
        let err = orch
            .run_test(&mut adapter, &container(), &DatasetShape::new(0, 1, 1))
            .unwrap_err();
        assert!(matches!(err, RunError::DataContract(_)));
        assert_eq!(orch.provider().requests(), 0);
    }

    #[test]
    fn test_malformed_payload_is_transport_error() {
        let mut orch = Orchestrator::new(BrokenProvider, OrchestratorConfig::default());
        let calls = CallLog::default();
        let mut adapter = RecordingAdapter::new("mock", calls.clone());
        let err = orch
            .run_test(&mut adapter, &container(), &DatasetShape::new(1, 1, 1))
            .unwrap_err();
        assert!(matches!(err, RunError::Transport(TransportError::Malformed(_))));
        assert!(calls.borrow().is_empty());
        assert_eq!(orch.state(), RunState::Failed);
    }

    #[test]
    fn test_fetch_timeout() {
        let config = OrchestratorConfig {
            fetch_timeout: Duration::ZERO,
            ..OrchestratorConfig::default()
        };
        let mut orch = Orchestrator::new(SyntheticProvider::new(), config);
        let mut adapter = RecordingAdapter::new("mock", CallLog::default());
        let err = orch
            .run_test(&mut adapter, &container(), &DatasetShape::new(4, 5, 10))
            .unwrap_err();
        assert!(matches!(err, RunError::Transport(TransportError::Timeout { .. })));
        assert!(orch.logger().is_empty());
    }

    #[test]
    fn test_fetch_timeout_bounds_the_wait() {
        let provider = SlowProvider {
            delay: Duration::from_millis(1500),
            inner: SyntheticProvider::new(),
        };
        let config = OrchestratorConfig {
            fetch_timeout: Duration::from_millis(50),
            ..OrchestratorConfig::default()
        };
        let mut orch = Orchestrator::new(provider, config);
        let calls = CallLog::default();
        let mut adapter = RecordingAdapter::new("mock", calls.clone());

        let started = std::time::Instant::now();
        let err = orch
            .run_test(&mut adapter, &container(), &DatasetShape::new(1, 1, 1))
            .unwrap_err();
        assert!(started.elapsed() < Duration::from_millis(1000));
        match err {
            RunError::Transport(TransportError::Timeout { elapsed_ms, limit_ms }) => {
                assert_eq!(limit_ms, 50.0);
                assert!(elapsed_ms < 1000.0);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(calls.borrow().is_empty());
        assert!(orch.logger().is_empty());
    }

    #[test]
    fn test_slow_fetch_within_timeout_succeeds() {
        let provider = SlowProvider {
            delay: Duration::from_millis(20),
            inner: SyntheticProvider::new(),
        };
        let mut orch = Orchestrator::new(provider, OrchestratorConfig::default());
        let mut adapter = RecordingAdapter::new("mock", CallLog::default());
        let result = orch
            .run_test(&mut adapter, &container(), &DatasetShape::new(1, 2, 2))
            .unwrap();
        assert!(result.fetch_time_ms >= 20.0);
        assert_eq!(orch.provider().inner.requests(), 1);
    }

    #[test]
    fn test_compare_runs_adapters_in_sequence() {
        let mut orch = orchestrator();
        let calls = CallLog::default();
        let mut adapters: Vec<Box<dyn ChartAdapter>> = vec![
            Box::new(RecordingAdapter::new("a", calls.clone())),
            Box::new(RecordingAdapter::new("b", calls.clone())),
        ];

        let comparison = orch
            .compare_adapters(&mut adapters, &container(), 2, &DatasetShape::new(1, 1, 3))
            .unwrap();
        assert_eq!(comparison.len(), 2);
        assert_eq!(comparison["a"].len(), 2);
        assert_eq!(comparison["b"].len(), 2);
        assert_eq!(
            *calls.borrow(),
            vec![
                "a:render", "a:destroy", "a:render", "a:destroy", "b:render", "b:destroy",
                "b:render", "b:destroy",
            ]
        );
        assert_eq!(orch.logger().by_library("b").len(), 2);
    }
}
