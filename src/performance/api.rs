use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_lock::Mutex;

use crate::performance::constants::{MAX_METRIC_NAME_LENGTH, MAX_TRACE_NAME_LENGTH};
use crate::performance::error::{invalid_argument, PerformanceResult};

/// Records custom traces the way Firebase Performance Monitoring's `trace()` API does.
///
/// Stopped traces are kept in memory so hosts can forward them to the Performance SDK (or
/// inspect them in tests).
#[derive(Clone, Default)]
pub struct Performance {
    inner: Arc<PerformanceInner>,
}

#[derive(Default)]
struct PerformanceInner {
    traces: Mutex<Vec<PerformanceTrace>>,
}

impl fmt::Debug for Performance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Performance").finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PerformanceTrace {
    pub name: String,
    pub duration: Duration,
    pub metrics: HashMap<String, i64>,
}

/// A started trace. Dropping it without calling [`stop`](Self::stop) discards it.
#[derive(Clone, Debug)]
pub struct TraceHandle {
    performance: Performance,
    name: String,
    started_at_ms: f64,
    metrics: HashMap<String, i64>,
}

impl Performance {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates and starts a new custom trace.
    pub fn new_trace(&self, name: &str) -> PerformanceResult<TraceHandle> {
        validate_name("Trace", name, MAX_TRACE_NAME_LENGTH)?;
        Ok(TraceHandle {
            performance: self.clone(),
            name: name.to_string(),
            started_at_ms: now_ms(),
            metrics: HashMap::new(),
        })
    }

    /// Returns the most recently recorded trace with `name`, if any.
    pub async fn recorded_trace(&self, name: &str) -> Option<PerformanceTrace> {
        self.inner
            .traces
            .lock()
            .await
            .iter()
            .rev()
            .find(|trace| trace.name == name)
            .cloned()
    }

    /// Every stopped trace, in stop order.
    pub async fn recorded_traces(&self) -> Vec<PerformanceTrace> {
        self.inner.traces.lock().await.clone()
    }
}

impl TraceHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds (or replaces) a numeric metric for the trace.
    pub fn put_metric(&mut self, name: &str, value: i64) -> PerformanceResult<()> {
        validate_name("Metric", name, MAX_METRIC_NAME_LENGTH)?;
        self.metrics.insert(name.to_string(), value);
        Ok(())
    }

    pub fn metric(&self, name: &str) -> Option<i64> {
        self.metrics.get(name).copied()
    }

    /// Stops the trace and stores the timing/metrics in the parent [`Performance`] instance.
    pub async fn stop(self) -> PerformanceResult<PerformanceTrace> {
        let elapsed_ms = (now_ms() - self.started_at_ms).max(0.0);
        let trace = PerformanceTrace {
            name: self.name,
            duration: Duration::from_secs_f64(elapsed_ms / 1000.0),
            metrics: self.metrics,
        };
        log::debug!("trace {} stopped after {:?}", trace.name, trace.duration);
        self.performance
            .inner
            .traces
            .lock()
            .await
            .push(trace.clone());
        Ok(trace)
    }
}

fn validate_name(kind: &str, name: &str, max_len: usize) -> PerformanceResult<()> {
    if name.trim().is_empty() {
        return Err(invalid_argument(format!("{kind} name must not be empty")));
    }
    if name.len() > max_len {
        return Err(invalid_argument(format!(
            "{kind} name must be at most {max_len} characters"
        )));
    }
    Ok(())
}

#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
fn now_ms() -> f64 {
    js_sys::Date::now()
}

#[cfg(not(all(feature = "wasm-web", target_arch = "wasm32")))]
fn now_ms() -> f64 {
    use std::sync::LazyLock;
    use std::time::Instant;

    static ORIGIN: LazyLock<Instant> = LazyLock::new(Instant::now);
    ORIGIN.elapsed().as_secs_f64() * 1000.0
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::performance::error::PerformanceErrorCode;
    use tokio::time::sleep;

    #[tokio::test(flavor = "current_thread")]
    async fn trace_records_duration_and_metrics() {
        let performance = Performance::new();
        let mut trace = performance.new_trace("load").unwrap();
        trace.put_metric("items", 3).unwrap();
        sleep(Duration::from_millis(10)).await;
        let result = trace.stop().await.unwrap();
        assert_eq!(result.metrics.get("items"), Some(&3));
        assert!(result.duration >= Duration::from_millis(10));

        let stored = performance.recorded_trace("load").await.unwrap();
        assert_eq!(stored.metrics.get("items"), Some(&3));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn recorded_trace_returns_latest_by_name() {
        let performance = Performance::new();
        for value in [1, 2] {
            let mut trace = performance.new_trace("LCP").unwrap();
            trace.put_metric("LCP", value).unwrap();
            trace.stop().await.unwrap();
        }
        assert_eq!(performance.recorded_traces().await.len(), 2);
        let latest = performance.recorded_trace("LCP").await.unwrap();
        assert_eq!(latest.metrics["LCP"], 2);
        assert!(performance.recorded_trace("FID").await.is_none());
    }

    #[test]
    fn invalid_names_are_rejected() {
        let performance = Performance::new();
        let err = performance.new_trace("  ").unwrap_err();
        assert_eq!(err.code, PerformanceErrorCode::InvalidArgument);

        let mut trace = performance.new_trace("ok").unwrap();
        let long = "m".repeat(MAX_METRIC_NAME_LENGTH + 1);
        assert!(trace.put_metric(&long, 1).is_err());
        assert_eq!(trace.metric(&long), None);
    }
}
