use std::sync::Mutex;

use crate::performance::api::{Performance, PerformanceTrace, TraceHandle};
use crate::performance::constants::DEFAULT_NAVIGATION_TRACE_NAME;
use crate::performance::error::PerformanceResult;

/// Times client-side navigations: the router calls [`begin`](Self::begin) when a route change
/// starts and each rendered page calls [`complete`](Self::complete) with its path.
#[derive(Debug)]
pub struct NavigationTrace {
    performance: Performance,
    name: String,
    active: Mutex<Option<TraceHandle>>,
    last_path: Mutex<Option<String>>,
}

impl NavigationTrace {
    pub fn new(performance: Performance) -> Self {
        Self::with_name(performance, DEFAULT_NAVIGATION_TRACE_NAME)
    }

    pub fn with_name(performance: Performance, name: impl Into<String>) -> Self {
        Self {
            performance,
            name: name.into(),
            active: Mutex::new(None),
            last_path: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_active(&self) -> bool {
        self.active.lock().unwrap().is_some()
    }

    /// Starts timing a navigation. A trace that is still running is discarded.
    pub fn begin(&self) -> PerformanceResult<()> {
        let trace = self.performance.new_trace(&self.name)?;
        if self.active.lock().unwrap().replace(trace).is_some() {
            log::debug!("navigation trace {} restarted before completing", self.name);
        }
        Ok(())
    }

    /// Stops and clears the active trace once rendering for `as_path` has finished.
    ///
    /// Repeated renders of the same path are ignored, as is completion with no active trace.
    pub async fn complete(&self, as_path: &str) -> PerformanceResult<Option<PerformanceTrace>> {
        {
            let mut last_path = self.last_path.lock().unwrap();
            if last_path.as_deref() == Some(as_path) {
                return Ok(None);
            }
            *last_path = Some(as_path.to_string());
        }

        let trace = self.active.lock().unwrap().take();
        match trace {
            Some(trace) => trace.stop().await.map(Some),
            None => Ok(None),
        }
    }
}
