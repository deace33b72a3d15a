#![doc = include_str!("README.md")]
mod api;
mod constants;
mod error;
mod instrumentation;
mod metrics;
mod monitoring;
mod navigation;

#[doc(inline)]
pub use api::{Performance, PerformanceTrace, TraceHandle};

#[doc(inline)]
pub use constants::{
    DEFAULT_FIREBASE_SDK_URL, DEFAULT_NAVIGATION_TRACE_NAME, FIREBASE_LOGGING_ORIGIN,
    MAX_METRIC_NAME_LENGTH, MAX_TRACE_NAME_LENGTH, METRICS_CALLBACK_GLOBAL,
};

#[doc(inline)]
pub use error::{internal_error, invalid_argument, PerformanceError, PerformanceErrorCode, PerformanceResult};

#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
#[doc(inline)]
pub use instrumentation::collect_server_timing;

#[doc(inline)]
pub use metrics::{report_performance_metrics, MetricSample, ServerTiming, WebVital};

#[doc(inline)]
pub use monitoring::PerformanceMonitoring;

#[doc(inline)]
pub use navigation::NavigationTrace;
