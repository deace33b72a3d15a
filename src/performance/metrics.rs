use std::fmt;

use serde::{Deserialize, Serialize};

use crate::performance::api::Performance;
use crate::performance::error::PerformanceResult;

/// Core Web Vitals reported after page load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WebVital {
    Cls,
    Fid,
    Lcp,
    Ttfb,
    Fcp,
}

impl WebVital {
    /// Reporting order.
    pub const ALL: [WebVital; 5] = [
        WebVital::Cls,
        WebVital::Fid,
        WebVital::Lcp,
        WebVital::Ttfb,
        WebVital::Fcp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WebVital::Cls => "CLS",
            WebVital::Fid => "FID",
            WebVital::Lcp => "LCP",
            WebVital::Ttfb => "TTFB",
            WebVital::Fcp => "FCP",
        }
    }

    pub fn sample(self, value: f64) -> MetricSample {
        MetricSample::new(self.as_str(), value)
    }
}

impl fmt::Display for WebVital {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    pub name: String,
    pub value: f64,
}

impl MetricSample {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// One `Server-Timing` header entry; `duration` is in milliseconds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServerTiming {
    pub name: String,
    pub duration: f64,
}

impl ServerTiming {
    pub fn new(name: impl Into<String>, duration: f64) -> Self {
        Self {
            name: name.into(),
            duration,
        }
    }
}

/// Reports every Server-Timing entry, then every vital sample, each as its own trace carrying
/// a single metric of the same name.
///
/// Failures are logged and skipped; this never fails.
pub async fn report_performance_metrics(
    performance: &Performance,
    server_timings: &[ServerTiming],
    vitals: &[MetricSample],
) {
    let samples = server_timings
        .iter()
        .map(|timing| (timing.name.as_str(), timing.duration))
        .chain(vitals.iter().map(|sample| (sample.name.as_str(), sample.value)));

    for (name, value) in samples {
        if let Err(err) = report_metric(performance, name, value).await {
            log::warn!("failed to report performance metric {name:?}: {err}");
        }
    }
}

async fn report_metric(performance: &Performance, name: &str, value: f64) -> PerformanceResult<()> {
    let mut trace = performance.new_trace(name)?;
    trace.put_metric(name, value.floor() as i64)?;
    trace.stop().await?;
    Ok(())
}
