use serde_json::{Map, Value};

use crate::amp::AmpTarget;
use crate::analytics::error::AnalyticsResult;
use crate::analytics::{Analytics, RenderMode, PAGEVIEW_EVENT};

/// Reports a `pageview` event for the page being rendered.
#[derive(Clone, Debug, Default)]
pub struct TrackPageView {
    params: Map<String, Value>,
}

impl TrackPageView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Fires `pageview` on standard renders. AMP renders register a selector-less target,
    /// which vendors turn into a "visible" trigger.
    pub fn record(&self, analytics: &Analytics, mode: RenderMode) -> AnalyticsResult<()> {
        let params = Value::Object(self.params.clone());
        if mode.is_amp() {
            analytics.register_target(AmpTarget::new(PAGEVIEW_EVENT, params));
            return Ok(());
        }
        analytics.fire(PAGEVIEW_EVENT, params)
    }
}
