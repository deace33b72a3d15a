use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::amp::{AmpSelector, AmpTarget};
use crate::analytics::error::{validate_event_name, AnalyticsResult};
use crate::analytics::{Analytics, RenderMode};
use crate::track::trigger::Trigger;

pub type SuccessCallback = Arc<dyn Fn() + Send + Sync + 'static>;

// Hosts may inject the interaction kind as a parameter; it is never reported.
const TRIGGER_PARAM: &str = "trigger";

/// Instrumentation for one interactive element.
#[derive(Clone)]
pub struct Track {
    trigger: Trigger,
    params: Map<String, Value>,
    on_success: Option<SuccessCallback>,
}

impl fmt::Debug for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Track")
            .field("trigger", &self.trigger)
            .field("params", &self.params)
            .finish()
    }
}

impl Track {
    pub fn new(trigger: impl Into<Trigger>) -> Self {
        Self {
            trigger: trigger.into(),
            params: Map::new(),
            on_success: None,
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn params(mut self, params: Map<String, Value>) -> Self {
        self.params.extend(params);
        self
    }

    /// Called after each event fired by this element has been handed to the broadcaster.
    pub fn on_success<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.on_success = Some(Arc::new(callback));
        self
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    /// Wires the element for the current render.
    ///
    /// In AMP renders an element with a click event gets a fresh selector and a registered
    /// target; elements without one are left untouched. Standard renders get handlers that fire
    /// the mapped events.
    pub fn bind(&self, analytics: &Arc<Analytics>, mode: RenderMode) -> AnalyticsResult<TrackBinding> {
        for event in self.trigger.events().values() {
            validate_event_name(event)?;
        }
        let params = self.reported_params();

        if mode.is_amp() {
            let Some(event) = self.trigger.click_event() else {
                return Ok(TrackBinding::Passthrough);
            };
            let selector = analytics.allocate_selector();
            analytics.register_target(AmpTarget::new(event, params).with_selector(selector.css()));
            return Ok(TrackBinding::Amp(selector));
        }

        Ok(TrackBinding::Interactive(TrackHandlers {
            analytics: analytics.clone(),
            trigger: self.trigger.clone(),
            params,
            on_success: self.on_success.clone(),
        }))
    }

    fn reported_params(&self) -> Value {
        let mut params = self.params.clone();
        params.remove(TRIGGER_PARAM);
        Value::Object(params)
    }
}

/// Result of [`Track::bind`].
#[derive(Debug)]
pub enum TrackBinding {
    /// Set `selector.attribute()` to `selector.id()` on the rendered element.
    Amp(AmpSelector),
    /// Nothing to attach.
    Passthrough,
    /// Call [`TrackHandlers::dispatch`] from the element's interaction handlers.
    Interactive(TrackHandlers),
}

#[derive(Clone)]
pub struct TrackHandlers {
    analytics: Arc<Analytics>,
    trigger: Trigger,
    params: Value,
    on_success: Option<SuccessCallback>,
}

impl fmt::Debug for TrackHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackHandlers")
            .field("trigger", &self.trigger)
            .field("params", &self.params)
            .finish()
    }
}

impl TrackHandlers {
    /// Interaction kinds that have an event attached.
    pub fn kinds(&self) -> Vec<String> {
        self.trigger.events().into_keys().collect()
    }

    /// Fires the event mapped to `kind`. Returns `false` when `kind` has no event.
    pub fn dispatch(&self, kind: &str) -> AnalyticsResult<bool> {
        let Some(event) = self.trigger.event_for(kind) else {
            return Ok(false);
        };
        self.analytics.fire(event, self.params.clone())?;
        if let Some(callback) = &self.on_success {
            callback();
        }
        Ok(true)
    }
}
