use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::amp::TrackedTargets;
use crate::analytics::error::{validate_event_name, AnalyticsResult};
use crate::analytics::{Analytics, EventContext, EventPayload, ListenerId, PAGEVIEW_EVENT};
use crate::targets::window::WindowBridge;
use crate::targets::AnalyticsTarget;

pub type GaHandler = Arc<dyn Fn(&EventPayload) -> GaHit + Send + Sync + 'static>;

/// What to send to Google Analytics for one event.
#[derive(Clone, Debug, PartialEq)]
pub struct GaHit {
    /// `hitType` sent with the hit; also the AMP trigger's `request`.
    pub hit_type: Option<String>,
    /// When `false` the event is left out of AMP trigger configuration.
    pub include_in_amp: bool,
    pub fields: Map<String, Value>,
}

impl Default for GaHit {
    fn default() -> Self {
        Self {
            hit_type: None,
            include_in_amp: true,
            fields: Map::new(),
        }
    }
}

impl GaHit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event() -> Self {
        Self::new().hit_type("event")
    }

    pub fn pageview() -> Self {
        Self::new().hit_type("pageview")
    }

    pub fn hit_type(mut self, hit_type: impl Into<String>) -> Self {
        self.hit_type = Some(hit_type.into());
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn exclude_from_amp(mut self) -> Self {
        self.include_in_amp = false;
        self
    }

    /// The object passed to `ga('send', ...)`.
    pub fn to_send_fields(&self) -> Value {
        let mut fields = Map::new();
        if let Some(hit_type) = &self.hit_type {
            fields.insert("hitType".to_string(), Value::String(hit_type.clone()));
        }
        for (key, value) in &self.fields {
            fields.insert(key.clone(), value.clone());
        }
        Value::Object(fields)
    }
}

/// Google Analytics (analytics.js) integration.
///
/// Each handler maps one analytics event to the hit sent with `ga('send', ...)` on standard
/// pages and to a click (or, for `pageview`, visibility) trigger on AMP pages.
#[derive(Clone)]
pub struct GoogleAnalytics {
    tracking_id: String,
    global_object_name: String,
    use_amp_client_id: bool,
    use_beacon: bool,
    trace: bool,
    handlers: BTreeMap<String, GaHandler>,
}

impl fmt::Debug for GoogleAnalytics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleAnalytics")
            .field("tracking_id", &self.tracking_id)
            .field("global_object_name", &self.global_object_name)
            .field("events", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl GoogleAnalytics {
    pub fn new(tracking_id: impl Into<String>) -> Self {
        Self {
            tracking_id: tracking_id.into(),
            global_object_name: "ga".to_string(),
            use_amp_client_id: true,
            use_beacon: true,
            trace: false,
            handlers: BTreeMap::new(),
        }
    }

    pub fn with_global_object_name(mut self, name: impl Into<String>) -> Self {
        self.global_object_name = name.into();
        self
    }

    pub fn with_amp_client_id(mut self, enabled: bool) -> Self {
        self.use_amp_client_id = enabled;
        self
    }

    pub fn with_beacon(mut self, enabled: bool) -> Self {
        self.use_beacon = enabled;
        self
    }

    pub fn with_trace(mut self, enabled: bool) -> Self {
        self.trace = enabled;
        self
    }

    pub fn handler<F>(mut self, event: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&EventPayload) -> GaHit + Send + Sync + 'static,
    {
        self.handlers.insert(event.into(), Arc::new(handler));
        self
    }

    pub fn tracking_id(&self) -> &str {
        &self.tracking_id
    }

    fn amp_tag(tracking_id: &str, handlers: &BTreeMap<String, GaHandler>, tracked: &TrackedTargets) -> String {
        let triggers = tracked
            .tracked_targets
            .iter()
            .filter_map(|target| {
                let handler = handlers.get(&target.event)?;
                let payload = EventPayload::new(target.event_params.clone(), EventContext::default());
                let hit = handler(&payload);
                if !hit.include_in_amp {
                    return None;
                }
                if target.event == PAGEVIEW_EVENT {
                    return Some(AmpTrigger {
                        on: "visible",
                        request: hit.hit_type,
                        vars: None,
                        selector: None,
                    });
                }
                Some(AmpTrigger {
                    on: "click",
                    request: hit.hit_type,
                    vars: Some(hit.fields),
                    selector: target.selector.clone(),
                })
            })
            .collect();
        let configuration = AmpConfiguration {
            vars: AmpAccount {
                account: tracking_id,
            },
            triggers,
        };
        let configuration = serde_json::to_string(&configuration).unwrap_or_else(|err| {
            log::warn!("failed to serialize google analytics amp configuration: {err}");
            "{}".to_string()
        });
        format!(
            "<amp-analytics type=\"googleanalytics\"><script type=\"application/json\">{configuration}</script></amp-analytics>"
        )
    }
}

impl AnalyticsTarget for GoogleAnalytics {
    fn attach(
        &self,
        analytics: &Analytics,
        window: Arc<dyn WindowBridge>,
    ) -> AnalyticsResult<Vec<ListenerId>> {
        for event in self.handlers.keys() {
            validate_event_name(event)?;
        }
        if self.trace {
            window.set_global("ga_debug", json!({ "trace": true }));
        }
        if self.use_beacon {
            window.call_global(
                &self.global_object_name,
                vec![json!("set"), json!("transport"), json!("beacon")],
            );
        }

        let mut ids = Vec::with_capacity(self.handlers.len());
        for (event, handler) in &self.handlers {
            let handler = handler.clone();
            let window = window.clone();
            let global = self.global_object_name.clone();
            ids.push(analytics.on(event, move |payload| {
                let hit = handler(payload);
                window.call_global(&global, vec![json!("send"), hit.to_send_fields()]);
            })?);
        }
        Ok(ids)
    }

    fn register_amp(&self, analytics: &Analytics) -> bool {
        let tracking_id = self.tracking_id.clone();
        let handlers = self.handlers.clone();
        analytics.register_tag_builder(move |tracked| Self::amp_tag(&tracking_id, &handlers, tracked));
        true
    }

    fn head_script(&self) -> Option<String> {
        let name = &self.global_object_name;
        let tracking_id = &self.tracking_id;
        let use_amp_client_id = self.use_amp_client_id;
        Some(format!(
            r#"(function(i,s,o,g,r,a,m){{i['GoogleAnalyticsObject']=r;i[r]=i[r]||function(){{
(i[r].q=i[r].q||[]).push(arguments)}},i[r].l=1*new Date();a=s.createElement(o),
m=s.getElementsByTagName(o)[0];a.async=1;a.src=g;m.parentNode.insertBefore(a,m)
}})(window,document,'script','https://www.google-analytics.com/analytics.js','{name}');
{name}('create', '{tracking_id}', 'auto', {{ useAmpClientId: {use_amp_client_id} }});"#
        ))
    }
}

#[derive(Serialize)]
struct AmpConfiguration<'a> {
    vars: AmpAccount<'a>,
    triggers: Vec<AmpTrigger>,
}

#[derive(Serialize)]
struct AmpAccount<'a> {
    account: &'a str,
}

#[derive(Serialize)]
struct AmpTrigger {
    on: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    vars: Option<Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    selector: Option<String>,
}
