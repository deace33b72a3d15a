use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;

use crate::analytics::error::{validate_event_name, AnalyticsResult};
use crate::analytics::{Analytics, EventPayload, ListenerId};
use crate::targets::window::WindowBridge;
use crate::targets::AnalyticsTarget;

/// Characters `encodeURIComponent` leaves untouched.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const AMP_CONFIG_URL: &str = "https://www.googletagmanager.com/amp.json";

pub type GtmHandler = Arc<dyn Fn(&EventPayload) -> Value + Send + Sync + 'static>;

/// Google Tag Manager integration.
///
/// Standard renders push one object per handled event onto the data layer. AMP renders emit a
/// single `<amp-analytics>` tag loading the AMP container, when one is configured.
#[derive(Clone)]
pub struct GoogleTagManager {
    container_id: Option<String>,
    data_layer_name: String,
    amp_container_id: Option<String>,
    amp_source_origin: String,
    handlers: BTreeMap<String, GtmHandler>,
}

impl fmt::Debug for GoogleTagManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoogleTagManager")
            .field("container_id", &self.container_id)
            .field("data_layer_name", &self.data_layer_name)
            .field("amp_container_id", &self.amp_container_id)
            .field("events", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for GoogleTagManager {
    fn default() -> Self {
        Self {
            container_id: None,
            data_layer_name: "dataLayer".to_string(),
            amp_container_id: None,
            amp_source_origin: "SOURCE_URL".to_string(),
            handlers: BTreeMap::new(),
        }
    }
}

impl GoogleTagManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_container_id(mut self, id: impl Into<String>) -> Self {
        self.container_id = Some(id.into());
        self
    }

    pub fn with_data_layer_name(mut self, name: impl Into<String>) -> Self {
        self.data_layer_name = name.into();
        self
    }

    pub fn with_amp_container_id(mut self, id: impl Into<String>) -> Self {
        self.amp_container_id = Some(id.into());
        self
    }

    /// Value passed as `gtm.url`; AMP substitutes `SOURCE_URL` at runtime.
    pub fn with_amp_source_origin(mut self, origin: impl Into<String>) -> Self {
        self.amp_source_origin = origin.into();
        self
    }

    pub fn handler<F>(mut self, event: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&EventPayload) -> Value + Send + Sync + 'static,
    {
        self.handlers.insert(event.into(), Arc::new(handler));
        self
    }

    pub fn data_layer_name(&self) -> &str {
        &self.data_layer_name
    }

    fn amp_tag(amp_container_id: &str, source_origin: &str) -> String {
        format!(
            "<amp-analytics config=\"{AMP_CONFIG_URL}?id={}&gtm.url={}\" data-credentials=\"include\"></amp-analytics>",
            utf8_percent_encode(amp_container_id, URI_COMPONENT),
            utf8_percent_encode(source_origin, URI_COMPONENT),
        )
    }
}

impl AnalyticsTarget for GoogleTagManager {
    fn attach(
        &self,
        analytics: &Analytics,
        window: Arc<dyn WindowBridge>,
    ) -> AnalyticsResult<Vec<ListenerId>> {
        if self.container_id.is_none() {
            log::debug!("no tag manager container configured; listeners not attached");
            return Ok(Vec::new());
        }
        for event in self.handlers.keys() {
            validate_event_name(event)?;
        }

        let mut ids = Vec::with_capacity(self.handlers.len());
        for (event, handler) in &self.handlers {
            let handler = handler.clone();
            let window = window.clone();
            let data_layer = self.data_layer_name.clone();
            ids.push(analytics.on(event, move |payload| {
                window.push_global(&data_layer, handler(payload));
            })?);
        }
        Ok(ids)
    }

    fn register_amp(&self, analytics: &Analytics) -> bool {
        let Some(amp_container_id) = self.amp_container_id.clone() else {
            return false;
        };
        let source_origin = self.amp_source_origin.clone();
        analytics.register_tag_builder(move |_| Self::amp_tag(&amp_container_id, &source_origin));
        true
    }

    fn head_script(&self) -> Option<String> {
        let container_id = self.container_id.as_deref()?;
        let data_layer = &self.data_layer_name;
        Some(format!(
            r#"(function(w,d,s,l,i){{w[l]=w[l]||[];w[l].push({{'gtm.start':
new Date().getTime(),event:'gtm.js'}});var f=d.getElementsByTagName(s)[0],
j=d.createElement(s),dl=l!='dataLayer'?'&l='+l:'';j.async=true;j.src=
'https://www.googletagmanager.com/gtm.js?id='+i+dl;f.parentNode.insertBefore(j,f);
}})(window,document,'script','{data_layer}','{container_id}');"#
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::StaticNavigation;
    use crate::targets::window::{BufferedWindow, WindowCommand};
    use serde_json::json;

    fn analytics() -> Analytics {
        Analytics::new(Arc::new(StaticNavigation::default()))
    }

    #[test]
    fn amp_tag_loads_container_config() {
        let analytics = analytics();
        GoogleTagManager::new()
            .with_amp_container_id("ampContainerId")
            .register_amp(&analytics);

        assert_eq!(
            analytics.compile(),
            "<amp-analytics config=\"https://www.googletagmanager.com/amp.json?id=ampContainerId&gtm.url=SOURCE_URL\" data-credentials=\"include\"></amp-analytics>"
        );
    }

    #[test]
    fn amp_tag_values_are_uri_encoded() {
        let tag = GoogleTagManager::amp_tag("GTM-1 2", "https://shop.example/a?b=c");
        assert!(tag.contains("id=GTM-1%202&gtm.url=https%3A%2F%2Fshop.example%2Fa%3Fb%3Dc\""));
    }

    #[test]
    fn without_amp_container_nothing_is_rendered() {
        let analytics = analytics();
        assert!(!GoogleTagManager::new().register_amp(&analytics));
        assert_eq!(analytics.amp().builder_count(), 0);
        assert_eq!(analytics.compile(), "");
    }

    #[test]
    fn events_are_pushed_onto_the_data_layer() {
        let analytics = analytics();
        let window = Arc::new(BufferedWindow::new());
        GoogleTagManager::new()
            .with_container_id("GTM-1")
            .with_data_layer_name("customLayer")
            .handler("productClicked", |payload| {
                json!({"event": "productClicked", "id": payload.event_params["id"]})
            })
            .attach(&analytics, window.clone())
            .unwrap();
        analytics.activate();

        analytics.fire("productClicked", json!({"id": 7})).unwrap();

        assert_eq!(
            window.commands(),
            vec![WindowCommand::Push {
                global: "customLayer".into(),
                value: json!({"event": "productClicked", "id": 7}),
            }]
        );
    }

    #[test]
    fn attach_without_container_is_a_no_op() {
        let analytics = analytics();
        let window = Arc::new(BufferedWindow::new());
        let ids = GoogleTagManager::new()
            .handler("productClicked", |_| json!({}))
            .attach(&analytics, window.clone())
            .unwrap();
        analytics.activate();
        analytics.fire("productClicked", json!({})).unwrap();

        assert!(ids.is_empty());
        assert!(window.commands().is_empty());
    }

    #[test]
    fn head_script_requires_container() {
        assert!(GoogleTagManager::new().head_script().is_none());
        let script = GoogleTagManager::new()
            .with_container_id("GTM-XYZ")
            .head_script()
            .unwrap();
        assert!(script.ends_with("'dataLayer','GTM-XYZ');"));
    }
}
