use serde_json::Value;

use crate::performance::constants::{
    DEFAULT_FIREBASE_SDK_URL, DEFAULT_NAVIGATION_TRACE_NAME, FIREBASE_LOGGING_ORIGIN,
    METRICS_CALLBACK_GLOBAL,
};
use crate::platform::environment::firebase_config_from_env;

/// Head markup that loads the standalone Performance Monitoring SDK after the page loads and
/// hands the initialized instance to `window.__rsfFirebaseSendPerformanceMetrics`.
#[derive(Clone, Debug, PartialEq)]
pub struct PerformanceMonitoring {
    pub firebase_sdk_url: String,
    pub config: Option<Value>,
    pub navigation_trace_name: String,
}

impl PerformanceMonitoring {
    pub fn new(config: Value) -> Self {
        Self {
            firebase_sdk_url: DEFAULT_FIREBASE_SDK_URL.to_string(),
            config: Some(config),
            navigation_trace_name: DEFAULT_NAVIGATION_TRACE_NAME.to_string(),
        }
    }

    /// Reads the web app config from `FIREBASE_CONFIG`.
    pub fn from_env() -> Self {
        let config = firebase_config_from_env();
        if config.is_none() {
            log::debug!("FIREBASE_CONFIG not set; performance monitoring disabled");
        }
        Self {
            config,
            ..Self::new(Value::Null)
        }
    }

    pub fn with_sdk_url(mut self, url: impl Into<String>) -> Self {
        self.firebase_sdk_url = url.into();
        self
    }

    pub fn with_navigation_trace_name(mut self, name: impl Into<String>) -> Self {
        self.navigation_trace_name = name.into();
        self
    }

    /// Renders the preconnect link and loader script, or nothing without a config.
    pub fn render(&self) -> String {
        let Some(config) = &self.config else {
            return String::new();
        };
        let sdk_url = script_json(&Value::String(self.firebase_sdk_url.clone()));
        let config = script_json(config);
        format!(
            "<link href=\"{FIREBASE_LOGGING_ORIGIN}\" rel=\"preconnect\" crossorigin=\"anonymous\"/>\
<script defer>(function(sa,fbc){{function load(f,c){{var a=document.createElement('script');\
a.async=1;a.src=f;var s=document.getElementsByTagName('script')[0];\
s.parentNode.insertBefore(a,s);}}load(sa);\
window.addEventListener('load',function(){{\
window.firebasePerf=firebase.initializeApp(fbc).performance();\
if(window.{METRICS_CALLBACK_GLOBAL}){{window.{METRICS_CALLBACK_GLOBAL}(window.firebasePerf)}}\
}});}})({sdk_url}, {config});</script>"
        )
    }
}

/// JSON safe to inline in a `<script>` element.
fn script_json(value: &Value) -> String {
    value.to_string().replace("</", "<\\/")
}
