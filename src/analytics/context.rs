//! Event payloads and the navigation metadata captured when an event is fired.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::analytics::constants::{EVENT_CONTEXT_KEY, EVENT_PARAMS_KEY};

/// Snapshot of the page's navigation state at fire time.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventContext {
    pub title: String,
    pub pathname: String,
    pub search: String,
    pub uri: String,
    pub referrer: String,
}

impl EventContext {
    pub fn new(
        title: impl Into<String>,
        pathname: impl Into<String>,
        search: impl Into<String>,
        referrer: impl Into<String>,
    ) -> Self {
        let pathname = pathname.into();
        let search = search.into();
        Self {
            title: title.into(),
            uri: format!("{pathname}{search}"),
            pathname,
            search,
            referrer: referrer.into(),
        }
    }
}

/// What every listener receives: the caller's parameters plus the context captured at fire time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    #[serde(default = "empty_object")]
    pub event_params: Value,
    pub event_context: EventContext,
}

impl EventPayload {
    pub fn new(event_params: Value, event_context: EventContext) -> Self {
        Self {
            event_params: normalize_params(event_params),
            event_context,
        }
    }

    /// Looks up a top-level parameter by key.
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.event_params.get(key)
    }

    /// Wraps `raw` with a context from `navigation`, unless it already carries a truthy
    /// `eventContext`.
    ///
    /// A carried context is passed through field by field: string fields are kept and anything
    /// else is left empty. A context that is not an object is replaced by a fresh snapshot.
    pub(crate) fn wrap(raw: Value, navigation: &dyn NavigationSource) -> Self {
        let mut fields = match normalize_params(raw) {
            Value::Object(fields) if fields.get(EVENT_CONTEXT_KEY).is_some_and(is_truthy) => {
                fields
            }
            raw => return Self::new(raw, navigation.snapshot()),
        };
        let event_params = fields.remove(EVENT_PARAMS_KEY).unwrap_or(Value::Null);
        let event_context = fields
            .get(EVENT_CONTEXT_KEY)
            .and_then(context_from_value)
            .unwrap_or_else(|| {
                log::debug!("eventContext is not an object; using the current navigation");
                navigation.snapshot()
            });
        Self::new(event_params, event_context)
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert(EVENT_PARAMS_KEY.to_string(), self.event_params.clone());
        map.insert(
            EVENT_CONTEXT_KEY.to_string(),
            serde_json::to_value(&self.event_context).unwrap_or(Value::Null),
        );
        Value::Object(map)
    }
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

fn normalize_params(params: Value) -> Value {
    match params {
        Value::Null => empty_object(),
        other => other,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn context_from_value(value: &Value) -> Option<EventContext> {
    let fields = value.as_object()?;
    let field = |key: &str| {
        fields
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    Some(EventContext {
        title: field("title"),
        pathname: field("pathname"),
        search: field("search"),
        uri: field("uri"),
        referrer: field("referrer"),
    })
}

/// Source of the navigation metadata attached to bare payloads.
pub trait NavigationSource: Send + Sync {
    fn snapshot(&self) -> EventContext;
}

/// Navigation metadata supplied by the host, e.g. from the request being rendered.
#[derive(Debug, Default)]
pub struct StaticNavigation {
    current: RwLock<EventContext>,
}

impl StaticNavigation {
    pub fn new(context: EventContext) -> Self {
        Self {
            current: RwLock::new(context),
        }
    }

    /// Replaces the metadata used for events fired from now on.
    pub fn navigate(&self, context: EventContext) {
        *self.current.write().unwrap() = context;
    }
}

impl NavigationSource for StaticNavigation {
    fn snapshot(&self) -> EventContext {
        self.current.read().unwrap().clone()
    }
}

#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
pub use wasm::BrowserNavigation;

#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
mod wasm {
    use super::{EventContext, NavigationSource};

    /// Reads `document.title`, `location` and `document.referrer` on every snapshot.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct BrowserNavigation;

    impl NavigationSource for BrowserNavigation {
        fn snapshot(&self) -> EventContext {
            let Some(window) = web_sys::window() else {
                return EventContext::default();
            };
            let location = window.location();
            let pathname = location.pathname().unwrap_or_default();
            let search = location.search().unwrap_or_default();
            let (title, referrer) = window
                .document()
                .map(|document| (document.title(), document.referrer()))
                .unwrap_or_default();
            EventContext::new(title, pathname, search, referrer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product_page() -> StaticNavigation {
        StaticNavigation::new(EventContext::new(
            "Product",
            "/p/1",
            "?color=red",
            "https://example.com/",
        ))
    }

    #[test]
    fn uri_joins_pathname_and_search() {
        let context = product_page().snapshot();
        assert_eq!(context.uri, "/p/1?color=red");
    }

    #[test]
    fn bare_payload_is_wrapped_once() {
        let payload = EventPayload::wrap(json!({"a": 1}), &product_page());
        assert_eq!(payload.event_params, json!({"a": 1}));
        assert_eq!(payload.event_context.title, "Product");
    }

    #[test]
    fn null_payload_becomes_empty_object() {
        let payload = EventPayload::wrap(Value::Null, &product_page());
        assert_eq!(payload.event_params, json!({}));
    }

    #[test]
    fn wrapped_payload_passes_through() {
        let original = EventPayload::new(json!({"a": 2}), EventContext::new("Old", "/old", "", ""));
        let again = EventPayload::wrap(original.to_value(), &product_page());
        assert_eq!(again, original);
    }

    #[test]
    fn wrapped_payload_without_params_gets_empty_object() {
        let raw = json!({"eventContext": {"pathname": "/cart"}});
        let payload = EventPayload::wrap(raw, &product_page());
        assert_eq!(payload.event_params, json!({}));
        assert_eq!(payload.event_context.pathname, "/cart");
    }

    #[test]
    fn falsy_context_is_wrapped() {
        for context in [json!(false), json!(0), json!(""), Value::Null] {
            let raw = json!({"eventContext": context, "foo": 1});
            let payload = EventPayload::wrap(raw.clone(), &product_page());
            assert_eq!(payload.event_params, raw);
            assert_eq!(payload.event_context.pathname, "/p/1");
        }
    }

    #[test]
    fn malformed_truthy_context_never_fails() {
        let payload = EventPayload::wrap(
            json!({"eventContext": "ctx", "eventParams": {"foo": 1}}),
            &product_page(),
        );
        assert_eq!(payload.event_params, json!({"foo": 1}));
        assert_eq!(payload.event_context.title, "Product");

        let payload = EventPayload::wrap(
            json!({"eventContext": {"title": 5, "pathname": "/cart"}}),
            &product_page(),
        );
        assert_eq!(payload.event_params, json!({}));
        assert_eq!(payload.event_context.title, "");
        assert_eq!(payload.event_context.pathname, "/cart");
    }

    #[test]
    fn navigate_changes_later_snapshots() {
        let navigation = product_page();
        navigation.navigate(EventContext::new("Cart", "/cart", "", "/p/1"));
        assert_eq!(navigation.snapshot().title, "Cart");
    }
}
