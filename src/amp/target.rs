use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An element (or the page itself) instrumented for tracking in an AMP render.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmpTarget {
    pub event: String,
    pub event_params: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
}

impl AmpTarget {
    pub fn new(event: impl Into<String>, event_params: Value) -> Self {
        Self {
            event: event.into(),
            event_params,
            selector: None,
        }
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }
}

/// A freshly allocated identifier that makes one rendered node addressable from trigger rules.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AmpSelector {
    id: String,
    attribute: String,
}

impl AmpSelector {
    pub(crate) fn new(id: u64, attribute: &str) -> Self {
        Self {
            id: id.to_string(),
            attribute: attribute.to_string(),
        }
    }

    /// Value to set on the element's attribute.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// CSS selector matching the element, e.g. `[data-amp-id="0"]`.
    pub fn css(&self) -> String {
        format!("[{}=\"{}\"]", self.attribute, self.id)
    }
}

impl fmt::Display for AmpSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}=\"{}\"]", self.attribute, self.id)
    }
}

/// Argument handed to every tag builder.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedTargets {
    pub tracked_targets: Vec<AmpTarget>,
}

impl TrackedTargets {
    /// Targets registered for `event`, in registration order.
    pub fn for_event<'a>(&'a self, event: &'a str) -> impl Iterator<Item = &'a AmpTarget> + 'a {
        self.tracked_targets
            .iter()
            .filter(move |target| target.event == event)
    }
}
