use std::collections::BTreeMap;

pub const CLICK_TRIGGER: &str = "onClick";

/// Which events an instrumented element reports, keyed by the interaction that fires them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Trigger {
    /// One event, reported on click.
    Single(String),
    /// Interaction kind (`onClick`, `onFocus`, ...) to event name.
    Multi(BTreeMap<String, String>),
}

impl Trigger {
    pub fn single(event: impl Into<String>) -> Self {
        Trigger::Single(event.into())
    }

    pub fn multi<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Trigger::Multi(
            entries
                .into_iter()
                .map(|(kind, event)| (kind.into(), event.into()))
                .collect(),
        )
    }

    /// The trigger as an interaction-kind to event mapping.
    pub fn events(&self) -> BTreeMap<String, String> {
        match self {
            Trigger::Single(event) => BTreeMap::from([(CLICK_TRIGGER.to_string(), event.clone())]),
            Trigger::Multi(map) => map.clone(),
        }
    }

    pub fn event_for(&self, kind: &str) -> Option<&str> {
        match self {
            Trigger::Single(event) if kind == CLICK_TRIGGER => Some(event),
            Trigger::Single(_) => None,
            Trigger::Multi(map) => map.get(kind).map(String::as_str),
        }
    }

    /// The event reported on click, which is the only interaction AMP pages can declare here.
    pub fn click_event(&self) -> Option<&str> {
        self.event_for(CLICK_TRIGGER)
    }
}

impl From<&str> for Trigger {
    fn from(event: &str) -> Self {
        Trigger::single(event)
    }
}

impl From<String> for Trigger {
    fn from(event: String) -> Self {
        Trigger::Single(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_event_normalizes_to_click() {
        let trigger = Trigger::from("addedToCart");
        assert_eq!(
            trigger.events(),
            BTreeMap::from([("onClick".to_string(), "addedToCart".to_string())])
        );
        assert_eq!(trigger.click_event(), Some("addedToCart"));
        assert_eq!(trigger.event_for("onFocus"), None);
    }

    #[test]
    fn multi_trigger_keeps_every_mapping() {
        let trigger = Trigger::multi([("onClick", "productClicked"), ("onFocus", "productFocus")]);
        assert_eq!(trigger.event_for("onFocus"), Some("productFocus"));
        assert_eq!(trigger.events().len(), 2);
    }

    #[test]
    fn multi_trigger_without_click() {
        let trigger = Trigger::multi([("onMouseOver", "productHovered")]);
        assert_eq!(trigger.click_event(), None);
    }
}
