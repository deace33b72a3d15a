use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::amp::DEFAULT_SELECTOR_ATTRIBUTE;
use crate::analytics::constants::{DEFAULT_DISABLE_COOKIE, SETTINGS_ENV_VAR};
use crate::analytics::error::{invalid_config, AnalyticsResult};
use crate::platform::environment::config_object_from_env;

/// Host-level analytics options.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsSettings {
    /// Hold queued events until the page reports it is interactive.
    pub delay_until_interactive: bool,
    /// Attribute used for generated AMP selectors, e.g. `data-amp-id`.
    pub amp_selector_attribute: String,
    /// Cookie whose value `true` opts the visitor out of analytics.
    pub disable_cookie_name: String,
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            delay_until_interactive: false,
            amp_selector_attribute: DEFAULT_SELECTOR_ATTRIBUTE.to_string(),
            disable_cookie_name: DEFAULT_DISABLE_COOKIE.to_string(),
        }
    }
}

impl AnalyticsSettings {
    pub fn from_json(map: Map<String, Value>) -> AnalyticsResult<Self> {
        let settings: Self = serde_json::from_value(Value::Object(map))
            .map_err(|err| invalid_config(format!("invalid analytics settings: {err}")))?;
        if settings.amp_selector_attribute.trim().is_empty() {
            return Err(invalid_config("ampSelectorAttribute must not be empty"));
        }
        Ok(settings)
    }

    /// Loads settings from `STOREFRONT_ANALYTICS_CONFIG`, falling back to the defaults when the
    /// variable is unset.
    pub fn from_env() -> AnalyticsResult<Self> {
        match config_object_from_env(SETTINGS_ENV_VAR) {
            Some(map) => Self::from_json(map),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::error::AnalyticsErrorCode;
    use serde_json::json;
    use std::sync::{LazyLock, Mutex};

    static ENV_GUARD: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn missing_fields_use_defaults() {
        let settings = AnalyticsSettings::from_json(object(json!({"delayUntilInteractive": true})))
            .unwrap();
        assert!(settings.delay_until_interactive);
        assert_eq!(settings.amp_selector_attribute, "data-amp-id");
        assert_eq!(settings.disable_cookie_name, "rsf_disable_analytics");
    }

    #[test]
    fn wrong_types_are_invalid_config() {
        let err = AnalyticsSettings::from_json(object(json!({"delayUntilInteractive": "soon"})))
            .unwrap_err();
        assert_eq!(err.code, AnalyticsErrorCode::InvalidConfig);
    }

    #[test]
    fn blank_selector_attribute_is_rejected() {
        let err = AnalyticsSettings::from_json(object(json!({"ampSelectorAttribute": ""})))
            .unwrap_err();
        assert_eq!(err.code_str(), "analytics/invalid-config");
    }

    #[test]
    fn env_variable_is_read() {
        let _guard = ENV_GUARD.lock().unwrap();
        unsafe { std::env::set_var(SETTINGS_ENV_VAR, "ampSelectorAttribute=data-x") };
        let settings = AnalyticsSettings::from_env().unwrap();
        unsafe { std::env::remove_var(SETTINGS_ENV_VAR) };
        assert_eq!(settings.amp_selector_attribute, "data-x");

        assert_eq!(AnalyticsSettings::from_env().unwrap(), AnalyticsSettings::default());
    }
}
