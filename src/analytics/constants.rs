pub const PAGEVIEW_EVENT: &str = "pageview";

pub const DEFAULT_DISABLE_COOKIE: &str = "rsf_disable_analytics";

pub const SETTINGS_ENV_VAR: &str = "STOREFRONT_ANALYTICS_CONFIG";

pub(crate) const EVENT_CONTEXT_KEY: &str = "eventContext";
pub(crate) const EVENT_PARAMS_KEY: &str = "eventParams";
