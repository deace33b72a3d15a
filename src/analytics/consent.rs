use std::collections::HashMap;

use percent_encoding::percent_decode_str;

use crate::analytics::constants::DEFAULT_DISABLE_COOKIE;
use crate::analytics::settings::AnalyticsSettings;

/// Opt-out signal consulted once, when analytics is initialized.
pub trait ConsentCheck: Send + Sync {
    fn is_disabled(&self) -> bool;
}

/// Consent check for hosts without an opt-out mechanism.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysEnabled;

impl ConsentCheck for AlwaysEnabled {
    fn is_disabled(&self) -> bool {
        false
    }
}

/// Reads the opt-out cookie (`rsf_disable_analytics=true` by default) from a `Cookie` header.
#[derive(Clone, Debug, Default)]
pub struct CookieConsent {
    cookies: HashMap<String, String>,
    cookie_name: Option<String>,
}

impl CookieConsent {
    pub fn from_header(header: &str) -> Self {
        Self {
            cookies: parse_cookie_header(header),
            cookie_name: None,
        }
    }

    /// Checks the cookie named by `settings.disable_cookie_name`.
    pub fn from_settings(settings: &AnalyticsSettings, header: &str) -> Self {
        Self::from_header(header).with_cookie_name(settings.disable_cookie_name.as_str())
    }

    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = Some(name.into());
        self
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    fn cookie_name(&self) -> &str {
        self.cookie_name.as_deref().unwrap_or(DEFAULT_DISABLE_COOKIE)
    }
}

impl ConsentCheck for CookieConsent {
    fn is_disabled(&self) -> bool {
        self.cookie(self.cookie_name()) == Some("true")
    }
}

#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
impl CookieConsent {
    /// Reads `document.cookie`; an unreadable cookie jar counts as no opt-out.
    pub fn from_document() -> Self {
        use wasm_bindgen::JsCast;

        let header = web_sys::window()
            .and_then(|window| window.document())
            .and_then(|document| document.dyn_into::<web_sys::HtmlDocument>().ok())
            .and_then(|document| document.cookie().ok())
            .unwrap_or_default();
        Self::from_header(&header)
    }

    /// [`from_document`](Self::from_document), checking `settings.disable_cookie_name`.
    pub fn from_document_with_settings(settings: &AnalyticsSettings) -> Self {
        Self::from_document().with_cookie_name(settings.disable_cookie_name.as_str())
    }
}

fn parse_cookie_header(header: &str) -> HashMap<String, String> {
    let mut cookies = HashMap::new();
    for pair in header.split(';') {
        let mut parts = pair.splitn(2, '=');
        let name = parts.next().unwrap_or_default().trim();
        if name.is_empty() {
            continue;
        }
        let raw = parts.next().unwrap_or_default().trim();
        let value = percent_decode_str(raw).decode_utf8_lossy().into_owned();
        // first occurrence wins
        cookies.entry(name.to_string()).or_insert(value);
    }
    cookies
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opt_out_cookie_disables_analytics() {
        let consent = CookieConsent::from_header("session=abc; rsf_disable_analytics=true");
        assert!(consent.is_disabled());
    }

    #[test]
    fn other_values_leave_analytics_enabled() {
        assert!(!CookieConsent::from_header("rsf_disable_analytics=false").is_disabled());
        assert!(!CookieConsent::from_header("").is_disabled());
        assert!(!AlwaysEnabled.is_disabled());
    }

    #[test]
    fn values_are_percent_decoded() {
        let consent = CookieConsent::from_header("greeting=hello%20world;flag");
        assert_eq!(consent.cookie("greeting"), Some("hello world"));
        assert_eq!(consent.cookie("flag"), Some(""));
    }

    #[test]
    fn custom_cookie_name() {
        let consent =
            CookieConsent::from_header("no_tracking=true").with_cookie_name("no_tracking");
        assert!(consent.is_disabled());
    }

    #[test]
    fn settings_choose_the_cookie() {
        let settings = AnalyticsSettings {
            disable_cookie_name: "no_tracking".into(),
            ..Default::default()
        };
        assert!(CookieConsent::from_settings(&settings, "no_tracking=true").is_disabled());
        assert!(!CookieConsent::from_settings(&settings, "rsf_disable_analytics=true").is_disabled());
        assert!(CookieConsent::from_settings(
            &AnalyticsSettings::default(),
            "rsf_disable_analytics=true"
        )
        .is_disabled());
    }
}
