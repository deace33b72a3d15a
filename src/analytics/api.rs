use std::fmt;
use std::sync::{Arc, LazyLock};

use async_lock::OnceCell;
use serde_json::Value;

use crate::amp::{AmpCompiler, AmpSelector, AmpTarget, TrackedTargets};
use crate::analytics::broadcaster::{EventBroadcaster, ListenerId};
use crate::analytics::consent::{ConsentCheck, CookieConsent};
use crate::analytics::context::{EventPayload, NavigationSource};
use crate::analytics::error::AnalyticsResult;
use crate::analytics::interactive::InteractiveSignal;
use crate::analytics::settings::AnalyticsSettings;

/// The analytics context handed to vendor integrations and instrumented views.
///
/// Owns the event broadcaster used for standard renders and the AMP compiler used for AMP
/// renders, plus the one-time gates (interactive signal, consent) that decide whether queued
/// events are ever delivered.
pub struct Analytics {
    events: EventBroadcaster,
    amp: AmpCompiler,
    settings: AnalyticsSettings,
    interactive: OnceCell<()>,
}

impl fmt::Debug for Analytics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Analytics")
            .field("events", &self.events)
            .field("amp", &self.amp)
            .field("disabled", &self.is_disabled())
            .finish()
    }
}

impl Analytics {
    pub fn new(navigation: Arc<dyn NavigationSource>) -> Self {
        Self::with_settings(AnalyticsSettings::default(), navigation)
    }

    pub fn with_settings(settings: AnalyticsSettings, navigation: Arc<dyn NavigationSource>) -> Self {
        Self {
            events: EventBroadcaster::new(navigation),
            amp: AmpCompiler::with_attribute(settings.amp_selector_attribute.clone()),
            settings,
            interactive: OnceCell::new(),
        }
    }

    pub fn events(&self) -> &EventBroadcaster {
        &self.events
    }

    pub fn amp(&self) -> &AmpCompiler {
        &self.amp
    }

    pub fn settings(&self) -> &AnalyticsSettings {
        &self.settings
    }

    pub fn fire(&self, name: &str, params: Value) -> AnalyticsResult<()> {
        self.events.fire(name, params)
    }

    pub fn fire_payload(&self, name: &str, payload: EventPayload) -> AnalyticsResult<()> {
        self.events.fire_payload(name, payload)
    }

    pub fn on<F>(&self, name: &str, handler: F) -> AnalyticsResult<ListenerId>
    where
        F: Fn(&EventPayload) + Send + Sync + 'static,
    {
        self.events.on(name, handler)
    }

    pub fn once<F>(&self, name: &str, handler: F) -> AnalyticsResult<ListenerId>
    where
        F: Fn(&EventPayload) + Send + Sync + 'static,
    {
        self.events.once(name, handler)
    }

    pub fn remove_listener(&self, name: &str, id: ListenerId) -> AnalyticsResult<bool> {
        self.events.remove_listener(name, id)
    }

    pub fn register_target(&self, target: AmpTarget) {
        self.amp.register_target(target);
    }

    pub fn allocate_selector(&self) -> AmpSelector {
        self.amp.allocate_selector()
    }

    pub fn register_tag_builder<F>(&self, builder: F)
    where
        F: Fn(&TrackedTargets) -> String + Send + Sync + 'static,
    {
        self.amp.register_tag_builder(builder);
    }

    /// Renders the `<amp-analytics>` markup for everything registered during this render.
    pub fn compile(&self) -> String {
        self.amp.compile()
    }

    /// Starts live delivery and replays queued events, unless consent was refused during
    /// [`initialize`](Self::initialize).
    pub fn activate(&self) {
        self.events.activate();
    }

    pub fn is_activated(&self) -> bool {
        self.events.is_activated()
    }

    /// Whether consent was refused. Once set it stays set for the lifetime of this value.
    pub fn is_disabled(&self) -> bool {
        self.events.is_disabled()
    }

    /// Opt-out check for a request's `Cookie` header, using the configured
    /// `disable_cookie_name`.
    pub fn cookie_consent(&self, cookie_header: &str) -> CookieConsent {
        CookieConsent::from_settings(&self.settings, cookie_header)
    }

    /// Waits for `signal` when `delay_until_interactive` is set (at most once per instance),
    /// then activates unless `consent` reports an opt-out.
    ///
    /// Call this only after every listener has been registered; events fired before it are
    /// queued and replayed once it activates.
    pub async fn initialize(
        &self,
        delay_until_interactive: bool,
        signal: &dyn InteractiveSignal,
        consent: &dyn ConsentCheck,
    ) {
        if delay_until_interactive {
            self.interactive.get_or_init(|| signal.wait()).await;
        }

        if consent.is_disabled() {
            self.events.disable();
            log::info!(
                "Skipping analytics because a {}=true cookie is present.",
                self.settings.disable_cookie_name
            );
            return;
        }

        self.activate();
    }

    /// Clears activation, the pending queue, AMP targets and builders, and restarts selector
    /// ids at 0. Listeners and the consent decision are kept.
    pub fn reset(&self) {
        self.events.reset();
        self.amp.reset();
    }
}

#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
fn default_navigation() -> Arc<dyn NavigationSource> {
    Arc::new(crate::analytics::context::BrowserNavigation)
}

#[cfg(not(all(feature = "wasm-web", target_arch = "wasm32")))]
fn default_navigation() -> Arc<dyn NavigationSource> {
    Arc::new(crate::analytics::context::StaticNavigation::default())
}

static SHARED_ANALYTICS: LazyLock<Arc<Analytics>> = LazyLock::new(|| {
    let settings = AnalyticsSettings::from_env().unwrap_or_else(|err| {
        log::warn!("ignoring analytics settings from the environment: {err}");
        AnalyticsSettings::default()
    });
    Arc::new(Analytics::with_settings(settings, default_navigation()))
});

/// Returns the process-wide analytics instance, created on first use with settings from
/// `STOREFRONT_ANALYTICS_CONFIG`.
pub fn get_analytics() -> Arc<Analytics> {
    SHARED_ANALYTICS.clone()
}
