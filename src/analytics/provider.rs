use std::sync::Arc;

use crate::analytics::api::Analytics;
use crate::analytics::consent::ConsentCheck;
use crate::analytics::interactive::InteractiveSignal;
use crate::platform::runtime;

/// How the current page is being rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RenderMode {
    /// Regular page: interactions are reported through live listeners.
    #[default]
    Standard,
    /// AMP page: interactions are declared as `<amp-analytics>` triggers.
    Amp,
}

impl RenderMode {
    pub fn is_amp(self) -> bool {
        matches!(self, RenderMode::Amp)
    }
}

/// Scopes one page render to an [`Analytics`] instance.
///
/// Usage is two-phase: build the provider, let vendor integrations and views register their
/// listeners, targets and tag builders, then call [`start`](Self::start).
#[derive(Clone, Debug)]
pub struct AnalyticsProvider {
    analytics: Arc<Analytics>,
    mode: RenderMode,
}

impl AnalyticsProvider {
    /// AMP renders start from a clean slate, so state left over from a previous render is reset.
    pub fn new(analytics: Arc<Analytics>, mode: RenderMode) -> Self {
        if mode.is_amp() {
            analytics.reset();
        }
        Self { analytics, mode }
    }

    pub fn analytics(&self) -> &Arc<Analytics> {
        &self.analytics
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Initializes analytics using the instance's `delay_until_interactive` setting.
    ///
    /// AMP pages never activate: they run no client code of their own.
    pub async fn start(&self, signal: &dyn InteractiveSignal, consent: &dyn ConsentCheck) {
        if self.mode.is_amp() {
            log::debug!("amp render; analytics activation skipped");
            return;
        }
        let delay = self.analytics.settings().delay_until_interactive;
        self.analytics.initialize(delay, signal, consent).await;
    }

    /// Like [`start`](Self::start), but runs in the background.
    pub fn start_detached(
        &self,
        signal: Arc<dyn InteractiveSignal>,
        consent: Arc<dyn ConsentCheck>,
    ) {
        let provider = self.clone();
        runtime::spawn_detached(async move {
            provider.start(signal.as_ref(), consent.as_ref()).await;
        });
    }
}
