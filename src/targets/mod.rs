#![doc = include_str!("README.md")]

use std::sync::Arc;

use crate::analytics::error::AnalyticsResult;
use crate::analytics::{Analytics, ListenerId, RenderMode};

mod google_analytics;
mod google_tag_manager;
mod window;

#[doc(inline)]
pub use google_analytics::{GaHandler, GaHit, GoogleAnalytics};
#[doc(inline)]
pub use google_tag_manager::{GoogleTagManager, GtmHandler};
#[doc(inline)]
pub use window::{BufferedWindow, WindowBridge, WindowCommand};

#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
#[doc(inline)]
pub use window::BrowserWindow;

/// A vendor integration that reacts to analytics events.
pub trait AnalyticsTarget: Send + Sync {
    /// Subscribes the integration's handlers for a standard render.
    fn attach(
        &self,
        analytics: &Analytics,
        window: Arc<dyn WindowBridge>,
    ) -> AnalyticsResult<Vec<ListenerId>>;

    /// Registers the integration's AMP tag builder. Returns `false` when it renders nothing on
    /// AMP pages.
    fn register_amp(&self, analytics: &Analytics) -> bool;

    /// Loader snippet for the document head of standard renders.
    fn head_script(&self) -> Option<String>;

    /// Wires the integration for the given render mode.
    fn mount(
        &self,
        analytics: &Analytics,
        mode: RenderMode,
        window: Arc<dyn WindowBridge>,
    ) -> AnalyticsResult<Vec<ListenerId>> {
        if mode.is_amp() {
            self.register_amp(analytics);
            Ok(Vec::new())
        } else {
            self.attach(analytics, window)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::StaticNavigation;
    use serde_json::json;

    #[test]
    fn mount_picks_surface_by_mode() {
        let analytics = Analytics::new(Arc::new(StaticNavigation::default()));
        let window = Arc::new(BufferedWindow::new());
        let ga = GoogleAnalytics::new("UA-1").handler("pageview", |_| GaHit::pageview());

        let ids = ga.mount(&analytics, RenderMode::Amp, window.clone()).unwrap();
        assert!(ids.is_empty());
        assert_eq!(analytics.amp().builder_count(), 1);
        assert_eq!(analytics.events().listener_count("pageview").unwrap(), 0);

        let ids = ga
            .mount(&analytics, RenderMode::Standard, window.clone())
            .unwrap();
        assert_eq!(ids.len(), 1);
        analytics.activate();
        analytics.fire("pageview", json!({})).unwrap();
        assert_eq!(window.commands().len(), 2);
    }
}
