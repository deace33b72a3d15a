#![doc = include_str!("README.md")]
mod api;
mod broadcaster;
mod consent;
mod constants;
mod context;
pub mod error;
mod interactive;
mod provider;
mod settings;

#[doc(inline)]
pub use api::{get_analytics, Analytics};

#[doc(inline)]
pub use broadcaster::{EventBroadcaster, EventHandler, ListenerId};

#[doc(inline)]
pub use consent::{AlwaysEnabled, ConsentCheck, CookieConsent};

#[doc(inline)]
pub use constants::{DEFAULT_DISABLE_COOKIE, PAGEVIEW_EVENT, SETTINGS_ENV_VAR};

#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
#[doc(inline)]
pub use context::BrowserNavigation;

#[doc(inline)]
pub use context::{EventContext, EventPayload, NavigationSource, StaticNavigation};

#[doc(inline)]
pub use error::{AnalyticsError, AnalyticsErrorCode, AnalyticsResult};

#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
#[doc(inline)]
pub use interactive::DocumentInteractive;

#[doc(inline)]
pub use interactive::{Delay, Immediate, InteractiveSignal};

#[doc(inline)]
pub use provider::{AnalyticsProvider, RenderMode};

#[doc(inline)]
pub use settings::AnalyticsSettings;
