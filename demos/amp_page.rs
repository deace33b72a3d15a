//! Renders the analytics markup of an AMP product page.
//!
//! Run with `cargo run --example amp_page`.

use std::sync::Arc;

use serde_json::json;
use storefront_analytics::analytics::{get_analytics, AnalyticsProvider, RenderMode};
use storefront_analytics::performance::PerformanceMonitoring;
use storefront_analytics::targets::{
    AnalyticsTarget, BufferedWindow, GaHit, GoogleAnalytics, GoogleTagManager,
};
use storefront_analytics::track::{Track, TrackBinding, TrackPageView};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let provider = AnalyticsProvider::new(get_analytics(), RenderMode::Amp);
    let analytics = provider.analytics();
    let window = Arc::new(BufferedWindow::new());

    GoogleAnalytics::new("UA-12345-1")
        .handler("pageview", |_| GaHit::pageview())
        .handler("productClicked", |payload| {
            GaHit::event()
                .field("eventCategory", "product")
                .field("eventLabel", payload.event_params["sku"].clone())
        })
        .mount(analytics, provider.mode(), window.clone())?;
    GoogleTagManager::new()
        .with_amp_container_id("GTM-AMP1")
        .mount(analytics, provider.mode(), window)?;

    TrackPageView::new()
        .param("template", "product")
        .record(analytics, provider.mode())?;

    let mut body = String::new();
    for sku in ["RS-1", "RS-2"] {
        let binding = Track::new("productClicked")
            .param("sku", json!(sku))
            .bind(analytics, provider.mode())?;
        let attribute = match binding {
            TrackBinding::Amp(selector) => {
                format!(" {}=\"{}\"", selector.attribute(), selector.id())
            }
            _ => String::new(),
        };
        body.push_str(&format!("  <a href=\"/p/{sku}\"{attribute}>{sku}</a>\n"));
    }

    let head = PerformanceMonitoring::from_env().render();
    let amp_analytics = analytics.compile();
    println!("<html amp>\n<head>{head}</head>\n<body>\n{body}{amp_analytics}\n</body>\n</html>");
    Ok(())
}
