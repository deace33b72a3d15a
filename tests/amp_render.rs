#![cfg(not(target_arch = "wasm32"))]

use std::sync::Arc;

use serde_json::json;
use storefront_analytics::analytics::{
    AlwaysEnabled, Analytics, AnalyticsProvider, Immediate, RenderMode, StaticNavigation,
};
use storefront_analytics::targets::{
    AnalyticsTarget, BufferedWindow, GaHit, GoogleAnalytics, GoogleTagManager,
};
use storefront_analytics::track::{Track, TrackBinding, TrackPageView, Trigger};

fn mount_vendors(analytics: &Analytics, mode: RenderMode) {
    let window = Arc::new(BufferedWindow::new());
    GoogleAnalytics::new("trackingId")
        .handler("pageview", |_| GaHit::pageview())
        .handler("event-name", |payload| {
            GaHit::event().field("productId", payload.event_params["product"]["id"].clone())
        })
        .mount(analytics, mode, window.clone())
        .unwrap();
    GoogleTagManager::new()
        .with_amp_container_id("ampContainerId")
        .mount(analytics, mode, window)
        .unwrap();
}

fn render_product_page(analytics: &Arc<Analytics>, mode: RenderMode) -> Option<String> {
    let binding = Track::new("event-name")
        .param("product", json!({"id": 1}))
        .bind(analytics, mode)
        .unwrap();
    TrackPageView::new().record(analytics, mode).unwrap();
    match binding {
        TrackBinding::Amp(selector) => Some(format!(
            "<a {}=\"{}\">Product</a>",
            selector.attribute(),
            selector.id()
        )),
        _ => None,
    }
}

#[tokio::test(flavor = "current_thread")]
async fn amp_render_emits_vendor_markup() {
    let analytics = Arc::new(Analytics::new(Arc::new(StaticNavigation::default())));
    let provider = AnalyticsProvider::new(analytics.clone(), RenderMode::Amp);
    mount_vendors(&analytics, provider.mode());

    let link = render_product_page(&analytics, provider.mode()).unwrap();
    provider.start(&Immediate, &AlwaysEnabled).await;

    assert_eq!(link, "<a data-amp-id=\"0\">Product</a>");
    assert_eq!(
        analytics.compile(),
        [
            r#"<amp-analytics type="googleanalytics"><script type="application/json">{"vars":{"account":"trackingId"},"triggers":[{"on":"click","request":"event","vars":{"productId":1},"selector":"[data-amp-id=\"0\"]"},{"on":"visible","request":"pageview"}]}</script></amp-analytics>"#,
            r#"<amp-analytics config="https://www.googletagmanager.com/amp.json?id=ampContainerId&gtm.url=SOURCE_URL" data-credentials="include"></amp-analytics>"#,
        ]
        .join("\n")
    );
    assert!(!analytics.is_activated());
    assert_eq!(analytics.events().pending_len(), 0);
}

#[test]
fn each_amp_render_starts_fresh() {
    let analytics = Arc::new(Analytics::new(Arc::new(StaticNavigation::default())));

    for _ in 0..2 {
        let provider = AnalyticsProvider::new(analytics.clone(), RenderMode::Amp);
        mount_vendors(&analytics, provider.mode());
        let link = render_product_page(&analytics, provider.mode()).unwrap();
        assert_eq!(link, "<a data-amp-id=\"0\">Product</a>");
        assert_eq!(analytics.amp().targets().len(), 2);
        assert_eq!(analytics.compile().lines().count(), 2);
    }
}

#[test]
fn elements_without_click_events_are_left_alone() {
    let analytics = Arc::new(Analytics::new(Arc::new(StaticNavigation::default())));
    let binding = Track::new(Trigger::multi([("onFocus", "focused")]))
        .bind(&analytics, RenderMode::Amp)
        .unwrap();

    assert!(matches!(binding, TrackBinding::Passthrough));
    assert!(analytics.amp().targets().is_empty());
}
