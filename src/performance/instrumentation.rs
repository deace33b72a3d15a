#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
mod wasm {
    use wasm_bindgen::JsCast;
    use web_sys::{PerformanceNavigationTiming, PerformanceServerTiming};

    use crate::performance::metrics::ServerTiming;

    /// Reads the `Server-Timing` entries delivered with the page's navigation response.
    pub fn collect_server_timing() -> Vec<ServerTiming> {
        let Some(performance) = web_sys::window().and_then(|window| window.performance()) else {
            return Vec::new();
        };
        let entries = performance.get_entries_by_type("navigation");
        if entries.length() == 0 {
            return Vec::new();
        }
        let Ok(entry) = entries.get(0).dyn_into::<PerformanceNavigationTiming>() else {
            log::debug!("navigation entry cast failed");
            return Vec::new();
        };

        let timings = entry.server_timing();
        (0..timings.length())
            .filter_map(|idx| timings.get(idx).dyn_into::<PerformanceServerTiming>().ok())
            .map(|timing| ServerTiming::new(timing.name(), timing.duration()))
            .collect()
    }
}

#[cfg(all(feature = "wasm-web", target_arch = "wasm32"))]
pub use wasm::collect_server_timing;
