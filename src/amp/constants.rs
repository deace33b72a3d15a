pub const DEFAULT_SELECTOR_ATTRIBUTE: &str = "data-amp-id";
