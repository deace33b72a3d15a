/// Custom trace covering client-side route changes.
pub const DEFAULT_NAVIGATION_TRACE_NAME: &str = "client-side-navigation";

/// Standalone Performance Monitoring SDK loaded by the monitoring snippet.
pub const DEFAULT_FIREBASE_SDK_URL: &str =
    "https://www.gstatic.com/firebasejs/7.15.1/firebase-performance-standalone.js";

pub const FIREBASE_LOGGING_ORIGIN: &str = "https://firebaselogging.googleapis.com";

/// Global the monitoring snippet invokes once the SDK has initialized.
pub const METRICS_CALLBACK_GLOBAL: &str = "__rsfFirebaseSendPerformanceMetrics";

pub const MAX_TRACE_NAME_LENGTH: usize = 100;
pub const MAX_METRIC_NAME_LENGTH: usize = 100;
