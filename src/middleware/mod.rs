pub mod auth;
pub mod error_pages;
pub mod metrics;
pub mod security_headers;

pub use error_pages::json_error_pages;
pub use metrics::RequestMetrics;
pub use security_headers::SecurityHeaders;
