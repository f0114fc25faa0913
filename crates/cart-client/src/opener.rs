//! Redirect targets for a successful checkout.

use tracing::info;

/// Hands the hosted checkout URL to whatever navigates the customer there
pub trait UrlOpener: Send + Sync {
    fn open(&self, url: &str);
}

/// Logs the URL; for headless callers that navigate on their own
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingOpener;

impl UrlOpener for LoggingOpener {
    fn open(&self, url: &str) {
        info!("Checkout ready at {}", url);
    }
}
