//! Market-feed seam.
//!
//! Price and gas feeds are opaque asynchronous producers: bootstrap kicks
//! them off and never waits for them, and a failed refresh only ever costs a
//! log line.

use async_trait::async_trait;

/// A refreshable market data feed (token prices, gas prices).
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Short name used in log output.
    fn name(&self) -> &str;

    /// Fetch the feed's latest data into wherever the feed publishes it.
    ///
    /// # Errors
    /// Returns the underlying fetch failure.
    async fn refresh(&self) -> anyhow::Result<()>;
}
