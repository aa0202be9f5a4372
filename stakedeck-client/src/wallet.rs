//! Wallet subsystem seam.
//!
//! The wallet lives outside this crate; session code reaches it only through
//! this trait. The direction is one-way: wallet implementations must not call
//! back into session internals, they receive a disconnect request and act on
//! their own state.

use async_trait::async_trait;

/// Wallet connectivity contract consumed by the bootstrap sequence and the
/// access-grant flow.
#[async_trait]
pub trait WalletLink: Send + Sync {
    /// Register the wallet's event listeners. Fire-and-forget.
    fn subscribe_events(&self);

    /// Bring the wallet connection up. Bootstrap awaits this; failure is
    /// fatal to startup.
    ///
    /// # Errors
    /// Returns the underlying connection failure.
    async fn initialize(&self) -> anyhow::Result<()>;

    /// Tear the wallet connection down. Called when a session loses its
    /// access grant so no connected wallet outlives the trust it was given.
    ///
    /// # Errors
    /// Returns the underlying teardown failure.
    async fn disconnect(&self) -> anyhow::Result<()>;
}
