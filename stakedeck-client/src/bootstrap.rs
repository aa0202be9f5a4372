//! Application bootstrap.
//!
//! Startup fans out the subordinate subsystems (market feeds, wallet event
//! subscription, session rehydration) without waiting for them, then awaits
//! wallet initialization alone before declaring the application ready.

use std::sync::Arc;

use anyhow::Context;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use crate::api::IdentityApi;
use crate::feeds::FeedSource;
use crate::session::controller::SessionController;
use crate::store::SessionStore;
use crate::wallet::WalletLink;

/// Startup progression. `Ready` is only entered once wallet initialization
/// has resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppPhase {
    /// Bootstrap has not been started.
    NotStarted,
    /// Subsystems are being brought up.
    Bootstrapping,
    /// The application is usable.
    Ready,
}

/// Startup orchestrator; owns the "app is loading" readiness signal.
pub struct Bootstrapper<A, S> {
    controller: Arc<SessionController<A, S>>,
    wallet: Arc<dyn WalletLink>,
    price_feed: Arc<dyn FeedSource>,
    gas_feed: Arc<dyn FeedSource>,
    phase: watch::Sender<AppPhase>,
}

impl<A, S> std::fmt::Debug for Bootstrapper<A, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bootstrapper")
            .field("phase", &*self.phase.borrow())
            .finish_non_exhaustive()
    }
}

impl<A, S> Bootstrapper<A, S>
where
    A: IdentityApi + 'static,
    S: SessionStore + 'static,
{
    /// Create an orchestrator in the `NotStarted` phase.
    pub fn new(
        controller: Arc<SessionController<A, S>>,
        wallet: Arc<dyn WalletLink>,
        price_feed: Arc<dyn FeedSource>,
        gas_feed: Arc<dyn FeedSource>,
    ) -> Self {
        let (phase, _) = watch::channel(AppPhase::NotStarted);
        Self {
            controller,
            wallet,
            price_feed,
            gas_feed,
            phase,
        }
    }

    /// Current startup phase.
    pub fn phase(&self) -> AppPhase {
        *self.phase.borrow()
    }

    /// Whether the application is still starting up.
    pub fn is_loading(&self) -> bool {
        self.phase() != AppPhase::Ready
    }

    /// Receiver for phase changes; the application-wide readiness signal.
    pub fn watch_phase(&self) -> watch::Receiver<AppPhase> {
        self.phase.subscribe()
    }

    /// Run the startup sequence once, at application start.
    ///
    /// Feed refreshes and session rehydration are fire-and-forget: their
    /// failures are logged and never block readiness. Only wallet
    /// initialization is awaited.
    ///
    /// # Errors
    /// Returns the wallet initialization failure; the phase then stays at
    /// `Bootstrapping` and the application never becomes ready.
    #[instrument(skip(self))]
    pub async fn run(&self) -> anyhow::Result<()> {
        self.phase.send_replace(AppPhase::Bootstrapping);

        spawn_feed_refresh(Arc::clone(&self.price_feed));
        spawn_feed_refresh(Arc::clone(&self.gas_feed));
        self.wallet.subscribe_events();

        let controller = Arc::clone(&self.controller);
        tokio::spawn(async move {
            controller.rehydrate().await;
        });

        self.wallet
            .initialize()
            .await
            .context("wallet initialization failed")?;

        self.phase.send_replace(AppPhase::Ready);
        info!("application bootstrap complete");
        Ok(())
    }
}

fn spawn_feed_refresh(feed: Arc<dyn FeedSource>) {
    tokio::spawn(async move {
        if let Err(err) = feed.refresh().await {
            warn!(feed = feed.name(), error = %err, "feed refresh failed");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::IdentityClient;
    use crate::store::{MemoryStore, USER_DATA_KEY};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// Wallet whose `initialize` blocks until released, or fails on demand.
    struct GatedWallet {
        release: Notify,
        fail: AtomicBool,
        subscribed: AtomicUsize,
    }

    impl GatedWallet {
        fn new(fail: bool) -> Self {
            Self {
                release: Notify::new(),
                fail: AtomicBool::new(fail),
                subscribed: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl WalletLink for GatedWallet {
        fn subscribe_events(&self) {
            self.subscribed.fetch_add(1, Ordering::SeqCst);
        }

        async fn initialize(&self) -> anyhow::Result<()> {
            self.release.notified().await;
            if self.fail.load(Ordering::SeqCst) {
                anyhow::bail!("wallet backend unavailable");
            }
            Ok(())
        }

        async fn disconnect(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    /// Feed that either records a refresh or fails.
    struct TestFeed {
        fail: bool,
        refreshed: AtomicUsize,
    }

    impl TestFeed {
        fn new(fail: bool) -> Self {
            Self {
                fail,
                refreshed: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl FeedSource for TestFeed {
        fn name(&self) -> &str {
            "test-feed"
        }

        async fn refresh(&self) -> anyhow::Result<()> {
            self.refreshed.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                anyhow::bail!("feed endpoint down");
            }
            Ok(())
        }
    }

    // No identity calls happen during bootstrap; an unroutable client keeps
    // the type real without touching the network.
    fn offline_controller(
        store: MemoryStore,
        wallet: Arc<dyn WalletLink>,
    ) -> Arc<SessionController<IdentityClient, MemoryStore>> {
        Arc::new(SessionController::new(
            IdentityClient::new("http://127.0.0.1:9"),
            store,
            wallet,
        ))
    }

    fn bootstrapper(
        wallet: Arc<GatedWallet>,
        price_fail: bool,
        store: MemoryStore,
    ) -> Arc<Bootstrapper<IdentityClient, MemoryStore>> {
        let wallet_link: Arc<dyn WalletLink> = wallet;
        Arc::new(Bootstrapper::new(
            offline_controller(store, Arc::clone(&wallet_link)),
            wallet_link,
            Arc::new(TestFeed::new(price_fail)),
            Arc::new(TestFeed::new(false)),
        ))
    }

    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_ready_only_after_wallet_initializes() {
        let wallet = Arc::new(GatedWallet::new(false));
        let boot = bootstrapper(Arc::clone(&wallet), false, MemoryStore::new());
        assert_eq!(boot.phase(), AppPhase::NotStarted);

        let run = tokio::spawn({
            let boot = Arc::clone(&boot);
            async move { boot.run().await }
        });
        settle().await;
        assert_eq!(boot.phase(), AppPhase::Bootstrapping);
        assert!(boot.is_loading());

        wallet.release.notify_one();
        run.await.unwrap().unwrap();
        assert_eq!(boot.phase(), AppPhase::Ready);
        assert!(!boot.is_loading());
        assert_eq!(wallet.subscribed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_feed_does_not_block_readiness() {
        let wallet = Arc::new(GatedWallet::new(false));
        let boot = bootstrapper(Arc::clone(&wallet), true, MemoryStore::new());

        let run = tokio::spawn({
            let boot = Arc::clone(&boot);
            async move { boot.run().await }
        });
        settle().await;
        wallet.release.notify_one();
        run.await.unwrap().unwrap();
        assert_eq!(boot.phase(), AppPhase::Ready);
    }

    #[tokio::test]
    async fn test_wallet_failure_is_fatal_and_keeps_phase() {
        let wallet = Arc::new(GatedWallet::new(true));
        let boot = bootstrapper(Arc::clone(&wallet), false, MemoryStore::new());

        let run = tokio::spawn({
            let boot = Arc::clone(&boot);
            async move { boot.run().await }
        });
        settle().await;
        wallet.release.notify_one();
        let result = run.await.unwrap();
        assert!(result.is_err());
        assert_eq!(boot.phase(), AppPhase::Bootstrapping);
        assert!(boot.is_loading());
    }

    #[tokio::test]
    async fn test_rehydration_runs_during_bootstrap() {
        let store = MemoryStore::new();
        store.set(
            USER_DATA_KEY,
            r#"{"user":{"id":"u1"},"tokens":{"refresh":{"token":"R"}}}"#,
        );
        let wallet = Arc::new(GatedWallet::new(false));
        let boot = bootstrapper(Arc::clone(&wallet), false, store);

        let run = tokio::spawn({
            let boot = Arc::clone(&boot);
            async move { boot.run().await }
        });
        settle().await;
        wallet.release.notify_one();
        run.await.unwrap().unwrap();
        settle().await;

        let state = boot.controller.snapshot();
        assert_eq!(state.user.id, "u1");
        assert_eq!(state.tokens.refresh.token, "R");
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn test_watch_phase_observes_transitions() {
        let wallet = Arc::new(GatedWallet::new(false));
        let boot = bootstrapper(Arc::clone(&wallet), false, MemoryStore::new());
        let mut phases = boot.watch_phase();
        assert_eq!(*phases.borrow(), AppPhase::NotStarted);

        let run = tokio::spawn({
            let boot = Arc::clone(&boot);
            async move { boot.run().await }
        });
        phases.changed().await.unwrap();
        assert_eq!(*phases.borrow(), AppPhase::Bootstrapping);

        wallet.release.notify_one();
        phases.changed().await.unwrap();
        assert_eq!(*phases.borrow(), AppPhase::Ready);
        run.await.unwrap().unwrap();
    }
}
