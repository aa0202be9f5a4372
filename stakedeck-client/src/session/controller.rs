//! Session controller: sequences state transitions with identity-service
//! calls and persistence, enforcing "persist iff the remote call succeeded".

use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{instrument, warn};

use shared::models::{
    AccessGrantRequest, AuthSession, Credentials, LogoutRequest, ProfileUpdate,
    ResetPasswordRequest, SignupRequest, TokenPair, UserProfile, VerifyAuthRequest,
};

use crate::api::IdentityApi;
use crate::error::IdentityError;
use crate::session::state::SessionState;
use crate::store::{SessionStore, USER_DATA_KEY};
use crate::wallet::WalletLink;

/// Owner of [`SessionState`] and the only writer of the `"userData"` store
/// key.
///
/// Operations interleave freely on the runtime. Consistency of the
/// profile/token fields is structural: each operation's success branch
/// writes only the fields its own response supplies, while `loading` and
/// `error` are last-writer-wins.
pub struct SessionController<A, S> {
    api: A,
    store: S,
    wallet: Arc<dyn WalletLink>,
    state: RwLock<SessionState>,
}

impl<A, S> std::fmt::Debug for SessionController<A, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController").finish_non_exhaustive()
    }
}

impl<A, S> SessionController<A, S>
where
    A: IdentityApi,
    S: SessionStore,
{
    /// Create a controller over its three collaborators. State starts empty
    /// with `loading = true` until the first [`rehydrate`](Self::rehydrate)
    /// settles.
    pub fn new(api: A, store: S, wallet: Arc<dyn WalletLink>) -> Self {
        Self {
            api,
            store,
            wallet,
            state: RwLock::new(SessionState::default()),
        }
    }

    /// Clone of the current session state.
    pub fn snapshot(&self) -> SessionState {
        self.read_state(Clone::clone)
    }

    /// Whether a session-mutating operation is outstanding.
    pub fn is_loading(&self) -> bool {
        self.read_state(|state| state.loading)
    }

    /// Flip the profile's access grant without a profile refresh; entry
    /// point for external grant flows (e.g. the wallet subsystem).
    pub fn set_access_allowed(&self, allow: bool) {
        self.with_state(|state| state.set_access_allowed(allow));
    }

    /// Rebuild session state from the persistence store.
    ///
    /// Absence of a persisted session is not an error; a corrupt value is
    /// logged and treated as absence. Idempotent. Must settle before any
    /// authenticated call is attempted.
    // Async for parity with the other session operations; the store itself
    // is synchronous.
    #[allow(clippy::unused_async)]
    pub async fn rehydrate(&self) {
        self.with_state(|state| state.set_loading(true));
        if let Some(raw) = self.store.get(USER_DATA_KEY) {
            match serde_json::from_str::<AuthSession>(&raw) {
                Ok(session) => self.with_state(|state| {
                    state.set_user(session.user);
                    state.set_tokens(session.tokens);
                }),
                Err(err) => warn!(error = %err, "ignoring corrupt persisted session"),
            }
        }
        self.with_state(|state| state.set_loading(false));
    }

    /// Create an account and install the issued session.
    #[instrument(skip_all)]
    pub async fn register(&self, signup: SignupRequest) {
        self.run_guarded(self.api.register(&signup), |session| {
            self.install_session(session);
        })
        .await;
    }

    /// Authenticate with credentials and install the issued session.
    #[instrument(skip_all)]
    pub async fn sign_in(&self, credentials: Credentials) {
        self.run_guarded(self.api.login(&credentials), |session| {
            self.install_session(session);
        })
        .await;
    }

    /// Terminate the session. Persistence-first: the durable copy is removed
    /// before the remote call, the remote failure is logged and swallowed,
    /// and the in-memory reset happens unconditionally.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) {
        let refresh_token = self.refresh_token();
        self.store.remove(USER_DATA_KEY);

        let request = LogoutRequest { refresh_token };
        if let Err(err) = self.api.logout(&request).await {
            warn!(error = %err, "remote logout failed; local session already cleared");
        }

        self.with_state(|state| {
            state.set_user(UserProfile::default());
            state.set_tokens(TokenPair::default());
        });
    }

    /// Push profile changes; on success the returned profile replaces the
    /// current one and is re-persisted alongside the current tokens.
    #[instrument(skip_all)]
    pub async fn update_profile(&self, patch: ProfileUpdate) {
        let bearer = self.refresh_token();
        match self.api.update_profile(&patch, &bearer).await {
            Ok(user) => self.install_profile(user),
            Err(err) => self.record_error(&err),
        }
    }

    /// Change the account password. No local state changes on success.
    #[instrument(skip_all)]
    pub async fn reset_password(&self, request: ResetPasswordRequest) {
        let bearer = self.refresh_token();
        if let Err(err) = self.api.reset_password(&request, &bearer).await {
            self.record_error(&err);
        }
    }

    /// Confirm an email address. The bearer is the one-time token from the
    /// verification link, independent of the active session's credentials.
    #[instrument(skip_all)]
    pub async fn approve_email(&self, token: &str) {
        match self.api.approve_email(token).await {
            Ok(user) => self.install_profile(user),
            Err(err) => self.record_error(&err),
        }
    }

    /// Ask the service to resend the verification email. Returns whether the
    /// request was accepted; a failure also records the error.
    #[instrument(skip(self))]
    pub async fn resend_verification_email(&self) -> bool {
        let bearer = self.refresh_token();
        match self.api.send_verification_email(&bearer).await {
            Ok(()) => true,
            Err(err) => {
                self.record_error(&err);
                false
            }
        }
    }

    /// Request a platform access grant for the signed-in account. A session
    /// that fails to obtain the grant must not leave a connected wallet
    /// behind, so any failure disconnects the wallet before the error is
    /// recorded. No-op while signed out.
    #[instrument(skip(self))]
    pub async fn approve_access(&self, method: &str) {
        let (staking_address, bearer) =
            self.read_state(|state| (state.user.id.clone(), state.tokens.refresh.token.clone()));
        if staking_address.is_empty() {
            return;
        }

        let request = AccessGrantRequest {
            method: method.to_string(),
            staking_address,
        };
        match self.api.provide_access(&request, &bearer).await {
            Ok(user) => self.install_profile(user),
            Err(err) => {
                if let Err(disconnect_err) = self.wallet.disconnect().await {
                    warn!(error = %disconnect_err, "wallet disconnect after failed access grant also failed");
                }
                self.record_error(&err);
            }
        }
    }

    /// Fetch step-up enrollment data for the caller. Background probe: a
    /// failure is logged and yields `None` without touching session state.
    #[instrument(skip(self))]
    pub async fn auth_token(&self) -> Option<serde_json::Value> {
        let bearer = self.refresh_token();
        match self.api.auth_token(&bearer).await {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(error = %err, "auth token probe failed");
                None
            }
        }
    }

    /// Submit a step-up verification code; on success the session and the
    /// account flags flip together and the session is re-persisted.
    #[instrument(skip_all)]
    pub async fn verify_auth_token(&self, secret: &str) {
        let bearer = self.refresh_token();
        let request = VerifyAuthRequest {
            secret: secret.to_string(),
        };
        self.run_guarded(self.api.verify_auth_token(&request, &bearer), |()| {
            self.set_verification(true);
        })
        .await;
    }

    /// Disable step-up verification; mirror of
    /// [`verify_auth_token`](Self::verify_auth_token).
    #[instrument(skip(self))]
    pub async fn disable_auth(&self) {
        let bearer = self.refresh_token();
        self.run_guarded(self.api.disable_auth(&bearer), |()| {
            self.set_verification(false);
        })
        .await;
    }

    /// Preamble, error classification, and postamble for the operations that
    /// own the `loading` flag for their whole duration.
    async fn run_guarded<T, Fut>(&self, task: Fut, on_success: impl FnOnce(T))
    where
        Fut: Future<Output = Result<T, IdentityError>>,
    {
        self.with_state(|state| {
            state.set_loading(true);
            state.set_error(None);
        });
        match task.await {
            Ok(value) => on_success(value),
            Err(err) => self.record_error(&err),
        }
        self.with_state(|state| state.set_loading(false));
    }

    /// Persist and apply a freshly issued `{ user, tokens }` pair.
    fn install_session(&self, session: AuthSession) {
        self.persist(&session);
        self.with_state(|state| {
            state.set_user(session.user);
            state.set_tokens(session.tokens);
        });
    }

    /// Persist and apply a profile refresh, keeping the current tokens.
    fn install_profile(&self, user: UserProfile) {
        let tokens = self.read_state(|state| state.tokens.clone());
        self.persist(&AuthSession {
            user: user.clone(),
            tokens,
        });
        self.with_state(|state| state.set_user(user));
    }

    /// Flip both verification flags in one state write and re-persist the
    /// resulting session with its current tokens.
    fn set_verification(&self, verified: bool) {
        let session = self.with_state(|state| {
            state.apply_verification(verified);
            AuthSession {
                user: state.user.clone(),
                tokens: state.tokens.clone(),
            }
        });
        self.persist(&session);
    }

    fn persist(&self, session: &AuthSession) {
        match serde_json::to_string(session) {
            Ok(raw) => self.store.set(USER_DATA_KEY, &raw),
            Err(err) => warn!(error = %err, "failed to serialize session for persistence"),
        }
    }

    fn record_error(&self, err: &IdentityError) {
        warn!(error = %err, "session operation failed");
        self.with_state(|state| state.set_error(Some(err.to_string())));
    }

    fn refresh_token(&self) -> String {
        self.read_state(|state| state.tokens.refresh.token.clone())
    }

    fn read_state<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        let guard = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}
