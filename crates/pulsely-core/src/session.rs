// ── Session: the auth adapter ──
//
// Wraps the identity provider's session primitives and augments them
// with the server's notion of the current user. Created once at
// application start, torn down by logout, and injected into every feed
// — there is no ambient global.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::{Mutex, watch};
use tracing::{debug, warn};
use url::Url;

use pulsely_api::types::{ProviderProfile, User};
use pulsely_api::{ApiClient, IdentityProvider, TokenSet};

use crate::error::CoreError;

/// The signed-in (or anonymous) session.
///
/// Cheaply cloneable via `Arc`; all clones observe the same state.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    provider: IdentityProvider,
    api: ApiClient,
    /// Current token material. `None` while anonymous.
    tokens: Mutex<Option<TokenSet>>,
    authenticated: watch::Sender<bool>,
    /// True while the post-sign-in identity fetch is in flight; folded
    /// into [`Session::is_loading`].
    identity_loading: watch::Sender<bool>,
    current_user: watch::Sender<Option<User>>,
    profile: watch::Sender<Option<ProviderProfile>>,
}

impl Session {
    /// Create an anonymous session over the given provider and API
    /// client. Call [`complete_login`](Self::complete_login) or
    /// [`restore`](Self::restore) to sign in.
    pub fn new(provider: IdentityProvider, api: ApiClient) -> Self {
        let (authenticated, _) = watch::channel(false);
        let (identity_loading, _) = watch::channel(false);
        let (current_user, _) = watch::channel(None);
        let (profile, _) = watch::channel(None);

        Self {
            inner: Arc::new(SessionInner {
                provider,
                api,
                tokens: Mutex::new(None),
                authenticated,
                identity_loading,
                current_user,
                profile,
            }),
        }
    }

    /// The API client this session was built with. Feeds share it so a
    /// single connection pool serves the whole process.
    pub fn api_client(&self) -> ApiClient {
        self.inner.api.clone()
    }

    // ── Observable state ─────────────────────────────────────────────

    pub fn is_authenticated(&self) -> bool {
        *self.inner.authenticated.borrow()
    }

    /// True while the session is still resolving who the user is.
    pub fn is_loading(&self) -> bool {
        *self.inner.identity_loading.borrow()
    }

    /// Subscribe to authenticated-flag transitions (used by feeds to
    /// refetch after sign-in).
    pub fn subscribe_authenticated(&self) -> watch::Receiver<bool> {
        self.inner.authenticated.subscribe()
    }

    /// The server-confirmed user, once the post-sign-in fetch lands.
    pub fn current_user(&self) -> Option<User> {
        self.inner.current_user.borrow().clone()
    }

    /// Profile claims from the identity provider.
    pub fn profile(&self) -> Option<ProviderProfile> {
        self.inner.profile.borrow().clone()
    }

    // ── Sign-in ──────────────────────────────────────────────────────

    /// The hosted login page to send the user to. The provider redirects
    /// back to `redirect_uri` with an authorization code and the echoed
    /// `state`.
    pub fn login_url(&self, redirect_uri: &str, state: &str) -> Result<Url, CoreError> {
        Ok(self.inner.provider.authorize_url(redirect_uri, state)?)
    }

    /// Finish the redirect flow: exchange the authorization code and
    /// install the resulting tokens.
    pub async fn complete_login(&self, code: &str, redirect_uri: &str) -> Result<(), CoreError> {
        let tokens = self.inner.provider.exchange_code(code, redirect_uri).await?;
        self.install_tokens(tokens).await;
        Ok(())
    }

    /// Silent sign-in from a stored refresh token (the cached-session
    /// path used at startup).
    pub async fn restore(&self, refresh_token: SecretString) -> Result<(), CoreError> {
        let mut tokens = self.inner.provider.refresh(&refresh_token).await?;
        // Providers may omit the refresh token on rotation-less grants;
        // keep the one we signed in with.
        if tokens.refresh_token.is_none() {
            tokens.refresh_token = Some(refresh_token);
        }
        self.install_tokens(tokens).await;
        Ok(())
    }

    /// Install an externally obtained token set and run the sign-in
    /// side effects: one `GET /me` and one provider `userinfo` call.
    /// [`is_loading`](Self::is_loading) is true while those are in
    /// flight, even though the provider itself has finished.
    pub async fn install_tokens(&self, tokens: TokenSet) {
        *self.inner.tokens.lock().await = Some(tokens);
        let _ = self.inner.authenticated.send(true);
        self.sync_identity().await;
    }

    async fn sync_identity(&self) {
        let _ = self.inner.identity_loading.send(true);

        if let Some(token) = self.get_access_token().await {
            match self.inner.api.get_current_user(&token).await {
                Ok(user) => {
                    debug!(user_id = %user.user_id, "resolved current user");
                    let _ = self.inner.current_user.send(Some(user));
                }
                Err(e) => warn!(error = %e, "current-user fetch failed"),
            }

            match self.inner.provider.user_info(&token).await {
                Ok(profile) => {
                    let _ = self.inner.profile.send(Some(profile));
                }
                Err(e) => warn!(error = %e, "userinfo fetch failed"),
            }
        } else {
            warn!("skipping identity sync: no access token");
        }

        let _ = self.inner.identity_loading.send(false);
    }

    // ── Sign-out ─────────────────────────────────────────────────────

    /// The provider's sign-out URL, redirecting back to `return_to`.
    pub fn logout_url(&self, return_to: &str) -> Result<Url, CoreError> {
        Ok(self.inner.provider.logout_url(return_to)?)
    }

    /// Tear the session down: drop token material and identity state.
    pub async fn logout(&self) {
        *self.inner.tokens.lock().await = None;
        let _ = self.inner.current_user.send(None);
        let _ = self.inner.profile.send(None);
        let _ = self.inner.authenticated.send(false);
        debug!("session cleared");
    }

    // ── Tokens ───────────────────────────────────────────────────────

    /// A bearer token for API calls, silently refreshed when the cached
    /// one is about to expire. Returns `None` on any failure — token
    /// trouble is always reported as absence, never as an error.
    pub async fn get_access_token(&self) -> Option<String> {
        let mut guard = self.inner.tokens.lock().await;
        let tokens = guard.as_mut()?;

        if !tokens.expires_soon() {
            return Some(tokens.access_token.expose_secret().to_owned());
        }

        let Some(refresh) = tokens.refresh_token.clone() else {
            warn!("access token expired and no refresh token is available");
            return None;
        };

        match self.inner.provider.refresh(&refresh).await {
            Ok(mut fresh) => {
                if fresh.refresh_token.is_none() {
                    fresh.refresh_token = Some(refresh);
                }
                let access = fresh.access_token.expose_secret().to_owned();
                *tokens = fresh;
                Some(access)
            }
            Err(e) => {
                warn!(error = %e, "silent token refresh failed");
                None
            }
        }
    }

    /// The raw ID token from the last sign-in, or `None`.
    pub async fn get_id_token(&self) -> Option<String> {
        self.inner.tokens.lock().await.as_ref()?.id_token.clone()
    }

    /// The refresh token currently backing this session, if any. The
    /// CLI persists it to the keyring so later invocations can
    /// [`restore`](Self::restore).
    pub async fn refresh_token(&self) -> Option<SecretString> {
        self.inner.tokens.lock().await.as_ref()?.refresh_token.clone()
    }
}
