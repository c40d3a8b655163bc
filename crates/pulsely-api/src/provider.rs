// Identity-provider session primitives.
//
// The provider is an external collaborator with a hosted OIDC surface:
// /authorize (redirect login), /oauth/token (code exchange + refresh),
// /userinfo (profile claims), /v2/logout (sign-out redirect). Nothing
// here caches state; the session layer in pulsely-core owns the tokens.

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use url::Url;

use crate::Error;
use crate::transport::TransportConfig;
use crate::types::ProviderProfile;

/// Scopes requested on login. `offline_access` yields the refresh token
/// that makes silent token retrieval possible.
const SCOPES: &str = "openid profile email offline_access";

/// Identity-provider coordinates (tenant domain, application client id,
/// API audience).
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub domain: String,
    pub client_id: String,
    pub audience: String,
}

// ── Token material ───────────────────────────────────────────────────

/// Raw token-endpoint response.
#[derive(serde::Deserialize)]
struct TokenEndpointResponse {
    access_token: String,
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Error shape the provider returns on token-endpoint failures.
#[derive(serde::Deserialize)]
struct ProviderErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// A bundle of credentials issued by the provider.
#[derive(Debug, Clone)]
pub struct TokenSet {
    pub access_token: SecretString,
    pub id_token: Option<String>,
    pub refresh_token: Option<SecretString>,
    pub expires_at: DateTime<Utc>,
}

impl TokenSet {
    /// Check whether the access token has expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Check whether the access token expires within the next minute.
    /// Used to refresh slightly early instead of racing the deadline.
    pub fn expires_soon(&self) -> bool {
        self.expires_at <= Utc::now() + Duration::seconds(60)
    }
}

impl From<TokenEndpointResponse> for TokenSet {
    fn from(resp: TokenEndpointResponse) -> Self {
        let lifetime = Duration::seconds(resp.expires_in.unwrap_or(0).max(0));
        Self {
            access_token: SecretString::from(resp.access_token),
            id_token: resp.id_token,
            refresh_token: resp.refresh_token.map(SecretString::from),
            expires_at: Utc::now() + lifetime,
        }
    }
}

// ── Provider wrapper ─────────────────────────────────────────────────

/// Thin HTTP wrapper over the hosted identity provider.
#[derive(Clone)]
pub struct IdentityProvider {
    http: reqwest::Client,
    config: ProviderConfig,
}

impl IdentityProvider {
    pub fn new(config: ProviderConfig, transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
            config,
        })
    }

    /// Wrap an existing `reqwest::Client` (tests point the domain at a
    /// mock server).
    pub fn from_reqwest(config: ProviderConfig, http: reqwest::Client) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Resolve a path against the tenant domain. Bare domains get an
    /// `https://` scheme; explicit `http://` is honored for local mocks.
    fn endpoint(&self, path: &str) -> Result<Url, Error> {
        let domain = &self.config.domain;
        let base = if domain.contains("://") {
            Url::parse(domain)?
        } else {
            Url::parse(&format!("https://{domain}"))?
        };
        Ok(base.join(path)?)
    }

    // ── Hosted redirect URLs ─────────────────────────────────────────

    /// The hosted login page. Sending the user agent here starts the
    /// redirect-based sign-in; the provider returns to `redirect_uri`
    /// with `code` and the echoed `state`.
    pub fn authorize_url(&self, redirect_uri: &str, state: &str) -> Result<Url, Error> {
        let mut url = self.endpoint("/authorize")?;
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("scope", SCOPES)
            .append_pair("audience", &self.config.audience)
            .append_pair("state", state);
        Ok(url)
    }

    /// The hosted sign-out URL, redirecting back to `return_to`.
    pub fn logout_url(&self, return_to: &str) -> Result<Url, Error> {
        let mut url = self.endpoint("/v2/logout")?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("returnTo", return_to);
        Ok(url)
    }

    // ── Token endpoint ───────────────────────────────────────────────

    /// Exchange an authorization code for a token set.
    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<TokenSet, Error> {
        debug!("exchanging authorization code");
        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("client_id", &self.config.client_id),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ])
        .await
    }

    /// Obtain a fresh access token from a refresh token — the silent
    /// path behind `get_access_token`.
    pub async fn refresh(&self, refresh_token: &SecretString) -> Result<TokenSet, Error> {
        debug!("refreshing access token");
        self.token_request(&[
            ("grant_type", "refresh_token"),
            ("client_id", &self.config.client_id),
            ("refresh_token", refresh_token.expose_secret()),
        ])
        .await
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenSet, Error> {
        let url = self.endpoint("/oauth/token")?;
        let resp = self.http.post(url).form(form).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let raw = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ProviderErrorResponse>(&raw)
                .ok()
                .and_then(|e| match (e.error, e.error_description) {
                    (Some(err), Some(desc)) => Some(format!("{err}: {desc}")),
                    (Some(err), None) => Some(err),
                    (None, Some(desc)) => Some(desc),
                    (None, None) => None,
                })
                .unwrap_or_else(|| format!("token endpoint returned HTTP {status}"));
            return Err(Error::Provider { message });
        }

        let tokens: TokenEndpointResponse =
            resp.json().await.map_err(|e| Error::Provider {
                message: format!("invalid token response: {e}"),
            })?;
        Ok(tokens.into())
    }

    // ── Profile ──────────────────────────────────────────────────────

    /// `GET /userinfo` — the provider's profile claims for an access
    /// token (name, picture, email_verified, locale).
    pub async fn user_info(&self, access_token: &str) -> Result<ProviderProfile, Error> {
        let url = self.endpoint("/userinfo")?;
        debug!("GET {url}");

        let resp = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Provider {
                message: format!("userinfo returned HTTP {status}"),
            });
        }

        resp.json().await.map_err(|e| Error::Provider {
            message: format!("invalid userinfo response: {e}"),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn provider() -> IdentityProvider {
        IdentityProvider::from_reqwest(
            ProviderConfig {
                domain: "login.example.com".into(),
                client_id: "client-123".into(),
                audience: "pulsely-api".into(),
            },
            reqwest::Client::new(),
        )
    }

    #[test]
    fn authorize_url_carries_the_oidc_parameters() {
        let url = provider()
            .authorize_url("http://127.0.0.1:8917/callback", "xyz")
            .unwrap();

        assert_eq!(url.host_str(), Some("login.example.com"));
        assert_eq!(url.path(), "/authorize");
        let query: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(query.contains(&("response_type".into(), "code".into())));
        assert!(query.contains(&("client_id".into(), "client-123".into())));
        assert!(query.contains(&("audience".into(), "pulsely-api".into())));
        assert!(query.contains(&("state".into(), "xyz".into())));
    }

    #[test]
    fn logout_url_returns_to_the_origin() {
        let url = provider().logout_url("http://localhost:3000").unwrap();
        assert_eq!(url.path(), "/v2/logout");
        assert!(url.query().unwrap().contains("returnTo"));
    }

    #[test]
    fn expiry_accounts_for_lifetime() {
        let tokens: TokenSet = TokenEndpointResponse {
            access_token: "at".into(),
            id_token: None,
            refresh_token: None,
            expires_in: Some(3600),
        }
        .into();
        assert!(!tokens.is_expired());
        assert!(!tokens.expires_soon());

        let stale: TokenSet = TokenEndpointResponse {
            access_token: "at".into(),
            id_token: None,
            refresh_token: None,
            expires_in: Some(0),
        }
        .into();
        assert!(stale.is_expired());
    }
}
