// Hand-crafted async HTTP client for the Pulsely backend API.
//
// Base path: configurable, e.g. http://localhost:8000/api/v1
// Auth: Authorization: Bearer <access token>

use reqwest::multipart;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::filters::{HeartRateFilters, WorkoutFilters};
use crate::transport::TransportConfig;
use crate::types::{HeartRateResponse, User, WorkoutResponse};

// ── Error response shape from the backend ────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

impl ErrorResponse {
    fn into_message(self) -> Option<(String, Option<String>)> {
        self.detail
            .or(self.message)
            .or(self.error)
            .map(|m| (m, self.code))
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the Pulsely backend API.
///
/// Explicitly constructed and handed to whoever needs it — there is no
/// process-wide instance. Cloning is cheap (`reqwest::Client` is an
/// `Arc` internally).
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a base URL and transport config.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
        })
    }

    /// Wrap an existing `reqwest::Client` (used by tests to point at a
    /// mock server).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
        })
    }

    /// Parse and normalize the base URL so that joining relative paths
    /// appends to it instead of replacing the final segment.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    /// The configured base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"heart-rate"`) onto the base URL.
    fn url(&self, path: &str) -> Url {
        // base_url always ends with `/`, so joining a relative path works.
        self.base_url
            .join(path)
            .expect("path should be valid relative URL")
    }

    // ── HTTP plumbing ────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
        params: &[(&'static str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path);
        debug!("GET {url} params={params:?}");

        let mut req = self.http.get(url);
        if !params.is_empty() {
            req = req.query(params);
        }
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
        form: multipart::Form,
    ) -> Result<T, Error> {
        let url = self.url(path);
        debug!("POST {url} (multipart)");

        // Content-Type is left to the transport so the boundary is set
        // automatically; JSON requests get it from `.json()` the same way.
        let mut req = self.http.post(url).multipart(form);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }

        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview = &body[..body.len().min(200)];
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::Unauthorized;
        }

        let raw = resp.text().await.unwrap_or_default();

        if let Some((message, code)) = serde_json::from_str::<ErrorResponse>(&raw)
            .ok()
            .and_then(ErrorResponse::into_message)
        {
            Error::Api {
                status: status.as_u16(),
                message,
                code,
            }
        } else {
            Error::Api {
                status: status.as_u16(),
                message: if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                },
                code: None,
            }
        }
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Current user ─────────────────────────────────────────────────

    /// `GET /me` — the server-confirmed identity of the token's owner.
    pub async fn get_current_user(&self, token: &str) -> Result<User, Error> {
        self.get("me", Some(token), &[]).await
    }

    // ── Heart rate ───────────────────────────────────────────────────

    /// `GET /heart-rate` with only the present filter fields in the
    /// query string. Empty filters produce a bare path with no `?`.
    pub async fn get_heart_rate_data(
        &self,
        token: &str,
        filters: &HeartRateFilters,
    ) -> Result<HeartRateResponse, Error> {
        self.get("heart-rate", Some(token), &filters.to_query())
            .await
    }

    // ── Workouts ─────────────────────────────────────────────────────

    /// `GET /workouts`, same query rule as heart rate over the larger
    /// filter set.
    pub async fn get_workouts(
        &self,
        token: &str,
        filters: &WorkoutFilters,
    ) -> Result<WorkoutResponse, Error> {
        self.get("workouts", Some(token), &filters.to_query()).await
    }

    // ── Import ───────────────────────────────────────────────────────

    /// `POST /import-data` with the export file under multipart field
    /// `file`. The acknowledgement body is deployment-specific, so it
    /// is returned as opaque JSON.
    pub async fn import_data(
        &self,
        token: &str,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<serde_json::Value, Error> {
        let part = multipart::Part::bytes(content).file_name(file_name.to_owned());
        let form = multipart::Form::new().part("file", part);
        self.post_multipart("import-data", Some(token), form).await
    }
}
