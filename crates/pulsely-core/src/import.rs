// ── Export-file import ──
//
// Upload state machine mirroring the feeds, with a success flag instead
// of a payload: the server's acknowledgement is not kept beyond logging.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use pulsely_api::ApiClient;

use crate::error::CoreError;
use crate::session::Session;

const FALLBACK_FILE_NAME: &str = "export.json";

/// Published state of the import task.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ImportState {
    pub loading: bool,
    pub error: Option<String>,
    pub success: bool,
}

/// One-shot uploader for health export files (`POST /import-data`).
#[derive(Clone)]
pub struct ImportTask {
    inner: Arc<ImportTaskInner>,
}

struct ImportTaskInner {
    session: Session,
    client: ApiClient,
    state: watch::Sender<ImportState>,
}

impl ImportTask {
    pub fn new(session: Session, client: ApiClient) -> Self {
        let (state, _) = watch::channel(ImportState::default());
        Self {
            inner: Arc::new(ImportTaskInner {
                session,
                client,
                state,
            }),
        }
    }

    pub fn state(&self) -> ImportState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ImportState> {
        self.inner.state.subscribe()
    }

    /// Upload an export file. Returns `true` on success.
    ///
    /// With no file selected this is a guaranteed no-op: the client is
    /// never invoked and the state is left untouched. An anonymous
    /// session records an error without issuing a request.
    pub async fn import(&self, file: Option<&Path>) -> bool {
        let Some(path) = file else {
            debug!("no file selected, nothing to import");
            return false;
        };

        if !self.inner.session.is_authenticated() {
            self.inner.state.send_modify(|s| {
                s.error = Some(CoreError::NotAuthenticated.to_string());
            });
            return false;
        }

        self.inner.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
            s.success = false;
        });

        match self.run_upload(path).await {
            Ok(()) => {
                self.inner.state.send_modify(|s| {
                    s.loading = false;
                    s.success = true;
                });
                true
            }
            Err(e) => {
                warn!(error = %e, file = %path.display(), "import failed");
                self.inner.state.send_modify(|s| {
                    s.loading = false;
                    s.error = Some(e.to_string());
                });
                false
            }
        }
    }

    async fn run_upload(&self, path: &Path) -> Result<(), CoreError> {
        let token = self
            .inner
            .session
            .get_access_token()
            .await
            .ok_or(CoreError::NoAccessToken)?;

        let content = tokio::fs::read(path)
            .await
            .map_err(pulsely_api::Error::Io)?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(FALLBACK_FILE_NAME);

        let ack = self
            .inner
            .client
            .import_data(&token, file_name, content)
            .await?;
        debug!(%ack, "import acknowledged");
        Ok(())
    }

    /// Clear `error` and `success` before a new attempt. Nothing else
    /// is touched and no request is issued.
    pub fn reset(&self) {
        self.inner.state.send_modify(|s| {
            s.error = None;
            s.success = false;
        });
    }
}
