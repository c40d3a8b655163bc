//! Hosted sign-in.
//!
//! The provider only supports redirect-based login, so the CLI opens
//! the hosted page in a browser and catches the redirect on a one-shot
//! localhost listener, then exchanges the authorization code and
//! persists the refresh token for silent restore on later invocations.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, warn};
use url::Url;

use crate::cli::{GlobalOpts, LoginArgs};
use crate::commands::util;
use crate::error::CliError;
use crate::output;

const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

const SUCCESS_PAGE: &str = "<!doctype html><html><body>\
    <h2>Signed in</h2><p>You can close this tab and return to the terminal.</p>\
    </body></html>";
const FAILURE_PAGE: &str = "<!doctype html><html><body>\
    <h2>Sign-in failed</h2><p>Return to the terminal for details.</p>\
    </body></html>";

pub async fn handle(args: LoginArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let config = util::load_config(global)?;
    let session = util::build_session(&config)?;

    // Bind before handing out the redirect URI so the provider can
    // never redirect into a closed port.
    let listener = TcpListener::bind(("127.0.0.1", args.port)).await?;
    let redirect_uri = format!("http://127.0.0.1:{}/callback", args.port);
    let state = uuid::Uuid::new_v4().to_string();
    let url = session.login_url(&redirect_uri, &state)?;

    if args.no_browser || webbrowser::open(url.as_str()).is_err() {
        output::print_output(&format!("Open this URL to sign in:\n\n  {url}"), false);
    } else {
        output::print_output(
            "Opened the provider login page in your browser.",
            global.quiet,
        );
    }

    let code = tokio::time::timeout(CALLBACK_TIMEOUT, wait_for_callback(&listener, &state))
        .await
        .map_err(|_| CliError::LoginFailed {
            message: "timed out waiting for the provider redirect".into(),
        })??;

    session
        .complete_login(&code, &redirect_uri)
        .await
        .map_err(|e| CliError::LoginFailed {
            message: e.to_string(),
        })?;

    match session.refresh_token().await {
        Some(token) => {
            if let Err(e) = pulsely_config::store_refresh_token(&token) {
                warn!(error = %e, "could not persist the session; sign-in will be required again");
            }
        }
        None => warn!("provider issued no refresh token; silent sign-in will not be available"),
    }

    let who = session
        .current_user()
        .map(|u| u.email)
        .or_else(|| session.profile().and_then(|p| p.email));
    let message = who.map_or_else(
        || "Signed in.".to_owned(),
        |email| format!("Signed in as {email}."),
    );
    output::print_output(&message, global.quiet);
    Ok(())
}

/// Accept connections until one carries the callback, answer it with a
/// small confirmation page, and return the authorization code.
async fn wait_for_callback(
    listener: &TcpListener,
    expected_state: &str,
) -> Result<String, CliError> {
    loop {
        let (stream, peer) = listener.accept().await?;
        debug!(%peer, "callback connection");
        match handle_connection(stream, expected_state).await {
            Ok(Some(code)) => return Ok(code),
            // Favicon probes and stray requests: keep listening.
            Ok(None) => {}
            Err(e) => return Err(e),
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    expected_state: &str,
) -> Result<Option<String>, CliError> {
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line).await?;

    // "GET /callback?code=...&state=... HTTP/1.1"
    let path = request_line.split_whitespace().nth(1).unwrap_or("/");
    if !path.starts_with("/callback") {
        respond(reader.into_inner(), "404 Not Found", "").await?;
        return Ok(None);
    }

    let url = Url::parse(&format!("http://127.0.0.1{path}")).map_err(|e| CliError::LoginFailed {
        message: format!("unparseable provider redirect: {e}"),
    })?;

    let mut code = None;
    let mut state = None;
    let mut error = None;
    let mut error_description = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            "error_description" => error_description = Some(value.into_owned()),
            _ => {}
        }
    }

    if let Some(error) = error {
        respond(reader.into_inner(), "200 OK", FAILURE_PAGE).await?;
        let message = error_description.map_or_else(|| error.clone(), |d| format!("{error}: {d}"));
        return Err(CliError::LoginFailed { message });
    }
    if state.as_deref() != Some(expected_state) {
        respond(reader.into_inner(), "200 OK", FAILURE_PAGE).await?;
        return Err(CliError::LoginFailed {
            message: "state mismatch in provider redirect".into(),
        });
    }
    let Some(code) = code else {
        respond(reader.into_inner(), "200 OK", FAILURE_PAGE).await?;
        return Err(CliError::LoginFailed {
            message: "provider redirect carried no authorization code".into(),
        });
    };

    respond(reader.into_inner(), "200 OK", SUCCESS_PAGE).await?;
    Ok(Some(code))
}

async fn respond(mut stream: TcpStream, status: &str, body: &str) -> Result<(), CliError> {
    let response = format!(
        "HTTP/1.1 {status}\r\n\
         Content-Type: text/html; charset=utf-8\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\r\n\
         {body}",
        body.len()
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await?;
    Ok(())
}
