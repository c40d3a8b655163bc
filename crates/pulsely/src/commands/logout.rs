//! Sign-out: clear local credentials and hand back the provider's
//! logout URL so the hosted session can be ended too.

use url::Url;

use crate::cli::GlobalOpts;
use crate::commands::util;
use crate::error::CliError;
use crate::output;

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let config = util::load_config(global)?;

    pulsely_config::clear_refresh_token()?;

    // The local session is gone either way; the provider URL is a
    // courtesy and needs a configured provider to be constructible.
    if let Ok(session) = util::build_session(&config) {
        session.logout().await;
        let return_to = Url::parse(&config.api.base_url)
            .map(|u| u.origin().ascii_serialization())
            .unwrap_or_else(|_| "http://localhost".to_owned());
        let url = session.logout_url(&return_to)?;
        output::print_output(
            &format!("Signed out. To also end the hosted provider session, visit:\n\n  {url}"),
            global.quiet,
        );
    } else {
        output::print_output("Signed out.", global.quiet);
    }

    Ok(())
}
