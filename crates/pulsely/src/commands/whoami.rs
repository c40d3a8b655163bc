//! Show the signed-in user.

use serde::Serialize;

use pulsely_core::api::types::{ProviderProfile, User};

use crate::cli::GlobalOpts;
use crate::commands::util;
use crate::error::CliError;
use crate::output;

/// Combined identity view: the server-confirmed user plus the
/// provider's profile claims.
#[derive(Serialize)]
struct Identity {
    user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    profile: Option<ProviderProfile>,
}

fn detail(identity: &Identity) -> String {
    let mut lines = vec![
        format!("User ID:      {}", identity.user.user_id),
        format!("Email:        {}", identity.user.email),
        format!(
            "Permissions:  {}",
            if identity.user.permissions.is_empty() {
                "-".to_owned()
            } else {
                identity.user.permissions.join(", ")
            }
        ),
    ];
    if let Some(ref profile) = identity.profile {
        if let Some(ref name) = profile.name {
            lines.push(format!("Name:         {name}"));
        }
        if let Some(verified) = profile.email_verified {
            lines.push(format!("Verified:     {verified}"));
        }
        if let Some(ref locale) = profile.locale {
            lines.push(format!("Locale:       {locale}"));
        }
    }
    lines.join("\n")
}

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let (_config, session) = util::establish_session(global).await?;

    let Some(user) = session.current_user() else {
        return Err(CliError::Fetch {
            message: "the API did not confirm the signed-in user".into(),
        });
    };
    let identity = Identity {
        user,
        profile: session.profile(),
    };

    let out = output::render_single(&global.output, &identity, detail, |i| i.user.user_id.clone());
    output::print_output(&out, global.quiet);
    Ok(())
}
