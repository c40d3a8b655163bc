//! Export-file upload command.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use pulsely_core::ImportTask;

use crate::cli::{GlobalOpts, ImportArgs};
use crate::commands::util;
use crate::error::CliError;
use crate::output;

pub async fn handle(args: ImportArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if !args.file.exists() {
        return Err(CliError::Validation {
            field: "file".into(),
            reason: format!("'{}' does not exist", args.file.display()),
        });
    }

    let (_config, session) = util::establish_session(global).await?;
    let task = ImportTask::new(session.clone(), session.api_client());

    let spinner = if global.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner} {msg}")
                .expect("static template is valid"),
        );
        pb.set_message(format!("Uploading {}...", args.file.display()));
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    };

    let ok = task.import(Some(&args.file)).await;
    spinner.finish_and_clear();

    if ok {
        output::print_output(&format!("Imported {}.", args.file.display()), global.quiet);
        Ok(())
    } else {
        let message = task
            .state()
            .error
            .unwrap_or_else(|| "import failed".to_owned());
        Err(CliError::Fetch { message })
    }
}
