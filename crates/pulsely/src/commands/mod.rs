//! Command handlers.

mod config_cmd;
mod heart_rate;
mod import_cmd;
mod login;
mod logout;
mod util;
mod whoami;
mod workouts;

use clap::CommandFactory;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn dispatch(cli: Cli) -> Result<(), CliError> {
    let global = cli.global;
    match cli.command {
        Command::Login(args) => login::handle(args, &global).await,
        Command::Logout => logout::handle(&global).await,
        Command::Whoami => whoami::handle(&global).await,
        Command::HeartRate(args) => heart_rate::handle(args, &global).await,
        Command::Workouts(args) => workouts::handle(args, &global).await,
        Command::Import(args) => import_cmd::handle(args, &global).await,
        Command::Config(args) => config_cmd::handle(args, &global),
        Command::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "pulsely",
                &mut std::io::stdout(),
            );
            Ok(())
        }
    }
}
