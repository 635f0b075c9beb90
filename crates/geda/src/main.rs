mod args;
mod commands;
mod failure;
mod output;

use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;

use crate::args::Cli;
use crate::failure::FailureClass;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => {
            // clap routes help and version to stdout, usage errors to stderr.
            let _ = error.print();
            return match error.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => FailureClass::Validation.exit_code(),
            };
        }
    };
    let human = cli.human;
    match commands::run(cli.command) {
        Ok(response) => {
            output::print_response(&response, human);
            ExitCode::SUCCESS
        }
        Err(failure) => {
            output::print_failure(&failure, human);
            failure.class.exit_code()
        }
    }
}
