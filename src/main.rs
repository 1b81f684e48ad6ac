// SPDX-License-Identifier: MPL-2.0
use dogme::cli::{self, CliAction};
use std::process::ExitCode;

/// Exit status for command-line misuse.
const EXIT_USAGE: u8 = 2;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("dogme=info"))
        .init();

    let action = match cli::parse(pico_args::Arguments::from_env()) {
        Ok(action) => action,
        Err(err) => {
            eprintln!("dogme: {err}\n\n{}", cli::USAGE);
            return ExitCode::from(EXIT_USAGE);
        }
    };

    match action {
        CliAction::Help => {
            print!("{}", cli::USAGE);
            ExitCode::SUCCESS
        }
        CliAction::Version => {
            println!("dogme {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        CliAction::Run(flags) => match dogme::app::run(flags) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                log::error!("{err}");
                eprintln!("dogme: {err}");
                ExitCode::FAILURE
            }
        },
    }
}
