// SPDX-License-Identifier: MPL-2.0
//! Command-line parsing.

use crate::app::Flags;
use crate::error::{Error, Result};
use std::path::PathBuf;

pub const USAGE: &str = "\
Usage: dogme [OPTIONS] <MEDIA_FILE>

Options:
  -f, --fullscreen        Start in fullscreen mode
      --config-dir <DIR>  Read and write settings.toml in DIR
  -h, --help              Print this help and exit
  -v, --version           Print the version and exit
";

/// What the process should do after parsing its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    Run(Flags),
    Help,
    Version,
}

/// Parses process arguments.
///
/// # Errors
///
/// Returns [`Error::Usage`] when the media file is missing, an option is
/// unknown, or more than one file is given.
pub fn parse(mut args: pico_args::Arguments) -> Result<CliAction> {
    if args.contains(["-h", "--help"]) {
        return Ok(CliAction::Help);
    }
    if args.contains(["-v", "--version"]) {
        return Ok(CliAction::Version);
    }

    let fullscreen = args.contains(["-f", "--fullscreen"]);
    let config_dir: Option<PathBuf> = args
        .opt_value_from_str("--config-dir")
        .map_err(|e| Error::Usage(e.to_string()))?;

    let mut free = args.finish().into_iter();
    let media_path = match free.next() {
        Some(arg) if arg.to_string_lossy().starts_with('-') => {
            return Err(Error::Usage(format!(
                "unknown option '{}'",
                arg.to_string_lossy()
            )));
        }
        Some(arg) => PathBuf::from(arg),
        None => return Err(Error::Usage("missing media file".to_string())),
    };
    if let Some(extra) = free.next() {
        return Err(Error::Usage(format!(
            "unexpected argument '{}'",
            extra.to_string_lossy()
        )));
    }

    Ok(CliAction::Run(Flags {
        media_path,
        fullscreen,
        config_dir,
    }))
}
